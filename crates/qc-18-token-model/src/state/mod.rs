//! # State Model
//!
//! Maps token entities onto the host's key-value namespace and defines how
//! writes to one key are folded at commit time.
//!
//! - [`keys`]: key construction and parsing
//! - [`value`]: stored values and typed extraction
//! - [`merger`]: merge values and their mergers
//! - [`helpers`]: existence checks against a [`StateReader`](crate::ports::outbound::StateReader)

pub mod errors;
pub mod helpers;
pub mod keys;
pub mod merger;
pub mod value;

pub use errors::{MergeError, StateError};
pub use helpers::{
    check_exists_state, check_not_exists_state, create_not_exist_account, exists_c_account,
    exists_state, AccountCheckError,
};
pub use keys::{
    is_design_key, is_token_balance_key, parse_design_key, parse_state_key,
    parse_token_balance_key, StateKeyGenerator, DESIGN_SUFFIX, TOKEN_BALANCE_SUFFIX, TOKEN_PREFIX,
};
pub use merger::{
    fold_merge_values, MergerKind, ReplaceStateValueMerger, StateMergeValue, StateValueMerger,
    TokenBalanceStateValueMerger,
};
pub use value::{
    state_contract_account_value, state_design_value, state_token_balance_value,
    AddTokenBalanceStateValue, DeductTokenBalanceStateValue, DesignStateValue, State, StateValue,
    TokenBalanceStateValue,
};
