//! # Inbound Port - TokenQueryApi
//!
//! Read API over committed token state, consumed by the HTTP gateway.

use async_trait::async_trait;
use shared_types::{Address, Amount};

use crate::digest::DigestError;
use crate::domain::Design;

/// Token read model.
///
/// # Example
///
/// ```rust,ignore
/// async fn show(api: &impl TokenQueryApi, contract: Address, holder: Address) {
///     let design = api.token(&contract).await?;
///     let balance = api.token_balance(&contract, &holder).await?;
/// }
/// ```
#[async_trait]
pub trait TokenQueryApi: Send + Sync {
    /// Latest design of `contract`'s token.
    ///
    /// # Errors
    /// - `NotFound`: no token is registered on `contract`
    async fn token(&self, contract: &Address) -> Result<Design, DigestError>;

    /// Latest balance of `address`; `None` if it never held the token.
    async fn token_balance(
        &self,
        contract: &Address,
        address: &Address,
    ) -> Result<Option<Amount>, DigestError>;
}
