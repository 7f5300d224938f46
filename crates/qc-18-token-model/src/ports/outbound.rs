//! # Outbound Ports
//!
//! What the token model needs from its host.
//!
//! | Port | Provided by |
//! |------|-------------|
//! | [`StateReader`] | committed + pending state of the node |
//! | [`StateStore`] | the node's state database |
//! | [`CommitObserver`] | read models such as the digest |

use shared_types::{Hash, Height};

use crate::digest::DigestError;
use crate::state::{State, StateError, StateMergeValue};

/// Read access to state by key.
///
/// `Ok(None)` means the key has never been written.
pub trait StateReader: Send + Sync {
    fn get_state(&self, key: &str) -> Result<Option<State>, StateError>;
}

impl<F> StateReader for F
where
    F: Fn(&str) -> Result<Option<State>, StateError> + Send + Sync,
{
    fn get_state(&self, key: &str) -> Result<Option<State>, StateError> {
        self(key)
    }
}

/// Writable state database.
pub trait StateStore: StateReader {
    /// Applies merge values produced at `height`, each tagged with the fact
    /// hash of the operation that produced it.
    ///
    /// All-or-nothing: on error nothing is written. Returns the states written.
    fn commit(
        &self,
        height: Height,
        values: &[(Hash, StateMergeValue)],
    ) -> Result<Vec<State>, StateError>;
}

/// Notified after every successful commit.
pub trait CommitObserver: Send + Sync {
    fn on_commit(&self, height: Height, states: &[State]) -> Result<(), DigestError>;
}
