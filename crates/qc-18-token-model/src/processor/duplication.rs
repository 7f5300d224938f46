use std::collections::HashSet;

use shared_types::Address;

use super::errors::ReasonError;
use crate::operation::OperationFact;

/// Per-proposal reservation of senders and registering contracts.
///
/// Every operation reserves its sender. RegisterModel also reserves its
/// contract, so two registrations on one contract cannot share a block.
#[derive(Debug, Default)]
pub struct DuplicationChecker {
    senders: HashSet<Address>,
    contracts: HashSet<Address>,
}

impl DuplicationChecker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the keys of `fact`. A rejected fact reserves nothing.
    pub fn check(&mut self, fact: &OperationFact) -> Result<(), ReasonError> {
        let sender = *fact.sender();
        let contract = match fact {
            OperationFact::RegisterModel(f) => Some(*f.contract()),
            OperationFact::Mint(_)
            | OperationFact::Burn(_)
            | OperationFact::Approve(_)
            | OperationFact::Transfer(_)
            | OperationFact::TransferFrom(_) => None,
        };

        if self.senders.contains(&sender) {
            return Err(ReasonError::DuplicatedSender(sender));
        }
        if let Some(contract) = contract {
            if self.contracts.contains(&contract) {
                return Err(ReasonError::DuplicatedContract(contract));
            }
            self.contracts.insert(contract);
        }
        self.senders.insert(sender);
        Ok(())
    }
}
