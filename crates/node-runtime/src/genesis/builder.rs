//! # Genesis State Builder
//!
//! Validates a genesis description and writes it into the state store.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use qc_18_token_model::adapters::InMemoryStateDb;
use qc_18_token_model::state::StateError;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use thiserror::Error;
use tracing::info;

/// Genesis errors.
#[derive(Debug, Error)]
pub enum GenesisError {
    /// Genesis file could not be read.
    #[error("Failed to read genesis file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Genesis file is not valid JSON for [`GenesisConfig`].
    #[error("Failed to parse genesis file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid genesis configuration.
    #[error("Invalid genesis configuration: {0}")]
    InvalidConfig(String),

    /// State initialization failed.
    #[error("Failed to initialize genesis state: {0}")]
    State(#[from] StateError),
}

/// A contract account and the account that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAccountSpec {
    pub address: Address,
    pub owner: Address,
}

/// Genesis state description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    /// Plain accounts.
    pub accounts: Vec<Address>,
    /// Contract accounts, seeded inactive.
    pub contract_accounts: Vec<ContractAccountSpec>,
}

impl GenesisConfig {
    /// Reads a JSON genesis file.
    pub fn from_file(path: &Path) -> Result<Self, GenesisError> {
        let raw = std::fs::read_to_string(path).map_err(|source| GenesisError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Every address appears once; contract owners are plain accounts.
    pub fn validate(&self) -> Result<(), GenesisError> {
        let mut seen = BTreeSet::new();
        let contracts = self.contract_accounts.iter().map(|c| &c.address);
        for address in self.accounts.iter().chain(contracts) {
            if !seen.insert(address) {
                return Err(GenesisError::InvalidConfig(format!(
                    "address {address} is listed twice"
                )));
            }
        }

        for contract in &self.contract_accounts {
            if !self.accounts.contains(&contract.owner) {
                return Err(GenesisError::InvalidConfig(format!(
                    "owner {} of contract account {} is not a genesis account",
                    contract.owner, contract.address
                )));
            }
        }

        Ok(())
    }
}

/// What genesis wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenesisSummary {
    pub accounts: usize,
    pub contract_accounts: usize,
}

/// Applies a [`GenesisConfig`] to an empty store.
pub struct GenesisBuilder {
    config: GenesisConfig,
}

impl GenesisBuilder {
    pub fn new(config: GenesisConfig) -> Self {
        Self { config }
    }

    /// Writes the genesis states at height 0.
    ///
    /// Fails without partial writes on an invalid config; a store that
    /// already holds one of the addresses fails with `AlreadyExists`.
    pub fn apply(&self, store: &InMemoryStateDb) -> Result<GenesisSummary, GenesisError> {
        self.config.validate()?;

        for account in &self.config.accounts {
            store.seed_account(*account)?;
        }
        for contract in &self.config.contract_accounts {
            store.seed_contract_account(contract.address, contract.owner)?;
        }

        let summary = GenesisSummary {
            accounts: self.config.accounts.len(),
            contract_accounts: self.config.contract_accounts.len(),
        };
        info!(
            accounts = summary.accounts,
            contract_accounts = summary.contract_accounts,
            "genesis state seeded"
        );
        Ok(summary)
    }
}
