//! # Node Container
//!
//! Builds every component of the node once and hands out shared handles.
//!
//! ```text
//! ModuleRegistry ──▶ processors ──▶ TokenService ──commit──▶ InMemoryStateDb
//!        │                               │
//!        ├──▶ hinters ─┐                 └──observer──▶ TokenDigest
//!        └──▶ routes ──┴──▶ AppState ◀── OperationPool
//! ```

pub mod config;

pub use config::{BlockConfig, ConfigError, NodeConfig, PoolConfig};

use std::sync::Arc;

use qc_16_api_gateway::AppState;
use qc_18_token_model::adapters::InMemoryStateDb;
use qc_18_token_model::codec::HinterRegistry;
use qc_18_token_model::digest::TokenDigest;
use qc_18_token_model::module::{ApiRoute, ModelModule, ModuleRegistry, TokenModule};
use qc_18_token_model::service::TokenService;
use tracing::info;

use crate::adapters::OperationPool;
use crate::genesis::{GenesisBuilder, GenesisConfig};
use crate::runtime::RuntimeError;

/// Shared handles of an initialized node.
pub struct NodeContainer {
    pub config: NodeConfig,
    pub store: Arc<InMemoryStateDb>,
    pub digest: Arc<TokenDigest>,
    pub service: Arc<TokenService>,
    pub pool: Arc<OperationPool>,
    pub hinters: Arc<HinterRegistry>,
    pub routes: Vec<ApiRoute>,
}

impl NodeContainer {
    /// Registers the model modules, seeds `genesis` and wires the service.
    pub fn new(config: NodeConfig, genesis: &GenesisConfig) -> Result<Self, RuntimeError> {
        config.validate()?;

        let mut registry = ModuleRegistry::new();
        TokenModule.register(&mut registry)?;
        let parts = registry.build();

        let store = Arc::new(InMemoryStateDb::new());
        GenesisBuilder::new(genesis.clone()).apply(&store)?;

        let digest = Arc::new(TokenDigest::new());
        let service = TokenService::new(
            store.clone(),
            Arc::new(parts.processors),
            config.service_config(),
        )
        .with_observer(digest.clone());

        info!(
            modules = ?parts.modules,
            facts = parts.supported_facts.len(),
            routes = parts.routes.len(),
            "node container initialized"
        );

        Ok(Self {
            pool: Arc::new(OperationPool::new(config.pool.capacity)),
            config,
            store,
            digest,
            service: Arc::new(service),
            hinters: Arc::new(parts.hinters),
            routes: parts.routes,
        })
    }

    /// Handler state of the API gateway.
    pub fn app_state(&self) -> AppState {
        AppState {
            query: self.digest.clone(),
            submitter: self.pool.clone(),
            hinters: self.hinters.clone(),
        }
    }
}
