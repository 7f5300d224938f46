//! # Module Registration
//!
//! A host node is assembled from model modules. Each module contributes
//! hinters, supported facts, operation processors and HTTP route
//! descriptors to one [`ModuleRegistry`]:
//!
//! ```text
//! TokenModule::register ──▶ ModuleRegistry ──build──▶ ModuleParts
//!                              ├─ HinterRegistryBuilder
//!                              ├─ OperationProcessors
//!                              ├─ supported facts
//!                              └─ API routes
//! ```

use std::collections::BTreeSet;

use shared_types::Hint;
use tracing::info;

use crate::codec::{HinterRegistry, HinterRegistryBuilder};
use crate::domain::{ApproveBox, ApproveInfo, Design, Policy};
use crate::errors::RegistryError;
use crate::operation::{
    ApproveItem, Operation, OperationFact, OperationKind, TransferFromItem, TransferItem,
};
use crate::processor::{constructor, OperationProcessors};
use crate::state::{
    AddTokenBalanceStateValue, DeductTokenBalanceStateValue, DesignStateValue, StateValue,
    TokenBalanceStateValue,
};

/// Identifier of the token module.
pub const MODULE_ID: &str = "token";

/// An HTTP route a module exposes through the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiRoute {
    pub method: &'static str,
    pub path: &'static str,
    pub name: &'static str,
}

/// Routes of the token digest API.
pub const TOKEN_ROUTES: [ApiRoute; 2] = [
    ApiRoute {
        method: "GET",
        path: "/token/:contract",
        name: "token",
    },
    ApiRoute {
        method: "GET",
        path: "/token/:contract/account/:address",
        name: "token-balance",
    },
];

/// A pluggable model module.
pub trait ModelModule: Send + Sync {
    fn id(&self) -> &'static str;

    /// Adds everything the module provides to `registry`.
    fn register(&self, registry: &mut ModuleRegistry) -> Result<(), RegistryError>;
}

/// Mutable registration context shared by all modules.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: BTreeSet<String>,
    hinters: HinterRegistryBuilder,
    processors: OperationProcessors,
    supported_facts: Vec<Hint>,
    routes: Vec<ApiRoute>,
}

impl ModuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `id`; a module registers at most once.
    pub fn begin_module(&mut self, id: &str) -> Result<(), RegistryError> {
        if !self.modules.insert(id.to_string()) {
            return Err(RegistryError::DuplicateModule(id.to_string()));
        }
        Ok(())
    }

    pub fn hinters_mut(&mut self) -> &mut HinterRegistryBuilder {
        &mut self.hinters
    }

    pub fn processors_mut(&mut self) -> &mut OperationProcessors {
        &mut self.processors
    }

    pub fn add_supported_fact(&mut self, hint: Hint) {
        self.supported_facts.push(hint);
    }

    pub fn add_route(&mut self, route: ApiRoute) {
        self.routes.push(route);
    }

    #[must_use]
    pub fn build(self) -> ModuleParts {
        ModuleParts {
            modules: self.modules.into_iter().collect(),
            hinters: self.hinters.build(),
            processors: self.processors,
            supported_facts: self.supported_facts,
            routes: self.routes,
        }
    }
}

/// Frozen output of module registration.
#[derive(Debug, Clone)]
pub struct ModuleParts {
    pub modules: Vec<String>,
    pub hinters: HinterRegistry,
    pub processors: OperationProcessors,
    pub supported_facts: Vec<Hint>,
    pub routes: Vec<ApiRoute>,
}

/// Registers the decoders of every token value.
pub fn token_hinters(builder: &mut HinterRegistryBuilder) -> Result<(), RegistryError> {
    builder
        .add::<ApproveInfo>(ApproveInfo::HINT)?
        .add::<ApproveBox>(ApproveBox::HINT)?
        .add::<Policy>(Policy::HINT)?
        .add::<Design>(Design::HINT)?
        .add::<ApproveItem>(ApproveItem::HINT)?
        .add::<TransferItem>(TransferItem::HINT)?
        .add::<TransferFromItem>(TransferFromItem::HINT)?;

    for hint in [
        DesignStateValue::HINT,
        TokenBalanceStateValue::HINT,
        AddTokenBalanceStateValue::HINT,
        DeductTokenBalanceStateValue::HINT,
    ] {
        builder.add::<StateValue>(hint)?;
    }

    for kind in OperationKind::ALL {
        builder
            .add::<OperationFact>(kind.fact_hint())?
            .add::<Operation>(kind.operation_hint())?;
    }

    Ok(())
}

/// The fungible-token module.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenModule;

impl ModelModule for TokenModule {
    fn id(&self) -> &'static str {
        MODULE_ID
    }

    fn register(&self, registry: &mut ModuleRegistry) -> Result<(), RegistryError> {
        registry.begin_module(MODULE_ID)?;

        token_hinters(registry.hinters_mut())?;

        for kind in OperationKind::ALL {
            registry.add_supported_fact(kind.fact_hint());
            registry
                .processors_mut()
                .set_processor(kind.operation_hint(), constructor(kind))?;
        }

        for route in TOKEN_ROUTES {
            registry.add_route(route);
        }

        info!(
            module = MODULE_ID,
            operations = OperationKind::ALL.len(),
            "model module registered"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_module_parts() {
        let mut registry = ModuleRegistry::new();
        TokenModule.register(&mut registry).unwrap();
        let parts = registry.build();

        assert_eq!(parts.modules, vec![MODULE_ID.to_string()]);
        assert_eq!(parts.processors.len(), 6);
        assert_eq!(parts.supported_facts.len(), 6);
        assert_eq!(parts.routes.len(), 2);
        // 7 values + 4 state values + 6 facts + 6 operations
        assert_eq!(parts.hinters.len(), 23);
        assert!(parts.hinters.contains(&OperationKind::TransferFrom.operation_hint()));
    }

    #[test]
    fn test_double_registration_rejected() {
        let mut registry = ModuleRegistry::new();
        TokenModule.register(&mut registry).unwrap();

        assert_eq!(
            TokenModule.register(&mut registry),
            Err(RegistryError::DuplicateModule(MODULE_ID.to_string()))
        );
    }
}
