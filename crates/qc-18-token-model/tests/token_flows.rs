//! End-to-end token flows through the block service and the in-memory store.

use std::sync::Arc;

use qc_18_token_model::prelude::*;
use shared_types::{Address, Amount, CurrencyId, ValidationError};

// =============================================================================
// HARNESS
// =============================================================================

const S: Address = Address([1; 20]);
const R: Address = Address([2; 20]);
const X: Address = Address([3; 20]);
const Y: Address = Address([4; 20]);
const C: Address = Address([9; 20]);

struct Node {
    store: Arc<InMemoryStateDb>,
    digest: Arc<TokenDigest>,
    service: TokenService,
    height: u64,
    nonce: u64,
}

impl Node {
    fn new() -> Self {
        let store = Arc::new(InMemoryStateDb::new());
        for a in [S, R, X, Y] {
            store.seed_account(a).unwrap();
        }
        store.seed_contract_account(C, S).unwrap();

        let mut registry = ModuleRegistry::new();
        TokenModule.register(&mut registry).unwrap();
        let parts = registry.build();

        let digest = Arc::new(TokenDigest::new());
        let service = TokenService::new(
            store.clone(),
            Arc::new(parts.processors),
            ServiceConfig::default(),
        )
        .with_observer(digest.clone());

        Self {
            store,
            digest,
            service,
            height: 0,
            nonce: 0,
        }
    }

    fn token(&mut self) -> Vec<u8> {
        self.nonce += 1;
        self.nonce.to_be_bytes().to_vec()
    }

    fn base(&mut self, sender: Address) -> TokenFact {
        TokenFact::new(self.token(), sender, C, qct())
    }

    fn block(&mut self, ops: Vec<Operation>) -> BlockReport {
        self.height += 1;
        self.service.process_block(self.height, ops).unwrap()
    }

    fn apply(&mut self, op: Operation) -> BlockReport {
        self.block(vec![op])
    }

    fn balance(&self, holder: Address) -> Option<Amount> {
        let key = StateKeyGenerator::new(C).token_balance(&holder);
        self.store.get_state(&key).unwrap().map(|st| match st.value {
            StateValue::TokenBalance(v) => v.amount(),
            other => panic!("unexpected balance value {other:?}"),
        })
    }

    fn design(&self) -> Design {
        match self.store.get_state(&StateKeyGenerator::new(C).design()).unwrap().unwrap().value {
            StateValue::Design(v) => v.into_design(),
            other => panic!("unexpected design value {other:?}"),
        }
    }

    fn allowance(&self, owner: Address, spender: Address) -> Option<Amount> {
        self.design()
            .policy()
            .get_approve_box(&owner)
            .and_then(|apb| apb.get_approve_info(&spender))
            .map(ApproveInfo::amount)
    }

    fn register(&mut self, initial: u64) -> Operation {
        let base = self.base(S);
        Operation::new(RegisterModelFact::new(
            base,
            TokenSymbol::new("ABC123").unwrap(),
            "Alpha",
            Amount::zero(),
            Amount::from(initial),
        ))
    }

    fn mint(&mut self, receiver: Address, amount: u64) -> Operation {
        let base = self.base(S);
        Operation::new(MintFact::new(base, receiver, Amount::from(amount)))
    }

    fn burn(&mut self, target: Address, amount: u64) -> Operation {
        let base = self.base(target);
        Operation::new(BurnFact::new(base, target, Amount::from(amount)))
    }

    fn approve(&mut self, owner: Address, spender: Address, amount: u64) -> Operation {
        let token = self.token();
        Operation::new(ApproveFact::new(
            token,
            owner,
            vec![ApproveItem::new(C, spender, Amount::from(amount), qct())],
        ))
    }

    fn transfer(&mut self, sender: Address, items: &[(Address, u64)]) -> Operation {
        let token = self.token();
        Operation::new(TransferFact::new(
            token,
            sender,
            items
                .iter()
                .map(|(r, a)| TransferItem::new(C, *r, Amount::from(*a), qct()))
                .collect(),
        ))
    }

    fn transfer_from(
        &mut self,
        sender: Address,
        target: Address,
        receiver: Address,
        amount: u64,
    ) -> Operation {
        let token = self.token();
        Operation::new(TransferFromFact::new(
            token,
            sender,
            vec![TransferFromItem::new(C, receiver, target, Amount::from(amount), qct())],
        ))
    }
}

fn qct() -> CurrencyId {
    CurrencyId::new("QCT").unwrap()
}

fn assert_accepted(report: &BlockReport) {
    assert!(report.rejected.is_empty(), "rejected: {:?}", report.rejected);
}

fn rejection(report: &BlockReport) -> &str {
    assert!(report.accepted.is_empty(), "unexpectedly accepted");
    &report.rejected[0].reason
}

/// Registered token with 100 held by S.
fn registered() -> Node {
    let mut node = Node::new();
    let op = node.register(100);
    assert_accepted(&node.apply(op));
    node
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn test_register_model_credits_sender() {
    let node = registered();

    let design = node.design();
    assert_eq!(design.symbol().as_str(), "ABC123");
    assert_eq!(design.name(), "Alpha");
    assert_eq!(design.policy().total_supply(), Amount::from(100));
    assert_eq!(node.balance(S), Some(Amount::from(100)));
}

#[test]
fn test_register_model_twice_rejected() {
    let mut node = registered();
    let op = node.register(5);

    let report = node.apply(op);

    assert_eq!(
        rejection(&report),
        format!("token design for contract account {C} already exists")
    );
    assert_eq!(node.design().policy().total_supply(), Amount::from(100));
}

#[test]
fn test_mint_raises_supply() {
    let mut node = registered();
    let op = node.mint(R, 50);

    assert_accepted(&node.apply(op));

    assert_eq!(node.design().policy().total_supply(), Amount::from(150));
    assert_eq!(node.balance(R), Some(Amount::from(50)));
    assert_eq!(node.balance(S), Some(Amount::from(100)));
}

#[test]
fn test_burn_lowers_supply_and_rejects_overdraw() {
    let mut node = registered();
    let op = node.mint(R, 50);
    node.apply(op);

    let op = node.burn(S, 30);
    assert_accepted(&node.apply(op));
    assert_eq!(node.design().policy().total_supply(), Amount::from(120));
    assert_eq!(node.balance(S), Some(Amount::from(70)));

    let op = node.burn(S, 200);
    let report = node.apply(op);
    assert_eq!(
        rejection(&report),
        format!(
            "token balance of target {S} is less than amount to burn in contract account {C}, 70 < 200"
        )
    );
    assert_eq!(node.balance(S), Some(Amount::from(70)));
    assert_eq!(node.design().policy().total_supply(), Amount::from(120));
}

#[test]
fn test_approve_then_transfer_from_spends_allowance() {
    let mut node = registered();
    let op = node.approve(S, X, 40);
    assert_accepted(&node.apply(op));
    assert_eq!(node.allowance(S, X), Some(Amount::from(40)));

    let op = node.transfer_from(X, S, Y, 40);
    assert_accepted(&node.apply(op));

    assert_eq!(node.balance(S), Some(Amount::from(60)));
    assert_eq!(node.balance(Y), Some(Amount::from(40)));
    assert_eq!(node.allowance(S, X), None);
}

#[test]
fn test_approve_is_cumulative_and_zero_revokes() {
    let mut node = registered();
    for amount in [10, 15] {
        let op = node.approve(S, X, amount);
        assert_accepted(&node.apply(op));
    }
    assert_eq!(node.allowance(S, X), Some(Amount::from(25)));

    let op = node.approve(S, X, 0);
    assert_accepted(&node.apply(op));
    assert_eq!(node.allowance(S, X), None);

    let op = node.approve(S, X, 0);
    let report = node.apply(op);
    assert_eq!(rejection(&report), format!("approved account {X} has not been approved"));
}

#[test]
fn test_transfer_from_over_allowance_rejected() {
    let mut node = registered();
    let op = node.approve(S, X, 40);
    node.apply(op);

    let op = node.transfer_from(X, S, Y, 41);
    let report = node.apply(op);

    assert_eq!(
        rejection(&report),
        format!(
            "approved amount of sender {X} is less than amount to transfer in contract account {C}, 40 < 41"
        )
    );
    assert_eq!(node.balance(S), Some(Amount::from(100)));
    assert_eq!(node.balance(Y), None);
    assert_eq!(node.allowance(S, X), Some(Amount::from(40)));
}

#[test]
fn test_transfer_moves_balance() {
    let mut node = registered();
    let op = node.transfer(S, &[(R, 30), (Y, 20)]);

    assert_accepted(&node.apply(op));

    assert_eq!(node.balance(S), Some(Amount::from(50)));
    assert_eq!(node.balance(R), Some(Amount::from(30)));
    assert_eq!(node.balance(Y), Some(Amount::from(20)));
    assert_eq!(node.design().policy().total_supply(), Amount::from(100));
}

#[test]
fn test_duplicate_transfer_items_fail_validation() {
    let mut node = registered();
    let op = node.transfer(S, &[(R, 1), (R, 2)]);

    assert!(matches!(op.is_valid(), Err(ValidationError::DuplicateValue(_))));
    let report = node.apply(op);
    assert!(rejection(&report).starts_with("invalid fact"));
}

#[test]
fn test_transfers_from_two_senders_in_one_block() {
    let mut node = registered();
    let op = node.transfer(S, &[(R, 40)]);
    node.apply(op);

    let a = node.transfer(S, &[(Y, 10)]);
    let b = node.transfer(R, &[(Y, 15)]);
    assert_accepted(&node.block(vec![a, b]));

    assert_eq!(node.balance(Y), Some(Amount::from(25)));
    assert_eq!(node.balance(S), Some(Amount::from(50)));
    assert_eq!(node.balance(R), Some(Amount::from(25)));
}

#[test]
fn test_digest_follows_commits() {
    let mut node = registered();
    let op = node.mint(R, 7);
    node.apply(op);

    assert_eq!(node.digest.balance(&C, &R), Some(Amount::from(7)));
    assert_eq!(
        node.digest.design(&C).unwrap().policy().total_supply(),
        Amount::from(107)
    );
    assert_eq!(node.digest.contracts(), vec![C]);
}
