//! End-to-end session journeys through the public API.

use std::collections::HashSet;
use std::sync::Arc;

use command_hub_core::{
    AssistOracle, Catalog, Error, ExecutionPlan, ExecutionResult, InMemoryCatalog, IntentHandler,
    IntentRegistry, NoopBoundary, NullOracle, Partner, Product, ProductKind, RecordRef, Result,
    RiskLevel, SlotMap, SlotValue, UserContext,
};
use command_hub_dialogue::{QuestionGenerator, SessionConfig, SessionManager, SessionState};
use command_hub_gateway::{ExecutionGateway, HandlerRegistry};
use command_hub_nlu::{
    ExtractorConfig, IntentResolver, ResolverConfig, SlotExtractor, SlotFiller,
    StockableProductRule,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "command_hub=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

struct SaleHandler;

impl IntentHandler for SaleHandler {
    fn validate(&self, slots: &SlotMap) -> Result<()> {
        if !slots.contains_key("partner") {
            return Err(Error::validation("customer is required"));
        }
        if !slots.contains_key("product_lines") {
            return Err(Error::validation("at least one product line is required"));
        }
        Ok(())
    }

    fn simulate(&self, slots: &SlotMap) -> Result<ExecutionPlan> {
        let lines = slots
            .get("product_lines")
            .and_then(|v| v.as_lines())
            .map(|l| l.len())
            .unwrap_or(0);
        Ok(ExecutionPlan {
            action: "sale_create".into(),
            summary: format!("Create sale order with {} line(s)", lines),
            steps: vec!["create draft order".into(), "confirm order".into()],
            risk_level: RiskLevel::Medium,
            warning: None,
        })
    }

    fn execute(&self, _slots: &SlotMap) -> Result<ExecutionResult> {
        Ok(ExecutionResult::ok("Sale order S00042 created")
            .with_created(RecordRef::new("sale.order", 42, "S00042")))
    }
}

struct InventoryHandler;

impl IntentHandler for InventoryHandler {
    fn validate(&self, slots: &SlotMap) -> Result<()> {
        if !slots.contains_key("product") {
            return Err(Error::validation("product is required"));
        }
        Ok(())
    }

    fn simulate(&self, _slots: &SlotMap) -> Result<ExecutionPlan> {
        Ok(ExecutionPlan {
            action: "inventory_adjust".into(),
            summary: "Adjust on-hand quantity".into(),
            steps: vec!["apply quantity delta".into()],
            risk_level: RiskLevel::High,
            warning: Some("This changes stock levels.".into()),
        })
    }

    fn execute(&self, _slots: &SlotMap) -> Result<ExecutionResult> {
        Ok(ExecutionResult::ok("Inventory adjusted"))
    }
}

fn manager() -> SessionManager {
    init_tracing();

    let registry = IntentRegistry::builtin();
    let catalog: Arc<dyn Catalog> = Arc::new(InMemoryCatalog::new(
        vec![
            Partner::new(1, "John Smith"),
            Partner::new(2, "Acme Corporation").with_email("billing@acme.example"),
        ],
        vec![
            Product::new(10, "Apples", ProductKind::Stockable),
            Product::new(11, "Chocolate", ProductKind::Consumable),
            Product::new(12, "Oranges", ProductKind::Stockable),
        ],
    ));
    let oracle: Arc<dyn AssistOracle> = Arc::new(NullOracle);

    let filler = SlotFiller::new(
        IntentResolver::new(registry.clone(), oracle.clone(), ResolverConfig::default()),
        SlotExtractor::new(catalog, ExtractorConfig::default()),
        oracle.clone(),
        vec![Box::new(StockableProductRule::default())],
    );

    let mut handlers = HandlerRegistry::new();
    handlers.register("sale_create", Arc::new(SaleHandler));
    handlers.register("inventory_adjust", Arc::new(InventoryHandler));

    let modules: HashSet<String> = ["sale", "purchase", "stock", "crm", "account"]
        .into_iter()
        .map(String::from)
        .collect();
    let gateway = ExecutionGateway::new(registry, handlers, Arc::new(NoopBoundary), modules);

    SessionManager::new(
        filler,
        gateway,
        QuestionGenerator::new(oracle),
        SessionConfig::default(),
    )
}

fn user() -> UserContext {
    UserContext::new("demo").with_groups(&["sales_user", "stock_user"])
}

#[test]
fn sale_journey_parse_simulate_confirm_execute() {
    let manager = manager();
    let id = manager.create("sell 5 apples to John", true, user());

    manager.parse(id).unwrap();
    let session = manager.snapshot(id).unwrap();
    assert_eq!(session.state, SessionState::Ready);
    assert_eq!(session.intent_key.as_deref(), Some("sale_create"));
    assert!(session.confirmation_required);

    manager.simulate(id).unwrap();
    let plan = manager.snapshot(id).unwrap().execution_plan.unwrap();
    assert_eq!(plan.summary, "Create sale order with 1 line(s)");

    assert_eq!(manager.execute(id).unwrap_err(), Error::ConfirmationRequired);

    manager.confirm(id).unwrap();
    manager.execute(id).unwrap();
    let session = manager.snapshot(id).unwrap();
    assert_eq!(session.state, SessionState::Executed);
    assert_eq!(
        session.execution_result.unwrap().created_records[0].name,
        "S00042"
    );
}

#[test]
fn collecting_journey_fills_slots_until_ready() {
    let manager = manager();
    let id = manager.create("create a sale order", true, user());

    manager.parse(id).unwrap();
    let next = manager.next_question(id).unwrap().unwrap();
    assert_eq!(next.slot, "partner");

    manager
        .fill_slot(id, "partner", SlotValue::reference(2, "Acme Corporation"))
        .unwrap();
    let next = manager.next_question(id).unwrap().unwrap();
    assert_eq!(next.slot, "product_lines");

    manager
        .fill_slot(
            id,
            "product_lines",
            SlotValue::lines(vec![command_hub_core::LineItem {
                product_id: 10,
                product_name: "Apples".into(),
                qty: 3.0,
                uom: None,
            }]),
        )
        .unwrap();
    assert_eq!(manager.snapshot(id).unwrap().state, SessionState::Ready);

    manager.confirm(id).unwrap();
    manager.execute(id).unwrap();
    assert_eq!(manager.snapshot(id).unwrap().state, SessionState::Executed);
}

#[test]
fn consumable_product_journey_recovers_via_fill() {
    let manager = manager();
    let id = manager.create("increase chocolate stock by 200", true, user());

    let err = manager.parse(id).unwrap_err();
    let Error::NeedsClarification { slot, question, .. } = err else {
        panic!("expected clarification, got {:?}", err);
    };
    assert_eq!(slot, "product");
    assert!(question.contains("Apples"));

    manager
        .fill_slot(id, "product", SlotValue::reference(10, "Apples"))
        .unwrap();
    let session = manager.snapshot(id).unwrap();
    assert_eq!(session.state, SessionState::Ready);
    assert_eq!(session.slots["qty_delta"], SlotValue::number(200.0));

    manager.confirm(id).unwrap();
    manager.execute(id).unwrap();
    assert_eq!(manager.snapshot(id).unwrap().state, SessionState::Executed);
}

#[test]
fn access_denied_user_cannot_execute() {
    let manager = manager();
    let stranger = UserContext::new("stranger");
    let id = manager.create("sell 5 apples to John", true, stranger);

    manager.parse(id).unwrap();
    manager.confirm(id).unwrap();
    let err = manager.execute(id).unwrap_err();
    assert!(matches!(err, Error::AccessDenied { .. }));

    // Routing failure is an execution failure: the session aborts.
    let session = manager.snapshot(id).unwrap();
    assert_eq!(session.state, SessionState::Aborted);
    assert!(session.error_message.is_some());
}
