use std::sync::Arc;
use std::time::Duration;

use finbot_application::{FinanceService, SessionController};
use finbot_core::config::FinbotConfig;
use finbot_core::finance::{BUDGET_SNAPSHOT_KEY, CategoryKind};
use finbot_core::responder::{FixedChoice, Resolver};
use finbot_core::session::{GREETING_MESSAGE, MessageRole};
use finbot_core::snapshot::SnapshotStore;
use finbot_infrastructure::{ConfigService, JsonFileSnapshotStore, load_tables};
use tempfile::TempDir;

const TABLES: &str = r#"
[[glossary]]
term = "apr"
definition = "Annual percentage rate."

[[scenarios]]
scenario = "pocket_money"
advice = "Split your pocket money into spend, save and share."

[[keywords]]
keyword = "piggy"
candidates = ["Feed the piggy bank first.", "A piggy bank is a fine start."]

[replies]
greeting = "Ahoy!"
clarification = "It depends."
decision = "Sleep on it."
fallback = "No idea, sorry."
"#;

fn write_config(dir: &TempDir) -> ConfigService {
    let tables_path = dir.path().join("tables.toml");
    std::fs::write(&tables_path, TABLES).unwrap();

    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            "typing_delay_ms = 250\ntables_path = {:?}\n",
            tables_path.to_string_lossy()
        ),
    )
    .unwrap();
    ConfigService::with_path(config_path)
}

#[tokio::test(start_paused = true)]
async fn test_configured_tables_drive_the_conversation() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir).get_config().expect("Should load config");
    assert_eq!(config.typing_delay(), Duration::from_millis(250));

    let tables = Arc::new(load_tables(&config).expect("Should load tables"));
    let resolver = Resolver::new(tables, Arc::new(FixedChoice(1)));
    let controller = SessionController::from_config(resolver, &config);

    let inputs = [
        "What is APR?",
        "tips for pocket money",
        "my piggy is full",
        "hey there",
        "how much should I keep?",
        "should I buy a bike?",
        "zzz",
    ];
    let mut pending = Vec::new();
    for input in inputs {
        pending.push(controller.submit(input).await.unwrap().unwrap());
    }
    for reply in pending {
        reply.wait().await.unwrap();
    }

    let messages = controller.messages().await;
    assert_eq!(messages.len(), 1 + inputs.len() * 2);
    assert_eq!(messages[0].content, GREETING_MESSAGE);

    // User messages are appended at submit time, replies follow in order
    let users: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == MessageRole::User)
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(users, inputs);

    let replies: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == MessageRole::Assistant)
        .skip(1)
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(
        replies,
        [
            "APR: Annual percentage rate.",
            "Split your pocket money into spend, save and share.",
            "A piggy bank is a fine start.",
            "Ahoy!",
            "It depends.",
            "Sleep on it.",
            "No idea, sorry.",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_composing_flag_follows_pending_replies() {
    let controller = SessionController::new(Resolver::builtin(), Duration::from_millis(1000));
    let mut composing = controller.subscribe_composing();
    assert_eq!(*composing.borrow_and_update(), 0);

    let reply = controller.submit("hello").await.unwrap().unwrap();
    assert!(controller.is_composing());

    reply.wait().await.unwrap();
    composing.wait_for(|n| *n == 0).await.unwrap();
    assert!(!controller.is_composing());
}

#[tokio::test]
async fn test_saved_budget_lands_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileSnapshotStore::new(temp_dir.path()));
    let finance = FinanceService::new(store.clone(), Arc::new(FixedChoice(0)));

    finance
        .add_budget_category("Dog walking", 20.0, CategoryKind::Income)
        .await
        .unwrap();
    finance.set_savings_goal(40.0).await.unwrap();
    finance.save_budget().await.expect("Should save budget");

    let raw = store
        .get(BUDGET_SNAPSHOT_KEY)
        .await
        .unwrap()
        .expect("Snapshot should exist");
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["totalIncome"], 100.0);
    assert_eq!(json["totalExpenses"], 75.0);
    assert_eq!(json["savingsGoal"], 40.0);
    assert_eq!(json["categories"].as_array().unwrap().len(), 8);
    assert_eq!(json["categories"][7]["type"], "income");
}

#[test]
fn test_default_config_uses_builtin_tables() {
    let tables = load_tables(&FinbotConfig::default()).unwrap();
    assert!(tables.keywords.get("save").is_some());
    assert_eq!(FinbotConfig::default().typing_delay(), Duration::from_millis(1000));
}
