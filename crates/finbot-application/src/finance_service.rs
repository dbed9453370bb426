//! Money tools shared by the front end.
//!
//! Wraps the budget planner, goal tracker, transaction ledger and wallet behind
//! async locks and wires the budget to its snapshot store.

use chrono::{Local, NaiveDate};
use finbot_core::error::Result;
use finbot_core::finance::{
    BudgetCategory, BudgetPlan, CategoryKind, Contribution, EntryEdit, EntryFilter, GoalTracker,
    LedgerEntry, NewEntry, TransactionLedger, Wallet, WalletTransaction,
};
use finbot_core::responder::ChoiceSource;
use finbot_core::snapshot::SnapshotStore;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Session-scoped state of the money tools. Nothing here outlives the process
/// except the budget snapshot.
pub struct FinanceService {
    budget: RwLock<BudgetPlan>,
    goals: RwLock<GoalTracker>,
    ledger: RwLock<TransactionLedger>,
    wallet: RwLock<Wallet>,
    store: Arc<dyn SnapshotStore>,
    colors: Arc<dyn ChoiceSource>,
}

impl FinanceService {
    /// Starts from the starter budget, goals, sample transactions and wallet.
    pub fn new(store: Arc<dyn SnapshotStore>, colors: Arc<dyn ChoiceSource>) -> Self {
        Self {
            budget: RwLock::new(BudgetPlan::default()),
            goals: RwLock::new(GoalTracker::starter()),
            ledger: RwLock::new(TransactionLedger::default()),
            wallet: RwLock::new(Wallet::default()),
            store,
            colors,
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub async fn budget(&self) -> BudgetPlan {
        self.budget.read().await.clone()
    }

    pub async fn add_budget_category(
        &self,
        name: &str,
        amount: f64,
        kind: CategoryKind,
    ) -> Result<BudgetCategory> {
        let mut budget = self.budget.write().await;
        let category = budget
            .add_category(name, amount, kind, self.colors.as_ref())?
            .clone();
        tracing::debug!(name = %category.name, amount, "Added budget category");
        Ok(category)
    }

    pub async fn remove_budget_category(&self, id: &str) -> Result<BudgetCategory> {
        self.budget.write().await.remove_category(id)
    }

    pub async fn set_savings_goal(&self, goal: f64) -> Result<()> {
        self.budget.write().await.set_savings_goal(goal)
    }

    /// Writes the budget snapshot.
    pub async fn save_budget(&self) -> Result<()> {
        let budget = self.budget.read().await.clone();
        budget.save(self.store.as_ref()).await
    }

    pub async fn goals(&self) -> GoalTracker {
        self.goals.read().await.clone()
    }

    pub async fn contribute_to_goal(&self, id: &str, amount: f64) -> Result<Contribution> {
        let contribution = self
            .goals
            .write()
            .await
            .contribute(id, amount, Self::today())?;
        if contribution.just_completed {
            tracing::info!(goal = id, "Savings goal completed");
        }
        Ok(contribution)
    }

    pub async fn ledger(&self) -> TransactionLedger {
        self.ledger.read().await.clone()
    }

    /// Matching transactions, newest first.
    pub async fn transactions(&self, filter: &EntryFilter) -> Vec<LedgerEntry> {
        self.ledger
            .read()
            .await
            .filtered(filter)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Records a transaction dated `date`, or today when `None`.
    pub async fn add_transaction(
        &self,
        kind: CategoryKind,
        amount: f64,
        category: &str,
        description: &str,
        date: Option<NaiveDate>,
    ) -> Result<LedgerEntry> {
        let entry = self
            .ledger
            .write()
            .await
            .add(NewEntry {
                date: date.unwrap_or_else(Self::today),
                amount,
                description: description.to_string(),
                category: category.to_string(),
                kind,
            })?
            .clone();
        tracing::debug!(id = %entry.id, amount, "Added transaction");
        Ok(entry)
    }

    pub async fn edit_transaction(&self, id: &str, edit: EntryEdit) -> Result<LedgerEntry> {
        Ok(self.ledger.write().await.edit(id, edit)?.clone())
    }

    pub async fn remove_transaction(&self, id: &str) -> Result<LedgerEntry> {
        self.ledger.write().await.remove(id)
    }

    pub async fn wallet(&self) -> Wallet {
        self.wallet.read().await.clone()
    }

    pub async fn add_money(&self, amount: f64) -> Result<WalletTransaction> {
        let mut wallet = self.wallet.write().await;
        Ok(wallet.add_money(amount, Self::today())?.clone())
    }

    pub async fn send_money(&self, amount: f64, recipient: &str) -> Result<WalletTransaction> {
        let mut wallet = self.wallet.write().await;
        Ok(wallet.send_money(amount, recipient, Self::today())?.clone())
    }

    pub async fn transfer_to_savings(&self, amount: f64) -> Result<WalletTransaction> {
        let mut wallet = self.wallet.write().await;
        Ok(wallet.transfer_to_savings(amount, Self::today())?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finbot_core::finance::BUDGET_SNAPSHOT_KEY;
    use finbot_core::responder::FixedChoice;
    use finbot_infrastructure::InMemorySnapshotStore;

    fn service() -> (FinanceService, Arc<InMemorySnapshotStore>) {
        let store = Arc::new(InMemorySnapshotStore::new());
        let service = FinanceService::new(store.clone(), Arc::new(FixedChoice(0)));
        (service, store)
    }

    #[tokio::test]
    async fn test_budget_save_writes_snapshot() {
        let (service, store) = service();
        service
            .add_budget_category("Tutoring", 20.0, CategoryKind::Income)
            .await
            .unwrap();
        service.save_budget().await.unwrap();

        let json = store.get(BUDGET_SNAPSHOT_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["totalIncome"], 100.0);
    }

    #[tokio::test]
    async fn test_wallet_operations() {
        let (service, _) = service();
        service.add_money(10.0).await.unwrap();
        service.send_money(60.0, "Alex").await.unwrap();
        service.transfer_to_savings(100.0).await.unwrap();

        let wallet = service.wallet().await;
        assert_eq!(wallet.balance(), 100.0);
        assert_eq!(wallet.savings(), 250.0);
        assert_eq!(wallet.transactions().len(), 8);
        assert!(service.send_money(500.0, "Alex").await.is_err());
    }

    #[tokio::test]
    async fn test_transaction_ledger() {
        let (service, _) = service();
        let entry = service
            .add_transaction(CategoryKind::Expense, 4.5, "Food", "Snack", None)
            .await
            .unwrap();
        assert_eq!(entry.date, FinanceService::today());

        let food = service
            .transactions(&EntryFilter {
                category: Some("Food".to_string()),
                ..Default::default()
            })
            .await;
        // Today's snack sorts before the sample lunch
        assert_eq!(food.len(), 2);
        assert_eq!(food[0].id, entry.id);

        let edited = service
            .edit_transaction(&entry.id, EntryEdit::Amount(5.5))
            .await
            .unwrap();
        assert_eq!(edited.amount, 5.5);
        assert!(service
            .add_transaction(CategoryKind::Income, 3.0, "Gifts", "  ", None)
            .await
            .unwrap_err()
            .is_validation());

        service.remove_transaction(&entry.id).await.unwrap();
        assert_eq!(service.ledger().await.entries().len(), 7);
    }

    #[tokio::test]
    async fn test_goal_contribution() {
        let (service, _) = service();
        let outcome = service.contribute_to_goal("1", 250.0).await.unwrap();
        assert!(outcome.just_completed);
        assert_eq!(service.goals().await.completed().len(), 2);
        assert!(service.contribute_to_goal("nope", 1.0).await.is_err());
    }
}
