//! Budget planner.
//!
//! Income and expense categories with derived totals, the savings-goal
//! progress bar and the snapshot written under [`BUDGET_SNAPSHOT_KEY`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FinbotError, Result};
use crate::responder::ChoiceSource;
use crate::snapshot::SnapshotStore;

/// Store key of the budget snapshot.
pub const BUDGET_SNAPSHOT_KEY: &str = "fingenius-budget";

/// Colours handed out to new categories.
pub const COLOR_PALETTE: [&str; 10] = [
    "#4ade80", "#60a5fa", "#f87171", "#fbbf24", "#a78bfa", "#34d399", "#9ca3af", "#fb923c",
    "#38bdf8", "#fb7185",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    Expense,
}

impl std::str::FromStr for CategoryKind {
    type Err = FinbotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(FinbotError::validation(format!(
                "unknown category type '{}', expected income or expense",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
}

impl BudgetCategory {
    fn seed(id: &str, name: &str, amount: f64, color: &str, kind: CategoryKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            amount,
            color: color.to_string(),
            kind,
        }
    }
}

/// One category's share of its kind's total.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub name: String,
    pub amount: f64,
    pub percent: f64,
}

/// A monthly budget: categories plus a savings goal. Totals are always derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPlan {
    pub categories: Vec<BudgetCategory>,
    pub savings_goal: f64,
}

impl Default for BudgetPlan {
    fn default() -> Self {
        use CategoryKind::{Expense, Income};
        Self {
            categories: vec![
                BudgetCategory::seed("1", "Allowance", 50.0, "#4ade80", Income),
                BudgetCategory::seed("2", "Side Jobs", 30.0, "#60a5fa", Income),
                BudgetCategory::seed("3", "Entertainment", 20.0, "#f87171", Expense),
                BudgetCategory::seed("4", "Food", 15.0, "#fbbf24", Expense),
                BudgetCategory::seed("5", "Savings", 25.0, "#a78bfa", Expense),
                BudgetCategory::seed("6", "Clothes", 10.0, "#34d399", Expense),
                BudgetCategory::seed("7", "Other", 5.0, "#9ca3af", Expense),
            ],
            savings_goal: 25.0,
        }
    }
}

/// Serialized form written to the snapshot store; includes the derived totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSnapshot {
    pub categories: Vec<BudgetCategory>,
    pub total_income: f64,
    pub total_expenses: f64,
    pub savings_goal: f64,
}

impl BudgetPlan {
    pub fn empty(savings_goal: f64) -> Self {
        Self {
            categories: Vec::new(),
            savings_goal,
        }
    }

    /// Adds a category. Names must be non-blank and amounts finite and positive.
    pub fn add_category(
        &mut self,
        name: &str,
        amount: f64,
        kind: CategoryKind,
        colors: &dyn ChoiceSource,
    ) -> Result<&BudgetCategory> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FinbotError::validation("category name is required"));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(FinbotError::validation(format!(
                "category amount must be positive, got {}",
                amount
            )));
        }

        let color = COLOR_PALETTE[colors.choose(COLOR_PALETTE.len()) % COLOR_PALETTE.len()];
        self.categories.push(BudgetCategory {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            amount,
            color: color.to_string(),
            kind,
        });
        Ok(&self.categories[self.categories.len() - 1])
    }

    pub fn remove_category(&mut self, id: &str) -> Result<BudgetCategory> {
        let index = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| FinbotError::not_found("budget category", id))?;
        Ok(self.categories.remove(index))
    }

    pub fn set_savings_goal(&mut self, goal: f64) -> Result<()> {
        if !goal.is_finite() || goal < 0.0 {
            return Err(FinbotError::validation(format!(
                "savings goal must be zero or positive, got {}",
                goal
            )));
        }
        self.savings_goal = goal;
        Ok(())
    }

    fn total_of(&self, kind: CategoryKind) -> f64 {
        self.categories
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.amount)
            .sum()
    }

    pub fn total_income(&self) -> f64 {
        self.total_of(CategoryKind::Income)
    }

    pub fn total_expenses(&self) -> f64 {
        self.total_of(CategoryKind::Expense)
    }

    pub fn balance(&self) -> f64 {
        self.total_income() - self.total_expenses()
    }

    /// Balance as a percentage of the savings goal, clamped to `0..=100`.
    ///
    /// A goal of zero reports no progress.
    pub fn savings_progress(&self) -> f64 {
        if self.savings_goal <= 0.0 {
            return 0.0;
        }
        (self.balance() / self.savings_goal * 100.0).clamp(0.0, 100.0)
    }

    /// How much is still missing to reach the goal (never negative).
    pub fn remaining_to_goal(&self) -> f64 {
        (self.savings_goal - self.balance()).max(0.0)
    }

    /// Per-category percentage of the total for `kind`, in category order.
    pub fn category_shares(&self, kind: CategoryKind) -> Vec<CategoryShare> {
        let total = self.total_of(kind);
        self.categories
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| CategoryShare {
                name: c.name.clone(),
                amount: c.amount,
                percent: if total > 0.0 {
                    c.amount / total * 100.0
                } else {
                    0.0
                },
            })
            .collect()
    }

    pub fn snapshot(&self) -> BudgetSnapshot {
        BudgetSnapshot {
            categories: self.categories.clone(),
            total_income: self.total_income(),
            total_expenses: self.total_expenses(),
            savings_goal: self.savings_goal,
        }
    }

    /// Serializes the snapshot as JSON and writes it under [`BUDGET_SNAPSHOT_KEY`].
    pub async fn save(&self, store: &dyn SnapshotStore) -> Result<()> {
        let json = serde_json::to_string(&self.snapshot())?;
        store.put(BUDGET_SNAPSHOT_KEY, &json).await?;
        tracing::info!(
            categories = self.categories.len(),
            "Saved budget snapshot"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::FixedChoice;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        values: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl SnapshotStore for MemoryStore {
        async fn put(&self, key: &str, value: &str) -> Result<()> {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }
    }

    #[test]
    fn test_default_totals() {
        let plan = BudgetPlan::default();
        assert_eq!(plan.total_income(), 80.0);
        assert_eq!(plan.total_expenses(), 75.0);
        assert_eq!(plan.balance(), 5.0);
        assert_eq!(plan.savings_progress(), 20.0);
        assert_eq!(plan.remaining_to_goal(), 20.0);
    }

    #[test]
    fn test_add_category_updates_totals() {
        let mut plan = BudgetPlan::default();
        let added = plan
            .add_category("  Tutoring ", 40.0, CategoryKind::Income, &FixedChoice(3))
            .unwrap();
        assert_eq!(added.name, "Tutoring");
        assert_eq!(added.color, COLOR_PALETTE[3]);

        assert_eq!(plan.total_income(), 120.0);
        assert_eq!(plan.savings_progress(), 100.0);
        assert_eq!(plan.remaining_to_goal(), 0.0);
    }

    #[test]
    fn test_add_category_validation() {
        let mut plan = BudgetPlan::default();
        let colors = FixedChoice(0);
        assert!(plan.add_category("", 5.0, CategoryKind::Expense, &colors).is_err());
        assert!(plan.add_category("Snacks", 0.0, CategoryKind::Expense, &colors).is_err());
        assert!(plan.add_category("Snacks", -3.0, CategoryKind::Expense, &colors).is_err());
        assert!(plan.add_category("Snacks", f64::NAN, CategoryKind::Expense, &colors).is_err());
        assert_eq!(plan.categories.len(), 7);
    }

    #[test]
    fn test_remove_category() {
        let mut plan = BudgetPlan::default();
        let removed = plan.remove_category("3").unwrap();
        assert_eq!(removed.name, "Entertainment");
        assert_eq!(plan.total_expenses(), 55.0);
        assert!(plan.remove_category("3").unwrap_err().is_not_found());
    }

    #[test]
    fn test_progress_edge_cases() {
        let mut plan = BudgetPlan::empty(0.0);
        assert_eq!(plan.savings_progress(), 0.0);

        plan.set_savings_goal(50.0).unwrap();
        plan.add_category("Rent", 10.0, CategoryKind::Expense, &FixedChoice(0))
            .unwrap();
        assert_eq!(plan.balance(), -10.0);
        assert_eq!(plan.savings_progress(), 0.0);
        assert_eq!(plan.remaining_to_goal(), 60.0);

        assert!(plan.set_savings_goal(-1.0).is_err());
    }

    #[test]
    fn test_category_shares() {
        let plan = BudgetPlan::default();
        let shares = plan.category_shares(CategoryKind::Income);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].name, "Allowance");
        assert_eq!(shares[0].percent, 62.5);
        assert_eq!(shares[1].percent, 37.5);

        assert!(BudgetPlan::empty(0.0).category_shares(CategoryKind::Expense).is_empty());
    }

    #[test]
    fn test_category_kind_from_str() {
        assert_eq!("Income".parse::<CategoryKind>().unwrap(), CategoryKind::Income);
        assert_eq!("expense".parse::<CategoryKind>().unwrap(), CategoryKind::Expense);
        assert!("gift".parse::<CategoryKind>().is_err());
    }

    #[tokio::test]
    async fn test_save_writes_camel_case_snapshot() {
        let store = MemoryStore::default();
        BudgetPlan::default().save(&store).await.unwrap();

        let json = store.get(BUDGET_SNAPSHOT_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["totalIncome"], 80.0);
        assert_eq!(value["totalExpenses"], 75.0);
        assert_eq!(value["savingsGoal"], 25.0);
        assert_eq!(value["categories"][0]["type"], "income");
    }
}
