//! In-memory money tools: budget planner, savings goals, a transaction ledger
//! and a simulated wallet.

pub mod budget;
pub mod goal;
pub mod transactions;
pub mod wallet;

pub use budget::{
    BUDGET_SNAPSHOT_KEY, BudgetCategory, BudgetPlan, BudgetSnapshot, CategoryKind, CategoryShare,
};
pub use goal::{CategorySummary, Contribution, GoalTracker, NewGoal, ProgressBand, SavingsGoal};
pub use transactions::{
    CategoryTotal, DailyTotals, EXPENSE_CATEGORIES, EntryEdit, EntryFilter, INCOME_CATEGORIES,
    LedgerEntry, NewEntry, TransactionLedger,
};
pub use wallet::{TransactionKind, Wallet, WalletTransaction};
