//! Income and expense transaction ledger.
//!
//! Entries are kept in insertion order; listings come out newest first.
//! Totals are always derived from the entries.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::budget::CategoryKind;
use crate::error::{FinbotError, Result};

/// Categories offered for income entries.
pub const INCOME_CATEGORIES: &[&str] = &["Allowance", "Side Jobs", "Gifts", "Other Income"];

/// Categories offered for expense entries.
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Food",
    "Entertainment",
    "Clothes",
    "Education",
    "Savings",
    "Transportation",
    "Gifts",
    "Other",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub date: NaiveDate,
    /// Always positive; `kind` says which way the money went.
    pub amount: f64,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
}

/// Input for a new entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub date: NaiveDate,
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub kind: CategoryKind,
}

/// A change to one field of an existing entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryEdit {
    Date(NaiveDate),
    Amount(f64),
    Description(String),
    Category(String),
    Kind(CategoryKind),
}

/// Listing filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    pub kind: Option<CategoryKind>,
    /// Exact category name.
    pub category: Option<String>,
    /// Inclusive.
    pub date_from: Option<NaiveDate>,
    /// Inclusive.
    pub date_to: Option<NaiveDate>,
    /// Case-insensitive substring of the description or the category.
    pub search: Option<String>,
}

impl EntryFilter {
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        if self.kind.is_some_and(|kind| entry.kind != kind) {
            return false;
        }
        if self.category.as_ref().is_some_and(|c| &entry.category != c) {
            return false;
        }
        if self.date_from.is_some_and(|from| entry.date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| entry.date > to) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                entry.description.to_lowercase().contains(&term)
                    || entry.category.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

/// Income and expense booked on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub income: f64,
    pub expense: f64,
}

fn check_entry(amount: f64, description: &str, category: &str) -> Result<()> {
    if description.is_empty() {
        return Err(FinbotError::validation("transaction description is required"));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(FinbotError::validation(format!(
            "transaction amount must be positive, got {}",
            amount
        )));
    }
    if category.is_empty() {
        return Err(FinbotError::validation("transaction category is required"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLedger {
    entries: Vec<LedgerEntry>,
}

impl Default for TransactionLedger {
    /// The seven sample transactions of the first week of May 2025.
    fn default() -> Self {
        use CategoryKind::{Expense, Income};
        let seed = |id: &str, day, amount, description: &str, category: &str, kind| LedgerEntry {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 5, day).unwrap_or_default(),
            amount,
            description: description.to_string(),
            category: category.to_string(),
            kind,
        };
        Self::new(vec![
            seed("1", 1, 50.0, "Weekly Allowance", "Allowance", Income),
            seed("2", 2, 15.0, "Movie Tickets", "Entertainment", Expense),
            seed("3", 3, 8.5, "Lunch", "Food", Expense),
            seed("4", 4, 20.0, "Babysitting", "Side Jobs", Income),
            seed("5", 5, 25.0, "Savings Deposit", "Savings", Expense),
            seed("6", 6, 12.99, "Book", "Education", Expense),
            seed("7", 7, 30.0, "Birthday Gift", "Gifts", Income),
        ])
    }
}

impl TransactionLedger {
    pub fn new(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Result<&LedgerEntry> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| FinbotError::not_found("transaction", id))
    }

    /// Records an entry. Description, category and a positive amount are required.
    pub fn add(&mut self, new_entry: NewEntry) -> Result<&LedgerEntry> {
        let description = new_entry.description.trim();
        let category = new_entry.category.trim();
        check_entry(new_entry.amount, description, category)?;

        self.entries.push(LedgerEntry {
            id: Uuid::new_v4().to_string(),
            date: new_entry.date,
            amount: new_entry.amount,
            description: description.to_string(),
            category: category.to_string(),
            kind: new_entry.kind,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Replaces the entry with the same id, under the same rules as `add`.
    pub fn update(&mut self, mut entry: LedgerEntry) -> Result<()> {
        entry.description = entry.description.trim().to_string();
        entry.category = entry.category.trim().to_string();
        check_entry(entry.amount, &entry.description, &entry.category)?;

        let slot = self
            .entries
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| FinbotError::not_found("transaction", &entry.id))?;
        *slot = entry;
        Ok(())
    }

    /// Applies one field change and returns the updated entry.
    pub fn edit(&mut self, id: &str, edit: EntryEdit) -> Result<&LedgerEntry> {
        let mut entry = self.get(id)?.clone();
        match edit {
            EntryEdit::Date(date) => entry.date = date,
            EntryEdit::Amount(amount) => entry.amount = amount,
            EntryEdit::Description(description) => entry.description = description,
            EntryEdit::Category(category) => entry.category = category,
            EntryEdit::Kind(kind) => entry.kind = kind,
        }
        self.update(entry)?;
        self.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Result<LedgerEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| FinbotError::not_found("transaction", id))?;
        Ok(self.entries.remove(index))
    }

    /// Entries matching `filter`, newest first. Same-day entries keep insertion order.
    pub fn filtered(&self, filter: &EntryFilter) -> Vec<&LedgerEntry> {
        let mut hits: Vec<&LedgerEntry> =
            self.entries.iter().filter(|e| filter.matches(e)).collect();
        hits.sort_by(|a, b| b.date.cmp(&a.date));
        hits
    }

    fn total_of(&self, kind: CategoryKind) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.amount)
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

    /// Expense totals per category, in order of each category's first entry.
    pub fn expenses_by_category(&self) -> Vec<CategoryTotal> {
        let mut totals: Vec<CategoryTotal> = Vec::new();
        for entry in self.entries.iter().filter(|e| e.kind == CategoryKind::Expense) {
            match totals.iter_mut().find(|t| t.category == entry.category) {
                Some(total) => total.amount += entry.amount,
                None => totals.push(CategoryTotal {
                    category: entry.category.clone(),
                    amount: entry.amount,
                }),
            }
        }
        totals
    }

    /// Per-day totals for the `days` days ending with `today`, oldest first.
    pub fn daily_totals(&self, today: NaiveDate, days: u64) -> Vec<DailyTotals> {
        (0..days)
            .rev()
            .filter_map(|back| today.checked_sub_days(Days::new(back)))
            .map(|date| {
                let mut totals = DailyTotals {
                    date,
                    income: 0.0,
                    expense: 0.0,
                };
                for entry in self.entries.iter().filter(|e| e.date == date) {
                    match entry.kind {
                        CategoryKind::Income => totals.income += entry.amount,
                        CategoryKind::Expense => totals.expense += entry.amount,
                    }
                }
                totals
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    fn lunch() -> NewEntry {
        NewEntry {
            date: day(8),
            amount: 6.25,
            description: "  School lunch ".to_string(),
            category: "Food".to_string(),
            kind: CategoryKind::Expense,
        }
    }

    fn ids(entries: &[&LedgerEntry]) -> Vec<String> {
        entries.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn test_sample_totals() {
        let ledger = TransactionLedger::default();
        assert_eq!(ledger.entries().len(), 7);
        assert_eq!(ledger.total_income(), 100.0);
        assert!((ledger.total_expenses() - 61.49).abs() < 1e-9);
        assert!((ledger.balance() - 38.51).abs() < 1e-9);
    }

    #[test]
    fn test_listing_is_newest_first() {
        let ledger = TransactionLedger::default();
        let all = ledger.filtered(&EntryFilter::default());
        assert_eq!(ids(&all), vec!["7", "6", "5", "4", "3", "2", "1"]);
    }

    #[test]
    fn test_filters() {
        let ledger = TransactionLedger::default();

        let income = ledger.filtered(&EntryFilter {
            kind: Some(CategoryKind::Income),
            ..Default::default()
        });
        assert_eq!(ids(&income), vec!["7", "4", "1"]);

        let food = ledger.filtered(&EntryFilter {
            category: Some("Food".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&food), vec!["3"]);

        let range = ledger.filtered(&EntryFilter {
            date_from: Some(day(2)),
            date_to: Some(day(4)),
            ..Default::default()
        });
        assert_eq!(ids(&range), vec!["4", "3", "2"]);

        // Search covers description and category, ignoring case
        let search = ledger.filtered(&EntryFilter {
            search: Some("GIFT".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&search), vec!["7"]);
        let search = ledger.filtered(&EntryFilter {
            search: Some("entertain".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&search), vec!["2"]);

        let combined = ledger.filtered(&EntryFilter {
            kind: Some(CategoryKind::Expense),
            date_from: Some(day(5)),
            search: Some("book".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&combined), vec!["6"]);
    }

    #[test]
    fn test_add_trims_and_validates() {
        let mut ledger = TransactionLedger::new(Vec::new());
        let entry = ledger.add(lunch()).unwrap().clone();
        assert_eq!(entry.description, "School lunch");
        assert_eq!(ledger.total_expenses(), 6.25);

        let blank = NewEntry {
            description: "   ".to_string(),
            ..lunch()
        };
        assert!(ledger.add(blank).unwrap_err().is_validation());
        let zero = NewEntry {
            amount: 0.0,
            ..lunch()
        };
        assert!(ledger.add(zero).unwrap_err().is_validation());
        let nan = NewEntry {
            amount: f64::NAN,
            ..lunch()
        };
        assert!(ledger.add(nan).unwrap_err().is_validation());
        let no_category = NewEntry {
            category: String::new(),
            ..lunch()
        };
        assert!(ledger.add(no_category).unwrap_err().is_validation());
        assert_eq!(ledger.entries().len(), 1);
    }

    #[test]
    fn test_edit_update_remove() {
        let mut ledger = TransactionLedger::default();

        let edited = ledger.edit("3", EntryEdit::Amount(9.0)).unwrap();
        assert_eq!(edited.amount, 9.0);
        ledger
            .edit("3", EntryEdit::Kind(CategoryKind::Income))
            .unwrap();
        assert_eq!(ledger.total_income(), 109.0);

        assert!(ledger
            .edit("3", EntryEdit::Amount(-1.0))
            .unwrap_err()
            .is_validation());
        assert!(ledger
            .edit("3", EntryEdit::Description(" ".to_string()))
            .unwrap_err()
            .is_validation());
        assert_eq!(ledger.get("3").unwrap().amount, 9.0);
        assert!(ledger
            .edit("nope", EntryEdit::Amount(1.0))
            .unwrap_err()
            .is_not_found());

        let removed = ledger.remove("3").unwrap();
        assert_eq!(removed.description, "Lunch");
        assert!(ledger.get("3").unwrap_err().is_not_found());
        assert!(ledger.remove("3").unwrap_err().is_not_found());
    }

    #[test]
    fn test_expenses_by_category() {
        let mut ledger = TransactionLedger::default();
        ledger
            .add(NewEntry {
                category: "Entertainment".to_string(),
                amount: 5.0,
                ..lunch()
            })
            .unwrap();

        let totals = ledger.expenses_by_category();
        let names: Vec<&str> = totals.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(names, vec!["Entertainment", "Food", "Savings", "Education"]);
        assert_eq!(totals[0].amount, 20.0);
    }

    #[test]
    fn test_daily_totals() {
        let ledger = TransactionLedger::default();
        let week = ledger.daily_totals(day(7), 7);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, day(1));
        assert_eq!(week[0].income, 50.0);
        assert_eq!(week[6].date, day(7));
        assert_eq!(week[6].income, 30.0);
        assert_eq!(week[2].expense, 8.5);

        let empty = ledger.daily_totals(day(20), 3);
        assert!(empty.iter().all(|d| d.income == 0.0 && d.expense == 0.0));
    }
}
