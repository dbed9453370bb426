//! Simulated digital wallet.
//!
//! Nothing here touches a real payment system: balances and transactions
//! live only in memory.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FinbotError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Payment,
    Transfer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Signed: money in is positive, money out is negative.
    pub amount: f64,
    pub description: String,
    pub date: NaiveDate,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    balance: f64,
    savings: f64,
    /// Newest first.
    transactions: Vec<WalletTransaction>,
}

impl Default for Wallet {
    fn default() -> Self {
        let date = |m, d| NaiveDate::from_ymd_opt(2025, m, d).unwrap_or_default();
        let seed = |id: &str, kind, amount, description: &str, date, category: &str| {
            WalletTransaction {
                id: id.to_string(),
                kind,
                amount,
                description: description.to_string(),
                date,
                category: Some(category.to_string()),
            }
        };
        use TransactionKind::*;
        Self {
            balance: 250.0,
            savings: 150.0,
            transactions: vec![
                seed("tx1", Deposit, 50.0, "Allowance", date(5, 2), "Income"),
                seed("tx2", Payment, -15.0, "Movie Tickets", date(5, 1), "Entertainment"),
                seed("tx3", Transfer, -25.0, "Transfer to Savings", date(4, 29), "Savings"),
                seed("tx4", Withdrawal, -10.0, "Lunch", date(4, 28), "Food"),
                seed("tx5", Deposit, 20.0, "Birthday Gift", date(4, 25), "Income"),
            ],
        }
    }
}

fn check_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(FinbotError::validation(format!(
            "amount must be a positive number, got {}",
            amount
        )));
    }
    Ok(())
}

impl Wallet {
    pub fn new(balance: f64, savings: f64) -> Self {
        Self {
            balance,
            savings,
            transactions: Vec::new(),
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn savings(&self) -> f64 {
        self.savings
    }

    pub fn transactions(&self) -> &[WalletTransaction] {
        &self.transactions
    }

    fn record(
        &mut self,
        kind: TransactionKind,
        amount: f64,
        description: String,
        category: &str,
        today: NaiveDate,
    ) -> &WalletTransaction {
        self.transactions.insert(
            0,
            WalletTransaction {
                id: format!("tx-{}", Uuid::new_v4()),
                kind,
                amount,
                description,
                date: today,
                category: Some(category.to_string()),
            },
        );
        &self.transactions[0]
    }

    fn check_funds(&self, amount: f64) -> Result<()> {
        if amount > self.balance {
            return Err(FinbotError::validation(format!(
                "insufficient balance: {:.2} requested, {:.2} available",
                amount, self.balance
            )));
        }
        Ok(())
    }

    pub fn add_money(&mut self, amount: f64, today: NaiveDate) -> Result<&WalletTransaction> {
        check_amount(amount)?;
        self.balance += amount;
        Ok(self.record(
            TransactionKind::Deposit,
            amount,
            "Added Money".to_string(),
            "Income",
            today,
        ))
    }

    pub fn send_money(
        &mut self,
        amount: f64,
        recipient: &str,
        today: NaiveDate,
    ) -> Result<&WalletTransaction> {
        check_amount(amount)?;
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(FinbotError::validation("recipient is required"));
        }
        self.check_funds(amount)?;
        self.balance -= amount;
        Ok(self.record(
            TransactionKind::Payment,
            -amount,
            format!("Payment to {}", recipient),
            "Transfer",
            today,
        ))
    }

    pub fn transfer_to_savings(
        &mut self,
        amount: f64,
        today: NaiveDate,
    ) -> Result<&WalletTransaction> {
        check_amount(amount)?;
        self.check_funds(amount)?;
        self.balance -= amount;
        self.savings += amount;
        Ok(self.record(
            TransactionKind::Transfer,
            -amount,
            "Transfer to Savings".to_string(),
            "Savings",
            today,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 3).unwrap()
    }

    #[test]
    fn test_default_wallet() {
        let wallet = Wallet::default();
        assert_eq!(wallet.balance(), 250.0);
        assert_eq!(wallet.savings(), 150.0);
        assert_eq!(wallet.transactions().len(), 5);
        assert_eq!(wallet.transactions()[0].id, "tx1");
    }

    #[test]
    fn test_add_money_prepends() {
        let mut wallet = Wallet::default();
        let tx = wallet.add_money(30.0, today()).unwrap();
        assert_eq!(tx.kind, TransactionKind::Deposit);
        assert_eq!(tx.amount, 30.0);
        assert_eq!(wallet.balance(), 280.0);
        assert_eq!(wallet.transactions()[0].description, "Added Money");
    }

    #[test]
    fn test_send_money() {
        let mut wallet = Wallet::default();
        let tx = wallet.send_money(40.0, " Sam ", today()).unwrap();
        assert_eq!(tx.description, "Payment to Sam");
        assert_eq!(tx.amount, -40.0);
        assert_eq!(wallet.balance(), 210.0);
    }

    #[test]
    fn test_send_money_validation() {
        let mut wallet = Wallet::default();
        assert!(wallet.send_money(10.0, "", today()).is_err());
        assert!(wallet.send_money(1000.0, "Sam", today()).is_err());
        assert!(wallet.send_money(-1.0, "Sam", today()).is_err());
        assert_eq!(wallet.balance(), 250.0);
        assert_eq!(wallet.transactions().len(), 5);
    }

    #[test]
    fn test_transfer_to_savings() {
        let mut wallet = Wallet::default();
        wallet.transfer_to_savings(250.0, today()).unwrap();
        assert_eq!(wallet.balance(), 0.0);
        assert_eq!(wallet.savings(), 400.0);
        assert!(wallet.transfer_to_savings(0.01, today()).is_err());
        assert!(wallet.add_money(f64::INFINITY, today()).is_err());
    }
}
