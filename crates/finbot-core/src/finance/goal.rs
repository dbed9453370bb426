//! Savings goal tracker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::{FinbotError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    pub id: String,
    pub title: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub category: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: NaiveDate,
}

impl SavingsGoal {
    /// Saved amount as a percentage of the target. Not capped: over-saving shows > 100.
    pub fn progress(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 0.0;
        }
        self.current_amount / self.target_amount * 100.0
    }

    pub fn is_completed(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    /// Days from `today` until the deadline; negative once it has passed.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.deadline - today).num_days()
    }

    pub fn band(&self) -> ProgressBand {
        ProgressBand::of(self.progress())
    }
}

/// Colour band of a progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBand {
    Low,
    Medium,
    High,
}

impl ProgressBand {
    pub fn of(percent: f64) -> Self {
        if percent < 30.0 {
            Self::Low
        } else if percent < 70.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// Input for a new goal.
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub title: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub category: Option<String>,
    pub notes: Option<String>,
}

/// Outcome of a contribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub new_amount: f64,
    /// True when this contribution crossed the target.
    pub just_completed: bool,
}

/// Aggregate over the goals of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub category: String,
    pub goals: usize,
    pub saved: f64,
    pub target: f64,
}

impl CategorySummary {
    pub fn progress(&self) -> f64 {
        if self.target <= 0.0 {
            return 0.0;
        }
        self.saved / self.target * 100.0
    }
}

fn check_goal(title: &str, target_amount: f64, current_amount: f64) -> Result<()> {
    if title.is_empty() {
        return Err(FinbotError::validation("goal title is required"));
    }
    if !target_amount.is_finite() || target_amount <= 0.0 {
        return Err(FinbotError::validation("goal target must be positive"));
    }
    if !current_amount.is_finite() || current_amount < 0.0 {
        return Err(FinbotError::validation("saved amount cannot be negative"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalTracker {
    goals: Vec<SavingsGoal>,
}

impl GoalTracker {
    pub fn new(goals: Vec<SavingsGoal>) -> Self {
        Self { goals }
    }

    /// The three starter goals.
    pub fn starter() -> Self {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        Self::new(vec![
            SavingsGoal {
                id: "1".to_string(),
                title: "New Gaming Console".to_string(),
                target_amount: 400.0,
                current_amount: 150.0,
                deadline: date(2025, 12, 25),
                category: "Entertainment".to_string(),
                notes: Some("Saving $25 per week from allowance".to_string()),
                created_at: date(2025, 1, 15),
            },
            SavingsGoal {
                id: "2".to_string(),
                title: "Summer Camp".to_string(),
                target_amount: 300.0,
                current_amount: 75.0,
                deadline: date(2025, 6, 15),
                category: "Education".to_string(),
                notes: None,
                created_at: date(2025, 2, 1),
            },
            SavingsGoal {
                id: "3".to_string(),
                title: "Emergency Fund".to_string(),
                target_amount: 200.0,
                current_amount: 200.0,
                deadline: date(2025, 5, 1),
                category: "Savings".to_string(),
                notes: Some("Goal completed! Keeping for emergencies.".to_string()),
                created_at: date(2024, 11, 10),
            },
        ])
    }

    pub fn goals(&self) -> &[SavingsGoal] {
        &self.goals
    }

    pub fn get(&self, id: &str) -> Result<&SavingsGoal> {
        self.goals
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| FinbotError::not_found("goal", id))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut SavingsGoal> {
        self.goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| FinbotError::not_found("goal", id))
    }

    /// Adds a goal. A title and a positive target are required; category defaults to "Savings".
    pub fn add(&mut self, new_goal: NewGoal, today: NaiveDate) -> Result<&SavingsGoal> {
        let title = new_goal.title.trim();
        check_goal(title, new_goal.target_amount, new_goal.current_amount)?;

        self.goals.push(SavingsGoal {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            target_amount: new_goal.target_amount,
            current_amount: new_goal.current_amount,
            deadline: new_goal.deadline,
            category: new_goal
                .category
                .unwrap_or_else(|| "Savings".to_string()),
            notes: new_goal.notes,
            created_at: today,
        });
        Ok(&self.goals[self.goals.len() - 1])
    }

    /// Replaces the goal with the same id. The same rules as `add` apply.
    pub fn update(&mut self, mut goal: SavingsGoal) -> Result<()> {
        goal.title = goal.title.trim().to_string();
        check_goal(&goal.title, goal.target_amount, goal.current_amount)?;
        let slot = self.get_mut(&goal.id)?;
        *slot = goal;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<SavingsGoal> {
        let index = self
            .goals
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| FinbotError::not_found("goal", id))?;
        Ok(self.goals.remove(index))
    }

    /// Adds `amount` to a goal, noting the completion date when it reaches the target.
    pub fn contribute(&mut self, id: &str, amount: f64, today: NaiveDate) -> Result<Contribution> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(FinbotError::validation("contribution must be positive"));
        }
        let goal = self.get_mut(id)?;
        let was_completed = goal.is_completed();
        goal.current_amount += amount;

        let just_completed = !was_completed && goal.is_completed();
        if just_completed {
            let note = format!("Goal completed on {}!", today.format("%Y-%m-%d"));
            goal.notes = Some(match goal.notes.take() {
                Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), note),
                _ => note,
            });
        }

        Ok(Contribution {
            new_amount: goal.current_amount,
            just_completed,
        })
    }

    /// Goals still in progress, earliest deadline first.
    pub fn active(&self) -> Vec<&SavingsGoal> {
        let mut active: Vec<&SavingsGoal> =
            self.goals.iter().filter(|g| !g.is_completed()).collect();
        active.sort_by_key(|g| g.deadline);
        active
    }

    pub fn completed(&self) -> Vec<&SavingsGoal> {
        self.goals.iter().filter(|g| g.is_completed()).collect()
    }

    pub fn total_saved(&self) -> f64 {
        self.goals.iter().map(|g| g.current_amount).sum()
    }

    pub fn total_target(&self) -> f64 {
        self.goals.iter().map(|g| g.target_amount).sum()
    }

    /// Total saved over total target, as a percentage.
    pub fn overall_progress(&self) -> f64 {
        let target = self.total_target();
        if target <= 0.0 {
            return 0.0;
        }
        self.total_saved() / target * 100.0
    }

    /// Per-category aggregates, sorted by category name.
    pub fn category_summary(&self) -> Vec<CategorySummary> {
        let mut by_category: BTreeMap<&str, CategorySummary> = BTreeMap::new();
        for goal in &self.goals {
            let entry = by_category
                .entry(goal.category.as_str())
                .or_insert_with(|| CategorySummary {
                    category: goal.category.clone(),
                    goals: 0,
                    saved: 0.0,
                    target: 0.0,
                });
            entry.goals += 1;
            entry.saved += goal.current_amount;
            entry.target += goal.target_amount;
        }
        by_category.into_values().collect()
    }
}
