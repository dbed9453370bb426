//! Slash commands of the REPL.

use chrono::{Local, NaiveDate};
use colored::Colorize;
use finbot_application::{FinanceService, SessionController};
use finbot_core::error::{FinbotError, Result};
use finbot_core::finance::{
    CategoryKind, EXPENSE_CATEGORIES, EntryEdit, EntryFilter, INCOME_CATEGORIES, LedgerEntry,
    ProgressBand,
};
use finbot_core::responder::ResponseTableSet;
use finbot_core::session::MessageRole;

/// Command names offered for completion.
pub const COMMAND_NAMES: &[&str] = &[
    "/help", "/reset", "/history", "/terms", "/budget", "/goals", "/tx", "/wallet",
];

const HELP: &str = "\
/help                                      Show this help
/reset                                     Start the conversation over
/history                                   Show the whole conversation
/terms [query]                             Search the financial dictionary
/budget                                    Show the budget planner
/budget add <income|expense> <amount> <name>
/budget remove <id>
/budget goal <amount>                      Set the savings goal
/budget save                               Save a budget snapshot
/goals                                     Show savings goals
/goals contribute <id> <amount>
/tx [type=..] [category=..] [from=YYYY-MM-DD] [to=YYYY-MM-DD] [words]
                                           List transactions, newest first
/tx add <income|expense> <amount> <category> <description> [date=YYYY-MM-DD]
/tx edit <id> <date|amount|description|category|type> <value>
/tx remove <id>
/tx stats                                  Expenses by category, last 7 days
/wallet                                    Show the wallet
/wallet add <amount>
/wallet send <amount> <recipient>
/wallet save <amount>                      Move money to savings
quit | exit                                Leave";

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Help,
    Reset,
    History,
    Terms(String),
    ShowBudget,
    AddCategory {
        kind: CategoryKind,
        amount: f64,
        name: String,
    },
    RemoveCategory(String),
    SetSavingsGoal(f64),
    SaveBudget,
    ShowGoals,
    Contribute {
        id: String,
        amount: f64,
    },
    ShowTransactions(EntryFilter),
    AddTransaction {
        kind: CategoryKind,
        amount: f64,
        category: String,
        description: String,
        date: Option<NaiveDate>,
    },
    EditTransaction {
        id: String,
        edit: EntryEdit,
    },
    RemoveTransaction(String),
    TransactionStats,
    ShowWallet,
    AddMoney(f64),
    SendMoney {
        amount: f64,
        recipient: String,
    },
    TransferToSavings(f64),
}

fn parse_amount(raw: Option<&str>) -> Result<f64> {
    let raw = raw.ok_or_else(|| FinbotError::validation("an amount is required"))?;
    raw.trim_start_matches('$')
        .parse::<f64>()
        .map_err(|_| FinbotError::validation(format!("'{}' is not an amount", raw)))
}

fn rest(parts: &[&str]) -> String {
    parts.join(" ")
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| FinbotError::validation(format!("'{}' is not a YYYY-MM-DD date", raw)))
}

/// Category names are single tokens on the command line: `Side_Jobs` is "Side Jobs".
fn category_arg(raw: &str) -> String {
    raw.replace('_', " ")
}

fn parse_filter(args: &[&str]) -> Result<EntryFilter> {
    let mut filter = EntryFilter::default();
    let mut words = Vec::new();
    for arg in args {
        match arg.split_once('=') {
            Some(("type", value)) => filter.kind = Some(value.parse()?),
            Some(("category", value)) => filter.category = Some(category_arg(value)),
            Some(("from", value)) => filter.date_from = Some(parse_date(value)?),
            Some(("to", value)) => filter.date_to = Some(parse_date(value)?),
            _ => words.push(*arg),
        }
    }
    if !words.is_empty() {
        filter.search = Some(rest(&words));
    }
    Ok(filter)
}

fn parse_tx(args: &[&str]) -> Result<ReplCommand> {
    match args.first().copied() {
        Some("add") => {
            const USAGE: &str =
                "usage: /tx add <income|expense> <amount> <category> <description> [date=YYYY-MM-DD]";
            let kind = args
                .get(1)
                .ok_or_else(|| FinbotError::validation(USAGE))?
                .parse::<CategoryKind>()?;
            let amount = parse_amount(args.get(2).copied())?;
            let category = args
                .get(3)
                .map(|c| category_arg(c))
                .ok_or_else(|| FinbotError::validation(USAGE))?;
            let mut date = None;
            let mut words = Vec::new();
            for arg in args.get(4..).unwrap_or_default() {
                match arg.strip_prefix("date=") {
                    Some(value) => date = Some(parse_date(value)?),
                    None => words.push(*arg),
                }
            }
            Ok(ReplCommand::AddTransaction {
                kind,
                amount,
                category,
                description: rest(&words),
                date,
            })
        }
        Some("edit") => {
            const USAGE: &str = "usage: /tx edit <id> <date|amount|description|category|type> <value>";
            let (id, field) = match (args.get(1), args.get(2)) {
                (Some(id), Some(field)) => (id.to_string(), *field),
                _ => return Err(FinbotError::validation(USAGE)),
            };
            let value = rest(args.get(3..).unwrap_or_default());
            let edit = match field {
                "date" => EntryEdit::Date(parse_date(&value)?),
                "amount" => EntryEdit::Amount(parse_amount(Some(value.as_str()))?),
                "description" => EntryEdit::Description(value),
                "category" => EntryEdit::Category(category_arg(&value)),
                "type" => EntryEdit::Kind(value.parse()?),
                _ => return Err(FinbotError::validation(USAGE)),
            };
            Ok(ReplCommand::EditTransaction { id, edit })
        }
        Some("remove") => args
            .get(1)
            .map(|id| ReplCommand::RemoveTransaction(id.to_string()))
            .ok_or_else(|| FinbotError::validation("usage: /tx remove <id>")),
        Some("stats") => Ok(ReplCommand::TransactionStats),
        _ => Ok(ReplCommand::ShowTransactions(parse_filter(args)?)),
    }
}

impl ReplCommand {
    /// Parses a line starting with `/`.
    pub fn parse(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let (name, args) = match parts.split_first() {
            Some((name, args)) => (*name, args),
            None => return Err(FinbotError::validation("empty command")),
        };
        let sub = args.first().copied();

        match (name, sub) {
            ("/help", _) => Ok(Self::Help),
            ("/reset", _) => Ok(Self::Reset),
            ("/history", _) => Ok(Self::History),
            ("/terms", _) => Ok(Self::Terms(rest(args))),
            ("/budget", None) => Ok(Self::ShowBudget),
            ("/budget", Some("add")) => {
                let kind = args
                    .get(1)
                    .ok_or_else(|| FinbotError::validation("usage: /budget add <income|expense> <amount> <name>"))?
                    .parse::<CategoryKind>()?;
                let amount = parse_amount(args.get(2).copied())?;
                Ok(Self::AddCategory {
                    kind,
                    amount,
                    name: rest(args.get(3..).unwrap_or_default()),
                })
            }
            ("/budget", Some("remove")) => args
                .get(1)
                .map(|id| Self::RemoveCategory(id.to_string()))
                .ok_or_else(|| FinbotError::validation("usage: /budget remove <id>")),
            ("/budget", Some("goal")) => Ok(Self::SetSavingsGoal(parse_amount(args.get(1).copied())?)),
            ("/budget", Some("save")) => Ok(Self::SaveBudget),
            ("/goals", None) => Ok(Self::ShowGoals),
            ("/goals", Some("contribute")) => {
                let id = args
                    .get(1)
                    .ok_or_else(|| FinbotError::validation("usage: /goals contribute <id> <amount>"))?;
                Ok(Self::Contribute {
                    id: id.to_string(),
                    amount: parse_amount(args.get(2).copied())?,
                })
            }
            ("/tx", _) => parse_tx(args),
            ("/wallet", None) => Ok(Self::ShowWallet),
            ("/wallet", Some("add")) => Ok(Self::AddMoney(parse_amount(args.get(1).copied())?)),
            ("/wallet", Some("send")) => Ok(Self::SendMoney {
                amount: parse_amount(args.get(1).copied())?,
                recipient: rest(args.get(2..).unwrap_or_default()),
            }),
            ("/wallet", Some("save")) => {
                Ok(Self::TransferToSavings(parse_amount(args.get(1).copied())?))
            }
            _ => Err(FinbotError::validation(format!(
                "unknown command '{}', try /help",
                line.trim()
            ))),
        }
    }
}

/// Everything a command may touch.
pub struct CommandContext<'a> {
    pub session: &'a SessionController,
    pub finance: &'a FinanceService,
    pub tables: &'a ResponseTableSet,
    pub assistant_name: &'a str,
}

/// Runs a command and prints its output.
pub async fn execute(command: ReplCommand, ctx: &CommandContext<'_>) -> Result<()> {
    match command {
        ReplCommand::Help => println!("{}", HELP.bright_black()),
        ReplCommand::Reset => {
            ctx.session.reset().await;
            print_history(ctx).await;
        }
        ReplCommand::History => print_history(ctx).await,
        ReplCommand::Terms(query) => {
            let hits = ctx.tables.glossary.search(&query);
            if hits.is_empty() {
                println!("{}", "No matching terms found".bright_black());
            }
            for entry in hits {
                println!("{}", entry.display_term().bright_magenta());
                println!("  {}", entry.definition);
            }
        }
        ReplCommand::ShowBudget => print_budget(ctx).await,
        ReplCommand::AddCategory { kind, amount, name } => {
            let category = ctx.finance.add_budget_category(&name, amount, kind).await?;
            println!(
                "{}",
                format!("Added {} ({}) ${:.2}", category.name, category.id, category.amount).green()
            );
        }
        ReplCommand::RemoveCategory(id) => {
            let removed = ctx.finance.remove_budget_category(&id).await?;
            println!("{}", format!("Removed {}", removed.name).green());
        }
        ReplCommand::SetSavingsGoal(goal) => {
            ctx.finance.set_savings_goal(goal).await?;
            println!("{}", format!("Savings goal set to ${:.2}", goal).green());
        }
        ReplCommand::SaveBudget => {
            ctx.finance.save_budget().await?;
            println!("{}", "Your budget has been saved successfully!".green());
        }
        ReplCommand::ShowGoals => print_goals(ctx).await,
        ReplCommand::Contribute { id, amount } => {
            let outcome = ctx.finance.contribute_to_goal(&id, amount).await?;
            println!("{}", format!("Added ${:.2} to your goal!", amount).green());
            if outcome.just_completed {
                println!("{}", "Goal completed!".bright_green().bold());
            }
        }
        ReplCommand::ShowTransactions(filter) => print_transactions(ctx, &filter).await,
        ReplCommand::AddTransaction {
            kind,
            amount,
            category,
            description,
            date,
        } => {
            let known = match kind {
                CategoryKind::Income => INCOME_CATEGORIES,
                CategoryKind::Expense => EXPENSE_CATEGORIES,
            };
            if !known.contains(&category.as_str()) {
                println!(
                    "{}",
                    format!("Note: '{}' is not one of {}", category, known.join(", ")).yellow()
                );
            }
            let entry = ctx
                .finance
                .add_transaction(kind, amount, &category, &description, date)
                .await?;
            println!("{}", "Transaction added successfully!".green());
            print_entry(&entry);
        }
        ReplCommand::EditTransaction { id, edit } => {
            let entry = ctx.finance.edit_transaction(&id, edit).await?;
            println!("{}", "Transaction updated successfully!".green());
            print_entry(&entry);
        }
        ReplCommand::RemoveTransaction(id) => {
            ctx.finance.remove_transaction(&id).await?;
            println!("{}", "Transaction deleted successfully!".green());
        }
        ReplCommand::TransactionStats => print_transaction_stats(ctx).await,
        ReplCommand::ShowWallet => print_wallet(ctx).await,
        ReplCommand::AddMoney(amount) => {
            ctx.finance.add_money(amount).await?;
            print_wallet(ctx).await;
        }
        ReplCommand::SendMoney { amount, recipient } => {
            ctx.finance.send_money(amount, &recipient).await?;
            print_wallet(ctx).await;
        }
        ReplCommand::TransferToSavings(amount) => {
            ctx.finance.transfer_to_savings(amount).await?;
            print_wallet(ctx).await;
        }
    }
    Ok(())
}

async fn print_history(ctx: &CommandContext<'_>) {
    for message in ctx.session.messages().await {
        let time = message.display_time();
        match message.role {
            MessageRole::User => {
                println!("{} {}", time.bright_black(), format!("> {}", message.content).green())
            }
            MessageRole::Assistant => println!(
                "{} {} {}",
                time.bright_black(),
                format!("[{}]", ctx.assistant_name).bright_magenta(),
                message.content.bright_blue()
            ),
        }
    }
}

async fn print_budget(ctx: &CommandContext<'_>) {
    let budget = ctx.finance.budget().await;
    println!("{}", "Budget".bright_magenta().bold());
    for category in &budget.categories {
        let amount = format!("${:.2}", category.amount);
        let amount = match category.kind {
            CategoryKind::Income => amount.green(),
            CategoryKind::Expense => amount.red(),
        };
        println!("  {:<8} {:<16} {}", category.id, category.name, amount);
    }
    println!(
        "  Income ${:.2}  Expenses ${:.2}  Balance ${:.2}",
        budget.total_income(),
        budget.total_expenses(),
        budget.balance()
    );
    println!(
        "  Savings goal ${:.2}: {:.0}%{}",
        budget.savings_goal,
        budget.savings_progress(),
        if budget.remaining_to_goal() > 0.0 {
            format!(" (${:.2} to go)", budget.remaining_to_goal())
        } else {
            String::new()
        }
    );
}

async fn print_goals(ctx: &CommandContext<'_>) {
    let goals = ctx.finance.goals().await;
    println!(
        "{}",
        format!("Savings goals ({:.0}% overall)", goals.overall_progress())
            .bright_magenta()
            .bold()
    );
    for goal in goals.active() {
        let progress = format!("{:.0}%", goal.progress());
        let progress = match goal.band() {
            ProgressBand::Low => progress.red(),
            ProgressBand::Medium => progress.yellow(),
            ProgressBand::High => progress.green(),
        };
        println!(
            "  {:<8} {:<24} ${:.2} / ${:.2}  {}  due {}",
            goal.id, goal.title, goal.current_amount, goal.target_amount, progress, goal.deadline
        );
    }
    for goal in goals.completed() {
        println!(
            "  {:<8} {:<24} {}",
            goal.id,
            goal.title,
            "completed".bright_green()
        );
    }
}

fn print_entry(entry: &LedgerEntry) {
    let amount = match entry.kind {
        CategoryKind::Income => format!("+{:.2}", entry.amount).green(),
        CategoryKind::Expense => format!("-{:.2}", entry.amount).red(),
    };
    println!(
        "  {:<8} {}  {:<20} {:<14} {}",
        entry.id,
        entry.date,
        entry.description,
        entry.category,
        amount
    );
}

async fn print_transactions(ctx: &CommandContext<'_>, filter: &EntryFilter) {
    let ledger = ctx.finance.ledger().await;
    println!(
        "{}",
        format!(
            "Income ${:.2}  Expenses ${:.2}  Balance ${:.2}",
            ledger.total_income(),
            ledger.total_expenses(),
            ledger.balance()
        )
        .bright_magenta()
        .bold()
    );
    let entries = ctx.finance.transactions(filter).await;
    if entries.is_empty() {
        println!("{}", "No transactions found".bright_black());
    }
    for entry in &entries {
        print_entry(entry);
    }
}

async fn print_transaction_stats(ctx: &CommandContext<'_>) {
    let ledger = ctx.finance.ledger().await;
    println!("{}", "Expenses by category".bright_magenta().bold());
    for total in ledger.expenses_by_category() {
        println!("  {:<16} ${:.2}", total.category, total.amount);
    }
    println!("{}", "Last 7 days".bright_magenta().bold());
    for day in ledger.daily_totals(Local::now().date_naive(), 7) {
        println!(
            "  {}  {}  {}",
            day.date.format("%b %d"),
            format!("+{:.2}", day.income).green(),
            format!("-{:.2}", day.expense).red()
        );
    }
}

async fn print_wallet(ctx: &CommandContext<'_>) {
    let wallet = ctx.finance.wallet().await;
    println!(
        "{}",
        format!(
            "Wallet ${:.2}  Savings ${:.2}",
            wallet.balance(),
            wallet.savings()
        )
        .bright_magenta()
        .bold()
    );
    for tx in wallet.transactions().iter().take(5) {
        let amount = format!("{:+.2}", tx.amount);
        let amount = if tx.amount >= 0.0 {
            amount.green()
        } else {
            amount.red()
        };
        println!("  {}  {:<24} {}", tx.date, tx.description, amount);
    }
}
