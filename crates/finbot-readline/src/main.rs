use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use finbot_application::{FinanceService, PendingReply, SessionController};
use finbot_core::config::FinbotConfig;
use finbot_core::responder::{ChoiceSource, Resolver, SeededChoice, ThreadRngChoice};
use finbot_core::session::ConversationMessage;
use finbot_core::snapshot::SnapshotStore;
use finbot_infrastructure::{ConfigService, FinbotPaths, JsonFileSnapshotStore, load_tables};

mod commands;

use commands::{COMMAND_NAMES, CommandContext, ReplCommand};

#[derive(Parser, Debug)]
#[command(name = "finbot")]
#[command(about = "FinBot - your financial education assistant", long_about = None)]
struct Args {
    /// Config file (defaults to ~/.config/finbot/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated typing delay in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Seed for reply selection, for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file replacing the builtin response tables
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Directory for the budget snapshot
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMAND_NAMES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Logs go to stderr; `RUST_LOG` wins over the config file's `log_filter`.
fn init_tracing(config: &FinbotConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.log_filter.as_deref().unwrap_or("warn"))
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_reply(assistant_name: &str, message: &ConversationMessage) {
    println!(
        "{} {}",
        message.display_time().bright_black(),
        format!("[{}]", assistant_name).bright_magenta()
    );
    for line in message.content.lines() {
        println!("{}", line.bright_blue());
    }
}

/// Awaits each pending reply in the order it was queued and hands it to `show`.
async fn forward_replies(
    mut pending: mpsc::UnboundedReceiver<PendingReply>,
    mut show: impl FnMut(ConversationMessage),
) {
    while let Some(reply) = pending.recv().await {
        match reply.wait().await {
            Ok(message) => show(message),
            Err(e) => tracing::debug!("Reply dropped: {}", e),
        }
    }
}

fn load_config(args: &Args) -> Result<FinbotConfig> {
    let service = match &args.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let mut config = service.get_config().context("Failed to load config")?;

    if let Some(delay) = args.delay_ms {
        config.typing_delay_ms = delay;
    }
    if let Some(tables) = &args.tables {
        config.tables_path = Some(tables.clone());
    }
    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }
    Ok(config)
}

/// The main entry point for the FinBot REPL.
///
/// 1. Loads config and response tables, installs logging
/// 2. Starts the session controller (single-flight reply queue)
/// 3. Reads lines with rustyline; plain text goes to the assistant, `/...` runs a tool command
/// 4. Replies are printed by a background task in submission order
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_tracing(&config);

    // ===== Backend Initialization =====
    let tables = Arc::new(load_tables(&config).context("Failed to load response tables")?);
    let choice: Arc<dyn ChoiceSource> = match args.seed {
        Some(seed) => Arc::new(SeededChoice::new(seed)),
        None => Arc::new(ThreadRngChoice),
    };
    let resolver = Resolver::new(tables.clone(), choice.clone());
    let session = Arc::new(SessionController::from_config(resolver, &config));

    let data_dir = match &config.data_dir {
        Some(dir) => dir.clone(),
        None => FinbotPaths::data_dir().context("Failed to resolve data directory")?,
    };
    let store: Arc<dyn SnapshotStore> = Arc::new(JsonFileSnapshotStore::new(data_dir));
    let finance = FinanceService::new(store, choice);

    // One printer awaits the pending replies in submission order, so the
    // terminal shows them in log order without blocking the prompt
    let (reply_tx, reply_rx) = mpsc::unbounded_channel::<PendingReply>();
    let assistant_name = config.assistant_name.clone();
    let printer = tokio::spawn(forward_replies(reply_rx, move |message| {
        print_reply(&assistant_name, &message)
    }));

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", format!("=== {} ===", config.assistant_name).bright_magenta().bold());
    println!(
        "{}",
        "Ask about saving, budgeting, investing or any money term. Type '/help' for tools, 'quit' to exit."
            .bright_black()
    );
    if let Some(greeting) = session.messages().await.first() {
        println!("{}", greeting.content.bright_blue());
    }
    println!();

    let ctx = CommandContext {
        session: &session,
        finance: &finance,
        tables: &tables,
        assistant_name: &config.assistant_name,
    };

    // ===== Main REPL Loop =====
    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                if trimmed.starts_with('/') {
                    let outcome = match ReplCommand::parse(trimmed) {
                        Ok(command) => commands::execute(command, &ctx).await,
                        Err(e) => Err(e),
                    };
                    if let Err(e) = outcome {
                        eprintln!("{}", e.to_string().red());
                    }
                    continue;
                }

                match session.submit(trimmed).await {
                    Ok(Some(pending)) => {
                        println!("{}", format!("{} is typing...", config.assistant_name).bright_black());
                        if reply_tx.send(pending).is_err() {
                            tracing::warn!("Reply printer has stopped");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => eprintln!("{}", e.to_string().red()),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    // Let a reply that is already being typed arrive before leaving
    let mut composing = session.subscribe_composing();
    let _ = tokio::time::timeout(Duration::from_secs(5), composing.wait_for(|n| *n == 0)).await;

    session.shutdown().await;
    drop(reply_tx);
    let _ = printer.await;

    Ok(())
}
