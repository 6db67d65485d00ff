//! tidylist - personal task manager
//!
//! Command-line front end for tasks, categories, productivity reports and
//! the TidyBot assistant.

mod bot;
mod categories;
mod render;
mod reports;
mod tasks;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tidylist_core::tidybot::InsightKind;
use tidylist_core::{AnalyticsEngine, Config, Database};

use crate::categories::CategoryCommand;
use crate::render::OutputFormat;
use crate::tasks::TaskCommand;

#[derive(Parser)]
#[command(name = "tidylist")]
#[command(about = "Personal task manager with time tracking and productivity insights")]
#[command(version)]
struct Cli {
    /// Act as this user instead of profile.user_id from the config file
    #[arg(long, global = true)]
    user: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommand),

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Task counts and this week's time per category
    Dashboard,

    /// Weekly trend, backlog, burnout risk and recommendations
    Insights,

    /// Completed tasks with recorded durations, newest first
    History {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// When and where work gets done
    Patterns,

    /// What to do next
    Suggestions,

    /// Where TidyList keeps its files and how much is stored
    Status,

    /// Ask TidyBot
    Ask {
        /// Request kind (chat, weekly-insight, schedule-suggestion, ...)
        #[arg(short, long, default_value = "chat")]
        kind: InsightKind,

        /// Message for chat (optional for other kinds)
        message: Vec<String>,

        /// Show the N most recent exchanges instead of asking
        #[arg(long, value_name = "N", conflicts_with = "message")]
        recent: Option<usize>,
    },
}

/// Everything a command needs.
pub struct App {
    pub config: Config,
    pub db: Database,
    pub engine: AnalyticsEngine,
    pub user_id: String,
    pub format: OutputFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging (to file; stdout belongs to command output)
    let _log_guard =
        tidylist_core::logging::init(&config.logging).context("failed to initialize logging")?;

    // Open database
    let db_path = Config::database_path();
    tracing::info!(path = %db_path.display(), "Opening database");
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let engine =
        AnalyticsEngine::new(config.analytics.clone()).context("invalid analytics settings")?;
    let user_id = cli
        .user
        .clone()
        .unwrap_or_else(|| config.profile.user_id.clone());

    let app = App {
        config,
        db,
        engine,
        user_id,
        format: cli.format,
    };

    let result = run(&app, cli.command);
    if let Err(e) = &result {
        tracing::warn!(error = %e, "Command failed");
    }
    result
}

fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Category(command) => categories::run(app, command),
        Command::Task(command) => tasks::run(app, command),
        Command::Dashboard => reports::dashboard(app),
        Command::Insights => reports::insights(app),
        Command::History { page, limit } => reports::history(app, page, limit),
        Command::Patterns => reports::patterns(app),
        Command::Suggestions => reports::suggestions(app),
        Command::Status => reports::status(app),
        Command::Ask {
            kind,
            message,
            recent,
        } => match recent {
            Some(limit) => bot::recent(app, limit),
            None => bot::ask(app, kind, message),
        },
    }
}
