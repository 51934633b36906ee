//! Ad-hoc command-line demonstration of the expense sync engine: wires the
//! command/query services and the sync orchestrator against a local SQLite
//! file and a shared JSON sync file.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sync_core::{ExpenseId, SystemClock, UuidGenerator};
use sync_engine::SyncOrchestrator;
use sync_file::{SyncFileConfig, SyncFileManager};
use sync_service::{CommandService, QueryService, UpdateFields};
use sync_store::ProjectionRecorder;

#[derive(Parser)]
#[command(name = "expense-sync", about = "Local-first expense tracker with multi-device sync")]
struct Cli {
    /// Path to this replica's local SQLite database file.
    #[arg(long, default_value = "expenses.db")]
    db_path: PathBuf,

    /// Path to the shared sync file.
    #[arg(long, default_value = "sync.json")]
    sync_path: PathBuf,

    /// Gzip-frame the shared sync file.
    #[arg(long)]
    gzip: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a new expense.
    Create {
        description: Option<String>,
        amount: i64,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Update an existing expense.
    Update {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        amount: Option<i64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete (tombstone) an expense.
    Delete { id: String },
    /// List active expenses.
    List,
    /// Run one sync cycle against the shared file.
    Sync,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let cli = Cli::parse();

    let connect_options = SqliteConnectOptions::from_str(&format!("sqlite://{}", cli.db_path.display()))?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(connect_options).await?;
    sync_store::bootstrap(&pool).await?;

    match cli.command {
        Command::Create { description, amount, category, date } => {
            let service = CommandService::new(pool, SystemClock, UuidGenerator);
            let created = service.create(description, amount, category, date).await?;
            println!("created {} ({} cents)", created.expense_id, created.amount);
        }
        Command::Update { id, description, amount, category, date } => {
            let expense_id = ExpenseId::from_str(&id)?;
            let service = CommandService::new(pool, SystemClock, UuidGenerator);
            match service
                .update(expense_id, UpdateFields { description, amount, category, date })
                .await?
            {
                Some(updated) => println!("updated {} ({} cents)", updated.expense_id, updated.amount),
                None => println!("no expense with id {id}"),
            }
        }
        Command::Delete { id } => {
            let expense_id = ExpenseId::from_str(&id)?;
            let service = CommandService::new(pool, SystemClock, UuidGenerator);
            if service.delete(expense_id).await? {
                println!("deleted {expense_id}");
            } else {
                println!("no expense with id {id}");
            }
        }
        Command::List => {
            let service = QueryService::new(pool);
            for expense in service.list_active().await? {
                println!(
                    "{}  {:>8} cents  {}",
                    expense.expense_id,
                    expense.amount,
                    expense.description.as_deref().unwrap_or("(no description)")
                );
            }
        }
        Command::Sync => {
            let file = SyncFileManager::new(SyncFileConfig::new(cli.sync_path, cli.gzip));
            let recorder = ProjectionRecorder::new(pool.clone());
            recorder.warm().await?;
            let orchestrator = SyncOrchestrator::new(pool, file, recorder);
            let report = orchestrator.full_sync().await?;
            println!(
                "sync complete: downloaded {}, applied {}, uploaded {}",
                report.downloaded, report.applied, report.uploaded
            );
        }
    }

    Ok(())
}
