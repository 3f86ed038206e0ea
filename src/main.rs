use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, eyre};
use std::path::PathBuf;
use tasklist::render::{render_statuses, render_task, render_view};
use tasklist::{Config, Notice, SqliteStorage, StatusFilter, TaskStore, auth};
use tracing::Level;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "TaskList CLI - Track tasks with statuses, filtering, sorting and paging")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the store directory (default: from config, else current directory)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the login flag
    Login,

    /// Clear the login flag and the stored tasks
    Logout,

    /// Show a page of tasks
    List {
        /// Status label to show, or "All"
        #[arg(short, long, default_value = "All")]
        filter: String,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// Add a task
    Add {
        description: String,

        /// Status label (default: first label of the status set)
        #[arg(long)]
        status: Option<String>,
    },

    /// Change a task's description and/or status
    Edit {
        id: i64,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        status: Option<String>,
    },

    /// Delete a task
    Delete { id: i64 },

    /// Sort the stored task order by description
    Sort {
        /// Sort Z to A instead of A to Z
        #[arg(long)]
        descending: bool,
    },

    /// List or edit the status set
    Statuses {
        #[command(subcommand)]
        action: Option<StatusAction>,
    },
}

#[derive(Subcommand)]
enum StatusAction {
    /// Append a status label
    Add { label: String },

    /// Remove a status label that no task uses
    Remove { label: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let store_path = cli.store_path.clone().unwrap_or_else(|| config.store_path());
    let mut storage = SqliteStorage::open(&store_path)?;

    match cli.command {
        Commands::Login => {
            auth::login(&mut storage)?;
            println!("Logged in");
            return Ok(());
        }
        Commands::Logout => {
            auth::logout(&mut storage)?;
            println!("Logged out, stored tasks cleared");
            return Ok(());
        }
        _ => {}
    }

    auth::ensure_logged_in(&storage, config.require_login)?;

    let mut store = TaskStore::load(storage, config.store_options());
    run(&mut store, cli.command);

    match store.persistence_error() {
        Some(err) => Err(eyre!("Storage error: {}", err)),
        None => Ok(()),
    }
}

fn run(store: &mut TaskStore<SqliteStorage>, command: Commands) {
    match command {
        Commands::Login | Commands::Logout => {}
        Commands::List { filter, page } => {
            let filter = StatusFilter::parse(&filter);
            if let StatusFilter::Status(label) = &filter {
                if !store.statuses().contains(label) {
                    warn_notice(&Notice::UnknownStatus(label.clone()));
                }
            }
            store.set_filter(filter);
            store.set_page(page);
            print!("{}", render_view(&store.view()));
        }
        Commands::Add { description, status } => {
            store.set_pending_description(description);
            if let Some(status) = status {
                store.set_pending_status(status);
            }
            match store.submit() {
                Ok(task) => println!("Added\n{}", render_task(&task, false)),
                Err(notice) => warn_notice(&notice),
            }
        }
        Commands::Edit { id, description, status } => {
            if let Err(notice) = store.begin_edit(id) {
                warn_notice(&notice);
                return;
            }
            if let Some(description) = description {
                store.set_pending_description(description);
            }
            if let Some(status) = status {
                store.set_pending_status(status);
            }
            match store.submit() {
                Ok(task) => println!("Updated\n{}", render_task(&task, false)),
                Err(notice) => warn_notice(&notice),
            }
        }
        Commands::Delete { id } => match store.delete(id) {
            Ok(task) => println!("Deleted\n{}", render_task(&task, false)),
            Err(notice) => warn_notice(&notice),
        },
        Commands::Sort { descending } => {
            store.toggle_sort();
            if descending {
                store.toggle_sort();
            }
            print!("{}", render_view(&store.view()));
        }
        Commands::Statuses { action } => {
            let result = match action {
                None => Ok(()),
                Some(StatusAction::Add { label }) => store.add_status(&label),
                Some(StatusAction::Remove { label }) => store.remove_status(&label),
            };
            if let Err(notice) = result {
                warn_notice(&notice);
            }
            print!("{}", render_statuses(store.statuses().labels()));
        }
    }
}

fn warn_notice(notice: &Notice) {
    eprintln!("{} {}", "warning:".yellow().bold(), notice);
}
