//! Command-line front end for the task store.
//!
//! # Responsibility
//! - Map sub-commands onto store operations and print the results.
//! - Resolve store path and logging configuration from flags and env.
//! - Translate store errors into stable exit codes.
//!
//! # Exit codes
//! - `0` success, `1` task not found, `2` invalid input,
//!   `3` storage or other runtime failure.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use quadrant_core::report::summary_line;
use quadrant_core::{
    default_log_level, init_logging, parse_new_task, parse_task_id, parse_task_patch,
    render_text_report, Category, CategorySummary, NewTask, StoreError, Task, TaskId, TaskPatch,
    TaskStore, TaskValidationError,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DEFAULT_DB_FILE_NAME: &str = "quadrant.sqlite3";

const EXIT_NOT_FOUND: u8 = 1;
const EXIT_INVALID_INPUT: u8 = 2;
const EXIT_FAILURE: u8 = 3;

#[derive(Debug, Parser)]
#[command(
    name = "quadrant",
    version = quadrant_core::core_version(),
    about = "Rate tasks by time and value and sort them into A/B/C/D quadrants"
)]
struct Cli {
    /// SQLite database file; created on first use.
    #[arg(long, env = "QUADRANT_DB_PATH", default_value = DEFAULT_DB_FILE_NAME)]
    db: PathBuf,

    /// Directory for rolling log files. Logging stays off when unset.
    #[arg(long, env = "QUADRANT_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// One of trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, env = "QUADRANT_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a task from flags.
    Add(AddArgs),
    /// Create a task from a JSON payload `{name, description?, timeRating, valueRating}`.
    AddJson { payload: String },
    /// Print one task as JSON.
    Get { id: String },
    /// List tasks in insertion order.
    List {
        /// Print a JSON array instead of one line per task.
        #[arg(long)]
        json: bool,
        /// Only tasks of this quadrant (A, B, C or D).
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
    },
    /// Change some fields of a task; the quadrant is recomputed.
    Update(UpdateArgs),
    /// Change a task from a partial JSON payload.
    UpdateJson { id: String, payload: String },
    /// Delete one task.
    Delete { id: String },
    /// Delete every task.
    Clear,
    /// Print per-quadrant counts.
    Summary,
    /// Print the grouped plain-text report.
    Report,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::AddJson { .. } => "add-json",
            Self::Get { .. } => "get",
            Self::List { .. } => "list",
            Self::Update(_) => "update",
            Self::UpdateJson { .. } => "update-json",
            Self::Delete { .. } => "delete",
            Self::Clear => "clear",
            Self::Summary => "summary",
            Self::Report => "report",
        }
    }
}

#[derive(Debug, Args)]
struct AddArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: Option<String>,
    /// Time rating 1-10, higher is quicker.
    #[arg(long = "time", allow_hyphen_values = true)]
    time_rating: i64,
    /// Value rating 1-10, higher is more valuable.
    #[arg(long = "value", allow_hyphen_values = true)]
    value_rating: i64,
}

impl AddArgs {
    fn into_new_task(self) -> NewTask {
        NewTask {
            name: self.name,
            description: self.description,
            time_rating: self.time_rating,
            value_rating: self.value_rating,
        }
    }
}

#[derive(Debug, Args)]
struct UpdateArgs {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long, conflicts_with = "clear_description")]
    description: Option<String>,
    #[arg(long)]
    clear_description: bool,
    #[arg(long = "time", allow_hyphen_values = true)]
    time_rating: Option<i64>,
    #[arg(long = "value", allow_hyphen_values = true)]
    value_rating: Option<i64>,
}

impl UpdateArgs {
    fn to_patch(&self) -> TaskPatch {
        let description = if self.clear_description {
            Some(None)
        } else {
            self.description.clone().map(Some)
        };
        TaskPatch {
            name: self.name.clone(),
            description,
            time_rating: self.time_rating,
            value_rating: self.value_rating,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Some(log_dir) = &cli.log_dir {
        init_cli_logging(log_dir, cli.log_level.as_deref())?;
    }
    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );

    let store = TaskStore::open(&cli.db)
        .with_context(|| format!("failed to open task store at `{}`", cli.db.display()))?;

    match cli.command {
        Command::Add(args) => {
            let task = store.create_task(args.into_new_task())?;
            print_json(&task)
        }
        Command::AddJson { payload } => {
            let input = parse_new_task(&parse_payload(&payload)?)?;
            let task = store.create_task(input)?;
            print_json(&task)
        }
        Command::Get { id } => {
            let id = parse_task_id(&id)?;
            let task = store.get_task(id)?.ok_or(StoreError::NotFound(id))?;
            print_json(&task)
        }
        Command::List { json, category } => {
            let tasks = match category {
                Some(category) => store.list_tasks_in_category(category)?,
                None => store.list_tasks()?,
            };
            if json {
                print_json(&tasks)
            } else {
                tasks.iter().for_each(|task| println!("{}", task_line(task)));
                Ok(())
            }
        }
        Command::Update(args) => {
            let id = parse_task_id(&args.id)?;
            let task = store.update_task(id, args.to_patch())?;
            print_json(&task)
        }
        Command::UpdateJson { id, payload } => {
            let id = parse_task_id(&id)?;
            let patch = parse_task_patch(&parse_payload(&payload)?)?;
            let task = store.update_task(id, patch)?;
            print_json(&task)
        }
        Command::Delete { id } => {
            let id: TaskId = parse_task_id(&id)?;
            if !store.delete_task(id)? {
                return Err(StoreError::NotFound(id).into());
            }
            println!("deleted {id}");
            Ok(())
        }
        Command::Clear => {
            let removed = store.clear_tasks()?;
            println!("removed {removed} task(s)");
            Ok(())
        }
        Command::Summary => {
            let summary = CategorySummary::from_counts(store.category_counts()?);
            println!("{}", summary_line(&summary));
            for category in Category::ALL {
                println!("{:>4}  {}", summary.count(category), category.title());
            }
            Ok(())
        }
        Command::Report => {
            let report = render_text_report(&store.list_tasks()?);
            if report.is_empty() {
                println!("No tasks.");
            } else {
                print!("{report}");
            }
            Ok(())
        }
    }
}

fn init_cli_logging(log_dir: &Path, level: Option<&str>) -> Result<()> {
    let log_dir = std::path::absolute(log_dir)
        .with_context(|| format!("failed to resolve log directory `{}`", log_dir.display()))?;
    let log_dir = log_dir
        .to_str()
        .context("log directory must be valid UTF-8")?;
    init_logging(level.unwrap_or(default_log_level()), log_dir).map_err(anyhow::Error::msg)
}

fn parse_payload(payload: &str) -> Result<serde_json::Value> {
    serde_json::from_str(payload).context("payload is not valid JSON")
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::parse(value.trim().to_ascii_uppercase().as_str())
        .ok_or_else(|| format!("unknown category `{value}`; expected A, B, C or D"))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn task_line(task: &Task) -> String {
    format!(
        "{}  {}  time={:>2} value={:>2}  {}",
        task.id(),
        task.category(),
        task.time_rating(),
        task.value_rating(),
        task.name()
    )
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    if let Some(store_err) = err.downcast_ref::<StoreError>() {
        return match store_err {
            StoreError::NotFound(_) => EXIT_NOT_FOUND,
            StoreError::Validation(_) => EXIT_INVALID_INPUT,
            StoreError::Storage(_) => EXIT_FAILURE,
        };
    }
    if err.downcast_ref::<TaskValidationError>().is_some()
        || err.downcast_ref::<serde_json::Error>().is_some()
    {
        return EXIT_INVALID_INPUT;
    }
    EXIT_FAILURE
}
