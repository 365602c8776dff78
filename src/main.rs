use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use eyre::{Context, Result, eyre};
use std::path::PathBuf;
use tasklist::{Session, Store, Task, TaskForm, TaskId};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Tasklist CLI - a to-do list kept in a local SQLite file")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding the task database (default: platform data directory)
    #[arg(short, long, global = true)]
    store_path: Option<PathBuf>,

    /// Print task lists as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        #[arg(long)]
        name: String,

        /// Deadline as YYYY-MM-DD
        #[arg(long)]
        deadline: String,

        /// Duration in days
        #[arg(long, allow_hyphen_values = true)]
        duration: String,

        #[arg(long)]
        description: String,
    },

    /// List all tasks, latest deadline first
    List,

    /// Show every field of one task
    Show { id: TaskId },

    /// Edit a task; omitted fields keep their current value
    Edit {
        id: TaskId,

        #[arg(long)]
        name: Option<String>,

        /// Deadline as YYYY-MM-DD
        #[arg(long)]
        deadline: Option<String>,

        /// Duration in days
        #[arg(long, allow_hyphen_values = true)]
        duration: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, action = ArgAction::Set)]
        completed: Option<bool>,
    },

    /// Mark a task completed
    Done { id: TaskId },

    /// Mark a task pending
    Undone { id: TaskId },

    /// Delete a task
    Delete { id: TaskId },
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    let store_path = match cli.store_path {
        Some(path) => path,
        None => default_store_path()?,
    };
    let store = Store::open(&store_path)
        .wrap_err_with(|| format!("Failed to open task store at {}", store_path.display()))?;
    let mut session = Session::load(&store)?;

    match cli.command {
        Commands::Add {
            name,
            deadline,
            duration,
            description,
        } => {
            let task = TaskForm {
                name,
                deadline,
                duration,
                description,
                completed: false,
            }
            .into_task()?;
            let id = session.add_and_reload(&task)?;
            println!("Added task {}", id);
            print_tasks(session.tasks(), json)?;
        }
        Commands::List => {
            print_tasks(session.tasks(), json)?;
        }
        Commands::Show { id } => {
            let task = store.get(id)?.ok_or_else(|| eyre!("Task {} not found", id))?;
            print_detail(&task);
        }
        Commands::Edit {
            id,
            name,
            deadline,
            duration,
            description,
            completed,
        } => {
            let existing = find(&session, id)?;
            let mut form = TaskForm::from_task(existing);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(deadline) = deadline {
                form.deadline = deadline;
            }
            if let Some(duration) = duration {
                form.duration = duration;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if let Some(completed) = completed {
                form.completed = completed;
            }

            let updated = form.apply_to(existing)?;
            let rows = session.update_and_reload(&updated)?;
            ensure_found(rows, id)?;
            println!("Updated task {}", id);
            print_tasks(session.tasks(), json)?;
        }
        Commands::Done { id } => {
            let rows = session.toggle_completion_and_reload(id, true)?;
            ensure_found(rows, id)?;
            print_tasks(session.tasks(), json)?;
        }
        Commands::Undone { id } => {
            let rows = session.toggle_completion_and_reload(id, false)?;
            ensure_found(rows, id)?;
            print_tasks(session.tasks(), json)?;
        }
        Commands::Delete { id } => {
            let rows = session.delete_and_reload(id)?;
            ensure_found(rows, id)?;
            println!("Deleted task {}", id);
            print_tasks(session.tasks(), json)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` directives, defaulting to `info`
fn log_filter(directives: Option<String>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives.unwrap_or_default())
}

fn default_store_path() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("tasklist"))
        .ok_or_else(|| eyre!("Could not determine a data directory; pass --store-path"))
}

fn find<'s>(session: &'s Session<'_>, id: TaskId) -> Result<&'s Task> {
    session
        .tasks()
        .iter()
        .find(|task| task.id == Some(id))
        .ok_or_else(|| eyre!("Task {} not found", id))
}

fn ensure_found(rows: usize, id: TaskId) -> Result<()> {
    if rows == 0 {
        return Err(eyre!("Task {} not found", id));
    }
    Ok(())
}

fn print_tasks(tasks: &[Task], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tasks)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks");
        return Ok(());
    }

    for task in tasks {
        let id = task.id.map(|id| id.to_string()).unwrap_or_default();
        let line = task.to_string();
        if task.completed {
            println!("{:>4}  {}", id.dimmed(), line.as_str().green());
        } else {
            println!("{:>4}  {}", id.dimmed(), line);
        }
    }

    Ok(())
}

fn print_detail(task: &Task) {
    let status = if task.completed {
        "Completed".green()
    } else {
        "Pending".yellow()
    };

    println!("{} {}", "Task Name:".bold(), task.name);
    println!("{} {}", "Deadline:".bold(), task.deadline);
    println!("{} {}", "Duration (days):".bold(), task.duration);
    println!("{} {}", "Description:".bold(), task.description);
    println!("{} {}", "Status:".bold(), status);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_path_after_subcommand() {
        let cli = Cli::try_parse_from(["tasklist", "list", "-s", "/tmp/tasks"]).unwrap();
        assert_eq!(cli.store_path, Some(PathBuf::from("/tmp/tasks")));
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_global_flags_before_subcommand() {
        let cli = Cli::try_parse_from(["tasklist", "--store-path", "/tmp/tasks", "--json", "show", "3"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.store_path, Some(PathBuf::from("/tmp/tasks")));
        assert!(matches!(cli.command, Commands::Show { id } if id == TaskId::new(3)));
    }

    #[test]
    fn test_edit_negative_duration() {
        let cli = Cli::try_parse_from(["tasklist", "edit", "2", "--duration", "-1", "--completed", "true"]).unwrap();
        match cli.command {
            Commands::Edit { duration, completed, .. } => {
                assert_eq!(duration.as_deref(), Some("-1"));
                assert_eq!(completed, Some(true));
            }
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn test_log_filter_honours_directives() {
        assert_eq!(log_filter(Some("debug".to_string())).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(Some("tasklist=trace".to_string())).max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
    }
}
