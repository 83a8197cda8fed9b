use anyhow::Result;
use clap::{Parser, Subcommand};
use slate_core::{TaskStatus, WeekdaySet};

mod config;
mod notify;
mod state;
mod tasks_cmd;
mod watch_cmd;

#[derive(Parser, Debug)]
#[command(name = "slate", version, about = "Coursework task tracker with due-date reminders")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a task; --repeat-on/--until generate the recurring instances
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        course: String,

        /// Start date/time, e.g. "2024-03-04 09:00" or "03/04/24 09:00 AM"
        #[arg(long)]
        start: String,

        /// Due date/time; must not be before start
        #[arg(long)]
        due: String,

        #[arg(long, default_value = "not-started")]
        status: TaskStatus,

        /// Hours before due to send the reminder; 0 disables it
        #[arg(long, default_value_t = 24)]
        remind_hours: u32,

        /// Weekdays to repeat on, e.g. "mon,wed"
        #[arg(long)]
        repeat_on: Option<WeekdaySet>,

        /// Last calendar date of the recurrence range
        #[arg(long)]
        until: Option<String>,
    },

    /// List tasks
    List {
        /// Only tasks for this course
        #[arg(long)]
        course: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Edit fields of one task
    Edit {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        course: Option<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        status: Option<TaskStatus>,

        #[arg(long)]
        remind_hours: Option<u32>,

        #[arg(long)]
        repeat_on: Option<WeekdaySet>,
    },

    /// Set the status of one task
    SetStatus {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        status: TaskStatus,
    },

    /// Delete one task
    Delete {
        #[arg(long)]
        id: i64,
    },

    /// Delete every task
    DeleteAll {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },

    /// Count of tasks not completed and due in the future
    Pending,

    /// Run the reminder evaluator loop
    Watch {
        /// Seconds between cycles (default from config, fallback 60)
        #[arg(long)]
        interval_secs: Option<u64>,

        /// Run a single cycle and exit
        #[arg(long, default_value_t = false)]
        once: bool,

        /// Print reminders instead of delivering them
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Config management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default ~/.slate/config.toml
    Init,

    /// Show reminder-related config and what to set
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Add {
            name,
            course,
            start,
            due,
            status,
            remind_hours,
            repeat_on,
            until,
        } => tasks_cmd::add(tasks_cmd::AddArgs {
            name,
            course,
            start,
            due,
            status,
            remind_hours,
            repeat_on,
            until,
        })?,

        Command::List { course, json } => tasks_cmd::list(course, json)?,

        Command::Edit {
            id,
            name,
            course,
            start,
            due,
            status,
            remind_hours,
            repeat_on,
        } => tasks_cmd::edit(tasks_cmd::EditArgs {
            id,
            name,
            course,
            start,
            due,
            status,
            remind_hours,
            repeat_on,
        })?,

        Command::SetStatus { id, status } => tasks_cmd::set_status(id, status)?,

        Command::Delete { id } => tasks_cmd::delete(id)?,

        Command::DeleteAll { yes } => tasks_cmd::delete_all(yes)?,

        Command::Pending => tasks_cmd::pending()?,

        Command::Watch {
            interval_secs,
            once,
            dry_run,
        } => watch_cmd::run(interval_secs, once, dry_run).await?,

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Check => config::config_check()?,
        },
    }

    Ok(())
}
