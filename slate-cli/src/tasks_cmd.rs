//! Interactive task commands: the form-to-record surface.

use anyhow::{Context, Result, bail};
use chrono::Local;
use slate_core::{TaskDraft, TaskStatus, TaskStore, WeekdaySet, expand_recurrence, time};
use slate_store::SqliteTaskStore;

use crate::config::{Config, load_config};
use crate::state::default_db_path;

/// Open the store for this invocation. Every command (and every watch loop)
/// gets its own connection; nothing is shared across threads of control.
pub fn open_store(cfg: &Config) -> Result<SqliteTaskStore> {
    let path = match &cfg.store.db_path {
        Some(p) => p.clone(),
        None => default_db_path()?,
    };
    SqliteTaskStore::open(&path)
}

pub struct AddArgs {
    pub name: String,
    pub course: String,
    pub start: String,
    pub due: String,
    pub status: TaskStatus,
    pub remind_hours: u32,
    pub repeat_on: Option<WeekdaySet>,
    pub until: Option<String>,
}

pub fn add(args: AddArgs) -> Result<()> {
    let start = time::parse_datetime(&args.start).context("start")?;
    let due = time::parse_datetime(&args.due).context("due")?;

    let now = Local::now().naive_local();
    let mut seed = TaskDraft::new(args.name, args.course, start, due)
        .with_status(args.status)
        .with_reminder_hours(args.remind_hours)
        .mark_sent_if_past(now);
    if let Some(days) = args.repeat_on {
        seed = seed.with_recurrence(days);
    }
    seed.validate()?;

    // Expand before any insert so a bad recurrence leaves the table
    // untouched. Instances of a backdated series get the same past-due
    // marking as the seed.
    let instances: Vec<TaskDraft> = match (&args.repeat_on, &args.until) {
        (Some(_), Some(until)) => {
            let range_end = time::parse_date(until).context("until")?;
            expand_recurrence(&seed, range_end)?
                .into_iter()
                .map(|inst| inst.mark_sent_if_past(now))
                .collect()
        }
        (Some(_), None) => bail!("recurring tasks need --until <date>"),
        (None, Some(_)) => bail!("--until requires --repeat-on <days>"),
        (None, None) => Vec::new(),
    };

    let cfg = load_config()?;
    let store = open_store(&cfg)?;

    let seed_id = store.insert(&seed)?;
    println!(
        "Added task {} ({} due {})",
        seed_id,
        seed.name,
        time::format_display(seed.due)
    );

    for inst in &instances {
        let id = store.insert(inst)?;
        println!("  + instance {} on {}", id, time::format_display(inst.start));
    }
    if !instances.is_empty() {
        println!(
            "Generated {} recurring instances ({})",
            instances.len(),
            seed.recurrence_days
        );
    }

    Ok(())
}

pub fn list(course: Option<String>, json: bool) -> Result<()> {
    let cfg = load_config()?;
    let store = open_store(&cfg)?;
    let scan = store.scan_all()?;

    let tasks: Vec<_> = scan
        .tasks
        .into_iter()
        .filter(|t| course.as_deref().is_none_or(|c| t.course == c))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks.");
    }
    for t in &tasks {
        let recur = if t.recurrence_days.is_empty() {
            String::new()
        } else {
            format!(" [{}]", t.recurrence_days)
        };
        println!(
            "{:>4}. {} | {} | {} -> {} | {}{}",
            t.id,
            t.name,
            t.course,
            time::format_display(t.start),
            time::format_display(t.due),
            t.status,
            recur
        );
    }
    if scan.skipped_rows > 0 {
        eprintln!("warning: skipped {} undecodable rows", scan.skipped_rows);
    }

    Ok(())
}

pub struct EditArgs {
    pub id: i64,
    pub name: Option<String>,
    pub course: Option<String>,
    pub start: Option<String>,
    pub due: Option<String>,
    pub status: Option<TaskStatus>,
    pub remind_hours: Option<u32>,
    pub repeat_on: Option<WeekdaySet>,
}

pub fn edit(args: EditArgs) -> Result<()> {
    let cfg = load_config()?;
    let store = open_store(&cfg)?;

    let scan = store.scan_all()?;
    let current = scan
        .tasks
        .into_iter()
        .find(|t| t.id == args.id)
        .with_context(|| format!("no task with id {}", args.id))?;

    let draft = TaskDraft {
        name: args.name.unwrap_or(current.name),
        course: args.course.unwrap_or(current.course),
        start: match args.start {
            Some(s) => time::parse_datetime(&s).context("start")?,
            None => current.start,
        },
        due: match args.due {
            Some(s) => time::parse_datetime(&s).context("due")?,
            None => current.due,
        },
        status: args.status.unwrap_or(current.status),
        recurrence_days: args.repeat_on.unwrap_or(current.recurrence_days),
        reminder_hours: args.remind_hours.unwrap_or(current.reminder_hours),
        reminder_sent: current.reminder_sent,
    };
    draft.validate()?;

    let n = store.update(args.id, &draft)?;
    if n == 0 {
        bail!("no task with id {} (deleted underneath us?)", args.id);
    }
    println!("Updated task {}", args.id);
    Ok(())
}

pub fn set_status(id: i64, status: TaskStatus) -> Result<()> {
    let cfg = load_config()?;
    let store = open_store(&cfg)?;
    if store.set_status(id, status)? == 0 {
        bail!("no task with id {id}");
    }
    println!("Task {id} -> {status}");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let cfg = load_config()?;
    let store = open_store(&cfg)?;
    if store.delete(id)? == 0 {
        bail!("no task with id {id}");
    }
    println!("Deleted task {id}");
    Ok(())
}

pub fn delete_all(yes: bool) -> Result<()> {
    if !yes {
        bail!("this deletes every task; re-run with --yes to confirm");
    }
    let cfg = load_config()?;
    let store = open_store(&cfg)?;
    let n = store.delete_all()?;
    println!("Deleted {n} tasks");
    Ok(())
}

pub fn pending() -> Result<()> {
    let cfg = load_config()?;
    let store = open_store(&cfg)?;
    let now = Local::now().naive_local();
    let count = store
        .scan_all()?
        .tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Completed && t.due > now)
        .count();
    println!("{count} pending");
    Ok(())
}
