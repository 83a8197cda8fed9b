//! The reminder watch loop: a fixed-interval evaluator over the task table.
//!
//! Runs until Ctrl-C. Each cycle is synchronous and runs to completion, so
//! shutdown can never land between a dispatched notification and its
//! persisted sent flag.

use std::time::Duration;

use anyhow::{Result, bail};
use chrono::Local;
use slate_core::{CycleReport, Notifier, run_cycle};
use slate_store::SqliteTaskStore;

use crate::config::load_config;
use crate::notify::{CommandNotifier, ConsoleNotifier, is_valid_email};
use crate::tasks_cmd::open_store;

pub async fn run(interval_secs: Option<u64>, once: bool, dry_run: bool) -> Result<()> {
    let cfg = load_config()?;

    let recipient = match cfg.reminders.recipient.clone() {
        Some(r) => r,
        None => bail!(
            "no recipient configured; set [reminders].recipient in ~/.slate/config.toml \
             (see `slate config check`)"
        ),
    };
    if !is_valid_email(&recipient) {
        bail!("invalid recipient '{recipient}': expected an email address");
    }

    let notifier: Box<dyn Notifier> = if dry_run {
        Box::new(ConsoleNotifier)
    } else {
        match cfg.reminders.notify_command.clone() {
            Some(argv) if !argv.is_empty() => Box::new(CommandNotifier::new(argv)),
            _ => bail!(
                "no [reminders].notify_command configured; set one or pass --dry-run"
            ),
        }
    };

    let store = open_store(&cfg)?;
    let interval = interval_secs.unwrap_or(cfg.reminders.interval_secs).max(1);

    if once {
        cycle(&store, notifier.as_ref(), &recipient, dry_run)?;
        return Ok(());
    }

    println!("Watching for due reminders every {interval}s (Ctrl-C to stop)");
    let mut ticker = tokio::time::interval(Duration::from_secs(interval));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // A store failure skips this cycle, not the loop.
                if let Err(e) = cycle(&store, notifier.as_ref(), &recipient, dry_run) {
                    eprintln!("cycle failed: {e:#}");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Stopping watch loop");
                break;
            }
        }
    }

    Ok(())
}

fn cycle(
    store: &SqliteTaskStore,
    notifier: &dyn Notifier,
    recipient: &str,
    dry_run: bool,
) -> Result<()> {
    // One clock read per cycle; every task is classified against it.
    let now = Local::now().naive_local();
    let report = run_cycle(store, notifier, recipient, now, dry_run)?;
    log_report(&report);
    Ok(())
}

fn log_report(report: &CycleReport) {
    for id in &report.dispatched {
        println!("Reminder dispatched for task {id}");
    }
    if report.failed_sends > 0 {
        eprintln!(
            "{} delivery failure(s); sent flag set anyway (at-most-once, no retry)",
            report.failed_sends
        );
    }
    for (id, err) in &report.flag_errors {
        eprintln!("failed to persist sent flag for task {id}: {err}");
    }
    if report.skipped_rows > 0 {
        eprintln!("skipped {} undecodable rows this cycle", report.skipped_rows);
    }
    println!(
        "{} evaluated, {} pending",
        report.evaluated, report.pending
    );
}
