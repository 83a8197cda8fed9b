//! Reminder evaluation: classify every stored task against wall-clock time
//! and dispatch at most one notification per task.
//!
//! The evaluator only ever writes one field (`reminder_sent`); all other
//! mutation belongs to the interactive side. Delivery is best-effort: the
//! flag is persisted whether or not the notifier reports success, so a task
//! with a permanently failing recipient cannot retry forever. That trade-off
//! is surfaced in `CycleReport` rather than hidden.

use anyhow::Result;
use chrono::{Duration, NaiveDateTime};

use crate::task::{Task, TaskDraft, TaskStatus};
use crate::time::format_display;

/// Result of one full-table read. Rows the store could not decode (e.g. a
/// hand-edited timestamp) are skipped and counted, never fatal.
#[derive(Debug, Clone, Default)]
pub struct TableScan {
    pub tasks: Vec<Task>,
    pub skipped_rows: usize,
}

/// Durable task table. Update-style calls return the affected row count;
/// 0 means "no such id".
pub trait TaskStore {
    fn insert(&self, draft: &TaskDraft) -> Result<i64>;
    fn update(&self, id: i64, draft: &TaskDraft) -> Result<usize>;
    fn set_status(&self, id: i64, status: TaskStatus) -> Result<usize>;
    fn mark_reminder_sent(&self, id: i64) -> Result<usize>;
    fn scan_all(&self) -> Result<TableScan>;
    fn delete(&self, id: i64) -> Result<usize>;
    fn delete_all(&self) -> Result<usize>;
}

/// Outbound notification transport. Must not panic past this boundary; all
/// transport failures collapse to `false` plus the implementation's own log.
pub trait Notifier {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> bool;
}

/// Derived per-task reminder state. Only `reminder_sent` is stored; the rest
/// is computed from `now` each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    /// Reminders disabled (no lead time) or task completed.
    Dormant,
    /// Before the eligibility window.
    Pending,
    /// Inside `[due - reminder_hours, due)`: dispatch now.
    Eligible,
    /// Window missed entirely (process was offline). Never sent late.
    Expired,
    /// Flag already set. Terminal.
    Sent,
}

pub fn classify(task: &Task, now: NaiveDateTime) -> ReminderState {
    if task.reminder_sent {
        return ReminderState::Sent;
    }
    if task.reminder_hours == 0 || task.status == TaskStatus::Completed {
        return ReminderState::Dormant;
    }
    if now >= task.due {
        return ReminderState::Expired;
    }
    if now >= task.due - Duration::hours(i64::from(task.reminder_hours)) {
        return ReminderState::Eligible;
    }
    ReminderState::Pending
}

/// What one evaluation cycle did.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Tasks read this cycle.
    pub evaluated: usize,
    /// Ids dispatched and durably flagged this cycle.
    pub dispatched: Vec<i64>,
    /// Dispatches where the notifier reported failure (flag still set).
    pub failed_sends: usize,
    /// Per-task store failures while persisting the flag. Does not abort
    /// the rest of the cycle.
    pub flag_errors: Vec<(i64, String)>,
    /// Rows skipped by the store as undecodable.
    pub skipped_rows: usize,
    /// Tasks not Completed and due in the future, for the status surface.
    pub pending: usize,
}

pub fn reminder_subject(task: &Task) -> String {
    format!("Reminder: {} due soon", task.name)
}

pub fn reminder_body(task: &Task) -> String {
    format!(
        "Your assignment '{}' for {} is due at {}.",
        task.name,
        task.course,
        format_display(task.due)
    )
}

/// Run one evaluation cycle against a snapshot of the task table.
///
/// `now` is read once by the caller and used for every task in the cycle so
/// a slow notifier cannot shift the window mid-scan. Each eligible task gets
/// exactly one dispatch attempt; the sent flag is persisted regardless of
/// delivery outcome before the report returns.
///
/// A dry run previews eligible tasks through the notifier but writes
/// nothing, so the same reminders fire again on the next real cycle.
pub fn run_cycle<S, N>(
    store: &S,
    notifier: &N,
    recipient: &str,
    now: NaiveDateTime,
    dry_run: bool,
) -> Result<CycleReport>
where
    S: TaskStore + ?Sized,
    N: Notifier + ?Sized,
{
    let scan = store.scan_all()?;
    let mut report = CycleReport {
        evaluated: scan.tasks.len(),
        skipped_rows: scan.skipped_rows,
        ..Default::default()
    };

    for task in &scan.tasks {
        if classify(task, now) != ReminderState::Eligible {
            continue;
        }

        let delivered = notifier.send(recipient, &reminder_subject(task), &reminder_body(task));
        if !delivered {
            report.failed_sends += 1;
        }

        if dry_run {
            report.dispatched.push(task.id);
            continue;
        }

        // At-most-once: flag even on delivery failure, isolate store errors
        // per task so one bad row cannot starve the rest of the cycle.
        match store.mark_reminder_sent(task.id) {
            Ok(0) => report.flag_errors.push((task.id, "no row with this id".to_string())),
            Ok(_) => report.dispatched.push(task.id),
            Err(e) => report.flag_errors.push((task.id, e.to_string())),
        }
    }

    report.pending = scan
        .tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Completed && t.due > now)
        .count();

    Ok(report)
}
