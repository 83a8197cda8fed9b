//! slate-core: task model, recurrence expansion, and reminder evaluation
//! for the Slate assignment tracker.

pub mod evaluator;
pub mod recurrence;
pub mod task;
pub mod time;
pub mod weekday;

pub use evaluator::{
    CycleReport, Notifier, ReminderState, TableScan, TaskStore, classify, reminder_body,
    reminder_subject, run_cycle,
};
pub use recurrence::expand_recurrence;
pub use task::{Task, TaskDraft, TaskStatus};
pub use weekday::WeekdaySet;
