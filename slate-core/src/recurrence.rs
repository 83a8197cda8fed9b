//! Recurrence expansion: turn one task template into the concrete instances
//! of its weekday pattern.
//!
//! Pure generator: no store access. The caller persists the seed instance
//! itself, then persists whatever this returns.

use anyhow::{Result, bail};
use chrono::{Datelike, NaiveDate};

use crate::task::TaskDraft;

/// Expand `seed` across every date in `[seed.start.date(), range_end]` whose
/// weekday is in `seed.recurrence_days`, excluding the seed's own date.
///
/// Every instance keeps the seed's start-to-due span: a task that starts
/// Monday 09:00 and is due Monday 17:00 recurs as 09:00-17:00 on each
/// selected day. Spans crossing midnight shift the due date the same way.
///
/// `range_end` before the seed date yields an empty vec, not an error. An
/// empty weekday selection is a validation error; it would otherwise
/// silently generate nothing.
pub fn expand_recurrence(seed: &TaskDraft, range_end: NaiveDate) -> Result<Vec<TaskDraft>> {
    if seed.recurrence_days.is_empty() {
        bail!("recurrence_days: select at least one weekday for a recurring task");
    }
    seed.validate()?;

    let delta = seed.due - seed.start;
    let seed_date = seed.start.date();
    let mut out = Vec::new();

    let mut d = seed_date;
    while d <= range_end {
        if d != seed_date && seed.recurrence_days.contains(d.weekday()) {
            let start = d.and_time(seed.start.time());
            let mut inst = seed.clone();
            inst.start = start;
            inst.due = start + delta;
            inst.reminder_sent = false;
            out.push(inst);
        }
        d = match d.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    Ok(out)
}
