//! SQLite-backed `TaskStore`.
//!
//! One store handle wraps one connection behind a mutex. The interactive
//! commands and the watch loop each open their own handle; they share only
//! the database file, and the only field both sides touch is
//! `reminder_sent` via single-row updates.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDateTime};
use rusqlite::{Connection, Row, params};

use slate_core::evaluator::{TableScan, TaskStore};
use slate_core::task::{Task, TaskDraft, TaskStatus};
use slate_core::time::{format_stored, parse_datetime};
use slate_core::weekday::WeekdaySet;

use crate::schema::apply_schema;

pub struct SqliteTaskStore {
    conn: Mutex<Connection>,
}

const TASK_COLUMNS: &str =
    "id, name, course, start, due, status, recurrence_days, reminder_hours, reminder_sent";

impl SqliteTaskStore {
    /// Open (or create) the database at `path` and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("open task db {}", path.display()))?;
        Self::from_connection(conn, Local::now().naive_local())
    }

    /// Fresh in-memory store, mainly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory task db")?;
        Self::from_connection(conn, Local::now().naive_local())
    }

    /// `now` anchors the one-time reminder_sent backfill in `apply_schema`.
    pub(crate) fn from_connection(conn: Connection, now: NaiveDateTime) -> Result<Self> {
        apply_schema(&conn, now).context("apply task schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("task store mutex poisoned"))
    }
}

fn decode_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, String, String, String, i64, i64, i64)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

/// Turn a raw row into a `Task`, or `None` if a stored field no longer
/// parses (hand-edited db, pre-history rows). Callers count these instead
/// of failing the scan.
fn to_task(raw: (i64, String, String, String, String, String, i64, i64, i64)) -> Option<Task> {
    let (id, name, course, start, due, status, mask, hours, sent) = raw;
    let start = parse_datetime(&start).ok()?;
    let due = parse_datetime(&due).ok()?;
    let status = TaskStatus::parse(&status).ok()?;
    Some(Task {
        id,
        name,
        course,
        start,
        due,
        status,
        recurrence_days: WeekdaySet::from_bitmask(mask),
        reminder_hours: hours.clamp(0, i64::from(u32::MAX)) as u32,
        reminder_sent: sent != 0,
    })
}

impl TaskStore for SqliteTaskStore {
    fn insert(&self, draft: &TaskDraft) -> Result<i64> {
        draft.validate()?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO tasks (name, course, start, due, status, recurrence_days, reminder_hours, reminder_sent) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                draft.name,
                draft.course,
                format_stored(draft.start),
                format_stored(draft.due),
                draft.status.as_str(),
                draft.recurrence_days.bitmask(),
                i64::from(draft.reminder_hours),
                draft.reminder_sent as i64,
            ],
        )
        .context("insert task")?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, id: i64, draft: &TaskDraft) -> Result<usize> {
        draft.validate()?;
        let conn = self.lock()?;
        // reminder_sent is deliberately not touched here; only the
        // evaluator writes it.
        let n = conn
            .execute(
                "UPDATE tasks SET name=?1, course=?2, start=?3, due=?4, status=?5, \
                 recurrence_days=?6, reminder_hours=?7 WHERE id=?8",
                params![
                    draft.name,
                    draft.course,
                    format_stored(draft.start),
                    format_stored(draft.due),
                    draft.status.as_str(),
                    draft.recurrence_days.bitmask(),
                    i64::from(draft.reminder_hours),
                    id,
                ],
            )
            .context("update task")?;
        Ok(n)
    }

    fn set_status(&self, id: i64, status: TaskStatus) -> Result<usize> {
        let conn = self.lock()?;
        let n = conn
            .execute(
                "UPDATE tasks SET status=?1 WHERE id=?2",
                params![status.as_str(), id],
            )
            .context("update task status")?;
        Ok(n)
    }

    fn mark_reminder_sent(&self, id: i64) -> Result<usize> {
        let conn = self.lock()?;
        let n = conn
            .execute("UPDATE tasks SET reminder_sent=1 WHERE id=?1", params![id])
            .context("mark reminder sent")?;
        Ok(n)
    }

    fn scan_all(&self) -> Result<TableScan> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"))
            .context("prepare task scan")?;
        let rows = stmt.query_map([], decode_row).context("scan tasks")?;

        let mut scan = TableScan::default();
        for raw in rows {
            match to_task(raw.context("read task row")?) {
                Some(task) => scan.tasks.push(task),
                None => scan.skipped_rows += 1,
            }
        }
        Ok(scan)
    }

    fn delete(&self, id: i64) -> Result<usize> {
        let conn = self.lock()?;
        let n = conn
            .execute("DELETE FROM tasks WHERE id=?1", params![id])
            .context("delete task")?;
        Ok(n)
    }

    fn delete_all(&self) -> Result<usize> {
        let conn = self.lock()?;
        let n = conn.execute("DELETE FROM tasks", []).context("delete all tasks")?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn draft() -> TaskDraft {
        TaskDraft::new("hw1", "Database Design", dt(2024, 3, 4, 9), dt(2024, 3, 4, 17))
            .with_status(TaskStatus::InProgress)
            .with_reminder_hours(24)
    }

    #[test]
    fn insert_and_scan_round_trip() {
        let store = SqliteTaskStore::open_in_memory().unwrap();
        let id = store.insert(&draft()).unwrap();
        assert!(id > 0);

        let scan = store.scan_all().unwrap();
        assert_eq!(scan.skipped_rows, 0);
        assert_eq!(scan.tasks.len(), 1);
        let t = &scan.tasks[0];
        assert_eq!(t.id, id);
        assert_eq!(t.name, "hw1");
        assert_eq!(t.status, TaskStatus::InProgress);
        assert_eq!(t.start, dt(2024, 3, 4, 9));
        assert_eq!(t.due, dt(2024, 3, 4, 17));
        assert!(!t.reminder_sent);
    }

    #[test]
    fn insert_rejects_invalid_draft() {
        let store = SqliteTaskStore::open_in_memory().unwrap();
        let mut d = draft();
        d.name = String::new();
        assert!(store.insert(&d).is_err());
        assert!(store.scan_all().unwrap().tasks.is_empty());
    }

    #[test]
    fn update_reports_missing_id_and_preserves_sent_flag() {
        let store = SqliteTaskStore::open_in_memory().unwrap();
        let id = store.insert(&draft()).unwrap();
        store.mark_reminder_sent(id).unwrap();

        let mut d = draft();
        d.name = "hw1 revised".to_string();
        assert_eq!(store.update(id, &d).unwrap(), 1);
        assert_eq!(store.update(id + 99, &d).unwrap(), 0);

        let t = &store.scan_all().unwrap().tasks[0];
        assert_eq!(t.name, "hw1 revised");
        // An edit never resets the durable sent flag.
        assert!(t.reminder_sent);
    }

    #[test]
    fn set_status_and_mark_sent_affect_one_row() {
        let store = SqliteTaskStore::open_in_memory().unwrap();
        let a = store.insert(&draft()).unwrap();
        let b = store.insert(&draft()).unwrap();

        assert_eq!(store.set_status(a, TaskStatus::Completed).unwrap(), 1);
        assert_eq!(store.mark_reminder_sent(b).unwrap(), 1);
        assert_eq!(store.mark_reminder_sent(b + 99).unwrap(), 0);

        let tasks = store.scan_all().unwrap().tasks;
        assert_eq!(tasks[0].status, TaskStatus::Completed);
        assert!(!tasks[0].reminder_sent);
        assert!(tasks[1].reminder_sent);
    }

    #[test]
    fn delete_and_delete_all() {
        let store = SqliteTaskStore::open_in_memory().unwrap();
        let a = store.insert(&draft()).unwrap();
        store.insert(&draft()).unwrap();

        assert_eq!(store.delete(a).unwrap(), 1);
        assert_eq!(store.delete(a).unwrap(), 0);
        assert_eq!(store.delete_all().unwrap(), 1);
        assert!(store.scan_all().unwrap().tasks.is_empty());
    }

    #[test]
    fn legacy_table_gains_columns_and_backfills_past_due_rows() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                course TEXT NOT NULL DEFAULT '',
                start TEXT NOT NULL,
                due TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Not Started',
                recurrence_days INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO tasks (name, course, start, due, status) VALUES
             ('old', 'CTC', '2024-01-01 09:00:00', '2024-01-02 17:00:00', 'Not Started'),
             ('upcoming', 'CTC', '2024-03-01 09:00:00', '2024-03-10 17:00:00', 'Not Started')",
            [],
        )
        .unwrap();

        let store = SqliteTaskStore::from_connection(conn, dt(2024, 3, 4, 12)).unwrap();
        let tasks = store.scan_all().unwrap().tasks;
        assert_eq!(tasks.len(), 2);
        // Already-due row is retroactively marked sent; future row is not.
        assert!(tasks[0].reminder_sent);
        assert!(!tasks[1].reminder_sent);
        // New column default applies to pre-existing rows.
        assert_eq!(tasks[0].reminder_hours, 24);
    }

    #[test]
    fn backfill_handles_legacy_format_and_unparseable_rows() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                course TEXT NOT NULL DEFAULT '',
                start TEXT NOT NULL,
                due TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Not Started',
                recurrence_days INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )
        .unwrap();
        // Display-format rows do not order as TEXT against stored-format
        // timestamps ("03/04/26 ..." < "2024-..."), so a naive SQL
        // comparison would flag the future one.
        conn.execute(
            "INSERT INTO tasks (name, course, start, due) VALUES
             ('far future', 'CTC', '03/04/26 09:00 AM', '03/04/26 05:00 PM'),
             ('long past', 'CTC', '01/02/24 09:00 AM', '01/02/24 05:00 PM'),
             ('garbled', 'CTC', 'not a time', 'also bad')",
            [],
        )
        .unwrap();

        let store = SqliteTaskStore::from_connection(conn, dt(2024, 3, 4, 12)).unwrap();
        let scan = store.scan_all().unwrap();
        assert_eq!(scan.tasks.len(), 2);
        assert_eq!(scan.skipped_rows, 1);
        // Future-due legacy row keeps its reminder; past one is marked sent.
        assert!(!scan.tasks[0].reminder_sent);
        assert!(scan.tasks[1].reminder_sent);

        // The garbled row was left untouched by the backfill.
        let raw_sent: i64 = store
            .lock()
            .unwrap()
            .query_row("SELECT reminder_sent FROM tasks WHERE name='garbled'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(raw_sent, 0);
    }

    #[test]
    fn migration_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn, dt(2024, 3, 4, 12)).unwrap();
        apply_schema(&conn, dt(2024, 3, 5, 12)).unwrap();
        let store = SqliteTaskStore::from_connection(conn, dt(2024, 3, 6, 12)).unwrap();
        store.insert(&draft()).unwrap();
        assert_eq!(store.scan_all().unwrap().tasks.len(), 1);
    }

    #[test]
    fn unparseable_timestamp_rows_are_skipped_not_fatal() {
        let store = SqliteTaskStore::open_in_memory().unwrap();
        store.insert(&draft()).unwrap();
        {
            let conn = store.lock().unwrap();
            conn.execute(
                "INSERT INTO tasks (name, course, start, due, status, recurrence_days, reminder_hours, reminder_sent)
                 VALUES ('broken', 'CTC', 'not a time', 'also bad', 'Not Started', 0, 24, 0)",
                [],
            )
            .unwrap();
        }

        let scan = store.scan_all().unwrap();
        assert_eq!(scan.tasks.len(), 1);
        assert_eq!(scan.skipped_rows, 1);
    }
}
