//! Schema bootstrap and additive migrations for the task table.
//!
//! The table layout matches what earlier versions of the tracker wrote, so
//! an existing `tasks.db` keeps working: new columns are added with defaults
//! that leave old rows semantically unchanged.

use chrono::NaiveDateTime;
use rusqlite::Connection;

use slate_core::time::parse_datetime;

const CREATE_TASKS: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    course TEXT NOT NULL DEFAULT '',
    start TEXT NOT NULL,
    due TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'Not Started',
    recurrence_days INTEGER NOT NULL DEFAULT 0
)";

/// Idempotent schema application: base table plus the two reminder columns
/// added after the first release.
///
/// `now` anchors the `reminder_sent` backfill: when the column is first
/// added, any row already past its due time is marked sent so historical
/// tasks never fire on first load.
pub fn apply_schema(conn: &Connection, now: NaiveDateTime) -> rusqlite::Result<()> {
    conn.execute(CREATE_TASKS, [])?;

    if !column_exists(conn, "tasks", "reminder_hours")? {
        conn.execute(
            "ALTER TABLE tasks ADD COLUMN reminder_hours INTEGER NOT NULL DEFAULT 24",
            [],
        )?;
    }

    if !column_exists(conn, "tasks", "reminder_sent")? {
        conn.execute(
            "ALTER TABLE tasks ADD COLUMN reminder_sent INTEGER NOT NULL DEFAULT 0",
            [],
        )?;
        backfill_sent_flags(conn, now)?;
    }

    Ok(())
}

/// Mark rows already past their due time as sent. Legacy rows may hold the
/// display format, which does not order as TEXT, so each `due` is parsed in
/// Rust rather than compared in SQL. Unparseable rows are left alone.
fn backfill_sent_flags(conn: &Connection, now: NaiveDateTime) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare("SELECT id, due FROM tasks")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut past = Vec::new();
    for row in rows {
        let (id, due) = row?;
        if let Ok(due) = parse_datetime(&due) {
            if due < now {
                past.push(id);
            }
        }
    }

    for id in past {
        conn.execute("UPDATE tasks SET reminder_sent = 1 WHERE id = ?1", [id])?;
    }
    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
