//! Task CRUD scoped by owner.
//!
//! Every query filters on both `user_id` and `id`. A task owned by someone
//! else looks exactly like a task that does not exist.

use super::{Database, now_ms};
use crate::error::BotError;
use crate::types::{Task, TaskId, UserId};
use anyhow::Result;
use rusqlite::{Connection, Row, params};

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        owner_id: row.get("user_id")?,
        text: row.get("text")?,
        created_at: row.get("created_at")?,
    })
}

fn ensure_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(BotError::missing_argument("text").into());
    }
    Ok(())
}

/// Internal helper to get a task using an existing connection.
fn get_task_internal(
    conn: &Connection,
    owner_id: UserId,
    task_id: TaskId,
) -> Result<Option<Task>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, text, created_at FROM tasks
         WHERE user_id = ?1 AND id = ?2",
    )?;

    let result = stmt.query_row(params![owner_id, task_id], parse_task_row);

    match result {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Database {
    /// Append a task to the owner's list and return its new id.
    pub fn add_task(&self, owner_id: UserId, text: &str) -> Result<TaskId> {
        ensure_text(text)?;
        let now = now_ms();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (user_id, text, created_at) VALUES (?1, ?2, ?3)",
                params![owner_id, text, now],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// All of the owner's tasks in creation order.
    pub fn list_tasks(&self, owner_id: UserId) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, text, created_at FROM tasks
                 WHERE user_id = ?1
                 ORDER BY id ASC",
            )?;
            let tasks = stmt
                .query_map(params![owner_id], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Look up one of the owner's tasks.
    pub fn get_task(&self, owner_id: UserId, task_id: TaskId) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, owner_id, task_id))
    }

    /// Remove a task. Returns false if no task of this owner had that id.
    pub fn delete_task(&self, owner_id: UserId, task_id: TaskId) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM tasks WHERE user_id = ?1 AND id = ?2",
                params![owner_id, task_id],
            )?;
            Ok(removed > 0)
        })
    }

    /// Replace a task's text, leaving `created_at` alone.
    /// Returns false if no task of this owner had that id.
    pub fn edit_task(&self, owner_id: UserId, task_id: TaskId, new_text: &str) -> Result<bool> {
        ensure_text(new_text)?;

        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE tasks SET text = ?1 WHERE user_id = ?2 AND id = ?3",
                params![new_text, owner_id, task_id],
            )?;
            Ok(updated > 0)
        })
    }

    /// Number of tasks the owner currently has.
    pub fn count_tasks(&self, owner_id: UserId) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM tasks WHERE user_id = ?1",
                params![owner_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }
}
