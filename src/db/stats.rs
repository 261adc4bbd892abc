//! Aggregation queries for statistics.

use super::Database;
use crate::types::OwnerStats;
use anyhow::Result;

impl Database {
    /// Per-owner task counts, ordered by owner id.
    pub fn owner_stats(&self) -> Result<Vec<OwnerStats>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, COUNT(*) AS task_count, MAX(created_at) AS last_created_at
                 FROM tasks
                 GROUP BY user_id
                 ORDER BY user_id ASC",
            )?;
            let stats = stmt
                .query_map([], |row| {
                    Ok(OwnerStats {
                        owner_id: row.get("user_id")?,
                        task_count: row.get("task_count")?,
                        last_created_at: row.get("last_created_at")?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(stats)
        })
    }

    /// Total number of tasks across all owners.
    pub fn total_tasks(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let total = conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
            Ok(total)
        })
    }
}
