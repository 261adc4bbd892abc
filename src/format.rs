//! Output formatting for the command-line reports.

use crate::types::OwnerStats;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
}

fn format_timestamp(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// Per-owner task counts as an aligned text table.
pub fn format_stats_table(stats: &[OwnerStats]) -> String {
    if stats.is_empty() {
        return "No tasks stored.\n".to_string();
    }

    let owner_width = stats
        .iter()
        .map(|s| s.owner_id.to_string().len())
        .max()
        .unwrap_or(0)
        .max("OWNER".len());

    let mut out = format!("{:<owner_width$}  {:>5}  {}\n", "OWNER", "TASKS", "LAST ADDED");
    for s in stats {
        out.push_str(&format!(
            "{:<owner_width$}  {:>5}  {}\n",
            s.owner_id,
            s.task_count,
            format_timestamp(s.last_created_at)
        ));
    }
    let total: i64 = stats.iter().map(|s| s.task_count).sum();
    out.push_str(&format!("{} owners, {} tasks\n", stats.len(), total));
    out
}

/// Per-owner task counts as JSON.
pub fn format_stats_json(stats: &[OwnerStats]) -> Value {
    let total: i64 = stats.iter().map(|s| s.task_count).sum();
    json!({
        "owners": stats,
        "total_tasks": total,
    })
}
