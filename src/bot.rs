//! Bot runtime: long-poll Telegram and feed events to the router.
//!
//! Each polled batch is split by user. Users are served concurrently, one
//! tokio task each, while a single user's events are handled strictly in
//! the order they arrived. The next batch is fetched only after the whole
//! batch is done.

use crate::config::Config;
use crate::db::Database;
use crate::pending::PendingActions;
use crate::router::Router;
use crate::transport::InboundEvent;
use crate::transport::telegram::{ButtonLabels, TelegramTransport, TelegramUpdate};
use crate::types::UserId;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Delay before polling again after a failed `getUpdates`.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Split events into per-user queues, keeping arrival order inside each
/// queue. Queues are ordered by each user's first event.
pub fn group_by_user(events: Vec<InboundEvent>) -> Vec<(UserId, Vec<InboundEvent>)> {
    let mut index: HashMap<UserId, usize> = HashMap::new();
    let mut queues: Vec<(UserId, Vec<InboundEvent>)> = Vec::new();

    for event in events {
        let slot = *index.entry(event.user_id).or_insert_with(|| {
            queues.push((event.user_id, Vec::new()));
            queues.len() - 1
        });
        queues[slot].1.push(event);
    }
    queues
}

/// Handle a batch of events to completion.
pub async fn dispatch_batch(router: &Router, events: Vec<InboundEvent>) {
    let mut workers = JoinSet::new();

    for (user_id, queue) in group_by_user(events) {
        let router = router.clone();
        workers.spawn(async move {
            for event in queue {
                match router.handle(event).await {
                    Ok(()) => {}
                    Err(err) if err.is_user_facing() => {
                        debug!(user_id, code = ?err.code, error = %err, "Rejected event");
                    }
                    Err(err) => {
                        warn!(user_id, code = ?err.code, error = %err, "Failed to handle event");
                    }
                }
            }
        });
    }

    while let Some(joined) = workers.join_next().await {
        if let Err(err) = joined {
            error!(error = %err, "Event worker panicked");
        }
    }
}

/// Open storage, verify the token, and serve until Ctrl-C.
pub async fn run(config: Config, token: String) -> Result<()> {
    let db = Database::open(&config.storage.db_path).with_context(|| {
        format!(
            "failed to open database {}",
            config.storage.db_path.display()
        )
    })?;
    info!(path = %config.storage.db_path.display(), "Database opened");

    let messages = Arc::new(config.messages.clone());
    let transport = Arc::new(TelegramTransport::new(
        &config.telegram,
        token,
        ButtonLabels::from_messages(&messages),
    )?);

    let username = transport
        .get_me()
        .await
        .context("Telegram rejected the bot token")?;
    info!(bot = %username, "Bot started");

    let pending = Arc::new(PendingActions::new());
    let router = Router::new(db, pending, transport.clone(), messages);

    poll_loop(&router, &transport).await;

    info!("Bot stopped");
    Ok(())
}

async fn poll_loop(router: &Router, transport: &TelegramTransport) {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut offset = 0i64;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            polled = transport.get_updates(offset) => {
                match polled {
                    Ok((updates, next_offset)) => {
                        offset = next_offset;
                        let events: Vec<InboundEvent> = updates
                            .into_iter()
                            .filter_map(TelegramUpdate::into_event)
                            .collect();
                        if !events.is_empty() {
                            debug!(count = events.len(), offset, "Dispatching batch");
                            dispatch_batch(router, events).await;
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "Polling for updates failed");
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                    }
                }
            }
        }
    }
}
