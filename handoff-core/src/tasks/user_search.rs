//! ``src/tasks/user_search.rs``
//! ============================================================================
//! # User Search Task: Bounded Typeahead Query
//!
//! Runs one directory user search off the UI loop, bounded by the configured
//! typeahead timeout. The completion is delivered as an
//! [`Action::LookupLoaded`] carrying the generation the dispatcher stamped on
//! the request, so stale replies can be told apart from current ones.

use crate::controller::actions::Action;
use crate::directory::client::{DirectoryClient, DirectoryError, UserQuery};
use crate::model::lookup::LookupTarget;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

/// Spawns a typeahead user search and reports back through the action channel.
///
/// The guard flag stays owned by the dispatcher; this task only echoes the
/// `generation` it was handed. Whatever happens on the wire, exactly one
/// `LookupLoaded` is sent, so the dispatcher can always release the guard.
#[instrument(skip(client, action_tx, query), fields(task_id, query = %query.text))]
pub fn spawn_user_search(
    client: Arc<dyn DirectoryClient>,
    action_tx: UnboundedSender<Action>,
    task_id: u64,
    target: LookupTarget,
    generation: u64,
    query: UserQuery,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let started = Instant::now();
        debug!(
            task_id,
            ?target,
            generation,
            scope = ?query.scope,
            "User search started"
        );

        let outcome = match tokio::time::timeout(timeout, client.search_users(&query)).await {
            Ok(Ok(users)) => {
                debug!(
                    task_id,
                    hits = users.len(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "User search finished"
                );
                Ok(users)
            }
            Ok(Err(err)) => {
                warn!(task_id, error = %err, "User search failed");
                Err(err)
            }
            Err(_) => {
                warn!(
                    task_id,
                    timeout_ms = timeout.as_millis(),
                    "User search timed out"
                );
                Err(DirectoryError::Timeout(timeout))
            }
        };

        // Receiver dropping means the app is shutting down; nothing to do.
        let _ = action_tx.send(Action::LookupLoaded {
            task_id,
            target,
            generation,
            outcome,
        });
    })
}
