//! ``src/tasks/contact_search.rs``
//! ============================================================================
//! # Contact Search Task
//!
//! Runs the Find step against the directory: evaluates the page's criteria
//! rows remotely and reports the matching contacts back as an
//! [`Action::ContactSearchLoaded`].

use crate::controller::actions::Action;
use crate::directory::client::{ContactQuery, DirectoryClient, DirectoryError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Spawns a criteria-driven contact search.
///
/// Exactly one `ContactSearchLoaded` is sent per spawn, timeout and transport
/// failures included, so the workflow phase can always settle back to idle.
#[instrument(skip(client, action_tx, query), fields(task_id, criteria = query.criteria.len()))]
pub fn spawn_contact_search(
    client: Arc<dyn DirectoryClient>,
    action_tx: UnboundedSender<Action>,
    task_id: u64,
    query: ContactQuery,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let started = Instant::now();
        debug!(task_id, limit = query.limit, "Contact search started");

        let outcome = match tokio::time::timeout(timeout, client.search_contacts(&query)).await {
            Ok(Ok(contacts)) => {
                info!(
                    task_id,
                    hits = contacts.len(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "Contact search finished"
                );
                Ok(contacts)
            }
            Ok(Err(err)) => {
                warn!(task_id, error = %err, "Contact search failed");
                Err(err)
            }
            Err(_) => {
                warn!(
                    task_id,
                    timeout_ms = timeout.as_millis(),
                    "Contact search timed out"
                );
                Err(DirectoryError::Timeout(timeout))
            }
        };

        let _ = action_tx.send(Action::ContactSearchLoaded { task_id, outcome });
    })
}
