//! ``src/tasks/transfer_task.rs``
//! ============================================================================
//! # Transfer Task
//!
//! Executes the ownership transfer for the selected contacts and reports the
//! outcome as an [`Action::TransferFinished`]. The requested contact ids ride
//! along in the completion so the dispatcher can reconcile the results table
//! without re-deriving the selection.

use crate::controller::actions::Action;
use crate::directory::client::{DirectoryClient, DirectoryError, TransferRequest};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

/// Spawns the contact transfer call.
#[instrument(
    skip(client, action_tx, request),
    fields(task_id, contacts = request.contact_ids.len(), to_user = %request.to_user_id)
)]
pub fn spawn_transfer(
    client: Arc<dyn DirectoryClient>,
    action_tx: UnboundedSender<Action>,
    task_id: u64,
    request: TransferRequest,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let started = Instant::now();
        info!(
            task_id,
            contacts = request.contact_ids.len(),
            to_user = %request.to_user_id,
            idempotency_key = %request.idempotency_key,
            "Transfer started"
        );

        let outcome = match tokio::time::timeout(timeout, client.transfer_contacts(&request)).await
        {
            Ok(Ok(report)) => {
                info!(
                    task_id,
                    transferred = report.transferred,
                    tasks_transferred = report.tasks_transferred,
                    emails_sent = report.emails_sent,
                    elapsed_ms = started.elapsed().as_millis(),
                    "Transfer finished"
                );
                Ok(report)
            }
            Ok(Err(err)) => {
                warn!(task_id, error = %err, "Transfer failed");
                Err(err)
            }
            Err(_) => {
                warn!(task_id, timeout_ms = timeout.as_millis(), "Transfer timed out");
                Err(DirectoryError::Timeout(timeout))
            }
        };

        let _ = action_tx.send(Action::TransferFinished {
            task_id,
            contact_ids: request.contact_ids,
            outcome,
        });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::memory::InMemoryDirectory;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_completion_carries_requested_ids() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = Arc::new(InMemoryDirectory::with_sample_data());
        let request = TransferRequest {
            contact_ids: vec!["c-001".to_string(), "c-002".to_string()],
            to_user_id: "u-001".to_string(),
            transfer_open_tasks: false,
            send_notification_email: false,
            idempotency_key: "tr_test".to_string(),
        };

        spawn_transfer(client, tx, 5, request, Duration::from_secs(1))
            .await
            .expect("task panicked");

        match rx.recv().await {
            Some(Action::TransferFinished {
                task_id,
                contact_ids,
                outcome: Ok(report),
            }) => {
                assert_eq!(task_id, 5);
                assert_eq!(contact_ids, vec!["c-001", "c-002"]);
                assert_eq!(report.transferred, 2);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }
}
