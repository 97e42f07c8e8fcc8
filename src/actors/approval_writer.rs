use std::sync::Arc;

use tokio::spawn;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use crate::cache::OverrideCache;
use crate::sources::ApprovalPersistence;
use crate::types::TransactionId;

#[derive(Debug)]
struct ApprovalRequest {
    transaction_id: TransactionId,
    value: bool
}

/// Sends approval edits to the persistence collaborator one at a time, in the order
/// they were made, so the last toggle of a transaction is also the last write.
pub struct ApprovalWriter {
    sender: mpsc::UnboundedSender<ApprovalRequest>,
    handle: JoinHandle<()>
}

impl ApprovalWriter {
    /// Spawns the writer task. Must be called from within a tokio runtime.
    pub fn new<P: ApprovalPersistence>(persistence: P, overrides: Arc<OverrideCache>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<ApprovalRequest>();

        let handle = spawn(async move {
            while let Some(request) = receiver.recv().await {
                match persistence.set_approval(&request.transaction_id, request.value).await {
                    Ok(()) => {
                        overrides.confirm(&request.transaction_id, request.value);
                        debug!("Approval [{}] for transaction [{}] acknowledged", request.value, request.transaction_id);
                    }
                    Err(error) => {
                        //NOTE: The local edit stays in place and unconfirmed, the user keeps seeing their choice
                        warn!("{error}");
                    }
                }
            }
        });

        Self { sender, handle }
    }

    /// Queues a write. Returns `false` if the writer task is no longer running.
    pub fn accept(&self, transaction_id: &TransactionId, value: bool) -> bool {
        self.sender.send(ApprovalRequest {
            transaction_id: transaction_id.clone(),
            value
        }).is_ok()
    }

    /// Closes the queue and waits for every pending write to finish.
    pub async fn despawn(self) -> Result<(), JoinError> {
        drop(self.sender);
        self.handle.await
    }
}
