//! Update Actor - serializes persist + broadcast.
//!
//! Every update request of a preview process goes through this single
//! mailbox, so writes and the broadcasts that follow them happen in arrival
//! order. A second update is never persisted before the first one was
//! broadcast.

use tokio::sync::{mpsc, oneshot};

use super::messages::UpdateMsg;
use crate::reload::{UpdateChannel, UpdateError, UpdateOutcome, UpdateRequest};

pub struct UpdateActor {
    rx: mpsc::Receiver<UpdateMsg>,
    channel: UpdateChannel,
}

impl UpdateActor {
    pub fn new(rx: mpsc::Receiver<UpdateMsg>, channel: UpdateChannel) -> Self {
        Self { rx, channel }
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                UpdateMsg::Apply { request, reply } => {
                    let result = self.channel.apply(request);
                    match &result {
                        Ok(outcome) => crate::debug!(
                            "update";
                            "{} ({} delivered, {} failed)",
                            outcome.message, outcome.report.delivered, outcome.report.failed
                        ),
                        Err(e) => crate::debug!("update"; "rejected: {}", e),
                    }
                    // Requester may have gone away; the update still happened.
                    let _ = reply.send(result);
                }
                UpdateMsg::Shutdown => {
                    crate::debug!("update"; "shutting down");
                    break;
                }
            }
        }
    }
}

/// Sending side of the update mailbox.
#[derive(Clone)]
pub struct UpdateHandle {
    tx: mpsc::Sender<UpdateMsg>,
}

/// An update already queued on the mailbox, waiting for its result.
pub struct PendingUpdate {
    rx: oneshot::Receiver<Result<UpdateOutcome, UpdateError>>,
}

impl PendingUpdate {
    /// Block until the actor has persisted and broadcast the update.
    pub fn wait(self) -> Result<UpdateOutcome, UpdateError> {
        self.rx.blocking_recv().map_err(|_| UpdateError::Closed)?
    }
}

impl UpdateHandle {
    pub fn new(tx: mpsc::Sender<UpdateMsg>) -> Self {
        Self { tx }
    }

    /// Queue `request` behind every request queued before it.
    ///
    /// Must not be called from inside the async runtime.
    pub fn enqueue(&self, request: UpdateRequest) -> Result<PendingUpdate, UpdateError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .blocking_send(UpdateMsg::Apply { request, reply })
            .map_err(|_| UpdateError::Closed)?;
        Ok(PendingUpdate { rx })
    }

    #[cfg(test)]
    pub async fn apply(&self, request: UpdateRequest) -> Result<UpdateOutcome, UpdateError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(UpdateMsg::Apply { request, reply })
            .await
            .map_err(|_| UpdateError::Closed)?;
        rx.await.map_err(|_| UpdateError::Closed)?
    }

    #[cfg(test)]
    pub async fn shutdown(&self) {
        let _ = self.tx.send(UpdateMsg::Shutdown).await;
    }
}
