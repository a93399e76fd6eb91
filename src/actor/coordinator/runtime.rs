use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::messages::{UpdateMsg, WsMsg};
use crate::actor::update::UpdateActor;
use crate::actor::ws::WsActor;

/// Run all actors until shutdown, then stop them in order.
///
/// The update actor drains first so an in-flight update is still broadcast
/// before observers are closed.
pub(super) async fn run_actors(
    update: UpdateActor,
    ws: WsActor,
    update_tx: mpsc::Sender<UpdateMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) -> Result<()> {
    let update_handle = tokio::spawn(async move { update.run().await });
    let ws_handle = tokio::spawn(async move { ws.run().await });

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() || crate::core::is_shutdown() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    } else {
        let _ = update_handle.await;
        let _ = ws_tx.send(WsMsg::Shutdown).await;
        let _ = ws_handle.await;
        return Ok(());
    }

    let _ = update_tx.send(UpdateMsg::Shutdown).await;
    let _ = tokio::time::timeout(Duration::from_millis(500), update_handle).await;

    let _ = ws_tx.send(WsMsg::Shutdown).await;
    let _ = tokio::time::timeout(Duration::from_millis(500), ws_handle).await;

    Ok(())
}
