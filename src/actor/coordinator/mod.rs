//! Actor Coordinator - wires up the preview actor system.
//!
//! Creates the channels, starts the observer acceptor, and runs the actors
//! until the shutdown signal fires.

mod runtime;

use std::net::IpAddr;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::messages::{UpdateMsg, WsMsg};
use super::update::{UpdateActor, UpdateHandle};
use super::ws::WsActor;
use crate::reload::UpdateChannel;

const CHANNEL_BUFFER: usize = 32;

pub struct Coordinator {
    channel: UpdateChannel,
    update_tx: mpsc::Sender<UpdateMsg>,
    update_rx: mpsc::Receiver<UpdateMsg>,
    ws_bind: Option<(IpAddr, u16)>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(channel: UpdateChannel) -> Self {
        let (update_tx, update_rx) = mpsc::channel(CHANNEL_BUFFER);
        Self {
            channel,
            update_tx,
            update_rx,
            ws_bind: None,
            shutdown_rx: None,
        }
    }

    /// Handle for submitting updates; valid before and after `run` starts.
    pub fn update_handle(&self) -> UpdateHandle {
        UpdateHandle::new(self.update_tx.clone())
    }

    /// Accept observers on `interface:port` (next free port on conflict).
    pub fn with_ws(mut self, interface: IpAddr, port: u16) -> Self {
        self.ws_bind = Some((interface, port));
        self
    }

    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    pub async fn run(self) -> Result<()> {
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        if let Some((interface, port)) = self.ws_bind {
            match crate::reload::server::start_ws_server(interface, port, ws_tx.clone()) {
                Ok(actual_port) => {
                    if actual_port != port {
                        crate::log!("ws"; "port {} in use, observers on {}", port, actual_port);
                    }
                    crate::cli::preview::set_actual_ws_port(actual_port);
                }
                Err(e) => crate::log!("actor"; "websocket server failed: {}", e),
            }
        }

        let ws_actor = WsActor::new(ws_rx, self.channel.registry().clone());
        let update_actor = UpdateActor::new(self.update_rx, self.channel);

        crate::debug!("actor"; "start");
        runtime::run_actors(update_actor, ws_actor, self.update_tx, ws_tx, self.shutdown_rx).await?;
        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
