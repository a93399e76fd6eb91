//! Preview server lifecycle: actor thread startup and shutdown.

use std::net::IpAddr;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::Receiver;

use crate::actor::Coordinator;
use crate::log;

/// Run the actor system on its own runtime thread.
pub fn spawn_actors(
    coordinator: Coordinator,
    interface: IpAddr,
    ws_port: u16,
    shutdown_rx: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                log!("actor"; "failed to create runtime: {}", e);
                return;
            }
        };

        rt.block_on(async {
            let coordinator = coordinator
                .with_ws(interface, ws_port)
                .with_shutdown_signal(shutdown_rx);
            if let Err(e) = coordinator.run().await {
                log!("actor"; "error: {}", e);
            }
        });
    })
}

/// Wait for the actor system to stop (max 2 seconds).
pub fn wait_for_shutdown(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}
