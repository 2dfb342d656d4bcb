//! Heartbeat mechanism for channel connections
//!
//! # Architecture
//!
//! The heartbeat runs in a dedicated Tokio task started when the
//! connection opens:
//!
//! ```text
//! ┌─────────────────────┐
//! │  Heartbeat Task     │
//! │                     │
//! │  Every interval:    │
//! │  1. Wait for tick   │
//! │  2. Emit payload ───┼──> Tick Channel ──> Connection Task ──(if Open)──> Socket
//! │  3. Repeat          │
//! └─────────────────────┘
//! ```
//!
//! The connection task decides whether a tick is written: ticks arriving
//! while the state is not `Open` are skipped. The monitor is owned by the
//! connection task and stopped on every close path; dropping it aborts the
//! task, so no timer outlives its connection.

use crate::traits::WsMessage;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

/// Interval between liveness pings, kept under common proxy idle timeouts
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);

/// Heartbeat task that emits the payload at a fixed interval
///
/// The first tick fires one full interval after start, not immediately.
/// Missed ticks are skipped rather than bursted.
///
/// # Arguments
/// * `interval` - Duration between heartbeat messages
/// * `payload` - The message to emit on each tick
/// * `tick_tx` - Channel to the connection task
/// * `shutdown_rx` - Fires when the connection closes
pub async fn heartbeat_task(
    interval: Duration,
    payload: WsMessage,
    tick_tx: mpsc::UnboundedSender<WsMessage>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    debug!("Heartbeat task started with interval: {:?}", interval);

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                debug!("Heartbeat task received shutdown signal");
                break;
            }
            _ = ticker.tick() => {
                if tick_tx.send(payload.clone()).is_err() {
                    debug!("Heartbeat channel closed, shutting down heartbeat task");
                    break;
                }
            }
        }
    }

    debug!("Heartbeat task exiting");
}

/// Running heartbeat for one open connection
pub struct HeartbeatMonitor {
    handle: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    tick_rx: mpsc::UnboundedReceiver<WsMessage>,
}

impl HeartbeatMonitor {
    /// Spawn the heartbeat task
    pub fn spawn(interval: Duration, payload: WsMessage) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(heartbeat_task(interval, payload, tick_tx, shutdown_rx));

        Self {
            handle: Some(handle),
            shutdown_tx: Some(shutdown_tx),
            tick_rx,
        }
    }

    /// Wait for the next tick
    ///
    /// Returns `None` once the task has stopped.
    pub async fn next_tick(&mut self) -> Option<WsMessage> {
        self.tick_rx.recv().await
    }

    /// Stop the timer; pending ticks are discarded
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.tick_rx.close();
        while self.tick_rx.try_recv().is_ok() {}
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for HeartbeatMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Wait for the next tick of an optional monitor, forever if there is none
pub(crate) async fn next_tick(monitor: &mut Option<HeartbeatMonitor>) -> Option<WsMessage> {
    match monitor {
        Some(m) => m.next_tick().await,
        None => std::future::pending().await,
    }
}
