//! Notification feed
//!
//! Opens the notification channel with `SESSION_TOKEN`, logs every new
//! notification and a periodic unread/total status line until Ctrl+C.

use anyhow::Result;
use livesockets::ChannelEvent;
use notifications::infrastructure::require_env;
use notifications::{
    init_tracing_with_level, NotificationCenter, NotificationObserver, NotificationRecord,
    RealtimeConfig, ShutdownManager,
};
use servicedesk_realtime::bin_common::{
    load_config_from_env, BinaryRunner, ConfigType, RunConfig,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Logs each notification as it lands in the store
struct LogNewNotifications;

impl NotificationObserver for LogNewNotifications {
    fn on_notification(&self, record: &NotificationRecord) {
        info!(
            "[{}] {} | {} ({})",
            record.category,
            record.title,
            record.message,
            record.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
}

struct NotificationFeed {
    run_config: RunConfig,
    center: NotificationCenter,
    shutdown: ShutdownManager,
    token: String,
}

impl NotificationFeed {
    fn log_events(&self) {
        while let Some(event) = self.center.try_recv_event() {
            match event {
                ChannelEvent::Opened => info!("Notification channel open"),
                ChannelEvent::Closed { close, intentional } if !intentional => {
                    warn!("Notification channel lost: {}", close)
                }
                ChannelEvent::ReconnectScheduled { attempt, delay } => {
                    info!("Reconnect attempt {} in {:?}", attempt, delay)
                }
                ChannelEvent::ReconnectAbandoned(reason) => {
                    warn!("Giving up on the notification channel: {}", reason);
                    self.shutdown.trigger();
                }
                _ => {}
            }
        }
    }
}

impl BinaryRunner for NotificationFeed {
    async fn run(&mut self) -> Result<()> {
        if !self.center.connect(&self.token) {
            anyhow::bail!("notification channel could not be opened");
        }

        let status_every = Duration::from_secs(self.run_config.status_interval_secs);
        let mut last_status = Instant::now();

        while self.shutdown.is_running() {
            self.shutdown
                .interruptible_sleep(Duration::from_millis(500))
                .await;
            self.log_events();

            if last_status.elapsed() >= status_every {
                info!(
                    "Status: {} | {} unread / {} total",
                    if self.center.is_connected() { "connected" } else { "disconnected" },
                    self.center.unread_count(),
                    self.center.total_count()
                );
                last_status = Instant::now();
            }
        }

        self.center.disconnect().await;
        Ok(())
    }

    fn config(&self) -> &RunConfig {
        &self.run_config
    }

    fn stats(&self) -> Option<String> {
        let metrics = self.center.channel().metrics();
        Some(format!(
            "{} notifications kept | {} frames received | {} reconnects",
            self.center.total_count(),
            metrics.messages_received,
            metrics.reconnect_count
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load config first (before logging is initialized)
    let config_path = load_config_from_env(ConfigType::Realtime);
    let config = RealtimeConfig::load(&config_path)?;

    init_tracing_with_level(&config.log_level);
    config.log();

    let token = require_env("SESSION_TOKEN")?;

    let center = NotificationCenter::new(&config)?;
    center.subscribe(Arc::new(LogNewNotifications));

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    let mut feed = NotificationFeed {
        run_config: RunConfig::new("Notification feed"),
        center,
        shutdown,
        token,
    };
    feed.execute().await
}
