//! Interactive chat session
//!
//! Usage: `chat_session <conversation-id>`
//!
//! Joins the conversation with `SESSION_TOKEN`, sends every stdin line as
//! a chat message and prints incoming messages. Stops on Ctrl+C or EOF.

use anyhow::{Context, Result};
use notifications::infrastructure::require_env;
use notifications::{init_tracing_with_level, ChatChannel, RealtimeConfig, ShutdownManager};
use servicedesk_realtime::bin_common::{
    load_config_from_env, parse_args, BinaryRunner, ConfigType, RunConfig,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

struct ChatSession {
    run_config: RunConfig,
    chat: ChatChannel,
    shutdown: ShutdownManager,
    conversation_id: String,
    token: String,
    printed: usize,
}

impl ChatSession {
    fn print_new_messages(&mut self) {
        let messages = self.chat.messages();
        for message in messages.iter().skip(self.printed) {
            let who = match (&message.sender, message.is_provider) {
                (Some(sender), true) => format!("{} (provider)", sender),
                (Some(sender), false) => sender.clone(),
                (None, _) => "?".to_string(),
            };
            println!(
                "[{}] {}: {}",
                message.created_at.format("%H:%M:%S"),
                who,
                message.message
            );
        }
        self.printed = messages.len();
    }
}

impl BinaryRunner for ChatSession {
    async fn run(&mut self) -> Result<()> {
        if !self.chat.connect(&self.conversation_id, &self.token).await {
            anyhow::bail!("chat channel could not be opened");
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut poll = tokio::time::interval(Duration::from_millis(200));

        while self.shutdown.is_running() {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        if !self.chat.send_message(&line) {
                            warn!("Not connected, message not sent");
                        }
                    }
                    Ok(None) => {
                        info!("End of input");
                        self.shutdown.trigger();
                    }
                    Err(e) => {
                        warn!("Failed to read stdin: {}", e);
                        self.shutdown.trigger();
                    }
                },
                _ = poll.tick() => self.print_new_messages(),
                _ = self.shutdown.wait() => {}
            }
        }

        self.chat.disconnect().await;
        Ok(())
    }

    fn config(&self) -> &RunConfig {
        &self.run_config
    }

    fn stats(&self) -> Option<String> {
        Some(format!("{} messages in conversation", self.chat.messages().len()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let conversation_id = parse_args()
        .into_iter()
        .next()
        .context("usage: chat_session <conversation-id>")?;

    let config_path = load_config_from_env(ConfigType::Realtime);
    let config = RealtimeConfig::load(&config_path)?;

    init_tracing_with_level(&config.log_level);
    config.log();

    let token = require_env("SESSION_TOKEN")?;

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    let mut session = ChatSession {
        run_config: RunConfig::new(format!("Chat session {}", conversation_id)),
        chat: ChatChannel::new(&config)?,
        shutdown,
        conversation_id,
        token,
        printed: 0,
    };
    session.execute().await
}
