// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-polling listener for bot commands.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use herald_pipeline::CommandHandler;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::handler;
use crate::redact::redact;

/// Spawns the dispatcher. It stops when `cancel` fires.
pub fn spawn_command_listener(
    bot: Bot,
    token: String,
    commands: Arc<CommandHandler>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    info!(owner_id = commands.owner_id(), "starting Telegram command listener");

    tokio::spawn(async move {
        let endpoint = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
            let commands = Arc::clone(&commands);
            let token = token.clone();
            async move {
                let Some(text) = handler::command_text(&msg) else {
                    return respond(());
                };
                if !handler::is_owner(&msg, commands.owner_id()) {
                    debug!(chat_id = msg.chat.id.0, "ignoring command from non-owner");
                    return respond(());
                }
                let Some(sender) = handler::sender_id(&msg) else {
                    return respond(());
                };

                if let Some(reply) = commands.handle(text, sender, Utc::now()).await {
                    if let Err(e) = bot
                        .send_message(msg.chat.id, reply)
                        .parse_mode(ParseMode::Html)
                        .await
                    {
                        error!(error = %redact(&e.to_string(), &token), "failed to send command reply");
                    }
                }
                respond(())
            }
        });

        let mut dispatcher = Dispatcher::builder(bot, endpoint)
            .default_handler(|_| async {})
            .build();

        let shutdown = dispatcher.shutdown_token();
        tokio::spawn(async move {
            cancel.cancelled().await;
            // Shutdown is refused while the dispatcher is still starting up.
            for _ in 0..50 {
                match shutdown.shutdown() {
                    Ok(done) => {
                        done.await;
                        return;
                    }
                    Err(_) => tokio::time::sleep(Duration::from_millis(100)).await,
                }
            }
            warn!("command listener did not acknowledge shutdown");
        });

        dispatcher.dispatch().await;
        info!("Telegram command listener stopped");
    })
}
