// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `herald serve` command implementation.
//!
//! Loads the state file, connects the Telegram sink and command listener,
//! and pumps events from the configured source through the pipeline until a
//! shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use herald_config::HeraldConfig;
use herald_core::traits::PluginAdapter;
use herald_core::{HealthStatus, HeraldError, SelfIdentity};
use herald_pipeline::recording;
use herald_pipeline::{
    CommandHandler, JsonlEventSource, Pipeline, QueueSettings, RunOptions, TriggerClassifier, run,
};
use herald_state::{CleanupPolicy, StateStore};
use herald_telegram::{TelegramResolver, TelegramSink, UnresolvedReplies, spawn_command_listener};
use tracing::{info, warn};

use crate::shutdown;

/// How long the command listener gets to stop after shutdown begins.
const LISTENER_GRACE: Duration = Duration::from_secs(10);

pub async fn run_serve(config: HeraldConfig) -> Result<(), HeraldError> {
    init_tracing(&config.notifier.log_level);
    recording::register_metrics();

    let token = config
        .telegram
        .bot_token
        .clone()
        .ok_or_else(|| HeraldError::Config("telegram.bot_token is required".into()))?;
    let user_id = config
        .account
        .user_id
        .ok_or_else(|| HeraldError::Config("account.user_id is required".into()))?;
    let owner_id = config
        .telegram
        .effective_owner_id()
        .ok_or_else(|| HeraldError::Config("telegram.chat_id is required".into()))?;

    let store = StateStore::new(
        &config.state.path,
        CleanupPolicy::new(config.state.retention_days, config.state.cleanup_interval_hours),
    );
    let doc = store.load(Utc::now());
    info!(
        path = %config.state.path,
        processed = doc.processed_messages.len(),
        mode = %doc.priority_contacts.mode(),
        "state loaded"
    );

    let sink = Arc::new(TelegramSink::new(&config.telegram, &config.delivery)?);
    match sink.health_check().await? {
        HealthStatus::Healthy => info!("Telegram bot reachable"),
        HealthStatus::Degraded(reason) | HealthStatus::Unhealthy(reason) => {
            warn!(reason = %reason, "Telegram bot check failed, alerts may not be delivered")
        }
    }

    let identity = SelfIdentity::new(user_id, config.account.username.clone());
    let pipeline = Arc::new(Pipeline::new(
        doc,
        store,
        sink.clone(),
        Arc::new(UnresolvedReplies),
        TriggerClassifier::new(identity),
        QueueSettings {
            limit: config.state.queue_limit,
            warn_ratio: config.state.queue_warn_ratio,
        },
    ));

    let cancel = shutdown::install_signal_handler();

    let resolver = Arc::new(TelegramResolver::new(sink.bot().clone(), token.clone()));
    let commands = Arc::new(CommandHandler::new(pipeline.clone(), resolver, owner_id));
    let mut listener = spawn_command_listener(sink.bot().clone(), token, commands, cancel.clone());

    let source = JsonlEventSource::from_spec(&config.source.events).await?;
    info!(user_id, owner_id, events = %config.source.events, "herald serving");

    run(
        pipeline,
        Box::new(source),
        cancel.clone(),
        RunOptions {
            heartbeat_interval: Duration::from_secs(config.notifier.heartbeat_interval_secs),
            stop_at_end_of_input: false,
        },
    )
    .await;

    cancel.cancel();
    match tokio::time::timeout(LISTENER_GRACE, &mut listener).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "command listener task failed"),
        Err(_) => {
            warn!("command listener still running, aborting it");
            listener.abort();
        }
    }
    sink.shutdown().await?;
    info!("herald stopped");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("herald={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
