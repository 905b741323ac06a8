// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot commands: parsing the slash syntax and answering them.
//!
//! [`parse_command`] turns text into a typed [`Command`]. [`CommandHandler`]
//! runs it against the [`Pipeline`] and renders an HTML reply. Only the
//! configured owner gets an answer; everyone else is ignored.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use herald_core::traits::SourceResolver;
use herald_core::{HeraldError, ResolvedSource, SourceId};
use herald_state::{PriorityMode, SnoozeBehavior, SnoozePhase, format_remaining, parse_duration};
use tracing::{debug, error};

use crate::coordinator::{ListedSource, Pipeline, SnoozeStatus};
use crate::formatter::{escape_html, offset_label, user_offset};

const PREFIX: &str = "🤖 ";

/// A parsed bot command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    Status,
    PriorityHelp,
    /// `None` asks for the current mode.
    PriorityMode(Option<PriorityMode>),
    PriorityAdd(String),
    PriorityRemove(String),
    PriorityList,
    Mute(String),
    Unmute(String),
    ListMuted,
    SnoozeHelp,
    Snooze {
        duration: TimeDelta,
        behavior: SnoozeBehavior,
    },
    SnoozeStatus,
    Unsnooze,
    /// `None` asks for the current offset.
    Timezone(Option<f64>),
}

/// Parses slash-command text.
///
/// Returns `Ok(None)` for text that is not a known command and an error for a
/// known command with malformed arguments. `/cmd@botname` is accepted.
pub fn parse_command(text: &str) -> Result<Option<Command>, HeraldError> {
    let text = text.trim();
    if !text.starts_with('/') {
        return Ok(None);
    }

    let mut parts = text.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };
    let name = head
        .split('@')
        .next()
        .unwrap_or(head)
        .to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    let command = match name.as_str() {
        "/start" => Command::Start,
        "/help" => Command::Help,
        "/status" => Command::Status,
        "/priority" => parse_priority(&args)?,
        "/mute" => Command::Mute(required(&args, 0, "/mute @username or @groupname")?),
        "/unmute" => Command::Unmute(required(&args, 0, "/unmute @username or @groupname")?),
        "/listmuted" => Command::ListMuted,
        "/snooze" => parse_snooze(&args)?,
        "/unsnooze" => Command::Unsnooze,
        "/timezone" => parse_timezone(&args)?,
        _ => return Ok(None),
    };
    Ok(Some(command))
}

fn parse_priority(args: &[&str]) -> Result<Command, HeraldError> {
    let Some(sub) = args.first() else {
        return Ok(Command::PriorityHelp);
    };
    match sub.to_ascii_lowercase().as_str() {
        "mode" => match args.get(1) {
            None => Ok(Command::PriorityMode(None)),
            Some(raw) => raw
                .parse::<PriorityMode>()
                .map(|mode| Command::PriorityMode(Some(mode)))
                .map_err(|_| {
                    HeraldError::Command("Invalid mode. Use: whitelist, blacklist, or off".into())
                }),
        },
        "add" => Ok(Command::PriorityAdd(required(args, 1, "/priority add @username")?)),
        "remove" => Ok(Command::PriorityRemove(required(
            args,
            1,
            "/priority remove @username",
        )?)),
        "list" => Ok(Command::PriorityList),
        _ => Ok(Command::PriorityHelp),
    }
}

fn parse_snooze(args: &[&str]) -> Result<Command, HeraldError> {
    let Some(first) = args.first() else {
        return Ok(Command::SnoozeHelp);
    };
    let first = first.to_ascii_lowercase();
    if first == "status" {
        return Ok(Command::SnoozeStatus);
    }

    let (raw, behavior) = if first == "--queue" {
        let raw = args.get(1).ok_or_else(|| {
            HeraldError::Command(
                "Usage: /snooze --queue &lt;duration&gt;\nExample: /snooze --queue 2h".into(),
            )
        })?;
        (*raw, SnoozeBehavior::Queue)
    } else {
        (args[0], SnoozeBehavior::Drop)
    };

    Ok(Command::Snooze {
        duration: parse_duration(raw)?,
        behavior,
    })
}

fn parse_timezone(args: &[&str]) -> Result<Command, HeraldError> {
    let Some(raw) = args.first() else {
        return Ok(Command::Timezone(None));
    };
    let trimmed = raw
        .strip_prefix("UTC")
        .or_else(|| raw.strip_prefix("utc"))
        .unwrap_or(raw);
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|h| h.is_finite())
        .map(|h| Command::Timezone(Some(h)))
        .ok_or_else(|| {
            HeraldError::Command(
                "Usage: /timezone &lt;offset&gt;\nExample: /timezone +7 or /timezone -5.5".into(),
            )
        })
}

fn required(args: &[&str], index: usize, usage: &str) -> Result<String, HeraldError> {
    args.get(index)
        .map(|s| s.to_string())
        .ok_or_else(|| HeraldError::Command(format!("Usage: {usage}")))
}

/// Answers the owner's bot commands.
pub struct CommandHandler {
    pipeline: Arc<Pipeline>,
    resolver: Arc<dyn SourceResolver>,
    owner_id: SourceId,
}

impl CommandHandler {
    pub fn new(
        pipeline: Arc<Pipeline>,
        resolver: Arc<dyn SourceResolver>,
        owner_id: SourceId,
    ) -> Self {
        Self {
            pipeline,
            resolver,
            owner_id,
        }
    }

    pub fn owner_id(&self) -> SourceId {
        self.owner_id
    }

    /// Handles one incoming text. `None` means "do not reply".
    pub async fn handle(&self, text: &str, sender_id: SourceId, now: DateTime<Utc>) -> Option<String> {
        if sender_id != self.owner_id {
            debug!(sender_id, "ignoring command from non-owner");
            return None;
        }

        let result = match parse_command(text) {
            Ok(Some(command)) => {
                debug!(?command, "handling command");
                self.execute(command, now).await
            }
            Ok(None) => return None,
            Err(e) => Err(e),
        };

        Some(result.unwrap_or_else(|e| error_reply(&e)))
    }

    async fn execute(&self, command: Command, now: DateTime<Utc>) -> Result<String, HeraldError> {
        match command {
            Command::Start => Ok(START_TEXT.to_string()),
            Command::Help => Ok(HELP_TEXT.to_string()),
            Command::Status => Ok(self.status(now).await),
            Command::PriorityHelp => {
                let mode = self.pipeline.priority_config(now).await.mode;
                Ok(format!("{PRIORITY_HELP_TEXT}{mode}"))
            }
            Command::PriorityMode(None) => {
                let mode = self.pipeline.priority_config(now).await.mode;
                Ok(format!(
                    "{PREFIX}Current mode: {mode}\n\nUsage: /priority mode &lt;whitelist|blacklist|off&gt;"
                ))
            }
            Command::PriorityMode(Some(mode)) => Ok(self.set_mode(mode, now).await),
            Command::PriorityAdd(identifier) => {
                let source = self.resolve(&identifier).await?;
                let name = escape_html(&source.display_name);
                Ok(if self.pipeline.add_to_whitelist(&source, now).await {
                    format!("{PREFIX}Added <b>{name}</b> to priority list")
                } else {
                    format!("{PREFIX}{name} is already in the priority list")
                })
            }
            Command::PriorityRemove(identifier) => {
                let source = self.resolve(&identifier).await?;
                let name = escape_html(&source.display_name);
                Ok(if self.pipeline.remove_from_whitelist(source.id, now).await {
                    format!("{PREFIX}Removed <b>{name}</b> from priority list")
                } else {
                    format!("{PREFIX}{name} was not in the priority list")
                })
            }
            Command::PriorityList => Ok(self.priority_list(now).await),
            Command::Mute(identifier) => {
                let source = self.resolve(&identifier).await?;
                let name = escape_html(&source.display_name);
                if !self.pipeline.add_to_blacklist(&source, now).await {
                    return Ok(format!("{PREFIX}{name} is already muted"));
                }
                let mut reply = format!("{PREFIX}Muted <b>{name}</b>");
                let mode = self.pipeline.priority_config(now).await.mode;
                if mode != PriorityMode::Blacklist {
                    let _ = write!(
                        reply,
                        "\n\n⚠️ Note: Mute list only applies when mode is 'blacklist'. Current mode: {mode}"
                    );
                }
                Ok(reply)
            }
            Command::Unmute(identifier) => {
                let source = self.resolve(&identifier).await?;
                let name = escape_html(&source.display_name);
                Ok(if self.pipeline.remove_from_blacklist(source.id, now).await {
                    format!("{PREFIX}Unmuted <b>{name}</b>")
                } else {
                    format!("{PREFIX}{name} was not muted")
                })
            }
            Command::ListMuted => Ok(self.muted_list(now).await),
            Command::SnoozeHelp => {
                let status = self.pipeline.snooze_status(now).await;
                Ok(format!("{SNOOZE_HELP_TEXT}{PREFIX}{}", snooze_line(&status)))
            }
            Command::Snooze { duration, behavior } => {
                let end = self.pipeline.snooze(duration, behavior, now).await?;
                let offset = self.pipeline.timezone().await;
                let until = end.with_timezone(&user_offset(offset)).format("%Y-%m-%d %H:%M");
                let note = match behavior {
                    SnoozeBehavior::Queue => "Alerts will be queued and delivered when you unsnooze.",
                    SnoozeBehavior::Drop => "Alerts will be silently dropped.",
                };
                Ok(format!(
                    "{PREFIX}<b>Snooze Activated</b>\n\nUntil: {until} ({})\n\n{note}",
                    offset_label(offset)
                ))
            }
            Command::SnoozeStatus => {
                let status = self.pipeline.snooze_status(now).await;
                Ok(format!("{PREFIX}{}", snooze_line(&status)))
            }
            Command::Unsnooze => {
                let report = self.pipeline.unsnooze(now).await;
                Ok(if !report.was_active {
                    format!("{PREFIX}Snooze is not active.")
                } else if report.total == 0 {
                    format!("{PREFIX}<b>Snooze Deactivated</b>\n\nNo queued alerts.")
                } else {
                    format!(
                        "{PREFIX}<b>Snooze Deactivated</b>\n\nDelivered {}/{} queued alerts.",
                        report.delivered, report.total
                    )
                })
            }
            Command::Timezone(None) => {
                let offset = self.pipeline.timezone().await;
                Ok(format!(
                    "{PREFIX}Timezone: <b>{}</b>\n\nUsage: /timezone &lt;offset&gt; (e.g. +7, -5.5)",
                    offset_label(offset)
                ))
            }
            Command::Timezone(Some(hours)) => {
                self.pipeline.set_timezone(hours, now).await?;
                Ok(format!("{PREFIX}Timezone set to <b>{}</b>", offset_label(hours)))
            }
        }
    }

    /// Numeric ids are taken as-is; anything else goes to the resolver.
    async fn resolve(&self, identifier: &str) -> Result<ResolvedSource, HeraldError> {
        if let Ok(id) = identifier.parse::<SourceId>() {
            return Ok(ResolvedSource {
                id,
                display_name: identifier.to_string(),
            });
        }
        self.resolver.resolve(identifier).await
    }

    async fn set_mode(&self, mode: PriorityMode, now: DateTime<Utc>) -> String {
        let change = self.pipeline.set_priority_mode(mode, now).await;
        let mut reply = format!("{PREFIX}Priority mode set to: <b>{mode}</b>");
        reply.push_str(match mode {
            PriorityMode::Whitelist => "\n\nOnly contacts in the priority list will trigger alerts.",
            PriorityMode::Blacklist => "\n\nAll contacts except muted ones will trigger alerts.",
            PriorityMode::Disabled => "\n\nAll qualifying messages will trigger alerts.",
        });
        if change.swapped_lists() {
            let _ = write!(
                reply,
                "\n\n⚠️ Switched from {} to {}. The {} is kept but inactive.",
                change.previous,
                change.current,
                match change.previous {
                    PriorityMode::Whitelist => "priority list",
                    _ => "mute list",
                }
            );
        }
        reply
    }

    async fn priority_list(&self, now: DateTime<Utc>) -> String {
        let config = self.pipeline.priority_config(now).await;
        let mut reply = format!("{PREFIX}<b>Priority List</b>\n\nMode: {}\n\n", config.mode);
        push_entries(&mut reply, "Contacts:", &config.whitelist);
        match config.mode {
            PriorityMode::Whitelist => reply.push_str("\nOnly these contacts will trigger alerts."),
            PriorityMode::Disabled => {
                reply.push_str("\nFiltering is disabled. All qualifying messages trigger alerts.")
            }
            PriorityMode::Blacklist => {}
        }
        reply
    }

    async fn muted_list(&self, now: DateTime<Utc>) -> String {
        let config = self.pipeline.priority_config(now).await;
        let mut reply = format!("{PREFIX}<b>Muted List</b>\n\nMode: {}\n\n", config.mode);
        push_entries(&mut reply, "Muted:", &config.blacklist);
        match config.mode {
            PriorityMode::Blacklist => reply.push_str("\nThese contacts will NOT trigger alerts."),
            PriorityMode::Disabled => reply.push_str("\nFiltering is disabled. Mute list is inactive."),
            PriorityMode::Whitelist => {
                let _ = write!(reply, "\nMute list is inactive in {} mode.", config.mode);
            }
        }
        reply
    }

    async fn status(&self, now: DateTime<Utc>) -> String {
        let report = self.pipeline.status(now).await;
        let mut lines = vec![
            format!("{PREFIX}<b>Notifier Status</b>"),
            format!("\n<b>Priority Mode:</b> {}", report.priority.mode),
        ];
        match report.priority.mode {
            PriorityMode::Whitelist => lines.push(format!(
                "  Priority contacts: {}",
                report.priority.whitelist.len()
            )),
            PriorityMode::Blacklist => lines.push(format!(
                "  Muted contacts: {}",
                report.priority.blacklist.len()
            )),
            PriorityMode::Disabled => {}
        }
        lines.push(format!("\n{}", snooze_line(&report.snooze)));
        lines.push(format!(
            "\n<b>Timezone:</b> {}\n<b>Tracked messages:</b> {}\n<b>Alerts since start:</b> {}",
            offset_label(report.timezone_offset),
            report.processed,
            report.stats.alerts()
        ));
        lines.join("\n")
    }
}

fn push_entries(reply: &mut String, heading: &str, entries: &[ListedSource]) {
    if entries.is_empty() {
        reply.push_str("List is empty.\n");
        return;
    }
    reply.push_str(heading);
    reply.push('\n');
    for entry in entries {
        let _ = writeln!(reply, "  • {}", escape_html(&entry.name));
    }
}

fn snooze_line(status: &SnoozeStatus) -> String {
    let Some(remaining) = status.remaining.filter(|_| status.phase.is_active()) else {
        return "Snooze: <b>Inactive</b>".to_string();
    };
    let mut line = format!(
        "Snooze: <b>Active</b> ({} remaining)\nBehavior: {}",
        format_remaining(remaining),
        status.behavior
    );
    if status.phase == SnoozePhase::ActiveQueue {
        let _ = write!(line, "\nQueued alerts: {}/{}", status.queued, status.limit);
    }
    line
}

fn error_reply(err: &HeraldError) -> String {
    match err {
        HeraldError::Command(message) => format!("{PREFIX}{message}"),
        HeraldError::InvalidDuration { input } => format!(
            "{PREFIX}Invalid duration format: {}\n\nValid formats: 30m, 2h, 1d",
            escape_html(input)
        ),
        HeraldError::Resolution { identifier, .. } => {
            format!("{PREFIX}Could not resolve: {}", escape_html(identifier))
        }
        other => {
            error!(error = %other, "command failed");
            format!("{PREFIX}❌ Error: {}", escape_html(&other.to_string()))
        }
    }
}

const START_TEXT: &str = "🤖 <b>Priority Notifier Bot</b>

Welcome! This bot monitors your Telegram for important messages and sends you alerts for:
• Direct messages (DMs)
• Mentions (@username)
• Replies to your messages

Use /help to see all available commands.";

const HELP_TEXT: &str = "🤖 <b>Available Commands</b>

<b>Status</b>
/status - Show current notifier status
/timezone &lt;offset&gt; - Set the timezone used in alerts (e.g., +7, -5.5)

<b>Snooze</b>
/snooze &lt;duration&gt; - Snooze alerts (e.g., 30m, 2h, 1d)
/snooze --queue &lt;duration&gt; - Snooze with queueing
/snooze status - Check snooze status
/unsnooze - End snooze and deliver queued alerts

<b>Priority Contacts</b>
/priority mode &lt;whitelist|blacklist|off&gt; - Set filter mode
/priority add @user - Add to priority list
/priority remove @user - Remove from priority list
/priority list - Show priority list

<b>Mute List</b>
/mute @chat - Mute a chat/user
/unmute @chat - Unmute a chat/user
/listmuted - Show muted list";

const PRIORITY_HELP_TEXT: &str = "🤖 <b>Priority Commands</b>

/priority mode &lt;whitelist|blacklist|off&gt;
/priority add @user - Add to priority list
/priority remove @user - Remove from priority list
/priority list - Show priority list

Current mode: ";

const SNOOZE_HELP_TEXT: &str = "🤖 <b>Snooze Commands</b>

/snooze &lt;duration&gt; - Snooze alerts (e.g., 30m, 2h, 1d)
/snooze --queue &lt;duration&gt; - Snooze with queueing
/snooze status - Check snooze status
/unsnooze - End snooze and deliver queued alerts

";

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Command {
        parse_command(text).unwrap().unwrap()
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_command("hello").unwrap(), None);
        assert_eq!(parse_command("/unknown thing").unwrap(), None);
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn bot_suffix_and_case_are_ignored() {
        assert_eq!(parse("/Start@herald_bot"), Command::Start);
        assert_eq!(parse("  /HELP  "), Command::Help);
    }

    #[test]
    fn priority_subcommands() {
        assert_eq!(parse("/priority"), Command::PriorityHelp);
        assert_eq!(parse("/priority bogus"), Command::PriorityHelp);
        assert_eq!(parse("/priority mode"), Command::PriorityMode(None));
        assert_eq!(
            parse("/priority mode OFF"),
            Command::PriorityMode(Some(PriorityMode::Disabled))
        );
        assert_eq!(
            parse("/priority mode whitelist"),
            Command::PriorityMode(Some(PriorityMode::Whitelist))
        );
        assert_eq!(parse("/priority add @alice"), Command::PriorityAdd("@alice".into()));
        assert_eq!(parse("/priority remove 42"), Command::PriorityRemove("42".into()));
        assert_eq!(parse("/priority list"), Command::PriorityList);
    }

    #[test]
    fn priority_usage_errors() {
        let err = parse_command("/priority mode sometimes").unwrap_err();
        assert!(matches!(err, HeraldError::Command(ref m) if m.contains("Invalid mode")));
        let err = parse_command("/priority add").unwrap_err();
        assert!(matches!(err, HeraldError::Command(ref m) if m.starts_with("Usage:")));
        assert!(parse_command("/mute").is_err());
    }

    #[test]
    fn snooze_variants() {
        assert_eq!(parse("/snooze"), Command::SnoozeHelp);
        assert_eq!(parse("/snooze status"), Command::SnoozeStatus);
        assert_eq!(
            parse("/snooze 30m"),
            Command::Snooze {
                duration: TimeDelta::minutes(30),
                behavior: SnoozeBehavior::Drop,
            }
        );
        assert_eq!(
            parse("/snooze --queue 2h"),
            Command::Snooze {
                duration: TimeDelta::hours(2),
                behavior: SnoozeBehavior::Queue,
            }
        );
        assert!(matches!(
            parse_command("/snooze 5x"),
            Err(HeraldError::InvalidDuration { .. })
        ));
        assert!(matches!(
            parse_command("/snooze --queue"),
            Err(HeraldError::Command(_))
        ));
    }

    #[test]
    fn timezone_offsets() {
        assert_eq!(parse("/timezone"), Command::Timezone(None));
        assert_eq!(parse("/timezone +7"), Command::Timezone(Some(7.0)));
        assert_eq!(parse("/timezone UTC-5.5"), Command::Timezone(Some(-5.5)));
        assert!(parse_command("/timezone soon").is_err());
    }

    #[test]
    fn error_replies_are_escaped() {
        let reply = error_reply(&HeraldError::InvalidDuration {
            input: "<b>".into(),
        });
        assert!(reply.contains("&lt;b&gt;"));
        let reply = error_reply(&HeraldError::Internal("disk <full>".into()));
        assert!(reply.starts_with("🤖 ❌ Error: "));
        assert!(reply.contains("&lt;full&gt;"));
    }

    #[test]
    fn inactive_snooze_line() {
        let status = SnoozeStatus {
            phase: SnoozePhase::Inactive,
            until: None,
            remaining: None,
            behavior: SnoozeBehavior::Drop,
            queued: 0,
            limit: 100,
        };
        assert_eq!(snooze_line(&status), "Snooze: <b>Inactive</b>");
    }

    #[test]
    fn queue_snooze_line_shows_occupancy() {
        let status = SnoozeStatus {
            phase: SnoozePhase::ActiveQueue,
            until: None,
            remaining: Some(TimeDelta::minutes(90)),
            behavior: SnoozeBehavior::Queue,
            queued: 3,
            limit: 100,
        };
        assert_eq!(
            snooze_line(&status),
            "Snooze: <b>Active</b> (1.5h remaining)\nBehavior: queue\nQueued alerts: 3/100"
        );
    }
}
