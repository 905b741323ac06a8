// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source-based priority filtering.
//!
//! Exactly one [`PriorityMode`] is active at a time. Both lists survive mode
//! switches so that flipping back restores the previous behavior.

use std::collections::{BTreeMap, BTreeSet};

use herald_core::SourceId;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PriorityMode {
    /// Every source is allowed.
    #[default]
    #[strum(to_string = "disabled", serialize = "off")]
    Disabled,
    /// Only listed sources are allowed.
    Whitelist,
    /// Listed sources are blocked.
    Blacklist,
}

/// Result of [`PriorityFilter::set_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub previous: PriorityMode,
    pub current: PriorityMode,
}

impl ModeChange {
    /// True when the switch went between whitelist and blacklist, leaving the
    /// other list stored but inactive.
    pub fn swapped_lists(&self) -> bool {
        matches!(
            (self.previous, self.current),
            (PriorityMode::Whitelist, PriorityMode::Blacklist)
                | (PriorityMode::Blacklist, PriorityMode::Whitelist)
        )
    }
}

/// Priority configuration persisted under `priority_contacts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPriority")]
pub struct PriorityFilter {
    mode: PriorityMode,
    whitelist: BTreeSet<SourceId>,
    blacklist: BTreeSet<SourceId>,
    /// Display names captured when a source was added.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    names: BTreeMap<SourceId, String>,
}

impl PriorityFilter {
    pub fn mode(&self) -> PriorityMode {
        self.mode
    }

    /// Whether a single source passes the active mode.
    pub fn allows(&self, source_id: SourceId) -> bool {
        match self.mode {
            PriorityMode::Disabled => true,
            PriorityMode::Whitelist => self.whitelist.contains(&source_id),
            PriorityMode::Blacklist => !self.blacklist.contains(&source_id),
        }
    }

    /// Whether a message passes, considering its sender and its chat.
    ///
    /// A whitelist admits the message if either id is listed; a blacklist
    /// blocks it if either id is listed.
    pub fn allows_message(&self, sender_id: SourceId, chat_id: SourceId) -> bool {
        match self.mode {
            PriorityMode::Disabled => true,
            PriorityMode::Whitelist => self.allows(sender_id) || self.allows(chat_id),
            PriorityMode::Blacklist => self.allows(sender_id) && self.allows(chat_id),
        }
    }

    pub fn set_mode(&mut self, mode: PriorityMode) -> ModeChange {
        let previous = std::mem::replace(&mut self.mode, mode);
        ModeChange {
            previous,
            current: mode,
        }
    }

    /// Returns `false` if the id was already listed.
    pub fn add_to_whitelist(&mut self, id: SourceId) -> bool {
        self.whitelist.insert(id)
    }

    /// Returns `false` if the id was not listed.
    pub fn remove_from_whitelist(&mut self, id: SourceId) -> bool {
        let removed = self.whitelist.remove(&id);
        self.forget_name_if_unlisted(id);
        removed
    }

    pub fn add_to_blacklist(&mut self, id: SourceId) -> bool {
        self.blacklist.insert(id)
    }

    pub fn remove_from_blacklist(&mut self, id: SourceId) -> bool {
        let removed = self.blacklist.remove(&id);
        self.forget_name_if_unlisted(id);
        removed
    }

    /// Remembers a human-readable name for a listed id.
    pub fn set_name(&mut self, id: SourceId, name: impl Into<String>) {
        if self.whitelist.contains(&id) || self.blacklist.contains(&id) {
            self.names.insert(id, name.into());
        }
    }

    /// The stored display name, or the id itself.
    pub fn display_name(&self, id: SourceId) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    pub fn whitelist(&self) -> &BTreeSet<SourceId> {
        &self.whitelist
    }

    pub fn blacklist(&self) -> &BTreeSet<SourceId> {
        &self.blacklist
    }

    fn forget_name_if_unlisted(&mut self, id: SourceId) {
        if !self.whitelist.contains(&id) && !self.blacklist.contains(&id) {
            self.names.remove(&id);
        }
    }
}

/// Accepts both `[id, ...]` and the older `{"id": "name"}` list encoding.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdList {
    Ids(BTreeSet<SourceId>),
    Named(BTreeMap<String, String>),
}

impl Default for IdList {
    fn default() -> Self {
        IdList::Ids(BTreeSet::new())
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawPriority {
    mode: PriorityMode,
    whitelist: IdList,
    blacklist: IdList,
    names: BTreeMap<SourceId, String>,
}

impl From<RawPriority> for PriorityFilter {
    fn from(raw: RawPriority) -> Self {
        let mut names = raw.names;
        let mut collect = |list: IdList| match list {
            IdList::Ids(ids) => ids,
            IdList::Named(named) => named
                .into_iter()
                .filter_map(|(id, name)| match id.parse::<SourceId>() {
                    Ok(id) => {
                        names.entry(id).or_insert(name);
                        Some(id)
                    }
                    Err(_) => {
                        tracing::warn!(id = %id, "skipping non-numeric priority list entry");
                        None
                    }
                })
                .collect(),
        };
        let whitelist = collect(raw.whitelist);
        let blacklist = collect(raw.blacklist);
        names.retain(|id, _| whitelist.contains(id) || blacklist.contains(id));

        Self {
            mode: raw.mode,
            whitelist,
            blacklist,
            names,
        }
    }
}
