//! On-disk JSON shape of the roster.
//!
//! The file format grew over several bot versions, so every field is
//! optional on read. Defaults are applied in [`RosterDocument::into_state`]
//! and nowhere else.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::database::models::entry::{Entry, EntryOrigin};
use crate::database::models::roster::{RosterState, SessionDefaults, SessionInfo};
use crate::utils::datetime::format_date;

/// One participant as stored in the JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub is_manual: Option<bool>,
    /// Older files stored the Telegram first and last name instead of a
    /// chosen display name.
    #[serde(default, skip_serializing)]
    pub name: Option<String>,
    #[serde(default, skip_serializing)]
    pub last_name: Option<String>,
}

impl StoredEntry {
    fn resolved_name(&self) -> String {
        let chosen = self.display_name.as_deref().map(str::trim).unwrap_or_default();
        if !chosen.is_empty() {
            return chosen.to_string();
        }

        let legacy = format!(
            "{} {}",
            self.name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        let legacy = legacy.trim();
        if !legacy.is_empty() {
            return legacy.to_string();
        }

        match (&self.username, self.id) {
            (Some(handle), _) if !handle.trim().is_empty() => handle.trim().to_string(),
            (_, Some(id)) => format!("User {id}"),
            _ => "Unknown participant".to_string(),
        }
    }

    pub fn into_entry(self) -> Entry {
        let display_name = self.resolved_name();
        let registered_at = self.time.unwrap_or_default();
        match self.id {
            Some(user_id) if !self.is_manual.unwrap_or(false) => {
                Entry::self_registered(user_id, display_name, self.username, registered_at)
            }
            _ => Entry::manual(display_name, registered_at),
        }
    }

    pub fn from_entry(entry: &Entry) -> Self {
        let (id, username, is_manual) = match &entry.origin {
            EntryOrigin::SelfRegistered { user_id, username } => (Some(*user_id), username.clone(), false),
            EntryOrigin::Manual => (None, None, true),
        };
        Self {
            display_name: Some(entry.display_name.clone()),
            id,
            username,
            time: Some(entry.registered_at.clone()),
            is_manual: Some(is_manual),
            name: None,
            last_name: None,
        }
    }
}

/// The whole roster file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterDocument {
    #[serde(default)]
    pub main: Vec<StoredEntry>,
    #[serde(default)]
    pub reserve: Vec<StoredEntry>,
    /// Some versions kept admin-added names in a separate array; they are
    /// appended to the main list on load and never written back.
    #[serde(default, skip_serializing)]
    pub manual_entries: Vec<StoredEntry>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub registration_open: Option<bool>,
}

impl RosterDocument {
    /// Converts the document into a state, back-filling anything missing.
    ///
    /// The result may still violate the capacity limits; callers run
    /// [`RosterState::normalize`] afterwards.
    pub fn into_state(self, defaults: &SessionDefaults, today: NaiveDate) -> RosterState {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let session = SessionInfo {
            date: non_blank(self.date).unwrap_or_else(|| format_date(&today)),
            time: non_blank(self.time).unwrap_or_else(|| defaults.time.clone()),
            place: non_blank(self.place).unwrap_or_else(|| defaults.place.clone()),
        };

        let mut main: Vec<Entry> = self.main.into_iter().map(StoredEntry::into_entry).collect();
        main.extend(self.manual_entries.into_iter().map(|stored| {
            let mut entry = stored.into_entry();
            entry.origin = EntryOrigin::Manual;
            entry
        }));

        RosterState {
            main,
            reserve: self.reserve.into_iter().map(StoredEntry::into_entry).collect(),
            session,
            registration_open: self.registration_open.unwrap_or(true),
        }
    }

    pub fn from_state(state: &RosterState) -> Self {
        Self {
            main: state.main.iter().map(StoredEntry::from_entry).collect(),
            reserve: state.reserve.iter().map(StoredEntry::from_entry).collect(),
            manual_entries: Vec::new(),
            time: Some(state.session.time.clone()),
            date: Some(state.session.date.clone()),
            place: Some(state.session.place.clone()),
            registration_open: Some(state.registration_open),
        }
    }
}
