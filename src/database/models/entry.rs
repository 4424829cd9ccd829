/// Who created an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOrigin {
    /// The participant signed up through the bot.
    SelfRegistered {
        user_id: i64,
        username: Option<String>,
    },
    /// The administrator typed the name in; no Telegram account behind it.
    Manual,
}

/// One participant registration in the main or reserve list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub display_name: String,
    /// `HH:MM` at the moment of registration.
    pub registered_at: String,
    pub origin: EntryOrigin,
}

impl Entry {
    pub fn self_registered(
        user_id: i64,
        display_name: impl Into<String>,
        username: Option<String>,
        registered_at: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            registered_at: registered_at.into(),
            origin: EntryOrigin::SelfRegistered {
                user_id,
                username: username.filter(|u| !u.trim().is_empty()),
            },
        }
    }

    pub fn manual(display_name: impl Into<String>, registered_at: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            registered_at: registered_at.into(),
            origin: EntryOrigin::Manual,
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        match self.origin {
            EntryOrigin::SelfRegistered { user_id, .. } => Some(user_id),
            EntryOrigin::Manual => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match &self.origin {
            EntryOrigin::SelfRegistered { username, .. } => username.as_deref(),
            EntryOrigin::Manual => None,
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self.origin, EntryOrigin::Manual)
    }

    /// Case-insensitive display name comparison.
    pub fn has_name(&self, name: &str) -> bool {
        self.display_name.trim().to_lowercase() == name.trim().to_lowercase()
    }

    /// Plain-text label, e.g. `Anna (@anna_k)`.
    pub fn label(&self) -> String {
        match self.username() {
            Some(handle) => format!("{} (@{})", self.display_name, handle),
            None => self.display_name.clone(),
        }
    }

    /// Short fingerprint of the entry, carried in admin panel buttons so a
    /// press on an outdated panel can be told apart from a current one.
    pub fn tag(&self) -> u32 {
        // FNV-1a
        let mut hash: u32 = 0x811c_9dc5;
        let id = self.user_id().map(|id| id.to_string()).unwrap_or_default();
        let fields = [id.as_str(), self.display_name.as_str(), self.registered_at.as_str()];
        for byte in fields.join("\0").bytes() {
            hash ^= u32::from(byte);
            hash = hash.wrapping_mul(0x0100_0193);
        }
        hash
    }
}
