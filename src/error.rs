use thiserror::Error;

/// Failures a roster operation can report back to the caller.
///
/// Every variant is recoverable: handlers turn it into a user-visible message
/// and keep serving.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// Self-registration is currently switched off.
    #[error("Registration is closed")]
    RegistrationClosed,

    /// The user already holds a place in the main or reserve list.
    #[error("You are already registered")]
    DuplicateUser,

    /// Another entry already uses this display name (case-insensitive).
    #[error("The name '{0}' is already taken")]
    DuplicateName(String),

    /// The display name is empty, too long or otherwise unusable.
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Both the main and the reserve list are full.
    #[error("All places are taken")]
    CapacityExceeded,

    /// The caller has no self-registered entry to cancel.
    #[error("You are not registered")]
    NotRegistered,

    /// A session date that is not `YYYY-MM-DD`.
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A session time that is not `HH:MM`.
    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    /// A session place that is empty or too long.
    #[error("Invalid place: {0}")]
    InvalidPlace(String),

    /// A participant number outside `1..=main+reserve`.
    #[error("There is no participant number {index} (roster has {total})")]
    IndexOutOfRange {
        /// The 1-based index that was requested.
        index: usize,
        /// Number of entries across both lists.
        total: usize,
    },

    /// An admin panel button points at a slot now held by someone else.
    #[error("Participant number {index} has changed since this panel was shown")]
    RosterChanged { index: usize },

    /// The caller is not the configured administrator.
    #[error("Only the administrator can do this")]
    PermissionDenied,

    /// The roster could not be read from or written to disk.
    #[error("Roster storage failed: {0}")]
    PersistenceFailure(String),
}

impl RosterError {
    /// A short hint shown under the error message.
    pub fn suggestion(&self) -> &'static str {
        match self {
            RosterError::RegistrationClosed => "Wait until the administrator opens registration.",
            RosterError::DuplicateUser => "Use /list to see your place.",
            RosterError::DuplicateName(_) => "Pick a different name, for example add an initial.",
            RosterError::InvalidName(_) => "Use a name between 1 and 50 characters on a single line.",
            RosterError::CapacityExceeded => "Try again later, places free up when people cancel.",
            RosterError::NotRegistered => "Use /register to sign up.",
            RosterError::InvalidDate(_) => "Example: /setdate 2024-05-14",
            RosterError::InvalidTime(_) => "Example: /settime 20:45",
            RosterError::InvalidPlace(_) => "Example: /setplace Central gym, hall 2",
            RosterError::IndexOutOfRange { .. } => "Use /admin to see the numbered roster.",
            RosterError::RosterChanged { .. } => "Nobody was removed. Press 🔄 Refresh and try again.",
            RosterError::PermissionDenied => "Contact the administrator.",
            RosterError::PersistenceFailure(_) => "The change may be lost on restart.",
        }
    }
}

/// Errors from reading or writing the roster document.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File that was being accessed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid roster JSON.
    #[error("malformed roster document: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StoreError> for RosterError {
    fn from(err: StoreError) -> Self {
        RosterError::PersistenceFailure(err.to_string())
    }
}
