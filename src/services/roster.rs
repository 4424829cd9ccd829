use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::database::models::{
    Entry, Placement, Removal, RosterLimits, RosterState, SessionField, SessionInfo,
};
use crate::database::store::RosterStore;
use crate::error::RosterError;
use crate::utils::datetime::{current_time_label, today};

/// Identity of whoever triggered an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
}

impl Caller {
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }
}

/// Successful result of a roster operation.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    /// Roster as it stands after the operation.
    pub state: RosterState,
    /// Set when the change is applied in memory but could not be saved.
    pub persistence_warning: Option<RosterError>,
}

impl<T> Outcome<T> {
    pub fn is_persisted(&self) -> bool {
        self.persistence_warning.is_none()
    }
}

/// Read-only view handed to renderers.
#[derive(Debug, Clone)]
pub struct RosterSnapshot {
    pub state: RosterState,
    pub limits: RosterLimits,
}

/// In-memory copy of the roster.
struct Cached {
    state: RosterState,
    /// A change failed to save, so the file on disk is behind `state`.
    /// Until a save succeeds the cache is the source of truth.
    unsaved: bool,
}

struct Inner {
    store: RosterStore,
    limits: RosterLimits,
    admin_id: i64,
    /// Last state known to be good. Also serializes all operations.
    current: Mutex<Cached>,
}

/// Roster operations for the bot.
///
/// Each operation holds one lock for its whole load, mutate, save cycle, so
/// concurrent Telegram updates never interleave on the roster.
#[derive(Clone)]
pub struct RosterService {
    inner: Arc<Inner>,
}

impl RosterService {
    pub async fn new(store: RosterStore, limits: RosterLimits, admin_id: i64) -> Self {
        let mut initial = match store.load().await {
            Ok(state) => state,
            Err(e) => {
                warn!("Could not load roster from {}, starting fresh: {}", store.path().display(), e);
                RosterState::fresh(store.defaults(), today())
            }
        };
        log_dropped(&initial.normalize(limits));

        info!(
            "Roster loaded: {} main, {} reserve, registration {}",
            initial.main.len(),
            initial.reserve.len(),
            if initial.registration_open { "open" } else { "closed" }
        );

        Self {
            inner: Arc::new(Inner {
                store,
                limits,
                admin_id,
                current: Mutex::new(Cached { state: initial, unsaved: false }),
            }),
        }
    }

    pub fn limits(&self) -> RosterLimits {
        self.inner.limits
    }

    pub fn store(&self) -> &RosterStore {
        &self.inner.store
    }

    pub fn is_admin(&self, caller: Caller) -> bool {
        caller.user_id == self.inner.admin_id
    }

    pub async fn register(
        &self,
        caller: Caller,
        display_name: &str,
        username: Option<String>,
    ) -> Result<Outcome<Placement>, RosterError> {
        let limits = self.inner.limits;
        let stamp = current_time_label();
        self.mutate(|state| state.register(limits, caller.user_id, display_name, username, &stamp))
            .await
    }

    pub async fn cancel(&self, caller: Caller) -> Result<Outcome<Removal>, RosterError> {
        self.mutate(|state| state.cancel(caller.user_id)).await
    }

    pub async fn list(&self, _caller: Caller) -> Result<RosterSnapshot, RosterError> {
        let guard = self.inner.current.lock().await;
        let state = self.reload(&guard).await;
        Ok(RosterSnapshot { state, limits: self.inner.limits })
    }

    pub async fn admin_set_field(
        &self,
        caller: Caller,
        field: SessionField,
        value: &str,
    ) -> Result<Outcome<SessionInfo>, RosterError> {
        self.require_admin(caller)?;
        self.mutate(|state| {
            state.set_field(field, value)?;
            Ok(state.session.clone())
        })
        .await
    }

    pub async fn admin_add_manual(
        &self,
        caller: Caller,
        display_name: &str,
    ) -> Result<Outcome<Placement>, RosterError> {
        self.require_admin(caller)?;
        let limits = self.inner.limits;
        let stamp = current_time_label();
        self.mutate(|state| state.add_manual(limits, display_name, &stamp)).await
    }

    pub async fn admin_remove_by_index(
        &self,
        caller: Caller,
        index: usize,
    ) -> Result<Outcome<Removal>, RosterError> {
        self.require_admin(caller)?;
        self.mutate(|state| state.remove_by_index(index)).await
    }

    /// Removal from an admin panel button: refused when participant `index`
    /// is no longer the entry the panel showed.
    pub async fn admin_remove_tagged(
        &self,
        caller: Caller,
        index: usize,
        tag: u32,
    ) -> Result<Outcome<Removal>, RosterError> {
        self.require_admin(caller)?;
        self.mutate(|state| state.remove_tagged(index, tag)).await
    }

    pub async fn admin_set_registration_open(
        &self,
        caller: Caller,
        open: bool,
    ) -> Result<Outcome<bool>, RosterError> {
        self.require_admin(caller)?;
        self.mutate(|state| {
            state.set_registration_open(open);
            Ok(open)
        })
        .await
    }

    /// Discards the current roster and starts an empty one with default metadata.
    pub async fn admin_new_session(&self, caller: Caller) -> Result<Outcome<SessionInfo>, RosterError> {
        self.require_admin(caller)?;
        let fresh = RosterState::fresh(self.inner.store.defaults(), today());
        self.mutate(move |state| {
            let previous = state.total();
            *state = fresh;
            info!("New session started, {} previous entries discarded", previous);
            Ok(state.session.clone())
        })
        .await
    }

    fn require_admin(&self, caller: Caller) -> Result<(), RosterError> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            warn!("User {} attempted an admin operation", caller.user_id);
            Err(RosterError::PermissionDenied)
        }
    }

    /// Latest state from disk, or the cached one when the file can't be read
    /// or is missing changes that failed to save.
    async fn reload(&self, cached: &Cached) -> RosterState {
        if cached.unsaved {
            return cached.state.clone();
        }
        match self.inner.store.load().await {
            Ok(mut state) => {
                log_dropped(&state.normalize(self.inner.limits));
                state
            }
            Err(e) => {
                warn!("Falling back to in-memory roster: {}", e);
                cached.state.clone()
            }
        }
    }

    async fn mutate<T, F>(&self, op: F) -> Result<Outcome<T>, RosterError>
    where
        F: FnOnce(&mut RosterState) -> Result<T, RosterError>,
    {
        let mut guard = self.inner.current.lock().await;
        let mut state = self.reload(&guard).await;

        // op validates before it mutates, so on error `state` is discarded as-is
        let value = op(&mut state)?;

        let persistence_warning = match self.inner.store.save(&state).await {
            Ok(()) => None,
            Err(e) => {
                warn!("Roster change kept in memory only: {}", e);
                Some(RosterError::from(e))
            }
        };
        *guard = Cached { state: state.clone(), unsaved: persistence_warning.is_some() };

        Ok(Outcome { value, state, persistence_warning })
    }
}

fn log_dropped(dropped: &[Entry]) {
    for entry in dropped {
        warn!("Dropped roster entry '{}' that no longer fits the limits", entry.display_name);
    }
}
