use std::path::{Path, PathBuf};

use tracing::info;

use crate::database::models::{RosterDocument, RosterState, SessionDefaults};
use crate::error::StoreError;
use crate::utils::datetime::today;
use crate::utils::logging::{log_store_error, log_store_operation};

/// Reads and writes the roster JSON file.
///
/// Writes go to a sibling `.tmp` file which is then renamed over the target,
/// so a crash mid-write leaves the previous roster intact.
#[derive(Debug, Clone)]
pub struct RosterStore {
    path: PathBuf,
    defaults: SessionDefaults,
}

impl RosterStore {
    pub async fn open(path: impl Into<PathBuf>, defaults: SessionDefaults) -> Result<Self, StoreError> {
        let path = path.into();

        // Create the data directory if it doesn't exist
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !tokio::fs::try_exists(parent).await.unwrap_or(false) {
                info!("Creating data directory {}", parent.display());
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| io_error(parent, source))?;
            }
        }

        Ok(Self { path, defaults })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn defaults(&self) -> &SessionDefaults {
        &self.defaults
    }

    /// Raw document, or `None` when there is no file yet (or it is empty).
    pub async fn load_document(&self) -> Result<Option<RosterDocument>, StoreError> {
        let display = self.path.display().to_string();

        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log_store_operation("load", &display, Some("no file, starting fresh"));
                return Ok(None);
            }
            Err(e) => {
                log_store_error("load", &display, &e.to_string());
                return Err(io_error(&self.path, e));
            }
        };

        if content.trim().is_empty() {
            log_store_operation("load", &display, Some("empty file, starting fresh"));
            return Ok(None);
        }

        let document = serde_json::from_str(&content).map_err(|e| {
            log_store_error("parse", &display, &e.to_string());
            StoreError::from(e)
        })?;
        log_store_operation("load", &display, None);
        Ok(Some(document))
    }

    /// Current roster with defaults applied. A missing file yields a fresh
    /// session dated today.
    pub async fn load(&self) -> Result<RosterState, StoreError> {
        let state = match self.load_document().await? {
            Some(document) => document.into_state(&self.defaults, today()),
            None => RosterState::fresh(&self.defaults, today()),
        };
        Ok(state)
    }

    pub async fn save(&self, state: &RosterState) -> Result<(), StoreError> {
        self.save_document(&RosterDocument::from_state(state)).await
    }

    pub async fn save_document(&self, document: &RosterDocument) -> Result<(), StoreError> {
        let display = self.path.display().to_string();
        let json = serde_json::to_string_pretty(document)?;
        let tmp_path = self.path.with_extension("json.tmp");

        let result = async {
            tokio::fs::write(&tmp_path, json.as_bytes())
                .await
                .map_err(|e| io_error(&tmp_path, e))?;
            tokio::fs::rename(&tmp_path, &self.path)
                .await
                .map_err(|e| io_error(&self.path, e))
        }
        .await;

        match &result {
            Ok(()) => log_store_operation(
                "save",
                &display,
                Some(&format!("{} main, {} reserve", document.main.len(), document.reserve.len())),
            ),
            Err(e) => log_store_error("save", &display, &e.to_string()),
        }
        result
    }

    /// Deletes the roster file. Returns whether there was one.
    pub async fn remove(&self) -> Result<bool, StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&self.path, e)),
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
