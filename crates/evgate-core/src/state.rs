//! Persisted record of gateway objects created by previous runs.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::arn::FunctionId;
use crate::error::StateStoreError;

pub const DEFAULT_STATE_PATH: &str = ".serverless/eventgateway-state.json";

/// Functions and subscriptions believed to exist on the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationState {
    pub functions: Vec<FunctionId>,
    pub subscriptions: Vec<String>,
}

impl ReconciliationState {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.subscriptions.is_empty()
    }

    /// Copy of the state without `id` in `subscriptions`.
    pub fn without_subscription(&self, id: &str) -> Vec<String> {
        self.subscriptions
            .iter()
            .filter(|s| s.as_str() != id)
            .cloned()
            .collect()
    }

    pub fn without_function(&self, id: &FunctionId) -> Vec<FunctionId> {
        self.functions.iter().filter(|f| *f != id).cloned().collect()
    }
}

/// Durable storage for [`ReconciliationState`].
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Empty state when nothing has been stored yet.
    async fn load(&self) -> Result<ReconciliationState, StateStoreError>;

    /// Replace the stored record entirely.
    async fn save(&self, state: &ReconciliationState) -> Result<(), StateStoreError>;
}

/// JSON file store. Writes go to a sibling temp file which is then renamed over
/// the target, so readers never observe a partial document.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the state file; returns whether one existed.
    pub async fn clear(&self) -> Result<bool, StateStoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StateStoreError {
        StateStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> Result<ReconciliationState, StateStoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No state file, starting empty");
                return Ok(ReconciliationState::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&content).map_err(|source| StateStoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, state: &ReconciliationState) -> Result<(), StateStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }
        let content = serde_json::to_string_pretty(state)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, content)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        tracing::debug!(
            path = %self.path.display(),
            functions = state.functions.len(),
            subscriptions = state.subscriptions.len(),
            "State saved"
        );
        Ok(())
    }
}

/// In-process store that keeps every saved snapshot.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    current: Mutex<Option<ReconciliationState>>,
    history: Mutex<Vec<ReconciliationState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ReconciliationState) -> Self {
        Self {
            current: Mutex::new(Some(state)),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Every state passed to `save`, oldest first.
    pub fn history(&self) -> Vec<ReconciliationState> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    pub fn current(&self) -> Option<ReconciliationState> {
        self.current.lock().ok().and_then(|c| c.clone())
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<ReconciliationState, StateStoreError> {
        Ok(self.current().unwrap_or_default())
    }

    async fn save(&self, state: &ReconciliationState) -> Result<(), StateStoreError> {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(state.clone());
        }
        if let Ok(mut history) = self.history.lock() {
            history.push(state.clone());
        }
        Ok(())
    }
}
