use crate::errors::StoreError;
use crate::models::CounterState;
use crate::store::RecordStore;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info};

/// Whole-record JSON file, rewritten on every mutation.
#[derive(Debug, Clone)]
pub struct FileRecord {
    path: PathBuf,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the parent directory and writes a default record when none exists yet.
    pub async fn ensure_exists(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        if fs::try_exists(&self.path).await? {
            return Ok(());
        }

        info!("creating state file at {}", self.path.display());
        persist_state(&self.path, &CounterState::default()).await
    }
}

#[async_trait]
impl RecordStore for FileRecord {
    async fn load(&self) -> CounterState {
        load_state(&self.path).await
    }

    async fn save(&self, state: &CounterState) -> Result<(), StoreError> {
        persist_state(&self.path, state).await
    }
}

pub async fn load_state(path: &Path) -> CounterState {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(state) => state,
            Err(err) => {
                error!("failed to parse state file: {err}");
                CounterState::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => CounterState::default(),
        Err(err) => {
            error!("failed to read state file: {err}");
            CounterState::default()
        }
    }
}

pub async fn persist_state(path: &Path, state: &CounterState) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(state)?;
    fs::write(path, payload).await?;
    Ok(())
}
