use crate::engine::FetchMode;
use crate::models::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Fetching [{mode}] transactions failed: {source}")]
    FetchFailure {
        mode: FetchMode,
        source: FetchError
    },
    #[error("No further pages can be loaded in the current mode")]
    LoadMoreUnavailable
}

impl SyncError {
    pub fn fetch_failure(mode: FetchMode, source: FetchError) -> Self {
        Self::FetchFailure { mode, source }
    }
}
