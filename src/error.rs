use thiserror::Error;

use crate::core::{ChunkKey, SeriesSelection};

pub type ViewResult<T> = Result<T, ViewError>;

/// Errors raised by the array-store collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("chunk request out of bounds: [{start}, {end}) exceeds {sample_count} samples")]
    OutOfBounds {
        start: usize,
        end: usize,
        sample_count: usize,
    },

    #[error("malformed chunk payload: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("invalid sample range: [{start}, {end}) with {sample_count} samples")]
    InvalidRange {
        start: usize,
        end: usize,
        sample_count: usize,
    },

    #[error("selection {selection:?} is outside array shape {shape:?}")]
    SelectionOutOfShape {
        selection: SeriesSelection,
        shape: [usize; 4],
    },

    #[error("visible window is empty: start_index={start_index}, end_index={end_index}")]
    EmptyWindow { start_index: i64, end_index: i64 },

    #[error("failed to fetch chunk {key}")]
    ChunkFetch {
        key: ChunkKey,
        #[source]
        source: StoreError,
    },

    #[error("missing metadata: {0}")]
    MissingMetadata(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("request generation {generation} superseded by {latest}")]
    Superseded { generation: u64, latest: u64 },
}

impl ViewError {
    /// Returns `true` for caller-side range errors that must not be retried.
    #[must_use]
    pub fn is_invalid_range(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange { .. } | Self::SelectionOutOfShape { .. } | Self::EmptyWindow { .. }
        )
    }
}
