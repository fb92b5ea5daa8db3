mod memory;

pub use memory::{FetchRecord, InMemoryArrayStore};

use std::future::Future;

use crate::core::{ArrayShape, SeriesSelection};
use crate::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Contract implemented by any chunked waveform array backend.
///
/// Only the sample axis is chunked: one chunk is a single
/// `(channel, trace, segment)` series times `chunk_sample_size` samples.
/// Fetches are asynchronous and may fail; the transport behind them is the
/// backend's concern.
pub trait ArrayStore {
    fn shape(&self) -> ArrayShape;

    fn chunk_sample_size(&self) -> usize;

    /// Fetches samples `[start, end_exclusive)` of one series.
    fn fetch_chunk(
        &self,
        selection: SeriesSelection,
        start: usize,
        end_exclusive: usize,
    ) -> impl Future<Output = StoreResult<Vec<i16>>>;
}
