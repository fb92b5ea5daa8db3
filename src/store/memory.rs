use std::cell::{Cell, RefCell};

use crate::core::{ArrayShape, SeriesSelection};
use crate::error::{StoreError, ViewError, ViewResult};

use super::{ArrayStore, StoreResult};

/// One `fetch_chunk` call observed by [`InMemoryArrayStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRecord {
    pub selection: SeriesSelection,
    pub start: usize,
    pub end_exclusive: usize,
}

/// Array store backed by a flat in-memory buffer.
///
/// Used by tests, benchmarks and headless tooling. Every fetch is recorded so
/// callers can assert on chunk traffic, and a failure can be injected on a
/// chosen fetch call to exercise error paths.
#[derive(Debug)]
pub struct InMemoryArrayStore {
    shape: ArrayShape,
    chunk_sample_size: usize,
    data: Vec<i16>,
    fetches: RefCell<Vec<FetchRecord>>,
    fail_on_fetch: Cell<Option<usize>>,
}

impl InMemoryArrayStore {
    /// Wraps a row-major `(channel, trace, segment, sample)` buffer.
    pub fn new(shape: ArrayShape, chunk_sample_size: usize, data: Vec<i16>) -> ViewResult<Self> {
        if chunk_sample_size == 0 {
            return Err(ViewError::InvalidData(
                "chunk sample size must be > 0".to_owned(),
            ));
        }
        let expected = shape
            .channels
            .checked_mul(shape.traces)
            .and_then(|n| n.checked_mul(shape.segments))
            .and_then(|n| n.checked_mul(shape.samples))
            .ok_or_else(|| ViewError::InvalidData("array shape overflows usize".to_owned()))?;
        if data.len() != expected {
            return Err(ViewError::InvalidData(format!(
                "buffer length {} does not match shape {:?} ({expected} samples)",
                data.len(),
                shape.as_array()
            )));
        }

        Ok(Self {
            shape,
            chunk_sample_size,
            data,
            fetches: RefCell::new(Vec::new()),
            fail_on_fetch: Cell::new(None),
        })
    }

    /// Builds a store whose samples are produced by `f(selection, index)`.
    pub fn from_fn<F>(shape: ArrayShape, chunk_sample_size: usize, f: F) -> ViewResult<Self>
    where
        F: Fn(SeriesSelection, usize) -> i16,
    {
        let mut data = Vec::new();
        for channel in 0..shape.channels {
            for trace in 0..shape.traces {
                for segment in 0..shape.segments {
                    let selection = SeriesSelection::new(channel, trace, segment);
                    data.extend((0..shape.samples).map(|i| f(selection, i)));
                }
            }
        }
        Self::new(shape, chunk_sample_size, data)
    }

    /// Single-series store holding `samples`.
    pub fn single_series(samples: Vec<i16>, chunk_sample_size: usize) -> ViewResult<Self> {
        let shape = ArrayShape::new(1, 1, 1, samples.len());
        Self::new(shape, chunk_sample_size, samples)
    }

    /// Makes the `n`-th fetch call (1-based, counted from the last
    /// [`Self::clear_fetches`]) fail with a transport error.
    pub fn set_failure_on_fetch(&self, n: Option<usize>) {
        self.fail_on_fetch.set(n);
    }

    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.borrow().len()
    }

    #[must_use]
    pub fn fetches(&self) -> Vec<FetchRecord> {
        self.fetches.borrow().clone()
    }

    pub fn clear_fetches(&self) {
        self.fetches.borrow_mut().clear();
    }

    fn series_offset(&self, selection: SeriesSelection) -> usize {
        let shape = self.shape;
        ((selection.channel * shape.traces + selection.trace) * shape.segments + selection.segment)
            * shape.samples
    }
}

impl ArrayStore for InMemoryArrayStore {
    fn shape(&self) -> ArrayShape {
        self.shape
    }

    fn chunk_sample_size(&self) -> usize {
        self.chunk_sample_size
    }

    async fn fetch_chunk(
        &self,
        selection: SeriesSelection,
        start: usize,
        end_exclusive: usize,
    ) -> StoreResult<Vec<i16>> {
        let call = {
            let mut fetches = self.fetches.borrow_mut();
            fetches.push(FetchRecord {
                selection,
                start,
                end_exclusive,
            });
            fetches.len()
        };

        if self.fail_on_fetch.get() == Some(call) {
            return Err(StoreError::Transport(format!(
                "injected failure on fetch #{call}"
            )));
        }
        if !self.shape.contains(selection) || start >= end_exclusive || end_exclusive > self.shape.samples
        {
            return Err(StoreError::OutOfBounds {
                start,
                end: end_exclusive,
                sample_count: self.shape.samples,
            });
        }

        let base = self.series_offset(selection);
        Ok(self.data[base + start..base + end_exclusive].to_vec())
    }
}
