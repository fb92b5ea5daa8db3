use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::core::{ChunkKey, SampleRangeRequest};
use crate::error::{StoreError, ViewError, ViewResult};
use crate::store::ArrayStore;

use super::chunk_cache::{ChunkCache, ChunkCacheStats, ChunkPayload, SingleSlotCache};

/// Portion of one storage chunk touched by a range request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    pub chunk_index: usize,
    /// Absolute sample range fetched from the store for this chunk.
    pub fetch_start: usize,
    pub fetch_end: usize,
    /// Sub-range of the chunk payload copied into the output.
    pub copy_start: usize,
    pub copy_end: usize,
}

impl ChunkSpan {
    #[must_use]
    pub fn copy_len(self) -> usize {
        self.copy_end - self.copy_start
    }
}

/// Lists the chunks overlapping `[start, end_exclusive)` in increasing order.
///
/// Callers guarantee `start < end_exclusive <= sample_count` and
/// `chunk_sample_size > 0`.
#[must_use]
pub fn plan_chunk_spans(
    start: usize,
    end_exclusive: usize,
    chunk_sample_size: usize,
    sample_count: usize,
) -> SmallVec<[ChunkSpan; 4]> {
    let start_chunk = start / chunk_sample_size;
    let end_chunk = (end_exclusive - 1) / chunk_sample_size;

    (start_chunk..=end_chunk)
        .map(|i| {
            let chunk_origin = i * chunk_sample_size;
            ChunkSpan {
                chunk_index: i,
                fetch_start: chunk_origin,
                fetch_end: (chunk_origin + chunk_sample_size).min(sample_count),
                copy_start: start.saturating_sub(chunk_origin),
                copy_end: chunk_sample_size.min(end_exclusive - chunk_origin),
            }
        })
        .collect()
}

/// Assembles contiguous sample ranges from chunked storage.
///
/// Chunks are fetched one at a time in increasing order and every miss becomes
/// the most recent cache entry. A request either returns the complete buffer
/// or fails without touching the cache.
#[derive(Debug)]
pub struct RangeSliceFetcher<S, C = SingleSlotCache> {
    store: S,
    cache: C,
}

impl<S: ArrayStore> RangeSliceFetcher<S, SingleSlotCache> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_cache(store, SingleSlotCache::new())
    }
}

impl<S: ArrayStore, C: ChunkCache> RangeSliceFetcher<S, C> {
    #[must_use]
    pub fn with_cache(store: S, cache: C) -> Self {
        Self { store, cache }
    }

    /// Returns samples `[request.start, request.end_exclusive)` of the
    /// requested series.
    pub async fn get_range(&mut self, request: SampleRangeRequest) -> ViewResult<Vec<i16>> {
        let shape = self.store.shape();
        request.validate(shape)?;
        let chunk_sample_size = self.store.chunk_sample_size();
        if chunk_sample_size == 0 {
            return Err(ViewError::InvalidData(
                "store reports a zero chunk sample size".to_owned(),
            ));
        }

        let spans = plan_chunk_spans(
            request.start,
            request.end_exclusive,
            chunk_sample_size,
            shape.samples,
        );
        let mut out = Vec::with_capacity(request.len());
        let mut staged: SmallVec<[(ChunkKey, ChunkPayload); 4]> = SmallVec::new();

        for span in &spans {
            let key = ChunkKey::new(request.selection, span.chunk_index);
            let payload = match self.cache.get(key) {
                Some(payload) => {
                    trace!(%key, "chunk cache hit");
                    payload
                }
                None => {
                    let payload = self.fetch_span(key, *span).await?;
                    staged.push((key, Arc::clone(&payload)));
                    payload
                }
            };
            out.extend_from_slice(&payload[span.copy_start..span.copy_end]);
        }

        for (key, payload) in staged {
            self.cache.put(key, payload);
        }
        Ok(out)
    }

    async fn fetch_span(&self, key: ChunkKey, span: ChunkSpan) -> ViewResult<ChunkPayload> {
        trace!(
            %key,
            start = span.fetch_start,
            end = span.fetch_end,
            "fetching chunk"
        );
        let fetched = self
            .store
            .fetch_chunk(key.selection, span.fetch_start, span.fetch_end)
            .await
            .map_err(|source| {
                warn!(%key, error = %source, "chunk fetch failed");
                ViewError::ChunkFetch { key, source }
            })?;

        let expected = span.fetch_end - span.fetch_start;
        if fetched.len() != expected {
            return Err(ViewError::ChunkFetch {
                key,
                source: StoreError::Malformed(format!(
                    "expected {expected} samples, got {}",
                    fetched.len()
                )),
            });
        }
        Ok(Arc::from(fetched))
    }

    /// Drops every cached chunk. Owners call this whenever the dataset or the
    /// selected series changes.
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    /// Swaps in a new dataset, clearing the cache, and returns the old store.
    pub fn replace_store(&mut self, store: S) -> S {
        self.cache.clear();
        std::mem::replace(&mut self.store, store)
    }

    #[must_use]
    pub fn cache_stats(&self) -> ChunkCacheStats {
        self.cache.stats()
    }

    #[must_use]
    pub fn cache(&self) -> &C {
        &self.cache
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn into_parts(self) -> (S, C) {
        (self.store, self.cache)
    }
}
