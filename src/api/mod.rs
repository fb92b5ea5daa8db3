mod chunk_cache;
mod generation;
mod range_fetcher;
mod reducer_config;
mod series_reducer;
mod session;

pub use chunk_cache::{ChunkCache, ChunkCacheStats, ChunkPayload, LruChunkCache, SingleSlotCache};
pub use generation::{RenderTicket, RequestGenerations};
pub use range_fetcher::{ChunkSpan, RangeSliceFetcher, plan_chunk_spans};
pub use reducer_config::{
    DEFAULT_DECIMATION_THRESHOLD, DEFAULT_TARGET_POINTS, ReducerConfig, SessionConfig,
};
pub use series_reducer::{AdaptiveSeriesReducer, ReductionMode, SeriesContext, bucket_bounds};
pub use session::WaveformSession;
