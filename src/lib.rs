//! trc-view: chunked range fetching and adaptive decimation for waveform viewers.
//!
//! The crate sits between a chunked `(channel, trace, segment, sample)` array
//! store and a chart front-end. It assembles sample ranges from storage chunks
//! through a small cache and reduces visible windows to either raw points or
//! min/max envelopes bounded by a point budget.

pub mod api;
pub mod core;
pub mod error;
pub mod store;
pub mod telemetry;

pub use api::{AdaptiveSeriesReducer, RangeSliceFetcher, SessionConfig, WaveformSession};
pub use error::{StoreError, ViewError, ViewResult};
