pub mod conversion;
pub mod metadata;
pub mod overview;
pub mod time_units;
pub mod types;
pub mod windowing;

pub use conversion::{SampleConversion, VoltageConversion};
pub use metadata::{CalibrationRow, DatasetMetadata};
pub use overview::{
    MinMaxOverview, OVERVIEW_TARGET_POINTS, OverviewAccumulator, compute_overview,
    overview_downsampling_factor, project_overview,
};
pub use time_units::{
    NANOSECOND_THRESHOLD_S, TimeUnit, ZoomLevel, format_time, generate_zoom_levels,
    generate_zoom_levels_with_labels,
};
pub use types::{
    ArrayShape, ChunkKey, DetailSeries, EnvelopePoint, RawPoint, SampleRangeRequest,
    SeriesSelection, value_extent,
};
pub use windowing::{SampleWindow, resolve_sample_window};
