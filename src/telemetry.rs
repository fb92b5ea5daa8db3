//! Opt-in tracing setup for hosts embedding `trc-view`.
//!
//! Fetch and reduction events are emitted under the `trc_view` target.
//! Hosts either call one of the helpers below or install their own
//! `tracing` subscriber.

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "trc_view=info";

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG` or
/// [`DEFAULT_FILTER`].
///
/// Returns `false` when the `telemetry` feature is disabled or a global
/// subscriber is already set.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with_filter(DEFAULT_FILTER)
}

/// Same as [`init_default_tracing`] with a caller-provided fallback filter,
/// e.g. `"trc_view=trace"` to see every chunk hit and miss.
#[must_use]
pub fn init_tracing_with_filter(fallback: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback;
        false
    }
}
