use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{ViewError, ViewResult};

/// Monotonic counter of detail-request generations.
///
/// Each new request takes a [`RenderTicket`]; issuing a newer ticket (or
/// invalidating the counter) makes every older ticket stale.
#[derive(Debug, Clone, Default)]
pub struct RequestGenerations {
    latest: Arc<AtomicU64>,
}

impl RequestGenerations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RenderTicket {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        RenderTicket {
            generation,
            latest: Arc::clone(&self.latest),
        }
    }

    /// Supersedes all outstanding tickets without issuing a new one.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
    }

    #[must_use]
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }
}

/// Handle identifying one detail request generation.
#[derive(Debug, Clone)]
pub struct RenderTicket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl RenderTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.generation
    }

    /// Fails with `Superseded` once a newer generation exists.
    pub fn ensure_current(&self) -> ViewResult<()> {
        let latest = self.latest.load(Ordering::Acquire);
        if latest == self.generation {
            Ok(())
        } else {
            Err(ViewError::Superseded {
                generation: self.generation,
                latest,
            })
        }
    }
}
