//! Search limits and cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Limits applied to every search run through a [`SearchSpace`].
///
/// [`SearchSpace`]: crate::SearchSpace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PlannerConfig {
    /// Maximum number of cells A* may expand per call. `None` means no cap.
    pub max_expansions: Option<usize>,
    /// Maximum number of backward-chaining steps. `None` uses the number of
    /// cells in the grid.
    pub max_chain_steps: Option<usize>,
}

impl PlannerConfig {
    /// Set the expansion cap (builder).
    pub fn with_max_expansions(mut self, n: usize) -> Self {
        self.max_expansions = Some(n);
        self
    }

    /// Set the chaining step cap (builder).
    pub fn with_max_chain_steps(mut self, n: usize) -> Self {
        self.max_chain_steps = Some(n);
        self
    }
}

/// Shared flag a caller raises to stop an in-flight search.
///
/// The search checks it between queue pops, so it may be raised from
/// another thread while the planner runs on a worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clear a previous request so the token can be reused.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}
