//! Parallelism configuration for roster scoring and category aggregation.
//!
//! Scoring each student and aggregating each category are independent, so
//! both can run on rayon's thread pool. Results never depend on the path
//! taken; sequential execution is the reference behavior.

use serde::{Deserialize, Serialize};

/// Default value for parallel processing enabled
fn default_enabled() -> bool {
    true
}

/// Default roster size from which parallel processing pays off
fn default_min_items() -> usize {
    64
}

/// Configuration for parallel processing operations.
///
/// # Example
///
/// ```rust
/// use graderight::config::ParallelConfig;
///
/// let config = ParallelConfig {
///     enabled: true,
///     min_items_for_parallel: 200,
/// };
/// assert!(!config.should_parallelize(40));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParallelConfig {
    /// Enable parallel processing (default: true)
    ///
    /// When disabled, everything is processed sequentially.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Smallest number of students or categories processed in parallel (default: 64)
    #[serde(default = "default_min_items")]
    pub min_items_for_parallel: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            min_items_for_parallel: default_min_items(),
        }
    }
}

impl ParallelConfig {
    /// Create a new parallel config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config with parallel processing disabled.
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Whether a batch of `item_count` items should go to the thread pool.
    pub fn should_parallelize(&self, item_count: usize) -> bool {
        self.enabled && item_count >= self.min_items_for_parallel
    }
}
