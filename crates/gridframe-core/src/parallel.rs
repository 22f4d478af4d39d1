//! Parallel execution settings and row partitioning
//!
//! Settings travel with each call; there is no process-wide threshold.
//! Work runs on Rayon, either on the global pool or on a dedicated pool
//! when a thread count is fixed.

use serde::{Deserialize, Serialize};

use crate::error::{DataError, DataResult};

/// Default threshold for parallel execution (10,000 rows)
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10_000;

/// Configuration for operations that may fan out across threads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Minimum rows to trigger parallelization
    pub threshold: usize,
    /// Number of workers (None = use Rayon default). `Some(1)` runs serially
    /// and gives reproducible results.
    pub num_threads: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_PARALLEL_THRESHOLD,
            num_threads: None,
        }
    }
}

impl ParallelConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration that never leaves the calling thread
    #[must_use]
    pub fn serial() -> Self {
        Self {
            threshold: usize::MAX,
            num_threads: Some(1),
        }
    }

    /// Set the parallelization threshold
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the number of threads
    #[must_use]
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Check if the given row count should trigger parallel execution
    #[must_use]
    pub fn should_parallelize(&self, num_rows: usize) -> bool {
        num_rows > self.threshold && self.num_threads != Some(1)
    }

    /// Number of partitions for `num_rows` rows; never more than the rows
    #[must_use]
    pub fn worker_count(&self, num_rows: usize) -> usize {
        if !self.should_parallelize(num_rows) {
            return 1;
        }
        self.num_threads
            .unwrap_or_else(rayon::current_num_threads)
            .clamp(1, num_rows.max(1))
    }

    /// Run `op` on a pool sized by `num_threads`, or on the global pool
    ///
    /// # Errors
    /// Returns `InvalidOperation` if a dedicated pool cannot be built
    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> DataResult<R> {
        match self.num_threads {
            Some(threads) if threads > 1 => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| DataError::InvalidOperation(format!("thread pool: {e}")))?;
                Ok(pool.install(op))
            }
            _ => Ok(op()),
        }
    }
}

/// Split `[start, end]` into `workers` contiguous, near-equal partitions
///
/// Partitions are inclusive `(first, last)` pairs in row order; the last
/// one absorbs the remainder.
#[must_use]
pub fn partitions(start: usize, end: usize, workers: usize) -> Vec<(usize, usize)> {
    let len = end - start + 1;
    let workers = workers.clamp(1, len);
    let size = len / workers;

    (0..workers)
        .map(|i| {
            let first = start + i * size;
            let last = if i + 1 == workers {
                end
            } else {
                first + size - 1
            };
            (first, last)
        })
        .collect()
}
