//! Rayon thread pool configuration for matchup batches.
//!
//! Use [WorkerPool::install] to run a batch with a fixed number of threads,
//! or rely on Rayon's default (all CPU cores).

use rayon::{ThreadPoolBuildError, ThreadPoolBuilder};

/// How many worker threads a batch may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use the global Rayon pool.
    pub workers: usize,
}

impl WorkerPool {
    pub fn with_workers(workers: usize) -> Self {
        Self { workers }
    }

    /// Run `f` on a pool of [workers](WorkerPool::workers) threads. With 0 workers `f` runs
    /// directly and its parallel iterators use the global pool.
    pub fn install<F, R>(&self, f: F) -> Result<R, ThreadPoolBuildError>
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return Ok(f());
        }
        let pool = ThreadPoolBuilder::new().num_threads(self.workers).build()?;
        Ok(pool.install(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_uses_requested_thread_count() {
        let threads = WorkerPool::with_workers(2)
            .install(rayon::current_num_threads)
            .expect("pool should build");
        assert_eq!(threads, 2);
    }

    #[test]
    fn default_pool_runs_inline() {
        let value = WorkerPool::default().install(|| 41 + 1).expect("no pool needed");
        assert_eq!(value, 42);
    }
}
