//! Worker pool selection

use csmap_core::{Error, Result};

/// How chunk computations are spread over threads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// One worker thread
    Sequential,
    /// One worker per available core
    #[default]
    Parallel,
    /// Parallel with a fixed number of workers
    ParallelWith(usize),
}

impl ProcessingMode {
    /// Map a `--workers` style count: none or 0 means all cores, 1 means sequential.
    pub fn from_workers(workers: Option<usize>) -> Self {
        match workers {
            None | Some(0) => ProcessingMode::Parallel,
            Some(1) => ProcessingMode::Sequential,
            Some(n) => ProcessingMode::ParallelWith(n),
        }
    }

    /// Number of worker threads this mode runs
    pub fn workers(&self) -> usize {
        match self {
            ProcessingMode::Sequential => 1,
            ProcessingMode::Parallel => num_cpus(),
            ProcessingMode::ParallelWith(n) => (*n).max(1),
        }
    }

    /// Dedicated pool for one run
    pub fn build_pool(&self) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers())
            .thread_name(|i| format!("csmap-worker-{}", i))
            .build()
            .map_err(|e| Error::Other(format!("failed to build thread pool: {}", e)))
    }
}

/// Get the number of available CPU cores
pub fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
