use crate::error::Result;
use once_cell::sync::OnceCell;
use rayon::ThreadPoolBuilder;
use std::sync::Arc;
use tracing::debug;

static THREAD_POOL: OnceCell<Arc<rayon::ThreadPool>> = OnceCell::new();

/// Get the global worker pool, building it with `num_threads` workers on
/// first use. Later calls reuse the existing pool whatever size they ask for.
///
/// # Errors
///
/// Returns an error if the pool cannot be built.
pub fn get_thread_pool(num_threads: usize) -> Result<Arc<rayon::ThreadPool>> {
    THREAD_POOL
        .get_or_try_init(|| -> Result<Arc<rayon::ThreadPool>> {
            let pool = ThreadPoolBuilder::new()
                .num_threads(num_threads.max(1))
                .thread_name(|i| format!("hashcheck-worker-{i}"))
                .build()?;
            debug!(threads = num_threads, "Worker pool started");
            Ok(Arc::new(pool))
        })
        .cloned()
}

/// Run a function in the worker pool
///
/// # Errors
///
/// Returns an error if the pool cannot be built.
pub fn run_in_pool<F, R>(num_threads: usize, f: F) -> Result<R>
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    let pool = get_thread_pool(num_threads)?;
    Ok(pool.install(f))
}

/// Number of threads the platform suggests for parallel work.
#[must_use]
pub fn available_threads() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_in_pool_returns_value() -> anyhow::Result<()> {
        let value = run_in_pool(2, || 40 + 2)?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_available_threads_is_positive() {
        assert!(available_threads() >= 1);
    }
}
