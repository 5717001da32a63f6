use crate::active_worker::ActiveWorker;
use crate::error::SpawnError;
use crate::worker_pool::WorkerPool;

pub(crate) const DEFAULT_THREAD_NAME: &str = "active-worker";

/// Configures how worker threads are spawned.
///
/// Every option has a default, so `Builder::new().spawn()` is equivalent to
/// [`ActiveWorker::spawn`]. Options set here apply to the worker's thread;
/// for pools the configured name becomes a prefix and each worker thread is
/// named `{prefix}-{index}`.
///
/// # Example
/// ```
/// use active_worker::Builder;
///
/// let worker = Builder::new()
///     .name("io-worker")
///     .stack_size(512 * 1024)
///     .spawn::<u32>()
///     .expect("failed to spawn worker");
/// # drop(worker);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Builder {
    pub(crate) name: Option<String>,
    pub(crate) stack_size: Option<usize>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Names the worker thread. Defaults to `active-worker`.
    pub fn name(mut self, name: impl Into<String>) -> Builder {
        self.name = Some(name.into());
        self
    }

    /// Sets the stack size of the worker thread in bytes. Defaults to the
    /// platform's standard thread stack size.
    pub fn stack_size(mut self, stack_size: usize) -> Builder {
        self.stack_size = Some(stack_size);
        self
    }

    /// Spawns a single worker with this configuration.
    pub fn spawn<R: Send + 'static>(self) -> Result<ActiveWorker<R>, SpawnError> {
        ActiveWorker::spawn_with(&self)
    }

    /// Spawns a pool of `worker_count` workers with this configuration.
    pub fn spawn_pool<R: Send + 'static>(
        self,
        worker_count: usize,
    ) -> Result<WorkerPool<R>, SpawnError> {
        WorkerPool::spawn_with(&self, worker_count)
    }

    pub(crate) fn thread_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| DEFAULT_THREAD_NAME.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current_thread_name() -> Option<String> {
        std::thread::current().name().map(String::from)
    }

    #[test]
    fn workers_use_the_configured_thread_name() {
        let worker = Builder::new()
            .name("io-worker")
            .spawn()
            .expect("failed to spawn worker");

        let name = worker.submit(current_thread_name);
        assert_eq!(name.wait().unwrap().as_deref(), Some("io-worker"));
    }

    #[test]
    fn unnamed_workers_fall_back_to_the_default_name() {
        let worker = ActiveWorker::spawn().expect("failed to spawn worker");

        let name = worker.submit(current_thread_name);
        assert_eq!(name.wait().unwrap().as_deref(), Some(DEFAULT_THREAD_NAME));
    }

    #[test]
    fn pool_threads_are_named_by_prefix_and_index() {
        let pool = Builder::new()
            .name("net")
            .spawn_pool(2)
            .expect("failed to spawn pool");

        // Round-robin dispatch lands consecutive submissions on consecutive
        // workers.
        let first = pool.submit(current_thread_name);
        let second = pool.submit(current_thread_name);

        let mut names = vec![first.wait().unwrap(), second.wait().unwrap()];
        names.sort();
        assert_eq!(
            names,
            vec![Some("net-0".to_string()), Some("net-1".to_string())]
        );
    }

    #[test]
    fn a_custom_stack_size_still_runs_tasks() {
        let worker = Builder::new()
            .stack_size(256 * 1024)
            .spawn()
            .expect("failed to spawn worker");

        let result = worker.submit(|| 7 * 6);
        assert_eq!(result.wait().unwrap(), 42);
    }
}
