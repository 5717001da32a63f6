use std::sync::atomic::{AtomicUsize, Ordering};

use crate::active_worker::ActiveWorker;
use crate::builder::Builder;
use crate::error::SpawnError;
use crate::handle::TaskHandle;

/// A fixed set of [`ActiveWorker`]s behind a single submission point.
///
/// Tasks are assigned to workers in round-robin order: consecutive
/// submissions land on consecutive workers, wrapping around at the end of
/// the set. Two tasks that land on the same worker keep their relative
/// submission order; tasks on different workers may run concurrently and
/// have no ordering between them.
pub struct WorkerPool<R> {
    workers: Vec<ActiveWorker<R>>,
    next_worker: AtomicUsize,
}

impl<R: Send + 'static> WorkerPool<R> {
    /// Spawns a pool of `worker_count` workers, each with its own thread and
    /// queue.
    ///
    /// Worker threads are named `active-worker-0` through
    /// `active-worker-{N-1}`; use [`Builder::spawn_pool`] for a different
    /// prefix.
    pub fn spawn(worker_count: usize) -> Result<WorkerPool<R>, SpawnError> {
        Builder::new().spawn_pool(worker_count)
    }

    /// Spawns one worker per logical CPU core.
    pub fn spawn_per_core() -> Result<WorkerPool<R>, SpawnError> {
        WorkerPool::spawn(num_cpus::get())
    }

    pub(crate) fn spawn_with(
        builder: &Builder,
        worker_count: usize,
    ) -> Result<WorkerPool<R>, SpawnError> {
        if worker_count == 0 {
            return Err(SpawnError::EmptyPool);
        }

        let prefix = builder.thread_name();
        let workers = (0..worker_count)
            .map(|index| {
                let worker = builder.clone().name(format!("{}-{}", prefix, index));
                ActiveWorker::spawn_with(&worker)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WorkerPool {
            workers,
            next_worker: AtomicUsize::new(0),
        })
    }

    /// Submits `func` to the next worker in round-robin order.
    pub fn submit<F>(&self, func: F) -> TaskHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
    {
        let index = self.next_worker.fetch_add(1, Ordering::Relaxed) % self.workers.len();
        self.workers[index].submit(func)
    }
}

impl<R> WorkerPool<R> {
    /// Stops every worker in the pool.
    ///
    /// Per worker, the same semantics as [`ActiveWorker::stop`] apply: the
    /// in-flight task finishes, queued tasks are discarded.
    pub fn stop(&self) {
        for worker in &self.workers {
            worker.stop();
        }
    }

    /// Number of workers in the pool.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl<R> Drop for WorkerPool<R> {
    fn drop(&mut self) {
        // Flip every worker's flag up front so the vector joins threads that
        // are already winding down, instead of stopping them one by one.
        self.stop();
    }
}
