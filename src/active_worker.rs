use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::select;
use tracing::debug;

use crate::builder::Builder;
use crate::error::SpawnError;
use crate::handle::TaskHandle;
use crate::Task;

/// A dedicated worker thread that executes submitted closures one at a time,
/// strictly in submission order.
///
/// The thread starts as soon as the worker is spawned and runs until
/// [`stop`](ActiveWorker::stop) is called or the worker is dropped. Dropping
/// the worker also joins the thread, so no execution outlives the value.
///
/// A worker is generic over the task return type `R`; any closure returning
/// `R` can be submitted regardless of what it captures.
pub struct ActiveWorker<R> {
    task_tx: Sender<Task<R>>,
    stop_tx: Sender<()>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl<R: Send + 'static> ActiveWorker<R> {
    /// Spawns a worker with the default configuration.
    ///
    /// Use [`Builder`] to set a thread name or stack size instead.
    pub fn spawn() -> Result<ActiveWorker<R>, SpawnError> {
        Builder::new().spawn()
    }

    pub(crate) fn spawn_with(builder: &Builder) -> Result<ActiveWorker<R>, SpawnError> {
        let (task_tx, task_rx) = channel::unbounded();
        let (stop_tx, stop_rx) = channel::bounded(1);
        let running = Arc::new(AtomicBool::new(true));

        let mut thread = thread::Builder::new().name(builder.thread_name());
        if let Some(stack_size) = builder.stack_size {
            thread = thread.stack_size(stack_size);
        }
        let flag = Arc::clone(&running);
        let thread = thread.spawn(move || worker_loop(task_rx, stop_rx, flag))?;

        Ok(ActiveWorker {
            task_tx,
            stop_tx,
            running,
            thread: Some(thread),
        })
    }

    /// Enqueues `func` and returns the handle that will carry its result.
    ///
    /// The call never blocks beyond the queue insertion. Arguments are
    /// whatever the closure captured, fixed at this point; tasks submitted
    /// earlier to this worker all execute before `func` does.
    ///
    /// If the worker has already stopped, the task is discarded and the
    /// handle resolves to [`TaskError::Abandoned`](crate::TaskError).
    pub fn submit<F>(&self, func: F) -> TaskHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
    {
        let (task, handle) = Task::new(func);
        if let Err(rejected) = self.task_tx.send(task) {
            // The worker already shut down; dropping the task abandons
            // its handle.
            drop(rejected.into_inner());
        }
        handle
    }
}

impl<R> ActiveWorker<R> {
    /// Stops the worker without draining the queue.
    ///
    /// The currently executing task (if any) runs to completion; every task
    /// still queued is discarded and its handle resolves to
    /// [`TaskError::Abandoned`](crate::TaskError). Callers that need queued
    /// work to finish must await the handles before stopping. Calling `stop`
    /// on an already-stopped worker has no further effect.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
        // Full or disconnected both mean the thread no longer needs the
        // signal.
        let _ = self.stop_tx.try_send(());
    }

    /// Returns whether the worker still accepts tasks.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Number of tasks currently queued, not counting one in execution.
    ///
    /// Advisory only: concurrent submitters and the worker itself change the
    /// depth at any time.
    pub fn queue_depth(&self) -> usize {
        self.task_tx.len()
    }
}

impl<R> Drop for ActiveWorker<R> {
    fn drop(&mut self) {
        self.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn worker_loop<R>(tasks: Receiver<Task<R>>, stop: Receiver<()>, running: Arc<AtomicBool>) {
    debug!("worker thread started");
    while running.load(Ordering::Acquire) {
        select! {
            recv(tasks) -> task => match task {
                Ok(task) => {
                    // The flag may have flipped while this task was handed
                    // over; discard instead of executing.
                    if !running.load(Ordering::Acquire) {
                        break;
                    }
                    task.run();
                }
                Err(_) => break,
            },
            recv(stop) -> _ => break,
        }
    }
    // Dropping the receiver abandons whatever is still queued.
    debug!(discarded = tasks.len(), "worker thread stopped");
}
