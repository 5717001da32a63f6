//! Dedicated worker threads that execute submitted closures strictly in
//! submission order and report each result through a future-style
//! completion handle.
//!
//! [`ActiveWorker`] owns a single thread and a FIFO queue: every call to
//! [`submit`](ActiveWorker::submit) enqueues one closure and returns a
//! [`TaskHandle`] that resolves to the closure's return value once the
//! worker has run it. For throughput across several such threads,
//! [`WorkerPool`] fans submissions out over a fixed set of workers in
//! round-robin order, keeping the per-worker FIFO guarantee.
//!
//! A panic inside a task is caught on the worker thread and surfaces as
//! [`TaskError::Panicked`] when the handle is read; the worker itself keeps
//! running. Stopping a worker discards whatever is still queued, and each
//! discarded task resolves its handle to [`TaskError::Abandoned`].
//!
//! # Example
//! ```
//! use active_worker::ActiveWorker;
//!
//! async fn example() -> u64 {
//!     // The worker starts its thread immediately.
//!     let worker = ActiveWorker::spawn().expect("failed to spawn worker");
//!
//!     // Arguments are captured by value at submission time.
//!     let doubled = worker.submit(|| 21u64 * 2);
//!
//!     doubled.await.expect("worker executed the task")
//! }
//! ```
//!
//! Handles can also be read without an async runtime via
//! [`TaskHandle::wait`].

mod active_worker;
pub use active_worker::*;

mod builder;
pub use builder::*;

mod error;
pub use error::*;

mod handle;
pub use handle::*;

mod worker_pool;
pub use worker_pool::*;

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::warn;

use crate::error::panic_summary;
use crate::handle::Promise;

type BoxedTaskFn<R> = Box<dyn FnOnce() -> R + Send + 'static>;

/// One unit of deferred work: the submitted closure together with the write
/// half of its completion handle.
pub(crate) struct Task<R> {
    func: BoxedTaskFn<R>,
    promise: Promise<R>,
}

impl<R> Task<R> {
    fn new<F>(func: F) -> (Task<R>, TaskHandle<R>)
    where
        F: FnOnce() -> R + Send + 'static,
    {
        let (promise, handle) = Promise::new();
        (
            Task {
                func: Box::new(func),
                promise,
            },
            handle,
        )
    }

    /// Invokes the closure and fulfills the handle with its return value or
    /// with the panic it raised. Never unwinds into the worker loop.
    fn run(self) {
        let Task { func, promise } = self;
        match catch_unwind(AssertUnwindSafe(func)) {
            Ok(value) => promise.fulfill(Ok(value)),
            Err(payload) => {
                warn!("task panicked: {}", panic_summary(payload.as_ref()));
                promise.fulfill(Err(TaskError::Panicked(payload)));
            }
        }
    }
}
