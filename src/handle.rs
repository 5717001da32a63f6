use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Condvar, Mutex};
use std::task::{Context, Poll, Waker};

use crate::error::TaskError;

struct State<T> {
    outcome: Option<Result<T, TaskError>>,
    waker: Option<Waker>,
    fulfilled: bool,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    done: Condvar,
}

impl<T> Shared<T> {
    fn fulfill(&self, outcome: Result<T, TaskError>) {
        let waker;
        {
            let mut state = self.state.lock().unwrap();
            state.outcome = Some(outcome);
            state.fulfilled = true;
            waker = state.waker.take();
        }
        // Notify and wake only after the lock has been released.
        self.done.notify_all();
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

/// Write-once half of a completion handle, held by the worker inside the
/// task. Dropping it unfulfilled resolves the handle to
/// [`TaskError::Abandoned`], so a discarded task never leaves its caller
/// blocked on a handle that will not resolve.
pub(crate) struct Promise<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> Promise<T> {
    pub(crate) fn new() -> (Promise<T>, TaskHandle<T>) {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                outcome: None,
                waker: None,
                fulfilled: false,
            }),
            done: Condvar::new(),
        });
        let handle = TaskHandle {
            shared: Arc::clone(&shared),
        };
        (Promise { shared: Some(shared) }, handle)
    }

    pub(crate) fn fulfill(mut self, outcome: Result<T, TaskError>) {
        if let Some(shared) = self.shared.take() {
            shared.fulfill(outcome);
        }
    }
}

impl<T> Drop for Promise<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.fulfill(Err(TaskError::Abandoned));
        }
    }
}

/// Completion handle for one submitted task.
///
/// Resolves to the closure's return value, to [`TaskError::Panicked`] if the
/// closure panicked, or to [`TaskError::Abandoned`] if the worker stopped
/// before reaching the task. The result can be read by awaiting the handle
/// (it is a [`Future`]) or by blocking on [`wait`](TaskHandle::wait); either
/// read moves the value out, so a handle is consumed by its first successful
/// read.
pub struct TaskHandle<T> {
    shared: Arc<Shared<T>>,
}

impl<T> TaskHandle<T> {
    /// Blocks the calling thread until the task resolves, then returns its
    /// outcome.
    pub fn wait(self) -> Result<T, TaskError> {
        let mut state = self.shared.state.lock().unwrap();
        loop {
            if let Some(outcome) = state.outcome.take() {
                return outcome;
            }
            state = self.shared.done.wait(state).unwrap();
        }
    }

    /// Whether the task has already resolved. Unlike the reads this never
    /// blocks and never consumes the outcome.
    pub fn is_finished(&self) -> bool {
        self.shared.state.lock().unwrap().fulfilled
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, TaskError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.shared.state.lock().unwrap();

        if let Some(outcome) = state.outcome.take() {
            Poll::Ready(outcome)
        } else {
            state.waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn resolves_when_fulfilled_before_the_first_poll() {
        let (promise, handle) = Promise::new();
        promise.fulfill(Ok(7));
        assert!(handle.is_finished());
        assert_eq!(futures::executor::block_on(handle).unwrap(), 7);
    }

    #[test]
    fn resolves_when_fulfilled_after_the_first_poll() {
        let (promise, handle) = Promise::new();
        let fulfiller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            promise.fulfill(Ok("late"));
        });
        assert_eq!(futures::executor::block_on(handle).unwrap(), "late");
        fulfiller.join().unwrap();
    }

    #[test]
    fn wait_blocks_until_fulfilled() {
        let (promise, handle) = Promise::new();
        let fulfiller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            promise.fulfill(Ok(3));
        });
        assert_eq!(handle.wait().unwrap(), 3);
        fulfiller.join().unwrap();
    }

    #[test]
    fn dropping_the_promise_abandons_the_handle() {
        let (promise, handle) = Promise::<u32>::new();
        assert!(!handle.is_finished());
        drop(promise);
        assert!(handle.is_finished());
        assert!(handle.wait().unwrap_err().is_abandoned());
    }
}
