use std::any::Any;
use std::fmt;

/// Error produced when constructing a worker or a pool.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    /// The operating system could not create the worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Io(#[from] std::io::Error),

    /// A pool was asked for zero workers.
    #[error("worker pool requires at least one worker")]
    EmptyPool,
}

/// Error carried by a [`TaskHandle`](crate::TaskHandle) whose task produced
/// no value.
#[derive(thiserror::Error)]
pub enum TaskError {
    /// The task panicked on the worker thread. Carries the panic payload so
    /// the caller can re-raise it with [`std::panic::resume_unwind`].
    #[error("task panicked: {}", panic_summary(.0.as_ref()))]
    Panicked(Box<dyn Any + Send + 'static>),

    /// The worker stopped before reaching the task, so it was discarded
    /// without running.
    #[error("task abandoned: worker stopped before executing it")]
    Abandoned,
}

impl TaskError {
    /// Returns `true` if the task panicked while executing.
    pub fn is_panic(&self) -> bool {
        matches!(self, TaskError::Panicked(_))
    }

    /// Returns `true` if the task was discarded by a stopping worker.
    pub fn is_abandoned(&self) -> bool {
        matches!(self, TaskError::Abandoned)
    }

    /// The panic message, when the task panicked with a `&str` or `String`
    /// payload (as `panic!` produces).
    pub fn panic_message(&self) -> Option<&str> {
        match self {
            TaskError::Panicked(payload) => payload_str(payload.as_ref()),
            TaskError::Abandoned => None,
        }
    }

    /// Consumes the error, returning the panic payload.
    ///
    /// # Panics
    ///
    /// Panics if the error is not [`TaskError::Panicked`]. Use
    /// [`try_into_panic`](Self::try_into_panic) to keep the error instead.
    pub fn into_panic(self) -> Box<dyn Any + Send + 'static> {
        match self.try_into_panic() {
            Ok(payload) => payload,
            Err(_) => panic!("into_panic called on a non-panic TaskError"),
        }
    }

    /// Consumes the error, returning the panic payload if there is one.
    pub fn try_into_panic(self) -> Result<Box<dyn Any + Send + 'static>, Self> {
        match self {
            TaskError::Panicked(payload) => Ok(payload),
            other => Err(other),
        }
    }
}

// The payload is `dyn Any`, so Debug has to be written by hand.
impl fmt::Debug for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::Panicked(payload) => f
                .debug_tuple("Panicked")
                .field(&panic_summary(payload.as_ref()))
                .finish(),
            TaskError::Abandoned => f.write_str("Abandoned"),
        }
    }
}

fn payload_str(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

pub(crate) fn panic_summary(payload: &(dyn Any + Send)) -> &str {
    payload_str(payload).unwrap_or("unknown panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        let from_str = TaskError::Panicked(Box::new("literal"));
        assert_eq!(from_str.panic_message(), Some("literal"));

        let from_string = TaskError::Panicked(Box::new(String::from("formatted")));
        assert_eq!(from_string.panic_message(), Some("formatted"));

        let opaque = TaskError::Panicked(Box::new(42u32));
        assert_eq!(opaque.panic_message(), None);
        assert_eq!(opaque.to_string(), "task panicked: unknown panic payload");
    }

    #[test]
    fn abandoned_has_no_payload() {
        let err = TaskError::Abandoned;
        assert!(err.is_abandoned());
        assert!(!err.is_panic());
        assert_eq!(err.panic_message(), None);
        assert!(err.try_into_panic().is_err());
    }

    #[test]
    fn panic_payload_round_trips() {
        let err = TaskError::Panicked(Box::new("boom"));
        assert!(err.is_panic());
        let payload = err.into_panic();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
    }
}
