use std::any::Any;
use std::cell::Cell;
use std::panic::resume_unwind;

/// What a promise does with a panic that escapes the coroutine body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExceptionBehavior {
    /// The panic is dropped. Only appropriate when the body is known not to
    /// panic.
    Ignore,
    /// The panic is stored and replayed to whoever retrieves the result. This
    /// is the right choice whenever the coroutine may finish before anybody
    /// observes it, which is the case for every asynchronous configuration.
    Defer,
    /// The panic keeps unwinding out of the `resume()` call that was running
    /// the body.
    Rethrow,
}

/// A panic captured from a coroutine body.
#[derive(thiserror::Error, Debug)]
#[error("coroutine body panicked: {message}")]
pub struct Failure {
    message: String,
    payload: Box<dyn Any + Send>,
}

impl Failure {
    pub(crate) fn new(payload: Box<dyn Any + Send>) -> Failure {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            String::from("Box<dyn Any>")
        };
        Failure { message, payload }
    }

    /// The panic message, when the payload was a string.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the original panic payload.
    #[must_use]
    pub fn into_panic(self) -> Box<dyn Any + Send> {
        self.payload
    }

    /// Resumes unwinding with the original payload.
    pub fn resume(self) -> ! {
        resume_unwind(self.payload)
    }
}

/// Holds at most one deferred failure.
///
/// Taking the failure clears it, so a failure is replayed at most once.
#[derive(Default)]
pub(crate) struct ExceptionState {
    failure: Cell<Option<Failure>>,
}

impl ExceptionState {
    pub fn store(&self, failure: Failure) {
        self.failure.set(Some(failure));
    }

    pub fn take(&self) -> Option<Failure> {
        self.failure.take()
    }

    pub fn has_failure(&self) -> bool {
        let failure = self.failure.take();
        let present = failure.is_some();
        self.failure.set(failure);
        present
    }
}

#[cfg(test)]
mod tests {
    use super::{ExceptionState, Failure};
    use std::panic::{catch_unwind, panic_any, AssertUnwindSafe};

    #[test]
    fn failure_keeps_message() {
        let payload = catch_unwind(|| panic!("boom {}", 7)).unwrap_err();
        let failure = Failure::new(payload);
        assert_eq!(failure.message(), "boom 7");
        assert_eq!(failure.to_string(), "coroutine body panicked: boom 7");
    }

    #[test]
    fn failure_replays_payload() {
        let payload = catch_unwind(|| panic_any(42_u32)).unwrap_err();
        let failure = Failure::new(payload);
        let replayed = catch_unwind(AssertUnwindSafe(move || failure.resume())).unwrap_err();
        assert_eq!(replayed.downcast_ref::<u32>(), Some(&42));
    }

    #[test]
    fn state_is_cleared_by_take() {
        let state = ExceptionState::default();
        assert!(!state.has_failure());
        state.store(Failure::new(Box::new("first")));
        assert!(state.has_failure());
        assert_eq!(state.take().unwrap().message(), "first");
        assert!(state.take().is_none());
    }
}
