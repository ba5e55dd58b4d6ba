use crate::coroutine::Coroutine;
use log::{debug, warn};
use std::cell::RefCell;

/// The coroutine waiting on a promise, if any.
///
/// A promise has at most one waiter. The waiter is handed back exactly once,
/// when the event it waits for happens, or destroyed along with the promise if
/// that never happens.
#[derive(Default)]
pub(crate) struct ContinuationRegistry {
    continuation: RefCell<Option<Coroutine>>,
}

impl ContinuationRegistry {
    /// # Panics
    /// If a continuation is already registered.
    #[track_caller]
    pub fn register(&self, continuation: Coroutine) {
        let mut slot = self.continuation.borrow_mut();
        assert!(
            slot.is_none(),
            "a coroutine can only be awaited by one coroutine at a time."
        );
        debug!("registered continuation {continuation:?}");
        *slot = Some(continuation);
    }

    /// Clears the registry and returns the continuation that was waiting.
    pub fn take(&self) -> Option<Coroutine> {
        self.continuation.borrow_mut().take()
    }

    pub fn is_registered(&self) -> bool {
        self.continuation.borrow().is_some()
    }

    /// Destroys the waiting continuation. It can never be resumed once the
    /// coroutine it waits on is gone.
    pub fn destroy(&self) {
        if let Some(continuation) = self.take() {
            if !continuation.is_noop() {
                warn!("destroyed {continuation:?} because the coroutine it was waiting on was torn down.");
            }
            continuation.destroy();
        }
    }
}
