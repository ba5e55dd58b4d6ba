use super::Coroutine;
use std::pin::Pin;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum State {
    /// never resumed.
    Created,
    Suspended,
    Running,
    Done,
    Destroyed,
}

pub(crate) trait RawFrame {
    /// Polls the body once. Returns the coroutine the body nominated to run
    /// next, which the caller is expected to resume.
    ///
    /// # Panics
    /// If the frame is running, finished or destroyed. Panics escaping the body
    /// are propagated after the frame has been marked as finished.
    fn step(self: Pin<&Self>, this: &Coroutine) -> Option<Coroutine>;
    /// Drops the body and tears down the promise. Destroying a running frame
    /// is deferred until its current step returns. Destroying a frame twice
    /// does nothing.
    fn destroy(self: Pin<&Self>);

    fn state(&self) -> State;
}
