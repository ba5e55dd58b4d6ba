//! The suspend/resume primitive every handle type is built on.
//!
//! A coroutine frame owns a body future and the promise that goes with it.
//! Resuming a frame polls its body once with a waker that does nothing: a body
//! that returns `Poll::Pending` is suspended, and it only runs again when
//! somebody holding its [`Coroutine`] token resumes it. While a body is being
//! polled it may nominate one other coroutine to run as soon as it has
//! suspended, which is how control is handed from a finished coroutine back to
//! the one awaiting it.
use crate::promise::RawPromise;
use frame::Frame;
use log::trace;
use raw_frame::{RawFrame, State};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

pub(crate) use globals::{current, transfer};

mod frame;
mod globals;
mod raw_frame;

/// An opaque token for a coroutine frame.
///
/// Tokens are cheap to clone and do not own the frame's lifetime, in the sense
/// that any holder may [`destroy`](Coroutine::destroy) it. The frame's memory is
/// released once the last token goes away.
#[derive(Clone)]
pub struct Coroutine {
    frame: Option<Pin<Rc<dyn RawFrame>>>,
}

impl Coroutine {
    pub(crate) fn new<F>(body: F, promise: Rc<dyn RawPromise>) -> Coroutine
    where
        F: Future<Output = ()> + 'static,
    {
        let frame: Pin<Rc<dyn RawFrame>> = Rc::pin(Frame::new(body, promise));
        Coroutine { frame: Some(frame) }
    }

    /// A token that refers to no frame. Resuming or destroying it does nothing.
    #[must_use]
    pub const fn noop() -> Coroutine {
        Coroutine { frame: None }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.frame.is_none()
    }

    /// Resumes the coroutine until it suspends, then keeps resuming whichever
    /// coroutine it handed control to, until one suspends back to its caller.
    ///
    /// # Panics
    /// Panics if the coroutine is running, finished or destroyed. If the body
    /// panics and its promise rethrows, the panic unwinds out of this call.
    #[track_caller]
    pub fn resume(&self) {
        let Some(frame) = &self.frame else { return };
        let mut next = frame.as_ref().step(self);
        while let Some(coroutine) = next {
            trace!("transferring control to {coroutine:?}");
            next = match &coroutine.frame {
                Some(frame) => frame.as_ref().step(&coroutine),
                None => None,
            };
        }
    }

    /// Tears the frame down: the body is dropped and any coroutine still
    /// waiting on it is destroyed as well. A coroutine that is running is torn
    /// down as soon as it suspends.
    pub fn destroy(&self) {
        if let Some(frame) = &self.frame {
            frame.as_ref().destroy();
        }
    }

    /// Returns `true` once the body has finished or the frame was destroyed.
    /// The no-op coroutine is never done.
    #[must_use]
    pub fn done(&self) -> bool {
        matches!(self.state(), Some(State::Done | State::Destroyed))
    }

    /// Returns `true` once the coroutine has been resumed at least once.
    pub(crate) fn started(&self) -> bool {
        !matches!(self.state(), Some(State::Created))
    }

    /// Returns `true` if both tokens refer to the same frame.
    #[must_use]
    pub fn ptr_eq(&self, other: &Coroutine) -> bool {
        match (&self.frame, &other.frame) {
            (Some(a), Some(b)) => std::ptr::eq(addr(a), addr(b)),
            (None, None) => true,
            _ => false,
        }
    }

    fn state(&self) -> Option<State> {
        self.frame.as_ref().map(|frame| frame.state())
    }
}

fn addr(frame: &Pin<Rc<dyn RawFrame>>) -> *const () {
    let frame: &dyn RawFrame = &**frame;
    (frame as *const dyn RawFrame).cast()
}

impl Default for Coroutine {
    fn default() -> Self {
        Coroutine::noop()
    }
}

impl fmt::Debug for Coroutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.frame {
            Some(frame) => f
                .debug_struct("Coroutine")
                .field("frame", &addr(frame))
                .field("state", &frame.state())
                .finish(),
            None => f.write_str("Coroutine::noop"),
        }
    }
}

/// Suspends the current coroutine unconditionally. Control goes back to
/// whoever resumed it, and the body continues from here on the next resume.
///
/// # Example
/// ```rust
/// use cotask::{suspend, Task};
///
/// let task = Task::new(async {
///     suspend().await;
///     1
/// });
/// task.resume();
/// assert!(!task.done());
/// task.resume();
/// assert!(task.done());
/// ```
pub fn suspend() -> Suspend {
    Suspend { suspended: false }
}

/// Future returned by [`suspend`].
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Suspend {
    suspended: bool,
}

impl Future for Suspend {
    type Output = ();
    fn poll(mut self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<()> {
        if self.suspended {
            return Poll::Ready(());
        }
        self.suspended = true;
        Poll::Pending
    }
}

/// Resolves to the token of the coroutine that awaits it.
///
/// # Panics
/// Panics if awaited from the outside of a coroutine.
pub async fn this_coroutine() -> Coroutine {
    std::future::poll_fn(|_| {
        let Some(coroutine) = current() else {
            panic!("called `this_coroutine()` from the outside of a coroutine.")
        };
        Poll::Ready(coroutine)
    })
    .await
}
