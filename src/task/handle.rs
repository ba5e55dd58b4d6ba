use crate::config::Config;
use crate::coroutine::{self, Coroutine};
use crate::promise::{Promise, PromiseBody};
use log::warn;
use std::future::Future;
use std::mem;
use std::rc::Rc;
use std::task::Poll;

/// The frame and promise owned by a handle. Every handle kind wraps an
/// `Option<Handle<T>>`, where `None` means it owns nothing.
pub(crate) struct Handle<T> {
    pub coroutine: Coroutine,
    pub promise: Rc<Promise<T>>,
}

impl<T: 'static> Handle<T> {
    /// Allocates the frame for `body` and runs it up to its first suspension
    /// unless the promise pauses at the start checkpoint.
    pub fn start<F>(promise: Rc<Promise<T>>, body: F, complete: fn(&Promise<T>, F::Output)) -> Self
    where
        F: Future + 'static,
    {
        let body = PromiseBody::new(body, promise.clone(), complete);
        let coroutine = Coroutine::new(body, promise.clone());
        if !promise.initial_suspend() {
            coroutine.resume();
        }
        Handle { coroutine, promise }
    }
}

impl<T> Handle<T> {
    pub fn config(&self) -> Config {
        self.promise.config()
    }

    /// Prepares the frame to be awaited by `continuation` and returns the
    /// coroutine to run next.
    ///
    /// # Panics
    /// If the frame already has a continuation, or it is an asynchronous
    /// generator that was started and is not suspended at a yield.
    #[track_caller]
    pub fn await_suspend(&self, continuation: Coroutine) -> Coroutine {
        let config = self.config();
        if self.coroutine.done() {
            if config.generator {
                warn!("discarded {continuation:?}, which awaited an exhausted generator.");
                continuation.destroy();
                return Coroutine::noop();
            }
            return continuation;
        }
        let started = self.coroutine.started();
        if config.is_async && config.generator && started {
            // resuming it anywhere but at a yield would complete the await it
            // is suspended on.
            assert!(
                self.promise.is_at_yield(),
                "awaited a generator that is suspended on something other than a yield."
            );
        }
        if self.promise.set_continuation(continuation.clone()) {
            // a task that already started is suspended on something else,
            // which will resume it.
            if config.generator || !started {
                return self.coroutine.clone();
            }
            return Coroutine::noop();
        }
        self.coroutine.resume();
        continuation
    }

    /// Runs the await protocol on behalf of a `poll` call. `ready` is the
    /// handle's readiness and `awaiting` is the state kept by the caller
    /// between polls. Resolves once the result can be retrieved.
    ///
    /// # Panics
    /// If the frame is asynchronous and the caller is not a coroutine.
    #[track_caller]
    pub fn poll_await(&self, awaiting: &mut bool, ready: bool) -> Poll<()> {
        if mem::take(awaiting) || ready {
            return Poll::Ready(());
        }
        let config = self.config();
        let continuation = match coroutine::current() {
            Some(current) => current,
            None if config.is_async => {
                panic!("awaited an asynchronous coroutine from the outside of a coroutine.")
            }
            None => Coroutine::noop(),
        };
        let next = self.await_suspend(continuation);
        if !config.is_async {
            return Poll::Ready(());
        }
        coroutine::transfer(next);
        *awaiting = true;
        Poll::Pending
    }
}

/// Implements the operations every handle kind shares, and
/// [`CoroutineHandle`](super::CoroutineHandle) on top of them. The type must
/// have a `handle: Option<Handle<_>>` field and a `from_handle` constructor.
macro_rules! handle_methods {
    ($name:ident < $($param:ident),* >, $what:literal) => {
        impl<$($param),*> $name<$($param),*>
        where
            Tr: CoroutineTraits,
        {
            /// Resumes the frame until its next suspension.
            ///
            /// # Panics
            #[doc = concat!("If the ", $what, " owns nothing, or its frame is running or finished.")]
            #[track_caller]
            pub fn resume(&self) {
                match &self.handle {
                    Some(handle) => handle.coroutine.resume(),
                    None => panic!(concat!("attempted to resume an empty ", $what, " handle.")),
                }
            }

            /// Returns `true` once the frame will run no further, or if the
            /// handle owns nothing.
            #[must_use]
            pub fn done(&self) -> bool {
                self.handle.as_ref().map_or(true, |handle| handle.coroutine.done())
            }

            /// Returns `true` if the handle owns a frame.
            #[must_use]
            pub fn owns_frame(&self) -> bool {
                self.handle.is_some()
            }

            /// The token of the owned frame.
            #[must_use]
            pub fn coroutine(&self) -> Option<Coroutine> {
                self.handle.as_ref().map(|handle| handle.coroutine.clone())
            }

            /// Tears the owned frame down. The handle owns nothing afterwards.
            pub fn destroy(&mut self) {
                if let Some(handle) = self.handle.take() {
                    handle.coroutine.destroy();
                }
            }
        }

        impl<$($param),*> Default for $name<$($param),*>
        where
            Tr: CoroutineTraits,
        {
            fn default() -> Self {
                Self::from_handle(None)
            }
        }

        impl<$($param),*> Unpin for $name<$($param),*> where Tr: CoroutineTraits {}

        impl<$($param),*> std::fmt::Debug for $name<$($param),*>
        where
            Tr: CoroutineTraits,
        {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("coroutine", &self.coroutine())
                    .field("promise", &self.handle.as_ref().map(|handle| &*handle.promise))
                    .field("config", &Tr::CONFIG)
                    .finish()
            }
        }

        impl<$($param),*> crate::task::CoroutineHandle for $name<$($param),*>
        where
            Tr: CoroutineTraits,
        {
            fn resume(&self) {
                Self::resume(self);
            }
            fn destroy(&mut self) {
                Self::destroy(self);
            }
            fn done(&self) -> bool {
                Self::done(self)
            }
            fn owns_frame(&self) -> bool {
                Self::owns_frame(self)
            }
            fn coroutine(&self) -> Option<Coroutine> {
                Self::coroutine(self)
            }
        }
    };
}

pub(crate) use handle_methods;
