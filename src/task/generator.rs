use super::handle::{handle_methods, Handle};
use crate::config::{CoroutineTraits, GeneratorTraits, Retrieve};
use crate::coroutine::Coroutine;
use crate::exception::Failure;
use crate::promise::Promise;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// A handle to a coroutine that produces values on demand.
///
/// The body receives a [`Co`] and hands values out with
/// `co.yield_value(v).await`. Every resumption runs the body up to its next
/// yield, after which the value can be retrieved with
/// [`take_result`](BasicGenerator::take_result). Once the body returns,
/// retrieval reports `None`.
///
/// # Example
/// ```rust
/// use cotask::Generator;
///
/// let counter = Generator::new(|co| async move {
///     for i in 0..3 {
///         co.yield_value(i).await;
///     }
/// });
/// assert_eq!(counter.collect::<Vec<_>>(), [0, 1, 2]);
/// ```
pub struct BasicGenerator<T, Tr: CoroutineTraits = GeneratorTraits> {
    handle: Option<Handle<T>>,
    _tr: PhantomData<fn() -> Tr>,
}

impl<T: 'static, Tr: CoroutineTraits> BasicGenerator<T, Tr> {
    /// Creates the frame for the body returned by `f`. Generators always
    /// pause before running their body.
    #[track_caller]
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Co<T>) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        assert!(
            Tr::CONFIG.generator,
            "a single-result configuration cannot drive a generator."
        );
        let promise = Rc::new(Promise::new(Tr::CONFIG));
        let body = f(Co {
            promise: promise.clone(),
        });
        let handle = Handle::start(promise, body, |promise, ()| promise.return_void());
        Self::from_handle(Some(handle))
    }
}

impl<T, Tr: CoroutineTraits> BasicGenerator<T, Tr> {
    fn from_handle(handle: Option<Handle<T>>) -> Self {
        BasicGenerator {
            handle,
            _tr: PhantomData,
        }
    }

    /// Returns `true` if retrieval does not need another resumption: a value
    /// nobody retrieved yet is buffered, or the generator is exhausted.
    #[must_use]
    pub fn poll_ready(&self) -> bool {
        match &self.handle {
            Some(handle) => handle.promise.has_fresh_value() || handle.coroutine.done(),
            None => true,
        }
    }

    /// Registers `continuation` as the awaiter of the next value and returns
    /// the coroutine to resume next. Awaiting an exhausted generator destroys
    /// `continuation` and returns the no-op coroutine.
    ///
    /// # Panics
    /// If the handle owns nothing, or the generator is already awaited. An
    /// asynchronous generator that was resumed by hand can only be awaited
    /// while it is suspended at a yield. Awaiting it while it waits on
    /// something else panics as well.
    #[track_caller]
    pub fn await_suspend(&self, continuation: Coroutine) -> Coroutine {
        match &self.handle {
            Some(handle) => handle.await_suspend(continuation),
            None => panic!("attempted to await an empty generator handle."),
        }
    }
}

impl<T, Tr> BasicGenerator<T, Tr>
where
    Tr: CoroutineTraits,
    Tr::Retrieval: Retrieve<T>,
{
    /// Retrieves the value produced by the most recent step, or `None` once
    /// the generator is exhausted.
    ///
    /// # Panics
    /// To replay a panic the body deferred.
    #[track_caller]
    pub fn take_result(&mut self) -> Option<T> {
        match self.try_take_result() {
            Ok(value) => value,
            Err(failure) => failure.resume(),
        }
    }

    /// Like [`take_result`](BasicGenerator::take_result), but a deferred panic
    /// is returned as an error instead of being replayed.
    pub fn try_take_result(&mut self) -> Result<Option<T>, Failure> {
        let Some(handle) = &self.handle else {
            return Ok(None);
        };
        if let Some(failure) = handle.promise.take_failure() {
            return Err(failure);
        }
        if !handle.promise.has_value() {
            return Ok(None);
        }
        Ok(Some(handle.promise.retrieve::<Tr::Retrieval>()))
    }

    /// Awaits the next value. Resolves to `None` once the generator is
    /// exhausted.
    pub fn next_value(&mut self) -> Next<'_, T, Tr> {
        Next {
            generator: self,
            awaiting: false,
        }
    }
}

handle_methods!(BasicGenerator<T, Tr>, "generator");

impl<T, Tr: CoroutineTraits> Drop for BasicGenerator<T, Tr> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<T, Tr> Iterator for BasicGenerator<T, Tr>
where
    Tr: CoroutineTraits,
    Tr::Retrieval: Retrieve<T>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let handle = self.handle.as_ref()?;
        if !handle.promise.has_fresh_value() {
            if handle.coroutine.done() {
                return None;
            }
            handle.coroutine.resume();
        }
        self.take_result()
    }
}

/// Future returned by [`BasicGenerator::next_value`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Next<'a, T, Tr: CoroutineTraits> {
    generator: &'a mut BasicGenerator<T, Tr>,
    awaiting: bool,
}

impl<T, Tr> Future for Next<'_, T, Tr>
where
    Tr: CoroutineTraits,
    Tr::Retrieval: Retrieve<T>,
{
    type Output = Option<T>;

    fn poll(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.get_mut();
        let ready = this.generator.poll_ready();
        let Some(handle) = &this.generator.handle else {
            return Poll::Ready(None);
        };
        match handle.poll_await(&mut this.awaiting, ready) {
            Poll::Ready(()) => Poll::Ready(this.generator.take_result()),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// The yielding end of a generator, passed to its body.
pub struct Co<T> {
    promise: Rc<Promise<T>>,
}

impl<T> Co<T> {
    /// Hands `value` to whoever drives the generator and suspends the body
    /// until the next value is requested. A value that was not retrieved is
    /// overwritten.
    pub fn yield_value(&self, value: T) -> YieldValue<'_, T> {
        YieldValue {
            co: self,
            value: Some(value),
        }
    }
}

impl<T> std::fmt::Debug for Co<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Co")
            .field("config", &self.promise.config())
            .finish()
    }
}

/// Future returned by [`Co::yield_value`].
#[must_use = "values are only yielded once the future is awaited"]
pub struct YieldValue<'a, T> {
    co: &'a Co<T>,
    value: Option<T>,
}

impl<T> Unpin for YieldValue<'_, T> {}

impl<T> Future for YieldValue<'_, T> {
    type Output = ();
    fn poll(mut self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<()> {
        match self.value.take() {
            Some(value) => {
                self.co.promise.yield_value(value);
                Poll::Pending
            }
            None => {
                self.co.promise.leave_yield();
                Poll::Ready(())
            }
        }
    }
}
