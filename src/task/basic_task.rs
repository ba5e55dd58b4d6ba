use super::handle::{handle_methods, Handle};
use crate::config::{CoroutineTraits, Retrieve, TaskTraits};
use crate::coroutine::Coroutine;
use crate::exception::Failure;
use crate::promise::Promise;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// A handle to a coroutine that produces a single value.
///
/// The handle exclusively owns the coroutine frame. Dropping it tears the
/// frame down, unless the frame is configured to free itself once finished.
///
/// A task can be driven by hand with [`resume`](BasicTask::resume), or awaited
/// from another coroutine. Awaiting an asynchronous task suspends the awaiter
/// until the task is finished, at which point the awaiter is resumed
/// automatically.
///
/// # Panics
/// Awaiting a task whose body panicked replays the panic, unless the
/// configuration ignores panics.
///
/// # Example
/// ```rust
/// use cotask::Task;
///
/// let mut two = Task::new(async { 1 + 1 });
/// assert!(!two.done());
/// two.resume();
/// assert!(two.done());
/// assert_eq!(two.take_result(), 2);
/// ```
pub struct BasicTask<T, Tr: CoroutineTraits = TaskTraits> {
    handle: Option<Handle<T>>,
    /// the awaiter is suspended on this task.
    awaiting: bool,
    _tr: PhantomData<fn() -> Tr>,
}

impl<T: 'static, Tr: CoroutineTraits> BasicTask<T, Tr> {
    /// Creates the frame for `body`. Configurations without an initial pause
    /// run the body up to its first suspension before returning.
    #[track_caller]
    pub fn new<F>(body: F) -> Self
    where
        F: Future<Output = T> + 'static,
    {
        assert!(
            !Tr::CONFIG.generator,
            "a generator configuration cannot drive a single-result task."
        );
        let promise = Rc::new(Promise::new(Tr::CONFIG));
        let handle = Handle::start(promise, body, Promise::return_value);
        Self::from_handle(Some(handle))
    }
}

impl<T, Tr: CoroutineTraits> BasicTask<T, Tr> {
    fn from_handle(handle: Option<Handle<T>>) -> Self {
        BasicTask {
            handle,
            awaiting: false,
            _tr: PhantomData,
        }
    }

    /// Returns `true` if the result can be retrieved without resuming. This is
    /// the case once the task is finished.
    #[must_use]
    pub fn poll_ready(&self) -> bool {
        self.done()
    }

    /// Registers `continuation` as the awaiter of this task and returns the
    /// coroutine to resume next. Synchronous tasks are resumed in place and
    /// hand `continuation` straight back.
    ///
    /// # Panics
    /// If the handle owns nothing, or the task is already awaited.
    #[track_caller]
    pub fn await_suspend(&self, continuation: Coroutine) -> Coroutine {
        match &self.handle {
            Some(handle) => handle.await_suspend(continuation),
            None => panic!("attempted to await an empty task handle."),
        }
    }
}

impl<T: 'static, Tr> BasicTask<T, Tr>
where
    Tr: CoroutineTraits,
    Tr::Retrieval: Retrieve<T>,
{
    /// Retrieves the result of the finished task, moving or cloning it out
    /// depending on the configuration.
    ///
    /// A unit result is always available once the task finished, even if
    /// the body panicked and the panic was ignored or already replayed.
    ///
    /// # Panics
    /// If the task has not finished, if the result was already moved out, or
    /// to replay a panic the body deferred. A deferred panic is only replayed
    /// once.
    #[track_caller]
    pub fn take_result(&mut self) -> T {
        match self.try_take_result() {
            Ok(value) => value,
            Err(failure) => failure.resume(),
        }
    }

    /// Like [`take_result`](BasicTask::take_result), but a deferred panic is
    /// returned as an error instead of being replayed.
    ///
    /// # Panics
    /// If the task has not finished, or the result was already moved out.
    #[track_caller]
    pub fn try_take_result(&mut self) -> Result<T, Failure> {
        let Some(handle) = &self.handle else {
            panic!("attempted to take the result of an empty task handle.")
        };
        assert!(
            handle.coroutine.done(),
            "attempted to take the result of a task that has not finished."
        );
        if let Some(failure) = handle.promise.take_failure() {
            return Err(failure);
        }
        Ok(handle.promise.retrieve_result::<Tr::Retrieval>())
    }
}

handle_methods!(BasicTask<T, Tr>, "task");

impl<T, Tr: CoroutineTraits> Drop for BasicTask<T, Tr> {
    fn drop(&mut self) {
        if Tr::CONFIG.final_suspend {
            self.destroy();
        }
    }
}

impl<T: 'static, Tr> Future for BasicTask<T, Tr>
where
    Tr: CoroutineTraits,
    Tr::Retrieval: Retrieve<T>,
{
    type Output = T;

    fn poll(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<T> {
        let this = self.get_mut();
        let ready = this.poll_ready();
        let Some(handle) = &this.handle else {
            panic!("attempted to await an empty task handle.")
        };
        match handle.poll_await(&mut this.awaiting, ready) {
            Poll::Ready(()) => Poll::Ready(this.take_result()),
            Poll::Pending => Poll::Pending,
        }
    }
}
