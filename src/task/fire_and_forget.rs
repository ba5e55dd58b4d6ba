use super::handle::{handle_methods, Handle};
use crate::config::{CoroutineTraits, FireAndForgetTraits};
use crate::coroutine::Coroutine;
use crate::promise::Promise;
use std::future::Future;
use std::marker::PhantomData;
use std::rc::Rc;

/// A handle to a coroutine that is never awaited and produces nothing.
///
/// The body starts running as soon as the handle is created and may await
/// other coroutines. With the default configuration the frame frees itself
/// once the body returns, so dropping the handle never tears it down.
///
/// # Example
/// ```rust
/// use cotask::FireAndForget;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let x = Rc::new(Cell::new(1));
/// let inc = x.clone();
/// FireAndForget::new(async move { inc.set(inc.get() + 1) });
/// assert_eq!(x.get(), 2);
/// ```
pub struct BasicFireAndForget<Tr: CoroutineTraits = FireAndForgetTraits> {
    handle: Option<Handle<()>>,
    _tr: PhantomData<fn() -> Tr>,
}

impl<Tr: CoroutineTraits> BasicFireAndForget<Tr> {
    #[track_caller]
    pub fn new<F>(body: F) -> Self
    where
        F: Future<Output = ()> + 'static,
    {
        assert!(
            !Tr::CONFIG.generator,
            "a generator configuration cannot drive a fire-and-forget coroutine."
        );
        let promise = Rc::new(Promise::new(Tr::CONFIG));
        let handle = Handle::start(promise, body, |_, ()| {});
        Self::from_handle(Some(handle))
    }

    fn from_handle(handle: Option<Handle<()>>) -> Self {
        BasicFireAndForget {
            handle,
            _tr: PhantomData,
        }
    }

    /// Relinquishes the frame without tearing it down. The frame keeps running
    /// whenever whatever it awaits resumes it.
    pub fn detach(&mut self) {
        self.handle = None;
    }
}

handle_methods!(BasicFireAndForget<Tr>, "fire-and-forget");

impl<Tr: CoroutineTraits> Drop for BasicFireAndForget<Tr> {
    fn drop(&mut self) {
        // self-destroying frames are gone by the time they are done, and must
        // not be torn down while they still wait on something.
        if Tr::CONFIG.final_suspend {
            self.destroy();
        }
    }
}
