use crate::config::{Config, Retrieve};
use crate::continuation::ContinuationRegistry;
use crate::coroutine::{self, Coroutine};
use crate::exception::{ExceptionBehavior, ExceptionState, Failure};
use crate::slot::ResultSlot;
use crate::utils::futures::poll_catch_unwind;
use log::{debug, trace, warn};
use pin_project_lite::pin_project;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::panic::resume_unwind;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// The part of a promise a frame needs when it is torn down.
pub(crate) trait RawPromise {
    /// Drops the stored result and failure, and destroys the waiting
    /// continuation.
    fn destroy(&self);
}

/// Per-frame state shared between a coroutine body and its handle.
pub(crate) struct Promise<T> {
    config: Config,
    slot: RefCell<ResultSlot<T>>,
    exception: ExceptionState,
    continuation: ContinuationRegistry,
    /// the body has returned.
    returned: Cell<bool>,
    /// the slot holds a value nobody retrieved yet.
    fresh: Cell<bool>,
    /// a generator is suspended at a yield rather than inside another await.
    at_yield: Cell<bool>,
}

impl<T> Promise<T> {
    pub fn new(config: Config) -> Promise<T> {
        debug_assert!(config.is_valid(), "invalid coroutine configuration: {config:?}");
        Promise {
            config,
            slot: RefCell::new(ResultSlot::new()),
            exception: ExceptionState::default(),
            continuation: ContinuationRegistry::default(),
            returned: Cell::new(false),
            fresh: Cell::new(false),
            at_yield: Cell::new(false),
        }
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// Start checkpoint: whether the frame waits to be resumed before running.
    pub fn initial_suspend(&self) -> bool {
        trace!("start checkpoint, suspend: {}", self.config.initial_suspend);
        self.config.initial_suspend
    }

    /// Stores the single result of the body.
    ///
    /// # Panics
    /// If the body already returned.
    #[track_caller]
    pub fn return_value(&self, value: T) {
        assert!(
            !self.returned.replace(true),
            "a coroutine attempted to return more than once."
        );
        self.slot.borrow_mut().write(value);
        self.fresh.set(true);
    }

    /// Marks a generator as exhausted. The slot is emptied so retrieval
    /// reports that no value was produced by the last step.
    pub fn return_void(&self) {
        self.returned.set(true);
        self.fresh.set(false);
        self.slot.borrow_mut().clear();
    }

    /// Stores a yielded value, replacing the previous one, and reaches the end
    /// checkpoint of this step.
    ///
    /// # Panics
    /// If the generator already returned.
    #[track_caller]
    pub fn yield_value(&self, value: T) {
        debug_assert!(self.config.generator, "only generators can yield values.");
        assert!(
            !self.returned.get(),
            "a generator attempted to yield after returning."
        );
        self.slot.borrow_mut().write(value);
        self.fresh.set(true);
        self.at_yield.set(true);
        trace!("end checkpoint after yield");
        self.resume_continuation();
    }

    /// Handles a panic that escaped the body.
    pub fn unhandled_exception(&self, payload: Box<dyn Any + Send>) {
        if self.config.generator {
            self.return_void();
        }
        match self.config.exception {
            ExceptionBehavior::Ignore => {
                debug!("ignored a panic that escaped a coroutine body.");
            }
            ExceptionBehavior::Defer => {
                let failure = Failure::new(payload);
                warn!("stored a panic that escaped a coroutine body: {}", failure.message());
                self.exception.store(failure);
            }
            ExceptionBehavior::Rethrow => resume_unwind(payload),
        }
    }

    /// End checkpoint after the body finished. Frames without a final pause
    /// are torn down as soon as this step returns, otherwise control goes to
    /// the waiting continuation, if there is one.
    pub fn final_suspend(&self) {
        trace!("final checkpoint, suspend: {}", self.config.final_suspend);
        if !self.config.final_suspend {
            if let Some(this) = coroutine::current() {
                this.destroy();
            }
            return;
        }
        self.resume_continuation();
    }

    /// Called when a generator continues past the yield it was suspended at.
    pub fn leave_yield(&self) {
        self.at_yield.set(false);
    }

    pub fn is_at_yield(&self) -> bool {
        self.at_yield.get()
    }

    fn resume_continuation(&self) {
        if !self.config.is_async {
            return;
        }
        if let Some(continuation) = self.continuation.take() {
            debug!("handing control back to {continuation:?}");
            coroutine::transfer(continuation);
        }
    }

    /// Records the coroutine that waits on this promise. Returns `false` when
    /// the promise is not async, in which case nothing is recorded.
    ///
    /// # Panics
    /// If another continuation is already waiting.
    #[track_caller]
    pub fn set_continuation(&self, continuation: Coroutine) -> bool {
        if !self.config.is_async {
            return false;
        }
        self.continuation.register(continuation);
        true
    }

    pub fn has_continuation(&self) -> bool {
        self.continuation.is_registered()
    }

    /// Removes the deferred failure, so it is observed at most once.
    pub fn take_failure(&self) -> Option<Failure> {
        self.exception.take()
    }

    pub fn has_value(&self) -> bool {
        self.slot.borrow().has_value()
    }

    pub fn has_fresh_value(&self) -> bool {
        self.fresh.get() && self.has_value()
    }

    /// # Panics
    /// If the slot is empty.
    #[track_caller]
    pub fn retrieve<R: Retrieve<T>>(&self) -> T {
        self.fresh.set(false);
        R::retrieve(&mut self.slot.borrow_mut())
    }

    /// Like [`retrieve`](Promise::retrieve), but a unit result is produced
    /// even when nothing was stored, as happens after the body failed.
    #[track_caller]
    pub fn retrieve_result<R: Retrieve<T>>(&self) -> T
    where
        T: 'static,
    {
        if !self.has_value() {
            if let Some(unit) = unit_value::<T>() {
                self.fresh.set(false);
                return unit;
            }
        }
        self.retrieve::<R>()
    }
}

/// Returns `()` as a `T` when `T` is the unit type.
fn unit_value<T: 'static>() -> Option<T> {
    let mut unit = Some(());
    (&mut unit as &mut dyn Any).downcast_mut::<Option<T>>()?.take()
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("has_value", &self.has_value())
            .field("fresh", &self.fresh.get())
            .field("returned", &self.returned.get())
            .field("failed", &self.exception.has_failure())
            .field("awaited", &self.has_continuation())
            .finish_non_exhaustive()
    }
}

impl<T> RawPromise for Promise<T> {
    fn destroy(&self) {
        self.fresh.set(false);
        self.slot.borrow_mut().clear();
        drop(self.exception.take());
        self.continuation.destroy();
    }
}

pin_project! {
    /// Drives a body future on behalf of its promise: panics are routed to the
    /// exception policy, the output to `complete`, and the end checkpoint runs
    /// once the body is finished.
    pub(crate) struct PromiseBody<F, T>
    where
        F: Future,
    {
        #[pin]
        body: F,
        promise: Rc<Promise<T>>,
        complete: fn(&Promise<T>, F::Output),
    }
}

impl<F: Future, T> PromiseBody<F, T> {
    pub fn new(body: F, promise: Rc<Promise<T>>, complete: fn(&Promise<T>, F::Output)) -> Self {
        PromiseBody {
            body,
            promise,
            complete,
        }
    }
}

impl<F: Future, T> Future for PromiseBody<F, T> {
    type Output = ();
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.project();
        match poll_catch_unwind(this.body, cx) {
            Ok(Poll::Pending) => return Poll::Pending,
            Ok(Poll::Ready(output)) => (this.complete)(this.promise, output),
            Err(payload) => this.promise.unhandled_exception(payload),
        }
        this.promise.final_suspend();
        Poll::Ready(())
    }
}
