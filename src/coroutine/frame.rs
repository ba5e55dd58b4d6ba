use super::globals;
use super::raw_frame::{RawFrame, State};
use super::Coroutine;
use crate::promise::RawPromise;
use crate::utils::futures::poll_catch_unwind;
use futures::task::noop_waker_ref;
use log::trace;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::marker::PhantomPinned;
use std::panic::resume_unwind;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

pub(crate) struct Frame<F: Future<Output = ()>> {
    /// Even though strictly speaking cells do not pin project,
    /// we will consider the contents of this cell pinned.
    body: RefCell<Body<F>>,
    promise: Rc<dyn RawPromise>,
    state: Cell<State>,
    /// set when the frame is destroyed while it is running.
    doomed: Cell<bool>,
    _ph: PhantomPinned,
}

enum Body<F> {
    Pending { fut: F },
    Complete,
}

impl<F: Future<Output = ()>> Frame<F> {
    pub fn new(fut: F, promise: Rc<dyn RawPromise>) -> Self {
        Frame {
            body: RefCell::new(Body::Pending { fut }),
            promise,
            state: Cell::new(State::Created),
            doomed: Cell::new(false),
            _ph: PhantomPinned,
        }
    }
}

impl<F: Future<Output = ()>> RawFrame for Frame<F> {
    #[track_caller]
    fn step(self: Pin<&Self>, this: &Coroutine) -> Option<Coroutine> {
        match self.state.get() {
            State::Created | State::Suspended => {}
            State::Running => panic!("attempted to resume a coroutine that is already running."),
            State::Done => panic!("attempted to resume a coroutine that has already finished."),
            State::Destroyed => panic!("attempted to resume a coroutine that has been destroyed."),
        }
        self.state.set(State::Running);

        let step = globals::enter(this.clone());
        let polled = {
            let mut body = self.body.borrow_mut();
            let Body::Pending { fut } = &mut *body else {
                unreachable!("a suspended coroutine has no body. This is a bug in cotask.")
            };
            // Safety: the frame is pinned and the body is never moved out
            // of it, it is only dropped in place.
            let fut = unsafe { Pin::new_unchecked(fut) };
            let mut cx = Context::from_waker(noop_waker_ref());
            let polled = poll_catch_unwind(fut, &mut cx);
            if !matches!(polled, Ok(Poll::Pending)) {
                // the locals of the body go away before anyone waiting on
                // this frame gets to run.
                *body = Body::Complete;
            }
            polled
        };
        let transfer = step.exit();

        match polled {
            Ok(Poll::Pending) => self.state.set(State::Suspended),
            Ok(Poll::Ready(())) => self.state.set(State::Done),
            Err(payload) => {
                self.state.set(State::Done);
                if self.doomed.get() {
                    self.destroy();
                }
                resume_unwind(payload);
            }
        }
        if self.doomed.get() {
            self.destroy();
        }
        transfer
    }

    fn destroy(self: Pin<&Self>) {
        match self.state.get() {
            State::Destroyed => return,
            State::Running => {
                self.doomed.set(true);
                return;
            }
            State::Created | State::Suspended | State::Done => {}
        }
        trace!("destroying coroutine frame");
        self.state.set(State::Destroyed);
        self.doomed.set(false);
        // Dropping the body may tear down other frames that refer back to
        // this one. They observe the destroyed state and leave it alone.
        *self.body.borrow_mut() = Body::Complete;
        self.promise.destroy();
    }

    fn state(&self) -> State {
        self.state.get()
    }
}
