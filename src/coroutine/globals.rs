use super::Coroutine;
use std::cell::RefCell;

thread_local! {
    /// The coroutines currently being stepped on this thread, innermost last.
    /// A coroutine that resumes another one inline pushes a second entry.
    static STEPS: RefCell<Vec<Step>> = RefCell::new(Vec::new());
}

struct Step {
    coroutine: Coroutine,
    /// the coroutine to resume once this step has suspended.
    transfer: Option<Coroutine>,
}

/// Pops the step context when dropped, including while unwinding.
pub(crate) struct StepGuard {
    active: bool,
}

pub(crate) fn enter(coroutine: Coroutine) -> StepGuard {
    STEPS.with(|steps| {
        steps.borrow_mut().push(Step {
            coroutine,
            transfer: None,
        });
    });
    StepGuard { active: true }
}

impl StepGuard {
    /// Leaves the step and returns the coroutine it nominated, if any.
    pub fn exit(mut self) -> Option<Coroutine> {
        self.active = false;
        // The popped step is dropped outside of the borrow, since dropping a
        // token may tear down a frame that looks at the context again.
        let step = STEPS.with(|steps| steps.borrow_mut().pop());
        step.and_then(|step| step.transfer)
    }
}

impl Drop for StepGuard {
    fn drop(&mut self) {
        if self.active {
            let step = STEPS.with(|steps| steps.borrow_mut().pop());
            drop(step);
        }
    }
}

/// Returns the token of the innermost coroutine being stepped on this thread.
pub(crate) fn current() -> Option<Coroutine> {
    STEPS.with(|steps| steps.borrow().last().map(|step| step.coroutine.clone()))
}

/// Nominates `next` to be resumed once the current step suspends.
///
/// # Panics
/// Panics if called outside of a coroutine, or if the current step already
/// nominated a coroutine.
#[track_caller]
pub(crate) fn transfer(next: Coroutine) {
    if next.is_noop() {
        return;
    }
    STEPS.with(|steps| {
        let mut steps = steps.borrow_mut();
        let Some(step) = steps.last_mut() else {
            panic!("attempted to transfer control from the outside of a coroutine.")
        };
        assert!(
            step.transfer.is_none(),
            "a coroutine step attempted to transfer control twice."
        );
        step.transfer = Some(next);
    });
}
