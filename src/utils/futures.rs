use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Polls `fut` once, catching a panic raised by the poll.
pub(crate) fn poll_catch_unwind<F>(
    fut: Pin<&mut F>,
    cx: &mut Context<'_>,
) -> Result<Poll<F::Output>, Box<dyn Any + Send + 'static>>
where
    F: Future + ?Sized,
{
    panic::catch_unwind(AssertUnwindSafe(|| fut.poll(cx)))
}
