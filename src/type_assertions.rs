#![allow(dead_code)]
use crate::coroutine::{suspend, Coroutine};
use crate::task::{Co, FireAndForget, Generator, Task};

macro_rules! assert_not_impl {
    ($e:expr, $($t:path),+ $(,)*) => {{
        let x = $e;
        let _ = move || -> () {
            struct Check<T: ?Sized>(T);
            trait AmbiguousIfImpl<A> { fn some_item(&self) { } }

            impl<T: ?Sized> AmbiguousIfImpl<()> for Check<T> { }
            impl<T: ?Sized $(+ $t)*> AmbiguousIfImpl<u8> for Check<T> { }

            Check(x).some_item()
        };
  }  };
}

fn handle_assertions(task: Task<i32>, generator: Generator<i32>, forget: FireAndForget) {
    assert_not_impl!(task, Send, Sync);
    assert_not_impl!(generator, Send, Sync);
    assert_not_impl!(forget, Send, Sync);
}

fn generator_assertions(mut generator: Generator<i32>, co: Co<i32>) {
    assert_not_impl!(generator.next_value(), Send, Sync);
    assert_not_impl!(co.yield_value(1), Send, Sync);
    assert_not_impl!(co, Send, Sync);
}

fn coroutine_assertions(coroutine: Coroutine) {
    assert_not_impl!(coroutine, Send, Sync);
}

fn suspend_is_thread_safe() {
    fn check<T: Send + Sync>(_: T) {}
    check(suspend());
}
