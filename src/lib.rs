#![allow(unused_unsafe)]
#![warn(clippy::pedantic)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(unsafe_op_in_unsafe_fn)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::module_name_repetitions)]
//! Single-threaded coroutine tasks built on `async` bodies.
//!
//! A coroutine is an `async` body owned by a handle. Unlike a future handed to
//! an executor, it only runs when it is explicitly resumed: either by hand,
//! through [`resume`](task::CoroutineHandle::resume), or by the coroutine it was
//! waiting on, once that one has produced what it was awaited for.
//!
//! The behavior of a coroutine is fixed by the handle type:
//!
//! | Handle | runs at creation | awaiter is resumed | panics |
//! |---|---|---|---|
//! | [`Immediate`] | yes | in place | replayed at once |
//! | [`Lazy`] | no | in place | replayed at once |
//! | [`Task`] | no | when finished | replayed on retrieval |
//! | [`AutoTask`] | yes | when finished | replayed on retrieval |
//! | [`Generator`] | no | in place | replayed at once |
//! | [`AsyncGenerator`] | no | after every value | replayed on retrieval |
//! | [`FireAndForget`] | yes | never awaited | replayed at once |
//!
//! # Example
//! ```rust
//! use cotask::{AutoTask, Generator, Task};
//!
//! fn fibonacci() -> Generator<u64> {
//!     Generator::new(|co| async move {
//!         let (mut a, mut b) = (1, 1);
//!         loop {
//!             co.yield_value(a).await;
//!             (a, b) = (b, a + b);
//!         }
//!     })
//! }
//!
//! fn sum(n: usize) -> Task<u64> {
//!     Task::new(async move {
//!         let mut fib = fibonacci();
//!         let mut sum = 0;
//!         for _ in 0..n {
//!             sum += fib.next_value().await.unwrap();
//!         }
//!         sum
//!     })
//! }
//!
//! let mut total = AutoTask::new(async { sum(5).await + sum(2).await });
//! assert!(total.done());
//! assert_eq!(total.take_result(), 14);
//! ```

pub mod config;
pub mod coroutine;
pub mod exception;
pub mod slot;
pub mod task;

mod continuation;
mod promise;
mod utils;

#[cfg(test)]
mod type_assertions;

pub use config::{
    AsyncGeneratorTraits, AutoTaskTraits, Config, CopyResult, CoroutineTraits,
    FireAndForgetTraits, GeneratorTraits, ImmediateTraits, LazyTraits, MoveResult, Retrieve,
    TaskTraits,
};
pub use coroutine::{suspend, this_coroutine, Coroutine};
pub use exception::{ExceptionBehavior, Failure};
pub use slot::ResultSlot;
pub use task::{
    AsyncGenerator, AutoTask, BasicFireAndForget, BasicGenerator, BasicTask, Co,
    CopyAsyncGenerator, CopyAutoTask, CopyFireAndForget, CopyGenerator, CopyImmediate, CopyLazy,
    CopyTask, CoroutineHandle, FireAndForget, Generator, Immediate, Lazy, Task,
};

#[cfg(feature = "macros")]
pub use cotask_macros::coroutine;
