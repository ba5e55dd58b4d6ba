//! Owning handles to coroutine frames.
//!
//! There are three kinds of handles, all parameterized by a
//! [`CoroutineTraits`](crate::config::CoroutineTraits) type that fixes the
//! behavior of the frame:
//! * [`BasicTask`] produces a single value;
//! * [`BasicGenerator`] produces values on demand;
//! * [`BasicFireAndForget`] produces nothing and is never awaited.
//!
//! Most code uses the aliases below rather than naming a traits type.
use crate::config::{
    AsyncGeneratorTraits, AutoTaskTraits, CopyResult, FireAndForgetTraits, GeneratorTraits,
    ImmediateTraits, LazyTraits, TaskTraits,
};
use crate::coroutine::Coroutine;

pub use basic_task::BasicTask;
pub use fire_and_forget::BasicFireAndForget;
pub use generator::{BasicGenerator, Co, Next, YieldValue};

mod basic_task;
mod fire_and_forget;
mod generator;
mod handle;

/// Operations shared by every handle kind.
pub trait CoroutineHandle {
    /// Resumes the owned frame until its next suspension.
    fn resume(&self);
    /// Tears the owned frame down. The handle owns nothing afterwards.
    fn destroy(&mut self);
    /// Returns `true` once the frame will run no further, or if the handle
    /// owns nothing.
    fn done(&self) -> bool;
    fn owns_frame(&self) -> bool;
    fn coroutine(&self) -> Option<Coroutine>;
}

/// Runs synchronously up to its first suspension as soon as it is created.
pub type Immediate<T = ()> = BasicTask<T, ImmediateTraits>;
/// Runs synchronously the first time it is resumed or awaited.
pub type Lazy<T = ()> = BasicTask<T, LazyTraits>;
/// Starts suspended and resumes its awaiter once it is finished. Panics are
/// deferred until the result is retrieved.
pub type Task<T = ()> = BasicTask<T, TaskTraits>;
/// A [`Task`] that starts running as soon as it is created.
pub type AutoTask<T = ()> = BasicTask<T, AutoTaskTraits>;
/// Produces values synchronously, one per resumption.
pub type Generator<T> = BasicGenerator<T, GeneratorTraits>;
/// Produces values on demand and resumes its awaiter after each one.
pub type AsyncGenerator<T> = BasicGenerator<T, AsyncGeneratorTraits>;
/// Starts immediately and frees itself once finished.
pub type FireAndForget = BasicFireAndForget<FireAndForgetTraits>;

/// An [`Immediate`] whose result is cloned out instead of moved.
pub type CopyImmediate<T = ()> = BasicTask<T, CopyResult<ImmediateTraits>>;
/// A [`Lazy`] whose result is cloned out instead of moved.
pub type CopyLazy<T = ()> = BasicTask<T, CopyResult<LazyTraits>>;
/// A [`Task`] whose result is cloned out instead of moved.
pub type CopyTask<T = ()> = BasicTask<T, CopyResult<TaskTraits>>;
/// An [`AutoTask`] whose result is cloned out instead of moved.
pub type CopyAutoTask<T = ()> = BasicTask<T, CopyResult<AutoTaskTraits>>;
/// A [`Generator`] whose values are cloned out instead of moved.
pub type CopyGenerator<T> = BasicGenerator<T, CopyResult<GeneratorTraits>>;
/// An [`AsyncGenerator`] whose values are cloned out instead of moved.
pub type CopyAsyncGenerator<T> = BasicGenerator<T, CopyResult<AsyncGeneratorTraits>>;
/// A [`FireAndForget`] with the copying configuration. It produces nothing, so
/// this only differs in name.
pub type CopyFireAndForget = BasicFireAndForget<CopyResult<FireAndForgetTraits>>;
