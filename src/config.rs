use crate::exception::ExceptionBehavior;
use crate::slot::ResultSlot;
use std::marker::PhantomData;

/// The behavior of a coroutine, fixed when its handle type is chosen.
///
/// Every handle type is parameterized by a [`CoroutineTraits`] implementor whose
/// [`CONFIG`](CoroutineTraits::CONFIG) is one of these. The presets below cover
/// the common combinations; custom combinations can be built from them with
/// the `const fn` modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    /// The coroutine produces a series of values instead of a single one.
    pub generator: bool,
    /// The coroutine keeps a continuation for whoever awaits it and hands control
    /// back to it when a value is ready. Awaiting a coroutine that is not async
    /// runs it synchronously on the awaiter's stack instead.
    pub is_async: bool,
    /// What happens to a panic that escapes the body.
    pub exception: ExceptionBehavior,
    /// The coroutine pauses before running any of its body. When this is false
    /// the body runs up to its first suspension as soon as the handle is created.
    pub initial_suspend: bool,
    /// The coroutine pauses once it is finished so the result can be retrieved.
    /// When this is false the frame tears itself down after its last step.
    pub final_suspend: bool,
    /// Results are moved out of the promise. When this is false they are cloned
    /// and the stored value stays in place.
    pub move_result: bool,
}

impl Config {
    /// Runs synchronously as soon as it is created.
    pub const IMMEDIATE: Config = Config {
        generator: false,
        is_async: false,
        exception: ExceptionBehavior::Rethrow,
        initial_suspend: false,
        final_suspend: true,
        move_result: true,
    };

    /// Runs synchronously the first time it is resumed or awaited.
    pub const LAZY: Config = Config {
        initial_suspend: true,
        ..Config::IMMEDIATE
    };

    /// General purpose task. Starts suspended and resumes its awaiter when done.
    pub const TASK: Config = Config {
        generator: false,
        is_async: true,
        exception: ExceptionBehavior::Defer,
        initial_suspend: true,
        final_suspend: true,
        move_result: true,
    };

    /// A task that starts running as soon as it is created.
    pub const AUTO_TASK: Config = Config {
        initial_suspend: false,
        ..Config::TASK
    };

    /// Produces values on demand, synchronously.
    pub const GENERATOR: Config = Config {
        generator: true,
        is_async: false,
        exception: ExceptionBehavior::Rethrow,
        initial_suspend: true,
        final_suspend: true,
        move_result: true,
    };

    /// Produces values on demand and resumes its awaiter after each one.
    pub const ASYNC_GENERATOR: Config = Config {
        generator: true,
        is_async: true,
        exception: ExceptionBehavior::Defer,
        initial_suspend: true,
        final_suspend: true,
        move_result: true,
    };

    /// Starts immediately, may await other coroutines, is never awaited and
    /// frees itself once finished.
    pub const FIRE_AND_FORGET: Config = Config {
        generator: false,
        is_async: false,
        exception: ExceptionBehavior::Rethrow,
        initial_suspend: false,
        final_suspend: false,
        move_result: true,
    };

    #[must_use]
    pub const fn with_exception(mut self, exception: ExceptionBehavior) -> Config {
        self.exception = exception;
        self
    }

    #[must_use]
    pub const fn with_initial_suspend(mut self, initial_suspend: bool) -> Config {
        self.initial_suspend = initial_suspend;
        self
    }

    #[must_use]
    pub const fn with_final_suspend(mut self, final_suspend: bool) -> Config {
        self.final_suspend = final_suspend;
        self
    }

    /// The same configuration, retrieving results by clone.
    #[must_use]
    pub const fn copy_result(mut self) -> Config {
        self.move_result = false;
        self
    }

    /// Checks the combinations the promise cannot honor:
    /// * a generator must pause at the start and after finishing, since every
    ///   step has to behave like the first one;
    /// * a frame that frees itself when finished cannot be async, because there
    ///   would be nothing left to hand the continuation back from.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        if self.generator && !(self.initial_suspend && self.final_suspend) {
            return false;
        }
        !(self.is_async && !self.final_suspend)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::TASK
    }
}

/// Selects the configuration of a handle type at compile time.
pub trait CoroutineTraits: 'static {
    const CONFIG: Config;
    /// How results are taken out of the promise. Either [`MoveResult`] or
    /// [`CopyResult`].
    type Retrieval;
}

/// Retrieves a result out of a promise slot.
pub trait Retrieve<T> {
    fn retrieve(slot: &mut ResultSlot<T>) -> T;
}

/// Moves the result out, emptying the slot.
#[derive(Debug)]
pub enum MoveResult {}

impl<T> Retrieve<T> for MoveResult {
    fn retrieve(slot: &mut ResultSlot<T>) -> T {
        slot.take()
    }
}

/// Clones the result, leaving it in the slot. When used as a traits type it
/// turns any preset into its copying variant.
#[derive(Debug)]
pub struct CopyResult<Tr = ()>(PhantomData<fn() -> Tr>);

impl<T: Clone> Retrieve<T> for CopyResult {
    fn retrieve(slot: &mut ResultSlot<T>) -> T {
        slot.peek().clone()
    }
}

impl<Tr: CoroutineTraits> CoroutineTraits for CopyResult<Tr> {
    const CONFIG: Config = Tr::CONFIG.copy_result();
    type Retrieval = CopyResult;
}

macro_rules! presets {
    ($($(#[$meta:meta])* $name:ident => $config:expr;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug)]
            pub enum $name {}

            impl CoroutineTraits for $name {
                const CONFIG: Config = $config;
                type Retrieval = MoveResult;
            }
        )*
    };
}

presets! {
    /// See [`Config::IMMEDIATE`].
    ImmediateTraits => Config::IMMEDIATE;
    /// See [`Config::LAZY`].
    LazyTraits => Config::LAZY;
    /// See [`Config::TASK`].
    TaskTraits => Config::TASK;
    /// See [`Config::AUTO_TASK`].
    AutoTaskTraits => Config::AUTO_TASK;
    /// See [`Config::GENERATOR`].
    GeneratorTraits => Config::GENERATOR;
    /// See [`Config::ASYNC_GENERATOR`].
    AsyncGeneratorTraits => Config::ASYNC_GENERATOR;
    /// See [`Config::FIRE_AND_FORGET`].
    FireAndForgetTraits => Config::FIRE_AND_FORGET;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(config: Config) -> (bool, bool, ExceptionBehavior, bool, bool, bool) {
        (
            config.generator,
            config.is_async,
            config.exception,
            config.initial_suspend,
            config.final_suspend,
            config.move_result,
        )
    }

    #[test]
    fn preset_table() {
        use ExceptionBehavior::{Defer, Rethrow};
        let t = true;
        let f = false;
        assert_eq!(row(ImmediateTraits::CONFIG), (f, f, Rethrow, f, t, t));
        assert_eq!(row(LazyTraits::CONFIG), (f, f, Rethrow, t, t, t));
        assert_eq!(row(TaskTraits::CONFIG), (f, t, Defer, t, t, t));
        assert_eq!(row(AutoTaskTraits::CONFIG), (f, t, Defer, f, t, t));
        assert_eq!(row(GeneratorTraits::CONFIG), (t, f, Rethrow, t, t, t));
        assert_eq!(row(AsyncGeneratorTraits::CONFIG), (t, t, Defer, t, t, t));
        assert_eq!(row(FireAndForgetTraits::CONFIG), (f, f, Rethrow, f, f, t));
    }

    #[test]
    fn copy_variant_only_changes_retrieval() {
        let copy = CopyResult::<AutoTaskTraits>::CONFIG;
        assert!(!copy.move_result);
        assert_eq!(copy, Config { move_result: true, ..copy }.copy_result());
        assert_eq!(Config { move_result: true, ..copy }, Config::AUTO_TASK);
    }

    #[test]
    fn presets_are_valid() {
        for config in [
            Config::IMMEDIATE,
            Config::LAZY,
            Config::TASK,
            Config::AUTO_TASK,
            Config::GENERATOR,
            Config::ASYNC_GENERATOR,
            Config::FIRE_AND_FORGET,
        ] {
            assert!(config.is_valid(), "{config:?}");
        }
        assert!(!Config::GENERATOR.with_initial_suspend(false).is_valid());
        assert!(!Config::TASK.with_final_suspend(false).is_valid());
        assert_eq!(Config::default(), Config::TASK);
    }

    #[test]
    fn copy_retrieval_leaves_value() {
        let mut slot = ResultSlot::new();
        slot.write(String::from("kept"));
        assert_eq!(<CopyResult as Retrieve<String>>::retrieve(&mut slot), "kept");
        assert!(slot.has_value());
        assert_eq!(<MoveResult as Retrieve<String>>::retrieve(&mut slot), "kept");
        assert!(!slot.has_value());
    }
}
