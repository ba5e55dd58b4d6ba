use cotask::{
    AsyncGenerator, AutoTask, BasicTask, Config, CoroutineTraits, ExceptionBehavior, Generator,
    Immediate, Lazy, MoveResult, Task,
};
use std::any::Any;
use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

fn install() {
    #[cfg(not(miri))]
    {
        dotenv::dotenv().ok();
    }
    let _ = env_logger::builder().is_test(true).try_init();
}

fn message(payload: &Box<dyn Any + Send>) -> &str {
    payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or_default()
}

fn checked(x: i32) -> impl std::future::Future<Output = i32> + 'static {
    async move {
        assert!(x > 0, "input must be positive");
        x
    }
}

enum QuietTraits {}

impl CoroutineTraits for QuietTraits {
    const CONFIG: Config = Config::TASK.with_exception(ExceptionBehavior::Ignore);
    type Retrieval = MoveResult;
}

#[test]
fn deferred_failure_is_replayed_once() {
    install();
    let mut task = Task::new(checked(0));
    task.resume();
    assert!(task.done());

    let first = catch_unwind(AssertUnwindSafe(|| task.take_result())).unwrap_err();
    assert_eq!(message(&first), "input must be positive");

    // the failure record is gone, and no value was ever produced.
    let second = catch_unwind(AssertUnwindSafe(|| task.take_result())).unwrap_err();
    assert!(message(&second).contains("empty result slot"));
}

#[test]
fn try_take_result_reports_the_failure() {
    install();
    let mut task = AutoTask::new(checked(-1));
    let failure = task.try_take_result().unwrap_err();
    assert_eq!(failure.message(), "input must be positive");
    assert_eq!(
        failure.to_string(),
        "coroutine body panicked: input must be positive"
    );

    let mut ok = AutoTask::new(checked(4));
    assert_eq!(ok.try_take_result().unwrap(), 4);
}

#[test]
fn rethrow_unwinds_out_of_resume() {
    install();
    let task = Lazy::new(checked(0));
    let payload = catch_unwind(AssertUnwindSafe(|| task.resume())).unwrap_err();
    assert_eq!(message(&payload), "input must be positive");
    assert!(task.done());
}

#[test]
fn rethrow_unwinds_out_of_construction() {
    install();
    let payload = catch_unwind(|| Immediate::new(checked(0))).unwrap_err();
    assert_eq!(message(&payload), "input must be positive");
}

#[test]
fn ignored_failures_vanish() {
    install();
    let reached = Rc::new(Cell::new(false));
    let flag = reached.clone();
    let mut task = BasicTask::<(), QuietTraits>::new(async move {
        flag.set(true);
        panic!("nobody hears this");
    });
    task.resume();
    assert!(reached.get());
    assert!(task.done());
    assert!(task.try_take_result().is_ok());
    task.take_result();
}

#[test]
fn ignored_failures_leave_other_results_empty() {
    install();
    let mut task = BasicTask::<i32, QuietTraits>::new(checked(0));
    task.resume();
    assert!(task.done());
    let payload = catch_unwind(AssertUnwindSafe(|| task.try_take_result())).unwrap_err();
    assert!(message(&payload).contains("empty result slot"));
}

#[test]
fn unit_task_replays_its_failure_once() {
    install();
    let mut task = Task::<()>::new(async {
        panic!("boom");
    });
    task.resume();
    assert!(task.done());

    let first = catch_unwind(AssertUnwindSafe(|| task.take_result())).unwrap_err();
    assert_eq!(message(&first), "boom");
    task.take_result();
    assert!(task.try_take_result().is_ok());
}

#[test]
fn failure_propagates_through_awaiters() {
    install();
    let mut outer = Task::new(async {
        let inner = Task::new(checked(0));
        inner.await * 2
    });
    outer.resume();
    assert!(outer.done());
    let failure = outer.try_take_result().unwrap_err();
    assert_eq!(failure.message(), "input must be positive");
}

#[test]
fn async_generator_defers_failures() {
    install();
    let mut generator = AsyncGenerator::new(|co| async move {
        co.yield_value(1).await;
        panic!("ran dry");
    });
    generator.resume();
    assert_eq!(generator.take_result(), Some(1));
    generator.resume();
    assert!(generator.done());
    let failure = generator.try_take_result().unwrap_err();
    assert_eq!(failure.message(), "ran dry");
    assert_eq!(generator.take_result(), None);
}

#[test]
fn generator_rethrows_from_next() {
    install();
    let mut generator = Generator::new(|co| async move {
        co.yield_value(1).await;
        panic!("ran dry");
    });
    assert_eq!(generator.next(), Some(1));
    let payload = catch_unwind(AssertUnwindSafe(|| generator.next())).unwrap_err();
    assert_eq!(message(&payload), "ran dry");
    assert!(generator.done());
    assert_eq!(generator.next(), None);
}

#[test]
fn failure_can_be_turned_back_into_a_panic() {
    install();
    let mut task = AutoTask::new(checked(0));
    let failure = task.try_take_result().unwrap_err();
    let payload = failure.into_panic();
    assert_eq!(message(&payload), "input must be positive");
}
