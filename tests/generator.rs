use cotask::{
    suspend, AsyncGenerator, AutoTask, BasicGenerator, CoroutineTraits, Generator, Retrieve, Task,
};

fn install() {
    #[cfg(not(miri))]
    {
        dotenv::dotenv().ok();
    }
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fibonacci() -> Generator<u64> {
    Generator::new(|co| async move {
        let mut a0 = 1;
        let mut a1 = 1;
        loop {
            co.yield_value(a0).await;
            co.yield_value(a1).await;
            a0 += a1;
            a1 += a0;
        }
    })
}

fn async_fib() -> AsyncGenerator<u64> {
    AsyncGenerator::new(|co| async move {
        let mut fib = fibonacci();
        while let Some(value) = fib.next_value().await {
            co.yield_value(value).await;
        }
    })
}

fn get_seq<Tr>(mut generator: BasicGenerator<u64, Tr>, rounds: usize) -> AutoTask<String>
where
    Tr: CoroutineTraits,
    Tr::Retrieval: Retrieve<u64>,
{
    AutoTask::new(async move {
        let mut seq = Vec::with_capacity(rounds);
        for _ in 0..rounds {
            let value = generator.next_value().await.unwrap();
            seq.push(value.to_string());
        }
        seq.join(" ")
    })
}

#[test]
fn fibonacci_generator() {
    install();
    let mut fib_seq = get_seq(fibonacci(), 7);
    assert!(fib_seq.done());
    assert_eq!(fib_seq.take_result(), "1 1 2 3 5 8 13");
}

#[test]
fn fibonacci_generator_called_once_or_never() {
    install();
    let mut none = get_seq(fibonacci(), 0);
    assert!(none.poll_ready());
    assert_eq!(none.take_result(), "");

    let mut once = get_seq(fibonacci(), 1);
    assert!(once.poll_ready());
    assert_eq!(once.take_result(), "1");
}

#[test]
fn fibonacci_without_await() {
    install();
    let mut fib = fibonacci();
    for expected in [1, 1, 2, 3, 5] {
        fib.resume();
        assert!(!fib.done());
        assert_eq!(fib.take_result(), Some(expected));
    }
}

#[test]
fn fibonacci_as_iterator() {
    install();
    let seq: Vec<u64> = fibonacci().take(7).collect();
    assert_eq!(seq, [1, 1, 2, 3, 5, 8, 13]);
}

#[test]
fn async_generator() {
    install();
    let mut fib_seq = get_seq(async_fib(), 7);
    assert!(fib_seq.done());
    assert_eq!(fib_seq.take_result(), "1 1 2 3 5 8 13");

    let mut none = get_seq(async_fib(), 0);
    assert_eq!(none.take_result(), "");
}

#[test]
fn awaiting_a_finished_generator_resolves_to_none() {
    install();
    let mut count = AutoTask::new(async {
        let mut pair = Generator::new(|co| async move {
            co.yield_value(1).await;
            co.yield_value(2).await;
        });
        let mut values = Vec::new();
        while let Some(value) = pair.next_value().await {
            values.push(value);
        }
        assert_eq!(pair.next_value().await, None);
        values
    });
    assert!(count.done());
    assert_eq!(count.take_result(), [1, 2]);
}

#[test]
fn awaiting_a_generator_parked_at_a_yield() {
    install();
    let mut numbers = AsyncGenerator::new(|co| async move {
        co.yield_value(1).await;
        co.yield_value(2).await;
    });
    numbers.resume();
    assert_eq!(numbers.take_result(), Some(1));

    let mut rest = AutoTask::new(async move {
        let mut rest = Vec::new();
        while let Some(value) = numbers.next_value().await {
            rest.push(value);
        }
        rest
    });
    assert!(rest.done());
    assert_eq!(rest.take_result(), [2]);
}

#[test]
fn awaiting_a_generator_parked_elsewhere_panics() {
    install();
    let mut numbers = AsyncGenerator::new(|co| async move {
        Task::new(suspend()).await;
        co.yield_value(1).await;
    });
    numbers.resume();
    assert!(!numbers.done());

    let mut waiter = Task::new(async move { numbers.next_value().await });
    waiter.resume();
    assert!(waiter.done());
    let failure = waiter.try_take_result().unwrap_err();
    assert!(
        failure.message().contains("something other than a yield"),
        "{failure}"
    );
}
