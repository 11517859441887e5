//! Property tests for the stream algebra.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use proptest::prelude::*;
use reckoner::{Collector, Event, Owner};

#[derive(Debug, Clone)]
enum Op {
    Source(i32),
    Trigger,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![any::<i32>().prop_map(Op::Source), Just(Op::Trigger)]
}

fn mix(acc: i64, value: i32) -> i64 {
    acc.wrapping_mul(31).wrapping_add(i64::from(value))
}

proptest! {
    #[test]
    fn map_value_is_f_of_last_fire(values in proptest::collection::vec(any::<i32>(), 1..40)) {
        let source: Event<i32> = Event::new();
        let mapped = source.map(|v| v.wrapping_mul(3).wrapping_add(1));

        for v in values {
            source.fire(v);
            prop_assert_eq!(mapped.value(), Some(v.wrapping_mul(3).wrapping_add(1)));
        }
    }

    #[test]
    fn filter_updates_only_when_predicate_holds(values in proptest::collection::vec(any::<i32>(), 0..40)) {
        let source: Event<i32> = Event::new();
        let evens = source.filter(|v| v % 2 == 0);

        let mut expected = None;
        for v in values {
            source.fire(v);
            if v % 2 == 0 {
                expected = Some(v);
            }
            prop_assert_eq!(evens.value(), expected);
        }
    }

    #[test]
    fn reduce_is_a_left_fold(seed in any::<i64>(), values in proptest::collection::vec(any::<i32>(), 0..40)) {
        let source: Event<i32> = Event::new();
        let folded = source.reduce(|acc: &i64, v: &i32| mix(*acc, *v), seed);
        prop_assert_eq!(folded.value(), Some(seed));

        for v in &values {
            source.fire(*v);
        }
        let expected = values.iter().fold(seed, |acc, v| mix(acc, *v));
        prop_assert_eq!(folded.value(), Some(expected));
    }

    #[test]
    fn tag_samples_once_per_trigger(ops in proptest::collection::vec(op(), 0..60)) {
        let source: Event<i32> = Event::new();
        let trigger: Event<()> = Event::new();
        let sampled = source.tag(&trigger);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        sampled.subscribe(move |sample| sink.borrow_mut().push(*sample));

        let mut expected = Vec::new();
        let mut current = None;
        for op in ops {
            match op {
                Op::Source(v) => {
                    source.fire(v);
                    current = Some(v);
                }
                Op::Trigger => {
                    trigger.fire(());
                    expected.push(current);
                }
            }
        }
        prop_assert_eq!(seen.borrow().clone(), expected);
    }

    #[test]
    fn collector_folds_in_chronological_order(
        seed in any::<i64>(),
        fires in proptest::collection::vec((any::<bool>(), any::<i32>()), 0..60),
    ) {
        let left: Event<i32> = Event::new();
        let right: Event<i32> = Event::new();
        let collector = Collector::new(|acc: &i64, v: &i32| mix(*acc, *v), seed);
        collector.collect(&left);
        collector.collect(&right);

        for (to_left, v) in &fires {
            if *to_left { left.fire(*v) } else { right.fire(*v) }
        }

        let expected = fires.iter().fold(seed, |acc, (_, v)| mix(acc, *v));
        prop_assert_eq!(collector.state(), expected);
    }

    #[test]
    fn owner_dispose_removes_every_link(count in 1usize..20) {
        let source: Event<u8> = Event::new();
        let owner = Owner::detached();
        owner.run(|| {
            for i in 0..count {
                if i % 2 == 0 {
                    source.subscribe(|_| {});
                } else {
                    source.map(|v| v.wrapping_add(1)).subscribe(|_| {});
                }
            }
        });
        prop_assert_eq!(source.subscriber_count(), count);

        owner.dispose();
        prop_assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn panicking_subscriber_does_not_stop_others(total in 2usize..10, bad in 0usize..10) {
        let bad = bad % total;
        let source: Event<u32> = Event::new();
        let delivered = Rc::new(Cell::new(0));

        for i in 0..total {
            let delivered = delivered.clone();
            source.subscribe(move |_| {
                if i == bad {
                    panic!("subscriber {i} failed");
                }
                delivered.set(delivered.get() + 1);
            });
        }

        let result = source.try_fire(7);
        prop_assert_eq!(delivered.get(), total - 1);
        let error = result.unwrap_err();
        prop_assert_eq!(error.faults().len(), 1);
        prop_assert!(error.faults()[0].message().contains("failed"));
    }
}
