use super::{Publisher, Subscriber, TopicRegistry};
use crate::config::BusSettings;

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_registry_new() {
    let registry = TopicRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.settings().default_queue_length, 16);
}

#[test]
fn test_create_topic() {
    let registry = TopicRegistry::new();
    let topic = registry.create::<u32>("numbers").unwrap();
    assert_eq!(topic.name(), "numbers");
    assert_eq!(topic.publisher_count(), 0);
    assert_eq!(topic.subscriber_count(), 0);
    assert!(registry.contains::<u32>("numbers"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_create_duplicate_topic_fails() {
    let registry = TopicRegistry::new();
    let first = registry.create::<u32>("numbers").unwrap();
    let _sub = Subscriber::attach(first.clone(), 4);

    let err = registry.create::<u32>("numbers").unwrap_err();
    assert!(err.is_already_exists());

    // the first topic is unaffected
    let found = registry.find::<u32>("numbers").unwrap();
    assert!(Arc::ptr_eq(&first, &found));
    assert_eq!(found.subscriber_count(), 1);
}

#[test]
fn test_find_missing_topic() {
    let registry = TopicRegistry::new();
    let err = registry.find::<u32>("missing").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_find_or_create_returns_same_topic() {
    let registry = TopicRegistry::new();
    let a = registry.find_or_create::<String>("log");
    let b = registry.find_or_create::<String>("log");
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_same_name_different_types_are_separate_topics() {
    let registry = TopicRegistry::new();
    registry.create::<u32>("x").unwrap();

    // another payload type neither collides with nor sees the u32 topic
    assert!(registry.find::<String>("x").unwrap_err().is_not_found());
    let text = registry.create::<String>("x").unwrap();
    assert_eq!(text.name(), "x");
    assert_eq!(registry.len(), 2);

    let numbers = Subscriber::<u32>::new(&registry, "x", 4);
    let strings = Subscriber::<String>::new(&registry, "x", 4);
    Publisher::<u32>::new(&registry, "x").push(7);

    assert_eq!(numbers.try_pop(), Some(7));
    assert_eq!(strings.try_pop(), None);
}

#[test]
fn test_delete_topic() {
    let registry = TopicRegistry::new();
    registry.create::<u32>("temp").unwrap();

    assert!(registry.delete::<u32>("temp"));
    assert!(!registry.contains::<u32>("temp"));
    assert!(registry.find::<u32>("temp").is_err());

    // deleting again, or under another type, is a no-op
    assert!(!registry.delete::<u32>("temp"));
    registry.create::<u32>("temp").unwrap();
    assert!(!registry.delete::<String>("temp"));
    assert!(registry.contains::<u32>("temp"));
}

#[test]
fn test_deleted_topic_keeps_serving_attached_handles() {
    let registry = TopicRegistry::new();
    let subscriber = Subscriber::<u32>::new(&registry, "orphan", 4);
    let publisher = Publisher::<u32>::new(&registry, "orphan");

    assert!(registry.delete::<u32>("orphan"));
    assert_eq!(publisher.push(1), 1);
    assert_eq!(subscriber.try_pop(), Some(1));

    // a new handle for the same name lands on a fresh topic
    let late = Publisher::<u32>::new(&registry, "orphan");
    assert!(!Arc::ptr_eq(late.topic(), subscriber.topic()));
    assert_eq!(late.push(2), 0);
    assert_eq!(subscriber.try_pop(), None);
}

#[test]
fn test_topic_names_per_type() {
    let registry = TopicRegistry::new();
    registry.create::<u32>("b").unwrap();
    registry.create::<u32>("a").unwrap();
    registry.create::<String>("c").unwrap();

    assert_eq!(registry.topic_names::<u32>(), vec!["a", "b"]);
    assert_eq!(registry.topic_names::<String>(), vec!["c"]);
    assert!(registry.topic_names::<bool>().is_empty());
}

#[test]
fn test_handles_attach_and_detach() {
    let registry = TopicRegistry::new();
    let publisher = Publisher::<u32>::new(&registry, "members");
    let subscriber = Subscriber::<u32>::new(&registry, "members", 1);
    let topic = registry.find::<u32>("members").unwrap();

    assert_eq!(topic.publisher_count(), 1);
    assert_eq!(topic.subscriber_count(), 1);

    drop(subscriber);
    assert_eq!(topic.subscriber_count(), 0);
    assert_eq!(publisher.push(1), 0);

    drop(publisher);
    assert_eq!(topic.publisher_count(), 0);

    // topics persist with zero members
    assert!(registry.contains::<u32>("members"));
}

#[test]
fn test_fifo_per_subscriber() {
    let registry = TopicRegistry::new();
    let subscriber = Subscriber::<i32>::new(&registry, "fifo", 10);
    let publisher = Publisher::<i32>::new(&registry, "fifo");

    publisher.push(1);
    publisher.push(2);
    publisher.push(3);

    assert_eq!(subscriber.pop(), 1);
    assert_eq!(subscriber.pop(), 2);
    assert_eq!(subscriber.pop(), 3);
    assert!(subscriber.is_empty());
}

#[test]
fn test_drop_oldest_when_full() {
    let registry = TopicRegistry::new();
    let subscriber = Subscriber::<i32>::new(&registry, "bounded", 2);
    let publisher = Publisher::<i32>::new(&registry, "bounded");

    publisher.push(1);
    publisher.push(2);
    publisher.push(3);

    assert_eq!(subscriber.len(), 2);
    assert_eq!(subscriber.dropped(), 1);
    assert_eq!(subscriber.pop(), 2);
    assert_eq!(subscriber.pop(), 3);
    assert_eq!(subscriber.try_pop(), None);
}

#[test]
fn test_unbounded_queue() {
    let registry = TopicRegistry::new();
    let subscriber = Subscriber::<usize>::new(&registry, "unbounded", 0);
    let publisher = Publisher::<usize>::new(&registry, "unbounded");

    const N: usize = 10_000;
    for i in 0..N {
        publisher.push(i);
    }

    assert_eq!(subscriber.len(), N);
    assert_eq!(subscriber.dropped(), 0);
    for i in 0..N {
        assert_eq!(subscriber.try_pop(), Some(i));
    }
}

#[test]
fn test_fan_out_to_every_subscriber() {
    let registry = TopicRegistry::new();
    let a = Subscriber::<String>::new(&registry, "fanout", 4);
    let b = Subscriber::<String>::new(&registry, "fanout", 4);
    let publisher = Publisher::<String>::new(&registry, "fanout");

    assert_eq!(publisher.push("hello".to_string()), 2);

    assert_eq!(a.try_pop().as_deref(), Some("hello"));
    assert_eq!(a.try_pop(), None);
    assert_eq!(b.try_pop().as_deref(), Some("hello"));
}

#[test]
fn test_push_without_subscribers() {
    let registry = TopicRegistry::new();
    let publisher = Publisher::<u8>::new(&registry, "void");
    assert_eq!(publisher.push(1), 0);
}

#[test]
fn test_subscriber_only_sees_messages_after_attach() {
    let registry = TopicRegistry::new();
    let publisher = Publisher::<u8>::new(&registry, "late");
    publisher.push(1);

    let subscriber = Subscriber::<u8>::new(&registry, "late", 4);
    publisher.push(2);

    assert_eq!(subscriber.try_pop(), Some(2));
    assert_eq!(subscriber.try_pop(), None);
}

#[test]
fn test_try_pop_on_empty_queue() {
    let registry = TopicRegistry::new();
    let subscriber = Subscriber::<u8>::new(&registry, "empty", 4);
    assert_eq!(subscriber.try_pop(), None);
}

#[test]
fn test_pop_blocks_until_publish() {
    let registry = Arc::new(TopicRegistry::new());
    let subscriber = Arc::new(Subscriber::<u64>::new(&registry, "wake", 4));
    let ready = Arc::new(Barrier::new(2));

    let waiter = {
        let subscriber = subscriber.clone();
        let ready = ready.clone();
        thread::spawn(move || {
            ready.wait();
            subscriber.pop()
        })
    };

    ready.wait();
    let publisher = Publisher::<u64>::new(&registry, "wake");
    publisher.push(42);

    assert_eq!(waiter.join().unwrap(), 42);
}

#[test]
fn test_pop_for_times_out() {
    let registry = TopicRegistry::new();
    let subscriber = Subscriber::<u8>::new(&registry, "quiet", 4);

    let timeout = Duration::from_millis(50);
    let start = Instant::now();
    assert_eq!(subscriber.pop_for(timeout), None);
    assert!(start.elapsed() >= timeout);
}

#[test]
fn test_pop_for_returns_queued_message_immediately() {
    let registry = TopicRegistry::new();
    let subscriber = Subscriber::<u8>::new(&registry, "ready", 4);
    Publisher::<u8>::new(&registry, "ready").push(9);

    assert_eq!(subscriber.pop_for(Duration::from_secs(5)), Some(9));
}

#[test]
fn test_pop_for_receives_message_from_other_thread() {
    let registry = Arc::new(TopicRegistry::new());
    let subscriber = Subscriber::<u8>::new(&registry, "timed", 4);

    let producer = {
        let registry = registry.clone();
        thread::spawn(move || {
            let publisher = Publisher::<u8>::new(&registry, "timed");
            thread::sleep(Duration::from_millis(20));
            publisher.push(5);
        })
    };

    assert_eq!(subscriber.pop_for(Duration::from_secs(10)), Some(5));
    producer.join().unwrap();
}

#[test]
fn test_pop_until_deadline() {
    let registry = TopicRegistry::new();
    let subscriber = Subscriber::<u8>::new(&registry, "deadline", 4);

    let deadline = Instant::now() + Duration::from_millis(30);
    assert_eq!(subscriber.pop_until(deadline), None);
    assert!(Instant::now() >= deadline);

    // a deadline already in the past still drains a queued message
    Publisher::<u8>::new(&registry, "deadline").push(1);
    assert_eq!(subscriber.pop_until(deadline), Some(1));
}

#[test]
fn test_pop_for_huge_timeout_does_not_overflow() {
    let registry = TopicRegistry::new();
    let subscriber = Subscriber::<u8>::new(&registry, "forever", 4);
    Publisher::<u8>::new(&registry, "forever").push(3);

    assert_eq!(subscriber.pop_for(Duration::MAX), Some(3));
}

#[test]
fn test_close_wakes_waiting_recv() {
    let registry = TopicRegistry::new();
    let subscriber = Arc::new(Subscriber::<u8>::new(&registry, "closing", 4));
    let ready = Arc::new(Barrier::new(2));

    let waiter = {
        let subscriber = subscriber.clone();
        let ready = ready.clone();
        thread::spawn(move || {
            ready.wait();
            subscriber.recv()
        })
    };

    ready.wait();
    thread::sleep(Duration::from_millis(20));
    subscriber.close();

    let result = waiter.join().unwrap();
    assert!(matches!(result, Err(crate::utils::error::BusError::Closed)));
    assert!(subscriber.is_closed());
}

#[test]
fn test_closed_subscriber_drains_then_rejects() {
    let registry = TopicRegistry::new();
    let subscriber = Subscriber::<u8>::new(&registry, "drain", 4);
    let publisher = Publisher::<u8>::new(&registry, "drain");

    publisher.push(1);
    subscriber.close();
    assert_eq!(publisher.push(2), 0);

    assert_eq!(subscriber.recv().unwrap(), 1);
    assert!(subscriber.recv().is_err());
    assert_eq!(subscriber.pop_for(Duration::from_secs(5)), None);
}

#[test]
fn test_subscriber_default_uses_settings() {
    let registry = TopicRegistry::with_settings(BusSettings {
        default_queue_length: 3,
    });
    let subscriber = registry.subscriber_default::<u8>("configured");
    assert_eq!(subscriber.capacity(), 3);

    let publisher = registry.publisher::<u8>("configured");
    for i in 0..5 {
        publisher.push(i);
    }
    assert_eq!(subscriber.dropped(), 2);
    assert_eq!(subscriber.try_pop(), Some(2));
}

#[test]
fn test_concurrent_find_or_create_shares_one_topic() {
    let registry = Arc::new(TopicRegistry::new());
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                registry.find_or_create::<u32>("race")
            })
        })
        .collect();

    let topics: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(topics.iter().all(|t| Arc::ptr_eq(t, &topics[0])));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_global_registry_is_shared() {
    let a = TopicRegistry::global().find_or_create::<u128>("broker-tests-global");
    let b = TopicRegistry::global().find::<u128>("broker-tests-global").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}
