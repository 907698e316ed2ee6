//! Subscriber handle and its bounded receive queue.
//!
//! Every subscriber owns a mailbox: a FIFO queue, a condition variable
//! that wakes blocked receivers, a closed flag and a counter of messages lost
//! to overflow. Publishers reach the mailbox through the topic's weak
//! reference and append to it under the mailbox lock.
//!
//! Overflow policy is drop-oldest: with a capacity of `n > 0`, writing to a
//! full queue evicts the oldest message first. A capacity of `0` means the
//! queue is unbounded. Publishers are never told about evictions and never
//! wait on a full queue; the subscriber can read the count via
//! [`Subscriber::dropped`].

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::trace;
use uuid::Uuid;

use crate::broker::payload::Payload;
use crate::broker::registry::TopicRegistry;
use crate::broker::topic::{SubscriberId, Topic};
use crate::utils::error::{BusError, Result};

struct MailboxState<T> {
    queue: VecDeque<T>,
    closed: bool,
}

pub(crate) struct Mailbox<T> {
    state: Mutex<MailboxState<T>>,
    ready: Condvar,
    capacity: usize,
    dropped: AtomicU64,
}

impl<T> Mailbox<T> {
    fn new(capacity: usize) -> Self {
        let queue = if capacity > 0 {
            VecDeque::with_capacity(capacity)
        } else {
            VecDeque::new()
        };

        Self {
            state: Mutex::new(MailboxState {
                queue,
                closed: false,
            }),
            ready: Condvar::new(),
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Appends `message`, evicting the oldest one when the queue is full.
    ///
    /// Returns `false` if the mailbox is closed and the message was discarded.
    pub(crate) fn write(&self, message: T) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }

        if self.capacity > 0 && state.queue.len() >= self.capacity {
            state.queue.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        state.queue.push_back(message);
        true
    }

    pub(crate) fn notify_one(&self) {
        self.ready.notify_one();
    }

    fn close(&self) {
        self.state.lock().closed = true;
        self.ready.notify_all();
    }

    fn try_pop(&self) -> Option<T> {
        self.state.lock().queue.pop_front()
    }

    /// Waits until a message is queued, the mailbox is closed, or `deadline`
    /// passes, then takes the oldest message if there is one.
    ///
    /// `None` as deadline waits without bound. The predicate is re-checked on
    /// every wake, so spurious wakeups are harmless.
    fn pop_within(&self, deadline: Option<Instant>) -> Option<T> {
        let mut state = self.state.lock();
        let idle = |s: &mut MailboxState<T>| s.queue.is_empty() && !s.closed;

        match deadline {
            Some(deadline) => {
                let _ = self.ready.wait_while_until(&mut state, idle, deadline);
            }
            None => self.ready.wait_while(&mut state, idle),
        }

        state.queue.pop_front()
    }

    /// Waits without bound for a message, ignoring the closed flag.
    fn pop_blocking(&self) -> T {
        let mut state = self.state.lock();
        loop {
            if let Some(message) = state.queue.pop_front() {
                return message;
            }
            self.ready.wait(&mut state);
        }
    }

    fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

/// Receiving end of a topic.
///
/// Created bound to a topic name (the topic is created if it does not exist)
/// and attached to it until dropped. Receive calls take `&self`, so a
/// subscriber can be shared between threads behind an `Arc`; it can only be
/// dropped once no thread is inside one of its receive calls.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use topicbus::broker::{Publisher, Subscriber, TopicRegistry};
///
/// let registry = TopicRegistry::new();
/// let subscriber = Subscriber::<u32>::new(&registry, "ticks", 2);
/// let publisher = Publisher::<u32>::new(&registry, "ticks");
///
/// publisher.push(1);
/// publisher.push(2);
/// publisher.push(3);
///
/// assert_eq!(subscriber.try_pop(), Some(2));
/// assert_eq!(subscriber.pop(), 3);
/// assert_eq!(subscriber.pop_for(Duration::from_millis(5)), None);
/// ```
pub struct Subscriber<T: Payload> {
    id: SubscriberId,
    mailbox: Arc<Mailbox<T>>,
    topic: Arc<Topic<T>>,
}

impl<T: Payload> Subscriber<T> {
    /// Attaches a new subscriber to `topic_name` with a queue of `capacity`
    /// messages (`0` for unbounded).
    pub fn new(registry: &TopicRegistry, topic_name: &str, capacity: usize) -> Self {
        let topic = registry.find_or_create::<T>(topic_name);
        Self::attach(topic, capacity)
    }

    pub(crate) fn attach(topic: Arc<Topic<T>>, capacity: usize) -> Self {
        let id = Uuid::new_v4();
        let mailbox = Arc::new(Mailbox::new(capacity));
        topic.attach_subscriber(id, &mailbox);

        Self { id, mailbox, topic }
    }

    /// Blocks until a message is available and returns the oldest one.
    ///
    /// This call ignores [`Subscriber::close`]: on a subscriber that may be
    /// closed while waiting, use [`Subscriber::recv`] instead.
    pub fn pop(&self) -> T {
        self.mailbox.pop_blocking()
    }

    /// Blocks until a message is available or the subscriber is closed.
    ///
    /// Messages queued before closing are still returned; once the queue is
    /// drained a closed subscriber yields [`BusError::Closed`].
    pub fn recv(&self) -> Result<T> {
        self.mailbox.pop_within(None).ok_or(BusError::Closed)
    }

    /// Returns the oldest message without waiting.
    pub fn try_pop(&self) -> Option<T> {
        self.mailbox.try_pop()
    }

    /// Waits up to `timeout` for a message.
    pub fn pop_for(&self, timeout: Duration) -> Option<T> {
        // a timeout too large to represent waits forever
        self.mailbox.pop_within(Instant::now().checked_add(timeout))
    }

    /// Waits until `deadline` for a message.
    pub fn pop_until(&self, deadline: Instant) -> Option<T> {
        self.mailbox.pop_within(Some(deadline))
    }

    /// Stops accepting messages and wakes every waiting receiver.
    ///
    /// Already queued messages can still be received. The subscriber stays
    /// attached to its topic until it is dropped.
    pub fn close(&self) {
        self.mailbox.close();
        trace!(topic = %self.topic.name(), subscriber = %self.id, "subscriber closed");
    }

    pub fn is_closed(&self) -> bool {
        self.mailbox.is_closed()
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.mailbox.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queue capacity; `0` means unbounded.
    pub fn capacity(&self) -> usize {
        self.mailbox.capacity
    }

    /// Messages evicted so far because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.mailbox.dropped.load(Ordering::Relaxed)
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn topic(&self) -> &Arc<Topic<T>> {
        &self.topic
    }
}

impl<T: Payload> Drop for Subscriber<T> {
    fn drop(&mut self) {
        self.mailbox.close();
        self.topic.detach_subscriber(&self.id);
    }
}

impl<T: Payload> std::fmt::Debug for Subscriber<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("topic", &self.topic.name())
            .field("capacity", &self.mailbox.capacity)
            .field("queued", &self.len())
            .finish()
    }
}
