//! Publisher handle.
//!
//! A publisher is attached to exactly one topic for its lifetime and carries
//! no other state. Pushing never blocks on a subscriber: a full subscriber
//! queue drops its oldest message instead.

use std::sync::Arc;

use uuid::Uuid;

use crate::broker::payload::Payload;
use crate::broker::registry::TopicRegistry;
use crate::broker::topic::{PublisherId, Topic};

/// Sending end of a topic.
///
/// # Example
///
/// ```rust
/// use topicbus::broker::{Publisher, Subscriber, TopicRegistry};
///
/// let registry = TopicRegistry::new();
/// let a = Subscriber::<String>::new(&registry, "events", 8);
/// let b = Subscriber::<String>::new(&registry, "events", 8);
/// let publisher = Publisher::<String>::new(&registry, "events");
///
/// assert_eq!(publisher.push("started".to_string()), 2);
/// assert_eq!(a.pop(), "started");
/// assert_eq!(b.pop(), "started");
/// ```
pub struct Publisher<T: Payload> {
    id: PublisherId,
    topic: Arc<Topic<T>>,
}

impl<T: Payload> Publisher<T> {
    /// Attaches a new publisher to `topic_name`, creating the topic if needed.
    pub fn new(registry: &TopicRegistry, topic_name: &str) -> Self {
        let topic = registry.find_or_create::<T>(topic_name);
        Self::attach(topic)
    }

    pub(crate) fn attach(topic: Arc<Topic<T>>) -> Self {
        let id = Uuid::new_v4();
        topic.attach_publisher(id);
        Self { id, topic }
    }

    /// Sends `message` to every subscriber currently attached to the topic.
    ///
    /// Returns the number of subscribers that received it; with no
    /// subscribers this is a no-op returning `0`.
    pub fn push(&self, message: T) -> usize {
        self.topic.deliver(&message)
    }

    pub fn id(&self) -> PublisherId {
        self.id
    }

    pub fn topic(&self) -> &Arc<Topic<T>> {
        &self.topic
    }
}

impl<T: Payload> Drop for Publisher<T> {
    fn drop(&mut self) {
        self.topic.detach_publisher(&self.id);
    }
}

impl<T: Payload> std::fmt::Debug for Publisher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("id", &self.id)
            .field("topic", &self.topic.name())
            .finish()
    }
}
