//! Topic membership
//!
//! A `Topic` is the fan-out hub for one name and one payload type. It stores
//! no messages: it only knows which publishers and subscribers are attached.
//!
//! Publishers are tracked by id. Subscribers are tracked by id together with a
//! weak reference to their mailbox, so a topic never keeps a subscriber's
//! queue alive and there is no reference cycle between the two.
//!
//! The publisher set and the subscriber map have separate locks: publisher
//! attach/detach never contends with subscriber attach/detach or delivery.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::broker::payload::Payload;
use crate::broker::subscriber::Mailbox;

pub type PublisherId = Uuid;
pub type SubscriberId = Uuid;

pub struct Topic<T: Payload> {
    name: Arc<str>,
    publishers: Mutex<HashSet<PublisherId>>,
    subscribers: Mutex<HashMap<SubscriberId, Weak<Mailbox<T>>>>,
}

impl<T: Payload> Topic<T> {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            publishers: Mutex::new(HashSet::new()),
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    /// The name this topic was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of publishers currently attached.
    pub fn publisher_count(&self) -> usize {
        self.publishers.lock().len()
    }

    /// Number of subscribers currently attached.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub(crate) fn attach_publisher(&self, id: PublisherId) {
        self.publishers.lock().insert(id);
        debug!(topic = %self.name, publisher = %id, "publisher attached");
    }

    pub(crate) fn detach_publisher(&self, id: &PublisherId) {
        if self.publishers.lock().remove(id) {
            debug!(topic = %self.name, publisher = %id, "publisher detached");
        }
    }

    pub(crate) fn attach_subscriber(&self, id: SubscriberId, mailbox: &Arc<Mailbox<T>>) {
        self.subscribers.lock().insert(id, Arc::downgrade(mailbox));
        debug!(topic = %self.name, subscriber = %id, "subscriber attached");
    }

    pub(crate) fn detach_subscriber(&self, id: &SubscriberId) {
        if self.subscribers.lock().remove(id).is_some() {
            debug!(topic = %self.name, subscriber = %id, "subscriber detached");
        }
    }

    /// Hands a copy of `message` to every attached subscriber.
    ///
    /// The subscriber map stays locked for the whole pass, so membership cannot
    /// change mid-delivery. Each write only takes that subscriber's queue lock.
    /// Returns how many subscribers received the message.
    pub(crate) fn deliver(&self, message: &T) -> usize {
        let subscribers = self.subscribers.lock();
        let mut delivered = 0;

        for mailbox in subscribers.values().filter_map(Weak::upgrade) {
            if mailbox.write(message.clone()) {
                mailbox.notify_one();
                delivered += 1;
            }
        }

        trace!(topic = %self.name, delivered, "message fanned out");
        delivered
    }
}

impl<T: Payload> std::fmt::Debug for Topic<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.name)
            .field("publishers", &self.publisher_count())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
