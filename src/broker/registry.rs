//! Topic registry
//!
//! The registry is the directory of live topics. Entries are keyed by the
//! payload type and the topic name, so every payload type has its own
//! namespace: `"status"` carrying `u32` and `"status"` carrying `String` are
//! two unrelated topics.
//!
//! Concurrency and usage notes:
//! - One mutex guards the directory. It is held only while looking up,
//!   inserting or removing entries and is never held during delivery.
//! - `find_or_create` performs the lookup and the insertion under the same
//!   lock acquisition, so concurrent callers always share one topic.
//! - Deleting a topic does not detach its publishers and subscribers. They keep
//!   working on the detached topic until they are dropped, but new handles for
//!   the same name get a fresh topic.
//! - Registries are plain values: construct one per test or per subsystem and
//!   pass it by reference. [`TopicRegistry::global`] exists for code that wants
//!   a single process-wide directory.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::broker::payload::Payload;
use crate::broker::publisher::Publisher;
use crate::broker::subscriber::Subscriber;
use crate::broker::topic::Topic;
use crate::config::BusSettings;
use crate::utils::error::{BusError, Result};

type TopicKey = (TypeId, String);
type TopicMap = HashMap<TopicKey, Arc<dyn Any + Send + Sync>>;

static GLOBAL: Lazy<TopicRegistry> = Lazy::new(TopicRegistry::new);

pub struct TopicRegistry {
    topics: Mutex<TopicMap>,
    settings: BusSettings,
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::with_settings(BusSettings::default())
    }

    pub fn with_settings(settings: BusSettings) -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
            settings,
        }
    }

    /// The process-wide registry, created on first use.
    pub fn global() -> &'static TopicRegistry {
        &GLOBAL
    }

    pub fn settings(&self) -> &BusSettings {
        &self.settings
    }

    /// Creates topic `name` for payload type `T`.
    ///
    /// Fails with [`BusError::AlreadyExists`] if the topic is already
    /// registered for `T`; the existing topic is left untouched.
    pub fn create<T: Payload>(&self, name: &str) -> Result<Arc<Topic<T>>> {
        let mut topics = self.topics.lock();
        Self::create_locked(&mut topics, name)
    }

    /// Returns topic `name` for payload type `T`.
    ///
    /// Fails with [`BusError::NotFound`] if no such topic exists for `T`, even
    /// when the name is in use by another payload type.
    pub fn find<T: Payload>(&self, name: &str) -> Result<Arc<Topic<T>>> {
        let topics = self.topics.lock();
        Self::find_locked(&topics, name).ok_or_else(|| BusError::topic_not_found(name))
    }

    /// Returns topic `name` for `T`, creating it if it does not exist.
    pub fn find_or_create<T: Payload>(&self, name: &str) -> Arc<Topic<T>> {
        let mut topics = self.topics.lock();

        match Self::find_locked(&topics, name) {
            Some(topic) => topic,
            None => Self::insert_locked(&mut topics, name),
        }
    }

    /// Removes topic `name` for `T`. Returns `false` if there was none.
    pub fn delete<T: Payload>(&self, name: &str) -> bool {
        let removed = self.topics.lock().remove(&Self::key::<T>(name));

        let Some(entry) = removed else {
            return false;
        };

        if let Ok(topic) = entry.downcast::<Topic<T>>() {
            let (publishers, subscribers) = (topic.publisher_count(), topic.subscriber_count());
            if publishers > 0 || subscribers > 0 {
                warn!(
                    topic = name,
                    publishers, subscribers, "deleted topic still has attached handles"
                );
            }
        }

        debug!(topic = name, payload = std::any::type_name::<T>(), "topic deleted");
        true
    }

    pub fn contains<T: Payload>(&self, name: &str) -> bool {
        self.topics.lock().contains_key(&Self::key::<T>(name))
    }

    /// Names of all topics registered for `T`, sorted.
    pub fn topic_names<T: Payload>(&self) -> Vec<String> {
        let type_id = TypeId::of::<T>();
        let mut names: Vec<String> = self
            .topics
            .lock()
            .keys()
            .filter(|(id, _)| *id == type_id)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Number of topics across all payload types.
    pub fn len(&self) -> usize {
        self.topics.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shorthand for [`Publisher::new`].
    pub fn publisher<T: Payload>(&self, name: &str) -> Publisher<T> {
        Publisher::attach(self.find_or_create(name))
    }

    /// Shorthand for [`Subscriber::new`].
    pub fn subscriber<T: Payload>(&self, name: &str, capacity: usize) -> Subscriber<T> {
        Subscriber::attach(self.find_or_create(name), capacity)
    }

    /// A subscriber with the configured default queue length.
    pub fn subscriber_default<T: Payload>(&self, name: &str) -> Subscriber<T> {
        self.subscriber(name, self.settings.default_queue_length)
    }

    fn key<T: Payload>(name: &str) -> TopicKey {
        (TypeId::of::<T>(), name.to_string())
    }

    fn find_locked<T: Payload>(topics: &TopicMap, name: &str) -> Option<Arc<Topic<T>>> {
        topics
            .get(&Self::key::<T>(name))
            .and_then(|entry| entry.clone().downcast::<Topic<T>>().ok())
    }

    fn create_locked<T: Payload>(topics: &mut TopicMap, name: &str) -> Result<Arc<Topic<T>>> {
        if topics.contains_key(&Self::key::<T>(name)) {
            return Err(BusError::topic_exists(name));
        }
        Ok(Self::insert_locked(topics, name))
    }

    fn insert_locked<T: Payload>(topics: &mut TopicMap, name: &str) -> Arc<Topic<T>> {
        let topic = Arc::new(Topic::<T>::new(name));
        topics.insert(Self::key::<T>(name), topic.clone());
        debug!(topic = name, payload = std::any::type_name::<T>(), "topic created");
        topic
    }
}

impl std::fmt::Debug for TopicRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicRegistry")
            .field("topics", &self.len())
            .field("settings", &self.settings)
            .finish()
    }
}
