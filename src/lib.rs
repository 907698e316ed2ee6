//! # topicbus
//!
//! `topicbus` is an in-process, typed publish/subscribe library. Publishers
//! and subscribers attach to named topics carrying one payload type each,
//! without knowing about each other. There is no network and no persistence:
//! every subscriber owns a bounded queue, and receives can block, poll, time
//! out or wait for a deadline.
//!
//! ## Core Modules
//!
//! - `broker`: the topic registry, topics, publishers and subscribers.
//! - `shared`: a directory of named values shared between threads.
//! - `serializer`: binary and JSON codecs for payloads leaving the process.
//! - `config`: loading settings from files and the environment.
//! - `utils`: error type and logging bootstrap.
//!
//! ## Example
//!
//! ```rust
//! use topicbus::broker::{Publisher, Subscriber, TopicRegistry};
//!
//! let registry = TopicRegistry::new();
//! let subscriber = Subscriber::<u32>::new(&registry, "counter", 10);
//! let publisher = Publisher::<u32>::new(&registry, "counter");
//!
//! publisher.push(1);
//! publisher.push(2);
//! assert_eq!(subscriber.pop(), 1);
//! assert_eq!(subscriber.try_pop(), Some(2));
//! ```

pub mod broker;
pub mod config;
pub mod serializer;
pub mod shared;
pub mod utils;

pub use broker::{Payload, Publisher, Subscriber, Topic, TopicRegistry};
pub use utils::error::{BusError, Result};
