//! The typed publish/subscribe core.
//!
//! - `registry`: the directory of topics, one namespace per payload type.
//! - `topic`: per-name fan-out hub tracking attached publishers and subscribers.
//! - `publisher` / `subscriber`: the handles applications hold.
//! - `payload`: the bound every message type satisfies.

pub mod payload;
pub mod publisher;
pub mod registry;
pub mod subscriber;
pub mod topic;

pub use payload::Payload;
pub use publisher::Publisher;
pub use registry::TopicRegistry;
pub use subscriber::Subscriber;
pub use topic::{PublisherId, SubscriberId, Topic};

#[cfg(test)]
mod tests;
