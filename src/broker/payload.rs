//! Payload bound for messages carried by a topic.
//!
//! A topic delivers its own copy of every message to each attached subscriber,
//! so payloads must be `Clone`. They cross threads inside subscriber queues,
//! so they must be `Send`, and they are stored in a type-erased registry, so
//! they must be `'static`.

/// Marker for types that can be published on a topic.
///
/// Implemented automatically for every `Clone + Send + 'static` type.
///
/// # Example
///
/// ```rust
/// use topicbus::broker::Payload;
///
/// #[derive(Clone)]
/// struct Reading {
///     sensor: u16,
///     celsius: f32,
/// }
///
/// fn assert_payload<T: Payload>() {}
/// assert_payload::<Reading>();
/// ```
pub trait Payload: Clone + Send + 'static {}

impl<T: Clone + Send + 'static> Payload for T {}
