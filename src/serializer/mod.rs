//! Payload serializers.
//!
//! The messaging core moves typed values between threads and never encodes
//! them. Serializers exist for the edges where a payload has to leave the
//! process (a file, a socket, another runtime): they turn a typed value into a
//! transport-ready representation and back.
//!
//! - [`BinarySerializer`]: compact binary with fixed-width integers. For flat
//!   payloads (numbers, fixed arrays, plain structs of those) every value of a
//!   type encodes to the same number of bytes.
//! - [`JsonSerializer`]: JSON text, for anything implementing serde's traits.

pub mod binary;
pub mod json;

pub use binary::BinarySerializer;
pub use json::JsonSerializer;

use crate::utils::error::Result;

/// Converts values of `T` to an encoded form and back.
pub trait Serializer<T> {
    type Encoded;

    fn serialize(&self, value: &T) -> Result<Self::Encoded>;

    fn deserialize(&self, encoded: &Self::Encoded) -> Result<T>;
}
