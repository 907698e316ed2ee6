use serde::Serialize;
use serde::de::DeserializeOwned;

use super::Serializer;
use crate::utils::error::{BusError, Result};

/// Binary serializer backed by `bincode`'s default (fixed-width, little
/// endian) encoding.
///
/// Meant for flat payloads: for those the encoded length is a property of the
/// type, see [`BinarySerializer::encoded_len`]. Variable-length fields
/// (strings, vectors) are accepted but are length-prefixed.
#[derive(Debug, Default, Clone, Copy)]
pub struct BinarySerializer;

impl BinarySerializer {
    pub fn new() -> Self {
        Self
    }

    /// Number of bytes `value` encodes to.
    pub fn encoded_len<T: Serialize>(&self, value: &T) -> Result<usize> {
        let len = bincode::serialized_size(value).map_err(BusError::serialization)?;
        usize::try_from(len).map_err(BusError::serialization)
    }
}

impl<T> Serializer<T> for BinarySerializer
where
    T: Serialize + DeserializeOwned,
{
    type Encoded = Vec<u8>;

    fn serialize(&self, value: &T) -> Result<Vec<u8>> {
        bincode::serialize(value).map_err(BusError::serialization)
    }

    fn deserialize(&self, encoded: &Vec<u8>) -> Result<T> {
        bincode::deserialize(encoded).map_err(BusError::serialization)
    }
}
