use serde::Serialize;
use serde::de::DeserializeOwned;

use super::Serializer;
use crate::utils::error::{BusError, Result};

/// JSON text serializer backed by `serde_json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A serializer producing indented output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl<T> Serializer<T> for JsonSerializer
where
    T: Serialize + DeserializeOwned,
{
    type Encoded = String;

    fn serialize(&self, value: &T) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        text.map_err(BusError::serialization)
    }

    fn deserialize(&self, encoded: &String) -> Result<T> {
        serde_json::from_str(encoded).map_err(BusError::serialization)
    }
}
