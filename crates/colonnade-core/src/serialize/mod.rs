mod cbor;

use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error as ThisError;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),
    #[error("deserialize error: {0}")]
    Deserialize(String),
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        let class = match err {
            SerializeError::Serialize(_) => ErrorClass::Encoding,
            SerializeError::Deserialize(_) => ErrorClass::Corruption,
        };

        Self::new(class, ErrorOrigin::Codec, err.to_string())
    }
}

/// Serialize a value into the binary column representation.
///
/// This helper keeps the error type aligned with the rest of the engine.
pub fn serialize<T>(ty: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize,
{
    cbor::serialize(ty)
}

/// Deserialize a value produced by [`serialize`].
pub fn deserialize<T>(bytes: &[u8]) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    cbor::deserialize(bytes)
}
