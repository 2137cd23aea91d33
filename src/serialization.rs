/// Serialization format options for grid store data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SerializationFormat {
    /// Bincode, uncompressed
    Bincode,
    /// Bincode with LZ4 compression and the uncompressed size prepended (default)
    #[default]
    BincodeLz4,
}

impl SerializationFormat {
    /// Returns true if this format uses LZ4 compression
    pub fn is_compressed(&self) -> bool {
        matches!(self, SerializationFormat::BincodeLz4)
    }
}

use crate::errors::StoreError;
use serde::{de::DeserializeOwned, Serialize};

/// Serialize data to bytes using the specified format.
pub fn serialize<T: Serialize>(data: &T, format: SerializationFormat) -> Result<Vec<u8>, StoreError> {
    let bytes = bincode::serde::encode_to_vec(data, bincode::config::standard())
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    if format.is_compressed() {
        Ok(lz4_flex::compress_prepend_size(&bytes))
    } else {
        Ok(bytes)
    }
}

/// Deserialize data from bytes using the specified format.
/// Trailing bytes after the encoded value are rejected.
pub fn deserialize<T: DeserializeOwned>(data: &[u8], format: SerializationFormat) -> Result<T, StoreError> {
    let decompressed;
    let bytes = if format.is_compressed() {
        decompressed = lz4_flex::decompress_size_prepended(data)
            .map_err(|e| StoreError::Lz4Decompression(e.to_string()))?;
        &decompressed[..]
    } else {
        data
    };
    let (value, read) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map_err(|e| StoreError::Deserialization(e.to_string()))?;
    if read != bytes.len() {
        return Err(StoreError::Deserialization(format!("{} trailing bytes", bytes.len() - read)));
    }
    Ok(value)
}
