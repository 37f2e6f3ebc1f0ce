//! Binary codec adapter.
//!
//! All persisted and gossiped types go through this module: a bincode body,
//! optionally wrapped in a 4-byte little-endian length prefix for the wire.
//!
//! ```text
//! [4 bytes: payload length (u32-le)] [N bytes: bincode payload]
//! ```
//!
//! The contract is `decode(encode(x)) == x` (structural equality) for every
//! serializable type.  Unknown enum tags and truncated frames fail decoding.

use {
    crate::error::{ConsensusError, Result},
    serde::{de::DeserializeOwned, Serialize},
};

/// Length of the frame header in bytes.
pub const FRAME_HEADER_LEN: usize = 4;

/// Encode a value to its bincode body.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

/// Decode a value from a bincode body.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

/// Encode a value with a `u32`-le length prefix, enforcing `max_size` on
/// the framed length.
pub fn encode_framed<T: Serialize>(value: &T, max_size: usize) -> Result<Vec<u8>> {
    let payload = encode(value)?;
    let framed_len = FRAME_HEADER_LEN.saturating_add(payload.len());
    if framed_len > max_size {
        return Err(ConsensusError::MessageTooLarge {
            size: framed_len,
            max: max_size,
        });
    }
    let mut buf = Vec::with_capacity(framed_len);
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Decode a length-prefixed value, enforcing `max_size` and rejecting
/// truncated frames.
pub fn decode_framed<T: DeserializeOwned>(bytes: &[u8], max_size: usize) -> Result<T> {
    if bytes.len() > max_size {
        return Err(ConsensusError::MessageTooLarge {
            size: bytes.len(),
            max: max_size,
        });
    }
    let header: [u8; FRAME_HEADER_LEN] = bytes
        .get(..FRAME_HEADER_LEN)
        .and_then(|h| h.try_into().ok())
        .ok_or_else(|| {
            ConsensusError::Codec(bincode::Error::new(bincode::ErrorKind::Custom(
                "frame shorter than header".to_string(),
            )))
        })?;
    let len = read_frame_len(&header);
    let body = bytes
        .get(FRAME_HEADER_LEN..FRAME_HEADER_LEN.saturating_add(len))
        .ok_or_else(|| {
            ConsensusError::Codec(bincode::Error::new(bincode::ErrorKind::Custom(
                format!("truncated frame: header says {len} bytes"),
            )))
        })?;
    decode(body)
}

/// Read the length prefix from a 4-byte header.
pub fn read_frame_len(header: &[u8; FRAME_HEADER_LEN]) -> usize {
    u32::from_le_bytes(*header) as usize
}
