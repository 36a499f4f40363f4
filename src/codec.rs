// ABOUTME: Wire-level frame codec: 4-byte little-endian length prefix plus an opaque body
// ABOUTME: Pure encode/decode with no knowledge of what the body bytes mean

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Size of the length prefix that precedes every frame body.
pub const HEADER_SIZE: usize = 4;

/// Default cap on a single frame body, used when no explicit
/// `max_frame_bytes` is configured. Large enough for any reasonable
/// application payload, small enough to bound a misbehaving peer.
pub const DEFAULT_MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

/// Encode `body` as a complete wire frame: `u32_le length || body`.
pub fn encode(body: &[u8], buf: &mut BytesMut) {
    buf.reserve(HEADER_SIZE + body.len());
    buf.put_u32_le(body.len() as u32);
    buf.put_slice(body);
}

/// Convenience wrapper that allocates a fresh buffer for `body`.
pub fn encode_to_bytes(body: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + body.len());
    encode(body, &mut buf);
    buf.freeze()
}

/// Decode the 4-byte little-endian length prefix from `header`.
///
/// `header` must be exactly [`HEADER_SIZE`] bytes; callers are expected
/// to have already buffered that many bytes before calling this.
pub fn decode_header(header: &[u8]) -> u32 {
    let mut cursor = header;
    cursor.get_u32_le()
}

/// Validate a decoded length against the configured cap.
///
/// The wire length is always non-negative (it's a `u32`); the only
/// violation a receiver can observe is exceeding `max_frame_bytes`.
pub fn check_length(length: u32, max_frame_bytes: u32) -> Result<(), crate::RemotingError> {
    if length > max_frame_bytes {
        Err(crate::RemotingError::FramingError {
            length,
            max: max_frame_bytes,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_empty_body() {
        let encoded = encode_to_bytes(b"");
        assert_eq!(encoded.len(), HEADER_SIZE);
        assert_eq!(decode_header(&encoded[..HEADER_SIZE]), 0);
    }

    #[test]
    fn round_trips_arbitrary_body() {
        let body = b"hello, world".to_vec();
        let encoded = encode_to_bytes(&body);
        let length = decode_header(&encoded[..HEADER_SIZE]) as usize;
        assert_eq!(length, body.len());
        assert_eq!(&encoded[HEADER_SIZE..HEADER_SIZE + length], &body[..]);
    }

    #[test]
    fn length_is_little_endian() {
        let encoded = encode_to_bytes(&vec![0u8; 0x0102]);
        assert_eq!(&encoded[..HEADER_SIZE], &[0x02, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn rejects_oversized_length() {
        let err = check_length(100, 50);
        assert!(matches!(
            err,
            Err(crate::RemotingError::FramingError { length: 100, max: 50 })
        ));
    }

    #[test]
    fn accepts_length_at_cap() {
        assert!(check_length(50, 50).is_ok());
    }
}
