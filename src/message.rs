// ABOUTME: Request/Response wire bodies carried inside a codec frame
// ABOUTME: The core treats the payload as opaque bytes; only the routing fields are parsed

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// A request body, immutable once constructed.
///
/// `sequence` must be unique within the lifetime of the client that
/// created it; it is what correlates this request with its eventual
/// response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub sequence: u64,
    pub code: i32,
    pub is_oneway: bool,
    pub created_at: i64,
    pub payload: Bytes,
}

impl Request {
    pub fn new(sequence: u64, code: i32, payload: impl Into<Bytes>) -> Self {
        Request {
            sequence,
            code,
            is_oneway: false,
            created_at: now_millis(),
            payload: payload.into(),
        }
    }

    pub fn oneway(sequence: u64, code: i32, payload: impl Into<Bytes>) -> Self {
        Request {
            is_oneway: true,
            ..Self::new(sequence, code, payload)
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u64_le(self.sequence);
        buf.put_i32_le(self.code);
        buf.put_u8(self.is_oneway as u8);
        buf.put_i64_le(self.created_at);
        buf.put_u32_le(self.payload.len() as u32);
        buf.put_slice(&self.payload);
    }

    pub fn decode(buf: &mut Bytes) -> Result<Self, MessageError> {
        if buf.len() < 25 {
            return Err(MessageError::Truncated);
        }
        let sequence = buf.get_u64_le();
        let code = buf.get_i32_le();
        let is_oneway = buf.get_u8() != 0;
        let created_at = buf.get_i64_le();
        let payload_len = buf.get_u32_le() as usize;
        if buf.len() < payload_len {
            return Err(MessageError::Truncated);
        }
        let payload = buf.split_to(payload_len);
        Ok(Request {
            sequence,
            code,
            is_oneway,
            created_at,
            payload,
        })
    }
}

/// A response body: echoes the originating request's `sequence`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub sequence: u64,
    pub code: i32,
    pub payload: Bytes,
}

impl Response {
    pub fn new(sequence: u64, code: i32, payload: impl Into<Bytes>) -> Self {
        Response {
            sequence,
            code,
            payload: payload.into(),
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u64_le(self.sequence);
        buf.put_i32_le(self.code);
        buf.put_u32_le(self.payload.len() as u32);
        buf.put_slice(&self.payload);
    }

    pub fn decode(buf: &mut Bytes) -> Result<Self, MessageError> {
        if buf.len() < 16 {
            return Err(MessageError::Truncated);
        }
        let sequence = buf.get_u64_le();
        let code = buf.get_i32_le();
        let payload_len = buf.get_u32_le() as usize;
        if buf.len() < payload_len {
            return Err(MessageError::Truncated);
        }
        let payload = buf.split_to(payload_len);
        Ok(Response {
            sequence,
            code,
            payload,
        })
    }
}

/// Failure decoding a `Request`/`Response` body out of a frame.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("message body truncated")]
    Truncated,
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips() {
        let req = Request::new(7, 42, &b"payload"[..]);
        let mut buf = BytesMut::new();
        req.encode(&mut buf);
        let mut bytes = buf.freeze();
        let decoded = Request::decode(&mut bytes).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn oneway_flag_round_trips() {
        let req = Request::oneway(1, 2, &b""[..]);
        let mut buf = BytesMut::new();
        req.encode(&mut buf);
        let mut bytes = buf.freeze();
        let decoded = Request::decode(&mut bytes).unwrap();
        assert!(decoded.is_oneway);
    }

    #[test]
    fn response_round_trips() {
        let resp = Response::new(9, 0, &b"ok"[..]);
        let mut buf = BytesMut::new();
        resp.encode(&mut buf);
        let mut bytes = buf.freeze();
        let decoded = Response::decode(&mut bytes).unwrap();
        assert_eq!(decoded, resp);
    }

    #[test]
    fn decode_rejects_truncated_request() {
        let mut bytes = Bytes::from_static(&[0u8; 5]);
        assert!(matches!(
            Request::decode(&mut bytes),
            Err(MessageError::Truncated)
        ));
    }

    #[test]
    fn decode_rejects_truncated_payload() {
        let req = Request::new(1, 1, &b"longer than claimed"[..]);
        let mut buf = BytesMut::new();
        req.encode(&mut buf);
        let mut truncated = buf.freeze();
        truncated.truncate(25 + 3);
        assert!(matches!(
            Request::decode(&mut truncated),
            Err(MessageError::Truncated)
        ));
    }
}
