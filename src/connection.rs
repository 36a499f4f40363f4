// ABOUTME: Frame-based TCP I/O: reassembles length-prefixed frames from a byte stream
// ABOUTME: and serializes concurrent writes onto a single socket behind a send lock

use crate::codec::{self, HEADER_SIZE};
use crate::error::{RemotingError, RemotingResult};
use bytes::{Buf, Bytes, BytesMut};
use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

/// Split a connected socket into an independent reader and writer.
///
/// The reader drives the receive-side framing state machine and is meant
/// to be owned by a single long-lived task per connection. The writer is
/// cheaply cloneable (it is an `Arc` internally via `FrameWriter::clone`)
/// and serializes concurrent callers behind a send lock, so multiple
/// in-flight `invoke_*` calls can share one socket safely.
pub fn split(stream: TcpStream, max_frame_bytes: u32) -> (FrameReader, FrameWriter) {
    let (read_half, write_half) = stream.into_split();
    let reader = FrameReader {
        read_half,
        // Default to a 4KB read buffer; real workloads may want to tune this.
        buffer: BytesMut::with_capacity(4 * 1024),
        max_frame_bytes,
    };
    let writer = FrameWriter {
        write_half: std::sync::Arc::new(Mutex::new(BufWriter::new(write_half))),
    };
    (reader, writer)
}

/// Owns the read half of a connection and reassembles complete frame
/// bodies from whatever chunk sizes the OS happens to deliver.
pub struct FrameReader {
    read_half: OwnedReadHalf,
    buffer: BytesMut,
    max_frame_bytes: u32,
}

impl FrameReader {
    /// Read a single frame body from the underlying stream.
    ///
    /// Waits until enough data has been buffered to parse a whole frame.
    /// Returns `Ok(None)` on a clean peer-initiated close (no partial
    /// frame in flight); returns `Err` on a dirty close or a framing
    /// violation, either of which should terminate this connection.
    pub async fn read_frame(&mut self) -> RemotingResult<Option<Bytes>> {
        loop {
            if let Some(frame) = self.parse_frame()? {
                return Ok(Some(frame));
            }

            if 0 == self.read_half.read_buf(&mut self.buffer).await? {
                return if self.buffer.is_empty() {
                    Ok(None)
                } else {
                    Err(RemotingError::Io(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        "connection reset by peer mid-frame",
                    )))
                };
            }
        }
    }

    /// Try to carve one complete frame out of the buffered bytes.
    ///
    /// `Ok(None)` means "not enough data yet, read more"; this is the
    /// header-reading/body-reading state, tracked implicitly by how much
    /// of `buffer` is currently present rather than by an explicit enum,
    /// since a single accumulate-then-split loop expresses the same state
    /// machine the spec describes.
    fn parse_frame(&mut self) -> RemotingResult<Option<Bytes>> {
        if self.buffer.len() < HEADER_SIZE {
            return Ok(None);
        }

        let length = codec::decode_header(&self.buffer[..HEADER_SIZE]);
        codec::check_length(length, self.max_frame_bytes)?;
        let length = length as usize;

        if self.buffer.len() < HEADER_SIZE + length {
            self.buffer.reserve(HEADER_SIZE + length - self.buffer.len());
            return Ok(None);
        }

        self.buffer.advance(HEADER_SIZE);
        let body = self.buffer.split_to(length).freeze();
        Ok(Some(body))
    }
}

/// Shared handle to the write half of a connection.
///
/// Cloning is cheap: all clones serialize through the same send lock, so
/// concurrent `invoke_*` calls on one client (or concurrent responses on
/// one server connection) never interleave partial writes.
#[derive(Clone)]
pub struct FrameWriter {
    write_half: std::sync::Arc<Mutex<BufWriter<OwnedWriteHalf>>>,
}

impl FrameWriter {
    /// Encode `body` as a frame and write it in full to the socket.
    ///
    /// Returns the raw `io::Error` rather than `RemotingError` so callers
    /// can feed it straight into `PendingTable::mark_send_result` and
    /// build their own `RemotingError::SendError` with the right address.
    pub async fn write_frame(&self, body: &[u8]) -> io::Result<()> {
        let mut buf = BytesMut::new();
        codec::encode(body, &mut buf);

        let mut guard = self.write_half.lock().await;
        guard.write_all(&buf).await?;
        guard.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt as _;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn reads_a_single_frame() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let writer_task = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            let mut buf = BytesMut::new();
            codec::encode(b"hello", &mut buf);
            stream.write_all(&buf).await.unwrap();
        });

        let (stream, _) = listener.accept().await.unwrap();
        let (mut reader, _writer) = split(stream, codec::DEFAULT_MAX_FRAME_BYTES);
        let frame = reader.read_frame().await.unwrap().unwrap();
        assert_eq!(&frame[..], b"hello");

        writer_task.await.unwrap();
    }

    #[tokio::test]
    async fn reassembles_a_frame_sent_one_byte_at_a_time() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let payload = vec![0x42u8; 10 * 1024];
        let payload_for_writer = payload.clone();
        let writer_task = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            let mut buf = BytesMut::new();
            codec::encode(&payload_for_writer, &mut buf);
            for byte in buf {
                stream.write_all(&[byte]).await.unwrap();
            }
        });

        let (stream, _) = listener.accept().await.unwrap();
        let (mut reader, _writer) = split(stream, codec::DEFAULT_MAX_FRAME_BYTES);
        let frame = reader.read_frame().await.unwrap().unwrap();
        assert_eq!(frame.len(), payload.len());
        assert_eq!(&frame[..], &payload[..]);

        writer_task.await.unwrap();
    }

    #[tokio::test]
    async fn clean_close_with_no_partial_frame_returns_none() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let writer_task = tokio::spawn(async move {
            let stream = TcpStream::connect(addr).await.unwrap();
            drop(stream);
        });

        let (stream, _) = listener.accept().await.unwrap();
        let (mut reader, _writer) = split(stream, codec::DEFAULT_MAX_FRAME_BYTES);
        let frame = reader.read_frame().await.unwrap();
        assert!(frame.is_none());

        writer_task.await.unwrap();
    }

    #[tokio::test]
    async fn oversized_length_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let writer_task = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.write_all(&u32::MAX.to_le_bytes()).await.unwrap();
        });

        let (stream, _) = listener.accept().await.unwrap();
        let (mut reader, _writer) = split(stream, 1024);
        let result = reader.read_frame().await;
        assert!(matches!(result, Err(RemotingError::FramingError { .. })));

        writer_task.await.unwrap();
    }
}
