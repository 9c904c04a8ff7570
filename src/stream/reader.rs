//! Reads encoded values from an async byte stream.

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::codec::{Codec, Decoder};
use crate::error::{CodecError, Result};
use crate::types::Value;

/// Bytes reserved ahead of each read from the transport.
const READ_CHUNK: usize = 8 * 1024;

/// Reads values from an `AsyncRead` stream.
///
/// Input is buffered and a decode is attempted whenever more bytes arrive. A
/// value split across several reads is therefore decoded more than once, and
/// any reconstructors it names run each time; they must be free of side
/// effects. Each retry re-reads the whole buffered prefix, so very large
/// values arriving in small pieces cost quadratic time.
pub struct ValueReader<'c, R> {
    reader: R,
    codec: &'c Codec,
    buf: BytesMut,
}

impl<R: AsyncRead + Unpin> ValueReader<'static, R> {
    /// A reader using the default codec.
    pub fn new(reader: R) -> Self {
        Self::with_codec(reader, crate::default_codec())
    }
}

impl<'c, R: AsyncRead + Unpin> ValueReader<'c, R> {
    pub fn with_codec(reader: R, codec: &'c Codec) -> Self {
        Self {
            reader,
            codec,
            buf: BytesMut::with_capacity(READ_CHUNK),
        }
    }

    /// Reads the next value.
    ///
    /// Returns `Ok(None)` when the stream ends cleanly between values, and
    /// `UnexpectedEof` when it ends inside one.
    pub async fn read_value(&mut self) -> Result<Option<Value>> {
        loop {
            if let Some(value) = self.try_decode()? {
                return Ok(Some(value));
            }

            self.buf.reserve(READ_CHUNK);
            let n = self.reader.read_buf(&mut self.buf).await?;
            if n == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                tracing::debug!(buffered = self.buf.len(), "stream ended inside a value");
                return Err(CodecError::UnexpectedEof);
            }
        }
    }

    /// Decodes one value from the buffer if it holds a complete one.
    fn try_decode(&mut self) -> Result<Option<Value>> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        let mut cursor = &self.buf[..];
        match Decoder::new(self.codec, &mut cursor).decode() {
            Ok(value) => {
                let used = self.buf.len() - cursor.len();
                tracing::trace!(len = used, "decoded value from stream");
                self.buf.advance(used);
                Ok(Some(value))
            }
            Err(CodecError::UnexpectedEof) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
