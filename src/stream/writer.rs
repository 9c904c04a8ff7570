//! Writes encoded values to an async byte stream.

use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::codec::Codec;
use crate::error::Result;
use crate::types::Value;

/// Writes values to an `AsyncWrite` stream.
pub struct ValueWriter<'c, W> {
    writer: W,
    codec: &'c Codec,
    buf: BytesMut,
}

impl<W: AsyncWrite + Unpin> ValueWriter<'static, W> {
    /// A writer using the default codec.
    pub fn new(writer: W) -> Self {
        Self::with_codec(writer, crate::default_codec())
    }
}

impl<'c, W: AsyncWrite + Unpin> ValueWriter<'c, W> {
    pub fn with_codec(writer: W, codec: &'c Codec) -> Self {
        Self {
            writer,
            codec,
            buf: BytesMut::new(),
        }
    }

    /// Encodes and writes one value.
    ///
    /// The value is fully encoded before any byte reaches the stream, so an
    /// encoding error leaves the stream unchanged.
    pub async fn write_value(&mut self, value: &Value) -> Result<()> {
        self.buf.clear();
        self.codec.dump_into(&mut self.buf, value)?;
        self.writer.write_all(&self.buf).await?;
        Ok(())
    }

    /// Flushes the underlying writer.
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
