//! Byte sources the decoder reads from.

use std::io::Read;

use bytes::Buf;

use crate::error::{CodecError, Result};

/// A blocking source of encoded bytes.
///
/// Every in-memory [`Buf`] is a source. Use [`IoSource`] to decode directly
/// from a [`std::io::Read`] stream.
pub trait Source {
    /// Reads a single byte.
    fn take_u8(&mut self) -> Result<u8>;

    /// Fills `dst` completely.
    fn take_into(&mut self, dst: &mut [u8]) -> Result<()>;

    /// Reads exactly `len` bytes into a new vector.
    fn take_vec(&mut self, len: usize) -> Result<Vec<u8>>;
}

impl<B: Buf> Source for B {
    fn take_u8(&mut self) -> Result<u8> {
        if !self.has_remaining() {
            return Err(CodecError::UnexpectedEof);
        }
        Ok(self.get_u8())
    }

    fn take_into(&mut self, dst: &mut [u8]) -> Result<()> {
        ensure_remaining(self, dst.len())?;
        self.copy_to_slice(dst);
        Ok(())
    }

    fn take_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        ensure_remaining(self, len)?;
        let mut data = vec![0u8; len];
        self.copy_to_slice(&mut data);
        Ok(data)
    }
}

fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<()> {
    if buf.remaining() < needed {
        Err(CodecError::UnexpectedEof)
    } else {
        Ok(())
    }
}

/// Adapts a [`std::io::Read`] stream into a [`Source`].
///
/// Tags and varints are read one byte at a time, so wrap unbuffered readers
/// (files, sockets) in a [`std::io::BufReader`] first. Nothing beyond the
/// bytes of the decoded value is consumed from the reader.
pub struct IoSource<R> {
    reader: R,
}

impl<R: Read> IoSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Source for IoSource<R> {
    fn take_u8(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.reader.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn take_into(&mut self, dst: &mut [u8]) -> Result<()> {
        self.reader.read_exact(dst)?;
        Ok(())
    }

    fn take_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        // The length comes off the wire, so let the reader prove it has the
        // bytes before anything that large is allocated.
        let mut data = Vec::new();
        self.reader
            .by_ref()
            .take(len as u64)
            .read_to_end(&mut data)?;
        if data.len() < len {
            return Err(CodecError::UnexpectedEof);
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn slice_source_reads_and_advances() {
        let data = [0x01, 0x02, 0x03];
        let mut src = &data[..];
        assert_eq!(src.take_u8().unwrap(), 0x01);
        assert_eq!(src.take_vec(2).unwrap(), vec![0x02, 0x03]);
        assert!(matches!(src.take_u8(), Err(CodecError::UnexpectedEof)));
    }

    #[test]
    fn slice_source_rejects_short_reads() {
        let data = [0x01];
        let mut src = &data[..];
        let mut dst = [0u8; 4];
        assert!(matches!(src.take_into(&mut dst), Err(CodecError::UnexpectedEof)));
    }

    #[test]
    fn io_source_reads_exactly() {
        let mut src = IoSource::new(Cursor::new(vec![0xAA, 0xBB, 0xCC]));
        assert_eq!(src.take_u8().unwrap(), 0xAA);
        let mut dst = [0u8; 1];
        src.take_into(&mut dst).unwrap();
        assert_eq!(dst, [0xBB]);
        assert_eq!(src.into_inner().position(), 2);
    }

    #[test]
    fn io_source_short_vec_is_eof() {
        let mut src = IoSource::new(Cursor::new(vec![0x01, 0x02]));
        assert!(matches!(src.take_vec(10), Err(CodecError::UnexpectedEof)));
    }

    #[test]
    fn io_source_huge_length_does_not_allocate_upfront() {
        let mut src = IoSource::new(Cursor::new(Vec::<u8>::new()));
        assert!(matches!(
            src.take_vec(usize::MAX / 2),
            Err(CodecError::UnexpectedEof)
        ));
    }
}
