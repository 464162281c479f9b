use std::io::{self, BufRead};

use super::decoder::{DecodingError, FormatErrorKind};
use crate::traits::ReadBytesExt;

/// Largest sub-block payload, the length prefix is a single byte.
const MAX_BLOCK_LEN: usize = 255;

/// Sequential reader over a GIF byte stream.
///
/// Knows about the length-prefixed sub-block framing. The payload of the last
/// block read stays available in a reused buffer until the next block is read.
pub(crate) struct BlockReader<R> {
    reader: R,
    block: [u8; MAX_BLOCK_LEN + 1],
    block_size: usize,
}

impl<R: BufRead> BlockReader<R> {
    pub(crate) fn new(reader: R) -> Self {
        BlockReader {
            reader,
            block: [0; MAX_BLOCK_LEN + 1],
            block_size: 0,
        }
    }

    #[inline]
    pub(crate) fn read_byte(&mut self) -> Result<u8, DecodingError> {
        Ok(<R as ReadBytesExt<u8>>::read_le(&mut self.reader)?)
    }

    /// Reads a byte, or returns `None` if the stream ended cleanly before it.
    pub(crate) fn try_read_byte(&mut self) -> Result<Option<u8>, DecodingError> {
        loop {
            match self.reader.fill_buf() {
                Ok([]) => return Ok(None),
                Ok(buf) => {
                    let b = buf[0];
                    self.reader.consume(1);
                    return Ok(Some(b));
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    #[inline]
    pub(crate) fn read_u16(&mut self) -> Result<u16, DecodingError> {
        Ok(<R as ReadBytesExt<u16>>::read_le(&mut self.reader)?)
    }

    /// Reads `len` bytes and widens each one to a `char`.
    pub(crate) fn read_string(&mut self, len: usize) -> Result<String, DecodingError> {
        (0..len).map(|_| self.read_byte().map(char::from)).collect()
    }

    /// Fills as much of `buf` as the stream allows and returns the number of bytes read.
    pub(crate) fn read_up_to(&mut self, buf: &mut [u8]) -> Result<usize, DecodingError> {
        read_up_to(&mut self.reader, buf)
    }

    /// Discards up to `len` bytes without copying them, returns how many were discarded.
    fn discard(&mut self, len: usize) -> Result<usize, DecodingError> {
        let mut left = len;
        while left > 0 {
            let available = match self.reader.fill_buf() {
                Ok(available) => available.len(),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            if available == 0 {
                break;
            }
            let n = available.min(left);
            self.reader.consume(n);
            left -= n;
        }
        Ok(len - left)
    }

    /// Reads one length-prefixed sub-block. An empty slice is the block terminator.
    pub(crate) fn read_block(&mut self) -> Result<&[u8], DecodingError> {
        let size = usize::from(self.read_byte()?);
        self.read_payload(size)
    }

    /// Like [`read_block`](Self::read_block), but the stream ending cleanly
    /// where the length byte would be yields `None`.
    pub(crate) fn try_read_block(&mut self) -> Result<Option<&[u8]>, DecodingError> {
        match self.try_read_byte()? {
            Some(size) => self.read_payload(usize::from(size)).map(Some),
            None => {
                self.block_size = 0;
                Ok(None)
            }
        }
    }

    fn read_payload(&mut self, size: usize) -> Result<&[u8], DecodingError> {
        self.block_size = size;
        let read = read_up_to(&mut self.reader, &mut self.block[..size])?;
        if read < size {
            self.block_size = read;
            return Err(DecodingError::format(FormatErrorKind::TruncatedBlock));
        }
        Ok(&self.block[..size])
    }

    /// Skips a train of sub-blocks up to and including the zero-length terminator.
    pub(crate) fn skip_block(&mut self) -> Result<(), DecodingError> {
        loop {
            let size = usize::from(self.read_byte()?);
            self.block_size = size;
            if size == 0 {
                return Ok(());
            }
            if self.discard(size)? < size {
                return Err(DecodingError::format(FormatErrorKind::TruncatedBlock));
            }
        }
    }

    /// Like [`skip_block`](Self::skip_block), but returns `false` when the stream
    /// ends cleanly at a length byte before the terminator.
    pub(crate) fn try_skip_block(&mut self) -> Result<bool, DecodingError> {
        loop {
            let Some(size) = self.try_read_byte()? else {
                self.block_size = 0;
                return Ok(false);
            };
            let size = usize::from(size);
            self.block_size = size;
            if size == 0 {
                return Ok(true);
            }
            if self.discard(size)? < size {
                return Err(DecodingError::format(FormatErrorKind::TruncatedBlock));
            }
        }
    }

    /// Payload of the last sub-block read with [`read_block`](Self::read_block).
    #[inline]
    pub(crate) fn block(&self) -> &[u8] {
        &self.block[..self.block_size]
    }

    pub(crate) fn into_inner(self) -> R {
        self.reader
    }
}

fn read_up_to<R: BufRead>(reader: &mut R, buf: &mut [u8]) -> Result<usize, DecodingError> {
    let mut filled = 0;
    while filled < buf.len() {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if available.is_empty() {
            break;
        }
        let n = available.len().min(buf.len() - filled);
        buf[filled..filled + n].copy_from_slice(&available[..n]);
        reader.consume(n);
        filled += n;
    }
    Ok(filled)
}
