// cursor.rs
//
// Copyright (c) 2019  Douglas Lau
//
//! Sequential byte reading and sub-block chains
use crate::error::{Error, Result};
use std::io::{ErrorKind, Read};

/// Sequential reader over a byte stream
pub(crate) struct ByteCursor<R: Read> {
    /// Reader for input data
    reader: R,
}

impl<R: Read> ByteCursor<R> {
    /// Create a new byte cursor
    pub fn new(reader: R) -> Self {
        ByteCursor { reader }
    }

    /// Read one byte, or `None` at end of data
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read exactly enough bytes to fill a buffer
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        // UnexpectedEof converts to InsufficientData
        self.reader.read_exact(buf)?;
        Ok(())
    }

    /// Read a fixed-size array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read `n` bytes into a new `Vec`
    pub fn read_vec(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0; n];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read one byte which must be present
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_byte()?.ok_or(Error::InsufficientData)
    }
}

/// Chain of length-prefixed sub-blocks, ended by a zero-length sub-block
pub(crate) struct SubBlocks<'a, R: Read> {
    /// Cursor positioned within the chain
    cursor: &'a mut ByteCursor<R>,
    /// Current sub-block
    chunk: Vec<u8>,
    /// Position within current sub-block
    pos: usize,
    /// Number of complete sub-blocks read
    n_chunks: usize,
    /// Terminator reached
    done: bool,
}

impl<'a, R: Read> SubBlocks<'a, R> {
    /// Start reading a sub-block chain
    pub fn new(cursor: &'a mut ByteCursor<R>) -> Self {
        SubBlocks {
            cursor,
            chunk: Vec::with_capacity(255),
            pos: 0,
            n_chunks: 0,
            done: false,
        }
    }

    /// Get the number of complete sub-blocks read
    pub fn n_chunks(&self) -> usize {
        self.n_chunks
    }

    /// Check whether the terminator has been reached
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Read the next sub-block, or `None` after the terminator
    pub fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        if self.done {
            return Ok(None);
        }
        let len = self.cursor.read_u8()? as usize;
        if len == 0 {
            self.done = true;
            self.chunk.clear();
            self.pos = 0;
            return Ok(None);
        }
        self.chunk.resize(len, 0);
        self.cursor.read_exact(&mut self.chunk)?;
        self.pos = len;
        self.n_chunks += 1;
        Ok(Some(&self.chunk))
    }

    /// Read the next byte, crossing sub-block boundaries
    pub fn next_byte(&mut self) -> Result<Option<u8>> {
        while self.pos >= self.chunk.len() {
            if self.done {
                return Ok(None);
            }
            if self.next_chunk()?.is_none() {
                return Ok(None);
            }
            self.pos = 0;
        }
        let b = self.chunk[self.pos];
        self.pos += 1;
        Ok(Some(b))
    }

    /// Concatenate all remaining sub-blocks
    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut data = self.chunk[self.pos..].to_vec();
        self.pos = self.chunk.len();
        while let Some(chunk) = self.next_chunk()? {
            data.extend_from_slice(chunk);
        }
        Ok(data)
    }

    /// Skip all remaining sub-blocks
    pub fn drain(&mut self) -> Result<usize> {
        let mut n_bytes = self.chunk.len() - self.pos.min(self.chunk.len());
        self.pos = self.chunk.len();
        while let Some(chunk) = self.next_chunk()? {
            n_bytes += chunk.len();
        }
        Ok(n_bytes)
    }
}

/// Read a complete sub-block chain as concatenated bytes
pub(crate) fn read_chunks<R: Read>(cursor: &mut ByteCursor<R>) -> Result<Vec<u8>> {
    SubBlocks::new(cursor).read_to_end()
}
