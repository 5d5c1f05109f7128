//! ByteReader: buffered byte access to a compressed stream. It never splits a byte.
//!
//! The header is read a byte at a time, and the payload is handed to the stream decoder
//! one byte at a time, which does its own bit-level bookkeeping.
//!
//! NOTE: This module can read from any I/O source that supports the read() call.
//!

use std::io::{self, Read};

const BUFFER_SIZE: usize = 64 * 1024;

/// Reads a compressed file.
#[derive(Debug)]
pub struct ByteReader<R> {
    buffer: Vec<u8>,
    cursor: usize,
    /// Bytes consumed before the current buffer.
    consumed: u64,
    source: R,
}

impl<R: Read> ByteReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            buffer: Vec::new(),
            cursor: 0,
            consumed: 0,
            source,
        }
    }

    /// Check (and refill) buffer. Returns true if we have data, false if there is no more
    fn have_data(&mut self) -> io::Result<bool> {
        // Only try to read more data when the buffer cursor has reached the end
        if self.cursor == self.buffer.len() {
            self.consumed += self.buffer.len() as u64;
            self.buffer.resize(BUFFER_SIZE, 0);
            let size = loop {
                match self.source.read(&mut self.buffer) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        self.buffer.clear();
                        self.cursor = 0;
                        return Err(e);
                    }
                }
            };
            // Adjust the buffer if we read less than the buffer size
            self.buffer.truncate(size);
            self.cursor = 0;
            // If nothing came back from our read attempt, then we have no more data.
            if size == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Returns the next byte, or None if there is no more data to read.
    pub fn byte(&mut self) -> io::Result<Option<u8>> {
        if !self.have_data()? {
            return Ok(None);
        }
        let byte = self.buffer[self.cursor];
        self.cursor += 1;
        Ok(Some(byte))
    }

    /// Returns the next n bytes, or None if the input ends first.
    pub fn bytes(&mut self, n: usize) -> io::Result<Option<Vec<u8>>> {
        let mut result: Vec<u8> = Vec::with_capacity(n);
        while result.len() < n {
            match self.byte()? {
                Some(byte) => result.push(byte),
                None => return Ok(None),
            }
        }
        Ok(Some(result))
    }

    /// Number of bytes handed out so far.
    pub fn position(&self) -> u64 {
        self.consumed + self.cursor as u64
    }

    /// Debugging function. Report current position in the input.
    pub fn loc(&self) -> String {
        format!("[{}]", self.position())
    }
}
