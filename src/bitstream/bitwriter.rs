use std::io::{self, Write};

use log::debug;

use crate::huffman_coding::symbol::Code;

/// Bytes staged before each write to the sink.
const BUFFER_SIZE: usize = 64 * 1024;

/// Packs header bytes and variable length codes into a byte-aligned stream, most
/// significant bit first, and writes it to any sink.
pub struct BitWriter<W: Write> {
    /// Staging buffer for whole bytes waiting to go to the sink.
    output: Vec<u8>,
    /// Bits waiting to become whole bytes.
    queue: u64,
    /// Count of valid bits in the queue.
    q_bits: u8,
    /// Bytes handed to the sink so far.
    written: u64,
    /// Handle to the output stream.
    writer: W,
}

impl<W: Write> BitWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            output: Vec::with_capacity(BUFFER_SIZE),
            queue: 0,
            q_bits: 0,
            written: 0,
            writer,
        }
    }

    /// Move every whole byte in the queue to the staging buffer, and the staging buffer to
    /// the sink once it is full.
    fn push_queue(&mut self) -> io::Result<()> {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte); //push the packed byte out
            self.q_bits -= 8; //adjust the count of bits left in the queue
        }
        if self.output.len() >= BUFFER_SIZE {
            self.write_output()?;
        }
        Ok(())
    }

    fn write_output(&mut self) -> io::Result<()> {
        self.writer.write_all(&self.output)?;
        self.written += self.output.len() as u64;
        self.output.clear();
        Ok(())
    }

    /// Put up to 32 bits on the stream, taken from the low end of `data`.
    fn out_bits(&mut self, data: u64, depth: u8) -> io::Result<()> {
        self.queue <<= depth; //shift queue by bit length
        self.queue |= data & ((1_u64 << depth) - 1); //add data portion to queue
        self.q_bits += depth; //update depth of queue bits
        self.push_queue()
    }

    /// Put a byte on the stream.
    pub fn out8(&mut self, data: u8) -> io::Result<()> {
        self.out_bits(data as u64, 8)
    }

    /// Put a code word on the stream. Codes over 32 bits go out in two pieces so the
    /// queue never overflows.
    pub fn out_code(&mut self, code: Code) -> io::Result<()> {
        if code.len > 32 {
            self.out_bits(code.bits >> 32, code.len - 32)?;
            self.out_bits(code.bits & 0xffff_ffff, 32)
        } else {
            self.out_bits(code.bits, code.len)
        }
    }

    /// Pad the last partial byte with zeros, hand everything to the sink and flush it.
    /// Returns the sink and the number of bytes written.
    pub fn finish(mut self) -> io::Result<(W, u64)> {
        if self.q_bits > 0 {
            let padding = 8 - self.q_bits;
            debug!("Padding the last byte with {} zero bits.", padding);
            self.queue <<= padding; //pad the queue with zeros
            self.q_bits += padding;
            self.push_queue()?;
        }
        self.write_output()?;
        self.writer.flush()?;
        Ok((self.writer, self.written))
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        let bits = (self.written + self.output.len() as u64) * 8 + self.q_bits as u64;
        format!("[{}.{}]", bits / 8, bits % 8)
    }
}
