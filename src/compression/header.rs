//! The symbol table at the front of every compressed file.
//!
//! ```text
//! offset 0        alphabet size N (1 byte, sentinel included)
//! offset 1..=2N   N pairs of (symbol value, code length), 1 byte each, canonical order
//! ```
//!
//! The sentinel is written as `0x00`. A file whose input contained literal zero bytes
//! therefore has two `0x00` entries. The compressor makes sure the sentinel's entry always
//! comes first, so the first `0x00` read back is the sentinel and a second one is the
//! literal byte.

use std::io::{Read, Write};

use log::{debug, trace};

use crate::bitstream::{bitwriter::BitWriter, bytereader::ByteReader};
use crate::error::{HuffError, Result};
use crate::huffman_coding::canonical::CanonicalTable;
use crate::huffman_coding::symbol::{Sym, MAX_ALPHABET, SENTINEL_BYTE};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    /// (symbol value, code length) pairs in canonical order.
    entries: Vec<(u8, u8)>,
}

impl Header {
    /// Build the header for a canonical table, refusing alphabets the size field can't hold.
    pub fn from_table(table: &CanonicalTable) -> Result<Header> {
        if table.len() > MAX_ALPHABET {
            return Err(HuffError::AlphabetOverflow {
                symbols: table.len(),
            });
        }
        Ok(Header {
            entries: table
                .symbols()
                .iter()
                .map(|s| (s.sym.wire_value(), s.len))
                .collect(),
        })
    }

    pub fn entries(&self) -> &[(u8, u8)] {
        &self.entries
    }

    pub fn alphabet_size(&self) -> usize {
        self.entries.len()
    }

    /// Size of the header on disk.
    pub fn encoded_len(&self) -> usize {
        1 + 2 * self.entries.len()
    }

    /// Put the header on the stream.
    pub fn write<W: Write>(&self, bw: &mut BitWriter<W>) -> std::io::Result<()> {
        bw.out8(self.entries.len() as u8)?;
        for &(value, len) in &self.entries {
            bw.out8(value)?;
            bw.out8(len)?;
        }
        trace!("Header of {} entries written, now at {}.", self.entries.len(), bw.loc());
        Ok(())
    }

    /// Read a header from the front of a compressed stream.
    pub fn read<R: Read>(br: &mut ByteReader<R>) -> Result<Header> {
        let count = br.byte()?.ok_or(HuffError::TruncatedHeader)? as usize;
        if count == 0 {
            return Err(HuffError::MalformedHeader("empty alphabet".to_string()));
        }
        let raw = br.bytes(count * 2)?.ok_or(HuffError::TruncatedHeader)?;
        let entries: Vec<(u8, u8)> = raw.chunks_exact(2).map(|p| (p[0], p[1])).collect();
        debug!("Found {} symbols in the header.", entries.len());
        Ok(Header { entries })
    }

    /// Turn the raw pairs back into alphabet symbols. The first `0x00` is the sentinel, a
    /// second one is a literal zero byte; any other repeat is an error.
    pub fn code_lengths(&self) -> Result<Vec<(Sym, u8)>> {
        let mut seen = [0_u8; 256];
        self.entries
            .iter()
            .map(|&(value, len)| {
                seen[value as usize] += 1;
                match (value, seen[value as usize]) {
                    (SENTINEL_BYTE, 1) => Ok((Sym::Eos, len)),
                    (SENTINEL_BYTE, 2) => Ok((Sym::Byte(SENTINEL_BYTE), len)),
                    (_, 1) => Ok((Sym::Byte(value), len)),
                    _ => Err(HuffError::MalformedHeader(format!(
                        "symbol {:#04x} listed more than once",
                        value
                    ))),
                }
            })
            .collect()
    }
}
