use std::io::{self, Read};

use log::debug;
use rayon::prelude::*;

use super::data_in::ByteSource;
use crate::huffman_coding::symbol::Sym;

/// Size of each read from the source while counting.
pub(crate) const READ_CHUNK: usize = 256 * 1024;

/// Symbol frequencies for one input, sentinel included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frequencies {
    counts: [u64; 256],
}

impl Frequencies {
    /// An empty model. Only the sentinel is present.
    pub fn new() -> Self {
        Self { counts: [0; 256] }
    }

    /// Count a complete in-memory input.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut freqs = Self::new();
        freqs.add(data);
        freqs
    }

    /// Add a chunk of input. Uses parallelism when the chunk is over 64k.
    pub fn add(&mut self, data: &[u8]) {
        if data.len() > 64_000 {
            // 16k is pretty much the sweet spot for chunk size.
            let partial = data
                .par_chunks(16_000)
                .fold(
                    || [0_u64; 256],
                    |mut freqs, chunk| {
                        chunk.iter().for_each(|&el| freqs[el as usize] += 1);
                        freqs
                    },
                )
                .reduce(
                    || [0_u64; 256],
                    |mut s, f| {
                        s.iter_mut().zip(f.iter()).for_each(|(a, b)| *a += b);
                        s
                    },
                );
            self.counts
                .iter_mut()
                .zip(partial.iter())
                .for_each(|(a, b)| *a += b);
        } else {
            data.iter().for_each(|&el| self.counts[el as usize] += 1);
        }
    }

    /// Frequency of one symbol. The sentinel always occurs exactly once.
    pub fn count(&self, sym: Sym) -> u64 {
        match sym {
            Sym::Eos => 1,
            Sym::Byte(b) => self.counts[b as usize],
        }
    }

    /// Every symbol with a non-zero frequency: the sentinel first, then bytes ascending.
    pub fn iter(&self) -> impl Iterator<Item = (Sym, u64)> + '_ {
        std::iter::once((Sym::Eos, 1)).chain(
            self.counts
                .iter()
                .enumerate()
                .filter(|(_, &f)| f > 0)
                .map(|(b, &f)| (Sym::Byte(b as u8), f)),
        )
    }

    /// Number of distinct symbols, sentinel included.
    pub fn alphabet_size(&self) -> usize {
        1 + self.counts.iter().filter(|&&f| f > 0).count()
    }

    /// Number of input bytes counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

impl Default for Frequencies {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the whole source once and return its symbol frequencies.
pub fn count_frequencies<S: ByteSource + ?Sized>(source: &S) -> io::Result<Frequencies> {
    let mut reader = source.open()?;
    let mut buf = vec![0_u8; READ_CHUNK];
    let mut freqs = Frequencies::new();
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        freqs.add(&buf[..n]);
    }
    debug!(
        "Counted {} bytes, {} distinct symbols (with EOS).",
        freqs.total(),
        freqs.alphabet_size()
    );
    Ok(freqs)
}
