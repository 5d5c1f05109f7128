use std::io::{self, Read, Write};
use std::path::Path;

use log::{debug, info};

use super::header::Header;
use crate::bitstream::bitwriter::BitWriter;
use crate::error::{HuffError, Result};
use crate::huffman_coding::canonical::{CanonicalTable, EncodeMap};
use crate::huffman_coding::symbol::Sym;
use crate::huffman_coding::tree::build_tree;
use crate::tools::cli::HuffOpts;
use crate::tools::data_in::{create_output, discard_output, ByteSource, FileSource};
use crate::tools::freq_count::{count_frequencies, Frequencies, READ_CHUNK};

/*
    Compression takes two full passes over the input.

    The first pass counts symbols. From the counts we build the tree, read code lengths
    off it, and hand the lengths to the canonical assigner. The header only ever holds
    those lengths.

    The second pass looks every input byte up in the canonical table and packs its code,
    then packs the end-of-stream code and pads out the last byte.
*/

/// What one compression run did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeReport {
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub alphabet_size: usize,
}

/// Everything the second pass needs, worked out by the first.
#[derive(Debug)]
pub struct Encoder {
    freqs: Frequencies,
    table: CanonicalTable,
    header: Header,
    codes: EncodeMap,
}

impl Encoder {
    /// First pass: count the source and derive the code table and header. Nothing is
    /// written, so an alphabet that won't fit is reported before any output exists.
    pub fn prepare<S: ByteSource + ?Sized>(source: &S) -> Result<Encoder> {
        let freqs = count_frequencies(source)?;
        let tree = build_tree(&freqs);
        let mut lengths = tree.code_lengths()?;
        sentinel_first(&mut lengths);
        let table = CanonicalTable::assign(lengths)?;
        let header = Header::from_table(&table)?;
        let codes = table.encoder();
        info!(
            "Read {} bytes with {} distinct symbols (with EOS).",
            freqs.total(),
            table.len()
        );
        Ok(Encoder {
            freqs,
            table,
            header,
            codes,
        })
    }

    pub fn table(&self) -> &CanonicalTable {
        &self.table
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Second pass: write the header, every input code, the end-of-stream code and the
    /// padding to `sink`. The sink is flushed before returning.
    pub fn write<S: ByteSource + ?Sized, W: Write>(
        &self,
        source: &S,
        sink: W,
    ) -> Result<EncodeReport> {
        let mut bw = BitWriter::new(sink);
        self.header.write(&mut bw)?;

        let mut reader = source.open()?;
        let mut buf = vec![0_u8; READ_CHUNK];
        let mut input_bytes = 0_u64;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            for &byte in &buf[..n] {
                let code = self.codes.byte(byte).ok_or(HuffError::SourceChanged)?;
                bw.out_code(code)?;
            }
            input_bytes += n as u64;
        }
        if input_bytes != self.freqs.total() {
            return Err(HuffError::SourceChanged);
        }
        debug!("End of stream code written at {}.", bw.loc());
        bw.out_code(self.codes.eos())?;

        let (_, output_bytes) = bw.finish()?;
        Ok(EncodeReport {
            input_bytes,
            output_bytes,
            alphabet_size: self.header.alphabet_size(),
        })
    }
}

/// Both passes: compress `source` into `sink`.
pub fn encode<S: ByteSource + ?Sized, W: Write>(source: &S, sink: W) -> Result<EncodeReport> {
    Encoder::prepare(source)?.write(source, sink)
}

/// The sentinel and a literal zero byte share the value 0x00 on disk. The decompressor
/// takes the first 0x00 entry in canonical order as the sentinel, so the sentinel must
/// never be shorter than the literal.
fn sentinel_first(lengths: &mut [(Sym, u8)]) {
    let eos = lengths.iter().position(|(s, _)| *s == Sym::Eos);
    let zero = lengths.iter().position(|(s, _)| *s == Sym::Byte(0));
    if let (Some(e), Some(z)) = (eos, zero) {
        if lengths[e].1 < lengths[z].1 {
            debug!(
                "Swapping code lengths of EOS ({}) and 0x00 ({}).",
                lengths[e].1, lengths[z].1
            );
            let (le, lz) = (lengths[e].1, lengths[z].1);
            lengths[e].1 = lz;
            lengths[z].1 = le;
        }
    }
}

/// Compress the input file defined in opts <HuffOpts>.
pub fn compress(opts: &HuffOpts) -> Result<EncodeReport> {
    let source = FileSource::new(&opts.input);
    let report = compress_to(&source, &opts.output_path(), opts.force_overwrite)?;

    info!(
        "{}: {} bytes in, {} bytes out ({} symbols).",
        source.path().display(),
        report.input_bytes,
        report.output_bytes,
        report.alphabet_size
    );
    Ok(report)
}

/// Both passes into the file at `out_path`. The output is only created once the table is
/// known, and is removed again if the second pass fails.
fn compress_to<S: ByteSource + ?Sized>(
    source: &S,
    out_path: &Path,
    force: bool,
) -> Result<EncodeReport> {
    let encoder = Encoder::prepare(source)?;
    let f_out = create_output(out_path, force)?;
    encoder.write(source, f_out).map_err(|e| {
        discard_output(out_path);
        e
    })
}
