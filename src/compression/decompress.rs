use std::io::{self, BufWriter, Read, Write};

use log::{debug, info, trace, warn};

use super::header::Header;
use crate::bitstream::bytereader::ByteReader;
use crate::error::{HuffError, Result};
use crate::huffman_coding::canonical::{CanonicalTable, DecodeMap};
use crate::huffman_coding::symbol::{Code, Sym};
use crate::tools::cli::{HuffOpts, Mode};
use crate::tools::data_in::{create_output, discard_output};

/*
    The payload has no length field. Decoding runs until the end-of-stream code turns up,
    so anything after it (the zero padding, or junk) is never looked at.

    Codes are found greedily: try the first 1 bit of the pending bits, then the first 2,
    and so on. The table is prefix-free, so the first length that matches is the only one
    that can. When the pending bits run out before anything matches, pull in one more
    byte and start over. Once the pending bits are as long as the longest code and still
    nothing matches, the header and payload don't belong together.
*/

/// How a decode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The end-of-stream code was found.
    Complete { bytes: u64 },
    /// The input ran out first. `bytes` were recovered and written.
    Truncated { bytes: u64 },
}

impl DecodeOutcome {
    pub fn bytes(&self) -> u64 {
        match self {
            DecodeOutcome::Complete { bytes } | DecodeOutcome::Truncated { bytes } => *bytes,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, DecodeOutcome::Complete { .. })
    }
}

/// What the decoder wants next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// A byte was decoded.
    Emit(u8),
    /// The pending bits hold no complete code; feed another byte.
    NeedByte,
    /// The end-of-stream code was found.
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Decoding,
    Finished,
}

/// Bits read but not yet matched. The oldest bit is the highest of the low `len` bits.
/// Never more than 71: under 64 unmatched bits plus one new byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Residual {
    bits: u128,
    len: u32,
}

impl Residual {
    fn push_byte(&mut self, byte: u8) {
        self.bits = (self.bits << 8) | byte as u128;
        self.len += 8;
    }

    /// The oldest `n` bits as a code candidate. `n` is at most 64.
    fn prefix(&self, n: u32) -> Code {
        let bits = (self.bits >> (self.len - n)) & mask(n);
        Code::new(bits as u64, n as u8)
    }

    fn consume(&mut self, n: u32) {
        self.len -= n;
        self.bits &= mask(self.len);
    }
}

fn mask(n: u32) -> u128 {
    (1_u128 << n) - 1
}

/// The decode state machine. Feed it bytes, call `step` until it says `NeedByte` or
/// `Finished`.
pub struct StreamDecoder<'a> {
    table: &'a DecodeMap,
    residual: Residual,
    phase: Phase,
    /// Payload bytes fed so far.
    fed: u64,
}

impl<'a> StreamDecoder<'a> {
    pub fn new(table: &'a DecodeMap) -> Self {
        Self {
            table,
            residual: Residual::default(),
            phase: Phase::Decoding,
            fed: 0,
        }
    }

    /// Append the next payload byte to the pending bits.
    pub fn feed(&mut self, byte: u8) {
        self.residual.push_byte(byte);
        self.fed += 1;
    }

    /// Try to match one code at the front of the pending bits.
    pub fn step(&mut self) -> Result<Step> {
        if self.phase == Phase::Finished {
            return Ok(Step::Finished);
        }
        let max_len = self.table.max_len() as u32;
        for probe in 1..=self.residual.len.min(max_len) {
            let code = self.residual.prefix(probe);
            if let Some(sym) = self.table.get(code) {
                self.residual.consume(probe);
                trace!("matched {} -> {}", code, sym);
                return Ok(match sym {
                    Sym::Eos => {
                        self.phase = Phase::Finished;
                        Step::Finished
                    }
                    Sym::Byte(b) => Step::Emit(b),
                });
            }
        }
        if self.residual.len >= max_len {
            return Err(HuffError::NoMatchingCode { position: self.fed });
        }
        Ok(Step::NeedByte)
    }

    /// Bits read but not yet matched.
    pub fn pending_bits(&self) -> u32 {
        self.residual.len
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }
}

/// Decompress `input` into `sink`. Running out of input before the end-of-stream code is
/// not an error; the bytes recovered so far are flushed and `Truncated` is returned.
pub fn decode<R: Read, W: Write>(input: R, sink: W) -> Result<DecodeOutcome> {
    let mut br = ByteReader::new(input);
    let decode_map = read_table(&mut br)?;
    decode_payload(&mut br, &decode_map, sink)
}

/// Read the header and rebuild the codes it describes.
fn read_table<R: Read>(br: &mut ByteReader<R>) -> Result<DecodeMap> {
    let header = Header::read(br)?;
    let table = CanonicalTable::assign(header.code_lengths()?)?;
    let decode_map = table.decoder();
    debug!(
        "Rebuilt {} codes, longest is {} bits. Payload starts at {}.",
        table.len(),
        decode_map.max_len(),
        br.loc()
    );
    Ok(decode_map)
}

fn decode_payload<R: Read, W: Write>(
    br: &mut ByteReader<R>,
    decode_map: &DecodeMap,
    sink: W,
) -> Result<DecodeOutcome> {
    let mut out = BufWriter::new(sink);
    let mut decoder = StreamDecoder::new(decode_map);
    let mut bytes = 0_u64;
    let outcome = loop {
        match decoder.step()? {
            Step::Emit(b) => {
                out.write_all(&[b])?;
                bytes += 1;
            }
            Step::NeedByte => match br.byte()? {
                Some(byte) => decoder.feed(byte),
                None => break DecodeOutcome::Truncated { bytes },
            },
            Step::Finished => break DecodeOutcome::Complete { bytes },
        }
    };
    out.flush()?;
    Ok(outcome)
}

/// Decompress the file specified in opts (HuffOpts). In test mode the output is
/// discarded. The output file is only created once the header checks out, and is removed
/// again if the payload turns out to be corrupt. A truncated file still leaves what could
/// be recovered on disk, and is then reported as `Incomplete`.
pub fn decompress(opts: &HuffOpts) -> Result<DecodeOutcome> {
    let mut br = ByteReader::new(std::fs::File::open(&opts.input)?);
    let decode_map = read_table(&mut br)?;

    let outcome = if opts.op_mode == Mode::Test {
        decode_payload(&mut br, &decode_map, io::sink())?
    } else {
        let out_path = opts.output_path();
        let f_out = create_output(&out_path, opts.force_overwrite)?;
        decode_payload(&mut br, &decode_map, f_out).map_err(|e| {
            discard_output(&out_path);
            e
        })?
    };

    match outcome {
        DecodeOutcome::Complete { bytes } => {
            info!("{}: ok, {} bytes.", opts.input.display(), bytes);
            Ok(outcome)
        }
        DecodeOutcome::Truncated { bytes } => {
            warn!(
                "{}: compressed data ended before the end-of-stream code.",
                opts.input.display()
            );
            Err(HuffError::Incomplete { bytes })
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn abbc_map() -> DecodeMap {
        // EOS=00 a=01 b=10 c=11
        CanonicalTable::assign(vec![
            (Sym::Eos, 2),
            (Sym::Byte(b'a'), 2),
            (Sym::Byte(b'b'), 2),
            (Sym::Byte(b'c'), 2),
        ])
        .unwrap()
        .decoder()
    }

    #[test]
    fn state_machine_walkthrough() {
        let map = abbc_map();
        let mut dec = StreamDecoder::new(&map);
        assert_eq!(dec.step().unwrap(), Step::NeedByte);
        // 01 10 11 00 -> a b c EOS
        dec.feed(0b0110_1100);
        assert_eq!(dec.step().unwrap(), Step::Emit(b'a'));
        assert_eq!(dec.step().unwrap(), Step::Emit(b'b'));
        assert_eq!(dec.step().unwrap(), Step::Emit(b'c'));
        assert_eq!(dec.step().unwrap(), Step::Finished);
        assert!(dec.is_finished());
        // Anything after the sentinel is ignored.
        dec.feed(0xff);
        assert_eq!(dec.step().unwrap(), Step::Finished);
    }

    #[test]
    fn codes_spanning_bytes() {
        let map = CanonicalTable::assign(vec![
            (Sym::Eos, 3),
            (Sym::Byte(b'c'), 3),
            (Sym::Byte(b'b'), 2),
            (Sym::Byte(b'a'), 1),
        ])
        .unwrap()
        .decoder();
        // EOS=000 c=001 b=01 a=1. Stream b b b c c EOS = 01 01 01 001 001 000, split 01010100|10010000
        let mut dec = StreamDecoder::new(&map);
        dec.feed(0b0101_0100);
        assert_eq!(dec.step().unwrap(), Step::Emit(b'b'));
        assert_eq!(dec.step().unwrap(), Step::Emit(b'b'));
        assert_eq!(dec.step().unwrap(), Step::Emit(b'b'));
        // "00" is pending, not yet a code.
        assert_eq!(dec.step().unwrap(), Step::NeedByte);
        assert_eq!(dec.pending_bits(), 2);
        dec.feed(0b1001_0000);
        assert_eq!(dec.step().unwrap(), Step::Emit(b'c'));
        assert_eq!(dec.step().unwrap(), Step::Emit(b'c'));
        assert_eq!(dec.step().unwrap(), Step::Finished);
    }

    #[test]
    fn unknown_bits_are_malformed() {
        // Only the sentinel "0" exists; a leading 1 bit can never match.
        let map = CanonicalTable::assign(vec![(Sym::Eos, 1)]).unwrap().decoder();
        let mut dec = StreamDecoder::new(&map);
        dec.feed(0x80);
        assert!(matches!(
            dec.step(),
            Err(HuffError::NoMatchingCode { position: 1 })
        ));
    }

    #[test]
    fn empty_file_decodes_to_nothing() {
        let mut out = Vec::new();
        let outcome = decode([1_u8, 0x00, 1, 0x00].as_slice(), &mut out).unwrap();
        assert_eq!(outcome, DecodeOutcome::Complete { bytes: 0 });
        assert!(out.is_empty());
    }

    #[test]
    fn abbc_file() {
        let file = [4_u8, 0, 2, b'a', 2, b'b', 2, b'c', 2, 0b0110_1011, 0];
        let mut out = Vec::new();
        let outcome = decode(file.as_slice(), &mut out).unwrap();
        assert!(outcome.is_complete());
        assert_eq!(out, b"abbc");
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let file = [4_u8, 0, 2, b'a', 2, b'b', 2, b'c', 2, 0b0110_1011, 0, 0xde, 0xad];
        let mut out = Vec::new();
        decode(file.as_slice(), &mut out).unwrap();
        assert_eq!(out, b"abbc");
    }

    #[test]
    fn truncated_payload() {
        // Cut after the first payload byte: a b b c were complete, EOS never came.
        let file = [4_u8, 0, 2, b'a', 2, b'b', 2, b'c', 2, 0b0110_1011];
        let mut out = Vec::new();
        let outcome = decode(file.as_slice(), &mut out).unwrap();
        assert_eq!(outcome, DecodeOutcome::Truncated { bytes: 4 });
        assert_eq!(out, b"abbc");
        assert_eq!(outcome.bytes(), 4);
    }

    #[test]
    fn literal_zero_and_sentinel() {
        // EOS=0 (first 0x00 entry), literal 0x00=1. Payload 1 1 0 -> two zeros then EOS.
        let file = [2_u8, 0, 1, 0, 1, 0b1100_0000];
        let mut out = Vec::new();
        decode(file.as_slice(), &mut out).unwrap();
        assert_eq!(out, vec![0, 0]);
    }

    #[test]
    fn oversubscribed_header_is_rejected() {
        let file = [3_u8, 0, 1, b'a', 1, b'b', 1, 0];
        let err = decode(file.as_slice(), Vec::new()).unwrap_err();
        assert!(matches!(err, HuffError::OversubscribedCodes));
    }

    #[test]
    fn decompress_and_test_modes() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("abbc.huf");
        std::fs::write(&input, [4_u8, 0, 2, b'a', 2, b'b', 2, b'c', 2, 0b0110_1011, 0]).unwrap();

        let opts = HuffOpts {
            input: input.clone(),
            op_mode: Mode::Test,
            ..HuffOpts::new()
        };
        assert_eq!(
            decompress(&opts).unwrap(),
            DecodeOutcome::Complete { bytes: 4 }
        );
        assert!(!dir.path().join("abbc").exists());

        let opts = HuffOpts {
            op_mode: Mode::Decompress,
            ..opts
        };
        decompress(&opts).unwrap();
        assert_eq!(std::fs::read(dir.path().join("abbc")).unwrap(), b"abbc");
    }

    #[test]
    fn truncated_file_keeps_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cut.huf");
        std::fs::write(&input, [4_u8, 0, 2, b'a', 2, b'b', 2, b'c', 2, 0b0110_1011]).unwrap();
        let opts = HuffOpts {
            input,
            op_mode: Mode::Decompress,
            ..HuffOpts::new()
        };
        assert!(matches!(
            decompress(&opts),
            Err(HuffError::Incomplete { bytes: 4 })
        ));
        assert_eq!(std::fs::read(dir.path().join("cut")).unwrap(), b"abbc");
    }

    #[test]
    fn bad_header_creates_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt.huf");
        std::fs::write(&input, b"this is not a huf file").unwrap();
        let opts = HuffOpts {
            input,
            op_mode: Mode::Decompress,
            ..HuffOpts::new()
        };
        assert!(matches!(decompress(&opts), Err(HuffError::TruncatedHeader)));
        assert!(!dir.path().join("notes.txt").exists());
        // Same error again, not OutputExists.
        assert!(matches!(decompress(&opts), Err(HuffError::TruncatedHeader)));
    }

    #[test]
    fn corrupt_payload_removes_output() {
        // A valid lone-sentinel header ("0"), then a payload starting with a 1 bit.
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.huf");
        std::fs::write(&input, [1_u8, 0x00, 1, 0xff]).unwrap();
        let opts = HuffOpts {
            input,
            op_mode: Mode::Decompress,
            ..HuffOpts::new()
        };
        assert!(matches!(
            decompress(&opts),
            Err(HuffError::NoMatchingCode { position: 1 })
        ));
        assert!(!dir.path().join("bad").exists());
    }
}
