//! Canonical Huffman file compression.
//!
//! Every file is coded with its own static Huffman code. Only the code lengths go into the
//! header; both sides derive the same canonical codes from them. An end-of-stream sentinel
//! marks where the payload stops, so no length field is needed.
//!
//! Basic usage to compress a file is as follows:
//!
//! `$> chuff -z test.txt`
//!
//! This will compress the file and create the file test.txt.huf. The original file is
//! kept.
//!
//! From code, `encode` and `decode` work on any byte source and sink:
//!
//! ```
//! let mut packed = Vec::new();
//! chuff::encode(b"abbc".as_slice(), &mut packed).unwrap();
//! let mut unpacked = Vec::new();
//! chuff::decode(packed.as_slice(), &mut unpacked).unwrap();
//! assert_eq!(unpacked, b"abbc");
//! ```
//!
pub mod bitstream;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use compression::compress::{encode, EncodeReport, Encoder};
pub use compression::decompress::{decode, DecodeOutcome, Step, StreamDecoder};
pub use error::{HuffError, Result};
