//! The compression module holds both directions of the codec and the file format they share.
//!
//! A compressed file is:
//! - Header: one byte giving the number of symbols N (1..=255, sentinel included), then N
//!   pairs of (symbol value, code length) bytes. The sentinel is written as 0x00.
//! - Payload: the code of every input byte, then the end-of-stream code, packed MSB-first
//!   and zero-padded to a whole byte.
//!
//! Compression reads the input twice: once to count, once to emit codes.
//!
//! Decompression rebuilds the canonical codes from the header lengths and decodes until it
//! finds the end-of-stream code. Anything after that is ignored.
//!
pub mod compress;
pub mod decompress;
pub mod header;
