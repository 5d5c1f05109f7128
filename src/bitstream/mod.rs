//! The bitstream module forms the I/O subsystem of the codec.
//!
//! - bitwriter: packs header bytes and code words MSB-first, zero-pads the final byte and
//!   writes the result to any `Write` sink.
//! - bytereader: buffered whole-byte access to a compressed stream for the header parser
//!   and the stream decoder.
//!
//! This I/O subsystem is designed to efficiently interface with the other modules of the
//! codec. It is not intended for more general use.
//!
pub mod bitwriter;
pub mod bytereader;
