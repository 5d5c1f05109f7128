//! The tools module provides the helper pieces around the codec.
//!
//! The tools are:
//! - cli: Command line interface and the options struct it fills in.
//! - data_in: Restartable byte sources for the two compression passes, and output file
//!   creation.
//! - freq_count: Frequency count of the input, the symbol model the tree is built from.
//!
pub mod cli;
pub mod data_in;
pub mod freq_count;
