//! The huffman module turns symbol frequencies into codes.
//!
//! - symbol: the alphabet (every byte value plus an end-of-stream sentinel) and code types.
//! - tree: builds the Huffman tree and reads code lengths off its leaves.
//! - canonical: derives the actual codes from the lengths alone.
//!
//! Only lengths are ever written to a compressed file. The decompressor feeds those lengths
//! back through the canonical assigner and gets exactly the codes the compressor used,
//! without ever seeing the tree.
//!
pub mod canonical;
pub mod symbol;
pub mod tree;
