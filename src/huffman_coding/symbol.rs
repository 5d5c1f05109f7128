//! Alphabet and code types shared by the tree builder, the canonical assigner and the
//! bitstream.

use std::fmt::{Display, Formatter};

/// Value the end-of-stream symbol takes in the persisted symbol table.
pub const SENTINEL_BYTE: u8 = 0x00;

/// Largest alphabet the 1 byte size field can describe.
pub const MAX_ALPHABET: usize = u8::MAX as usize;

/// Longest code we will generate or accept.
pub const MAX_CODE_LEN: u8 = 64;

/// One element of the coding alphabet.
///
/// `Eos` is the synthetic end-of-stream marker. It never collides with a real byte while
/// trees are built or tables are sorted, even though it is written to disk as `0x00`.
/// The derived ordering puts `Eos` ahead of every byte, which is the tie-break canonical
/// ordering relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sym {
    Eos,
    Byte(u8),
}

impl Sym {
    /// The value written to the symbol table.
    pub fn wire_value(self) -> u8 {
        match self {
            Sym::Eos => SENTINEL_BYTE,
            Sym::Byte(b) => b,
        }
    }
}

impl Display for Sym {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Sym::Eos => write!(f, "EOS"),
            Sym::Byte(b) => write!(f, "{:#04x}", b),
        }
    }
}

/// A code word: the low `len` bits of `bits`, sent most significant bit first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Code {
    pub bits: u64,
    pub len: u8,
}

impl Code {
    pub fn new(bits: u64, len: u8) -> Self {
        Self { bits, len }
    }

    /// True if `self` is a prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len
            && other.bits.checked_shr((other.len - self.len) as u32).unwrap_or(0) == self.bits
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.len == 0 {
            return Ok(());
        }
        write!(f, "{:0>width$b}", self.bits, width = self.len as usize)
    }
}

/// A symbol with its code length and, once canonical codes are assigned, its code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub sym: Sym,
    pub len: u8,
    pub code: u64,
}

impl Symbol {
    pub fn code(&self) -> Code {
        Code::new(self.code, self.len)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn eos_sorts_before_bytes() {
        let mut syms = vec![Sym::Byte(3), Sym::Byte(0), Sym::Eos];
        syms.sort();
        assert_eq!(syms, vec![Sym::Eos, Sym::Byte(0), Sym::Byte(3)]);
    }

    #[test]
    fn wire_values() {
        assert_eq!(Sym::Eos.wire_value(), 0);
        assert_eq!(Sym::Byte(b'a').wire_value(), 0x61);
    }

    #[test]
    fn code_display_is_zero_padded() {
        assert_eq!(Code::new(0b01, 4).to_string(), "0001");
        assert_eq!(Code::new(0, 1).to_string(), "0");
    }

    #[test]
    fn prefix_test() {
        let short = Code::new(0b10, 2);
        assert!(short.is_prefix_of(&Code::new(0b101, 3)));
        assert!(!short.is_prefix_of(&Code::new(0b011, 3)));
        assert!(!Code::new(0b101, 3).is_prefix_of(&short));
    }
}
