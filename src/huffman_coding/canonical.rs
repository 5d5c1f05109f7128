//! Canonical code assignment.
//!
//! Codes are never stored. Both the compressor and the decompressor hand this module the
//! same (symbol, length) pairs, and this module turns them into the same codes:
//!
//! - Sort by descending length, then ascending symbol (`Eos` before `Byte(0)`).
//! - The first (longest) symbol gets code 0.
//! - Moving to the next symbol of length L' from one of length L, the counter becomes
//!   `(counter + 1) >> (L - L')`.
//!
//! For example lengths {EOS:3, c:3, b:2, a:1} become EOS=000, c=001, b=01, a=1.
//!
//! Any change to the sort order silently breaks compatibility with existing files, even
//! though each side on its own would still be self-consistent.

use log::trace;
use rustc_hash::FxHashMap;

use super::symbol::{Code, Sym, Symbol, MAX_CODE_LEN};
use crate::error::{HuffError, Result};

/// A canonically ordered, fully assigned code table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalTable {
    symbols: Vec<Symbol>,
}

impl CanonicalTable {
    /// Put the pairs into canonical order and derive every code from the lengths alone.
    pub fn assign(mut lengths: Vec<(Sym, u8)>) -> Result<CanonicalTable> {
        if let Some(&(sym, len)) = lengths
            .iter()
            .find(|(_, len)| *len == 0 || *len > MAX_CODE_LEN)
        {
            return Err(HuffError::MalformedHeader(format!(
                "symbol {} has invalid code length {}",
                sym, len
            )));
        }
        let eos_count = lengths.iter().filter(|(sym, _)| *sym == Sym::Eos).count();
        if eos_count != 1 {
            return Err(HuffError::MalformedHeader(format!(
                "expected one end-of-stream symbol, found {}",
                eos_count
            )));
        }

        // Stable sort, so equal (length, symbol) pairs keep the order they came in.
        lengths.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let symbols = lengths.into_iter().try_fold(
            Vec::<Symbol>::new(),
            |mut table, (sym, len)| -> Result<Vec<Symbol>> {
                let code = match table.last() {
                    None => 0,
                    Some(prev) => {
                        prev.code
                            .checked_add(1)
                            .ok_or(HuffError::OversubscribedCodes)?
                            >> (prev.len - len)
                    }
                };
                // The counter ran past the last code of this length.
                if len < 64 && code >> len != 0 {
                    return Err(HuffError::OversubscribedCodes);
                }
                table.push(Symbol { sym, len, code });
                Ok(table)
            },
        )?;

        for s in &symbols {
            trace!("{:>6} len {:>2} code {}", s.sym, s.len, s.code());
        }
        Ok(CanonicalTable { symbols })
    }

    /// Symbols in canonical order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Code for `sym`, if it is in the table.
    pub fn code(&self, sym: Sym) -> Option<Code> {
        self.symbols.iter().find(|s| s.sym == sym).map(Symbol::code)
    }

    /// Lookup table for the compressor.
    pub fn encoder(&self) -> EncodeMap {
        let mut map = EncodeMap {
            codes: [None; 256],
            eos: Code::default(),
        };
        for s in &self.symbols {
            match s.sym {
                Sym::Eos => map.eos = s.code(),
                Sym::Byte(b) => map.codes[b as usize] = Some(s.code()),
            }
        }
        map
    }

    /// Exact-match dictionary for the decompressor.
    pub fn decoder(&self) -> DecodeMap {
        let mut map = FxHashMap::default();
        map.reserve(self.symbols.len());
        for s in &self.symbols {
            map.insert(s.code(), s.sym);
        }
        DecodeMap {
            map,
            max_len: self.symbols.iter().map(|s| s.len).max().unwrap_or(0),
        }
    }

    /// No code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        self.symbols.iter().enumerate().all(|(i, a)| {
            self.symbols
                .iter()
                .skip(i + 1)
                .all(|b| !a.code().is_prefix_of(&b.code()) && !b.code().is_prefix_of(&a.code()))
        })
    }

    /// Kraft sum as an exact fraction `(numerator, denominator)`, the denominator being
    /// `2^longest`.
    pub fn kraft_sum(&self) -> (u128, u128) {
        let longest = self.symbols.iter().map(|s| s.len).max().unwrap_or(0);
        let numerator = self
            .symbols
            .iter()
            .map(|s| 1_u128 << (longest - s.len))
            .sum();
        (numerator, 1_u128 << longest)
    }

    /// Kraft equality: every bit pattern eventually decodes to something.
    pub fn is_complete(&self) -> bool {
        let (num, den) = self.kraft_sum();
        num == den
    }
}

/// Symbol to code, for the compressor.
#[derive(Clone, Debug)]
pub struct EncodeMap {
    codes: [Option<Code>; 256],
    eos: Code,
}

impl EncodeMap {
    pub fn byte(&self, b: u8) -> Option<Code> {
        self.codes[b as usize]
    }

    pub fn eos(&self) -> Code {
        self.eos
    }
}

/// Code to symbol, for the decompressor.
#[derive(Clone, Debug)]
pub struct DecodeMap {
    map: FxHashMap<Code, Sym>,
    max_len: u8,
}

impl DecodeMap {
    pub fn get(&self, code: Code) -> Option<Sym> {
        self.map.get(&code).copied()
    }

    /// Length of the longest code. Once this many bits are pending, something must match.
    pub fn max_len(&self) -> u8 {
        self.max_len
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn codes(table: &CanonicalTable) -> Vec<(Sym, String)> {
        table
            .symbols()
            .iter()
            .map(|s| (s.sym, s.code().to_string()))
            .collect()
    }

    #[test]
    fn equal_lengths_test() {
        // a, b, c and EOS all of length 2: EOS=00, a=01, b=10, c=11.
        let table = CanonicalTable::assign(vec![
            (Sym::Byte(b'c'), 2),
            (Sym::Byte(b'a'), 2),
            (Sym::Eos, 2),
            (Sym::Byte(b'b'), 2),
        ])
        .unwrap();
        assert_eq!(
            codes(&table),
            vec![
                (Sym::Eos, "00".to_string()),
                (Sym::Byte(b'a'), "01".to_string()),
                (Sym::Byte(b'b'), "10".to_string()),
                (Sym::Byte(b'c'), "11".to_string()),
            ]
        );
    }

    #[test]
    fn mixed_lengths_test() {
        let table = CanonicalTable::assign(vec![
            (Sym::Byte(b'a'), 1),
            (Sym::Byte(b'b'), 2),
            (Sym::Byte(b'c'), 3),
            (Sym::Eos, 3),
        ])
        .unwrap();
        assert_eq!(
            codes(&table),
            vec![
                (Sym::Eos, "000".to_string()),
                (Sym::Byte(b'c'), "001".to_string()),
                (Sym::Byte(b'b'), "01".to_string()),
                (Sym::Byte(b'a'), "1".to_string()),
            ]
        );
        assert!(table.is_prefix_free());
        assert!(table.is_complete());
    }

    #[test]
    fn assignment_is_idempotent() {
        let lens = vec![
            (Sym::Byte(9), 4),
            (Sym::Eos, 4),
            (Sym::Byte(200), 3),
            (Sym::Byte(1), 2),
            (Sym::Byte(0), 1),
        ];
        let first = CanonicalTable::assign(lens.clone()).unwrap();
        let second = CanonicalTable::assign(lens).unwrap();
        assert_eq!(first, second);
        // Re-running on the already canonical output changes nothing either.
        let again = CanonicalTable::assign(
            first.symbols().iter().map(|s| (s.sym, s.len)).collect(),
        )
        .unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn sentinel_precedes_literal_zero() {
        let table = CanonicalTable::assign(vec![(Sym::Byte(0), 1), (Sym::Eos, 1)]).unwrap();
        assert_eq!(table.symbols()[0].sym, Sym::Eos);
        assert_eq!(table.code(Sym::Eos), Some(Code::new(0, 1)));
        assert_eq!(table.code(Sym::Byte(0)), Some(Code::new(1, 1)));
    }

    #[test]
    fn lone_sentinel() {
        let table = CanonicalTable::assign(vec![(Sym::Eos, 1)]).unwrap();
        assert_eq!(table.encoder().eos(), Code::new(0, 1));
        assert!(!table.is_complete());
        assert_eq!(table.kraft_sum(), (1, 2));
    }

    #[test]
    fn oversubscribed_lengths_are_rejected() {
        let err = CanonicalTable::assign(vec![
            (Sym::Eos, 1),
            (Sym::Byte(1), 1),
            (Sym::Byte(2), 1),
        ])
        .unwrap_err();
        assert!(matches!(err, HuffError::OversubscribedCodes));
    }

    #[test]
    fn bad_lengths_are_rejected() {
        assert!(CanonicalTable::assign(vec![(Sym::Eos, 0)]).is_err());
        assert!(CanonicalTable::assign(vec![(Sym::Eos, 65)]).is_err());
        // No sentinel at all.
        assert!(CanonicalTable::assign(vec![(Sym::Byte(1), 1), (Sym::Byte(2), 1)]).is_err());
    }

    #[test]
    fn maps_agree_with_table() {
        let table = CanonicalTable::assign(vec![
            (Sym::Byte(b'x'), 2),
            (Sym::Byte(b'y'), 2),
            (Sym::Byte(b'z'), 2),
            (Sym::Eos, 2),
        ])
        .unwrap();
        let enc = table.encoder();
        let dec = table.decoder();
        assert_eq!(dec.max_len(), 2);
        for b in [b'x', b'y', b'z'] {
            let code = enc.byte(b).unwrap();
            assert_eq!(dec.get(code), Some(Sym::Byte(b)));
        }
        assert_eq!(dec.get(enc.eos()), Some(Sym::Eos));
        assert_eq!(enc.byte(b'q'), None);
    }

    #[test]
    fn sixty_four_bit_codes() {
        // A staircase 1, 2, ..., 63, 64, 64 is complete and reaches the maximum length.
        let mut lens: Vec<(Sym, u8)> = (1..=63_u8).map(|l| (Sym::Byte(l), l)).collect();
        lens.push((Sym::Byte(100), 64));
        lens.push((Sym::Eos, 64));
        let table = CanonicalTable::assign(lens).unwrap();
        assert!(table.is_complete());
        assert!(table.is_prefix_free());
        assert_eq!(table.code(Sym::Eos), Some(Code::new(0, 64)));
        assert_eq!(table.code(Sym::Byte(100)), Some(Code::new(1, 64)));
        assert_eq!(table.code(Sym::Byte(63)), Some(Code::new(1, 63)));
        assert_eq!(table.code(Sym::Byte(1)), Some(Code::new(1, 1)));
    }
}
