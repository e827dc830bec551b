// lzw.rs
//
// Copyright (c) 2020  Douglas Lau
//
//! Lempel-Ziv-Welch decompression for GIF
use crate::error::Result;
use crate::interlace::IndexWriter;
use std::ops::AddAssign;

/// Code Bits
#[derive(Clone, Copy, Debug, PartialEq)]
struct Bits(u8);

impl From<u8> for Bits {
    fn from(bits: u8) -> Self {
        Bits(bits.min(Self::MAX.0))
    }
}

impl From<Bits> for u8 {
    fn from(bits: Bits) -> Self {
        bits.0
    }
}

impl AddAssign<u8> for Bits {
    fn add_assign(&mut self, rhs: u8) {
        self.0 = (self.0 + rhs).min(Self::MAX.0)
    }
}

impl Bits {
    /// Maximum code bits allowed for GIF
    const MAX: Self = Bits(12);

    /// Get the number of entries
    fn entries(self) -> u16 {
        1 << (self.0 as u16)
    }

    /// Get the bit mask
    fn mask(self) -> u32 {
        (1 << (self.0 as u32)) - 1
    }
}

/// Code type
type Code = u16;

/// Maximum number of codes in the table
const MAX_CODES: usize = 4096;

/// Code table, stored as parallel arrays indexed by code
#[derive(Debug)]
struct Table {
    /// Previous code in sequence
    prefix: Vec<Option<Code>>,
    /// Last byte of sequence
    suffix: Vec<u8>,
    /// First byte of sequence
    first: Vec<u8>,
    /// Length of sequence
    length: Vec<u16>,
    /// Minimum code bits
    min_code_bits: u8,
    /// Next available code
    next_code: Code,
}

impl Table {
    /// Create a new code table
    fn new(min_code_bits: u8) -> Self {
        let mut table = Table {
            prefix: vec![None; MAX_CODES],
            suffix: vec![0; MAX_CODES],
            first: vec![0; MAX_CODES],
            length: vec![1; MAX_CODES],
            min_code_bits,
            next_code: 0,
        };
        table.reset();
        table
    }

    /// Get the clear code
    fn clear_code(&self) -> Code {
        1 << self.min_code_bits
    }

    /// Get the end code
    fn end_code(&self) -> Code {
        self.clear_code() + 1
    }

    /// Reset the table to literal codes only.
    ///
    /// Suffixes above the literals are left alone; an out-of-sequence code
    /// decodes to whatever single byte its slot holds.
    fn reset(&mut self) {
        let clear_code = self.clear_code() as usize;
        for code in 0..clear_code {
            self.prefix[code] = None;
            self.suffix[code] = code as u8;
            self.first[code] = code as u8;
            self.length[code] = 1;
        }
        for code in clear_code..MAX_CODES {
            self.prefix[code] = None;
            self.length[code] = 1;
        }
        self.next_code = self.clear_code() + 2;
    }

    /// Check whether the table has room for another entry
    fn is_full(&self) -> bool {
        self.next_code as usize >= MAX_CODES
    }

    /// Push an entry: sequence of `prefix` followed by first byte of `tail`
    fn push(&mut self, prefix: Code, tail: Code) {
        let code = self.next_code as usize;
        let (p, t) = (prefix as usize, tail as usize);
        self.prefix[code] = Some(prefix);
        self.suffix[code] = self.first[t];
        self.first[code] = self.first[p];
        self.length[code] = self.length[p] + 1;
        self.next_code += 1;
    }

    /// Write the sequence for a code into a buffer
    fn sequence(&self, code: Code, buffer: &mut Vec<u8>) {
        let len = self.length[code as usize] as usize;
        buffer.clear();
        buffer.resize(len, 0);
        let mut code = code as usize;
        for i in (0..len).rev() {
            buffer[i] = self.suffix[code];
            match self.prefix[code] {
                Some(p) => code = p as usize,
                None => break,
            }
        }
    }
}

/// LZW Data Decompressor
#[derive(Debug)]
pub(crate) struct Decompressor {
    /// Code table
    table: Table,
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code bits
    code_bits: Bits,
    /// Last code
    last: Option<Code>,
    /// Bit buffer
    code: u32,
    /// Number of bits in buffer
    n_bits: u8,
    /// Scratch buffer for one sequence
    scratch: Vec<u8>,
}

impl Decompressor {
    /// Create a new decompressor
    pub fn new(min_code_bits: u8) -> Self {
        Decompressor {
            table: Table::new(min_code_bits),
            min_code_bits,
            code_bits: Bits::from(min_code_bits + 1),
            last: None,
            code: 0,
            n_bits: 0,
            scratch: Vec::with_capacity(MAX_CODES),
        }
    }

    /// Read one code, pulling bytes from `next_byte` as needed
    fn read_code<F>(&mut self, next_byte: &mut F) -> Result<Option<Code>>
    where
        F: FnMut() -> Result<Option<u8>>,
    {
        let b = u8::from(self.code_bits);
        while self.n_bits < b {
            match next_byte()? {
                Some(byte) => {
                    self.code |= u32::from(byte) << self.n_bits;
                    self.n_bits += 8;
                }
                None => return Ok(None),
            }
        }
        let code = (self.code & self.code_bits.mask()) as Code;
        self.code >>= b;
        self.n_bits -= b;
        Ok(Some(code))
    }

    /// Decompress a code stream into an index writer.
    ///
    /// Returns `true` if the end code was found, or `false` if the data ran
    /// out first.
    pub fn decompress<F>(
        &mut self,
        mut next_byte: F,
        writer: &mut IndexWriter,
    ) -> Result<bool>
    where
        F: FnMut() -> Result<Option<u8>>,
    {
        while let Some(code) = self.read_code(&mut next_byte)? {
            if code == self.table.clear_code() {
                self.table.reset();
                self.code_bits = Bits::from(self.min_code_bits + 1);
                self.last = None;
            } else if code == self.table.end_code() {
                return Ok(true);
            } else {
                self.decompress_code(code, writer);
            }
        }
        Ok(false)
    }

    /// Decompress one code
    fn decompress_code(&mut self, code: Code, writer: &mut IndexWriter) {
        let last = match self.last {
            Some(last) => last,
            None => {
                if code < self.table.clear_code() {
                    writer.push(code as u8);
                    self.last = Some(code);
                } else {
                    warn!("LZW code {} is not a literal", code);
                }
                return;
            }
        };
        if !self.table.is_full() {
            let next_code = self.table.next_code;
            let tail = if code < next_code {
                code
            } else {
                if code > next_code {
                    warn!("Out-of-sequence LZW code {} > {}", code, next_code);
                }
                last
            };
            self.table.push(last, tail);
            if self.table.next_code == self.code_bits.entries() {
                self.code_bits += 1;
            }
        }
        self.table.sequence(code, &mut self.scratch);
        writer.extend(&self.scratch);
        self.last = Some(code);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::decode::test::lzw_encode as encode;

    /// Pack codes with explicit bit widths, LSB first
    fn pack(codes: &[(Code, u8)]) -> Vec<u8> {
        let mut buffer = vec![];
        let mut code = 0u32;
        let mut n_bits = 0;
        for (c, bits) in codes {
            code |= u32::from(*c) << n_bits;
            n_bits += bits;
            while n_bits >= 8 {
                buffer.push(code as u8);
                code >>= 8;
                n_bits -= 8;
            }
        }
        if n_bits > 0 {
            buffer.push(code as u8);
        }
        buffer
    }

    fn decode(min_code_bits: u8, bytes: &[u8], len: usize) -> (Vec<u8>, bool) {
        let mut writer = IndexWriter::new(len, 1, false);
        let mut it = bytes.iter().copied();
        let end = Decompressor::new(min_code_bits)
            .decompress(|| Ok(it.next()), &mut writer)
            .unwrap();
        (writer.into_indices(), end)
    }

    #[test]
    fn round_trip() {
        let data: Vec<u8> = (0..300u32).map(|i| (i * 7 / 5 % 4) as u8).collect();
        let (v, end) = decode(2, &encode(2, &data), data.len());
        assert!(end);
        assert_eq!(v, data);
        let data: Vec<u8> = (0..1000u32).map(|i| (i * i % 13) as u8).collect();
        let (v, end) = decode(4, &encode(4, &data), data.len());
        assert!(end);
        assert_eq!(v, data);
        let data: Vec<u8> = (0..2000u32).map(|i| (i % 251) as u8).collect();
        let (v, end) = decode(8, &encode(8, &data), data.len());
        assert!(end);
        assert_eq!(v, data);
    }

    #[test]
    fn repeated_run() {
        // exercises the code == next_code case repeatedly
        let data = vec![3; 500];
        let (v, _) = decode(2, &encode(2, &data), data.len());
        assert_eq!(v, data);
    }

    #[test]
    fn self_reference() {
        // 4 = clear, 5 = end; 6 = [1, 1] defined by its own use
        let bytes = pack(&[(4, 3), (1, 3), (6, 3), (5, 3)]);
        let (v, end) = decode(2, &bytes, 3);
        assert!(end);
        assert_eq!(v, [1, 1, 1]);
    }

    #[test]
    fn clear_code_reset() {
        let plain = pack(&[
            (4, 3),
            (0, 3),
            (1, 3),
            (6, 3), // table reaches 8 entries: 4 bits
            (6, 4),
            (5, 4),
        ]);
        let cleared = pack(&[
            (4, 3),
            (0, 3),
            (1, 3),
            (6, 3),
            (4, 4), // clear: back to 3 bits
            (0, 3),
            (1, 3),
            (5, 3),
        ]);
        let (a, _) = decode(2, &plain, 6);
        let (b, _) = decode(2, &cleared, 6);
        assert_eq!(a, [0, 1, 0, 1, 0, 1]);
        assert_eq!(a, b);
    }

    #[test]
    fn clear_resets_state() {
        let bytes = pack(&[(4, 3), (0, 3), (1, 3), (6, 3), (4, 4)]);
        let mut writer = IndexWriter::new(16, 1, false);
        let mut it = bytes.iter().copied();
        let mut dec = Decompressor::new(2);
        dec.decompress(|| Ok(it.next()), &mut writer).unwrap();
        assert_eq!(u8::from(dec.code_bits), 3);
        assert_eq!(dec.table.next_code, 6);
        assert_eq!(dec.last, None);
    }

    #[test]
    fn truncated() {
        let data: Vec<u8> = (0..64u32).map(|i| (i % 3) as u8).collect();
        let bytes = encode(2, &data);
        let (v, end) = decode(2, &bytes[..bytes.len() / 2], data.len());
        assert!(!end);
        assert_eq!(v.len(), data.len());
        assert_ne!(v, data);
        // remainder keeps its default
        assert_eq!(v[62], 0);
    }

    #[test]
    fn out_of_sequence() {
        // code 7 arrives when 6 is next: tolerated
        let bytes = pack(&[(4, 3), (2, 3), (7, 3), (5, 3)]);
        let (v, end) = decode(2, &bytes, 2);
        assert!(end);
        assert_eq!(v[0], 2);
    }

    #[test]
    fn missing_clear() {
        let bytes = pack(&[(1, 3), (2, 3), (6, 3), (5, 4)]);
        let (v, _) = decode(2, &bytes, 4);
        assert_eq!(v, [1, 2, 1, 2]);
    }
}
