// color.rs
//
// Copyright (c) 2019  Douglas Lau
//
//! Color tables (palettes)
use crate::cursor::ByteCursor;
use crate::error::Result;
use pix::rgb::SRgba8;
use std::io::Read;

/// Number of bytes per color table entry
const CHANNELS: usize = 3;

/// Table of RGB colors, indexed by palette index.
///
/// The length is always a power of two between 2 and 256.  Lookups wrap
/// around modulo the length, since some GIFs contain out-of-range indices.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorTable {
    colors: Vec<SRgba8>,
    ordered: bool,
}

impl ColorTable {
    /// Normalize a table length
    fn table_len(len: usize) -> usize {
        len.max(2).next_power_of_two().min(256)
    }

    /// Create a table from RGB triplets
    pub fn with_rgb(rgb: &[u8], ordered: bool) -> Self {
        let len = Self::table_len(rgb.len() / CHANNELS);
        let mut colors: Vec<SRgba8> = rgb
            .chunks_exact(CHANNELS)
            .take(len)
            .map(|c| SRgba8::new(c[0], c[1], c[2], 0xFF))
            .collect();
        colors.resize(len, SRgba8::new(0, 0, 0, 0xFF));
        ColorTable { colors, ordered }
    }

    /// Read a table of `len` entries from a cursor
    pub(crate) fn read<R: Read>(
        cursor: &mut ByteCursor<R>,
        len: usize,
        ordered: bool,
    ) -> Result<Self> {
        let rgb = cursor.read_vec(Self::table_len(len) * CHANNELS)?;
        Ok(Self::with_rgb(&rgb, ordered))
    }

    /// Create the fallback table used when a GIF has no color table.
    ///
    /// Index 0 is black, index 1 is white.  The remaining entries count up
    /// through blue, then green, then red, with a step of
    /// `256 / 2^color_resolution`.
    pub fn with_default(len: usize, color_resolution: u8) -> Self {
        let len = Self::table_len(len);
        let step = 256u32 >> color_resolution.min(8);
        let mut colors = Vec::with_capacity(len);
        colors.push(SRgba8::new(0, 0, 0, 0xFF));
        colors.push(SRgba8::new(0xFF, 0xFF, 0xFF, 0xFF));
        let (mut red, mut green, mut blue) = (0, 0, step);
        while colors.len() < len {
            colors.push(SRgba8::new(red as u8, green as u8, blue as u8, 0xFF));
            blue += step;
            if blue > 255 {
                blue = 0;
                green += step;
                if green > 255 {
                    green = 0;
                    red = (red + step) & 0xFF;
                }
            }
        }
        ColorTable {
            colors,
            ordered: false,
        }
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check whether entries are sorted by importance
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Get the color at an index (modulo table length)
    pub fn color_at(&self, idx: usize) -> SRgba8 {
        self.colors[idx % self.colors.len()]
    }

    /// Get all colors
    pub fn colors(&self) -> &[SRgba8] {
        &self.colors
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn rgb(r: u8, g: u8, b: u8) -> SRgba8 {
        SRgba8::new(r, g, b, 0xFF)
    }

    #[test]
    fn default_ramp() {
        let t = ColorTable::with_default(8, 3);
        assert_eq!(t.len(), 8);
        assert_eq!(t.color_at(0), rgb(0, 0, 0));
        assert_eq!(t.color_at(1), rgb(0xFF, 0xFF, 0xFF));
        assert_eq!(t.color_at(2), rgb(0, 0, 32));
        assert_eq!(t.color_at(3), rgb(0, 0, 64));
        assert_eq!(t.color_at(4), rgb(0, 0, 96));
        assert_eq!(t.color_at(5), rgb(0, 0, 128));
        assert_eq!(t.color_at(6), rgb(0, 0, 160));
        assert_eq!(t.color_at(7), rgb(0, 0, 192));
    }

    #[test]
    fn default_ramp_carry() {
        // step 128: blue wraps into green, green into red
        let t = ColorTable::with_default(8, 1);
        assert_eq!(t.color_at(2), rgb(0, 0, 128));
        assert_eq!(t.color_at(3), rgb(0, 128, 0));
        assert_eq!(t.color_at(4), rgb(0, 128, 128));
        assert_eq!(t.color_at(5), rgb(128, 0, 0));
        assert_eq!(t.color_at(6), rgb(128, 0, 128));
        assert_eq!(t.color_at(7), rgb(128, 128, 0));
    }

    #[test]
    fn index_wraps() {
        let t = ColorTable::with_rgb(&[1, 2, 3, 4, 5, 6], false);
        assert_eq!(t.len(), 2);
        assert_eq!(t.color_at(2), rgb(1, 2, 3));
        assert_eq!(t.color_at(255), rgb(4, 5, 6));
    }

    #[test]
    fn read_table() {
        let data = [0, 0, 0, 0xFF, 0xFF, 0xFF, 0x3B];
        let mut c = ByteCursor::new(&data[..]);
        let t = ColorTable::read(&mut c, 2, true).unwrap();
        assert!(t.is_ordered());
        assert_eq!(t.colors(), &[rgb(0, 0, 0), rgb(0xFF, 0xFF, 0xFF)][..]);
        assert_eq!(c.read_byte().unwrap(), Some(0x3B));
    }

    #[test]
    fn read_short_table() {
        let data = [0, 0, 0, 0xFF];
        let mut c = ByteCursor::new(&data[..]);
        assert!(ColorTable::read(&mut c, 2, false).is_err());
    }
}
