// interlace.rs
//
// Copyright (c) 2019  Douglas Lau
//
//! Row ordering for decoded color indices

/// Starting row of each interlace pass
const PASS_START: [usize; 4] = [0, 4, 2, 1];

/// Row stride of each interlace pass
const PASS_STRIDE: [usize; 4] = [8, 8, 4, 2];

/// Writer which places color indices into display row order
#[derive(Debug)]
pub(crate) struct IndexWriter {
    /// Color indices, in display order
    indices: Vec<u8>,
    /// Image width
    width: usize,
    /// Image height
    height: usize,
    /// Rows are interlaced
    interlaced: bool,
    /// Current column
    x: usize,
    /// Current row
    row: usize,
    /// Current interlace pass
    pass: usize,
    /// Count of indices written
    n_written: usize,
}

impl IndexWriter {
    /// Create a writer for an image
    pub fn new(width: usize, height: usize, interlaced: bool) -> Self {
        IndexWriter {
            indices: vec![0; width * height],
            width,
            height,
            interlaced,
            x: 0,
            row: 0,
            pass: 0,
            n_written: 0,
        }
    }

    /// Check whether every pixel has been written
    pub fn is_full(&self) -> bool {
        self.width == 0 || self.row >= self.height
    }

    /// Get the count of indices written
    pub fn n_written(&self) -> usize {
        self.n_written
    }

    /// Get the total number of pixels
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Write one index at the cursor; ignored once the image is full
    pub fn push(&mut self, idx: u8) {
        if self.is_full() {
            return;
        }
        self.indices[self.row * self.width + self.x] = idx;
        self.n_written += 1;
        self.x += 1;
        if self.x >= self.width {
            self.x = 0;
            self.next_row();
        }
    }

    /// Write a run of indices
    pub fn extend(&mut self, run: &[u8]) {
        for idx in run {
            self.push(*idx);
        }
    }

    /// Advance to the next row
    fn next_row(&mut self) {
        if self.interlaced {
            self.row += PASS_STRIDE[self.pass];
            while self.row >= self.height && self.pass < PASS_START.len() - 1
            {
                self.pass += 1;
                self.row = PASS_START[self.pass];
            }
        } else {
            self.row += 1;
        }
    }

    /// Take the indices
    pub fn into_indices(self) -> Vec<u8> {
        self.indices
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn write_rows(width: usize, height: usize, interlaced: bool) -> Vec<u8> {
        let mut w = IndexWriter::new(width, height, interlaced);
        for row in 0..height {
            for _ in 0..width {
                w.push(row as u8);
            }
        }
        assert!(w.is_full());
        w.into_indices()
    }

    #[test]
    fn natural_order() {
        let v = write_rows(2, 3, false);
        assert_eq!(v, [0, 0, 1, 1, 2, 2]);
    }

    #[test]
    fn interlaced_8x8() {
        let v = write_rows(8, 8, true);
        // n-th row written lands on display row [0, 4, 2, 6, 1, 3, 5, 7][n]
        let markers = [0, 4, 2, 5, 1, 6, 3, 7];
        for (r, m) in markers.iter().enumerate() {
            assert_eq!(&v[r * 8..r * 8 + 8], &[*m; 8]);
        }
    }

    #[test]
    fn interlaced_short() {
        // passes starting below the last row are skipped
        let v = write_rows(1, 3, true);
        assert_eq!(v, [0, 2, 1]);
        let v = write_rows(1, 2, true);
        assert_eq!(v, [0, 1]);
        let v = write_rows(1, 5, true);
        assert_eq!(v, [0, 3, 2, 4, 1]);
    }

    #[test]
    fn overflow_ignored() {
        let mut w = IndexWriter::new(2, 1, false);
        w.extend(&[1, 2, 3, 4]);
        assert_eq!(w.n_written(), 2);
        assert_eq!(w.into_indices(), [1, 2]);
    }

    #[test]
    fn partial() {
        let mut w = IndexWriter::new(2, 2, false);
        w.extend(&[7, 7, 7]);
        assert!(!w.is_full());
        assert_eq!(w.len(), 4);
        assert_eq!(w.into_indices(), [7, 7, 7, 0]);
    }
}
