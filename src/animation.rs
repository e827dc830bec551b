// animation.rs
//
// Copyright (c) 2019  Douglas Lau
//
//! Collected animation frames
use crate::private::{DecodeVisitor, Decoder};
use crate::{Error, Result};
use pix::rgb::SRgba8;
use pix::Raster;
use std::io::Read;

/// All frames of a GIF animation, with their delays.
#[derive(Default)]
pub struct Animation {
    /// Logical screen width
    width: u16,
    /// Logical screen height
    height: u16,
    /// Composited frames
    frames: Vec<Raster<SRgba8>>,
    /// Delay after each frame, in milliseconds
    delays: Vec<u32>,
    /// Trailer was reached
    complete: bool,
}

impl DecodeVisitor for Animation {
    fn on_start(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    fn on_frame(&mut self, delay_ms: u32, raster: Raster<SRgba8>) {
        self.frames.push(raster);
        self.delays.push(delay_ms);
    }

    fn on_complete(&mut self) {
        self.complete = true;
    }
}

impl Animation {
    /// Decode a complete animation.
    ///
    /// Fails with `NoFrames` if the stream holds no images.
    pub fn decode<R: Read>(reader: R) -> Result<Self> {
        let mut animation = Animation::default();
        Decoder::new(reader).decode(&mut animation)?;
        if animation.is_empty() {
            return Err(Error::NoFrames);
        }
        debug!(
            "animation: {} frames, {} ms",
            animation.len(),
            animation.total_time_ms()
        );
        Ok(animation)
    }

    /// Get the logical screen width
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Get the logical screen height
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Get the number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if there are no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Check whether the trailer was reached
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Get a frame raster
    pub fn frame(&self, n: usize) -> Option<&Raster<SRgba8>> {
        self.frames.get(n)
    }

    /// Get the delay after a frame, in milliseconds
    pub fn delay_ms(&self, n: usize) -> Option<u32> {
        self.delays.get(n).copied()
    }

    /// Get all frames with their delays
    pub fn frames(
        &self,
    ) -> impl Iterator<Item = (&Raster<SRgba8>, u32)> + '_ {
        self.frames.iter().zip(self.delays.iter().copied())
    }

    /// Get the total time of one pass, in milliseconds
    pub fn total_time_ms(&self) -> u64 {
        self.delays.iter().map(|d| u64::from(*d)).sum()
    }
}
