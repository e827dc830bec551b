// private.rs
//
// Copyright (c) 2019  Douglas Lau
//
//! Private module for top-level items
use crate::block::DisposalMethod;
use crate::cursor::ByteCursor;
use crate::{decode, Result};
use pix::rgb::SRgba8;
use pix::Raster;
use std::io::{BufReader, Read};

/// One step of an animation: a fully composited logical screen.
pub struct Step {
    /// Raster of the animation step
    raster: Raster<SRgba8>,
    /// Delay before the next step, in milliseconds
    delay_ms: u32,
    /// Disposal method of the frame
    disposal_method: DisposalMethod,
}

impl Clone for Step {
    fn clone(&self) -> Self {
        Step {
            raster: Raster::with_raster(&self.raster),
            delay_ms: self.delay_ms,
            disposal_method: self.disposal_method,
        }
    }
}

impl Step {
    /// Create an animation step
    pub(crate) fn new(
        raster: Raster<SRgba8>,
        delay_ms: u32,
        disposal_method: DisposalMethod,
    ) -> Self {
        Step {
            raster,
            delay_ms,
            disposal_method,
        }
    }

    /// Get the raster
    pub fn raster(&self) -> &Raster<SRgba8> {
        &self.raster
    }

    /// Get the delay time in milliseconds
    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Get the disposal method of the frame
    pub fn disposal_method(&self) -> DisposalMethod {
        self.disposal_method
    }

    /// Take the raster
    pub fn into_raster(self) -> Raster<SRgba8> {
        self.raster
    }
}

/// Receiver for the events of a decode.
///
/// Events arrive in order: one `on_start`, then `on_frame` for each image,
/// then `on_complete` once the trailer is reached.  After an error, no
/// further events are delivered.
pub trait DecodeVisitor {
    /// Logical screen size is known
    fn on_start(&mut self, width: u16, height: u16);

    /// A frame has been composited
    fn on_frame(&mut self, delay_ms: u32, raster: Raster<SRgba8>);

    /// Trailer was reached
    fn on_complete(&mut self) {}
}

/// GIF file decoder
///
/// Can be converted to one of two `Iterator`s:
/// * [into_iter] / [into_steps] for composited [Step]s
/// * [into_blocks] for low-level [Block]s
///
/// Or drive a [DecodeVisitor] with [decode].
///
/// ## Example: Get a `Raster` from a GIF
/// ```
/// use gifanim::Decoder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let gif = &[
/// #   0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00,
/// #   0x02, 0x00, 0x80, 0x01, 0x00, 0x00, 0x00, 0x00,
/// #   0xff, 0xff, 0xff, 0x2c, 0x00, 0x00, 0x00, 0x00,
/// #   0x02, 0x00, 0x02, 0x00, 0x00, 0x02, 0x03, 0x0c,
/// #   0x10, 0x05, 0x00, 0x3b,
/// # ][..];
/// // ... open a `File` as "gif"
/// if let Some(step) = Decoder::new(gif).into_steps().next() {
///     // was there a decoding error?
///     let step = step?;
///     let raster = step.raster();
///     // ... work with raster
/// }
/// # Ok(())
/// # }
/// ```
///
/// [Block]: block/enum.Block.html
/// [DecodeVisitor]: trait.DecodeVisitor.html
/// [decode]: struct.Decoder.html#method.decode
/// [into_blocks]: struct.Decoder.html#method.into_blocks
/// [into_iter]: struct.Decoder.html#method.into_iter
/// [into_steps]: struct.Decoder.html#method.into_steps
/// [Step]: struct.Step.html
pub struct Decoder<R: Read> {
    /// Reader for input data
    reader: R,
    /// Maximum image size, in pixels
    max_image_sz: Option<usize>,
}

impl<R: Read> Decoder<BufReader<R>> {
    /// Create a new buffered GIF decoder.
    pub fn new(reader: R) -> Self {
        Self::new_unbuffered(BufReader::new(reader))
    }
}

impl<R: Read> Decoder<R> {
    /// Create a new unbuffered GIF decoder.
    pub fn new_unbuffered(reader: R) -> Self {
        Decoder {
            reader,
            max_image_sz: Some(1 << 25),
        }
    }

    /// Set the maximum image size (in pixels) to allow for decoding.
    ///
    /// The limit applies to each image and to the logical screen canvas.
    pub fn max_image_sz(mut self, max_image_sz: Option<usize>) -> Self {
        self.max_image_sz = max_image_sz;
        self
    }

    /// Convert into a block `Iterator`.
    pub fn into_blocks(self) -> decode::Blocks<R> {
        decode::Blocks::new(self.reader, self.max_image_sz)
    }

    /// Convert into a step `Iterator`.
    pub fn into_steps(self) -> decode::Steps<R> {
        decode::Steps::new(self.into_blocks())
    }

    /// Decode all frames, delivering events to a visitor.
    ///
    /// Frames delivered before an error stay delivered; `on_complete` is
    /// only called when the trailer is reached.
    pub fn decode<V: DecodeVisitor>(self, visitor: &mut V) -> Result<()> {
        let mut steps = self.into_steps();
        let (width, height) = {
            let preamble = steps.preamble()?;
            (preamble.screen_width(), preamble.screen_height())
        };
        visitor.on_start(width, height);
        for step in &mut steps {
            let step = step?;
            visitor.on_frame(step.delay_ms(), step.into_raster());
        }
        visitor.on_complete();
        Ok(())
    }
}

impl<R: Read> IntoIterator for Decoder<R> {
    type Item = Result<Step>;
    type IntoIter = decode::Steps<R>;

    /// Convert into a step `Iterator`
    fn into_iter(self) -> Self::IntoIter {
        self.into_steps()
    }
}

/// Read the logical screen size of a GIF, without decoding any images.
///
/// Only the header and logical screen descriptor are read.  Returns `None`
/// if the data is not a GIF, or is cut short.
pub fn probe<R: Read>(reader: R) -> Option<(u16, u16)> {
    let mut cursor = ByteCursor::new(reader);
    decode::read_header(&mut cursor).ok()?;
    let desc = decode::read_screen_desc(&mut cursor).ok()?;
    Some((desc.screen_width(), desc.screen_height()))
}

/// Check whether data starts with a valid GIF header and screen descriptor
pub fn is_gif<R: Read>(reader: R) -> bool {
    probe(reader).is_some()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::decode::test::*;
    use crate::Error;

    #[derive(Debug, Default, PartialEq)]
    struct Events {
        start: Option<(u16, u16)>,
        delays: Vec<u32>,
        sizes: Vec<(u32, u32)>,
        complete: bool,
    }

    impl DecodeVisitor for Events {
        fn on_start(&mut self, width: u16, height: u16) {
            self.start = Some((width, height));
        }
        fn on_frame(&mut self, delay_ms: u32, raster: Raster<SRgba8>) {
            self.delays.push(delay_ms);
            self.sizes.push((raster.width(), raster.height()));
        }
        fn on_complete(&mut self) {
            self.complete = true;
        }
    }

    fn two_frames() -> Vec<u8> {
        let mut body = gce(0, 4, 0);
        body.extend(image((0, 0), (2, 1), 0, &[], 2, &[1, 2]));
        body.extend(image((1, 0), (1, 1), 0, &[], 2, &[3]));
        gif(2, 1, 0x81, 0, &TABLE4, &body)
    }

    #[test]
    fn visitor_events() {
        let mut gif = two_frames();
        gif.push(b';');
        let mut events = Events::default();
        Decoder::new(&gif[..]).decode(&mut events).unwrap();
        assert_eq!(
            events,
            Events {
                start: Some((2, 1)),
                delays: vec![40, 100],
                sizes: vec![(2, 1), (2, 1)],
                complete: true,
            }
        );
    }

    #[test]
    fn visitor_error() {
        // no trailer: frames delivered, but never completed
        let gif = two_frames();
        let mut events = Events::default();
        let res = Decoder::new(&gif[..]).decode(&mut events);
        assert!(matches!(res, Err(Error::UnexpectedEndOfStream)));
        assert_eq!(events.delays.len(), 2);
        assert!(!events.complete);
    }

    #[test]
    fn visitor_bad_header() {
        let mut events = Events::default();
        let res = Decoder::new(&b"PNG"[..]).decode(&mut events);
        assert!(res.is_err());
        assert_eq!(events, Events::default());
    }

    #[test]
    fn into_iter() {
        let mut gif = two_frames();
        gif.push(b';');
        let mut n = 0;
        for step in Decoder::new(&gif[..]) {
            let step = step.unwrap();
            assert_eq!(step.disposal_method(), DisposalMethod::Unspecified);
            n += 1;
        }
        assert_eq!(n, 2);
    }

    #[test]
    fn probe_size() {
        let gif = two_frames();
        assert_eq!(probe(&gif[..]), Some((2, 1)));
        assert!(is_gif(&gif[..]));
        assert_eq!(probe(&gif[..10]), None);
        assert!(!is_gif(&b"GIF90a\x01\x00\x01\x00\x00\x00\x00"[..]));
        assert!(!is_gif(&b""[..]));
    }
}
