// compose.rs
//
// Copyright (c) 2019  Douglas Lau
//
//! Compositing images onto the logical screen
use crate::block::{DisposalMethod, GraphicControl, Image, ImageDesc, Preamble};
use crate::color::ColorTable;
use crate::private::Step;
use pix::rgb::SRgba8;
use pix::Raster;

/// Compositor for the logical screen.
///
/// The canvas holds what remains on screen after each frame's disposal.
pub(crate) struct Compositor {
    /// Canvas for the logical screen
    canvas: Raster<SRgba8>,
    /// Background color index
    background_color_idx: u8,
    /// Global color table
    global_color_table: ColorTable,
}

impl Compositor {
    /// Create a compositor with a fully transparent canvas
    pub fn new(preamble: &Preamble) -> Self {
        let desc = &preamble.logical_screen_desc;
        let canvas = Raster::with_clear(
            desc.screen_width().into(),
            desc.screen_height().into(),
        );
        Compositor {
            canvas,
            background_color_idx: desc.background_color_idx(),
            global_color_table: preamble.global_color_table.clone(),
        }
    }

    /// Get the background color for disposal
    fn background(&self, table: &ColorTable, transparent: Option<u8>) -> SRgba8 {
        let idx = self.background_color_idx;
        match transparent {
            Some(t) if t == idx || idx == 0 => SRgba8::new(0, 0, 0, 0),
            _ => table.color_at(idx.into()),
        }
    }

    /// Compose one image, producing a step
    pub fn compose(
        &mut self,
        image: &Image,
        control: Option<GraphicControl>,
    ) -> Step {
        let table = image
            .local_color_table()
            .unwrap_or(&self.global_color_table);
        let transparent = control.and_then(|c| c.transparent_color());
        let disposal = control.map(|c| c.disposal_method()).unwrap_or_default();
        let delay_ms = control
            .map(|c| c.delay_time_ms())
            .unwrap_or(GraphicControl::DEFAULT_DELAY_MS);
        let background = self.background(table, transparent);
        let raster = match disposal {
            DisposalMethod::Unspecified | DisposalMethod::DoNotDispose => {
                overlay(&mut self.canvas, image, table, transparent);
                Raster::with_raster(&self.canvas)
            }
            DisposalMethod::RestoreBackground => {
                let mut raster = Raster::with_raster(&self.canvas);
                overlay(&mut raster, image, table, transparent);
                fill(&mut self.canvas, image.desc(), background);
                raster
            }
            DisposalMethod::RestorePrevious => {
                let mut raster = Raster::with_raster(&self.canvas);
                overlay(&mut raster, image, table, transparent);
                raster
            }
        };
        debug!("  step   : {:?} {} ms", disposal, delay_ms);
        Step::new(raster, delay_ms, disposal)
    }
}

/// Visit each canvas position covered by an image, clipped to the canvas
fn for_each_pixel<F>(raster: &mut Raster<SRgba8>, desc: &ImageDesc, mut f: F)
where
    F: FnMut(&mut SRgba8, usize),
{
    let rw = raster.width() as usize;
    let rh = raster.height() as usize;
    let left = usize::from(desc.left());
    let top = usize::from(desc.top());
    let width = usize::from(desc.width());
    let height = usize::from(desc.height());
    let pixels = raster.pixels_mut();
    for row in 0..height {
        let y = top + row;
        if y >= rh {
            break;
        }
        for col in 0..width {
            let x = left + col;
            if x >= rw {
                break;
            }
            f(&mut pixels[y * rw + x], row * width + col);
        }
    }
}

/// Draw image pixels onto a raster, skipping the transparent index
fn overlay(
    raster: &mut Raster<SRgba8>,
    image: &Image,
    table: &ColorTable,
    transparent: Option<u8>,
) {
    let indices = image.indices();
    for_each_pixel(raster, image.desc(), |px, i| {
        let idx = indices[i];
        if Some(idx) != transparent {
            *px = table.color_at(idx.into());
        }
    });
}

/// Fill an image region of a raster with one color
fn fill(raster: &mut Raster<SRgba8>, desc: &ImageDesc, clr: SRgba8) {
    for_each_pixel(raster, desc, |px, _| *px = clr);
}

#[cfg(test)]
mod test {
    use crate::decode::test::*;
    use crate::{Decoder, Result, Step};

    fn steps(gif: &[u8]) -> Vec<Step> {
        Decoder::new(gif)
            .into_steps()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn restore_background() {
        let mut body = gce(0b0000_1000, 0, 0);
        body.extend(image((0, 0), (1, 1), 0, &[], 2, &[1]));
        body.extend(image((1, 0), (1, 1), 0, &[], 2, &[3]));
        body.push(b';');
        let gif = gif(2, 1, 0x81, 2, &TABLE4, &body);
        let steps = steps(&gif);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].raster().pixels(), &[rgb(255, 255, 255), clear()]);
        assert_eq!(steps[1].raster().pixels(), &[rgb(255, 0, 0), rgb(0, 255, 0)]);
    }

    #[test]
    fn restore_background_transparent() {
        // background index 0 with transparency enabled
        let mut body = gce(0b0000_1001, 0, 3);
        body.extend(image((0, 0), (2, 1), 0, &[], 2, &[1, 1]));
        body.extend(image((1, 0), (1, 1), 0, &[], 2, &[2]));
        body.push(b';');
        let gif = gif(2, 1, 0x81, 0, &TABLE4, &body);
        let steps = steps(&gif);
        assert_eq!(steps[1].raster().pixels(), &[clear(), rgb(255, 0, 0)]);
    }

    #[test]
    fn restore_previous() {
        let mut body = image((0, 0), (1, 1), 0, &[], 2, &[1]);
        body.extend(gce(0b0000_1100, 0, 0));
        body.extend(image((0, 0), (1, 1), 0, &[], 2, &[3]));
        body.extend(image((1, 0), (1, 1), 0, &[], 2, &[2]));
        body.push(b';');
        let gif = gif(2, 1, 0x81, 0, &TABLE4, &body);
        let steps = steps(&gif);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1].raster().pixels(), &[rgb(0, 255, 0), clear()]);
        assert_eq!(
            steps[2].raster().pixels(),
            &[rgb(255, 255, 255), rgb(255, 0, 0)]
        );
    }

    #[test]
    fn transparent_index() {
        let mut body = image((0, 0), (2, 1), 0, &[], 2, &[1, 1]);
        body.extend(gce(0b0000_0001, 25, 0));
        body.extend(image((0, 0), (2, 1), 0, &[], 2, &[0, 3]));
        body.push(b';');
        let gif = gif(2, 1, 0x81, 0, &TABLE4, &body);
        let steps = steps(&gif);
        assert_eq!(steps[0].delay_ms(), 100);
        assert_eq!(steps[1].delay_ms(), 250);
        assert_eq!(
            steps[1].raster().pixels(),
            &[rgb(255, 255, 255), rgb(0, 255, 0)]
        );
    }

    #[test]
    fn local_color_table() {
        let local = [9, 9, 9, 8, 8, 8];
        let mut body = image((0, 0), (1, 1), 0x80, &local, 2, &[1]);
        body.extend(image((1, 0), (1, 1), 0, &[], 2, &[1]));
        body.push(b';');
        let gif = gif(2, 1, 0x81, 0, &TABLE4, &body);
        let steps = steps(&gif);
        assert_eq!(steps[0].raster().pixels(), &[rgb(8, 8, 8), clear()]);
        assert_eq!(
            steps[1].raster().pixels(),
            &[rgb(8, 8, 8), rgb(255, 255, 255)]
        );
    }

    #[test]
    fn clipped_image() {
        let body = image((1, 0), (2, 2), 0, &[], 2, &[1, 2, 3, 1]);
        let gif = gif(2, 1, 0x81, 0, &TABLE4, &[&body[..], &b";"[..]].concat());
        let steps = steps(&gif);
        assert_eq!(steps[0].raster().pixels(), &[clear(), rgb(255, 255, 255)]);
    }

    #[test]
    fn canvas_unchanged_by_later_steps() {
        let mut body = image((0, 0), (1, 1), 0, &[], 2, &[1]);
        body.extend(image((0, 0), (1, 1), 0, &[], 2, &[2]));
        body.push(b';');
        let gif = gif(1, 1, 0x81, 0, &TABLE4, &body);
        let steps = steps(&gif);
        assert_eq!(steps[0].raster().pixels(), &[rgb(255, 255, 255)]);
        assert_eq!(steps[1].raster().pixels(), &[rgb(255, 0, 0)]);
    }
}
