// decode.rs
//
// Copyright (c) 2019  Douglas Lau
//
//! GIF file decoding
use crate::block::*;
use crate::color::ColorTable;
use crate::compose::Compositor;
use crate::cursor::{read_chunks, ByteCursor, SubBlocks};
use crate::error::{Error, Result};
use crate::interlace::IndexWriter;
use crate::lzw::Decompressor;
use crate::private::Step;
use std::io::Read;

/// Read the Header block
pub(crate) fn read_header<R: Read>(
    cursor: &mut ByteCursor<R>,
) -> Result<Header> {
    let signature: [u8; 3] = cursor.read_array()?;
    if &signature != b"GIF" {
        return Err(Error::BadSignature);
    }
    let version: [u8; 3] = cursor.read_array()?;
    match &version {
        b"87a" | b"89a" => Ok(Header::with_version(version)),
        _ => Err(Error::BadVersion(version)),
    }
}

/// Read the Logical Screen Descriptor block
pub(crate) fn read_screen_desc<R: Read>(
    cursor: &mut ByteCursor<R>,
) -> Result<LogicalScreenDesc> {
    Ok(LogicalScreenDesc::from_buf(cursor.read_array()?))
}

/// Read the fixed-size first sub-block of an extension
fn fixed_header<R: Read, const N: usize>(
    sub_blocks: &mut SubBlocks<'_, R>,
) -> Result<[u8; N]> {
    match sub_blocks.next_chunk()? {
        Some(chunk) if chunk.len() == N => {
            let mut buf = [0; N];
            buf.copy_from_slice(chunk);
            Ok(buf)
        }
        _ => Err(Error::MalformedExtension),
    }
}

/// An `Iterator` for [Block]s within a GIF file.
///
/// Build with Decoder.[into_blocks].
///
/// The preamble (header, logical screen descriptor and global color table)
/// is read first, and is available through [preamble].  Iteration ends after
/// the [Trailer] block, or after the first error.
///
/// [Block]: block/enum.Block.html
/// [into_blocks]: struct.Decoder.html#method.into_blocks
/// [preamble]: struct.Blocks.html#method.preamble
/// [Trailer]: block/enum.Block.html#variant.Trailer
pub struct Blocks<R: Read> {
    /// Cursor for input data
    cursor: ByteCursor<R>,
    /// Maximum image size, in pixels
    max_image_sz: Option<usize>,
    /// Preamble blocks
    preamble: Option<Preamble>,
    /// Trailer found, or error encountered
    done: bool,
}

impl<R: Read> Iterator for Blocks<R> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let res = match self.preamble() {
            Ok(_) => self.next_block(),
            Err(e) => Err(e),
        };
        match res {
            Ok(Block::Trailer) | Err(_) => self.done = true,
            _ => (),
        }
        Some(res)
    }
}

impl<R: Read> Blocks<R> {
    /// Create a new block iterator
    pub(crate) fn new(reader: R, max_image_sz: Option<usize>) -> Self {
        Blocks {
            cursor: ByteCursor::new(reader),
            max_image_sz,
            preamble: None,
            done: false,
        }
    }

    /// Get the preamble, reading it if necessary
    pub fn preamble(&mut self) -> Result<&Preamble> {
        let preamble = match self.preamble.take() {
            Some(preamble) => preamble,
            None => match self.read_preamble() {
                Ok(preamble) => preamble,
                Err(e) => {
                    self.done = true;
                    return Err(e);
                }
            },
        };
        Ok(self.preamble.get_or_insert(preamble))
    }

    /// Read the preamble blocks
    fn read_preamble(&mut self) -> Result<Preamble> {
        if self.done {
            return Err(Error::UnexpectedEndOfStream);
        }
        let header = read_header(&mut self.cursor)?;
        let logical_screen_desc = read_screen_desc(&mut self.cursor)?;
        let desc = &logical_screen_desc;
        let global_color_table = if desc.has_color_table() {
            ColorTable::read(
                &mut self.cursor,
                desc.color_table_len(),
                desc.color_table_ordered(),
            )?
        } else {
            ColorTable::with_default(
                desc.color_table_len(),
                desc.color_resolution(),
            )
        };
        debug!("preamble : {:?} {:?}", header, logical_screen_desc);
        Ok(Preamble {
            header,
            logical_screen_desc,
            global_color_table,
        })
    }

    /// Decode the next block (including all sub-blocks)
    fn next_block(&mut self) -> Result<Block> {
        let tag = self
            .cursor
            .read_byte()?
            .ok_or(Error::UnexpectedEndOfStream)?;
        let block: Block = match BlockCode::from_u8(tag) {
            Some(BlockCode::ImageDesc_) => self.read_image()?.into(),
            Some(BlockCode::Extension_) => self.read_extension()?,
            Some(BlockCode::Trailer_) => Block::Trailer,
            Some(BlockCode::Ignore_) => Block::Ignore,
            None => return Err(Error::UnknownBlockType(tag)),
        };
        match &block {
            Block::Image(img) => debug!("  block  : Image {:?}", img.desc()),
            _ => debug!("  block  : {:?}", block),
        }
        Ok(block)
    }

    /// Read an extension block
    fn read_extension(&mut self) -> Result<Block> {
        use crate::block::ExtensionCode::*;
        let label = self.cursor.read_u8()?;
        let code =
            ExtensionCode::from_u8(label).ok_or(Error::UnknownExtension(label))?;
        Ok(match code {
            Comment_ => {
                let text = read_chunks(&mut self.cursor)?;
                Comment::with_text(text).into()
            }
            GraphicControl_ => {
                let mut sub_blocks = SubBlocks::new(&mut self.cursor);
                let buf = fixed_header::<_, 4>(&mut sub_blocks)?;
                sub_blocks.drain()?;
                GraphicControl::from_buf(&buf).into()
            }
            PlainText_ => {
                let mut sub_blocks = SubBlocks::new(&mut self.cursor);
                let buf = fixed_header::<_, 12>(&mut sub_blocks)?;
                let text = sub_blocks.read_to_end()?;
                PlainText::from_buf(&buf, text).into()
            }
            Application_ => {
                let mut sub_blocks = SubBlocks::new(&mut self.cursor);
                let buf = fixed_header::<_, 11>(&mut sub_blocks)?;
                let app_data = sub_blocks.read_to_end()?;
                Application::from_buf(&buf, app_data).into()
            }
        })
    }

    /// Read an image block: descriptor, local color table and image data
    fn read_image(&mut self) -> Result<Image> {
        let desc = ImageDesc::from_buf(self.cursor.read_array()?);
        if let Some(sz) = self.max_image_sz {
            if desc.image_sz() > sz {
                return Err(Error::TooLargeImage);
            }
        }
        let local_color_table = if desc.has_color_table() {
            Some(ColorTable::read(
                &mut self.cursor,
                desc.color_table_len(),
                desc.color_table_ordered(),
            )?)
        } else {
            None
        };
        let min_code_bits = self.cursor.read_u8()?;
        if min_code_bits < 2 || min_code_bits > 11 {
            return Err(Error::InvalidCodeSize(min_code_bits));
        }
        let mut writer = IndexWriter::new(
            desc.width().into(),
            desc.height().into(),
            desc.interlaced(),
        );
        let mut sub_blocks = SubBlocks::new(&mut self.cursor);
        let mut truncated = false;
        let found_end = Decompressor::new(min_code_bits).decompress(
            || match sub_blocks.next_byte() {
                // only the first sub-block is required
                Err(Error::InsufficientData) if sub_blocks.n_chunks() > 0 => {
                    truncated = true;
                    Ok(None)
                }
                res => res,
            },
            &mut writer,
        )?;
        if truncated {
            warn!(
                "Truncated image data: {} of {} pixels",
                writer.n_written(),
                writer.len()
            );
        } else {
            if !found_end {
                debug!("Image data has no end code");
            }
            if !sub_blocks.is_done() {
                match sub_blocks.drain() {
                    Ok(extra) if extra > 0 => {
                        warn!("Extra image data: {} bytes", extra);
                    }
                    Ok(_) => (),
                    // stream ended before the block terminator
                    Err(Error::InsufficientData)
                        if sub_blocks.n_chunks() > 0 =>
                    {
                        warn!("Truncated image data after end code");
                    }
                    Err(e) => return Err(e),
                }
            }
            if !writer.is_full() {
                warn!(
                    "Incomplete image data: {} of {} pixels",
                    writer.n_written(),
                    writer.len()
                );
            }
        }
        Ok(Image::new(desc, local_color_table, writer.into_indices()))
    }
}

/// An `Iterator` for composited [Step]s within a GIF file.
///
/// Build with Decoder.[into_steps].
///
/// Each image in the file produces one step: the logical screen with the
/// image drawn over whatever earlier frames left behind.
///
/// [Step]: struct.Step.html
/// [into_steps]: struct.Decoder.html#method.into_steps
pub struct Steps<R: Read> {
    /// Block iterator
    blocks: Blocks<R>,
    /// Compositor for the logical screen
    compositor: Option<Compositor>,
    /// Graphic control for the next image
    graphic_control_ext: Option<GraphicControl>,
}

impl<R: Read> Iterator for Steps<R> {
    type Item = Result<Step>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.compositor.is_none() {
            if self.blocks.done {
                return None;
            }
            match self.compositor() {
                Ok(compositor) => self.compositor = Some(compositor),
                Err(e) => {
                    self.blocks.done = true;
                    return Some(Err(e));
                }
            }
        }
        while let Some(block) = self.blocks.next() {
            match block {
                Ok(Block::GraphicControl(b)) => {
                    if self.graphic_control_ext.replace(b).is_some() {
                        warn!("Graphic control extension replaced before use");
                    }
                }
                Ok(Block::Image(image)) => {
                    let control = self.graphic_control_ext.take();
                    if let Some(compositor) = &mut self.compositor {
                        return Some(Ok(compositor.compose(&image, control)));
                    }
                }
                Ok(_) => (),
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

impl<R: Read> Steps<R> {
    /// Create a new step iterator
    pub(crate) fn new(blocks: Blocks<R>) -> Self {
        Steps {
            blocks,
            compositor: None,
            graphic_control_ext: None,
        }
    }

    /// Get the preamble, reading it if necessary
    pub fn preamble(&mut self) -> Result<&Preamble> {
        self.blocks.preamble()
    }

    /// Create the compositor, checking the canvas size limit
    fn compositor(&mut self) -> Result<Compositor> {
        let max_image_sz = self.blocks.max_image_sz;
        let preamble = self.blocks.preamble()?;
        let desc = &preamble.logical_screen_desc;
        let canvas_sz = usize::from(desc.screen_width())
            * usize::from(desc.screen_height());
        if let Some(sz) = max_image_sz {
            if canvas_sz > sz {
                return Err(Error::TooLargeImage);
            }
        }
        Ok(Compositor::new(preamble))
    }
}
