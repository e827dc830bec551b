// lib.rs      gifanim crate.
//
// Copyright (c) 2019  Douglas Lau
//
//! Decoder for GIF animations, producing fully composited frames.
//!
//! * [Decoder] builds iterators of [Step]s or low-level [Block]s
//! * [Animation] collects every frame with its delay
//! * [probe] reads the logical screen size only
//!
//! [Animation]: struct.Animation.html
//! [Block]: block/enum.Block.html
//! [Decoder]: struct.Decoder.html
//! [probe]: fn.probe.html
//! [Step]: struct.Step.html
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

mod animation;
pub mod block;
mod color;
mod compose;
mod cursor;
mod decode;
mod error;
mod interlace;
mod lzw;
mod private;

pub use crate::animation::Animation;
pub use crate::color::ColorTable;
pub use crate::decode::{Blocks, Steps};
pub use crate::error::{Error, Result};
pub use crate::private::{is_gif, probe, DecodeVisitor, Decoder, Step};
