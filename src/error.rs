// error.rs
//
// Copyright (c) 2019  Douglas Lau
//
use std::fmt;
use std::io;

/// Errors encountered while decoding
#[derive(Debug)]
pub enum Error {
    /// A wrapped I/O error.
    Io(io::Error),
    /// Signature is not `GIF`.
    BadSignature,
    /// GIF version not supported (87a or 89a only).
    BadVersion([u8; 3]),
    /// Invalid [Block](block/enum.Block.html) tag.
    UnknownBlockType(u8),
    /// Extension label not recognized.
    UnknownExtension(u8),
    /// Stream ended where a block was expected.
    UnexpectedEndOfStream,
    /// Stream ended inside a fixed-size structure.
    InsufficientData,
    /// Extension header has an invalid length.
    MalformedExtension,
    /// LZW minimum code size out of range.
    InvalidCodeSize(u8),
    /// Image or logical screen larger than specified by
    /// [max_image_sz](struct.Decoder.html#method.max_image_sz).
    TooLargeImage,
    /// Stream contained no images.
    NoFrames,
}

/// Result type for decoding
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(fmt),
            _ => fmt::Debug::fmt(self, fmt),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::InsufficientData,
            _ => Error::Io(err),
        }
    }
}
