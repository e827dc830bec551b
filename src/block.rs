// block.rs
//
// Copyright (c) 2019  Douglas Lau
//
//! GIF blocks
use crate::color::ColorTable;

/// Method for disposing of a frame after it is shown
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisposalMethod {
    /// No disposal specified (treated like `DoNotDispose`)
    Unspecified,
    /// Leave the frame in place
    DoNotDispose,
    /// Restore the frame area to the background color
    RestoreBackground,
    /// Restore the canvas to its state before the frame
    RestorePrevious,
}

impl Default for DisposalMethod {
    fn default() -> Self {
        DisposalMethod::Unspecified
    }
}

impl From<u8> for DisposalMethod {
    fn from(n: u8) -> Self {
        use self::DisposalMethod::*;
        match n & 0b0111 {
            1 => DoNotDispose,
            2 => RestoreBackground,
            3 => RestorePrevious,
            // 4-7 are reserved
            _ => Unspecified,
        }
    }
}

/// Block tag values
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum BlockCode {
    ImageDesc_,
    Extension_,
    Trailer_,
    Ignore_,
}

impl BlockCode {
    pub fn from_u8(t: u8) -> Option<Self> {
        use self::BlockCode::*;
        match t {
            b',' => Some(ImageDesc_), // (0x2C) Image separator
            b'!' => Some(Extension_), // (0x21) Extension introducer
            b';' => Some(Trailer_),   // (0x3B) GIF trailer
            0x00 => Some(Ignore_),    // written by some old encoders
            _ => None,
        }
    }
}

/// Extension label values
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ExtensionCode {
    PlainText_,
    GraphicControl_,
    Comment_,
    Application_,
}

impl ExtensionCode {
    pub fn from_u8(n: u8) -> Option<Self> {
        use self::ExtensionCode::*;
        match n {
            0x01 => Some(PlainText_),
            0xF9 => Some(GraphicControl_),
            0xFE => Some(Comment_),
            0xFF => Some(Application_),
            _ => None,
        }
    }
}

/// Header block (signature and version)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    version: [u8; 3],
}

impl Header {
    pub(crate) fn with_version(version: [u8; 3]) -> Self {
        Header { version }
    }

    /// Get the version (`87a` or `89a`)
    pub fn version(&self) -> [u8; 3] {
        self.version
    }
}

/// Logical Screen Descriptor block
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogicalScreenDesc {
    screen_width: u16,
    screen_height: u16,
    flags: u8,
    background_color_idx: u8, // index into global color table
    pixel_aspect_ratio: u8,
}

impl LogicalScreenDesc {
    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const COLOR_RESOLUTION: u8 = 0b0111_0000;
    const COLOR_TABLE_ORDERING: u8 = 0b0000_1000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    pub(crate) fn from_buf(buf: [u8; 7]) -> Self {
        LogicalScreenDesc {
            screen_width: u16::from_le_bytes([buf[0], buf[1]]),
            screen_height: u16::from_le_bytes([buf[2], buf[3]]),
            flags: buf[4],
            background_color_idx: buf[5],
            pixel_aspect_ratio: buf[6],
        }
    }

    /// Get the screen width
    pub fn screen_width(&self) -> u16 {
        self.screen_width
    }

    /// Get the screen height
    pub fn screen_height(&self) -> u16 {
        self.screen_height
    }

    /// Get the packed flags
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Check if a global color table follows
    pub fn has_color_table(&self) -> bool {
        self.flags & Self::COLOR_TABLE_PRESENT != 0
    }

    /// Get the color resolution (1 - 8 bits)
    pub fn color_resolution(&self) -> u8 {
        ((self.flags & Self::COLOR_RESOLUTION) >> 4) + 1
    }

    /// Check if the global color table is sorted
    pub fn color_table_ordered(&self) -> bool {
        self.flags & Self::COLOR_TABLE_ORDERING != 0
    }

    /// Get the global color table length (2 - 256)
    pub fn color_table_len(&self) -> usize {
        2 << (self.flags & Self::COLOR_TABLE_SIZE)
    }

    /// Get the background color index
    pub fn background_color_idx(&self) -> u8 {
        self.background_color_idx
    }

    /// Get the raw pixel aspect ratio byte
    pub fn pixel_aspect_ratio_raw(&self) -> u8 {
        self.pixel_aspect_ratio
    }

    /// Get the pixel aspect ratio as a (numerator, denominator) pair
    pub fn pixel_aspect_ratio(&self) -> (u16, u16) {
        (u16::from(self.pixel_aspect_ratio) + 15, 64)
    }
}

/// Graphic Control extension block
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GraphicControl {
    flags: u8,
    delay_time_cs: u16, // delay in centiseconds (hundredths of a second)
    transparent_color_idx: u8,
}

impl GraphicControl {
    const DISPOSAL_METHOD: u8 = 0b0001_1100;
    const USER_INPUT: u8 = 0b0000_0010;
    const TRANSPARENT_COLOR: u8 = 0b0000_0001;

    /// Delay used when none is specified, in milliseconds
    pub const DEFAULT_DELAY_MS: u32 = 100;

    pub(crate) fn from_buf(buf: &[u8; 4]) -> Self {
        GraphicControl {
            flags: buf[0],
            delay_time_cs: u16::from_le_bytes([buf[1], buf[2]]),
            transparent_color_idx: buf[3],
        }
    }

    /// Get the packed flags
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Get the disposal method
    pub fn disposal_method(&self) -> DisposalMethod {
        ((self.flags & Self::DISPOSAL_METHOD) >> 2).into()
    }

    /// Check the user input flag
    pub fn user_input(&self) -> bool {
        (self.flags & Self::USER_INPUT) != 0
    }

    /// Get the delay time in centiseconds
    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }

    /// Get the delay time in milliseconds (zero means default)
    pub fn delay_time_ms(&self) -> u32 {
        match self.delay_time_cs {
            0 => Self::DEFAULT_DELAY_MS,
            cs => u32::from(cs) * 10,
        }
    }

    /// Get the transparent color index, if any
    pub fn transparent_color(&self) -> Option<u8> {
        if (self.flags & Self::TRANSPARENT_COLOR) != 0 {
            Some(self.transparent_color_idx)
        } else {
            None
        }
    }
}

/// Comment extension block
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Comment {
    text: Vec<u8>, // ascii only comments recommended
}

impl Comment {
    pub(crate) fn with_text(text: Vec<u8>) -> Self {
        Comment { text }
    }

    /// Get the raw comment bytes
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Get the comment as a string, replacing invalid UTF-8
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.text).into_owned()
    }
}

/// Plain Text extension block
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlainText {
    grid_left: u16,
    grid_top: u16,
    grid_width: u16,
    grid_height: u16,
    cell_width: u8,
    cell_height: u8,
    foreground_color_idx: u8,
    background_color_idx: u8,
    text: Vec<u8>,
}

impl PlainText {
    pub(crate) fn from_buf(buf: &[u8; 12], text: Vec<u8>) -> Self {
        PlainText {
            grid_left: u16::from_le_bytes([buf[0], buf[1]]),
            grid_top: u16::from_le_bytes([buf[2], buf[3]]),
            grid_width: u16::from_le_bytes([buf[4], buf[5]]),
            grid_height: u16::from_le_bytes([buf[6], buf[7]]),
            cell_width: buf[8],
            cell_height: buf[9],
            foreground_color_idx: buf[10],
            background_color_idx: buf[11],
            text,
        }
    }

    /// Get the text grid position
    pub fn grid_position(&self) -> (u16, u16) {
        (self.grid_left, self.grid_top)
    }

    /// Get the text grid size
    pub fn grid_size(&self) -> (u16, u16) {
        (self.grid_width, self.grid_height)
    }

    /// Get the character cell size
    pub fn cell_size(&self) -> (u8, u8) {
        (self.cell_width, self.cell_height)
    }

    /// Get the foreground color index
    pub fn foreground_color_idx(&self) -> u8 {
        self.foreground_color_idx
    }

    /// Get the background color index
    pub fn background_color_idx(&self) -> u8 {
        self.background_color_idx
    }

    /// Get the text bytes
    pub fn text(&self) -> &[u8] {
        &self.text
    }
}

/// Application extension block
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Application {
    app_id: [u8; 8],
    auth_code: [u8; 3],
    app_data: Vec<u8>,
}

impl Application {
    pub(crate) fn from_buf(buf: &[u8; 11], app_data: Vec<u8>) -> Self {
        let mut app_id = [0; 8];
        app_id.copy_from_slice(&buf[..8]);
        let mut auth_code = [0; 3];
        auth_code.copy_from_slice(&buf[8..]);
        Application {
            app_id,
            auth_code,
            app_data,
        }
    }

    /// Get the application identifier
    pub fn app_id(&self) -> &[u8; 8] {
        &self.app_id
    }

    /// Get the authentication code
    pub fn auth_code(&self) -> &[u8; 3] {
        &self.auth_code
    }

    /// Get the application data (all sub-blocks concatenated)
    pub fn app_data(&self) -> &[u8] {
        &self.app_data
    }

    fn is_looping(&self) -> bool {
        (&self.app_id == b"NETSCAPE" && &self.auth_code == b"2.0")
            || (&self.app_id == b"ANIMEXTS" && &self.auth_code == b"1.0")
    }

    /// Get the animation loop count (zero means loop forever)
    pub fn loop_count(&self) -> Option<u16> {
        let d = &self.app_data;
        if self.is_looping() && d.len() == 3 && d[0] == 1 {
            Some(u16::from_le_bytes([d[1], d[2]]))
        } else {
            None
        }
    }
}

/// Image Descriptor block
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImageDesc {
    left: u16,
    top: u16,
    width: u16,
    height: u16,
    flags: u8,
}

impl ImageDesc {
    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const INTERLACED: u8 = 0b0100_0000;
    const COLOR_TABLE_ORDERING: u8 = 0b0010_0000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    pub(crate) fn from_buf(buf: [u8; 9]) -> Self {
        ImageDesc {
            left: u16::from_le_bytes([buf[0], buf[1]]),
            top: u16::from_le_bytes([buf[2], buf[3]]),
            width: u16::from_le_bytes([buf[4], buf[5]]),
            height: u16::from_le_bytes([buf[6], buf[7]]),
            flags: buf[8],
        }
    }

    /// Get the left position within the logical screen
    pub fn left(&self) -> u16 {
        self.left
    }

    /// Get the top position within the logical screen
    pub fn top(&self) -> u16 {
        self.top
    }

    /// Get the image width
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Get the image height
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Get the packed flags
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Check if rows are interlaced
    pub fn interlaced(&self) -> bool {
        (self.flags & Self::INTERLACED) != 0
    }

    /// Check if a local color table follows
    pub fn has_color_table(&self) -> bool {
        self.flags & Self::COLOR_TABLE_PRESENT != 0
    }

    /// Check if the local color table is sorted
    pub fn color_table_ordered(&self) -> bool {
        self.flags & Self::COLOR_TABLE_ORDERING != 0
    }

    /// Get the local color table length (2 - 256)
    pub fn color_table_len(&self) -> usize {
        2 << (self.flags & Self::COLOR_TABLE_SIZE)
    }

    /// Get the image size, in pixels
    pub fn image_sz(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Image block: descriptor, optional local color table and decoded indices
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    desc: ImageDesc,
    local_color_table: Option<ColorTable>,
    indices: Vec<u8>,
}

impl Image {
    pub(crate) fn new(
        desc: ImageDesc,
        local_color_table: Option<ColorTable>,
        indices: Vec<u8>,
    ) -> Self {
        debug_assert_eq!(indices.len(), desc.image_sz());
        Image {
            desc,
            local_color_table,
            indices,
        }
    }

    /// Get the image descriptor
    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    /// Get the local color table
    pub fn local_color_table(&self) -> Option<&ColorTable> {
        self.local_color_table.as_ref()
    }

    /// Get the color indices, in display row order
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }
}

/// One block in a GIF stream, following the preamble
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Graphic control extension, applying to the next image
    GraphicControl(GraphicControl),
    /// Comment extension
    Comment(Comment),
    /// Plain text extension
    PlainText(PlainText),
    /// Application extension
    Application(Application),
    /// Image with decoded color indices
    Image(Image),
    /// Stray zero tag, skipped
    Ignore,
    /// End of the GIF stream
    Trailer,
}

impl From<GraphicControl> for Block {
    fn from(b: GraphicControl) -> Self {
        Block::GraphicControl(b)
    }
}

impl From<Comment> for Block {
    fn from(b: Comment) -> Self {
        Block::Comment(b)
    }
}

impl From<PlainText> for Block {
    fn from(b: PlainText) -> Self {
        Block::PlainText(b)
    }
}

impl From<Application> for Block {
    fn from(b: Application) -> Self {
        Block::Application(b)
    }
}

impl From<Image> for Block {
    fn from(b: Image) -> Self {
        Block::Image(b)
    }
}

/// Blocks at the start of a GIF stream, before any other blocks
#[derive(Debug, Clone, PartialEq)]
pub struct Preamble {
    pub header: Header,
    pub logical_screen_desc: LogicalScreenDesc,
    /// Global color table, or the default table if none is present
    pub global_color_table: ColorTable,
}

impl Preamble {
    /// Get the screen width
    pub fn screen_width(&self) -> u16 {
        self.logical_screen_desc.screen_width()
    }

    /// Get the screen height
    pub fn screen_height(&self) -> u16 {
        self.logical_screen_desc.screen_height()
    }
}
