//! Common types shared by the block parser, the compositor and the consumers

use crate::reader::{ColorTable, Header};

/// Disposal method
///
/// Tells the compositor what to do with a frame's rectangle before the
/// following frame is drawn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DisposalMethod {
    /// No graphic control extension was seen. The next frame starts from a fresh canvas.
    #[default]
    NoAction = 0,
    /// Do not dispose.
    LeaveInPlace = 1,
    /// Restore the frame's rectangle to the background color.
    RestoreToBackground = 2,
    /// Restore the canvas to what it was before the frame was drawn.
    RestoreToPrevious = 3,
}

impl DisposalMethod {
    /// Converts the 3-bit disposal field of a graphic control extension.
    ///
    /// An explicit "no action" and the reserved values 4–7 are promoted to
    /// `LeaveInPlace`, which is what animations in the wild expect.
    pub fn from_control_flags(flags: u8) -> DisposalMethod {
        match (flags & 0b1_1100) >> 2 {
            2 => DisposalMethod::RestoreToBackground,
            3 => DisposalMethod::RestoreToPrevious,
            _ => DisposalMethod::LeaveInPlace,
        }
    }
}

/// Known GIF block types
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Block {
    /// Image block.
    Image = 0x2C,
    /// Extension block.
    Extension = 0x21,
    /// Image trailer.
    Trailer = 0x3B,
}

impl Block {
    /// Converts `u8` to `Option<Self>`
    pub fn from_u8(n: u8) -> Option<Block> {
        match n {
            0x2C => Some(Block::Image),
            0x21 => Some(Block::Extension),
            0x3B => Some(Block::Trailer),
            _ => None,
        }
    }
}

/// Known GIF extensions
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Extension {
    /// Text extension.
    Text = 0x01,
    /// Control extension.
    Control = 0xF9,
    /// Comment extension.
    Comment = 0xFE,
    /// Application extension.
    Application = 0xFF,
}

impl Extension {
    /// Converts `u8` to `Option<Self>`
    pub fn from_u8(n: u8) -> Option<Extension> {
        match n {
            0x01 => Some(Extension::Text),
            0xF9 => Some(Extension::Control),
            0xFE => Some(Extension::Comment),
            0xFF => Some(Extension::Application),
            _ => None,
        }
    }
}

/// Position and size of a frame on the logical screen.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Rect {
    /// Offset from the left border of the canvas.
    pub x: u16,
    /// Offset from the top border of the canvas.
    pub y: u16,
    /// Width of the frame.
    pub width: u16,
    /// Height of the frame.
    pub height: u16,
}

impl Rect {
    /// Creates a new rectangle.
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Rect { x, y, width, height }
    }

    /// Number of pixels covered by the rectangle.
    #[inline]
    pub fn area(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Whether the rectangle lies completely within a `width` × `height` canvas.
    pub fn fits_within(&self, width: u16, height: u16) -> bool {
        u32::from(self.x) + u32::from(self.width) <= u32::from(width)
            && u32::from(self.y) + u32::from(self.height) <= u32::from(height)
    }
}

/// Number of times an animation is played
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Repeat {
    /// Finite number of repetitions
    Finite(u16),
    /// Looping GIF
    #[default]
    Infinite,
}

impl Repeat {
    /// Interprets the loop count stored in a NETSCAPE2.0 extension, where 0 means forever.
    pub fn from_loop_count(count: u16) -> Repeat {
        if count == 0 {
            Repeat::Infinite
        } else {
            Repeat::Finite(count)
        }
    }
}

/// A decoded GIF frame
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Frame rectangle on the logical screen.
    pub bounds: Rect,
    /// Disposal method.
    pub dispose: DisposalMethod,
    /// True if the graphic control extension declared a transparent index.
    pub has_transparency: bool,
    /// Transparent palette index. Only meaningful if `has_transparency` is set.
    pub transparency_index: u8,
    /// True if the image data is interlaced.
    pub interlaced: bool,
    /// Frame delay in milliseconds, never below 10.
    pub delay_ms: u32,
    /// Loop count of the animation as known when this frame was read, 0 means forever.
    pub loop_count: u16,
    /// Background color of the logical screen when the frame was read.
    pub background_color: u32,
    /// Frame local color table if available.
    pub palette: Option<ColorTable>,
    /// The composited canvas as packed ARGB, `width * height` of the logical screen.
    ///
    /// `None` until compositing succeeded, and always `None` when frame decoding is skipped.
    pub pixel_data: Option<Vec<u32>>,
}

impl Frame {
    /// Color table used for this frame: the local one if present, else the global one.
    pub fn color_table<'a>(&'a self, header: &'a Header) -> Option<&'a ColorTable> {
        self.palette.as_ref().or(header.global_color_table.as_ref())
    }

    /// Typed view of [`Frame::loop_count`].
    pub fn repeat(&self) -> Repeat {
        Repeat::from_loop_count(self.loop_count)
    }

    /// Transparent index if the frame declares one.
    pub fn transparent(&self) -> Option<u8> {
        self.has_transparency.then_some(self.transparency_index)
    }
}
