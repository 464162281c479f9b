use std::fmt;
use std::io::BufRead;
use std::ops::Deref;

use log::debug;

use super::block::BlockReader;
use super::decoder::{DecodingError, FormatErrorKind};

/// GIF palettes are RGB
pub const PLTE_CHANNELS: usize = 3;

/// Maximum number of entries in a color table.
pub const MAX_COLORS: usize = 256;

/// A palette of up to 256 colors, packed as `0xAARRGGBB`.
///
/// The table always has room for 256 entries so that any 8-bit index can be
/// looked up. Entries past [`len`](ColorTable::len) are `0`, which the
/// compositor treats like a transparent pixel.
#[derive(Clone, PartialEq, Eq)]
pub struct ColorTable {
    colors: Box<[u32; MAX_COLORS]>,
    size: u16,
    /// Index forced to 0 and the color it replaced.
    transparency: Option<(u8, u32)>,
}

impl ColorTable {
    /// Creates a table of `size` black entries. `size` is clamped to 256.
    pub fn new(size: u16) -> Self {
        ColorTable {
            colors: Box::new([0; MAX_COLORS]),
            size: size.min(MAX_COLORS as u16),
            transparency: None,
        }
    }

    /// Builds a table from RGB triplets. Extra bytes beyond 256 colors are ignored.
    pub fn from_rgb(rgb: &[u8]) -> Self {
        let entries = rgb.len().min(PLTE_CHANNELS * MAX_COLORS) / PLTE_CHANNELS;
        let mut table = ColorTable::new(entries as u16);
        table.fill_from_rgb(rgb);
        table
    }

    /// Number of entries declared by the packed size field of a descriptor.
    #[inline]
    pub fn size_from_flags(flags: u8) -> u16 {
        2 << (flags & 0b111)
    }

    /// Reads `3 * size` bytes of RGB triplets.
    pub(crate) fn parse<R: BufRead>(
        &mut self,
        reader: &mut BlockReader<R>,
    ) -> Result<(), DecodingError> {
        let mut rgb = [0; PLTE_CHANNELS * MAX_COLORS];
        let rgb = &mut rgb[..PLTE_CHANNELS * usize::from(self.size)];
        if reader.read_up_to(rgb)? < rgb.len() {
            return Err(DecodingError::format(FormatErrorKind::InvalidColorTable));
        }
        self.fill_from_rgb(rgb);
        Ok(())
    }

    fn fill_from_rgb(&mut self, rgb: &[u8]) {
        self.transparency = None;
        *self.colors = [0; MAX_COLORS];
        for (color, c) in self.colors.iter_mut().zip(rgb.chunks_exact(PLTE_CHANNELS)) {
            *color = 0xFF00_0000 | u32::from(c[0]) << 16 | u32::from(c[1]) << 8 | u32::from(c[2]);
        }
    }

    /// Packed color at `index`.
    #[inline]
    pub fn color(&self, index: u8) -> u32 {
        self.colors[usize::from(index)]
    }

    /// Number of declared entries.
    #[inline]
    pub fn len(&self) -> usize {
        usize::from(self.size)
    }

    /// True if the table declares no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The declared entries.
    pub fn colors(&self) -> &[u32] {
        &self.colors[..self.len()]
    }

    /// Forces the entry at `index` to `0` until [`reset_transparency`](Self::reset_transparency).
    ///
    /// A transparency set earlier is reset first, so the call can be repeated safely.
    pub fn set_transparency(&mut self, index: u8) {
        self.reset_transparency();
        let slot = &mut self.colors[usize::from(index)];
        self.transparency = Some((index, *slot));
        *slot = 0;
    }

    /// Restores the entry replaced by [`set_transparency`](Self::set_transparency).
    pub fn reset_transparency(&mut self) {
        if let Some((index, color)) = self.transparency.take() {
            self.colors[usize::from(index)] = color;
        }
    }

    /// Index currently forced to transparent.
    pub fn transparency(&self) -> Option<u8> {
        self.transparency.map(|(index, _)| index)
    }

    /// Sets transparency for the lifetime of the returned guard.
    pub(crate) fn scoped_transparency(&mut self, index: Option<u8>) -> TransparencyScope<'_> {
        if let Some(index) = index {
            self.set_transparency(index);
        }
        TransparencyScope { table: self }
    }
}

impl fmt::Debug for ColorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorTable")
            .field("size", &self.size)
            .field("transparency", &self.transparency())
            .finish_non_exhaustive()
    }
}

/// Resets the color table's transparency on drop.
pub(crate) struct TransparencyScope<'a> {
    table: &'a mut ColorTable,
}

impl Deref for TransparencyScope<'_> {
    type Target = ColorTable;

    fn deref(&self) -> &ColorTable {
        self.table
    }
}

impl Drop for TransparencyScope<'_> {
    fn drop(&mut self) {
        self.table.reset_transparency();
    }
}

/// Logical screen descriptor and global color table.
#[derive(Debug, Clone)]
pub struct Header {
    /// Signature token, `GIF` in any case.
    pub signature: String,
    /// Version string, usually `87a` or `89a`. Not validated.
    pub version: String,
    /// Width of the logical screen.
    pub width: u16,
    /// Height of the logical screen.
    pub height: u16,
    /// Index of the background color in the global color table.
    pub background_color_index: u8,
    /// The background color, or 0 without a global color table.
    pub background_color: u32,
    /// Global color table if available.
    pub global_color_table: Option<ColorTable>,
    /// Raw pixel aspect ratio byte.
    pub pixel_aspect_ratio: u8,
}

impl Header {
    /// Parses the signature, logical screen descriptor and global color table.
    ///
    /// With `skip_signature`, the caller has already consumed the `GIF` token.
    pub(crate) fn parse<R: BufRead>(
        reader: &mut BlockReader<R>,
        skip_signature: bool,
    ) -> Result<Header, DecodingError> {
        let signature = if skip_signature {
            String::from("GIF")
        } else {
            reader.read_string(3)?
        };
        if !signature.eq_ignore_ascii_case("GIF") {
            return Err(DecodingError::format(FormatErrorKind::NotAGif));
        }
        let version = reader.read_string(3)?;
        let width = reader.read_u16()?;
        let height = reader.read_u16()?;
        let flags = reader.read_byte()?;
        let background_color_index = reader.read_byte()?;
        let pixel_aspect_ratio = reader.read_byte()?;

        let global_color_table = if flags & 0x80 != 0 {
            let mut table = ColorTable::new(ColorTable::size_from_flags(flags));
            table.parse(reader)?;
            Some(table)
        } else {
            None
        };
        let background_color = global_color_table
            .as_ref()
            .map_or(0, |table| table.color(background_color_index));

        debug!(
            "GIF{} header: {}x{}, global color table: {:?}, background index {}",
            version,
            width,
            height,
            global_color_table.as_ref().map(ColorTable::len),
            background_color_index
        );

        Ok(Header {
            signature,
            version,
            width,
            height,
            background_color_index,
            background_color,
            global_color_table,
            pixel_aspect_ratio,
        })
    }

    /// Number of pixels of the logical screen.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}
