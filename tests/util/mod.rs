//! In-memory GIF fixtures.
#![allow(dead_code)]

use weezl::{encode::Encoder, BitOrder};

pub const WHITE: u32 = 0xFFFF_FFFF;
pub const BLACK: u32 = 0xFF00_0000;
pub const RED: u32 = 0xFFFF_0000;
pub const GREEN: u32 = 0xFF00_FF00;
pub const BLUE: u32 = 0xFF00_00FF;

/// Palette used by most fixtures: red, green, blue, white.
pub const RGBW: &[u8] = &[0xFF, 0, 0, 0, 0xFF, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF];

/// Appends GIF blocks one after another.
pub struct GifBuilder {
    data: Vec<u8>,
}

/// Packed size field and padded RGB bytes for a color table.
fn table(rgb: &[u8]) -> (u8, Vec<u8>) {
    let entries = (rgb.len() / 3).max(2).next_power_of_two();
    let bits = entries.trailing_zeros() as u8;
    let mut padded = rgb.to_vec();
    padded.resize(entries * 3, 0);
    (bits - 1, padded)
}

fn min_code_size(table_len: usize) -> u8 {
    (table_len.max(4).next_power_of_two().trailing_zeros() as u8).max(2)
}

/// Wraps bytes into sub-blocks followed by the terminator.
pub fn sub_blocks(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in bytes.chunks(255) {
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
    out.push(0);
    out
}

/// Rows in the order an interlaced image stores them.
pub fn interlace(indices: &[u8], width: usize) -> Vec<u8> {
    let height = indices.len() / width;
    let mut out = Vec::with_capacity(indices.len());
    for (start, step) in [(0, 8), (4, 8), (2, 4), (1, 2)] {
        for row in (start..height).step_by(step) {
            out.extend_from_slice(&indices[row * width..(row + 1) * width]);
        }
    }
    out
}

impl GifBuilder {
    /// Header and logical screen descriptor, with a global table if `global` is given.
    pub fn new(width: u16, height: u16, global: Option<&[u8]>, background: u8) -> Self {
        let mut data = b"GIF89a".to_vec();
        data.extend_from_slice(&width.to_le_bytes());
        data.extend_from_slice(&height.to_le_bytes());
        match global {
            Some(rgb) => {
                let (size, rgb) = table(rgb);
                data.extend_from_slice(&[0x80 | size, background, 0]);
                data.extend_from_slice(&rgb);
            }
            None => data.extend_from_slice(&[0, background, 0]),
        }
        GifBuilder { data }
    }

    pub fn loop_count(mut self, count: u16) -> Self {
        self.data.extend_from_slice(&[0x21, 0xFF, 11]);
        self.data.extend_from_slice(b"NETSCAPE2.0");
        self.data.extend_from_slice(&[3, 1]);
        self.data.extend_from_slice(&count.to_le_bytes());
        self.data.push(0);
        self
    }

    pub fn comment(mut self, text: &str) -> Self {
        self.data.extend_from_slice(&[0x21, 0xFE]);
        self.data.extend_from_slice(&sub_blocks(text.as_bytes()));
        self
    }

    /// Graphic control extension with the raw 3-bit disposal value.
    pub fn control(mut self, disposal: u8, delay: u16, transparent: Option<u8>) -> Self {
        let flags = (disposal & 0b111) << 2 | u8::from(transparent.is_some());
        self.data.extend_from_slice(&[0x21, 0xF9, 4, flags]);
        self.data.extend_from_slice(&delay.to_le_bytes());
        self.data.extend_from_slice(&[transparent.unwrap_or(0), 0]);
        self
    }

    /// Image with indices given in natural row order.
    pub fn image(self, bounds: (u16, u16, u16, u16), indices: &[u8]) -> Self {
        self.image_with(bounds, None, false, indices)
    }

    pub fn image_with(
        mut self,
        (x, y, width, height): (u16, u16, u16, u16),
        local: Option<&[u8]>,
        interlaced: bool,
        indices: &[u8],
    ) -> Self {
        self.data.push(0x2C);
        for v in [x, y, width, height] {
            self.data.extend_from_slice(&v.to_le_bytes());
        }
        let mut flags = if interlaced { 0x40 } else { 0 };
        let table_len = match local {
            Some(rgb) => {
                let (size, rgb) = table(rgb);
                flags |= 0x80 | size;
                self.data.push(flags);
                self.data.extend_from_slice(&rgb);
                rgb.len() / 3
            }
            None => {
                self.data.push(flags);
                indices.iter().max().map_or(4, |&max| usize::from(max) + 1)
            }
        };
        let stored = if interlaced && width > 0 {
            interlace(indices, usize::from(width))
        } else {
            indices.to_vec()
        };
        let code_size = min_code_size(table_len);
        let lzw = Encoder::new(BitOrder::Lsb, code_size).encode(&stored).unwrap();
        self.data.push(code_size);
        self.data.extend_from_slice(&sub_blocks(&lzw));
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// The stream so far, without trailer.
    pub fn build(self) -> Vec<u8> {
        self.data
    }

    pub fn trailer(mut self) -> Vec<u8> {
        self.data.push(0x3B);
        self.data
    }
}

/// A small animation touching every disposal method, transparency and interlacing.
pub fn animation() -> Vec<u8> {
    let pattern: Vec<u8> = (0..64).map(|i| (i % 3) as u8).collect();
    GifBuilder::new(8, 8, Some(RGBW), 3)
        .loop_count(0)
        .control(1, 10, None)
        .image((0, 0, 8, 8), &pattern)
        .comment("frame two")
        .control(2, 20, Some(0))
        .image_with((2, 2, 4, 4), None, true, &[0, 1, 2, 1, 0, 1, 2, 1, 0, 1, 2, 1, 0, 1, 2, 1])
        .control(3, 5, None)
        .image_with((0, 0, 2, 8), Some(&[0, 0, 0, 0xFF, 0xFF, 0]), false, &[1; 16])
        .control(0, 0, Some(3))
        .image((4, 4, 4, 4), &[3, 3, 0, 0, 3, 3, 1, 1, 3, 3, 2, 2, 3, 3, 3, 3])
        .trailer()
}
