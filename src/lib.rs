//! # GIF animation decoder
//!
//! Decodes GIF87a and GIF89a streams into fully composited frames. Every frame
//! carries the whole logical screen as packed `0xAARRGGBB` pixels, with the
//! disposal of the previous frame, interlacing and transparency already
//! applied, ready to be shown one after another for `delay_ms` each.
//!
//! The decoder reads from any [`std::io::Read`] sequentially and never seeks.
//!
//! ## Pulling frames
//!
//! ```
//! # fn main() -> Result<(), gif_frames::DecodingError> {
//! # let data: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\x00\x00\x00\x00\x00\x2c\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02\x44\x01\x00\x3b";
//! let mut options = gif_frames::DecodeOptions::new();
//! options.check_frame_consistency(true);
//! let mut decoder = options.read_info(data)?;
//! let (width, height) = (decoder.width(), decoder.height());
//! while let Some(frame) = decoder.read_next_frame()? {
//!     let canvas = frame.pixel_data.as_deref().unwrap_or_default();
//!     assert_eq!(canvas.len(), usize::from(width) * usize::from(height));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Pushing frames into a sink
//!
//! [`decode`] drives the whole stream and hands each frame to a [`FrameSink`].
//! A `Vec<Frame>` collects them, [`from_fn`] wraps a closure:
//!
//! ```
//! use std::ops::ControlFlow;
//! # fn main() -> Result<(), gif_frames::DecodingError> {
//! # let data: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\x00\x00\x00\x00\x00\x2c\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02\x44\x01\x00\x3b";
//! let mut total_ms = 0;
//! gif_frames::decode(data, gif_frames::from_fn(|_header, frame| {
//!     total_ms += frame.delay_ms;
//!     ControlFlow::Continue(())
//! }))?;
//! assert_eq!(total_ms, 10);
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]
#![deny(unsafe_code)]

mod common;
mod reader;
mod traits;

pub use crate::common::{Block, DisposalMethod, Extension, Frame, Rect, Repeat};
pub use crate::traits::{from_fn, FrameSink, FromFn, ReadBytesExt};

pub use crate::reader::{decode, DecodeOptions, Decoder, DecoderIter, MemoryLimit};
pub use crate::reader::{ColorTable, Header, MAX_COLORS, PLTE_CHANNELS};
pub use crate::reader::{DecodingError, DecodingFormatError, FormatErrorKind};

#[cfg(test)]
#[test]
fn decoder_is_send() {
    fn is_send<T: Send>() {}
    is_send::<Decoder<std::fs::File>>();
}
