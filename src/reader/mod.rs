use core::iter::FusedIterator;
use core::num::NonZeroU64;
use std::io;
use std::io::prelude::*;

use log::debug;

use crate::common::{DisposalMethod, Frame, Repeat};
use crate::traits::FrameSink;

mod block;
mod converter;
mod decoder;
mod header;
mod lzw;

pub use self::decoder::{DecodingError, DecodingFormatError, FormatErrorKind};
pub use self::header::{ColorTable, Header, MAX_COLORS, PLTE_CHANNELS};

use self::decoder::StreamingDecoder;

/// Bytes per pixel of a composited canvas.
const CANVAS_BYTES_PER_PIXEL: u64 = 4;

#[derive(Clone, Debug)]
/// The maximum amount of memory the decoder is allowed to use for each frame
pub enum MemoryLimit {
    /// Enforce no memory limit.
    ///
    /// If you intend to process images from unknown origins this is a potentially dangerous
    /// constant to use, as your program could be vulnerable to decompression bombs. A 65535×65535
    /// logical screen needs 16GiB for its canvas alone.
    Unlimited,
    /// Limit the memory used for a frame's canvas, saved canvas and index buffer
    /// to this many bytes.
    ///
    /// It may not be enforced precisely due to allocator overhead
    /// and the decoder allocating small auxiliary buffers.
    Bytes(NonZeroU64),
}

impl MemoryLimit {
    fn check_size(&self, size: u64) -> Result<(), DecodingError> {
        match self {
            Self::Unlimited => Ok(()),
            Self::Bytes(limit) => {
                if size <= limit.get() {
                    Ok(())
                } else {
                    Err(DecodingError::MemoryLimit)
                }
            }
        }
    }

    fn canvas_size(header: &Header) -> u64 {
        // cannot overflow, the maximum is 16GiB
        u64::from(header.width) * u64::from(header.height) * CANVAS_BYTES_PER_PIXEL
    }

    /// Rejects a logical screen whose canvas alone exceeds the limit.
    fn check_canvas(&self, header: &Header) -> Result<(), DecodingError> {
        let size = Self::canvas_size(header);
        // on 32-bit platforms the canvas may not be addressable at all
        if usize::try_from(size).is_err() {
            return Err(DecodingError::MemoryLimit);
        }
        self.check_size(size)
    }

    /// Checks the buffers needed to decode and composite `frame`.
    fn check_frame(&self, header: &Header, frame: &Frame) -> Result<(), DecodingError> {
        let canvases = if frame.dispose == DisposalMethod::RestoreToPrevious { 2 } else { 1 };
        let indices = u64::from(frame.bounds.width) * u64::from(frame.bounds.height);
        self.check_size(Self::canvas_size(header) * canvases + indices)
    }
}

/// Options for opening a GIF decoder. [`DecodeOptions::read_info`] will start the decoder.
#[derive(Clone, Debug)]
pub struct DecodeOptions {
    memory_limit: MemoryLimit,
    check_frame_consistency: bool,
    check_lzw_stream: bool,
    skip_frame_decoding: bool,
    skip_signature: bool,
    legacy_background_reset: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeOptions {
    /// Creates a new decoder builder
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self {
            // 50 MB
            memory_limit: NonZeroU64::new(50_000_000)
                .map_or(MemoryLimit::Unlimited, MemoryLimit::Bytes),
            check_frame_consistency: false,
            check_lzw_stream: false,
            skip_frame_decoding: false,
            skip_signature: false,
            legacy_background_reset: false,
        }
    }

    /// Configure a memory limit for decoding.
    ///
    /// The default is 50 MB.
    pub fn set_memory_limit(&mut self, limit: MemoryLimit) {
        self.memory_limit = limit;
    }

    /// Configure if frames must be within the screen descriptor.
    ///
    /// The default is `false`.
    ///
    /// When turned on, all frame descriptors being read must fit within the screen descriptor or
    /// otherwise an error is returned.
    ///
    /// When turned off, the parts of a frame outside of the logical screen are clipped away.
    pub fn check_frame_consistency(&mut self, check: bool) {
        self.check_frame_consistency = check;
    }

    /// Configure if corrupt image data is an error.
    ///
    /// The default is `false`.
    ///
    /// When turned on, an LZW code beyond the current dictionary fails decoding with
    /// [`FormatErrorKind::CorruptLzwStream`].
    ///
    /// When turned off, decoding of the frame stops at such a code and the pixels not covered
    /// yet are palette index 0. The same happens to image data that simply ends early, in both
    /// modes.
    pub fn check_lzw_stream(&mut self, check: bool) {
        self.check_lzw_stream = check;
    }

    /// Configure whether to skip decoding frames.
    ///
    /// The default is false.
    ///
    /// When turned on, image data is skipped without LZW decoding or compositing and frames
    /// carry no [`pixel_data`](Frame::pixel_data). This is useful to count frames or sum up
    /// delays without the decoding overhead.
    pub fn skip_frame_decoding(&mut self, skip: bool) {
        self.skip_frame_decoding = skip;
    }

    /// Configure whether the `GIF` signature has already been consumed.
    ///
    /// The default is `false`.
    ///
    /// When turned on, the stream is expected to start with the version, for callers that
    /// sniffed the first three bytes themselves.
    pub fn skip_signature(&mut self, skip: bool) {
        self.skip_signature = skip;
    }

    /// Configure the legacy background color rule.
    ///
    /// The default is `false`, the background color never changes after the header.
    ///
    /// When turned on, a frame without a local color table whose transparency index equals the
    /// background color index sets the background color to 0 for itself and all later frames.
    /// Some older decoders behave like this.
    pub fn legacy_background_reset(&mut self, legacy: bool) {
        self.legacy_background_reset = legacy;
    }

    /// Reads the logical screen descriptor including the global color palette
    ///
    /// Returns a [`Decoder`]. All decoder configuration has to be done beforehand.
    pub fn read_info<R: Read>(self, r: R) -> Result<Decoder<R>, DecodingError> {
        Ok(Decoder {
            decoder: StreamingDecoder::new(io::BufReader::new(r), self)?,
        })
    }

    /// Decodes a whole stream into `sink`, see [`decode`].
    pub fn decode<R: Read, S: FrameSink>(self, r: R, mut sink: S) -> Result<(), DecodingError> {
        sink.start();
        let mut decoder = self.read_info(r)?.decoder;
        let mut frames = 0usize;
        while decoder.decode_next()? {
            let Some(frame) = decoder.current_frame() else {
                break;
            };
            frames += 1;
            if sink.frame(decoder.header(), frame).is_break() {
                debug!("decoding cancelled after {} frames", frames);
                break;
            }
        }
        sink.finish();
        Ok(())
    }
}

/// Decodes every frame of a GIF stream and hands it to `sink`.
///
/// Calls [`FrameSink::start`] first, then [`FrameSink::frame`] for each frame in stream order
/// and finally [`FrameSink::finish`]. The sink can stop decoding between two frames by
/// returning [`ControlFlow::Break`](core::ops::ControlFlow::Break). When an error occurs,
/// the frames already handed out stay valid but `finish` is not called.
///
/// ```
/// # fn main() -> Result<(), gif_frames::DecodingError> {
/// # let data: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\x00\x00\x00\x00\x00\x2c\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02\x44\x01\x00\x3b";
/// let mut frames = Vec::new();
/// gif_frames::decode(data, &mut frames)?;
/// assert_eq!(frames[0].pixel_data.as_deref(), Some(&[0xFFFF_0000][..]));
/// # Ok(())
/// # }
/// ```
pub fn decode<R: Read, S: FrameSink>(r: R, sink: S) -> Result<(), DecodingError> {
    DecodeOptions::new().decode(r, sink)
}

/// GIF decoder. Create [`DecodeOptions`] to get started, and call [`DecodeOptions::read_info`].
pub struct Decoder<R: Read> {
    decoder: StreamingDecoder<io::BufReader<R>>,
}

impl<R> Decoder<R>
where
    R: Read,
{
    /// Create a new decoder with default options.
    #[inline]
    pub fn new(reader: R) -> Result<Self, DecodingError> {
        DecodeOptions::new().read_info(reader)
    }

    /// Return a builder that allows configuring limits etc.
    #[must_use]
    #[inline]
    pub fn build() -> DecodeOptions {
        DecodeOptions::new()
    }

    /// Reads the next frame and composites it onto the canvas.
    ///
    /// Returns `None` at the end of the stream. The returned frame's canvas is reused
    /// by the following frame, clone it to keep it.
    pub fn read_next_frame(&mut self) -> Result<Option<&Frame>, DecodingError> {
        if self.decoder.decode_next()? {
            Ok(self.decoder.current_frame())
        } else {
            Ok(None)
        }
    }

    /// The logical screen descriptor.
    #[inline]
    pub fn header(&self) -> &Header {
        self.decoder.header()
    }

    /// Width of the logical screen
    #[inline]
    pub fn width(&self) -> u16 {
        self.header().width
    }

    /// Height of the logical screen
    #[inline]
    pub fn height(&self) -> u16 {
        self.header().height
    }

    /// The global color table
    pub fn global_color_table(&self) -> Option<&ColorTable> {
        self.header().global_color_table.as_ref()
    }

    /// Loop count read so far, 0 means forever.
    ///
    /// The NETSCAPE2.0 extension usually precedes the first frame, but it can appear anywhere.
    #[inline]
    pub fn loop_count(&self) -> u16 {
        self.decoder.loop_count()
    }

    /// Number of loop repetitions
    #[inline]
    pub fn repeat(&self) -> Repeat {
        Repeat::from_loop_count(self.loop_count())
    }

    /// Abort decoding and recover the `io::Read` instance
    pub fn into_inner(self) -> io::BufReader<R> {
        self.decoder.into_inner()
    }
}

impl<R: Read> IntoIterator for Decoder<R> {
    type Item = Result<Frame, DecodingError>;
    type IntoIter = DecoderIter<R>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        DecoderIter {
            inner: self,
            ended: false,
        }
    }
}

/// Use `decoder.into_iter()` to iterate over the frames
pub struct DecoderIter<R: Read> {
    inner: Decoder<R>,
    ended: bool,
}

impl<R: Read> DecoderIter<R> {
    /// Abort decoding and recover the `io::Read` instance
    ///
    /// Use `for frame in iter.by_ref()` to be able to call this afterwards.
    pub fn into_inner(self) -> io::BufReader<R> {
        self.inner.into_inner()
    }
}

impl<R: Read> FusedIterator for DecoderIter<R> {}

impl<R: Read> Iterator for DecoderIter<R> {
    type Item = Result<Frame, DecodingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ended {
            return None;
        }
        match self.inner.read_next_frame() {
            Ok(Some(frame)) => Some(Ok(frame.clone())),
            Ok(None) => {
                self.ended = true;
                None
            }
            Err(err) => {
                self.ended = true;
                Some(Err(err))
            }
        }
    }
}
