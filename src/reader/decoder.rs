use std::cmp;
use std::error;
use std::fmt;
use std::io::{self, BufRead};

use log::{debug, trace, warn};

use crate::common::{Block, DisposalMethod, Extension, Frame, Rect};
use crate::reader::DecodeOptions;

use super::block::BlockReader;
use super::converter::Compositor;
use super::header::{ColorTable, Header};
use super::lzw::{LzwDecoder, LzwEnd};

/// What is wrong with a malformed stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormatErrorKind {
    /// The signature is not `GIF`.
    NotAGif,
    /// A sub-block declares more bytes than the stream holds.
    TruncatedBlock,
    /// The stream ends inside a color table.
    InvalidColorTable,
    /// A byte that starts no known block.
    UnexpectedBlockCode(u8),
    /// Minimum LZW code size outside of `1..=11`.
    InvalidCodeSize(u8),
    /// An LZW code beyond the dictionary. Only reported by a strict decoder.
    CorruptLzwStream,
    /// A frame without local color table in a stream without global color table.
    NoColorTable,
    /// A frame extends beyond the logical screen. Only reported by a strict decoder.
    FrameOutOfBounds,
    /// Graphic control extension with a payload length other than 4.
    ControlExtensionLength(u8),
}

impl fmt::Display for FormatErrorKind {
    #[cold]
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FormatErrorKind::NotAGif => fmt.write_str("not a GIF"),
            FormatErrorKind::TruncatedBlock => fmt.write_str("block truncated"),
            FormatErrorKind::InvalidColorTable => fmt.write_str("invalid color table size"),
            FormatErrorKind::UnexpectedBlockCode(code) => {
                write!(fmt, "unexpected block code {code:#04x}")
            }
            FormatErrorKind::InvalidCodeSize(size) => {
                write!(fmt, "invalid minimal code size {size}")
            }
            FormatErrorKind::CorruptLzwStream => fmt.write_str("corrupt LZW stream"),
            FormatErrorKind::NoColorTable => {
                fmt.write_str("no color table available for current frame")
            }
            FormatErrorKind::FrameOutOfBounds => fmt.write_str("frame descriptor is out-of-bounds"),
            FormatErrorKind::ControlExtensionLength(len) => {
                write!(fmt, "control extension has wrong length {len}")
            }
        }
    }
}

/// An error returned in the case of the image not being formatted properly.
#[derive(Debug)]
pub struct DecodingFormatError {
    kind: FormatErrorKind,
}

impl DecodingFormatError {
    /// What exactly is malformed.
    #[inline]
    pub fn kind(&self) -> FormatErrorKind {
        self.kind
    }
}

impl fmt::Display for DecodingFormatError {
    #[cold]
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, fmt)
    }
}

impl error::Error for DecodingFormatError {}

#[derive(Debug)]
/// Decoding error.
pub enum DecodingError {
    /// Returned if the image is found to be malformed.
    Format(DecodingFormatError),
    /// Wraps `std::io::Error`.
    Io(io::Error),
    /// The stream ended in the middle of a block.
    UnexpectedEof,
    /// A frame needs more memory than the configured limit.
    MemoryLimit,
}

impl DecodingError {
    #[cold]
    pub(crate) fn format(kind: FormatErrorKind) -> Self {
        DecodingError::Format(DecodingFormatError { kind })
    }
}

impl fmt::Display for DecodingError {
    #[cold]
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DecodingError::Format(ref d) => fmt::Display::fmt(d, fmt),
            DecodingError::Io(ref err) => fmt::Display::fmt(err, fmt),
            DecodingError::UnexpectedEof => fmt.write_str("unexpected end of stream"),
            DecodingError::MemoryLimit => fmt.write_str("memory limit reached"),
        }
    }
}

impl error::Error for DecodingError {
    #[cold]
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            DecodingError::Format(ref err) => Some(err),
            DecodingError::Io(ref err) => Some(err),
            DecodingError::UnexpectedEof | DecodingError::MemoryLimit => None,
        }
    }
}

impl From<io::Error> for DecodingError {
    #[inline]
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            DecodingError::UnexpectedEof
        } else {
            DecodingError::Io(err)
        }
    }
}

impl From<DecodingFormatError> for DecodingError {
    #[inline]
    fn from(err: DecodingFormatError) -> Self {
        DecodingError::Format(err)
    }
}

/// Graphic control extension values waiting for the next image.
#[derive(Debug, Copy, Clone, Default)]
struct ControlExtension {
    dispose: DisposalMethod,
    has_transparency: bool,
    transparency_index: u8,
    delay: u16,
}

impl ControlExtension {
    /// Delay in milliseconds, at least 10.
    fn delay_ms(&self) -> u32 {
        cmp::max(10, u32::from(self.delay) * 10)
    }
}

/// Block-dispatch parser over a GIF stream.
///
/// Owns every working buffer of one decode: the block reader, the LZW tables,
/// the compositor's saved canvas and the last frame, whose canvas is handed to
/// the next one.
pub(crate) struct StreamingDecoder<R> {
    reader: BlockReader<R>,
    options: DecodeOptions,
    header: Header,
    lzw: LzwDecoder,
    compositor: Compositor,
    loop_count: u16,
    current: Option<Frame>,
    ended: bool,
}

impl<R: BufRead> StreamingDecoder<R> {
    /// Parses the header. Frames are read with [`decode_next`](Self::decode_next).
    pub(crate) fn new(reader: R, options: DecodeOptions) -> Result<Self, DecodingError> {
        let mut reader = BlockReader::new(reader);
        let header = Header::parse(&mut reader, options.skip_signature)?;
        options.memory_limit.check_canvas(&header)?;
        Ok(StreamingDecoder {
            reader,
            options,
            header,
            lzw: LzwDecoder::new(),
            compositor: Compositor::new(),
            loop_count: 0,
            current: None,
            ended: false,
        })
    }

    pub(crate) fn header(&self) -> &Header {
        &self.header
    }

    /// Loop count of the last NETSCAPE2.0 extension seen so far, 0 means forever.
    pub(crate) fn loop_count(&self) -> u16 {
        self.loop_count
    }

    /// The frame produced by the last successful [`decode_next`](Self::decode_next).
    pub(crate) fn current_frame(&self) -> Option<&Frame> {
        self.current.as_ref()
    }

    pub(crate) fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Reads blocks until the next image has been composited or the stream ends.
    ///
    /// Returns `false` at the trailer. A stream that simply stops between two
    /// blocks is treated as if the trailer was there.
    pub(crate) fn decode_next(&mut self) -> Result<bool, DecodingError> {
        if self.ended {
            return Ok(false);
        }
        let mut control = ControlExtension::default();
        loop {
            let Some(code) = self.reader.try_read_byte()? else {
                warn!("stream ended without trailer");
                return Ok(self.end());
            };
            trace!("block code {:#04x}", code);
            match Block::from_u8(code) {
                Some(Block::Image) => {
                    self.read_image(control)?;
                    return Ok(true);
                }
                Some(Block::Extension) => self.read_extension(&mut control)?,
                Some(Block::Trailer) => return Ok(self.end()),
                None if code == 0 => warn!("skipping stray 0x00 between blocks"),
                None => {
                    return Err(DecodingError::format(
                        FormatErrorKind::UnexpectedBlockCode(code),
                    ))
                }
            }
        }
    }

    fn end(&mut self) -> bool {
        self.ended = true;
        self.compositor.reset();
        false
    }

    fn read_extension(&mut self, control: &mut ControlExtension) -> Result<(), DecodingError> {
        let label = self.reader.read_byte()?;
        trace!("extension {:#04x}", label);
        match Extension::from_u8(label) {
            Some(Extension::Control) => *control = self.read_control_extension()?,
            Some(Extension::Application) => self.read_application_extension()?,
            _ => self.reader.skip_block()?,
        }
        Ok(())
    }

    fn read_control_extension(&mut self) -> Result<ControlExtension, DecodingError> {
        let len = self.reader.read_byte()?;
        if len != 4 {
            return Err(DecodingError::format(FormatErrorKind::ControlExtensionLength(len)));
        }
        let flags = self.reader.read_byte()?;
        let delay = self.reader.read_u16()?;
        let transparency_index = self.reader.read_byte()?;
        // block terminator, plus anything an encoder appended before it
        self.reader.skip_block()?;
        Ok(ControlExtension {
            dispose: DisposalMethod::from_control_flags(flags),
            has_transparency: flags & 1 != 0,
            transparency_index,
            delay,
        })
    }

    fn read_application_extension(&mut self) -> Result<(), DecodingError> {
        let id = self.reader.read_block()?;
        if id.is_empty() {
            return Ok(());
        }
        if !id.eq_ignore_ascii_case(b"NETSCAPE2.0") {
            trace!("skipping application extension {:?}", String::from_utf8_lossy(id));
            return self.reader.skip_block();
        }
        loop {
            let block = self.reader.read_block()?;
            match *block {
                [] => return Ok(()),
                [1, lo, hi, ..] => {
                    self.loop_count = u16::from_le_bytes([lo, hi]);
                    debug!("loop count {}", self.loop_count);
                }
                _ => {}
            }
        }
    }

    fn read_image(&mut self, control: ControlExtension) -> Result<(), DecodingError> {
        let x = self.reader.read_u16()?;
        let y = self.reader.read_u16()?;
        let width = self.reader.read_u16()?;
        let height = self.reader.read_u16()?;
        let flags = self.reader.read_byte()?;
        let bounds = Rect::new(x, y, width, height);

        let mut palette = if flags & 0x80 != 0 {
            let mut table = ColorTable::new(ColorTable::size_from_flags(flags));
            table.parse(&mut self.reader)?;
            Some(table)
        } else {
            None
        };

        if self.options.legacy_background_reset
            && palette.is_none()
            && control.transparency_index == self.header.background_color_index
        {
            trace!("transparent background index, clearing background color");
            self.header.background_color = 0;
        }

        let mut frame = Frame {
            bounds,
            dispose: control.dispose,
            has_transparency: control.has_transparency,
            transparency_index: control.transparency_index,
            interlaced: flags & 0x40 != 0,
            delay_ms: control.delay_ms(),
            loop_count: self.loop_count,
            background_color: self.header.background_color,
            palette: None,
            pixel_data: None,
        };
        debug!(
            "frame {:?}, {:?}, delay {}ms, transparent {:?}, interlaced {}, local table {:?}",
            frame.bounds,
            frame.dispose,
            frame.delay_ms,
            frame.transparent(),
            frame.interlaced,
            palette.as_ref().map(ColorTable::len)
        );

        if self.options.check_frame_consistency
            && !bounds.fits_within(self.header.width, self.header.height)
        {
            return Err(DecodingError::format(FormatErrorKind::FrameOutOfBounds));
        }

        let mut previous = self.current.take();

        if self.options.skip_frame_decoding {
            let _min_code_size = self.reader.read_byte()?;
            if !self.reader.try_skip_block()? {
                warn!("stream ended inside image data");
            }
            frame.palette = palette;
            self.current = Some(frame);
            return Ok(());
        }

        self.options.memory_limit.check_frame(&self.header, &frame)?;

        let (screen_width, screen_height) = (self.header.width, self.header.height);
        let table = match palette.as_mut() {
            Some(table) => table,
            None => self
                .header
                .global_color_table
                .as_mut()
                .ok_or_else(|| DecodingError::format(FormatErrorKind::NoColorTable))?,
        };

        let pixel_count = bounds.area();
        let outcome = self.lzw.decode(&mut self.reader, pixel_count)?;
        match outcome.end {
            LzwEnd::Complete => {}
            LzwEnd::InvalidCode if self.options.check_lzw_stream => {
                return Err(DecodingError::format(FormatErrorKind::CorruptLzwStream));
            }
            end => {
                if outcome.decoded < pixel_count {
                    warn!(
                        "image data stopped by {:?} after {} of {} pixels",
                        end, outcome.decoded, pixel_count
                    );
                }
            }
        }
        if !outcome.consumed_terminator() && !self.reader.try_skip_block()? {
            warn!("stream ended before the image data terminator");
        }

        let table = table.scoped_transparency(frame.transparent());
        let canvas = self.compositor.compose(
            screen_width,
            screen_height,
            &frame,
            &table,
            self.lzw.pixels(),
            previous.as_mut(),
        );
        drop(table);

        frame.palette = palette;
        frame.pixel_data = Some(canvas);
        self.current = Some(frame);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reader::MemoryLimit;
    use weezl::{encode::Encoder, BitOrder};

    const RED: u32 = 0xFFFF_0000;
    const BLUE: u32 = 0xFF00_00FF;

    fn gif_header(width: u16, height: u16) -> Vec<u8> {
        let mut data = b"GIF89a".to_vec();
        data.extend_from_slice(&width.to_le_bytes());
        data.extend_from_slice(&height.to_le_bytes());
        // 2 entry global table, background index 1
        data.extend_from_slice(&[0x80, 1, 0]);
        data.extend_from_slice(&[0xFF, 0, 0, 0, 0, 0xFF]);
        data
    }

    fn image(data: &mut Vec<u8>, bounds: Rect, indices: &[u8]) {
        data.push(0x2C);
        for v in [bounds.x, bounds.y, bounds.width, bounds.height] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.push(0);
        let lzw = Encoder::new(BitOrder::Lsb, 2).encode(indices).unwrap();
        data.push(2);
        for chunk in lzw.chunks(255) {
            data.push(chunk.len() as u8);
            data.extend_from_slice(chunk);
        }
        data.push(0);
    }

    fn control(data: &mut Vec<u8>, flags: u8, delay: u16, transparent: u8) {
        data.extend_from_slice(&[0x21, 0xF9, 4, flags]);
        data.extend_from_slice(&delay.to_le_bytes());
        data.extend_from_slice(&[transparent, 0]);
    }

    fn decoder(data: &[u8]) -> StreamingDecoder<&[u8]> {
        StreamingDecoder::new(data, DecodeOptions::new()).unwrap()
    }

    fn kind(err: DecodingError) -> FormatErrorKind {
        match err {
            DecodingError::Format(err) => err.kind(),
            other => panic!("not a format error: {other}"),
        }
    }

    #[test]
    fn error_cast() {
        let _: Box<dyn error::Error> = DecodingError::format(FormatErrorKind::NotAGif).into();
    }

    #[test]
    fn eof_maps_to_unexpected_eof() {
        let err = DecodingError::from(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(err, DecodingError::UnexpectedEof));
        let err = DecodingError::from(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, DecodingError::Io(_)));
    }

    #[test]
    fn frame_without_control_extension() {
        let mut data = gif_header(2, 1);
        image(&mut data, Rect::new(0, 0, 2, 1), &[1, 0]);
        data.push(0x3B);
        let mut decoder = decoder(&data);
        assert!(decoder.decode_next().unwrap());
        let frame = decoder.current_frame().unwrap();
        assert_eq!(frame.dispose, DisposalMethod::NoAction);
        assert_eq!(frame.delay_ms, 10);
        assert_eq!(frame.background_color, BLUE);
        assert_eq!(frame.pixel_data.as_deref(), Some(&[BLUE, RED][..]));
        assert!(!decoder.decode_next().unwrap());
        assert!(!decoder.decode_next().unwrap());
    }

    #[test]
    fn control_extension_fields() {
        let mut data = gif_header(1, 1);
        control(&mut data, 0b0000_1001, 50, 1);
        image(&mut data, Rect::new(0, 0, 1, 1), &[0]);
        control(&mut data, 0, 0, 0);
        image(&mut data, Rect::new(0, 0, 1, 1), &[1]);
        data.push(0x3B);
        let mut decoder = decoder(&data);

        assert!(decoder.decode_next().unwrap());
        let frame = decoder.current_frame().unwrap();
        assert_eq!(frame.delay_ms, 500);
        assert_eq!(frame.transparent(), Some(1));
        assert_eq!(frame.dispose, DisposalMethod::RestoreToBackground);
        assert_eq!(frame.pixel_data.as_deref(), Some(&[RED][..]));

        assert!(decoder.decode_next().unwrap());
        let frame = decoder.current_frame().unwrap();
        assert_eq!(frame.delay_ms, 10);
        assert_eq!(frame.transparent(), None);
        assert_eq!(frame.dispose, DisposalMethod::LeaveInPlace);
        assert_eq!(frame.pixel_data.as_deref(), Some(&[BLUE][..]));
        // the global table is untouched by the first frame's transparency
        assert_eq!(decoder.header().global_color_table.as_ref().unwrap().transparency(), None);
    }

    #[test]
    fn netscape_loop_count_is_sticky() {
        let mut data = gif_header(1, 1);
        image(&mut data, Rect::new(0, 0, 1, 1), &[0]);
        data.extend_from_slice(&[0x21, 0xFF, 11]);
        data.extend_from_slice(b"netscape2.0");
        data.extend_from_slice(&[3, 1, 5, 0, 0]);
        image(&mut data, Rect::new(0, 0, 1, 1), &[0]);
        image(&mut data, Rect::new(0, 0, 1, 1), &[0]);
        data.push(0x3B);
        let mut decoder = decoder(&data);
        let mut counts = Vec::new();
        while decoder.decode_next().unwrap() {
            counts.push(decoder.current_frame().unwrap().loop_count);
        }
        assert_eq!(counts, [0, 5, 5]);
        assert_eq!(decoder.loop_count(), 5);
    }

    #[test]
    fn foreign_extensions_are_skipped() {
        let mut data = gif_header(1, 1);
        data.extend_from_slice(&[0x21, 0xFF, 11]);
        data.extend_from_slice(b"XMP DataXMP");
        data.extend_from_slice(&[2, 1, 9, 0]);
        data.extend_from_slice(&[0x21, 0xFE, 5, b'h', b'e', b'l', b'l', b'o', 0]);
        data.extend_from_slice(&[0x21, 0x01, 1, 0, 0]);
        image(&mut data, Rect::new(0, 0, 1, 1), &[1]);
        data.push(0x3B);
        let mut decoder = decoder(&data);
        assert!(decoder.decode_next().unwrap());
        assert_eq!(decoder.loop_count(), 0);
        assert_eq!(decoder.current_frame().unwrap().pixel_data.as_deref(), Some(&[BLUE][..]));
        assert!(!decoder.decode_next().unwrap());
    }

    #[test]
    fn stray_zero_is_tolerated() {
        let mut data = gif_header(1, 1);
        data.push(0);
        image(&mut data, Rect::new(0, 0, 1, 1), &[0]);
        data.extend_from_slice(&[0, 0, 0x3B]);
        let mut decoder = decoder(&data);
        assert!(decoder.decode_next().unwrap());
        assert!(!decoder.decode_next().unwrap());
    }

    #[test]
    fn unexpected_block_code() {
        let mut data = gif_header(1, 1);
        data.push(0x42);
        let err = decoder(&data).decode_next().unwrap_err();
        assert_eq!(kind(err), FormatErrorKind::UnexpectedBlockCode(0x42));
    }

    #[test]
    fn missing_trailer_ends_cleanly() {
        let mut data = gif_header(1, 1);
        image(&mut data, Rect::new(0, 0, 1, 1), &[0]);
        let mut decoder = decoder(&data);
        assert!(decoder.decode_next().unwrap());
        assert!(!decoder.decode_next().unwrap());
    }

    #[test]
    fn eof_inside_descriptor() {
        let mut data = gif_header(1, 1);
        data.extend_from_slice(&[0x2C, 0, 0, 0]);
        assert!(matches!(decoder(&data).decode_next(), Err(DecodingError::UnexpectedEof)));
    }

    #[test]
    fn control_extension_length() {
        let mut data = gif_header(1, 1);
        data.extend_from_slice(&[0x21, 0xF9, 5, 0, 0, 0, 0, 0, 0]);
        let err = decoder(&data).decode_next().unwrap_err();
        assert_eq!(kind(err), FormatErrorKind::ControlExtensionLength(5));
    }

    #[test]
    fn no_color_table() {
        let mut data = b"GIF89a\x01\x00\x01\x00\x00\x00\x00".to_vec();
        image(&mut data, Rect::new(0, 0, 1, 1), &[0]);
        let err = decoder(&data).decode_next().unwrap_err();
        assert_eq!(kind(err), FormatErrorKind::NoColorTable);
    }

    #[test]
    fn local_table_overrides_global() {
        let mut data = gif_header(1, 1);
        data.push(0x2C);
        data.extend_from_slice(&[0, 0, 0, 0, 1, 0, 1, 0]);
        // local table of two entries
        data.push(0x80);
        data.extend_from_slice(&[0, 0xFF, 0, 0, 0, 0]);
        let lzw = Encoder::new(BitOrder::Lsb, 2).encode(&[0]).unwrap();
        data.push(2);
        data.push(lzw.len() as u8);
        data.extend_from_slice(&lzw);
        data.extend_from_slice(&[0, 0x3B]);
        let mut decoder = decoder(&data);
        assert!(decoder.decode_next().unwrap());
        let frame = decoder.current_frame().unwrap();
        assert_eq!(frame.pixel_data.as_deref(), Some(&[0xFF00_FF00][..]));
        assert_eq!(frame.palette.as_ref().map(ColorTable::len), Some(2));
        assert_eq!(frame.color_table(decoder.header()), frame.palette.as_ref());
    }

    #[test]
    fn out_of_bounds_frames() {
        let mut data = gif_header(2, 2);
        image(&mut data, Rect::new(1, 1, 2, 2), &[0, 0, 0, 0]);
        data.push(0x3B);

        let mut lenient = decoder(&data);
        assert!(lenient.decode_next().unwrap());
        assert_eq!(
            lenient.current_frame().unwrap().pixel_data.as_deref(),
            Some(&[0, 0, 0, RED][..])
        );

        let mut options = DecodeOptions::new();
        options.check_frame_consistency(true);
        let err = StreamingDecoder::new(&data[..], options).unwrap().decode_next().unwrap_err();
        assert_eq!(kind(err), FormatErrorKind::FrameOutOfBounds);
    }

    #[test]
    fn corrupt_lzw_stream() {
        let mut data = gif_header(2, 2);
        data.push(0x2C);
        data.extend_from_slice(&[0, 0, 0, 0, 2, 0, 2, 0, 0]);
        // clear, literal 1, then code 7 while only 6 is available
        data.extend_from_slice(&[2, 2, 0b1100_1100, 0b0000_0001, 0, 0x3B]);

        let mut lenient = decoder(&data);
        assert!(lenient.decode_next().unwrap());
        let frame = lenient.current_frame().unwrap();
        assert_eq!(frame.pixel_data.as_deref(), Some(&[BLUE, RED, RED, RED][..]));
        assert!(!lenient.decode_next().unwrap());

        let mut options = DecodeOptions::new();
        options.check_lzw_stream(true);
        let err = StreamingDecoder::new(&data[..], options).unwrap().decode_next().unwrap_err();
        assert_eq!(kind(err), FormatErrorKind::CorruptLzwStream);
    }

    #[test]
    fn skip_frame_decoding() {
        let mut data = gif_header(2, 1);
        control(&mut data, 0b0000_1000, 7, 0);
        image(&mut data, Rect::new(0, 0, 2, 1), &[1, 0]);
        data.push(0x3B);
        let mut options = DecodeOptions::new();
        options.skip_frame_decoding(true);
        let mut decoder = StreamingDecoder::new(&data[..], options).unwrap();
        assert!(decoder.decode_next().unwrap());
        let frame = decoder.current_frame().unwrap();
        assert_eq!(frame.delay_ms, 70);
        assert!(frame.pixel_data.is_none());
        assert!(!decoder.decode_next().unwrap());
    }

    #[test]
    fn memory_limit() {
        let mut data = gif_header(100, 100);
        image(&mut data, Rect::new(0, 0, 1, 1), &[0]);
        let mut options = DecodeOptions::new();
        options.set_memory_limit(MemoryLimit::Bytes(1000.try_into().unwrap()));
        assert!(matches!(
            StreamingDecoder::new(&data[..], options),
            Err(DecodingError::MemoryLimit)
        ));
    }

    #[test]
    fn legacy_background_reset() {
        let mut data = gif_header(1, 1);
        control(&mut data, 0, 0, 1);
        image(&mut data, Rect::new(0, 0, 1, 1), &[0]);
        data.push(0x3B);

        let mut plain = decoder(&data);
        assert!(plain.decode_next().unwrap());
        assert_eq!(plain.header().background_color, BLUE);

        let mut options = DecodeOptions::new();
        options.legacy_background_reset(true);
        let mut legacy = StreamingDecoder::new(&data[..], options).unwrap();
        assert!(legacy.decode_next().unwrap());
        assert_eq!(legacy.header().background_color, 0);
        assert_eq!(legacy.current_frame().unwrap().background_color, 0);
    }
}
