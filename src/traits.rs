//! Traits used in this library
use std::io;
use std::ops::ControlFlow;

use crate::common::Frame;
use crate::reader::Header;

/// Reader extension to read little endian data
pub trait ReadBytesExt<T> {
    /// Reads `T` from a byte stream. Least significant byte first.
    fn read_le(&mut self) -> io::Result<T>;
}

impl<R: io::Read + ?Sized> ReadBytesExt<u8> for R {
    #[inline]
    fn read_le(&mut self) -> io::Result<u8> {
        let mut buf = [0; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }
}

impl<R: io::Read + ?Sized> ReadBytesExt<u16> for R {
    #[inline]
    fn read_le(&mut self) -> io::Result<u16> {
        let mut buf = [0; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }
}

/// Receiver of composited frames.
///
/// The decode driver calls [`start`](FrameSink::start) once, then
/// [`frame`](FrameSink::frame) for every frame in stream order, then
/// [`finish`](FrameSink::finish), also when decoding was cancelled by the sink.
/// `finish` is not called when decoding fails.
///
/// The frame is lent to the sink: its canvas is recycled for the next frame,
/// so a sink that keeps frames around has to clone them.
pub trait FrameSink {
    /// Called before the header is parsed.
    fn start(&mut self) {}

    /// Receives one composited frame.
    ///
    /// Returning `ControlFlow::Break` stops decoding before the next frame is read.
    fn frame(&mut self, header: &Header, frame: &Frame) -> ControlFlow<()>;

    /// Called after the last frame.
    fn finish(&mut self) {}
}

/// Collects every frame.
impl FrameSink for Vec<Frame> {
    fn frame(&mut self, _: &Header, frame: &Frame) -> ControlFlow<()> {
        self.push(frame.clone());
        ControlFlow::Continue(())
    }
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn start(&mut self) {
        (**self).start()
    }

    fn frame(&mut self, header: &Header, frame: &Frame) -> ControlFlow<()> {
        (**self).frame(header, frame)
    }

    fn finish(&mut self) {
        (**self).finish()
    }
}

/// Sink that forwards every frame to a closure. Created by [`from_fn`].
#[derive(Debug, Clone)]
pub struct FromFn<F>(F);

/// Turns a closure into a [`FrameSink`].
///
/// ```
/// let mut delays = Vec::new();
/// let mut sink = gif_frames::from_fn(|_, frame| {
///     delays.push(frame.delay_ms);
///     std::ops::ControlFlow::Continue(())
/// });
/// # let _ = &mut sink;
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut(&Header, &Frame) -> ControlFlow<()>,
{
    FromFn(f)
}

impl<F> FrameSink for FromFn<F>
where
    F: FnMut(&Header, &Frame) -> ControlFlow<()>,
{
    fn frame(&mut self, header: &Header, frame: &Frame) -> ControlFlow<()> {
        (self.0)(header, frame)
    }
}
