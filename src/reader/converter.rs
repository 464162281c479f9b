use std::iter;
use std::mem;

use log::warn;

use crate::common::{DisposalMethod, Frame, Rect};
use super::header::ColorTable;

/// Draws decoded frames onto the logical screen.
///
/// Keeps the canvas saved for `RestoreToPrevious` disposal between frames.
pub(crate) struct Compositor {
    saved: Vec<u32>,
    has_saved: bool,
}

impl Compositor {
    pub(crate) const fn new() -> Self {
        Compositor {
            saved: Vec::new(),
            has_saved: false,
        }
    }

    /// Composites `frame` on top of what `previous` left behind and returns the canvas.
    ///
    /// `indices` holds the frame's palette indices in stream order. Entries of
    /// `table` equal to `0` are not drawn, which is how transparency reaches
    /// this point. The previous frame's canvas is taken over when its disposal
    /// allows it.
    pub(crate) fn compose(
        &mut self,
        width: u16,
        height: u16,
        frame: &Frame,
        table: &ColorTable,
        indices: &[u8],
        previous: Option<&mut Frame>,
    ) -> Vec<u32> {
        let mut canvas = self.base_canvas(width, height, frame, previous);
        if frame.dispose == DisposalMethod::RestoreToPrevious {
            self.saved.clear();
            self.saved.extend_from_slice(&canvas);
            self.has_saved = true;
        }

        let height_rows = frame.bounds.height;
        let bounds = frame.bounds;
        if frame.interlaced {
            let rows = InterlaceIterator::new(height_rows);
            draw_rows(&mut canvas, width, height, bounds, table, indices, rows);
        } else {
            let rows = 0..usize::from(height_rows);
            draw_rows(&mut canvas, width, height, bounds, table, indices, rows);
        }
        canvas
    }

    fn base_canvas(
        &mut self,
        width: u16,
        height: u16,
        frame: &Frame,
        previous: Option<&mut Frame>,
    ) -> Vec<u32> {
        let len = usize::from(width) * usize::from(height);
        let previous = match previous {
            Some(previous) if previous.dispose != DisposalMethod::NoAction => previous,
            _ => return vec![0; len],
        };
        let mut canvas = match previous.pixel_data.take() {
            Some(canvas) if canvas.len() == len => canvas,
            _ => return vec![0; len],
        };
        match previous.dispose {
            DisposalMethod::RestoreToBackground => {
                let color = if frame.has_transparency { 0 } else { previous.background_color };
                fill_rect(&mut canvas, width, height, previous.bounds, color);
            }
            DisposalMethod::RestoreToPrevious if self.has_saved => {
                canvas.copy_from_slice(&self.saved);
                self.has_saved = false;
            }
            _ => {}
        }
        canvas
    }

    /// Releases the saved canvas.
    pub(crate) fn reset(&mut self) {
        self.saved = Vec::new();
        self.has_saved = false;
    }
}

/// Visible part of a frame row: canvas columns `start..end`.
fn clip_columns(width: u16, bounds: Rect) -> Option<(usize, usize)> {
    let start = usize::from(bounds.x);
    let end = (start + usize::from(bounds.width)).min(usize::from(width));
    (start < end).then_some((start, end))
}

fn fill_rect(canvas: &mut [u32], width: u16, height: u16, bounds: Rect, color: u32) {
    let Some((start, end)) = clip_columns(width, bounds) else {
        return;
    };
    let top = usize::from(bounds.y);
    let bottom = (top + usize::from(bounds.height)).min(usize::from(height));
    let stride = usize::from(width);
    for y in top..bottom {
        canvas[y * stride + start..y * stride + end].fill(color);
    }
}

/// Writes the frame's rows, `rows` yields the frame row each source row lands on.
fn draw_rows(
    canvas: &mut [u32],
    width: u16,
    height: u16,
    bounds: Rect,
    table: &ColorTable,
    indices: &[u8],
    rows: impl Iterator<Item = usize>,
) {
    let Some((start, end)) = clip_columns(width, bounds) else {
        return;
    };
    if !bounds.fits_within(width, height) {
        warn!("frame {:?} exceeds the {}x{} screen, clipping", bounds, width, height);
    }
    let stride = usize::from(width);
    let line_length = usize::from(bounds.width);
    let visible = end - start;
    for (source_row, target_row) in rows.enumerate() {
        let y = usize::from(bounds.y) + target_row;
        if y >= usize::from(height) {
            continue;
        }
        let source = source_row * line_length;
        let Some(line) = indices.get(source..source + visible) else {
            break;
        };
        let target = &mut canvas[y * stride + start..y * stride + end];
        for (pixel, &index) in target.iter_mut().zip(line) {
            let color = table.color(index);
            if color != 0 {
                *pixel = color;
            }
        }
    }
}

/// Maps interlaced rows, in the order they are stored, to their place in the frame.
pub(crate) struct InterlaceIterator {
    len: u16,
    next: usize,
    pass: usize,
}

impl InterlaceIterator {
    pub(crate) fn new(len: u16) -> Self {
        InterlaceIterator { len, next: 0, pass: 0 }
    }
}

impl iter::Iterator for InterlaceIterator {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        // although the pass never goes out of bounds thanks to len==0,
        // the optimizer doesn't see it. get()? avoids costlier panicking code.
        let mut next = self.next + *[8, 8, 4, 2].get(self.pass)?;
        while next >= self.len as usize {
            debug_assert!(self.pass < 4);
            next = *[4, 2, 1, 0].get(self.pass)?;
            self.pass += 1;
        }
        mem::swap(&mut next, &mut self.next);
        Some(next)
    }
}
