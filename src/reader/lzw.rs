use std::io::BufRead;

use log::{trace, warn};

use super::block::BlockReader;
use super::decoder::{DecodingError, FormatErrorKind};

/// GIF caps LZW codes at 12 bits.
const MAX_CODESIZE: u8 = 12;
/// Number of dictionary entries addressable with the widest code.
const MAX_ENTRIES: usize = 1 << MAX_CODESIZE;

/// Why decoding of a frame's index stream stopped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum LzwEnd {
    /// The requested number of pixels has been produced.
    Complete,
    /// The end of information code was read.
    EndCode,
    /// The image data ran out, either at its zero-length terminator or at the
    /// end of the stream.
    DataEnd,
    /// A code beyond the dictionary was read.
    InvalidCode,
}

/// Result of decoding one frame's image data.
#[derive(Debug, Copy, Clone)]
pub(crate) struct LzwOutcome {
    /// Pixels produced before decoding stopped. The rest are zero.
    pub(crate) decoded: usize,
    pub(crate) end: LzwEnd,
}

impl LzwOutcome {
    /// Whether nothing of the image data's sub-block train is left to skip.
    pub(crate) fn consumed_terminator(&self) -> bool {
        self.end == LzwEnd::DataEnd
    }
}

/// Variable code width LZW decoder as used by GIF image data.
///
/// The dictionary and the index buffer are allocated on first use and kept
/// for later frames. The index buffer only ever grows.
pub(crate) struct LzwDecoder {
    prefix: Vec<u16>,
    suffix: Vec<u8>,
    stack: Vec<u8>,
    pixels: Vec<u8>,
    pixel_count: usize,
}

impl LzwDecoder {
    pub(crate) const fn new() -> Self {
        LzwDecoder {
            prefix: Vec::new(),
            suffix: Vec::new(),
            stack: Vec::new(),
            pixels: Vec::new(),
            pixel_count: 0,
        }
    }

    /// Palette indices of the last decoded frame, row by row in stream order.
    #[inline]
    pub(crate) fn pixels(&self) -> &[u8] {
        &self.pixels[..self.pixel_count]
    }

    fn prepare(&mut self, pixel_count: usize) {
        if self.prefix.is_empty() {
            self.prefix = vec![0; MAX_ENTRIES];
            self.suffix = vec![0; MAX_ENTRIES];
            self.stack = Vec::with_capacity(MAX_ENTRIES + 1);
        }
        if self.pixels.len() < pixel_count {
            self.pixels.resize(pixel_count, 0);
        }
        self.stack.clear();
        self.pixel_count = pixel_count;
    }

    /// Reads the minimum code size and the image sub-blocks, producing `pixel_count` indices.
    ///
    /// Stops early at the end code, at the sub-block terminator or at an invalid
    /// code; the pixels not covered are zero. Only I/O failures, truncated
    /// sub-blocks and an invalid minimum code size are errors.
    pub(crate) fn decode<R: BufRead>(
        &mut self,
        reader: &mut BlockReader<R>,
        pixel_count: usize,
    ) -> Result<LzwOutcome, DecodingError> {
        let data_size = reader.read_byte()?;
        if data_size < 1 || data_size >= MAX_CODESIZE {
            return Err(DecodingError::format(FormatErrorKind::InvalidCodeSize(data_size)));
        }
        self.prepare(pixel_count);

        let clear_code = 1usize << data_size;
        let end_code = clear_code + 1;
        let mut code_size = u32::from(data_size) + 1;
        let mut code_mask = (1usize << code_size) - 1;
        let mut available = clear_code + 2;
        let mut old_code: Option<usize> = None;
        let mut first = 0u8;

        for code in 0..clear_code {
            self.prefix[code] = 0;
            self.suffix[code] = code as u8;
        }

        let mut datum = 0usize;
        let mut bits = 0u32;
        let mut block_len = 0;
        let mut block_pos = 0;
        let mut decoded = 0;
        let mut end = LzwEnd::Complete;

        while decoded < pixel_count {
            if let Some(index) = self.stack.pop() {
                self.pixels[decoded] = index;
                decoded += 1;
                continue;
            }

            if bits < code_size {
                if block_pos == block_len {
                    block_len = match reader.try_read_block()? {
                        Some(block) => block.len(),
                        None => {
                            warn!("stream ended inside image data");
                            end = LzwEnd::DataEnd;
                            break;
                        }
                    };
                    block_pos = 0;
                    if block_len == 0 {
                        end = LzwEnd::DataEnd;
                        break;
                    }
                }
                datum |= usize::from(reader.block()[block_pos]) << bits;
                block_pos += 1;
                bits += 8;
                continue;
            }

            let mut code = datum & code_mask;
            datum >>= code_size;
            bits -= code_size;

            if code > available {
                end = LzwEnd::InvalidCode;
                break;
            }
            if code == end_code {
                end = LzwEnd::EndCode;
                break;
            }
            if code == clear_code {
                code_size = u32::from(data_size) + 1;
                code_mask = (1 << code_size) - 1;
                available = clear_code + 2;
                old_code = None;
                continue;
            }

            let old = match old_code {
                Some(old) => old,
                None => {
                    // The first code after a clear has to be a literal.
                    if code >= clear_code {
                        end = LzwEnd::InvalidCode;
                        break;
                    }
                    first = self.suffix[code];
                    self.stack.push(first);
                    old_code = Some(code);
                    continue;
                }
            };

            let in_code = code;
            if code == available {
                self.stack.push(first);
                code = old;
            }
            while code > clear_code {
                self.stack.push(self.suffix[code]);
                code = usize::from(self.prefix[code]);
            }
            first = self.suffix[code];
            self.stack.push(first);

            // A full dictionary stops growing until the next clear code.
            if available < MAX_ENTRIES {
                self.prefix[available] = old as u16;
                self.suffix[available] = first;
                available += 1;
                if available & code_mask == 0 && available < MAX_ENTRIES {
                    code_size += 1;
                    code_mask += available;
                }
            }
            old_code = Some(in_code);
        }

        self.pixels[decoded..pixel_count].fill(0);
        self.stack.clear();
        trace!("lzw: {} of {} pixels, stopped by {:?}", decoded, pixel_count, end);
        Ok(LzwOutcome { decoded, end })
    }
}
