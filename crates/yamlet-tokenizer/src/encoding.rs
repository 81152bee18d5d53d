//! Byte order detection and transcoding to UTF-8.

use std::fmt;

use crate::{EncodingError, Reader};
#[allow(unused_imports)]
use crate::trace;

/// Character encoding of an input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "facet", derive(facet::Facet))]
#[repr(u8)]
pub enum Encoding {
    /// UTF-8 (the default when no byte order mark is present).
    Utf8,
    /// UTF-16, little endian.
    Utf16Le,
    /// UTF-16, big endian.
    Utf16Be,
    /// UTF-32, little endian.
    Utf32Le,
    /// UTF-32, big endian.
    Utf32Be,
}

impl Encoding {
    /// Width of one code unit in bytes.
    pub fn unit_width(self) -> usize {
        match self {
            Encoding::Utf8 => 1,
            Encoding::Utf16Le | Encoding::Utf16Be => 2,
            Encoding::Utf32Le | Encoding::Utf32Be => 4,
        }
    }

    fn is_big_endian(self) -> bool {
        matches!(self, Encoding::Utf16Be | Encoding::Utf32Be)
    }

    /// Detect the encoding of `bytes`, returning it with the length of the
    /// byte order mark (0 when there is none).
    ///
    /// Without a byte order mark the encoding is guessed from where the null
    /// bytes fall in the first character, which YAML requires to be ASCII.
    pub fn detect(bytes: &[u8]) -> (Encoding, usize) {
        match bytes {
            [0xFF, 0xFE, 0x00, 0x00, ..] => (Encoding::Utf32Le, 4),
            [0x00, 0x00, 0xFE, 0xFF, ..] => (Encoding::Utf32Be, 4),
            [0xFF, 0xFE, ..] => (Encoding::Utf16Le, 2),
            [0xFE, 0xFF, ..] => (Encoding::Utf16Be, 2),
            [0xEF, 0xBB, 0xBF, ..] => (Encoding::Utf8, 3),
            [0x00, 0x00, 0x00, b, ..] if *b != 0 => (Encoding::Utf32Be, 0),
            [b, 0x00, 0x00, 0x00, ..] if *b != 0 => (Encoding::Utf32Le, 0),
            [0x00, b, ..] if *b != 0 => (Encoding::Utf16Be, 0),
            [b, 0x00, ..] if *b != 0 => (Encoding::Utf16Le, 0),
            _ => (Encoding::Utf8, 0),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Utf32Le => "UTF-32LE",
            Encoding::Utf32Be => "UTF-32BE",
        })
    }
}

/// Decode `bytes` into validated UTF-8 text.
///
/// The input allocation is reused whenever the UTF-8 output can never
/// overtake the bytes still to be read: always for UTF-8 and UTF-32, and for
/// UTF-16 as long as no code unit needs three UTF-8 bytes.
pub fn decode(mut bytes: Vec<u8>) -> Result<(String, Encoding), EncodingError> {
    let (encoding, bom) = Encoding::detect(&bytes);
    let payload = bytes.len() - bom;
    if payload % encoding.unit_width() != 0 {
        return Err(EncodingError::Misaligned {
            encoding,
            len: payload,
        });
    }

    let utf8 = match encoding {
        Encoding::Utf8 => {
            bytes.drain(..bom);
            bytes
        }
        Encoding::Utf16Le | Encoding::Utf16Be => {
            if utf16_fits_in_place(&bytes[bom..], encoding.is_big_endian()) {
                trace!("transcoding {} in place", encoding);
                utf16_in_place(bytes, bom, encoding)?
            } else {
                trace!("transcoding {} into a new buffer", encoding);
                utf16_to_new(&bytes, bom, encoding)?
            }
        }
        Encoding::Utf32Le | Encoding::Utf32Be => {
            trace!("transcoding {} in place", encoding);
            utf32_in_place(bytes, bom, encoding)?
        }
    };

    let text = String::from_utf8(utf8).map_err(|e| EncodingError::InvalidSequence {
        encoding,
        offset: bom + e.utf8_error().valid_up_to(),
    })?;
    check_printable(&text)?;
    Ok((text, encoding))
}

/// Longest decoded text a [`Mark`](crate::Mark) can address.
pub const MAX_SOURCE_LEN: usize = u32::MAX as usize;

fn check_len(len: usize) -> Result<(), EncodingError> {
    if len > MAX_SOURCE_LEN {
        return Err(EncodingError::TooLarge { len });
    }
    Ok(())
}

/// Check that every character of `text` may appear in a YAML stream, and
/// that the text is short enough for byte offsets to fit a [`Mark`](crate::Mark).
pub fn check_printable(text: &str) -> Result<(), EncodingError> {
    check_len(text.len())?;
    let Some((offset, ch)) = text.char_indices().find(|&(_, c)| !is_printable(c)) else {
        return Ok(());
    };
    let mut reader = Reader::new(text);
    while reader.offset() < offset {
        reader.advance();
    }
    Err(EncodingError::NonPrintable {
        mark: reader.mark(),
        ch,
    })
}

/// Whether `c` is in the YAML 1.1 printable character set.
pub fn is_printable(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{7E}'
        | '\u{85}'
        | '\u{A0}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

#[inline]
fn read_u16(bytes: &[u8], at: usize, big_endian: bool) -> u16 {
    let pair = [bytes[at], bytes[at + 1]];
    if big_endian {
        u16::from_be_bytes(pair)
    } else {
        u16::from_le_bytes(pair)
    }
}

fn utf16_fits_in_place(payload: &[u8], big_endian: bool) -> bool {
    (0..payload.len()).step_by(2).all(|at| {
        let unit = read_u16(payload, at, big_endian);
        unit < 0x800 || (0xD800..0xE000).contains(&unit)
    })
}

/// Decode one UTF-16 character starting at byte `at`, returning it and the
/// number of bytes it occupied.
fn utf16_char_at(
    bytes: &[u8],
    at: usize,
    encoding: Encoding,
) -> Result<(char, usize), EncodingError> {
    let big_endian = encoding.is_big_endian();
    let invalid = || EncodingError::InvalidSequence {
        encoding,
        offset: at,
    };
    let lead = read_u16(bytes, at, big_endian);
    match lead {
        0xD800..=0xDBFF => {
            if at + 4 > bytes.len() {
                return Err(invalid());
            }
            let trail = read_u16(bytes, at + 2, big_endian);
            if !(0xDC00..=0xDFFF).contains(&trail) {
                return Err(invalid());
            }
            let code = 0x10000 + (((lead as u32) - 0xD800) << 10) + ((trail as u32) - 0xDC00);
            char::from_u32(code).map(|c| (c, 4)).ok_or_else(invalid)
        }
        0xDC00..=0xDFFF => Err(invalid()),
        _ => char::from_u32(lead as u32).map(|c| (c, 2)).ok_or_else(invalid),
    }
}

fn utf16_in_place(
    mut bytes: Vec<u8>,
    bom: usize,
    encoding: Encoding,
) -> Result<Vec<u8>, EncodingError> {
    let mut read = bom;
    let mut write = 0;
    let mut buf = [0u8; 4];
    while read < bytes.len() {
        let (ch, width) = utf16_char_at(&bytes, read, encoding)?;
        let encoded = ch.encode_utf8(&mut buf).as_bytes();
        // Output never outgrows the unit it replaces on this path.
        debug_assert!(write + encoded.len() <= read + width);
        bytes[write..write + encoded.len()].copy_from_slice(encoded);
        write += encoded.len();
        read += width;
    }
    bytes.truncate(write);
    Ok(bytes)
}

fn utf16_to_new(bytes: &[u8], bom: usize, encoding: Encoding) -> Result<Vec<u8>, EncodingError> {
    let mut out = Vec::with_capacity((bytes.len() - bom) / 2 * 3);
    let mut read = bom;
    let mut buf = [0u8; 4];
    while read < bytes.len() {
        let (ch, width) = utf16_char_at(bytes, read, encoding)?;
        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        read += width;
    }
    Ok(out)
}

fn utf32_in_place(
    mut bytes: Vec<u8>,
    bom: usize,
    encoding: Encoding,
) -> Result<Vec<u8>, EncodingError> {
    let mut read = bom;
    let mut write = 0;
    let mut buf = [0u8; 4];
    while read < bytes.len() {
        let quad = [bytes[read], bytes[read + 1], bytes[read + 2], bytes[read + 3]];
        let code = if encoding.is_big_endian() {
            u32::from_be_bytes(quad)
        } else {
            u32::from_le_bytes(quad)
        };
        let ch = char::from_u32(code).ok_or(EncodingError::InvalidSequence {
            encoding,
            offset: read,
        })?;
        let encoded = ch.encode_utf8(&mut buf).as_bytes();
        bytes[write..write + encoded.len()].copy_from_slice(encoded);
        write += encoded.len();
        read += 4;
    }
    bytes.truncate(write);
    Ok(bytes)
}
