//! BIFF8 string encoding and decoding.
//!
//! BIFF8 strings have a complex encoding:
//! - Header: char_count (1 or 2 bytes) + flags (1 byte)
//! - Flags bit 0 (`fHighByte`): 0 = compressed 8-bit, 1 = uncompressed UTF-16LE
//! - Flags bit 2 (`fExtSt`): extended string data follows (Asian phonetic)
//! - Flags bit 3 (`fRichSt`): rich text run array follows
//! - If fRichSt: 2-byte run count follows the flags
//! - If fExtSt: 4-byte extended data size follows
//! - Then the character data
//! - Then the rich text runs (4 bytes each) if fRichSt
//! - Then the extended data if fExtSt
//!
//! Compressed characters are decoded through a configurable single-byte code
//! page (an `encoding_rs` label). In SST records, strings can span CONTINUE
//! records; a continuation that splits character data starts with a new flags
//! byte that may switch between compressed and uncompressed.

use encoding_rs::Encoding;

use super::parser::{read_u16, read_u32, read_u8};
use crate::error::{XlsError, XlsResult};

const HIGH_BYTE: u8 = 0x01;
const EXT_ST: u8 = 0x04;
const RICH_ST: u8 = 0x08;

/// Code page label used when a workbook does not say otherwise.
pub const DEFAULT_ENCODING: &str = "windows-1252";

/// Encoding label for a CODEPAGE record value.
///
/// Returns `None` for UTF-16 (1200) and for code pages with no known label;
/// the caller keeps its configured encoding in both cases.
pub fn codepage_label(codepage: u16) -> Option<&'static str> {
    Some(match codepage {
        874 => "windows-874",
        932 => "shift_jis",
        936 => "gbk",
        949 => "euc-kr",
        950 => "big5",
        1250 => "windows-1250",
        1251 => "windows-1251",
        1252 => "windows-1252",
        1253 => "windows-1253",
        1254 => "windows-1254",
        1255 => "windows-1255",
        1256 => "windows-1256",
        1257 => "windows-1257",
        1258 => "windows-1258",
        10000 => "macintosh",
        _ => return None,
    })
}

/// Decode single-byte text using the code page named by `label`.
///
/// An unknown label yields an empty string.
pub fn decode_string(bytes: &[u8], label: &str) -> String {
    match Encoding::for_label(label.as_bytes()) {
        Some(encoding) => encoding
            .decode_without_bom_handling(bytes)
            .0
            .into_owned(),
        None => {
            log::warn!("unknown string encoding '{label}'");
            String::new()
        }
    }
}

/// Encode text into the single-byte code page named by `label`.
///
/// An unknown label yields no bytes. Characters the code page cannot represent
/// are replaced by the encoder.
pub fn encode_string(text: &str, label: &str) -> Vec<u8> {
    match Encoding::for_label(label.as_bytes()) {
        Some(encoding) => encoding.encode(text).0.into_owned(),
        None => {
            log::warn!("unknown string encoding '{label}'");
            Vec::new()
        }
    }
}

/// Encode `text` losslessly into a single-byte code page, if it can be.
fn encode_compressed(text: &str, label: &str) -> Option<Vec<u8>> {
    let encoding = Encoding::for_label(label.as_bytes())?;
    if encoding.output_encoding() != encoding {
        // UTF-16 labels encode to UTF-8, which is not one byte per char
        return None;
    }
    let (bytes, _, had_errors) = encoding.encode(text);
    (!had_errors && bytes.len() == text.chars().count()).then(|| bytes.into_owned())
}

/// UTF-16LE bytes of `text`, without a byte-order mark.
pub fn encode_unicode(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

/// Decode `char_count` UTF-16LE characters.
///
/// Some encoders prefix a byte-order mark; when the buffer is exactly two bytes
/// longer than the characters need, the first two bytes are dropped. Unpaired
/// surrogates decode to U+FFFD.
pub fn decode_unicode(bytes: &[u8], char_count: usize) -> String {
    let body = if bytes.len() == 2 * char_count + 2 {
        &bytes[2..]
    } else {
        bytes
    };
    let units = body
        .chunks_exact(2)
        .take(char_count)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Read a BIFF8 "short" string (1-byte length prefix, used in FONT, BOUNDSHEET).
pub fn read_short_string(data: &[u8], offset: &mut usize, encoding: &str) -> XlsResult<String> {
    Ok(read_short_string_flagged(data, offset, encoding)?.0)
}

/// Like [`read_short_string`], also reporting whether the text was stored
/// uncompressed.
pub fn read_short_string_flagged(
    data: &[u8],
    offset: &mut usize,
    encoding: &str,
) -> XlsResult<(String, bool)> {
    let char_count = read_u8(data, offset)? as usize;
    let flags = read_u8(data, offset)?;
    let text = read_character_data(data, offset, char_count, flags, encoding)?;
    Ok((text, flags & HIGH_BYTE != 0))
}

/// Read a BIFF8 Unicode string with a 2-byte length prefix (used in FORMAT,
/// LABEL, DV, etc.).
///
/// This does NOT handle CONTINUE boundaries; [`parse_sst`] does.
pub fn read_unicode_string(data: &[u8], offset: &mut usize, encoding: &str) -> XlsResult<String> {
    Ok(read_unicode_string_flagged(data, offset, encoding)?.0)
}

/// Like [`read_unicode_string`], also reporting whether the text was stored
/// uncompressed.
pub fn read_unicode_string_flagged(
    data: &[u8],
    offset: &mut usize,
    encoding: &str,
) -> XlsResult<(String, bool)> {
    let char_count = read_u16(data, offset)? as usize;
    let flags = read_u8(data, offset)?;

    let run_count = if flags & RICH_ST != 0 {
        read_u16(data, offset)? as usize
    } else {
        0
    };
    let ext_size = if flags & EXT_ST != 0 {
        read_u32(data, offset)? as usize
    } else {
        0
    };

    let text = read_character_data(data, offset, char_count, flags, encoding)?;

    // Rich text runs (4 bytes each) and phonetic data are skipped
    *offset += run_count * 4 + ext_size;
    Ok((text, flags & HIGH_BYTE != 0))
}

/// Encode a short string (1-byte length prefix).
///
/// Text is compressed when `wide` is false and the code page can hold every
/// character; otherwise it is written as UTF-16LE.
pub fn write_short_string(out: &mut Vec<u8>, text: &str, wide: bool, encoding: &str) {
    let units: Vec<u16> = text.encode_utf16().take(u8::MAX as usize).collect();
    let text = String::from_utf16_lossy(&units);
    let compressed = (!wide).then(|| encode_compressed(&text, encoding)).flatten();
    match compressed {
        Some(bytes) => {
            out.push(bytes.len() as u8);
            out.push(0);
            out.extend_from_slice(&bytes);
        }
        None => {
            out.push(units.len() as u8);
            out.push(HIGH_BYTE);
            out.extend_from_slice(&encode_unicode(&text));
        }
    }
}

/// Encode a Unicode string (2-byte length prefix, no rich text or phonetics).
pub fn write_unicode_string(out: &mut Vec<u8>, text: &str, wide: bool, encoding: &str) {
    let compressed = (!wide).then(|| encode_compressed(text, encoding)).flatten();
    match compressed {
        Some(bytes) => {
            out.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
            out.push(0);
            out.extend_from_slice(&bytes);
        }
        None => {
            let wide_bytes = encode_unicode(text);
            out.extend_from_slice(&((wide_bytes.len() / 2) as u16).to_le_bytes());
            out.push(HIGH_BYTE);
            out.extend_from_slice(&wide_bytes);
        }
    }
}

/// Read character data (no header) given char_count and flags byte.
fn read_character_data(
    data: &[u8],
    offset: &mut usize,
    char_count: usize,
    flags: u8,
    encoding: &str,
) -> XlsResult<String> {
    let byte_len = if flags & HIGH_BYTE != 0 {
        char_count * 2
    } else {
        char_count
    };
    if *offset + byte_len > data.len() {
        return Err(XlsError::Parse(format!(
            "string data too short: need {} bytes at offset {}, have {}",
            byte_len,
            *offset,
            data.len().saturating_sub(*offset)
        )));
    }
    let bytes = &data[*offset..*offset + byte_len];
    *offset += byte_len;
    Ok(if flags & HIGH_BYTE != 0 {
        decode_unicode(bytes, char_count)
    } else {
        decode_string(bytes, encoding)
    })
}

/// Cursor over a record payload that knows where its CONTINUE fragments begin.
struct FragmentCursor<'a> {
    data: &'a [u8],
    offset: usize,
    /// Payload offsets at which a new physical fragment starts
    boundaries: Vec<usize>,
}

impl<'a> FragmentCursor<'a> {
    fn new(data: &'a [u8], fragments: &[usize]) -> Self {
        let boundaries = fragments
            .iter()
            .scan(0usize, |end, len| {
                *end += len;
                Some(*end)
            })
            .filter(|&b| b < data.len())
            .collect();
        Self {
            data,
            offset: 0,
            boundaries,
        }
    }

    /// Bytes left before the next fragment boundary
    fn until_boundary(&self) -> usize {
        self.boundaries
            .iter()
            .find(|&&b| b > self.offset)
            .map_or(self.data.len(), |&b| b)
            - self.offset
    }

    fn read_chars(&mut self, mut remaining: usize, mut flags: u8, encoding: &str) -> XlsResult<String> {
        let mut text = String::with_capacity(remaining);
        while remaining > 0 {
            // Character data resumes in the next fragment behind a fresh flags byte
            if self.boundaries.contains(&self.offset) {
                flags = read_u8(self.data, &mut self.offset)?;
            }
            let width = if flags & HIGH_BYTE != 0 { 2 } else { 1 };
            let take = remaining.min(self.until_boundary() / width);
            if take == 0 {
                return Err(XlsError::Parse(format!(
                    "SST string data ends mid-character at offset {}",
                    self.offset
                )));
            }
            text.push_str(&read_character_data(
                self.data,
                &mut self.offset,
                take,
                flags,
                encoding,
            )?);
            remaining -= take;
        }
        Ok(text)
    }

    /// Read one string entry and the span of its formatting runs, if any.
    fn read_string(&mut self, encoding: &str) -> XlsResult<(String, Option<RunSpan>)> {
        let char_count = read_u16(self.data, &mut self.offset)? as usize;
        let flags = read_u8(self.data, &mut self.offset)?;
        let run_count = if flags & RICH_ST != 0 {
            read_u16(self.data, &mut self.offset)? as usize
        } else {
            0
        };
        let ext_size = if flags & EXT_ST != 0 {
            read_u32(self.data, &mut self.offset)? as usize
        } else {
            0
        };
        let text = self.read_chars(char_count, flags, encoding)?;
        let runs = (run_count > 0).then_some(RunSpan {
            offset: self.offset,
            count: run_count,
        });
        self.offset += run_count * 4 + ext_size;
        Ok((text, runs))
    }
}

/// The formatting runs of one rich string: 4-byte (character, font) pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSpan {
    /// Payload offset of the first run
    pub offset: usize,
    pub count: usize,
}

impl RunSpan {
    /// Payload offsets of the font index of each run
    pub fn font_offsets(self) -> impl Iterator<Item = usize> {
        (0..self.count).map(move |i| self.offset + 4 * i + 2)
    }
}

/// Formatting runs of every rich string in an SST payload.
///
/// Runs that would extend past the payload end the scan with a warning.
pub fn sst_run_spans(data: &[u8], fragments: &[usize]) -> Vec<RunSpan> {
    let mut cursor = FragmentCursor::new(data, fragments);
    let mut spans = Vec::new();
    // Skip the total reference count
    cursor.offset = 4;
    let Ok(unique_count) = read_u32(data, &mut cursor.offset) else {
        return spans;
    };

    for i in 0..unique_count as usize {
        match cursor.read_string(DEFAULT_ENCODING) {
            Ok((_, Some(span))) if span.offset + span.count * 4 > data.len() => {
                log::warn!("SST string {i} has formatting runs past the end of the table");
                break;
            }
            Ok((_, Some(span))) => spans.push(span),
            Ok((_, None)) => {}
            Err(_) => break,
        }
    }
    spans
}

/// Parse the Shared String Table from its merged payload.
///
/// `fragments` are the physical record lengths (SST body, then each CONTINUE
/// body); pass `&[]` for a payload that was never split.
///
/// The SST body starts with:
/// - `total_strings` (4 bytes, u32) — total string refs in workbook
/// - `unique_strings` (4 bytes, u32) — number of unique strings in this table
/// - Then `unique_strings` Unicode string entries
pub fn parse_sst(data: &[u8], fragments: &[usize], encoding: &str) -> XlsResult<Vec<String>> {
    let mut cursor = FragmentCursor::new(data, fragments);

    let _total_strings = read_u32(data, &mut cursor.offset)?;
    let unique_count = read_u32(data, &mut cursor.offset)? as usize;

    let mut strings = Vec::with_capacity(unique_count.min(data.len()));

    for i in 0..unique_count {
        match cursor.read_string(encoding) {
            Ok((s, _)) => strings.push(s),
            Err(e) => {
                // Some files pad or truncate the SST; keep what was read
                log::warn!("SST parse error at string {i}/{unique_count}: {e}");
                break;
            }
        }
    }

    Ok(strings)
}
