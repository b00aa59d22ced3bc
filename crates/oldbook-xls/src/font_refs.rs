//! Font indices stored outside the formatting table.
//!
//! Rich strings carry formatting runs that name a font for each stretch of
//! text: SST entries, RSTRING cells and text boxes (TXO). Chart substreams
//! name fonts in FONTX and FBI records. All of them use the same indices as
//! XF records, so they follow the font mapping when fonts are merged.

use crate::biff::parser::{get_u16, put_u16, read_u16};
use crate::biff::records::RecordKind;
use crate::biff::strings::{read_unicode_string_flagged, sst_run_spans, RunSpan, DEFAULT_ENCODING};
use crate::biff::Record;
use crate::rationalize::IndexMapping;

/// TXO payload before the text: options, rotation, reserved, cchText,
/// cbRuns, ifntEmpty and an empty formula.
const TXO_HEADER_LEN: usize = 18;
/// One TXO formatting run: character, font, reserved
const TXO_RUN_LEN: usize = 8;

/// Payload offsets of every font index in `record`.
pub fn font_offsets(record: &Record) -> Vec<usize> {
    let data = &record.data;
    match record.kind() {
        RecordKind::Sst => sst_run_spans(data, record.fragments())
            .into_iter()
            .flat_map(RunSpan::font_offsets)
            .collect(),
        RecordKind::RString => rstring_runs(data)
            .map(|span| span.font_offsets().collect())
            .unwrap_or_default(),
        RecordKind::Txo => txo_font_offsets(record),
        RecordKind::FontX if data.len() >= 2 => vec![0],
        RecordKind::Fbi if data.len() >= 10 => vec![8],
        _ => Vec::new(),
    }
}

/// Font indices stored by `record`, in payload order
pub fn font_references(record: &Record) -> Vec<u16> {
    font_offsets(record)
        .into_iter()
        .map(|offset| get_u16(&record.data, offset))
        .collect()
}

/// Rewrite every font index in `record` through `mapping`.
///
/// The payload keeps its length, so a split record keeps its fragments. An
/// index outside the mapping is left as it is.
pub fn remap_fonts(record: &mut Record, mapping: &IndexMapping) {
    for offset in font_offsets(record) {
        let old = get_u16(&record.data, offset);
        match mapping.get(old) {
            Some(new) => put_u16(new, &mut record.data, offset),
            None => log::warn!(
                "{} at offset {:?} refers to unknown font {}",
                record.kind(),
                record.stream_offset,
                old
            ),
        }
    }
}

/// RSTRING: row, column, XF, the text, then a counted run list.
fn rstring_runs(data: &[u8]) -> Option<RunSpan> {
    let mut offset = 6;
    read_unicode_string_flagged(data, &mut offset, DEFAULT_ENCODING).ok()?;
    let count = read_u16(data, &mut offset).ok()? as usize;
    if offset + count * 4 > data.len() {
        log::warn!("RSTRING formatting runs run past the record");
        return None;
    }
    Some(RunSpan { offset, count })
}

/// TXO keeps its runs in the last CONTINUE, ending with a sentinel run that
/// holds no font. An empty text box names its font in the header instead.
fn txo_font_offsets(record: &Record) -> Vec<usize> {
    let data = &record.data;
    if data.len() < TXO_HEADER_LEN {
        return Vec::new();
    }
    let text_len = get_u16(data, 10);
    if text_len == 0 {
        return vec![14];
    }
    let runs_len = get_u16(data, 12) as usize;
    if runs_len < 2 * TXO_RUN_LEN
        || runs_len % TXO_RUN_LEN != 0
        || data.len() < TXO_HEADER_LEN + runs_len
    {
        log::warn!(
            "TXO at offset {:?} has unusable formatting runs ({runs_len} bytes)",
            record.stream_offset
        );
        return Vec::new();
    }
    let start = data.len() - runs_len;
    (0..runs_len / TXO_RUN_LEN - 1)
        .map(|i| start + TXO_RUN_LEN * i + 2)
        .collect()
}
