//! Records that apply to a list of cell ranges: conditional formats
//! (CFHEADER, 0x01B0) and data validations (DV, 0x01BE).
//!
//! Only the range lists are decoded. Everything else in the payload,
//! formulas included, is kept byte for byte; formulas are not adjusted when
//! rows or columns move.

use oldbook_core::adjust::{self, Adjusted, SheetBounds};
use oldbook_core::CellRange;

use crate::biff::parser::{read_u16, read_u32};
use crate::biff::strings::{read_unicode_string_flagged, DEFAULT_ENCODING};
use crate::error::{XlsError, XlsResult};

const REF8_LEN: usize = 8;

/// A row or column inserted into or removed from a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEdit {
    InsertColumn(u16),
    RemoveColumn(u16),
    InsertRow(u32),
    RemoveRow(u32),
}

impl LineEdit {
    pub fn apply(self, range: &mut CellRange, bounds: SheetBounds) -> Adjusted {
        match self {
            LineEdit::InsertColumn(col) => adjust::insert_column(range, col, bounds),
            LineEdit::RemoveColumn(col) => adjust::remove_column(range, col),
            LineEdit::InsertRow(row) => adjust::insert_row(range, row, bounds),
            LineEdit::RemoveRow(row) => adjust::remove_row(range, row),
        }
    }
}

/// Read a Ref8U: first row, last row, first column, last column.
fn read_ref8(data: &[u8], offset: &mut usize) -> XlsResult<CellRange> {
    let first_row = read_u16(data, offset)?;
    let last_row = read_u16(data, offset)?;
    let first_col = read_u16(data, offset)?;
    let last_col = read_u16(data, offset)?;
    Ok(CellRange::from_indices(
        first_row as u32,
        first_col,
        last_row as u32,
        last_col,
    ))
}

fn write_ref8(out: &mut Vec<u8>, range: &CellRange) {
    out.extend_from_slice(&(range.start.row as u16).to_le_bytes());
    out.extend_from_slice(&(range.end.row as u16).to_le_bytes());
    out.extend_from_slice(&range.start.col.to_le_bytes());
    out.extend_from_slice(&range.end.col.to_le_bytes());
}

/// Read a count-prefixed range list.
fn read_sqref(data: &[u8], offset: &mut usize) -> XlsResult<Vec<CellRange>> {
    let count = read_u16(data, offset)? as usize;
    let available = data.len().saturating_sub(*offset) / REF8_LEN;
    if count > available {
        return Err(XlsError::Parse(format!(
            "range list claims {count} ranges, room for {available}"
        )));
    }
    (0..count).map(|_| read_ref8(data, offset)).collect()
}

fn write_sqref(out: &mut Vec<u8>, ranges: &[CellRange]) {
    out.extend_from_slice(&(ranges.len() as u16).to_le_bytes());
    for range in ranges {
        write_ref8(out, range);
    }
}

/// Apply `edit` to every range, dropping those it collapses. Returns whether
/// anything changed.
fn adjust_ranges(ranges: &mut Vec<CellRange>, edit: LineEdit, bounds: SheetBounds) -> bool {
    let before = ranges.len();
    let mut shifted = false;
    ranges.retain_mut(|range| match edit.apply(range, bounds) {
        Adjusted::Unchanged => true,
        Adjusted::Shifted => {
            shifted = true;
            true
        }
        Adjusted::Collapsed => false,
    });
    shifted || ranges.len() != before
}

/// Smallest range enclosing all of `ranges`.
fn enclosing(ranges: &[CellRange]) -> Option<CellRange> {
    let first = ranges.first()?;
    let mut bound = *first;
    for range in &ranges[1..] {
        bound.start.row = bound.start.row.min(range.start.row);
        bound.start.col = bound.start.col.min(range.start.col);
        bound.end.row = bound.end.row.max(range.end.row);
        bound.end.col = bound.end.col.max(range.end.col);
    }
    Some(bound)
}

/// CFHEADER: the ranges a group of CF rules applies to.
///
/// Layout:
///   0   u16    ccf       number of CF records that follow
///   2   u16    flags     bit 0 recalc, bits 1-15 id
///   4   Ref8U  refBound  enclosing range
///  12   u16    cref      number of ranges
///  14   Ref8U  ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CondFmtHeader {
    pub rule_count: u16,
    pub flags: u16,
    pub bounds: CellRange,
    pub ranges: Vec<CellRange>,
    tail: Vec<u8>,
}

impl CondFmtHeader {
    pub fn parse(data: &[u8]) -> XlsResult<Self> {
        let mut off = 0;
        let rule_count = read_u16(data, &mut off)?;
        let flags = read_u16(data, &mut off)?;
        let bounds = read_ref8(data, &mut off)?;
        let ranges = read_sqref(data, &mut off)?;
        Ok(Self {
            rule_count,
            flags,
            bounds,
            ranges,
            tail: data[off..].to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(14 + self.ranges.len() * REF8_LEN + self.tail.len());
        out.extend_from_slice(&self.rule_count.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        write_ref8(&mut out, &self.bounds);
        write_sqref(&mut out, &self.ranges);
        out.extend_from_slice(&self.tail);
        out
    }

    /// Adjust the ranges for `edit`. Returns whether the record changed.
    pub fn adjust(&mut self, edit: LineEdit, bounds: SheetBounds) -> bool {
        let changed = adjust_ranges(&mut self.ranges, edit, bounds);
        if changed {
            if let Some(bound) = enclosing(&self.ranges) {
                self.bounds = bound;
            }
        }
        changed
    }

    /// No range left: the header and its rules should be dropped
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// DV: one data validation rule and the ranges it applies to.
///
/// Layout:
///   0   u32    flags
///   4   4 × unicode string   prompt title, error title, prompt, error
///   ..  u16 cce, u16 reserved, formula bytes   first formula
///   ..  u16 cce, u16 reserved, formula bytes   second formula
///   ..  u16 cref, Ref8U ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataValidity {
    head: Vec<u8>,
    pub ranges: Vec<CellRange>,
    tail: Vec<u8>,
}

impl DataValidity {
    pub fn parse(data: &[u8]) -> XlsResult<Self> {
        let mut off = 0;
        let _flags = read_u32(data, &mut off)?;
        for _ in 0..4 {
            read_unicode_string_flagged(data, &mut off, DEFAULT_ENCODING)?;
        }
        for _ in 0..2 {
            let cce = read_u16(data, &mut off)? as usize;
            off += 2 + cce;
        }
        if off > data.len() {
            return Err(XlsError::Parse("DV formulas run past the record".into()));
        }
        let head = data[..off].to_vec();
        let ranges = read_sqref(data, &mut off)?;
        Ok(Self {
            head,
            ranges,
            tail: data[off..].to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(self.head.len() + 2 + self.ranges.len() * REF8_LEN + self.tail.len());
        out.extend_from_slice(&self.head);
        write_sqref(&mut out, &self.ranges);
        out.extend_from_slice(&self.tail);
        out
    }

    /// Adjust the ranges for `edit`. Returns whether the record changed.
    pub fn adjust(&mut self, edit: LineEdit, bounds: SheetBounds) -> bool {
        adjust_ranges(&mut self.ranges, edit, bounds)
    }

    /// No range left: the rule should be dropped
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Number of DV records announced by a DVAL payload.
pub fn dval_count(data: &[u8]) -> Option<u32> {
    (data.len() >= 18).then(|| crate::biff::parser::get_u32(data, 14))
}

/// Set the number of DV records announced by a DVAL payload.
pub fn set_dval_count(data: &mut [u8], count: u32) {
    if data.len() >= 18 {
        crate::biff::parser::put_u32(count, data, 14);
    } else {
        log::warn!("DVAL record too short to update its rule count");
    }
}
