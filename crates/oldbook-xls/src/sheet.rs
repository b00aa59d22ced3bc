//! Sheet substreams and the XF references stored in their records.

use oldbook_core::SheetBounds;

use crate::biff::parser::{get_u16, get_u32, put_ieee754_double, put_u16, put_u32};
use crate::biff::records::{self, RecordKind};
use crate::biff::{bof_payload, parse_bof, Record};
use crate::cond_ranges::{dval_count, set_dval_count, CondFmtHeader, DataValidity, LineEdit};
use crate::font_refs;
use crate::rationalize::IndexMapping;

/// ROW flag: the row has a default format
const ROW_GHOST_DIRTY: u8 = 0x80;

/// Where an XF index sits inside a record payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct XfField {
    offset: usize,
    mask: u16,
}

impl XfField {
    fn full(offset: usize) -> Self {
        Self {
            offset,
            mask: 0xFFFF,
        }
    }
}

/// XF index fields of a sheet record.
fn xf_fields(record: &Record) -> Vec<XfField> {
    let data = &record.data;
    match record.kind() {
        RecordKind::MulRk if data.len() >= 6 => {
            let count = (data.len() - 6) / 6;
            (0..count).map(|i| XfField::full(4 + 6 * i)).collect()
        }
        RecordKind::MulBlank if data.len() >= 6 => {
            let count = (data.len() - 6) / 2;
            (0..count).map(|i| XfField::full(4 + 2 * i)).collect()
        }
        kind if kind.is_cell() && data.len() >= 6 => vec![XfField::full(4)],
        RecordKind::Row if data.len() >= 16 && data[12] & ROW_GHOST_DIRTY != 0 => {
            vec![XfField {
                offset: 14,
                mask: 0x0FFF,
            }]
        }
        RecordKind::ColInfo if data.len() >= 8 => vec![XfField::full(6)],
        _ => Vec::new(),
    }
}

/// An XF reference from a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellXf {
    pub row: u16,
    pub col: u16,
    pub xf: u16,
}

/// The records of one sheet substream, BOF to EOF.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRecords {
    pub records: Vec<Record>,
}

impl SheetRecords {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// An empty worksheet: BOF, DIMENSION, WINDOW2, EOF
    pub fn empty_worksheet() -> Self {
        let mut window2 = vec![0u8; 18];
        put_u16(0x06B6, &mut window2, 0);
        put_u16(0x0040, &mut window2, 6);

        Self::new(vec![
            Record::new(records::BOF, bof_payload(records::BOF_WORKSHEET)),
            Record::new(records::DIMENSION, vec![0; 14]),
            Record::new(records::WINDOW2, window2),
            Record::new(records::EOF, Vec::new()),
        ])
    }

    /// BOF substream type, if the group starts with a BOF
    pub fn substream_type(&self) -> Option<u16> {
        let first = self.records.first()?;
        if first.record_type != records::BOF {
            return None;
        }
        parse_bof(&first.data).ok().map(|(_, dt)| dt)
    }

    /// Stream offset of the first record as read
    pub fn stream_offset(&self) -> Option<u64> {
        self.records.first().and_then(|r| r.stream_offset)
    }

    /// Every XF index stored by cells, with the cell's position.
    pub fn cell_xfs(&self) -> Vec<CellXf> {
        let mut out = Vec::new();
        for record in &self.records {
            let kind = record.kind();
            if !kind.is_cell() {
                continue;
            }
            let fields = xf_fields(record);
            if fields.is_empty() {
                continue;
            }
            let row = get_u16(&record.data, 0);
            let first_col = get_u16(&record.data, 2);
            let multi = matches!(kind, RecordKind::MulRk | RecordKind::MulBlank);
            for (i, field) in fields.iter().enumerate() {
                out.push(CellXf {
                    row,
                    col: if multi {
                        first_col.saturating_add(i as u16)
                    } else {
                        first_col
                    },
                    xf: get_u16(&record.data, field.offset),
                });
            }
        }
        out
    }

    /// Every XF index stored by the sheet: cells, rows and columns
    pub fn xf_references(&self) -> Vec<u16> {
        self.records
            .iter()
            .flat_map(|record| {
                xf_fields(record)
                    .into_iter()
                    .map(move |f| get_u16(&record.data, f.offset) & f.mask)
            })
            .collect()
    }

    /// Rewrite every stored XF index through `mapping`.
    ///
    /// An index outside the mapping is left as it is.
    pub fn remap_xf(&mut self, mapping: &IndexMapping) {
        for record in &mut self.records {
            for field in xf_fields(record) {
                let stored = get_u16(&record.data, field.offset);
                let old = stored & field.mask;
                match mapping.get(old) {
                    Some(new) => {
                        let value = (stored & !field.mask) | (new & field.mask);
                        put_u16(value, &mut record.data, field.offset);
                    }
                    None => log::warn!(
                        "{} at offset {:?} refers to unknown XF {}",
                        record.kind(),
                        record.stream_offset,
                        old
                    ),
                }
            }
        }
    }

    /// Font indices named by rich strings, text boxes and chart records
    pub fn font_references(&self) -> Vec<u16> {
        self.records.iter().flat_map(font_refs::font_references).collect()
    }

    /// Rewrite every stored font index through `mapping`.
    pub fn remap_fonts(&mut self, mapping: &IndexMapping) {
        for record in &mut self.records {
            font_refs::remap_fonts(record, mapping);
        }
    }

    /// Add a NUMBER cell.
    pub fn add_number(&mut self, row: u16, col: u16, xf: u16, value: f64) {
        let mut data = vec![0u8; 14];
        put_u16(row, &mut data, 0);
        put_u16(col, &mut data, 2);
        put_u16(xf, &mut data, 4);
        put_ieee754_double(value, &mut data, 6);
        self.add_cell(Record::new(records::NUMBER, data), row, col);
    }

    /// Add a BLANK cell carrying only a format.
    pub fn add_blank(&mut self, row: u16, col: u16, xf: u16) {
        let mut data = vec![0u8; 6];
        put_u16(row, &mut data, 0);
        put_u16(col, &mut data, 2);
        put_u16(xf, &mut data, 4);
        self.add_cell(Record::new(records::BLANK, data), row, col);
    }

    /// Insert a cell record ahead of the sheet's view settings.
    fn add_cell(&mut self, record: Record, row: u16, col: u16) {
        let position = self
            .records
            .iter()
            .position(|r| matches!(r.record_type, records::WINDOW2 | records::EOF))
            .unwrap_or(self.records.len());
        self.records.insert(position, record);
        self.extend_dimension(row, col);
    }

    /// Grow the DIMENSION record to cover (row, col).
    ///
    /// Layout: u32 first row, u32 last row + 1, u16 first col, u16 last col + 1.
    fn extend_dimension(&mut self, row: u16, col: u16) {
        let Some(dim) = self
            .records
            .iter_mut()
            .find(|r| r.record_type == records::DIMENSION && r.data.len() >= 12)
        else {
            return;
        };
        let data = &mut dim.data;
        let empty = get_u32(data, 4) == 0;
        let (row, col) = (row as u32, col);
        let first_row = get_u32(data, 0);
        let last_row = get_u32(data, 4);
        let first_col = get_u16(data, 8);
        let last_col = get_u16(data, 10);
        if empty {
            put_u32(row, data, 0);
            put_u32(row + 1, data, 4);
            put_u16(col, data, 8);
            put_u16(col + 1, data, 10);
        } else {
            put_u32(first_row.min(row), data, 0);
            put_u32(last_row.max(row + 1), data, 4);
            put_u16(first_col.min(col), data, 8);
            put_u16(last_col.max(col + 1), data, 10);
        }
    }

    pub fn insert_column(&mut self, col: u16) -> usize {
        self.apply_line_edit(LineEdit::InsertColumn(col))
    }

    pub fn remove_column(&mut self, col: u16) -> usize {
        self.apply_line_edit(LineEdit::RemoveColumn(col))
    }

    pub fn insert_row(&mut self, row: u32) -> usize {
        self.apply_line_edit(LineEdit::InsertRow(row))
    }

    pub fn remove_row(&mut self, row: u32) -> usize {
        self.apply_line_edit(LineEdit::RemoveRow(row))
    }

    /// Adjust conditional format and data validation ranges for an inserted
    /// or removed line. Returns how many records changed.
    ///
    /// A conditional format left without ranges is dropped with its rules; a
    /// data validation left without ranges is dropped and the DVAL count
    /// lowered.
    pub fn apply_line_edit(&mut self, edit: LineEdit) -> usize {
        let bounds = SheetBounds::BIFF8;
        let mut kept = Vec::with_capacity(self.records.len());
        let mut changed = 0usize;
        let mut orphan_rules = 0usize;
        let mut dropped_validations = 0u32;

        for mut record in std::mem::take(&mut self.records) {
            match record.record_type {
                records::CF if orphan_rules > 0 => {
                    orphan_rules -= 1;
                    continue;
                }
                records::CFHEADER => {
                    orphan_rules = 0;
                    match CondFmtHeader::parse(&record.data) {
                        Ok(mut header) => {
                            if header.adjust(edit, bounds) {
                                changed += 1;
                                if header.is_empty() {
                                    orphan_rules = header.rule_count as usize;
                                    continue;
                                }
                                record.set_data(header.encode());
                            }
                        }
                        Err(e) => log::warn!("CFHEADER left as is: {e}"),
                    }
                }
                records::DV => match DataValidity::parse(&record.data) {
                    Ok(mut dv) => {
                        if dv.adjust(edit, bounds) {
                            changed += 1;
                            if dv.is_empty() {
                                dropped_validations += 1;
                                continue;
                            }
                            record.set_data(dv.encode());
                        }
                    }
                    Err(e) => log::warn!("DV left as is: {e}"),
                },
                _ => orphan_rules = 0,
            }
            kept.push(record);
        }

        if dropped_validations > 0 {
            if let Some(pos) = kept.iter().position(|r| r.record_type == records::DVAL) {
                let count = dval_count(&kept[pos].data).unwrap_or(0);
                let remaining = count.saturating_sub(dropped_validations);
                if remaining == 0 {
                    kept.remove(pos);
                } else {
                    set_dval_count(&mut kept[pos].data, remaining);
                }
            }
        }

        self.records = kept;
        changed
    }
}
