//! Common utilities for XLS E2E tests.
//!
//! [`WorkbookFixture`] assembles a Workbook stream the way a spreadsheet
//! application lays one out: globals with the formatting records, one
//! BOUNDSHEET per sheet pointing at its BOF, then the sheet substreams.

use oldbook_xls::biff::frame;
use oldbook_xls::biff::records;
use oldbook_xls::biff::strings::{codepage_label, DEFAULT_ENCODING};
use oldbook_xls::biff::{bof_payload, Record};
use oldbook_xls::styles::named::builtin_defaults;
use oldbook_xls::styles::table::font_index_at;
use oldbook_xls::styles::{FontRecord, FormatRecord, FormattingTable, StyleRecord, XfRecord};
use oldbook_xls::workbook::{BiffWorkbook, BoundSheet, GlobalsItem, ReadOptions};

/// A record as it will be framed. Fragments after the first are written as
/// CONTINUE records.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub code: u16,
    pub fragments: Vec<Vec<u8>>,
}

impl RawRecord {
    pub fn new(code: u16, payload: Vec<u8>) -> Self {
        Self {
            code,
            fragments: vec![payload],
        }
    }

    pub fn continued(code: u16, fragments: Vec<Vec<u8>>) -> Self {
        Self { code, fragments }
    }

    fn write(&self, out: &mut Vec<u8>) {
        for (i, fragment) in self.fragments.iter().enumerate() {
            let code = if i == 0 { self.code } else { records::CONTINUE };
            out.extend(frame(code, fragment));
        }
    }

    fn framed_len(&self) -> usize {
        self.fragments.iter().map(|f| 4 + f.len()).sum()
    }
}

/// Builder for a whole Workbook stream.
#[derive(Debug, Clone)]
pub struct WorkbookFixture {
    codepage: u16,
    date1904: bool,
    fonts: Vec<FontRecord>,
    formats: Vec<(u16, String)>,
    xfs: Vec<XfRecord>,
    styles: Vec<StyleRecord>,
    trailing: Vec<RawRecord>,
    sheets: Vec<(String, Vec<RawRecord>)>,
}

impl Default for WorkbookFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookFixture {
    /// Globals with the default fonts, XFs and built-in styles, no sheets
    pub fn new() -> Self {
        let table = FormattingTable::with_defaults();
        Self {
            codepage: 1252,
            date1904: false,
            fonts: table.fonts().iter().map(|f| f.value.clone()).collect(),
            formats: Vec::new(),
            xfs: table.xfs().to_vec(),
            styles: builtin_defaults(),
            trailing: Vec::new(),
            sheets: Vec::new(),
        }
    }

    pub fn codepage(mut self, codepage: u16) -> Self {
        self.codepage = codepage;
        self
    }

    pub fn date1904(mut self) -> Self {
        self.date1904 = true;
        self
    }

    /// Add a FONT record, returning its font index
    pub fn font(&mut self, font: FontRecord) -> u16 {
        self.fonts.push(font);
        font_index_at(self.fonts.len() - 1)
    }

    pub fn format(&mut self, index: u16, pattern: &str) {
        self.formats.push((index, pattern.to_string()));
    }

    /// Add an XF record, returning its index
    pub fn xf(&mut self, xf: XfRecord) -> u16 {
        self.xfs.push(xf);
        (self.xfs.len() - 1) as u16
    }

    pub fn style(&mut self, style: StyleRecord) {
        self.styles.push(style);
    }

    /// A globals record written after the BOUNDSHEET records
    pub fn global(&mut self, record: RawRecord) {
        self.trailing.push(record);
    }

    /// Add a worksheet; `records` go between its BOF and EOF
    pub fn sheet(&mut self, name: &str, records: Vec<RawRecord>) {
        self.sheets.push((name.to_string(), records));
    }

    fn encoding(&self) -> &'static str {
        codepage_label(self.codepage).unwrap_or(DEFAULT_ENCODING)
    }

    fn globals_head(&self) -> Vec<RawRecord> {
        let encoding = self.encoding();
        let mut head = vec![
            RawRecord::new(records::BOF, bof_payload(records::BOF_WORKBOOK_GLOBALS)),
            RawRecord::new(records::CODEPAGE, self.codepage.to_le_bytes().to_vec()),
            RawRecord::new(
                records::DATEMODE,
                u16::from(self.date1904).to_le_bytes().to_vec(),
            ),
        ];
        head.extend(
            self.fonts
                .iter()
                .map(|f| RawRecord::new(records::FONT, f.encode(encoding))),
        );
        head.extend(self.formats.iter().map(|(index, pattern)| {
            RawRecord::new(
                records::FORMAT,
                FormatRecord::new(pattern.as_str()).encode(*index, encoding),
            )
        }));
        head.extend(
            self.xfs
                .iter()
                .map(|xf| RawRecord::new(records::XF, xf.encode())),
        );
        head.extend(
            self.styles
                .iter()
                .map(|s| RawRecord::new(records::STYLE, s.encode(encoding))),
        );
        head
    }

    fn sheet_substream(records: &[RawRecord]) -> Vec<RawRecord> {
        let mut all = vec![RawRecord::new(
            records::BOF,
            bof_payload(records::BOF_WORKSHEET),
        )];
        all.extend(records.iter().cloned());
        all.push(RawRecord::new(records::EOF, Vec::new()));
        all
    }

    /// Frame the stream, pointing every BOUNDSHEET at its sheet's BOF
    pub fn build(&self) -> Vec<u8> {
        let encoding = self.encoding();
        let head = self.globals_head();
        let boundsheet = |name: &str, position: u32| {
            let info = BoundSheet {
                position,
                ..BoundSheet::worksheet(name)
            };
            RawRecord::new(records::BOUNDSHEET, info.encode(encoding))
        };
        let mut tail = self.trailing.clone();
        tail.push(RawRecord::new(records::EOF, Vec::new()));

        let substreams: Vec<Vec<RawRecord>> = self
            .sheets
            .iter()
            .map(|(_, records)| Self::sheet_substream(records))
            .collect();

        let globals_len: usize = head.iter().map(RawRecord::framed_len).sum::<usize>()
            + self
                .sheets
                .iter()
                .map(|(name, _)| boundsheet(name, 0).framed_len())
                .sum::<usize>()
            + tail.iter().map(RawRecord::framed_len).sum::<usize>();

        let mut position = globals_len;
        let mut boundsheets = Vec::new();
        for ((name, _), substream) in self.sheets.iter().zip(&substreams) {
            boundsheets.push(boundsheet(name, position as u32));
            position += substream.iter().map(RawRecord::framed_len).sum::<usize>();
        }

        let mut out = Vec::with_capacity(position);
        for record in head
            .iter()
            .chain(&boundsheets)
            .chain(&tail)
            .chain(substreams.iter().flatten())
        {
            record.write(&mut out);
        }
        out
    }

    pub fn read(&self) -> BiffWorkbook {
        BiffWorkbook::from_stream(&self.build(), &ReadOptions::default())
            .expect("fixture should parse")
    }
}

// ── Record payloads ─────────────────────────────────────────────────────

pub fn number(row: u16, col: u16, xf: u16, value: f64) -> RawRecord {
    let mut data = Vec::with_capacity(14);
    for v in [row, col, xf] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    data.extend_from_slice(&value.to_le_bytes());
    RawRecord::new(records::NUMBER, data)
}

pub fn label_sst(row: u16, col: u16, xf: u16, string: u32) -> RawRecord {
    let mut data = Vec::with_capacity(10);
    for v in [row, col, xf] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    data.extend_from_slice(&string.to_le_bytes());
    RawRecord::new(records::LABELSST, data)
}

pub fn mulblank(row: u16, first_col: u16, xfs: &[u16]) -> RawRecord {
    let mut data = Vec::new();
    data.extend_from_slice(&row.to_le_bytes());
    data.extend_from_slice(&first_col.to_le_bytes());
    for xf in xfs {
        data.extend_from_slice(&xf.to_le_bytes());
    }
    data.extend_from_slice(&(first_col + xfs.len() as u16 - 1).to_le_bytes());
    RawRecord::new(records::MULBLANK, data)
}

/// SST of compressed strings in one fragment
pub fn sst(strings: &[&str]) -> RawRecord {
    let mut data = Vec::new();
    data.extend_from_slice(&(strings.len() as u32).to_le_bytes());
    data.extend_from_slice(&(strings.len() as u32).to_le_bytes());
    for s in strings {
        data.extend_from_slice(&(s.len() as u16).to_le_bytes());
        data.push(0);
        data.extend_from_slice(s.as_bytes());
    }
    RawRecord::new(records::SST, data)
}

/// Payload of an SST entry; `runs` are (first character, font) pairs
pub fn sst_entry(text: &str, runs: &[(u16, u16)]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&(text.len() as u16).to_le_bytes());
    if runs.is_empty() {
        data.push(0);
    } else {
        data.push(0x08);
        data.extend_from_slice(&(runs.len() as u16).to_le_bytes());
    }
    data.extend_from_slice(text.as_bytes());
    data.extend(format_runs(runs));
    data
}

fn format_runs(runs: &[(u16, u16)]) -> Vec<u8> {
    runs.iter()
        .flat_map(|&(ich, font)| [ich.to_le_bytes(), font.to_le_bytes()].concat())
        .collect()
}

/// RSTRING cell: inline compressed text with formatting runs
pub fn rstring(row: u16, col: u16, xf: u16, text: &str, runs: &[(u16, u16)]) -> RawRecord {
    let mut data = Vec::new();
    for v in [row, col, xf, text.len() as u16] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    data.push(0);
    data.extend_from_slice(text.as_bytes());
    data.extend_from_slice(&(runs.len() as u16).to_le_bytes());
    data.extend(format_runs(runs));
    RawRecord::new(records::RSTRING, data)
}

/// EXTSST with one entry per stream position in `positions`
pub fn extsst(positions: &[u32]) -> RawRecord {
    let mut data = 8u16.to_le_bytes().to_vec();
    for &ib in positions {
        data.extend_from_slice(&ib.to_le_bytes());
        data.extend_from_slice(&12u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
    }
    RawRecord::new(records::EXTSST, data)
}

type Ref = (u16, u16, u16, u16);

fn write_refs(data: &mut Vec<u8>, ranges: &[Ref]) {
    data.extend_from_slice(&(ranges.len() as u16).to_le_bytes());
    for &(first_row, last_row, first_col, last_col) in ranges {
        for v in [first_row, last_row, first_col, last_col] {
            data.extend_from_slice(&v.to_le_bytes());
        }
    }
}

/// CFHEADER announcing `rules` CF records over `ranges`
pub fn cfheader(rules: u16, ranges: &[Ref]) -> RawRecord {
    let mut data = Vec::new();
    data.extend_from_slice(&rules.to_le_bytes());
    data.extend_from_slice(&1u16.to_le_bytes());
    let bound = (
        ranges.iter().map(|r| r.0).min().unwrap_or(0),
        ranges.iter().map(|r| r.1).max().unwrap_or(0),
        ranges.iter().map(|r| r.2).min().unwrap_or(0),
        ranges.iter().map(|r| r.3).max().unwrap_or(0),
    );
    for v in [bound.0, bound.1, bound.2, bound.3] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    write_refs(&mut data, ranges);
    RawRecord::new(records::CFHEADER, data)
}

/// A CF rule; its content is opaque to range adjustment
pub fn cf_rule(tag: u8) -> RawRecord {
    RawRecord::new(records::CF, vec![1, 3, 0, 0, 0, 0, tag, 0xFF, 0xFF, 0x3F, 0, 0])
}

pub fn dval(count: u32) -> RawRecord {
    let mut data = vec![0u8; 18];
    data[10..14].copy_from_slice(&u32::MAX.to_le_bytes());
    data[14..18].copy_from_slice(&count.to_le_bytes());
    RawRecord::new(records::DVAL, data)
}

pub fn dv(prompt: &str, ranges: &[Ref]) -> RawRecord {
    let mut data = Vec::new();
    data.extend_from_slice(&0x0001_0103u32.to_le_bytes());
    for text in ["T", "", prompt, ""] {
        data.extend_from_slice(&(text.len() as u16).to_le_bytes());
        data.push(0);
        data.extend_from_slice(text.as_bytes());
    }
    data.extend_from_slice(&[3, 0, 0, 0, 0x1E, 0x05, 0x00]);
    data.extend_from_slice(&[0, 0, 0, 0]);
    write_refs(&mut data, ranges);
    RawRecord::new(records::DV, data)
}

pub fn dimension() -> RawRecord {
    RawRecord::new(records::DIMENSION, vec![0; 14])
}

// ── Inspection helpers ──────────────────────────────────────────────────

/// Globals records of one type, in stream order
pub fn globals_of(workbook: &BiffWorkbook, record_type: u16) -> Vec<&Record> {
    workbook
        .globals()
        .iter()
        .filter_map(|item| match item {
            GlobalsItem::Record(r) if r.record_type == record_type => Some(r),
            _ => None,
        })
        .collect()
}

/// Records of one type in sheet `sheet`
pub fn sheet_records_of(workbook: &BiffWorkbook, sheet: usize, record_type: u16) -> Vec<&Record> {
    workbook.sheets()[sheet]
        .records
        .iter()
        .filter(|r| r.record_type == record_type)
        .collect()
}

/// A bold font named `name`
pub fn bold_font(name: &str) -> FontRecord {
    FontRecord {
        weight: 700,
        name: name.to_string(),
        ..FontRecord::default()
    }
}

/// A cell XF using `font_index`
pub fn cell_xf(font_index: u16) -> XfRecord {
    XfRecord {
        font_index,
        ..XfRecord::cell_default()
    }
}
