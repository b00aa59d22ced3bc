//! A BIFF8 workbook stream held as records.
//!
//! Globals records are kept as read, except FONT, FORMAT and XF which live in
//! the [`FormattingTable`]. Each of those groups is written back where its
//! first record was read. Writing recomputes the stream positions stored in
//! BOUNDSHEET, EXTSST and INDEX records.

use ahash::AHashMap;
use oldbook_core::{DatePatternCache, NumberFormat, Palette, Style};

use crate::biff::parser::{get_u16, get_u32, put_u32, read_u32, read_u8};
use crate::biff::records;
use crate::biff::strings::{
    codepage_label, parse_sst, read_short_string, write_short_string, DEFAULT_ENCODING,
};
use crate::biff::writer::record_framed_len;
use crate::biff::{bof_payload, parse_bof, unframe, Record, RecordWriter};
use crate::error::{XlsError, XlsResult};
use crate::font_refs;
use crate::rationalize::{self, IndexMapping, Rationalized};
use crate::sheet::SheetRecords;
use crate::styles::named::{builtin_defaults, set_xf_index, xf_index_of};
use crate::styles::{
    apply_palette, Entry, FontRecord, FormatRecord, FormattingTable, StyleResolver, XfRecord,
};

/// CODEPAGE value of UTF-16 workbooks
const CODEPAGE_UTF16: u16 = 1200;

/// Options for reading a workbook stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Encoding label for compressed strings. A CODEPAGE record naming a
    /// known code page overrides it.
    pub encoding: String,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_string(),
        }
    }
}

impl ReadOptions {
    pub fn with_encoding(label: impl Into<String>) -> Self {
        Self {
            encoding: label.into(),
        }
    }
}

/// Options for writing a workbook stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Merge duplicate fonts, formats and XFs before writing
    pub rationalize: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { rationalize: true }
    }
}

/// One slot of the globals substream.
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalsItem {
    /// A record kept as read
    Record(Record),
    /// Where the FONT records are written
    Fonts,
    /// Where the FORMAT records are written
    Formats,
    /// Where the XF records are written
    Xfs,
}

/// Sheet metadata from a BOUNDSHEET record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundSheet {
    /// Stream position of the sheet's BOF
    pub position: u32,
    /// 0 = visible, 1 = hidden, 2 = very hidden
    pub visibility: u8,
    /// 0 = worksheet, 2 = chart, 6 = VB module
    pub sheet_type: u8,
    pub name: String,
}

impl BoundSheet {
    /// A visible worksheet named `name`
    pub fn worksheet(name: &str) -> Self {
        Self {
            position: 0,
            visibility: 0,
            sheet_type: 0,
            name: name.to_string(),
        }
    }

    pub fn parse(data: &[u8], encoding: &str) -> XlsResult<Self> {
        let mut offset = 0;
        let position = read_u32(data, &mut offset)?;
        let visibility = read_u8(data, &mut offset)? & 0x03;
        let sheet_type = read_u8(data, &mut offset)?;
        let name = read_short_string(data, &mut offset, encoding)?;
        Ok(Self {
            position,
            visibility,
            sheet_type,
            name,
        })
    }

    pub fn encode(&self, encoding: &str) -> Vec<u8> {
        let mut data = Vec::with_capacity(8 + self.name.len());
        data.extend_from_slice(&self.position.to_le_bytes());
        data.push(self.visibility);
        data.push(self.sheet_type);
        write_short_string(&mut data, &self.name, false, encoding);
        data
    }
}

/// A BIFF8 workbook: globals, formatting table and sheet substreams.
#[derive(Debug, Clone)]
pub struct BiffWorkbook {
    globals: Vec<GlobalsItem>,
    table: FormattingTable,
    palette: Palette,
    sheets: Vec<SheetRecords>,
    sheet_info: Vec<BoundSheet>,
    shared_strings: Vec<String>,
    encoding: String,
    date1904: bool,
    dates: DatePatternCache,
}

impl Default for BiffWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

impl BiffWorkbook {
    /// A new workbook with the default formatting table and one empty sheet.
    pub fn new() -> Self {
        let mut globals = vec![
            GlobalsItem::Record(Record::new(
                records::BOF,
                bof_payload(records::BOF_WORKBOOK_GLOBALS),
            )),
            GlobalsItem::Record(Record::new(
                records::CODEPAGE,
                CODEPAGE_UTF16.to_le_bytes().to_vec(),
            )),
            GlobalsItem::Record(Record::new(records::WINDOW1, window1_payload())),
            GlobalsItem::Record(Record::new(records::DATEMODE, vec![0, 0])),
            GlobalsItem::Fonts,
            GlobalsItem::Formats,
            GlobalsItem::Xfs,
        ];
        globals.extend(builtin_defaults().iter().map(|style| {
            GlobalsItem::Record(Record::new(records::STYLE, style.encode(DEFAULT_ENCODING)))
        }));
        globals.push(GlobalsItem::Record(Record::new(records::EOF, Vec::new())));

        let mut workbook = Self {
            globals,
            table: FormattingTable::with_defaults(),
            palette: Palette::default(),
            sheets: Vec::new(),
            sheet_info: Vec::new(),
            shared_strings: Vec::new(),
            encoding: DEFAULT_ENCODING.to_string(),
            date1904: false,
            dates: DatePatternCache::new(),
        };
        workbook.add_sheet("Sheet1");
        workbook
    }

    /// Read a workbook from the bytes of a `Workbook` stream.
    pub fn from_stream(bytes: &[u8], options: &ReadOptions) -> XlsResult<Self> {
        let mut groups = split_substreams(unframe(bytes)?).into_iter();
        let globals = groups
            .next()
            .ok_or_else(|| XlsError::InvalidFormat("empty workbook stream".into()))?;
        check_globals_bof(&globals)?;

        let encoding = globals
            .iter()
            .find(|r| r.record_type == records::CODEPAGE && r.data.len() >= 2)
            .and_then(|r| codepage_label(get_u16(&r.data, 0)))
            .map_or_else(|| options.encoding.clone(), str::to_string);

        let mut workbook = Self {
            globals: Vec::with_capacity(globals.len()),
            table: FormattingTable::new(),
            palette: Palette::default(),
            sheets: Vec::new(),
            sheet_info: Vec::new(),
            shared_strings: Vec::new(),
            encoding,
            date1904: false,
            dates: DatePatternCache::new(),
        };
        let mut format_remap: AHashMap<u16, u16> = AHashMap::new();

        for record in globals {
            match record.record_type {
                records::FONT => {
                    workbook.mark(GlobalsItem::Fonts);
                    let font = FontRecord::parse(&record.data, &workbook.encoding)
                        .unwrap_or_else(|e| {
                            log::warn!(
                                "unreadable FONT record at {:?}, using the default font: {e}",
                                record.stream_offset
                            );
                            FontRecord::default()
                        });
                    let index = workbook.table.next_font_index();
                    workbook.table.add_font(Entry::Parsed { index, value: font });
                }
                records::FORMAT => {
                    workbook.mark(GlobalsItem::Formats);
                    match FormatRecord::parse(&record.data, &workbook.encoding) {
                        Ok((index, format)) => {
                            let assigned = workbook.table.add_format(Entry::Parsed {
                                index,
                                value: format,
                            })?;
                            if assigned != index {
                                format_remap.insert(index, assigned);
                            }
                        }
                        Err(e) => log::warn!(
                            "skipping unreadable FORMAT record at {:?}: {e}",
                            record.stream_offset
                        ),
                    }
                }
                records::XF => {
                    workbook.mark(GlobalsItem::Xfs);
                    let index = workbook.table.xfs().len() as u16;
                    workbook.table.add_xf(Entry::Parsed {
                        index,
                        value: XfRecord::parse(&record.data),
                    })?;
                }
                records::SST => {
                    match parse_sst(&record.data, record.fragments(), &workbook.encoding) {
                        Ok(strings) => workbook.shared_strings = strings,
                        Err(e) => log::warn!("unreadable shared string table: {e}"),
                    }
                    workbook.globals.push(GlobalsItem::Record(record));
                }
                records::BOUNDSHEET => {
                    let info = BoundSheet::parse(&record.data, &workbook.encoding)?;
                    workbook.sheet_info.push(info);
                    workbook.globals.push(GlobalsItem::Record(record));
                }
                records::DATEMODE => {
                    workbook.date1904 = record.data.len() >= 2 && get_u16(&record.data, 0) == 1;
                    workbook.globals.push(GlobalsItem::Record(record));
                }
                records::PALETTE => {
                    if let Err(e) = apply_palette(&record.data, &mut workbook.palette) {
                        log::warn!("ignoring PALETTE record: {e}");
                    }
                    workbook.globals.push(GlobalsItem::Record(record));
                }
                _ => workbook.globals.push(GlobalsItem::Record(record)),
            }
        }

        for xf in &mut workbook.table.xfs {
            if let Some(&assigned) = format_remap.get(&xf.format_index) {
                xf.format_index = assigned;
            }
        }
        workbook.ensure_markers();
        workbook.sheets = groups.map(SheetRecords::new).collect();

        log::debug!(
            "read workbook: {} fonts, {} formats, {} XFs, {} sheets, encoding {}",
            workbook.table.fonts().len(),
            workbook.table.formats().len(),
            workbook.table.xfs().len(),
            workbook.sheets.len(),
            workbook.encoding
        );
        Ok(workbook)
    }

    /// Serialize to the bytes of a `Workbook` stream.
    ///
    /// With `options.rationalize` the duplicates are merged in the written
    /// stream only; `self` is left as it is.
    pub fn to_stream(&self, options: &WriteOptions) -> XlsResult<Vec<u8>> {
        if options.rationalize {
            let mut work = self.clone();
            work.rationalize();
            work.serialize()
        } else {
            self.serialize()
        }
    }

    /// Merge duplicate formatting records and rewrite every stored XF and
    /// font reference.
    pub fn rationalize(&mut self) -> Rationalized {
        let result = rationalize::rationalize(&mut self.table);
        if !result.fonts.is_identity() {
            for item in &mut self.globals {
                if let GlobalsItem::Record(record) = item {
                    font_refs::remap_fonts(record, &result.fonts);
                }
            }
            for sheet in &mut self.sheets {
                sheet.remap_fonts(&result.fonts);
            }
        }
        if !result.xfs.is_identity() {
            for item in &mut self.globals {
                if let GlobalsItem::Record(record) = item {
                    if record.record_type == records::STYLE {
                        remap_style(record, &result.xfs);
                    }
                }
            }
            for sheet in &mut self.sheets {
                sheet.remap_xf(&result.xfs);
            }
        }
        log::info!("rationalized formatting: {}", result.report);
        result
    }

    /// Append an empty worksheet, returning its position.
    pub fn add_sheet(&mut self, name: &str) -> usize {
        let info = BoundSheet::worksheet(name);
        let record = Record::new(records::BOUNDSHEET, info.encode(&self.encoding));
        let at = self
            .globals
            .iter()
            .rposition(|item| is_record(item, records::BOUNDSHEET))
            .map(|i| i + 1)
            .or_else(|| {
                self.globals
                    .iter()
                    .rposition(|item| is_record(item, records::EOF))
            })
            .unwrap_or(self.globals.len());
        self.globals.insert(at, GlobalsItem::Record(record));
        self.sheet_info.push(info);
        self.sheets.push(SheetRecords::empty_worksheet());
        self.sheets.len() - 1
    }

    pub fn globals(&self) -> &[GlobalsItem] {
        &self.globals
    }

    pub fn table(&self) -> &FormattingTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut FormattingTable {
        &mut self.table
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn sheets(&self) -> &[SheetRecords] {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> &mut [SheetRecords] {
        &mut self.sheets
    }

    pub fn sheet_info(&self) -> &[BoundSheet] {
        &self.sheet_info
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheet_info.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn shared_strings(&self) -> &[String] {
        &self.shared_strings
    }

    /// Encoding label used for compressed strings
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Whether date serials count from 1904
    pub fn date1904(&self) -> bool {
        self.date1904
    }

    /// Resolved style of every XF
    pub fn styles(&self) -> Vec<Style> {
        StyleResolver::new(&self.table, &self.palette).resolve_all()
    }

    /// Resolved style of the XF at `xf`
    pub fn style(&self, xf: u16) -> XlsResult<Style> {
        StyleResolver::new(&self.table, &self.palette).resolve(xf)
    }

    /// Number format applied by the XF at `xf`
    pub fn number_format(&self, xf: u16) -> XlsResult<NumberFormat> {
        let format_index = self.table.xf(xf)?.format_index;
        Ok(match self.table.format(format_index) {
            Ok(format) => NumberFormat::Custom(format.pattern.clone()),
            Err(_) => NumberFormat::from_id(format_index),
        })
    }

    /// Whether cells using XF `xf` display dates
    pub fn is_date_xf(&self, xf: u16) -> bool {
        self.number_format(xf)
            .map(|format| format.is_date_format())
            .unwrap_or(false)
    }

    /// Render a date serial through the number format of XF `xf`.
    pub fn format_date(&mut self, serial: f64, xf: u16) -> XlsResult<String> {
        let format_index = self.table.xf(xf)?.format_index;
        let pattern = self
            .table
            .format_pattern(format_index)
            .ok_or(XlsError::NotFound {
                kind: "number format",
                index: format_index,
            })?;
        Ok(self.dates.format_serial(serial, pattern, self.date1904)?)
    }

    /// Record where a FONT, FORMAT or XF group starts, once.
    fn mark(&mut self, marker: GlobalsItem) {
        if !self.globals.contains(&marker) {
            self.globals.push(marker);
        }
    }

    /// Give every formatting group a place to be written, even when the
    /// stream had none of its records.
    fn ensure_markers(&mut self) {
        if !self.globals.contains(&GlobalsItem::Xfs) {
            let at = self
                .globals
                .iter()
                .position(|item| {
                    matches!(
                        item,
                        GlobalsItem::Record(r) if matches!(
                            r.record_type,
                            records::STYLE | records::BOUNDSHEET | records::EOF
                        )
                    )
                })
                .unwrap_or(self.globals.len());
            self.globals.insert(at, GlobalsItem::Xfs);
        }
        for (missing, before) in [
            (GlobalsItem::Formats, GlobalsItem::Xfs),
            (GlobalsItem::Fonts, GlobalsItem::Formats),
        ] {
            if !self.globals.contains(&missing) {
                let at = self
                    .globals
                    .iter()
                    .position(|item| *item == before)
                    .unwrap_or(self.globals.len());
                self.globals.insert(at, missing);
            }
        }
    }

    /// Globals with the formatting groups expanded into records
    fn globals_records(&self) -> Vec<Record> {
        let mut out = Vec::with_capacity(
            self.globals.len()
                + self.table.fonts().len()
                + self.table.formats().len()
                + self.table.xfs().len(),
        );
        for item in &self.globals {
            match item {
                GlobalsItem::Record(record) => out.push(record.clone()),
                GlobalsItem::Fonts => out.extend(
                    self.table
                        .fonts()
                        .iter()
                        .map(|f| Record::new(records::FONT, f.value.encode(&self.encoding))),
                ),
                GlobalsItem::Formats => out.extend(self.table.formats().iter().map(|f| {
                    Record::new(records::FORMAT, f.value.encode(f.index, &self.encoding))
                })),
                GlobalsItem::Xfs => out.extend(
                    self.table
                        .xfs()
                        .iter()
                        .map(|xf| Record::new(records::XF, xf.encode())),
                ),
            }
        }
        out
    }

    fn serialize(&self) -> XlsResult<Vec<u8>> {
        let mut globals = self.globals_records();
        let mut sheets: Vec<Vec<Record>> =
            self.sheets.iter().map(|s| s.records.clone()).collect();

        let layout = Layout::compute(&globals, &sheets);
        patch_boundsheets(&mut globals, &sheets, &layout);
        patch_extsst(&mut globals, &layout);
        for (i, sheet) in sheets.iter_mut().enumerate() {
            patch_index(sheet, layout.sheet_starts[i], &layout);
        }

        let mut writer = RecordWriter::with_capacity(layout.total as usize);
        for record in globals.iter().chain(sheets.iter().flatten()) {
            writer.write_record(record);
        }
        log::debug!("wrote workbook stream of {} bytes", writer.position());
        Ok(writer.into_inner())
    }
}

fn is_record(item: &GlobalsItem, record_type: u16) -> bool {
    matches!(item, GlobalsItem::Record(r) if r.record_type == record_type)
}

fn window1_payload() -> Vec<u8> {
    // xWn, yWn, dxWn, dyWn, grbit, itabCur, itabFirst, ctabSel, wTabRatio
    [0u16, 0, 0x4000, 0x2000, 0x0038, 0, 0, 1, 0x0258]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect()
}

fn check_globals_bof(globals: &[Record]) -> XlsResult<()> {
    let first = globals
        .first()
        .filter(|r| r.record_type == records::BOF)
        .ok_or_else(|| XlsError::InvalidFormat("stream does not start with a BOF record".into()))?;
    let (version, dt) = parse_bof(&first.data)?;
    if dt != records::BOF_WORKBOOK_GLOBALS {
        return Err(XlsError::InvalidFormat(format!(
            "first substream is not workbook globals (type 0x{dt:04X})"
        )));
    }
    if version != records::BIFF8_VERSION {
        return Err(XlsError::UnsupportedVersion(format!(
            "expected BIFF8 (0x0600), got 0x{version:04X}"
        )));
    }
    Ok(())
}

/// Split records into BOF..EOF substreams. Nested substreams stay inside
/// their parent; a record outside any substream forms a group of its own.
fn split_substreams(records: Vec<Record>) -> Vec<Vec<Record>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;

    for record in records {
        match record.record_type {
            records::BOF => {
                depth += 1;
                current.push(record);
            }
            records::EOF if depth > 0 => {
                depth -= 1;
                current.push(record);
                if depth == 0 {
                    groups.push(std::mem::take(&mut current));
                }
            }
            _ if depth == 0 => {
                log::warn!(
                    "{} record outside any substream at {:?}",
                    record.kind(),
                    record.stream_offset
                );
                groups.push(vec![record]);
            }
            _ => current.push(record),
        }
    }
    if !current.is_empty() {
        log::warn!("last substream has no EOF");
        groups.push(current);
    }
    groups
}

fn remap_style(record: &mut Record, mapping: &IndexMapping) {
    let old = match xf_index_of(&record.data) {
        Ok(old) => old,
        Err(e) => {
            log::warn!("unreadable STYLE record at {:?}: {e}", record.stream_offset);
            return;
        }
    };
    match mapping.get(old) {
        Some(new) => {
            if let Err(e) = set_xf_index(&mut record.data, new) {
                log::warn!("cannot rewrite STYLE record: {e}");
            }
        }
        None => log::warn!("STYLE record refers to unknown XF {old}"),
    }
}

/// Stream positions of the records about to be written.
struct Layout {
    /// Read-time position to (written position, record type)
    moved: AHashMap<u64, (u64, u16)>,
    /// Written position of each globals record
    globals: Vec<u64>,
    /// Written position of each sheet's first record
    sheet_starts: Vec<u64>,
    total: u64,
}

impl Layout {
    fn compute(globals: &[Record], sheets: &[Vec<Record>]) -> Self {
        let mut layout = Layout {
            moved: AHashMap::new(),
            globals: Vec::with_capacity(globals.len()),
            sheet_starts: Vec::with_capacity(sheets.len()),
            total: 0,
        };
        for record in globals {
            let at = layout.place(record);
            layout.globals.push(at);
        }
        for sheet in sheets {
            layout.sheet_starts.push(layout.total);
            for record in sheet {
                layout.place(record);
            }
        }
        layout
    }

    fn place(&mut self, record: &Record) -> u64 {
        let at = self.total;
        if let Some(old) = record.stream_offset {
            self.moved.insert(old, (at, record.record_type));
        }
        self.total += record_framed_len(record) as u64;
        at
    }

    /// Written position of the record read at `old`
    fn translate(&self, old: u64) -> Option<u64> {
        self.moved.get(&old).map(|&(at, _)| at)
    }
}

/// Point each BOUNDSHEET at its sheet's BOF. A position that no longer names
/// a BOF falls back to the sheet in the same position.
fn patch_boundsheets(globals: &mut [Record], sheets: &[Vec<Record>], layout: &Layout) {
    let sheet_bofs: Vec<u64> = sheets
        .iter()
        .zip(&layout.sheet_starts)
        .filter(|(sheet, _)| sheet.first().is_some_and(|r| r.record_type == records::BOF))
        .map(|(_, &at)| at)
        .collect();

    let boundsheets = globals
        .iter_mut()
        .filter(|r| r.record_type == records::BOUNDSHEET);
    for (nth, record) in boundsheets.enumerate() {
        if record.data.len() < 4 {
            log::warn!("BOUNDSHEET {nth} is too short to hold a position");
            continue;
        }
        let old = u64::from(get_u32(&record.data, 0));
        let target = match layout.moved.get(&old) {
            Some(&(at, records::BOF)) => Some(at),
            _ => sheet_bofs.get(nth).copied(),
        };
        match target {
            Some(at) => put_u32(at as u32, &mut record.data, 0),
            None => log::warn!("BOUNDSHEET {nth} has no matching substream"),
        }
    }
}

/// Shift EXTSST string positions by the distance the SST moved.
fn patch_extsst(globals: &mut [Record], layout: &Layout) {
    let sst = globals
        .iter()
        .zip(&layout.globals)
        .find(|(r, _)| r.record_type == records::SST)
        .and_then(|(r, &at)| r.stream_offset.map(|old| at as i64 - old as i64));
    let Some(delta) = sst else {
        return;
    };
    if delta == 0 {
        return;
    }

    for record in globals
        .iter_mut()
        .filter(|r| r.record_type == records::EXTSST)
    {
        // dsst, then 8-byte ISSTINF entries starting with ib
        let count = record.data.len().saturating_sub(2) / 8;
        for i in 0..count {
            let at = 2 + 8 * i;
            let ib = i64::from(get_u32(&record.data, at)) + delta;
            put_u32(ib as u32, &mut record.data, at);
        }
    }
}

/// Translate the DBCELL and DEFCOLWIDTH positions of a sheet's INDEX record.
fn patch_index(sheet: &mut [Record], start: u64, layout: &Layout) {
    let delta = sheet
        .first()
        .and_then(|r| r.stream_offset)
        .map_or(0, |old| start as i64 - old as i64);
    let translate = |old: u32| -> u32 {
        match layout.translate(u64::from(old)) {
            Some(at) => at as u32,
            None => (i64::from(old) + delta) as u32,
        }
    };

    for record in sheet.iter_mut().filter(|r| r.record_type == records::INDEX) {
        if record.data.len() < 16 {
            log::warn!("INDEX record at {:?} is too short", record.stream_offset);
            continue;
        }
        let ib_xf = get_u32(&record.data, 12);
        if ib_xf != 0 {
            put_u32(translate(ib_xf), &mut record.data, 12);
        }
        let count = (record.data.len() - 16) / 4;
        for i in 0..count {
            let at = 16 + 4 * i;
            let old = get_u32(&record.data, at);
            put_u32(translate(old), &mut record.data, at);
        }
    }
}
