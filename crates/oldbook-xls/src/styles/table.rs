//! The workbook's formatting tables: fonts, number formats and XFs.
//!
//! Values enter the table as an [`Entry`], either read from a file with the
//! index it was stored under or new, and leave it as [`Indexed`] values with
//! their final index assigned.

use oldbook_core::style::builtin_index;
use oldbook_core::style::builtin_pattern;

use super::font::FontRecord;
use super::format::{is_custom, FormatRecord, FIRST_CUSTOM_FORMAT, MAX_CUSTOM_FORMAT};
use super::xf::XfRecord;
use crate::error::{XlsError, XlsResult};

/// Fonts every workbook starts with; they are never merged away.
pub const DEFAULT_FONT_COUNT: usize = 4;

/// Font index that is never assigned.
pub const RESERVED_FONT_INDEX: u16 = 4;

/// XFs every workbook starts with: 15 style XFs, the default cell XF and five
/// built-in number styles.
pub const MIN_XF_COUNT: usize = 21;

/// Most XF records a workbook can hold.
pub const MAX_XF_RECORDS: usize = 4050;

/// A value on its way into the table.
#[derive(Debug, Clone)]
pub enum Entry<T> {
    /// Read from a file, stored under `index`
    Parsed { index: u16, value: T },
    /// Created in memory; the table picks the index
    New(T),
}

/// A value with its assigned index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indexed<T> {
    pub index: u16,
    pub value: T,
}

/// Font index of the font at `position` in storage order.
pub fn font_index_at(position: usize) -> u16 {
    if position < RESERVED_FONT_INDEX as usize {
        position as u16
    } else {
        position as u16 + 1
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormattingTable {
    pub(crate) fonts: Vec<Indexed<FontRecord>>,
    /// FORMAT records in stored order; built-in indices override the catalog
    pub(crate) formats: Vec<Indexed<FormatRecord>>,
    pub(crate) xfs: Vec<XfRecord>,
    pub(crate) next_format: u16,
}

impl FormattingTable {
    pub fn new() -> Self {
        Self {
            next_format: FIRST_CUSTOM_FORMAT,
            ..Self::default()
        }
    }

    /// The minimum table a new workbook needs.
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for _ in 0..DEFAULT_FONT_COUNT {
            table.fonts.push(Indexed {
                index: font_index_at(table.fonts.len()),
                value: FontRecord::default(),
            });
        }

        let style = |font_index: u16, used_attributes: u8| {
            let mut xf = XfRecord::style_default(font_index);
            xf.used_attributes = used_attributes;
            xf
        };
        table.xfs.push(style(0, 0x00));
        for font_index in [1, 1, 2, 2] {
            table.xfs.push(style(font_index, 0xF4));
        }
        for _ in 5..15 {
            table.xfs.push(style(0, 0xF4));
        }
        table.xfs.push(XfRecord::cell_default());
        for format_index in [0x2B, 0x29, 0x2C, 0x2A, 0x09] {
            let mut xf = style(1, 0xF8);
            xf.format_index = format_index;
            table.xfs.push(xf);
        }
        debug_assert_eq!(table.xfs.len(), MIN_XF_COUNT);
        table
    }

    // ── Fonts ───────────────────────────────────────────────────────────

    /// Index the next new font will get
    pub fn next_font_index(&self) -> u16 {
        font_index_at(self.fonts.len())
    }

    /// Add a font, returning its index.
    ///
    /// A parsed font whose index is already allocated replaces the font stored
    /// there; any other font is appended at the next free index.
    pub fn add_font(&mut self, entry: Entry<FontRecord>) -> u16 {
        let next = self.next_font_index();
        let value = match entry {
            Entry::Parsed { index, value } if index < next => {
                if let Some(slot) = self.fonts.iter_mut().find(|f| f.index == index) {
                    log::debug!("FONT {index} redefined");
                    slot.value = value;
                    return index;
                }
                value
            }
            Entry::Parsed { index, value } => {
                if index != next {
                    log::warn!("FONT stored as {index} is assigned index {next}");
                }
                value
            }
            Entry::New(value) => value,
        };
        self.fonts.push(Indexed { index: next, value });
        next
    }

    pub fn fonts(&self) -> &[Indexed<FontRecord>] {
        &self.fonts
    }

    pub fn font(&self, index: u16) -> XlsResult<&FontRecord> {
        let position = match index {
            RESERVED_FONT_INDEX => None,
            i if i < RESERVED_FONT_INDEX => Some(i as usize),
            i => Some(i as usize - 1),
        };
        position
            .and_then(|p| self.fonts.get(p))
            .filter(|f| f.index == index)
            .or_else(|| self.fonts.iter().find(|f| f.index == index))
            .map(|f| &f.value)
            .ok_or(XlsError::NotFound {
                kind: "font",
                index,
            })
    }

    /// Index of an equal font, adding `font` if there is none.
    pub fn ensure_font(&mut self, font: FontRecord) -> u16 {
        match self.fonts.iter().find(|f| f.value == font) {
            Some(existing) => existing.index,
            None => self.add_font(Entry::New(font)),
        }
    }

    // ── Number formats ──────────────────────────────────────────────────

    /// Add a number format, returning its index.
    ///
    /// Parsed formats keep their index unless it lies above
    /// [`MAX_CUSTOM_FORMAT`], in which case they are moved to the next free
    /// custom index; callers must redirect references to the returned index.
    pub fn add_format(&mut self, entry: Entry<FormatRecord>) -> XlsResult<u16> {
        match entry {
            Entry::Parsed { index, value } if index <= MAX_CUSTOM_FORMAT => {
                if let Some(slot) = self.formats.iter_mut().find(|f| f.index == index) {
                    log::debug!("FORMAT {index} redefined");
                    slot.value = value;
                } else {
                    self.formats.push(Indexed { index, value });
                }
                if is_custom(index) && index >= self.next_format {
                    self.next_format = index + 1;
                }
                Ok(index)
            }
            Entry::Parsed { index, value } => {
                let assigned = self.allocate_format(value)?;
                log::warn!(
                    "FORMAT index 0x{index:X} is above 0x{MAX_CUSTOM_FORMAT:X}, reassigned to 0x{assigned:X}"
                );
                Ok(assigned)
            }
            Entry::New(value) => self.allocate_format(value),
        }
    }

    fn allocate_format(&mut self, value: FormatRecord) -> XlsResult<u16> {
        let index = self.next_format.max(FIRST_CUSTOM_FORMAT);
        if index > MAX_CUSTOM_FORMAT {
            return Err(XlsError::TooManyCustomFormats {
                ceiling: MAX_CUSTOM_FORMAT,
            });
        }
        self.formats.push(Indexed { index, value });
        self.next_format = index + 1;
        Ok(index)
    }

    /// Index for `pattern`: the built-in one if the catalog has it, else an
    /// existing custom format, else a newly added one.
    pub fn ensure_format(&mut self, pattern: &str) -> XlsResult<u16> {
        if let Some(index) = builtin_index(pattern) {
            return Ok(index);
        }
        let existing = self
            .formats
            .iter()
            .find(|f| is_custom(f.index) && f.value.pattern == pattern);
        match existing {
            Some(f) => Ok(f.index),
            None => self.add_format(Entry::New(FormatRecord::new(pattern))),
        }
    }

    pub fn formats(&self) -> &[Indexed<FormatRecord>] {
        &self.formats
    }

    pub fn format(&self, index: u16) -> XlsResult<&FormatRecord> {
        self.formats
            .iter()
            .find(|f| f.index == index)
            .map(|f| &f.value)
            .ok_or(XlsError::NotFound {
                kind: "number format",
                index,
            })
    }

    /// Pattern for a format index: stored formats first, then the built-in
    /// catalog.
    pub fn format_pattern(&self, index: u16) -> Option<&str> {
        match self.format(index) {
            Ok(f) => Some(&f.pattern),
            Err(_) => builtin_pattern(index),
        }
    }

    /// Number of workbook-defined formats
    pub fn custom_format_count(&self) -> usize {
        self.formats.iter().filter(|f| is_custom(f.index)).count()
    }

    // ── XFs ─────────────────────────────────────────────────────────────

    /// Append an XF, returning its index.
    pub fn add_xf(&mut self, entry: Entry<XfRecord>) -> XlsResult<u16> {
        if self.xfs.len() >= MAX_XF_RECORDS {
            return Err(XlsError::TooManyCustomStyles {
                limit: MAX_XF_RECORDS,
            });
        }
        let index = self.xfs.len() as u16;
        let mut value = match entry {
            Entry::Parsed { index: stored, value } => {
                if stored != index {
                    log::warn!("XF stored as {stored} is assigned index {index}");
                }
                value
            }
            Entry::New(value) => value,
        };
        value.validate_parent();
        self.xfs.push(value);
        Ok(index)
    }

    pub fn xfs(&self) -> &[XfRecord] {
        &self.xfs
    }

    pub fn xf(&self, index: u16) -> XlsResult<&XfRecord> {
        self.xfs.get(index as usize).ok_or(XlsError::NotFound {
            kind: "XF",
            index,
        })
    }

    /// Index of an equal XF, adding `xf` if there is none.
    pub fn ensure_xf(&mut self, xf: XfRecord) -> XlsResult<u16> {
        match self.xfs.iter().position(|x| *x == xf) {
            Some(position) => Ok(position as u16),
            None => self.add_xf(Entry::New(xf)),
        }
    }
}
