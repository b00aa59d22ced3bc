//! BIFF8 formatting records.
//!
//! FONT, FORMAT, XF and STYLE records are decoded into the [`FormattingTable`];
//! [`StyleResolver`] turns an XF into an `oldbook_core::Style`.

pub mod font;
pub mod format;
pub mod named;
pub mod table;
pub mod xf;

use oldbook_core::style::{
    BorderEdge, BorderLineStyle, BorderStyle, DiagonalDirection, FillStyle, FontStyle,
    NumberFormat, Palette, PatternType, Protection, ReadingOrder,
};
use oldbook_core::{Alignment, HorizontalAlignment, Style, VerticalAlignment};

use crate::biff::parser::read_u16;
use crate::error::{XlsError, XlsResult};

pub use font::FontRecord;
pub use format::{FormatRecord, FIRST_CUSTOM_FORMAT, MAX_CUSTOM_FORMAT};
pub use named::{StyleName, StyleRecord};
pub use table::{Entry, FormattingTable, Indexed, MAX_XF_RECORDS, MIN_XF_COUNT};
pub use xf::{XfKind, XfRecord};

/// Resolves XF records against the font and format tables and the palette.
pub struct StyleResolver<'a> {
    table: &'a FormattingTable,
    palette: &'a Palette,
}

impl<'a> StyleResolver<'a> {
    pub fn new(table: &'a FormattingTable, palette: &'a Palette) -> Self {
        Self { table, palette }
    }

    /// Build the resolved style table (one `Style` per XF record).
    pub fn resolve_all(&self) -> Vec<Style> {
        self.table.xfs().iter().map(|xf| self.resolve_xf(xf)).collect()
    }

    /// Resolve the XF at `index`
    pub fn resolve(&self, index: u16) -> XlsResult<Style> {
        self.table.xf(index).map(|xf| self.resolve_xf(xf))
    }

    /// Resolve a single XF record into a core `Style`.
    pub fn resolve_xf(&self, xf: &XfRecord) -> Style {
        Style {
            font: self.resolve_font(xf.font_index),
            fill: self.resolve_fill(xf),
            border: self.resolve_border(xf),
            alignment: resolve_alignment(xf),
            number_format: self.resolve_number_format(xf.format_index),
            protection: Protection {
                locked: xf.locked,
                hidden: xf.hidden,
            },
        }
    }

    fn resolve_font(&self, font_index: u16) -> FontStyle {
        match self.table.font(font_index) {
            Ok(font) => font.to_style(self.palette),
            Err(_) => FontStyle::default(),
        }
    }

    fn resolve_fill(&self, xf: &XfRecord) -> FillStyle {
        let pattern = PatternType::from_biff(xf.pattern);
        let fill = FillStyle::pattern(
            pattern,
            self.palette.resolve(xf.icv_fore),
            self.palette.resolve(xf.icv_back),
        );
        // Solid fill with an automatic colour paints nothing
        match fill {
            FillStyle::Solid { color } if color.is_auto() => FillStyle::None,
            fill => fill,
        }
    }

    fn resolve_border(&self, xf: &XfRecord) -> BorderStyle {
        let edge = |code: u8, icv: u16| {
            BorderEdge::from_parts(BorderLineStyle::from_biff(code), self.palette.resolve(icv))
        };

        BorderStyle {
            left: edge(xf.border_left, xf.icv_left),
            right: edge(xf.border_right, xf.icv_right),
            top: edge(xf.border_top, xf.icv_top),
            bottom: edge(xf.border_bottom, xf.icv_bottom),
            diagonal: edge(xf.border_diag, xf.icv_diag),
            diagonal_direction: DiagonalDirection::from_biff(xf.diagonal),
        }
    }

    fn resolve_number_format(&self, format_index: u16) -> NumberFormat {
        if format_index == NumberFormat::ID_GENERAL {
            return NumberFormat::General;
        }
        match self.table.format(format_index) {
            Ok(format) => NumberFormat::Custom(format.pattern.clone()),
            Err(_) => NumberFormat::BuiltIn(format_index),
        }
    }
}

fn resolve_alignment(xf: &XfRecord) -> Alignment {
    Alignment {
        horizontal: HorizontalAlignment::from_biff(xf.horizontal),
        vertical: VerticalAlignment::from_biff(xf.vertical),
        wrap_text: xf.wrap,
        shrink_to_fit: xf.shrink,
        indent: xf.indent,
        rotation: Alignment::rotation_from_biff(xf.rotation),
        reading_order: ReadingOrder::from_biff(xf.reading_order),
    }
}

/// Apply a PALETTE record.
///
/// Layout:
///   0  u16  ccv    number of colors (typically 56)
///   2  ...  colors array of ccv × 4-byte entries (R, G, B, 0x00)
pub fn apply_palette(data: &[u8], palette: &mut Palette) -> XlsResult<()> {
    if data.len() < 2 {
        return Err(XlsError::Parse("PALETTE record too short".into()));
    }

    let mut off = 0;
    let count = read_u16(data, &mut off)? as usize;
    for slot in 0..count.min(56) {
        let Some(entry) = data.get(off..off + 4) else {
            log::warn!("PALETTE record truncated after {slot} of {count} colors");
            break;
        };
        palette.set(slot, (entry[0], entry[1], entry[2]));
        off += 4;
    }
    Ok(())
}
