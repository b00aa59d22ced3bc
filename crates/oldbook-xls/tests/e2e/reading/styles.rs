//! Tests for reading formatting records into the formatting table.

use crate::{bold_font, cell_xf, number, RawRecord, WorkbookFixture};
use oldbook_core::{Color, FillStyle, NumberFormat};
use oldbook_xls::biff::records;
use oldbook_xls::styles::XfRecord;

// ── Fonts and XFs ───────────────────────────────────────────────────────

#[test]
fn test_xls_font_and_fill_resolved() {
    let mut fixture = WorkbookFixture::new();
    let font = fixture.font(bold_font("Times New Roman"));
    assert_eq!(font, 5);
    fixture.format(0xA4, "0.000");
    let xf = fixture.xf(XfRecord {
        format_index: 0xA4,
        pattern: 1,
        icv_fore: 10,
        ..cell_xf(font)
    });
    fixture.sheet("Data", vec![number(0, 0, xf, 1.25)]);

    let workbook = fixture.read();
    let style = workbook.style(xf).unwrap();
    assert!(style.font.bold);
    assert_eq!(style.font.name, "Times New Roman");
    assert_eq!(style.number_format, NumberFormat::Custom("0.000".into()));
    assert_eq!(style.fill, FillStyle::Solid { color: Color::RED });
    assert_eq!(workbook.styles().len(), 22);
}

#[test]
fn test_xls_palette_overrides_colors() {
    let mut fixture = WorkbookFixture::new();
    let xf = fixture.xf(XfRecord {
        pattern: 1,
        icv_fore: 8,
        ..XfRecord::cell_default()
    });
    let mut palette = 56u16.to_le_bytes().to_vec();
    for slot in 0..56u8 {
        palette.extend_from_slice(&[slot, 0x80, 0x40, 0]);
    }
    fixture.global(RawRecord::new(records::PALETTE, palette));

    let workbook = fixture.read();
    assert!(workbook.palette().is_customized());
    assert_eq!(
        workbook.style(xf).unwrap().fill,
        FillStyle::Solid {
            color: Color::rgb(0, 0x80, 0x40)
        }
    );
}

#[test]
fn test_xls_format_above_ceiling_is_reassigned() {
    let mut fixture = WorkbookFixture::new();
    fixture.format(0x1C0, "0.0000");
    let xf = fixture.xf(XfRecord {
        format_index: 0x1C0,
        ..XfRecord::cell_default()
    });

    let workbook = fixture.read();
    let formats = workbook.table().formats();
    assert_eq!(formats.len(), 1);
    assert_eq!(formats[0].index, 0xA4);
    assert_eq!(workbook.table().xf(xf).unwrap().format_index, 0xA4);
    assert_eq!(
        workbook.number_format(xf).unwrap(),
        NumberFormat::Custom("0.0000".into())
    );
}

#[test]
fn test_xls_builtin_format_override_kept() {
    let mut fixture = WorkbookFixture::new();
    fixture.format(0x05, "\"$\"#,##0_);(\"$\"#,##0)");
    let workbook = fixture.read();
    assert_eq!(workbook.table().formats()[0].index, 0x05);
    assert_eq!(workbook.table().custom_format_count(), 0);
}

#[test]
fn test_xls_parent_of_cell_xf_validated() {
    let mut fixture = WorkbookFixture::new();
    let xf = fixture.xf(XfRecord {
        parent: 0x0FFF,
        ..XfRecord::cell_default()
    });
    let workbook = fixture.read();
    // A cell XF must inherit from a style XF
    assert_eq!(workbook.table().xf(xf).unwrap().parent, 0);
}

// ── Dates ───────────────────────────────────────────────────────────────

#[test]
fn test_xls_date_formats() {
    let mut fixture = WorkbookFixture::new();
    fixture.format(0xA4, "yyyy-mm-dd hh:mm");
    let custom = fixture.xf(XfRecord {
        format_index: 0xA4,
        ..XfRecord::cell_default()
    });
    let builtin = fixture.xf(XfRecord {
        format_index: NumberFormat::ID_DATE_SHORT,
        ..XfRecord::cell_default()
    });
    let plain = fixture.xf(XfRecord {
        format_index: 2,
        ..XfRecord::cell_default()
    });

    let mut workbook = fixture.read();
    assert!(!workbook.date1904());
    assert!(workbook.is_date_xf(custom));
    assert!(workbook.is_date_xf(builtin));
    assert!(!workbook.is_date_xf(plain));
    assert_eq!(
        workbook.format_date(45292.5, custom).unwrap(),
        "2024-01-01 12:00"
    );
}

#[test]
fn test_xls_date1904() {
    let mut fixture = WorkbookFixture::new().date1904();
    fixture.format(0xA4, "yyyy-mm-dd");
    let xf = fixture.xf(XfRecord {
        format_index: 0xA4,
        ..XfRecord::cell_default()
    });

    let mut workbook = fixture.read();
    assert!(workbook.date1904());
    assert_eq!(workbook.format_date(0.0, xf).unwrap(), "1904-01-01");
    assert!(workbook.format_date(0.0, 999).is_err());
}
