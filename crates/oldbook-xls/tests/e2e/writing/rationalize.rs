//! Tests for merging duplicate formatting records on write.

use crate::{
    bold_font, cell_xf, dimension, extsst, globals_of, mulblank, number, sst, WorkbookFixture,
};
use oldbook_xls::biff::parser::get_u32;
use oldbook_xls::biff::records;
use oldbook_xls::styles::named::xf_index_of;
use oldbook_xls::styles::{StyleName, StyleRecord, XfRecord};
use oldbook_xls::workbook::{BiffWorkbook, ReadOptions, WriteOptions};
use pretty_assertions::assert_eq;

/// Fonts 5 and 7 are equal, so XFs 21 and 22 become equal once fonts merge.
/// XF 23 is a user style with XF 24 as its child cell format.
fn duplicated_fixture() -> WorkbookFixture {
    let mut fixture = WorkbookFixture::new();
    let georgia = fixture.font(bold_font("Georgia"));
    let courier = fixture.font(bold_font("Courier New"));
    let georgia_again = fixture.font(bold_font("Georgia"));
    assert_eq!((georgia, courier, georgia_again), (5, 6, 7));

    assert_eq!(fixture.xf(cell_xf(georgia)), 21);
    assert_eq!(fixture.xf(cell_xf(georgia_again)), 22);
    assert_eq!(fixture.xf(XfRecord::style_default(courier)), 23);
    assert_eq!(
        fixture.xf(XfRecord {
            parent: 23,
            ..cell_xf(courier)
        }),
        24
    );
    fixture.style(StyleRecord {
        xf_index: 23,
        reserved: 0,
        name: StyleName::User {
            name: "Accent".into(),
            wide: false,
        },
    });

    fixture.global(sst(&["x", "y", "z"]));
    fixture.global(extsst(&[0x1000, 0x2000]));
    fixture.sheet(
        "Styled",
        vec![
            dimension(),
            number(0, 0, 21, 1.0),
            number(0, 1, 22, 2.0),
            number(0, 2, 24, 3.0),
            mulblank(1, 0, &[22, 15, 24]),
        ],
    );
    fixture.sheet("Plain", vec![dimension(), number(0, 0, 22, 4.0)]);
    fixture
}

#[test]
fn test_xls_duplicates_merged_on_write() {
    let workbook = duplicated_fixture().read();
    let bytes = workbook.to_stream(&WriteOptions::default()).unwrap();
    let read = BiffWorkbook::from_stream(&bytes, &ReadOptions::default()).unwrap();

    assert_eq!(read.table().fonts().len(), 6);
    assert_eq!(read.table().xfs().len(), 24);
    assert_eq!(read.sheets()[0].xf_references(), vec![21, 21, 23, 21, 15, 23]);
    assert_eq!(read.sheets()[1].xf_references(), vec![21]);

    // The user style and its child follow XF 23 down to 22
    let styles = globals_of(&read, records::STYLE);
    let user = styles.last().unwrap();
    assert_eq!(xf_index_of(&user.data).unwrap(), 22);
    assert_eq!(read.table().xf(23).unwrap().parent, 22);
    assert_eq!(read.table().xf(23).unwrap().font_index, 6);
}

#[test]
fn test_xls_cell_styles_survive_rationalization() {
    let workbook = duplicated_fixture().read();
    let before: Vec<_> = workbook.sheets()[0]
        .cell_xfs()
        .iter()
        .map(|cell| workbook.style(cell.xf).unwrap())
        .collect();

    let bytes = workbook.to_stream(&WriteOptions::default()).unwrap();
    let read = BiffWorkbook::from_stream(&bytes, &ReadOptions::default()).unwrap();
    let after: Vec<_> = read.sheets()[0]
        .cell_xfs()
        .iter()
        .map(|cell| read.style(cell.xf).unwrap())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_xls_stream_positions_follow_moved_records() {
    let workbook = duplicated_fixture().read();
    let sst_before = globals_of(&workbook, records::SST)[0].stream_offset.unwrap();
    let ext_before = globals_of(&workbook, records::EXTSST)[0].data.clone();

    let bytes = workbook.to_stream(&WriteOptions::default()).unwrap();
    let read = BiffWorkbook::from_stream(&bytes, &ReadOptions::default()).unwrap();
    let sst_after = globals_of(&read, records::SST)[0].stream_offset.unwrap();
    let ext_after = &globals_of(&read, records::EXTSST)[0].data;

    // One FONT and one XF record fewer ahead of the SST
    assert!(sst_after < sst_before);
    let shift = sst_before - sst_after;
    for entry in [2usize, 10] {
        let old = u64::from(get_u32(&ext_before, entry));
        let new = u64::from(get_u32(ext_after, entry));
        assert_eq!(old - new, shift);
    }

    for (info, sheet) in read.sheet_info().iter().zip(read.sheets()) {
        assert_eq!(sheet.stream_offset(), Some(u64::from(info.position)));
    }
}

#[test]
fn test_xls_xfs_kept_without_rationalize() {
    let workbook = duplicated_fixture().read();
    let bytes = workbook
        .to_stream(&WriteOptions { rationalize: false })
        .unwrap();
    let read = BiffWorkbook::from_stream(&bytes, &ReadOptions::default()).unwrap();
    assert_eq!(read.table().xfs().len(), 25);
    assert_eq!(read.sheets()[1].xf_references(), vec![22]);
}

#[test]
fn test_xls_rationalize_in_place_reports_removals() {
    let mut workbook = duplicated_fixture().read();
    let result = workbook.rationalize();
    assert_eq!(result.report.fonts_removed, 1);
    assert_eq!(result.report.formats_removed, 0);
    assert_eq!(result.report.xfs_removed, 1);
    assert_eq!(result.fonts.get(7), Some(5));
    assert_eq!(result.xfs.get(24), Some(23));

    // A second pass has nothing left to merge
    assert!(workbook.rationalize().report.is_empty());
}

#[test]
fn test_xls_duplicate_formats_merged() {
    let mut fixture = WorkbookFixture::new();
    fixture.format(0xA4, "0.0");
    fixture.format(0xA5, "0.0");
    fixture.format(0xA6, "#,##0.000");
    for format_index in [0xA4, 0xA5, 0xA6] {
        fixture.xf(XfRecord {
            format_index,
            ..XfRecord::cell_default()
        });
    }
    fixture.sheet("Numbers", vec![dimension(), number(0, 0, 23, 1.5)]);

    let workbook = fixture.read();
    let bytes = workbook.to_stream(&WriteOptions::default()).unwrap();
    let read = BiffWorkbook::from_stream(&bytes, &ReadOptions::default()).unwrap();

    let formats: Vec<(u16, &str)> = read
        .table()
        .formats()
        .iter()
        .map(|f| (f.index, f.value.pattern.as_str()))
        .collect();
    assert_eq!(formats, vec![(0xA4, "0.0"), (0xA5, "#,##0.000")]);
    // XFs 21 and 22 now agree; the third moves down
    assert_eq!(read.table().xfs().len(), 23);
    assert_eq!(read.sheets()[0].xf_references(), vec![22]);
    assert_eq!(read.table().xf(22).unwrap().format_index, 0xA5);
}
