//! Tests for font indices named by rich text when duplicate fonts merge.

use crate::{
    bold_font, dimension, globals_of, label_sst, rstring, sst_entry, RawRecord, WorkbookFixture,
};
use oldbook_xls::biff::records;
use oldbook_xls::font_refs::font_references;
use oldbook_xls::workbook::{BiffWorkbook, ReadOptions, WriteOptions};
use pretty_assertions::assert_eq;

/// Font 7 repeats font 5, so Tahoma moves from 8 down to 7. The SST's second
/// string keeps its formatting runs in a CONTINUE of their own.
fn rich_text_fixture() -> WorkbookFixture {
    let mut fixture = WorkbookFixture::new();
    let georgia = fixture.font(bold_font("Georgia"));
    let courier = fixture.font(bold_font("Courier New"));
    let georgia_again = fixture.font(bold_font("Georgia"));
    let tahoma = fixture.font(bold_font("Tahoma"));
    assert_eq!((georgia, courier, georgia_again, tahoma), (5, 6, 7, 8));

    let mut head = Vec::new();
    head.extend_from_slice(&2u32.to_le_bytes());
    head.extend_from_slice(&2u32.to_le_bytes());
    head.extend(sst_entry("plain", &[]));
    let rich = sst_entry("Tahoma, Georgia", &[(0, tahoma), (8, georgia_again)]);
    let runs_at = rich.len() - 8;
    head.extend_from_slice(&rich[..runs_at]);
    fixture.global(RawRecord::continued(
        records::SST,
        vec![head, rich[runs_at..].to_vec()],
    ));

    fixture.sheet(
        "Notes",
        vec![
            dimension(),
            label_sst(0, 0, 15, 1),
            rstring(1, 0, 15, "Mixed", &[(0, georgia_again), (2, courier)]),
        ],
    );
    fixture
}

fn sst_fonts(workbook: &BiffWorkbook) -> Vec<u16> {
    font_references(globals_of(workbook, records::SST)[0])
}

#[test]
fn test_xls_rich_text_runs_follow_merged_fonts() {
    let workbook = rich_text_fixture().read();
    assert_eq!(sst_fonts(&workbook), vec![8, 7]);

    let bytes = workbook.to_stream(&WriteOptions::default()).unwrap();
    let read = BiffWorkbook::from_stream(&bytes, &ReadOptions::default()).unwrap();

    assert_eq!(read.table().fonts().len(), 7);
    assert_eq!(read.table().font(7).unwrap().name, "Tahoma");
    assert_eq!(sst_fonts(&read), vec![7, 5]);
    assert_eq!(read.sheets()[0].font_references(), vec![5, 6]);
    for font in sst_fonts(&read)
        .into_iter()
        .chain(read.sheets()[0].font_references())
    {
        assert!(read.table().font(font).is_ok(), "font {font} dangles");
    }
}

#[test]
fn test_xls_rich_text_runs_name_the_same_fonts() {
    let workbook = rich_text_fixture().read();
    let names = |wb: &BiffWorkbook, fonts: Vec<u16>| -> Vec<String> {
        fonts
            .into_iter()
            .map(|f| wb.table().font(f).unwrap().name.clone())
            .collect()
    };
    let before = names(&workbook, sst_fonts(&workbook));

    let bytes = workbook.to_stream(&WriteOptions::default()).unwrap();
    let read = BiffWorkbook::from_stream(&bytes, &ReadOptions::default()).unwrap();
    assert_eq!(names(&read, sst_fonts(&read)), before);
    assert_eq!(read.shared_strings(), workbook.shared_strings());
}

#[test]
fn test_xls_rich_sst_keeps_its_continue_split() {
    let workbook = rich_text_fixture().read();
    let fragments = globals_of(&workbook, records::SST)[0].fragments().to_vec();
    assert_eq!(fragments.len(), 2);

    let bytes = workbook.to_stream(&WriteOptions::default()).unwrap();
    let read = BiffWorkbook::from_stream(&bytes, &ReadOptions::default()).unwrap();
    assert_eq!(globals_of(&read, records::SST)[0].fragments(), fragments.as_slice());
}

#[test]
fn test_xls_rich_text_untouched_without_rationalize() {
    let workbook = rich_text_fixture().read();
    let bytes = workbook
        .to_stream(&WriteOptions { rationalize: false })
        .unwrap();
    let read = BiffWorkbook::from_stream(&bytes, &ReadOptions::default()).unwrap();
    assert_eq!(sst_fonts(&read), vec![8, 7]);
    assert_eq!(read.sheets()[0].font_references(), vec![7, 6]);
}

#[test]
fn test_xls_rationalize_in_place_rewrites_runs() {
    let mut workbook = rich_text_fixture().read();
    let result = workbook.rationalize();
    assert_eq!(result.report.fonts_removed, 1);
    assert_eq!(result.fonts.get(8), Some(7));
    assert_eq!(sst_fonts(&workbook), vec![7, 5]);
    assert_eq!(workbook.sheets()[0].font_references(), vec![5, 6]);
}
