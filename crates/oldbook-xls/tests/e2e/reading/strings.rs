//! Tests for shared strings, sheet names and substream layout.

use crate::{dimension, label_sst, number, sst, RawRecord, WorkbookFixture};
use oldbook_xls::biff::records;
use oldbook_xls::workbook::{BiffWorkbook, ReadOptions};
use oldbook_xls::XlsError;

#[test]
fn test_xls_sst_spans_continue() {
    let mut fixture = WorkbookFixture::new();
    let mut head = Vec::new();
    head.extend_from_slice(&2u32.to_le_bytes());
    head.extend_from_slice(&2u32.to_le_bytes());
    head.extend_from_slice(&[5, 0, 0]);
    head.extend_from_slice(b"Hello");
    head.extend_from_slice(&[6, 0, 0]);
    head.extend_from_slice(b"Wor");
    // The rest of "World!" resumes as UTF-16 behind a fresh flags byte
    let mut rest = vec![0x01];
    for c in "ld!".encode_utf16() {
        rest.extend_from_slice(&c.to_le_bytes());
    }
    fixture.global(RawRecord::continued(records::SST, vec![head, rest]));
    fixture.sheet("Sheet1", vec![label_sst(0, 0, 15, 1)]);

    let workbook = fixture.read();
    assert_eq!(workbook.shared_strings(), ["Hello", "World!"]);
    let sst = crate::globals_of(&workbook, records::SST);
    assert_eq!(sst[0].fragments(), &[22, 7]);
}

#[test]
fn test_xls_codepage_decodes_sheet_names() {
    let mut fixture = WorkbookFixture::new().codepage(1251);
    fixture.sheet("Лист1", vec![dimension()]);
    fixture.sheet("Итоги", vec![dimension()]);

    let workbook = fixture.read();
    assert_eq!(workbook.encoding(), "windows-1251");
    assert_eq!(workbook.sheet_names(), vec!["Лист1", "Итоги"]);
}

#[test]
fn test_xls_sheet_positions_match_substreams() {
    let mut fixture = WorkbookFixture::new();
    fixture.global(sst(&["a", "b"]));
    fixture.sheet("First", vec![dimension(), number(0, 0, 15, 1.0)]);
    fixture.sheet("Second", vec![dimension(), number(3, 2, 15, 2.0)]);

    let workbook = fixture.read();
    assert_eq!(workbook.sheets().len(), 2);
    for (info, sheet) in workbook.sheet_info().iter().zip(workbook.sheets()) {
        assert_eq!(sheet.stream_offset(), Some(u64::from(info.position)));
        assert_eq!(sheet.substream_type(), Some(records::BOF_WORKSHEET));
    }
    assert_eq!(workbook.sheets()[1].cell_xfs()[0].row, 3);
}

#[test]
fn test_xls_truncated_stream_is_fatal() {
    let mut fixture = WorkbookFixture::new();
    fixture.sheet("Sheet1", vec![number(0, 0, 15, 1.0)]);
    let mut bytes = fixture.build();
    bytes.truncate(bytes.len() - 2);

    let result = BiffWorkbook::from_stream(&bytes, &ReadOptions::default());
    assert!(matches!(result, Err(XlsError::MalformedRecord { .. })));
}
