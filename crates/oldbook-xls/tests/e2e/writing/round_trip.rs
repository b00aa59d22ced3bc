//! Tests for writing workbooks back without changes.

use crate::{
    bold_font, cell_xf, cf_rule, cfheader, dimension, dv, dval, extsst, label_sst, mulblank,
    number, RawRecord, WorkbookFixture,
};
use oldbook_xls::biff::{records, unframe, Record, MAX_RECORD_PAYLOAD};
use oldbook_xls::styles::XfRecord;
use oldbook_xls::workbook::{BiffWorkbook, ReadOptions, WriteOptions};
use oldbook_xls::{XlsReader, XlsWriter};
use pretty_assertions::assert_eq;

const KEEP: WriteOptions = WriteOptions { rationalize: false };

/// A workbook with nothing for rationalization to merge
fn varied_fixture() -> WorkbookFixture {
    let mut fixture = WorkbookFixture::new();
    let bold = fixture.font(bold_font("Verdana"));
    fixture.format(0xA4, "0.0%");
    let heading = fixture.xf(cell_xf(bold));
    let percent = fixture.xf(XfRecord {
        format_index: 0xA4,
        ..XfRecord::cell_default()
    });

    let mut sst_head = Vec::new();
    sst_head.extend_from_slice(&3u32.to_le_bytes());
    sst_head.extend_from_slice(&2u32.to_le_bytes());
    sst_head.extend_from_slice(&[4, 0, 0]);
    sst_head.extend_from_slice(b"Name");
    sst_head.extend_from_slice(&[5, 0, 0]);
    sst_head.extend_from_slice(b"Sh");
    let sst_rest = vec![0x00, b'a', b'r', b'e'];
    fixture.global(RawRecord::continued(records::SST, vec![sst_head, sst_rest]));
    fixture.global(extsst(&[0x0400]));
    // A record the codec has no name for, split at an unusual boundary
    fixture.global(RawRecord::continued(
        0x0863,
        vec![vec![0x11; 100], vec![0x22; 50]],
    ));

    fixture.sheet(
        "Summary",
        vec![
            dimension(),
            label_sst(0, 0, heading, 0),
            label_sst(0, 1, heading, 1),
            number(1, 1, percent, 0.25),
            mulblank(2, 0, &[15, percent, heading]),
            cfheader(1, &[(1, 9, 1, 1)]),
            cf_rule(7),
            dval(1),
            dv("Pick one", &[(1, 9, 0, 0)]),
        ],
    );
    fixture.sheet("Notes", vec![dimension(), number(0, 0, 15, 42.0)]);
    fixture
}

#[test]
fn test_xls_unchanged_stream_is_byte_identical() {
    let bytes = varied_fixture().build();
    let workbook = BiffWorkbook::from_stream(&bytes, &ReadOptions::default()).unwrap();

    assert_eq!(workbook.to_stream(&KEEP).unwrap(), bytes);
    // Rationalization finds nothing to merge
    assert_eq!(workbook.to_stream(&WriteOptions::default()).unwrap(), bytes);
}

#[test]
fn test_xls_continue_split_is_preserved() {
    let bytes = varied_fixture().build();
    let workbook = BiffWorkbook::from_stream(&bytes, &ReadOptions::default()).unwrap();
    assert_eq!(workbook.shared_strings(), ["Name", "Share"]);

    let written = unframe(&workbook.to_stream(&KEEP).unwrap()).unwrap();
    let unknown = written.iter().find(|r| r.record_type == 0x0863).unwrap();
    assert_eq!(unknown.fragments(), &[100, 50]);
    let sst = written
        .iter()
        .find(|r| r.record_type == records::SST)
        .unwrap();
    assert_eq!(sst.fragments(), &[20, 4]);
}

#[test]
fn test_xls_oversized_record_is_continued() {
    let mut workbook = BiffWorkbook::new();
    let payload: Vec<u8> = (0..20_000u32).map(|i| i as u8).collect();
    let sheet = &mut workbook.sheets_mut()[0].records;
    let eof = sheet.len() - 1;
    sheet.insert(eof, Record::new(0x0866, payload.clone()));

    let bytes = workbook.to_stream(&KEEP).unwrap();
    let records = unframe(&bytes).unwrap();
    let big = records.iter().find(|r| r.record_type == 0x0866).unwrap();
    assert_eq!(big.data, payload);
    assert_eq!(
        big.fragments(),
        &[MAX_RECORD_PAYLOAD, MAX_RECORD_PAYLOAD, 20_000 - 2 * MAX_RECORD_PAYLOAD]
    );
}

#[test]
fn test_xls_file_round_trip() {
    let bytes = varied_fixture().build();
    let workbook = BiffWorkbook::from_stream(&bytes, &ReadOptions::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("round_trip.xls");
    XlsWriter::write_file(&workbook, &path, &KEEP).unwrap();

    let read = XlsReader::read_file(&path, &ReadOptions::default()).unwrap();
    assert_eq!(read.sheet_names(), vec!["Summary", "Notes"]);
    assert_eq!(read.to_stream(&KEEP).unwrap(), bytes);
}

#[test]
fn test_xls_new_workbook_file_is_readable() {
    let mut workbook = BiffWorkbook::new();
    let second = workbook.add_sheet("Totals");
    workbook.sheets_mut()[second].add_number(4, 2, 15, 9.5);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("new.xls");
    XlsWriter::write_file(&workbook, &path, &WriteOptions::default()).unwrap();

    let read = XlsReader::read_file(&path, &ReadOptions::default()).unwrap();
    assert_eq!(read.sheet_names(), vec!["Sheet1", "Totals"]);
    assert_eq!(read.sheets()[1].xf_references(), vec![15]);
    for (info, sheet) in read.sheet_info().iter().zip(read.sheets()) {
        assert_eq!(sheet.stream_offset(), Some(u64::from(info.position)));
    }
}
