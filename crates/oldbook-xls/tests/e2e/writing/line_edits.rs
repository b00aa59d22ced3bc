//! Tests for shifting conditional format and data validation ranges.

use crate::{cf_rule, cfheader, dimension, dv, dval, number, sheet_records_of, WorkbookFixture};
use oldbook_core::CellRange;
use oldbook_xls::biff::records;
use oldbook_xls::cond_ranges::{dval_count, CondFmtHeader, DataValidity};
use oldbook_xls::workbook::{BiffWorkbook, ReadOptions, WriteOptions};
use pretty_assertions::assert_eq;

fn rules_fixture() -> WorkbookFixture {
    let mut fixture = WorkbookFixture::new();
    fixture.sheet(
        "Rules",
        vec![
            dimension(),
            number(0, 0, 15, 1.0),
            cfheader(2, &[(0, 9, 4, 4)]),
            cf_rule(1),
            cf_rule(2),
            cfheader(1, &[(0, 0, 0, 1), (5, 6, 2, 3)]),
            cf_rule(3),
            dval(2),
            dv("Column E", &[(0, 9, 4, 4)]),
            dv("First two", &[(0, 3, 0, 1)]),
        ],
    );
    fixture
}

fn write_and_read(workbook: &BiffWorkbook) -> BiffWorkbook {
    let bytes = workbook.to_stream(&WriteOptions::default()).unwrap();
    BiffWorkbook::from_stream(&bytes, &ReadOptions::default()).unwrap()
}

fn headers(workbook: &BiffWorkbook) -> Vec<CondFmtHeader> {
    sheet_records_of(workbook, 0, records::CFHEADER)
        .iter()
        .map(|r| CondFmtHeader::parse(&r.data).unwrap())
        .collect()
}

fn validations(workbook: &BiffWorkbook) -> Vec<DataValidity> {
    sheet_records_of(workbook, 0, records::DV)
        .iter()
        .map(|r| DataValidity::parse(&r.data).unwrap())
        .collect()
}

#[test]
fn test_xls_inserted_column_shifts_ranges() {
    let mut workbook = rules_fixture().read();
    assert_eq!(workbook.sheets_mut()[0].insert_column(1), 4);

    let read = write_and_read(&workbook);
    let headers = headers(&read);
    assert_eq!(headers[0].ranges, vec![CellRange::from_indices(0, 5, 9, 5)]);
    assert_eq!(
        headers[1].ranges,
        vec![
            CellRange::from_indices(0, 0, 0, 2),
            CellRange::from_indices(5, 3, 6, 4)
        ]
    );
    assert_eq!(headers[1].bounds, CellRange::from_indices(0, 0, 6, 4));

    let validations = validations(&read);
    assert_eq!(validations[0].ranges, vec![CellRange::from_indices(0, 5, 9, 5)]);
    assert_eq!(validations[1].ranges, vec![CellRange::from_indices(0, 0, 3, 2)]);
    assert_eq!(sheet_records_of(&read, 0, records::CF).len(), 3);
}

#[test]
fn test_xls_removed_column_drops_emptied_rules() {
    let mut workbook = rules_fixture().read();
    workbook.sheets_mut()[0].remove_column(4);

    let read = write_and_read(&workbook);
    // The first header went with both of its rules
    let headers = headers(&read);
    assert_eq!(headers.len(), 1);
    assert_eq!(headers[0].rule_count, 1);
    let rules = sheet_records_of(&read, 0, records::CF);
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].data[6], 3);

    let validations = validations(&read);
    assert_eq!(validations.len(), 1);
    let dval = sheet_records_of(&read, 0, records::DVAL);
    assert_eq!(dval_count(&dval[0].data), Some(1));
}

#[test]
fn test_xls_last_validation_removes_dval() {
    let mut workbook = rules_fixture().read();
    let sheet = &mut workbook.sheets_mut()[0];
    sheet.remove_column(4);
    sheet.remove_column(0);
    sheet.remove_column(0);

    let read = write_and_read(&workbook);
    assert!(validations(&read).is_empty());
    assert!(sheet_records_of(&read, 0, records::DVAL).is_empty());
    // (5,6,2,3) survives as columns 0..1
    let headers = headers(&read);
    assert_eq!(headers[0].ranges, vec![CellRange::from_indices(5, 0, 6, 1)]);
}

#[test]
fn test_xls_row_edits_leave_cells_alone() {
    let mut workbook = rules_fixture().read();
    let sheet = &mut workbook.sheets_mut()[0];
    sheet.insert_row(0);
    sheet.remove_row(20);

    let read = write_and_read(&workbook);
    assert_eq!(headers(&read)[0].ranges, vec![CellRange::from_indices(1, 4, 10, 4)]);
    let cells = read.sheets()[0].cell_xfs();
    assert_eq!((cells[0].row, cells[0].col), (0, 0));
}
