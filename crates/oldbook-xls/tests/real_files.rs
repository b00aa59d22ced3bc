//! Integration tests over real-world .xls files, when any are present.
//!
//! Drop files into `excel_samples/` at the workspace root to run them.

use std::path::{Path, PathBuf};

use oldbook_xls::{BiffWorkbook, ReadOptions, WriteOptions, XlsReader};

fn project_root() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
}

fn samples() -> Vec<PathBuf> {
    let dir = project_root().join("excel_samples");
    let Ok(entries) = std::fs::read_dir(&dir) else {
        eprintln!("Skipping: {dir:?} not found");
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xls")))
        .collect()
}

#[test]
fn test_real_files_round_trip_unchanged() {
    for path in samples() {
        let file = std::fs::File::open(&path).unwrap();
        let stream = match XlsReader::workbook_stream(file) {
            Ok(stream) => stream,
            Err(e) => {
                // Some files have an .xls extension but aren't CFB
                eprintln!("Skipping {path:?}: {e}");
                continue;
            }
        };
        let workbook = match BiffWorkbook::from_stream(&stream, &ReadOptions::default()) {
            Ok(workbook) => workbook,
            Err(e) => {
                eprintln!("Skipping {path:?}: {e}");
                continue;
            }
        };
        eprintln!(
            "{path:?}: {} sheets, {} XFs",
            workbook.sheets().len(),
            workbook.table().xfs().len()
        );

        let written = workbook
            .to_stream(&WriteOptions { rationalize: false })
            .unwrap();
        let reread = BiffWorkbook::from_stream(&written, &ReadOptions::default()).unwrap();
        assert_eq!(reread.sheet_names(), workbook.sheet_names());
        assert_eq!(reread.shared_strings(), workbook.shared_strings());
    }
}

#[test]
fn test_real_files_rationalize_keeps_cell_styles() {
    for path in samples() {
        let Ok(workbook) = XlsReader::read_file(&path, &ReadOptions::default()) else {
            continue;
        };
        let written = workbook.to_stream(&WriteOptions::default()).unwrap();
        let reread = BiffWorkbook::from_stream(&written, &ReadOptions::default()).unwrap();

        assert!(reread.table().xfs().len() <= workbook.table().xfs().len());
        for (before, after) in workbook.sheets().iter().zip(reread.sheets()) {
            let old = before.cell_xfs();
            let new = after.cell_xfs();
            assert_eq!(old.len(), new.len());
            for (o, n) in old.iter().zip(&new) {
                assert_eq!((o.row, o.col), (n.row, n.col));
                if let (Ok(a), Ok(b)) = (workbook.style(o.xf), reread.style(n.xf)) {
                    assert_eq!(a, b, "{path:?} cell ({}, {})", o.row, o.col);
                }
            }
        }
    }
}
