//! Shifting stored ranges when rows or columns are inserted or removed.
//!
//! Records that carry a list of target ranges (conditional formats, data
//! validations) share these rules. Removal keeps the lower bound in place when
//! the removed line is exactly the first line of the range: the range's first
//! cell shifts into the removed position's successor.

use crate::cell::CellRange;

/// Highest addressable column and row of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetBounds {
    /// Last valid column index
    pub max_col: u16,
    /// Last valid row index
    pub max_row: u32,
}

impl SheetBounds {
    /// BIFF8 worksheets: 256 columns, 65536 rows
    pub const BIFF8: SheetBounds = SheetBounds {
        max_col: 0x00FF,
        max_row: 0xFFFF,
    };
}

/// What an adjustment did to a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjusted {
    /// The line was past the end of the range
    Unchanged,
    /// One or both bounds moved
    Shifted,
    /// The removed line was the only line of the range; the range was left
    /// as-is and its owner should drop it
    Collapsed,
}

/// Adjust `range` for a column inserted at `col`.
pub fn insert_column(range: &mut CellRange, col: u16, bounds: SheetBounds) -> Adjusted {
    let (first, last) = (range.start.col, range.end.col);
    if col > last {
        return Adjusted::Unchanged;
    }
    let (first, last) = insert_at(first, last, col, bounds.max_col);
    range.start.col = first;
    range.end.col = last;
    Adjusted::Shifted
}

/// Adjust `range` for the column at `col` being removed.
pub fn remove_column(range: &mut CellRange, col: u16) -> Adjusted {
    let (first, last) = (range.start.col, range.end.col);
    match remove_at(first, last, col) {
        Some((first, last)) => {
            range.start.col = first;
            range.end.col = last;
            Adjusted::Shifted
        }
        None if col > last => Adjusted::Unchanged,
        None => Adjusted::Collapsed,
    }
}

/// Adjust `range` for a row inserted at `row`.
pub fn insert_row(range: &mut CellRange, row: u32, bounds: SheetBounds) -> Adjusted {
    let (first, last) = (range.start.row, range.end.row);
    if row > last {
        return Adjusted::Unchanged;
    }
    let (first, last) = insert_at(first, last, row, bounds.max_row);
    range.start.row = first;
    range.end.row = last;
    Adjusted::Shifted
}

/// Adjust `range` for the row at `row` being removed.
pub fn remove_row(range: &mut CellRange, row: u32) -> Adjusted {
    let (first, last) = (range.start.row, range.end.row);
    match remove_at(first, last, row) {
        Some((first, last)) => {
            range.start.row = first;
            range.end.row = last;
            Adjusted::Shifted
        }
        None if row > last => Adjusted::Unchanged,
        None => Adjusted::Collapsed,
    }
}

fn insert_at<T>(first: T, last: T, at: T, ceiling: T) -> (T, T)
where
    T: Copy + PartialOrd + std::ops::Add<Output = T> + From<u8>,
{
    let one = T::from(1);
    let first = if at <= first && first < ceiling {
        first + one
    } else {
        first
    };
    let last = if at <= last && last < ceiling {
        last + one
    } else {
        last
    };
    (first, last)
}

/// Returns `None` when the line is past the range or the range would collapse.
fn remove_at<T>(first: T, last: T, at: T) -> Option<(T, T)>
where
    T: Copy + PartialOrd + std::ops::Sub<Output = T> + From<u8>,
{
    if at > last {
        return None;
    }
    let one = T::from(1);
    if first == last && at == first {
        return None;
    }
    let first = if at < first { first - one } else { first };
    Some((first, last - one))
}
