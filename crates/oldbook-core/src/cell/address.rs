//! Cell address and range types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Separator between a sheet name and the cell part of a reference (`Sheet1!A1`).
pub const SHEET_QUALIFIER: char = '!';

/// Marker for an absolute column or row (`$A$1`).
pub const ABSOLUTE_MARKER: char = '$';

/// A cell address (e.g., "A1", "$B$2")
///
/// Cell addresses use a combination of column letters (A-XFD) and row numbers (1-1048576).
/// The optional `$` prefix makes a reference absolute (doesn't change when copied).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., XFD=16383)
    pub col: u16,
    /// Whether the row reference is absolute ($)
    pub row_absolute: bool,
    /// Whether the column reference is absolute ($)
    pub col_absolute: bool,
}

impl CellAddress {
    /// Create a new cell address with relative references
    pub fn new(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            row_absolute: false,
            col_absolute: false,
        }
    }

    /// Create a new cell address with specified absolute/relative flags
    pub fn with_absolute(row: u32, col: u16, row_absolute: bool, col_absolute: bool) -> Self {
        Self {
            row,
            col,
            row_absolute,
            col_absolute,
        }
    }

    /// Create an absolute cell address ($A$1 style)
    pub fn absolute(row: u32, col: u16) -> Self {
        Self::with_absolute(row, col, true, true)
    }

    /// Parse a cell address from A1-style notation.
    ///
    /// A sheet qualifier (`Sheet1!A1`) is accepted and ignored; use
    /// [`SheetCellRef::parse`] to keep it. The split between column letters and
    /// row digits is the first digit after the qualifier, so sheet names that
    /// contain digits do not confuse the row.
    ///
    /// # Examples
    /// ```
    /// use oldbook_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("A1").unwrap();
    /// assert_eq!(addr.row, 0);
    /// assert_eq!(addr.col, 0);
    ///
    /// let addr = CellAddress::parse("Q3 2024!$B$2").unwrap();
    /// assert_eq!(addr.row, 1);
    /// assert_eq!(addr.col, 1);
    /// assert!(addr.row_absolute);
    /// assert!(addr.col_absolute);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let cell = match s.rfind(SHEET_QUALIFIER) {
            Some(pos) => &s[pos + 1..],
            None => s,
        };
        if cell.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let digit_pos = cell
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| Error::InvalidAddress(format!("no row number in '{}'", s)))?;
        let (col_part, row_part) = cell.split_at(digit_pos);

        let (col_absolute, letters) = match col_part.strip_prefix(ABSOLUTE_MARKER) {
            Some(rest) => (true, rest),
            None => (false, col_part),
        };
        let (row_absolute, letters) = match letters.strip_suffix(ABSOLUTE_MARKER) {
            Some(rest) => (true, rest),
            None => (false, letters),
        };

        if letters.is_empty() {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }
        let col = Self::letters_to_column(letters)?;

        let row: u32 = row_part
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        // Rows are 1-based in text, 0-based internally
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }
        let row = row - 1;
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }

        Ok(Self {
            row,
            col,
            row_absolute,
            col_absolute,
        })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    ///
    /// This is bijective base-26: there is no zero digit, so `AA` follows `Z`.
    pub fn column_to_letters(col: u16) -> String {
        let mut buf = [0u8; 4];
        let mut pos = buf.len();
        let mut n = col as u32 + 1;

        while n > 0 {
            n -= 1;
            pos -= 1;
            buf[pos] = (n % 26) as u8 + b'A';
            n /= 26;
        }

        buf[pos..].iter().map(|&b| b as char).collect()
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
            if col > MAX_COLS as u32 {
                return Err(Error::ColumnOutOfBounds(col - 1, MAX_COLS - 1));
            }
        }

        Ok((col - 1) as u16)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        let mut result = String::with_capacity(12);

        if self.col_absolute {
            result.push(ABSOLUTE_MARKER);
        }
        result.push_str(&Self::column_to_letters(self.col));

        if self.row_absolute {
            result.push(ABSOLUTE_MARKER);
        }
        result.push_str(&(self.row + 1).to_string());

        result
    }

    /// Create a range from this address to another
    pub fn to(&self, other: CellAddress) -> CellRange {
        CellRange::new(*self, other)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Quote a sheet name for use in a qualified reference.
///
/// Plain identifiers (`Sheet1`, `Data_2024`) are returned unchanged. Anything
/// else is wrapped in single quotes with embedded quotes doubled, so
/// `Bob's Data` becomes `'Bob''s Data'`.
pub fn quote_sheet_name(name: &str) -> Cow<'_, str> {
    let plain = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.');
    if plain {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("'{}'", name.replace('\'', "''")))
    }
}

/// Inverse of [`quote_sheet_name`].
pub fn unquote_sheet_name(quoted: &str) -> Result<String> {
    if quoted.is_empty() {
        return Err(Error::InvalidSheetName("empty sheet name".into()));
    }
    match quoted
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        Some(inner) if !inner.is_empty() => Ok(inner.replace("''", "'")),
        Some(_) => Err(Error::InvalidSheetName(quoted.to_string())),
        None if quoted.contains('\'') => Err(Error::InvalidSheetName(quoted.to_string())),
        None => Ok(quoted.to_string()),
    }
}

/// A cell address optionally qualified by a sheet name (`'My Sheet'!$A$1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetCellRef {
    /// Sheet name, unquoted
    pub sheet: Option<String>,
    /// Cell part of the reference
    pub address: CellAddress,
}

impl SheetCellRef {
    /// Reference to a cell on a named sheet
    pub fn new<S: Into<String>>(sheet: S, address: CellAddress) -> Self {
        Self {
            sheet: Some(sheet.into()),
            address,
        }
    }

    /// Parse `Sheet!A1`, `'Sheet name'!A1` or a bare `A1`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.rfind(SHEET_QUALIFIER) {
            Some(pos) => Ok(Self {
                sheet: Some(unquote_sheet_name(&s[..pos])?),
                address: CellAddress::parse(&s[pos + 1..])?,
            }),
            None => Ok(Self {
                sheet: None,
                address: CellAddress::parse(s)?,
            }),
        }
    }

    /// Format with the sheet qualifier, quoting the sheet name when needed
    pub fn to_a1_string(&self) -> String {
        match &self.sheet {
            Some(sheet) => format!(
                "{}{}{}",
                quote_sheet_name(sheet),
                SHEET_QUALIFIER,
                self.address.to_a1_string()
            ),
            None => self.address.to_a1_string(),
        }
    }
}

impl fmt::Display for SheetCellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for SheetCellRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A range of cells (e.g., "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        // Normalize so start is top-left and end is bottom-right
        let (start_row, end_row) = if start.row <= end.row {
            (start.row, end.row)
        } else {
            (end.row, start.row)
        };

        let (start_col, end_col) = if start.col <= end.col {
            (start.col, end.col)
        } else {
            (end.col, start.col)
        };

        Self {
            start: CellAddress::with_absolute(
                start_row,
                start_col,
                start.row_absolute,
                start.col_absolute,
            ),
            end: CellAddress::with_absolute(end_row, end_col, end.row_absolute, end.col_absolute),
        }
    }

    /// Create a range from row/column indices
    pub fn from_indices(start_row: u32, start_col: u16, end_row: u32, end_col: u16) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// Create a single-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse a range from A1:B10 notation
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let cells = match s.rfind(SHEET_QUALIFIER) {
            Some(pos) => &s[pos + 1..],
            None => s,
        };

        if let Some(colon_pos) = cells.find(':') {
            let start = CellAddress::parse(&cells[..colon_pos])?;
            let end = CellAddress::parse(&cells[colon_pos + 1..])?;
            Ok(Self::new(start, end))
        } else {
            let addr = CellAddress::parse(cells)
                .map_err(|_| Error::InvalidRange(s.to_string()))?;
            Ok(Self::single(addr))
        }
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u16 {
        self.end.col - self.start.col + 1
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }

    /// Format qualified by a sheet name (`'My Sheet'!A1:B2`)
    pub fn to_qualified_string(&self, sheet: &str) -> String {
        format!(
            "{}{}{}",
            quote_sheet_name(sheet),
            SHEET_QUALIFIER,
            self.to_a1_string()
        )
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
