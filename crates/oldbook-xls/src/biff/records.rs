//! BIFF8 record type constants and the record kind catalog.
//!
//! Reference: [MS-XLS] §2.3 — Record Enumeration

use std::fmt;

// ── Stream structure ────────────────────────────────────────────────────
pub const BOF: u16 = 0x0809;
pub const EOF: u16 = 0x000A;
pub const CONTINUE: u16 = 0x003C;

// ── Workbook globals ────────────────────────────────────────────────────
pub const BOUNDSHEET: u16 = 0x0085; // Sheet name, type, visibility, stream offset
pub const SST: u16 = 0x00FC; // Shared String Table
pub const EXTSST: u16 = 0x00FF; // Stream positions of every 8th SST string
pub const DATEMODE: u16 = 0x0022; // 1900 vs 1904 date system (a.k.a. DATE1904)
pub const CODEPAGE: u16 = 0x0042; // Code page of compressed strings
pub const PALETTE: u16 = 0x0092; // Custom color palette (overrides default 56)
pub const FONT: u16 = 0x0031; // Font definition
pub const FORMAT: u16 = 0x041E; // Number format string
pub const XF: u16 = 0x00E0; // Extended Format (cell format record)
pub const STYLE: u16 = 0x0293; // Named cell style
pub const WINDOW1: u16 = 0x003D; // Workbook window
pub const EXTERNSHEET: u16 = 0x0017; // Sheet references used by formulas
pub const NAME: u16 = 0x0018; // Defined name
pub const SUPBOOK: u16 = 0x01AE; // Supporting workbook
pub const COUNTRY: u16 = 0x008C; // Locale
pub const WRITEACCESS: u16 = 0x005C; // Name of the last writer
pub const MSODRAWINGGROUP: u16 = 0x00EB; // Shared drawing data

// ── Cell records ────────────────────────────────────────────────────────
pub const DIMENSION: u16 = 0x0200; // Used range (first/last row/col)
pub const LABELSST: u16 = 0x00FD; // Cell containing SST string index
pub const LABEL: u16 = 0x0204; // Cell with inline string (rare in BIFF8)
pub const NUMBER: u16 = 0x0203; // Cell with IEEE 754 double
pub const RK: u16 = 0x027E; // Cell with compressed number (RK encoding)
pub const MULRK: u16 = 0x00BD; // Multiple RK values in one row
pub const BLANK: u16 = 0x0201; // Empty cell with formatting
pub const MULBLANK: u16 = 0x00BE; // Multiple blanks with formatting
pub const BOOLERR: u16 = 0x0205; // Boolean or error cell
pub const FORMULA: u16 = 0x0006; // Formula cell with cached result
pub const STRING: u16 = 0x0207; // Cached string result for preceding FORMULA
pub const RSTRING: u16 = 0x00D6; // Rich-text inline string (rare)
pub const ARRAY: u16 = 0x0221; // Array formula
pub const SHRFMLA: u16 = 0x04BC; // Shared formula

// ── Sheet structure ─────────────────────────────────────────────────────
pub const INDEX: u16 = 0x020B; // Row block positions
pub const DBCELL: u16 = 0x00D7; // Row block cell offsets
pub const ROW: u16 = 0x0208; // Row height, visibility, default format
pub const COLINFO: u16 = 0x007D; // Column width, visibility, default format
pub const DEFCOLWIDTH: u16 = 0x0055; // Default column width
pub const DEFAULTROWHEIGHT: u16 = 0x0225; // Default row height
pub const MERGECELLS: u16 = 0x00E5; // Merged cell ranges
pub const WINDOW2: u16 = 0x023E; // Sheet view settings (freeze panes, etc.)
pub const PANE: u16 = 0x0041; // Pane split position
pub const SELECTION: u16 = 0x001D; // Selected cell range
pub const HLINK: u16 = 0x01B8; // Hyperlink
pub const CFHEADER: u16 = 0x01B0; // Conditional format ranges
pub const CF: u16 = 0x01B1; // One conditional format rule
pub const DVAL: u16 = 0x01B2; // Data validation header
pub const DV: u16 = 0x01BE; // One data validation rule
pub const MSODRAWING: u16 = 0x00EC; // Drawing object data
pub const OBJ: u16 = 0x005D; // Drawing object
pub const TXO: u16 = 0x01B6; // Text box object
pub const NOTE: u16 = 0x001C; // Cell comment

// ── Chart substreams ────────────────────────────────────────────────────
pub const FONTX: u16 = 0x1026; // Font of a chart text element
pub const FBI: u16 = 0x1060; // Chart font scaling basis

// ── BOF subtypes (the `dt` field) ───────────────────────────────────────
pub const BOF_WORKBOOK_GLOBALS: u16 = 0x0005;
pub const BOF_WORKSHEET: u16 = 0x0010;
pub const BOF_CHART: u16 = 0x0020;
pub const BOF_MACRO: u16 = 0x0040;

/// BIFF version we support.
pub const BIFF8_VERSION: u16 = 0x0600;

macro_rules! record_kinds {
    ($($kind:ident => $code:ident,)*) => {
        /// Symbolic kind of a record, from its type code.
        ///
        /// Codes missing from the catalog are [`RecordKind::Unknown`] and are
        /// carried through a read/write cycle untouched. Two kinds are equal when
        /// their codes are.
        #[derive(Debug, Clone, Copy)]
        pub enum RecordKind {
            $($kind,)*
            Unknown(u16),
        }

        impl RecordKind {
            /// Kind for a type code
            pub fn from_code(code: u16) -> Self {
                match code {
                    $($code => RecordKind::$kind,)*
                    other => RecordKind::Unknown(other),
                }
            }

            /// Type code stamped on the wire
            pub fn code(self) -> u16 {
                match self {
                    $(RecordKind::$kind => $code,)*
                    RecordKind::Unknown(code) => code,
                }
            }

            /// Record name as used in the file format documentation
            pub fn name(self) -> &'static str {
                match self {
                    $(RecordKind::$kind => stringify!($code),)*
                    RecordKind::Unknown(_) => "UNKNOWN",
                }
            }
        }
    };
}

record_kinds! {
    Bof => BOF,
    Eof => EOF,
    Continue => CONTINUE,
    BoundSheet => BOUNDSHEET,
    Sst => SST,
    ExtSst => EXTSST,
    DateMode => DATEMODE,
    CodePage => CODEPAGE,
    Palette => PALETTE,
    Font => FONT,
    Format => FORMAT,
    Xf => XF,
    Style => STYLE,
    Window1 => WINDOW1,
    ExternSheet => EXTERNSHEET,
    Name => NAME,
    SupBook => SUPBOOK,
    Country => COUNTRY,
    WriteAccess => WRITEACCESS,
    MsoDrawingGroup => MSODRAWINGGROUP,
    Dimension => DIMENSION,
    LabelSst => LABELSST,
    Label => LABEL,
    Number => NUMBER,
    Rk => RK,
    MulRk => MULRK,
    Blank => BLANK,
    MulBlank => MULBLANK,
    BoolErr => BOOLERR,
    Formula => FORMULA,
    String => STRING,
    RString => RSTRING,
    Array => ARRAY,
    ShrFmla => SHRFMLA,
    Index => INDEX,
    DbCell => DBCELL,
    Row => ROW,
    ColInfo => COLINFO,
    DefColWidth => DEFCOLWIDTH,
    DefaultRowHeight => DEFAULTROWHEIGHT,
    MergeCells => MERGECELLS,
    Window2 => WINDOW2,
    Pane => PANE,
    Selection => SELECTION,
    HLink => HLINK,
    CfHeader => CFHEADER,
    Cf => CF,
    DVal => DVAL,
    Dv => DV,
    MsoDrawing => MSODRAWING,
    Obj => OBJ,
    Txo => TXO,
    Note => NOTE,
    FontX => FONTX,
    Fbi => FBI,
}

impl RecordKind {
    /// Whether this is a cell record carrying an XF index at offset 4
    pub fn is_cell(self) -> bool {
        matches!(
            self,
            RecordKind::Number
                | RecordKind::Label
                | RecordKind::LabelSst
                | RecordKind::Rk
                | RecordKind::Blank
                | RecordKind::BoolErr
                | RecordKind::Formula
                | RecordKind::RString
                | RecordKind::MulRk
                | RecordKind::MulBlank
        )
    }
}

impl PartialEq for RecordKind {
    fn eq(&self, other: &Self) -> bool {
        self.code() == other.code()
    }
}

impl Eq for RecordKind {}

impl std::hash::Hash for RecordKind {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.code().hash(state);
    }
}

impl From<u16> for RecordKind {
    fn from(code: u16) -> Self {
        RecordKind::from_code(code)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:04X})", self.name(), self.code())
    }
}
