//! FONT record (0x0031).

use std::hash::{Hash, Hasher};

use oldbook_core::style::{FontVerticalAlign, Palette, Underline};
use oldbook_core::FontStyle;

use crate::biff::parser::{read_u16, read_u8};
use crate::biff::strings::{read_short_string_flagged, write_short_string};
use crate::error::{XlsError, XlsResult};

const ITALIC: u16 = 0x0002;
const STRIKEOUT: u16 = 0x0008;

/// Weight of a regular font
pub const WEIGHT_NORMAL: u16 = 400;
/// Weight of a bold font
pub const WEIGHT_BOLD: u16 = 700;

/// A decoded FONT record.
///
/// Layout:
///   0  u16  dyHeight   font height in twips (1/20 pt)
///   2  u16  grbit      flags (bit 1 = italic, bit 3 = strikeout)
///   4  u16  icv        colour index
///   6  u16  bls        weight (400 = normal, 700 = bold)
///   8  u16  sss        super/subscript (0/1/2)
///  10  u8   uls        underline type
///  11  u8   bFamily    font family
///  12  u8   bCharSet   character set
///  13  u8   reserved
///  14  ...  font name  short string (1-byte length prefix)
///
/// Two fonts are equal when they render the same: the raw flag bits other
/// than italic and strikeout, the reserved byte and the stored string width
/// do not take part.
#[derive(Debug, Clone)]
pub struct FontRecord {
    pub height: u16,
    pub flags: u16,
    pub color: u16,
    pub weight: u16,
    pub script: u16,
    pub underline: u8,
    pub family: u8,
    pub charset: u8,
    pub reserved: u8,
    pub name: String,
    /// Name was stored as UTF-16 rather than compressed
    pub name_wide: bool,
}

impl Default for FontRecord {
    fn default() -> Self {
        Self {
            height: 200,
            flags: 0,
            color: oldbook_core::style::ICV_AUTO,
            weight: WEIGHT_NORMAL,
            script: 0,
            underline: 0,
            family: 0,
            charset: 0,
            reserved: 0,
            name: "Arial".to_string(),
            name_wide: false,
        }
    }
}

impl FontRecord {
    pub fn parse(data: &[u8], encoding: &str) -> XlsResult<Self> {
        if data.len() < 15 {
            return Err(XlsError::Parse("FONT record too short".into()));
        }

        let mut off = 0;
        let height = read_u16(data, &mut off)?;
        let flags = read_u16(data, &mut off)?;
        let color = read_u16(data, &mut off)?;
        let weight = read_u16(data, &mut off)?;
        let script = read_u16(data, &mut off)?;
        let underline = read_u8(data, &mut off)?;
        let family = read_u8(data, &mut off)?;
        let charset = read_u8(data, &mut off)?;
        let reserved = read_u8(data, &mut off)?;

        let (name, name_wide) = match read_short_string_flagged(data, &mut off, encoding) {
            Ok(name) => name,
            Err(e) => {
                log::warn!("FONT name unreadable, using an empty name: {e}");
                (String::new(), false)
            }
        };

        Ok(Self {
            height,
            flags,
            color,
            weight,
            script,
            underline,
            family,
            charset,
            reserved,
            name,
            name_wide,
        })
    }

    pub fn encode(&self, encoding: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(16 + self.name.len() * 2);
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.color.to_le_bytes());
        out.extend_from_slice(&self.weight.to_le_bytes());
        out.extend_from_slice(&self.script.to_le_bytes());
        out.extend_from_slice(&[self.underline, self.family, self.charset, self.reserved]);
        write_short_string(&mut out, &self.name, self.name_wide, encoding);
        out
    }

    pub fn italic(&self) -> bool {
        self.flags & ITALIC != 0
    }

    pub fn strikeout(&self) -> bool {
        self.flags & STRIKEOUT != 0
    }

    pub fn bold(&self) -> bool {
        self.weight >= WEIGHT_BOLD
    }

    /// Resolve into a core font
    pub fn to_style(&self, palette: &Palette) -> FontStyle {
        FontStyle {
            name: self.name.clone(),
            size: self.height as f64 / 20.0,
            bold: self.bold(),
            italic: self.italic(),
            underline: Underline::from_biff(self.underline),
            strikethrough: self.strikeout(),
            color: palette.resolve(self.color),
            vertical_align: FontVerticalAlign::from_biff(self.script),
        }
    }

    fn key(&self) -> (&str, u16, u16, bool, u8, u16, bool, u16, u8, u8) {
        (
            &self.name,
            self.height,
            self.weight,
            self.italic(),
            self.underline,
            self.color,
            self.strikeout(),
            self.script,
            self.family,
            self.charset,
        )
    }
}

impl PartialEq for FontRecord {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for FontRecord {}

impl Hash for FontRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}
