//! STYLE records (0x0293): named cell styles pointing at a style XF.
//!
//! Layout:
//!   0  u16  ixfe     bits 0-11 XF index, bit 15 built-in
//!   2  ...  built-in: u8 style id, u8 outline level
//!           user:     unicode string name

use crate::biff::parser::{get_u16, put_u16, read_u16, read_u8};
use crate::biff::strings::{read_unicode_string_flagged, write_unicode_string};
use crate::error::{XlsError, XlsResult};

const XF_MASK: u16 = 0x0FFF;
const BUILT_IN: u16 = 0x8000;

/// Outline level stored by built-in styles that are not row/column levels
pub const NO_LEVEL: u8 = 0xFF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleName {
    BuiltIn { id: u8, level: u8 },
    User { name: String, wide: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRecord {
    pub xf_index: u16,
    /// Bits 12-14 of the first field, carried through unchanged
    pub reserved: u16,
    pub name: StyleName,
}

impl StyleRecord {
    pub fn built_in(xf_index: u16, id: u8) -> Self {
        Self {
            xf_index,
            reserved: 0,
            name: StyleName::BuiltIn {
                id,
                level: NO_LEVEL,
            },
        }
    }

    pub fn parse(data: &[u8], encoding: &str) -> XlsResult<Self> {
        let mut off = 0;
        let ixfe = read_u16(data, &mut off)?;
        let name = if ixfe & BUILT_IN != 0 {
            let id = read_u8(data, &mut off)?;
            let level = read_u8(data, &mut off)?;
            StyleName::BuiltIn { id, level }
        } else {
            let (name, wide) = read_unicode_string_flagged(data, &mut off, encoding)?;
            StyleName::User { name, wide }
        };
        Ok(Self {
            xf_index: ixfe & XF_MASK,
            reserved: ixfe & 0x7000,
            name,
        })
    }

    pub fn encode(&self, encoding: &str) -> Vec<u8> {
        let mut ixfe = (self.xf_index & XF_MASK) | (self.reserved & 0x7000);
        let mut out = Vec::with_capacity(4);
        match &self.name {
            StyleName::BuiltIn { id, level } => {
                ixfe |= BUILT_IN;
                out.extend_from_slice(&ixfe.to_le_bytes());
                out.extend_from_slice(&[*id, *level]);
            }
            StyleName::User { name, wide } => {
                out.extend_from_slice(&ixfe.to_le_bytes());
                write_unicode_string(&mut out, name, *wide, encoding);
            }
        }
        out
    }

    pub fn is_built_in(&self) -> bool {
        matches!(self.name, StyleName::BuiltIn { .. })
    }

    /// Display name: the user name, or the name of the built-in style
    pub fn display_name(&self) -> String {
        match &self.name {
            StyleName::User { name, .. } => name.clone(),
            StyleName::BuiltIn { id, level } => match builtin_name(*id) {
                Some(base) if *id == 1 || *id == 2 => format!("{}{}", base, u16::from(*level) + 1),
                Some(base) => base.to_string(),
                None => format!("BuiltIn{}", id),
            },
        }
    }
}

/// Name of a built-in style id.
pub fn builtin_name(id: u8) -> Option<&'static str> {
    const NAMES: [&str; 10] = [
        "Normal",
        "RowLevel_",
        "ColLevel_",
        "Comma",
        "Currency",
        "Percent",
        "Comma [0]",
        "Currency [0]",
        "Hyperlink",
        "Followed Hyperlink",
    ];
    NAMES.get(id as usize).copied()
}

/// XF index stored in a STYLE payload.
pub fn xf_index_of(data: &[u8]) -> XlsResult<u16> {
    if data.len() < 2 {
        return Err(XlsError::Parse("STYLE record too short".into()));
    }
    Ok(get_u16(data, 0) & XF_MASK)
}

/// Replace the XF index in a STYLE payload, keeping the flag bits.
pub fn set_xf_index(data: &mut [u8], xf_index: u16) -> XlsResult<()> {
    if data.len() < 2 {
        return Err(XlsError::Parse("STYLE record too short".into()));
    }
    let ixfe = (get_u16(data, 0) & !XF_MASK) | (xf_index & XF_MASK);
    put_u16(ixfe, data, 0);
    Ok(())
}

/// The built-in STYLE records of a new workbook, matching the XFs of
/// [`super::table::FormattingTable::with_defaults`].
pub fn builtin_defaults() -> Vec<StyleRecord> {
    vec![
        StyleRecord::built_in(0x10, 3),
        StyleRecord::built_in(0x11, 6),
        StyleRecord::built_in(0x12, 4),
        StyleRecord::built_in(0x13, 7),
        StyleRecord::built_in(0x00, 0),
        StyleRecord::built_in(0x14, 5),
    ]
}
