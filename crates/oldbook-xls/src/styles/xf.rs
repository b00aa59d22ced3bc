//! Extended format (XF, 0x00E0) records.
//!
//! Layout (see [MS-XLS] §2.4.353):
//!   0   u16  ifnt          font index
//!   2   u16  ifmt          format index
//!   4   u16  type/protect  bit 0 locked, bit 1 hidden, bit 2 style XF,
//!                          bit 3 123-prefix, bits 4-15 parent XF
//!   6   u8   alignment1    bits 0-2 halign, bit 3 wrap, bits 4-6 valign,
//!                          bit 7 justify-last
//!   7   u8   trot          text rotation
//!   8   u8   alignment2    bits 0-3 indent, bit 4 shrink, bit 5 reserved,
//!                          bits 6-7 reading order
//!   9   u8   used_attribs  which attribute groups differ from the parent
//!  10   u32  border lines, left/right colours, diagonal flags
//!  14   u32  top/bottom/diagonal colours, diagonal line, ext flag, pattern
//!  18   u16  fill colours, sx button, reserved

use crate::biff::parser::{get_u16, get_u32};

/// Length of an XF record payload.
pub const XF_RECORD_LEN: usize = 20;

/// Parent index stored by style XFs, which have no parent.
pub const PARENT_NONE: u16 = 0x0FFF;

/// Whether an XF formats cells or defines a named style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XfKind {
    Cell,
    Style,
}

/// A decoded XF record. Every bit of the payload is kept, reserved ones
/// included, so encoding reproduces the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XfRecord {
    pub font_index: u16,
    pub format_index: u16,
    pub locked: bool,
    pub hidden: bool,
    pub kind: XfKind,
    pub prefix: bool,
    pub parent: u16,

    // Alignment
    pub horizontal: u8,
    pub wrap: bool,
    pub vertical: u8,
    pub justify_last: bool,
    pub rotation: u8,
    pub indent: u8,
    pub shrink: bool,
    pub reserved_align: bool,
    pub reading_order: u8,
    pub used_attributes: u8,

    // Borders: line style codes (0-13) and colour indices
    pub border_left: u8,
    pub border_right: u8,
    pub border_top: u8,
    pub border_bottom: u8,
    pub border_diag: u8,
    pub icv_left: u16,
    pub icv_right: u16,
    pub icv_top: u16,
    pub icv_bottom: u16,
    pub icv_diag: u16,
    pub diagonal: u8,
    pub has_ext: bool,

    // Fill
    pub pattern: u8,
    pub icv_fore: u16,
    pub icv_back: u16,
    pub sx_button: bool,
    pub reserved_fill: bool,
}

impl XfRecord {
    /// Decode an XF payload. A short payload is zero-padded.
    pub fn parse(data: &[u8]) -> Self {
        let mut buf = [0u8; XF_RECORD_LEN];
        if data.len() < XF_RECORD_LEN {
            log::warn!(
                "XF record too short: {} bytes (expected {}), padding with zeros",
                data.len(),
                XF_RECORD_LEN
            );
        }
        let n = data.len().min(XF_RECORD_LEN);
        buf[..n].copy_from_slice(&data[..n]);

        let type_prot = get_u16(&buf, 4);
        let align1 = buf[6];
        let align2 = buf[8];
        let border1 = get_u32(&buf, 10);
        let border2 = get_u32(&buf, 14);
        let fill = get_u16(&buf, 18);

        let mut xf = Self {
            font_index: get_u16(&buf, 0),
            format_index: get_u16(&buf, 2),
            locked: type_prot & 0x0001 != 0,
            hidden: type_prot & 0x0002 != 0,
            kind: if type_prot & 0x0004 != 0 {
                XfKind::Style
            } else {
                XfKind::Cell
            },
            prefix: type_prot & 0x0008 != 0,
            parent: type_prot >> 4,

            horizontal: align1 & 0x07,
            wrap: align1 & 0x08 != 0,
            vertical: (align1 >> 4) & 0x07,
            justify_last: align1 & 0x80 != 0,
            rotation: buf[7],
            indent: align2 & 0x0F,
            shrink: align2 & 0x10 != 0,
            reserved_align: align2 & 0x20 != 0,
            reading_order: (align2 >> 6) & 0x03,
            used_attributes: buf[9],

            border_left: (border1 & 0x0F) as u8,
            border_right: ((border1 >> 4) & 0x0F) as u8,
            border_top: ((border1 >> 8) & 0x0F) as u8,
            border_bottom: ((border1 >> 12) & 0x0F) as u8,
            icv_left: ((border1 >> 16) & 0x7F) as u16,
            icv_right: ((border1 >> 23) & 0x7F) as u16,
            diagonal: ((border1 >> 30) & 0x03) as u8,
            icv_top: (border2 & 0x7F) as u16,
            icv_bottom: ((border2 >> 7) & 0x7F) as u16,
            icv_diag: ((border2 >> 14) & 0x7F) as u16,
            border_diag: ((border2 >> 21) & 0x0F) as u8,
            has_ext: border2 & (1 << 25) != 0,
            pattern: ((border2 >> 26) & 0x3F) as u8,

            icv_fore: fill & 0x7F,
            icv_back: (fill >> 7) & 0x7F,
            sx_button: fill & 0x4000 != 0,
            reserved_fill: fill & 0x8000 != 0,
        };
        xf.validate_parent();
        xf
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut type_prot = (self.parent & PARENT_NONE) << 4;
        type_prot |= self.locked as u16;
        type_prot |= (self.hidden as u16) << 1;
        type_prot |= ((self.kind == XfKind::Style) as u16) << 2;
        type_prot |= (self.prefix as u16) << 3;

        let align1 = (self.horizontal & 0x07)
            | (self.wrap as u8) << 3
            | (self.vertical & 0x07) << 4
            | (self.justify_last as u8) << 7;
        let align2 = (self.indent & 0x0F)
            | (self.shrink as u8) << 4
            | (self.reserved_align as u8) << 5
            | (self.reading_order & 0x03) << 6;

        let border1 = (self.border_left as u32 & 0x0F)
            | (self.border_right as u32 & 0x0F) << 4
            | (self.border_top as u32 & 0x0F) << 8
            | (self.border_bottom as u32 & 0x0F) << 12
            | (self.icv_left as u32 & 0x7F) << 16
            | (self.icv_right as u32 & 0x7F) << 23
            | (self.diagonal as u32 & 0x03) << 30;
        let border2 = (self.icv_top as u32 & 0x7F)
            | (self.icv_bottom as u32 & 0x7F) << 7
            | (self.icv_diag as u32 & 0x7F) << 14
            | (self.border_diag as u32 & 0x0F) << 21
            | (self.has_ext as u32) << 25
            | (self.pattern as u32 & 0x3F) << 26;
        let fill = (self.icv_fore & 0x7F)
            | (self.icv_back & 0x7F) << 7
            | (self.sx_button as u16) << 14
            | (self.reserved_fill as u16) << 15;

        let mut out = Vec::with_capacity(XF_RECORD_LEN);
        out.extend_from_slice(&self.font_index.to_le_bytes());
        out.extend_from_slice(&self.format_index.to_le_bytes());
        out.extend_from_slice(&type_prot.to_le_bytes());
        out.extend_from_slice(&[align1, self.rotation, align2, self.used_attributes]);
        out.extend_from_slice(&border1.to_le_bytes());
        out.extend_from_slice(&border2.to_le_bytes());
        out.extend_from_slice(&fill.to_le_bytes());
        out
    }

    pub fn is_style(&self) -> bool {
        self.kind == XfKind::Style
    }

    /// Correct a cell XF that claims to have no parent. Returns whether the
    /// parent was changed.
    pub fn validate_parent(&mut self) -> bool {
        if self.kind == XfKind::Cell && self.parent == PARENT_NONE {
            log::warn!("cell XF has no parent style, using style XF 0");
            self.parent = 0;
            return true;
        }
        false
    }

    /// A style XF as found at the head of every workbook's XF table
    pub fn style_default(font_index: u16) -> Self {
        Self {
            kind: XfKind::Style,
            parent: PARENT_NONE,
            font_index,
            ..Self::cell_default()
        }
    }

    /// The default cell XF, child of the Normal style
    pub fn cell_default() -> Self {
        Self {
            font_index: 0,
            format_index: 0,
            locked: true,
            hidden: false,
            kind: XfKind::Cell,
            prefix: false,
            parent: 0,
            horizontal: 0,
            wrap: false,
            vertical: 2,
            justify_last: false,
            rotation: 0,
            indent: 0,
            shrink: false,
            reserved_align: false,
            reading_order: 0,
            used_attributes: 0,
            border_left: 0,
            border_right: 0,
            border_top: 0,
            border_bottom: 0,
            border_diag: 0,
            icv_left: 0,
            icv_right: 0,
            icv_top: 0,
            icv_bottom: 0,
            icv_diag: 0,
            diagonal: 0,
            has_ext: false,
            pattern: 0,
            icv_fore: oldbook_core::style::ICV_WINDOW_TEXT,
            icv_back: oldbook_core::style::ICV_WINDOW_BACKGROUND,
            sx_button: false,
            reserved_fill: false,
        }
    }
}
