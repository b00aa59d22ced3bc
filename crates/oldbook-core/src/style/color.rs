//! Colors and the indexed color palette

use std::fmt;

/// Color representation
///
/// Legacy workbooks reference colors through a palette index (`icv`). A
/// [`Palette`] turns an index into RGB; indices that mean "automatic" resolve to
/// [`Color::Auto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    /// Automatic/default color
    #[default]
    Auto,

    /// RGB color (no alpha)
    Rgb { r: u8, g: u8, b: u8 },

    /// Palette index that the palette could not resolve
    Indexed(u16),
}

impl Color {
    /// Create an RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Convert to hex string (without # prefix)
    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("{:02X}{:02X}{:02X}", r, g, b)
    }

    /// Convert to RGB tuple
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match self {
            Color::Auto => (0, 0, 0),
            Color::Rgb { r, g, b } => (*r, *g, *b),
            Color::Indexed(i) => Palette::default().rgb(*i).unwrap_or((0, 0, 0)),
        }
    }

    /// Check if color is automatic/default
    pub fn is_auto(&self) -> bool {
        matches!(self, Color::Auto)
    }

    // Common colors
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Auto => write!(f, "auto"),
            Color::Rgb { r, g, b } => write!(f, "#{:02X}{:02X}{:02X}", r, g, b),
            Color::Indexed(i) => write!(f, "indexed({})", i),
        }
    }
}

/// Palette index for the system window text color.
pub const ICV_WINDOW_TEXT: u16 = 0x0040;
/// Palette index for the system window background color.
pub const ICV_WINDOW_BACKGROUND: u16 = 0x0041;
/// Palette index meaning "automatic".
pub const ICV_AUTO: u16 = 0x7FFF;

/// The standard palette. Indices 8–63 map to entries 0–55.
pub const DEFAULT_PALETTE: [(u8, u8, u8); 56] = [
    (0, 0, 0),       //  8: Black
    (255, 255, 255), //  9: White
    (255, 0, 0),     // 10: Red
    (0, 255, 0),     // 11: Bright Green
    (0, 0, 255),     // 12: Blue
    (255, 255, 0),   // 13: Yellow
    (255, 0, 255),   // 14: Pink
    (0, 255, 255),   // 15: Turquoise
    (128, 0, 0),     // 16: Dark Red
    (0, 128, 0),     // 17: Green
    (0, 0, 128),     // 18: Dark Blue
    (128, 128, 0),   // 19: Dark Yellow
    (128, 0, 128),   // 20: Violet
    (0, 128, 128),   // 21: Teal
    (192, 192, 192), // 22: Silver (25% Gray)
    (128, 128, 128), // 23: Gray (50% Gray)
    (153, 153, 255), // 24: Periwinkle
    (153, 51, 102),  // 25: Plum
    (255, 255, 204), // 26: Ivory
    (204, 255, 255), // 27: Light Turquoise
    (102, 0, 102),   // 28: Dark Purple
    (255, 128, 128), // 29: Coral
    (0, 102, 204),   // 30: Ocean Blue
    (204, 204, 255), // 31: Ice Blue
    (0, 0, 128),     // 32: Dark Blue (dup)
    (255, 0, 255),   // 33: Pink (dup)
    (255, 255, 0),   // 34: Yellow (dup)
    (0, 255, 255),   // 35: Turquoise (dup)
    (128, 0, 128),   // 36: Violet (dup)
    (128, 0, 0),     // 37: Dark Red (dup)
    (0, 128, 128),   // 38: Teal (dup)
    (0, 0, 255),     // 39: Blue (dup)
    (0, 204, 255),   // 40: Sky Blue
    (204, 255, 255), // 41: Light Turquoise (dup)
    (204, 255, 204), // 42: Light Green
    (255, 255, 153), // 43: Light Yellow
    (153, 204, 255), // 44: Pale Blue
    (255, 153, 204), // 45: Rose
    (204, 153, 255), // 46: Lavender
    (255, 204, 153), // 47: Tan
    (51, 102, 255),  // 48: Light Blue
    (51, 204, 204),  // 49: Aqua
    (153, 204, 0),   // 50: Lime
    (255, 204, 0),   // 51: Gold
    (255, 153, 0),   // 52: Light Orange
    (255, 102, 0),   // 53: Orange
    (102, 102, 153), // 54: Blue-Gray
    (150, 150, 150), // 55: 40% Gray
    (0, 51, 102),    // 56: Dark Teal
    (51, 153, 102),  // 57: Sea Green
    (0, 51, 0),      // 58: Dark Green
    (51, 51, 0),     // 59: Olive Green
    (153, 51, 0),    // 60: Brown
    (153, 51, 51),   // 61: Dark Rose
    (51, 51, 153),   // 62: Indigo
    (51, 51, 51),    // 63: 80% Gray
];

/// EGA colors at indices 0–7 (rarely referenced directly, same values as 8–15).
const EGA: [(u8, u8, u8); 8] = [
    (0, 0, 0),
    (255, 255, 255),
    (255, 0, 0),
    (0, 255, 0),
    (0, 0, 255),
    (255, 255, 0),
    (255, 0, 255),
    (0, 255, 255),
];

/// A workbook color palette, optionally overridden by a PALETTE record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: [(u8, u8, u8); 56],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            entries: DEFAULT_PALETTE,
        }
    }
}

impl Palette {
    /// Replace entry `slot` (0-based, i.e. palette index `slot + 8`)
    pub fn set(&mut self, slot: usize, rgb: (u8, u8, u8)) {
        if let Some(entry) = self.entries.get_mut(slot) {
            *entry = rgb;
        }
    }

    /// Whether any entry differs from the default palette
    pub fn is_customized(&self) -> bool {
        self.entries != DEFAULT_PALETTE
    }

    /// RGB for a palette index, `None` for indices with no fixed color
    pub fn rgb(&self, icv: u16) -> Option<(u8, u8, u8)> {
        match icv {
            0..=7 => Some(EGA[icv as usize]),
            8..=63 => Some(self.entries[(icv - 8) as usize]),
            ICV_WINDOW_TEXT => Some((0, 0, 0)),
            ICV_WINDOW_BACKGROUND => Some((255, 255, 255)),
            _ => None,
        }
    }

    /// Resolve a palette index into a [`Color`]
    pub fn resolve(&self, icv: u16) -> Color {
        match icv {
            ICV_AUTO => Color::Auto,
            _ => match self.rgb(icv) {
                Some((r, g, b)) => Color::Rgb { r, g, b },
                None => Color::Auto,
            },
        }
    }
}
