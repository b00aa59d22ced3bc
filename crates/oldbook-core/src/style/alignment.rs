//! Text alignment types

/// Text alignment settings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alignment {
    /// Horizontal alignment
    pub horizontal: HorizontalAlignment,
    /// Vertical alignment
    pub vertical: VerticalAlignment,
    /// Wrap text
    pub wrap_text: bool,
    /// Shrink to fit
    pub shrink_to_fit: bool,
    /// Indent level (0-15)
    pub indent: u8,
    /// Text rotation in degrees (-90 to 90, or 255 for stacked text)
    pub rotation: i16,
    /// Reading order
    pub reading_order: ReadingOrder,
}

impl Alignment {
    /// Rotation value for vertically stacked text
    pub const STACKED: i16 = 255;

    /// Create a new default alignment
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert the stored rotation byte into degrees.
    ///
    /// 0–90 rotate counter-clockwise, 91–180 clockwise (stored as 90 + degrees),
    /// 255 is stacked text.
    pub fn rotation_from_biff(trot: u8) -> i16 {
        match trot {
            0..=90 => trot as i16,
            91..=180 => -((trot as i16) - 90),
            _ => Self::STACKED,
        }
    }

    /// Inverse of [`Alignment::rotation_from_biff`]
    pub fn rotation_to_biff(degrees: i16) -> u8 {
        match degrees {
            0..=90 => degrees as u8,
            -90..=-1 => (90 - degrees) as u8,
            _ => 255,
        }
    }
}

/// Horizontal alignment options, in stored code order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HorizontalAlignment {
    /// General alignment (text left, numbers right)
    #[default]
    General,
    /// Left aligned
    Left,
    /// Center aligned
    Center,
    /// Right aligned
    Right,
    /// Fill (repeat content to fill cell width)
    Fill,
    /// Justify (stretch to fit width)
    Justify,
    /// Center across selection
    CenterContinuous,
    /// Distributed (like justify, but for East Asian text)
    Distributed,
}

impl HorizontalAlignment {
    const CODES: [HorizontalAlignment; 8] = [
        Self::General,
        Self::Left,
        Self::Center,
        Self::Right,
        Self::Fill,
        Self::Justify,
        Self::CenterContinuous,
        Self::Distributed,
    ];

    /// Decode the 3-bit `alc` field
    pub fn from_biff(code: u8) -> Self {
        Self::CODES
            .get(code as usize)
            .copied()
            .unwrap_or_default()
    }

    /// Stored code
    pub fn to_biff(self) -> u8 {
        self as u8
    }
}

/// Vertical alignment options, in stored code order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VerticalAlignment {
    /// Top aligned
    Top,
    /// Center aligned
    Center,
    /// Bottom aligned (default)
    #[default]
    Bottom,
    /// Justify
    Justify,
    /// Distributed
    Distributed,
}

impl VerticalAlignment {
    const CODES: [VerticalAlignment; 5] = [
        Self::Top,
        Self::Center,
        Self::Bottom,
        Self::Justify,
        Self::Distributed,
    ];

    /// Decode the 3-bit `alcV` field
    pub fn from_biff(code: u8) -> Self {
        Self::CODES
            .get(code as usize)
            .copied()
            .unwrap_or_default()
    }

    /// Stored code
    pub fn to_biff(self) -> u8 {
        self as u8
    }
}

/// Reading order for text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReadingOrder {
    /// Context dependent
    #[default]
    ContextDependent,
    /// Left to right
    LeftToRight,
    /// Right to left
    RightToLeft,
}

impl ReadingOrder {
    /// Decode the 2-bit `iReadOrder` field
    pub fn from_biff(code: u8) -> Self {
        match code {
            1 => ReadingOrder::LeftToRight,
            2 => ReadingOrder::RightToLeft,
            _ => ReadingOrder::ContextDependent,
        }
    }

    /// Stored code
    pub fn to_biff(self) -> u8 {
        self as u8
    }
}
