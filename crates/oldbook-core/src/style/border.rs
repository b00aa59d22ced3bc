//! Border style types

use super::Color;

/// Border style for a cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BorderStyle {
    /// Left border
    pub left: Option<BorderEdge>,
    /// Right border
    pub right: Option<BorderEdge>,
    /// Top border
    pub top: Option<BorderEdge>,
    /// Bottom border
    pub bottom: Option<BorderEdge>,
    /// Diagonal border
    pub diagonal: Option<BorderEdge>,
    /// Diagonal border direction
    pub diagonal_direction: DiagonalDirection,
}

impl BorderStyle {
    /// Create a new border style with no borders
    pub fn new() -> Self {
        Self::default()
    }

    /// Set all four outline borders to the same style
    pub fn all(style: BorderLineStyle, color: Color) -> Self {
        let edge = BorderEdge::from_parts(style, color);
        Self {
            left: edge.clone(),
            right: edge.clone(),
            top: edge.clone(),
            bottom: edge,
            diagonal: None,
            diagonal_direction: DiagonalDirection::None,
        }
    }

    /// Check if all borders are empty
    pub fn is_empty(&self) -> bool {
        self.left.is_none()
            && self.right.is_none()
            && self.top.is_none()
            && self.bottom.is_none()
            && self.diagonal.is_none()
    }
}

/// A single border edge
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BorderEdge {
    /// Line style
    pub style: BorderLineStyle,
    /// Line color
    pub color: Color,
}

impl BorderEdge {
    /// Create a new border edge
    pub fn new(style: BorderLineStyle, color: Color) -> Self {
        Self { style, color }
    }

    /// An edge, or `None` when the line style draws nothing
    pub fn from_parts(style: BorderLineStyle, color: Color) -> Option<Self> {
        (style != BorderLineStyle::None).then(|| Self::new(style, color))
    }

    /// Create a thin black border
    pub fn thin() -> Self {
        Self::new(BorderLineStyle::Thin, Color::BLACK)
    }
}

/// Border line styles, in stored code order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BorderLineStyle {
    /// No border
    #[default]
    None,
    /// Thin line
    Thin,
    /// Medium line
    Medium,
    /// Dashed line
    Dashed,
    /// Dotted line
    Dotted,
    /// Thick line
    Thick,
    /// Double line
    Double,
    /// Hair line (very thin)
    Hair,
    /// Medium dashed
    MediumDashed,
    /// Dash-dot
    DashDot,
    /// Medium dash-dot
    MediumDashDot,
    /// Dash-dot-dot
    DashDotDot,
    /// Medium dash-dot-dot
    MediumDashDotDot,
    /// Slant dash-dot
    SlantDashDot,
}

impl BorderLineStyle {
    const CODES: [BorderLineStyle; 14] = [
        Self::None,
        Self::Thin,
        Self::Medium,
        Self::Dashed,
        Self::Dotted,
        Self::Thick,
        Self::Double,
        Self::Hair,
        Self::MediumDashed,
        Self::DashDot,
        Self::MediumDashDot,
        Self::DashDotDot,
        Self::MediumDashDotDot,
        Self::SlantDashDot,
    ];

    /// Decode a 4-bit border line code; unknown codes draw nothing
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

/// Diagonal border direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagonalDirection {
    /// No diagonal
    #[default]
    None,
    /// Diagonal from top-left to bottom-right
    Down,
    /// Diagonal from bottom-left to top-right
    Up,
    /// Both diagonals
    Both,
}

impl DiagonalDirection {
    /// Decode the two diagonal flag bits (bit 0 down, bit 1 up)
    pub fn from_biff(bits: u8) -> Self {
        match bits & 0x03 {
            1 => DiagonalDirection::Down,
            2 => DiagonalDirection::Up,
            3 => DiagonalDirection::Both,
            _ => DiagonalDirection::None,
        }
    }

    /// Stored flag bits
    pub fn to_biff(self) -> u8 {
        self as u8
    }
}
