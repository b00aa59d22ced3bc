//! Number format types and the built-in format catalog

use super::date_pattern;

/// Built-in number formats, by index. Indices missing from the table (23–36)
/// are locale dependent and have no fixed pattern.
pub const BUILTIN_FORMATS: &[(u16, &str)] = &[
    (0x00, ""),
    (0x01, "0"),
    (0x02, "0.00"),
    (0x03, "#,##0"),
    (0x04, "#,##0.00"),
    (0x05, "($#,##0_);($#,##0)"),
    (0x06, "($#,##0_);[Red]($#,##0)"),
    (0x07, "($#,##0.00_);($#,##0.00)"),
    (0x08, "($#,##0.00_);[Red]($#,##0.00)"),
    (0x09, "0%"),
    (0x0a, "0.00%"),
    (0x0b, "0.00E+00"),
    (0x0c, "# ?/?"),
    (0x0d, "# ??/??"),
    (0x0e, "dd/mm/yyyy"),
    (0x0f, "d-mmm-yy"),
    (0x10, "d-mmm"),
    (0x11, "mmm-yy"),
    (0x12, "h:mm AM/PM"),
    (0x13, "h:mm:ss AM/PM"),
    (0x14, "h:mm"),
    (0x15, "h:mm:ss"),
    (0x16, "m/d/yy h:mm"),
    (0x25, "(#,##0_);(#,##0)"),
    (0x26, "(#,##0_);[Red](#,##0)"),
    (0x27, "(#,##0.00_);(#,##0.00)"),
    (0x28, "(#,##0.00_);[Red](#,##0.00)"),
    (0x29, "_(*#,##0_);_(*(#,##0);_(*\"-\"_);(@_)"),
    (0x2a, "_($*#,##0_);_($*(#,##0);_($*\"-\"_);(@_)"),
    (0x2b, "_(* #,##0.00_);_(* (#,##0.00);_(* \"-\"??_);(@_)"),
    (0x2c, "_($* #,##0.00_);_($* (#,##0.00);_($* \"-\"??_);(@_)"),
    (0x2d, "mm:ss"),
    (0x2e, "[h]mm:ss"),
    (0x2f, "mm:ss.0"),
    (0x30, "##0.0E+0"),
    (0x31, "@"),
];

/// Pattern of a built-in format index
pub fn builtin_pattern(index: u16) -> Option<&'static str> {
    BUILTIN_FORMATS
        .iter()
        .find(|(i, _)| *i == index)
        .map(|(_, p)| *p)
}

/// Index of a built-in pattern (exact match)
pub fn builtin_index(pattern: &str) -> Option<u16> {
    BUILTIN_FORMATS
        .iter()
        .find(|(_, p)| *p == pattern)
        .map(|(i, _)| *i)
}

/// Number format for cell display
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumberFormat {
    /// General format (default)
    #[default]
    General,

    /// Built-in format by index
    BuiltIn(u16),

    /// Custom format string
    Custom(String),
}

impl NumberFormat {
    /// 0 - General
    pub const ID_GENERAL: u16 = 0;
    /// 14 - dd/mm/yyyy
    pub const ID_DATE_SHORT: u16 = 0x0e;
    /// 22 - m/d/yy h:mm
    pub const ID_DATETIME: u16 = 0x16;
    /// 49 - @
    pub const ID_TEXT: u16 = 0x31;

    /// Create a number format from a format string, preferring the built-in
    /// index when the pattern is in the catalog
    pub fn from_string<S: Into<String>>(format: S) -> Self {
        let format = format.into();
        match builtin_index(&format) {
            Some(0) => NumberFormat::General,
            Some(id) => NumberFormat::BuiltIn(id),
            None => NumberFormat::Custom(format),
        }
    }

    /// Create a built-in format by index
    pub fn from_id(id: u16) -> Self {
        if id == Self::ID_GENERAL {
            NumberFormat::General
        } else {
            NumberFormat::BuiltIn(id)
        }
    }

    /// Get the format string
    pub fn format_string(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::BuiltIn(id) => match builtin_pattern(*id) {
                Some("") | None => "General",
                Some(p) => p,
            },
            NumberFormat::Custom(s) => s,
        }
    }

    /// Check if this is a date/time format
    pub fn is_date_format(&self) -> bool {
        match self {
            NumberFormat::BuiltIn(id) => matches!(id, 0x0e..=0x16 | 0x2d..=0x2f),
            NumberFormat::Custom(s) => date_pattern::is_date_pattern(s),
            NumberFormat::General => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lookups() {
        assert_eq!(builtin_pattern(1), Some("0"));
        assert_eq!(builtin_pattern(0x0e), Some("dd/mm/yyyy"));
        assert_eq!(builtin_pattern(0x31), Some("@"));
        assert_eq!(builtin_pattern(0x17), None);
        assert_eq!(builtin_index("0.00%"), Some(0x0a));
        assert_eq!(builtin_index("[h]mm:ss"), Some(0x2e));
        assert_eq!(builtin_index("yyyy-mm-dd"), None);
    }

    #[test]
    fn catalog_indices_are_unique() {
        let mut ids: Vec<u16> = BUILTIN_FORMATS.iter().map(|(i, _)| *i).collect();
        ids.dedup();
        assert_eq!(ids.len(), BUILTIN_FORMATS.len());
    }

    #[test]
    fn from_string_prefers_catalog() {
        assert_eq!(NumberFormat::from_string("0.00"), NumberFormat::BuiltIn(2));
        assert_eq!(NumberFormat::from_string(""), NumberFormat::General);
        assert_eq!(
            NumberFormat::from_string("0.000"),
            NumberFormat::Custom("0.000".into())
        );
    }

    #[test]
    fn date_detection() {
        assert!(NumberFormat::BuiltIn(0x0e).is_date_format());
        assert!(NumberFormat::BuiltIn(0x2e).is_date_format());
        assert!(!NumberFormat::BuiltIn(0x04).is_date_format());
        assert!(NumberFormat::Custom("yyyy-mm-dd".into()).is_date_format());
        assert!(!NumberFormat::Custom("\"Day\" 0".into()).is_date_format());
        assert!(!NumberFormat::General.is_date_format());
        assert_eq!(NumberFormat::BuiltIn(0).format_string(), "General");
    }
}
