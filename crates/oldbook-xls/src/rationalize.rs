//! Collapsing duplicate fonts, number formats and XFs.
//!
//! The pipeline runs fonts, then formats, then XFs. Each stage returns an
//! [`IndexMapping`] from old to new indices that later stages (and the
//! records referring to the table) are rewritten through. The first
//! occurrence of a value always survives, and survivors keep their relative
//! order.

use std::fmt;

use ahash::AHashMap;

use crate::styles::format::{is_custom, MAX_CUSTOM_FORMAT};
use crate::styles::table::{font_index_at, FormattingTable, DEFAULT_FONT_COUNT, MIN_XF_COUNT};
use crate::styles::xf::{XfKind, PARENT_NONE};
use crate::styles::{FontRecord, Indexed, XfRecord};

/// Old-index to new-index table, identity until told otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMapping {
    targets: Vec<u16>,
}

impl IndexMapping {
    /// Identity mapping over `[0, size)`
    pub fn new(size: usize) -> Self {
        Self {
            targets: (0..size).map(|i| i as u16).collect(),
        }
    }

    /// Map `old` to `new`.
    ///
    /// # Panics
    /// If `old` is outside the mapping.
    pub fn set_mapping(&mut self, old: u16, new: u16) {
        assert!(
            (old as usize) < self.targets.len(),
            "index {} outside mapping of size {}",
            old,
            self.targets.len()
        );
        self.targets[old as usize] = new;
    }

    /// New index for `old`.
    ///
    /// # Panics
    /// If `old` is outside the mapping.
    pub fn new_index(&self, old: u16) -> u16 {
        assert!(
            (old as usize) < self.targets.len(),
            "index {} outside mapping of size {}",
            old,
            self.targets.len()
        );
        self.targets[old as usize]
    }

    /// New index for `old`, if it is inside the mapping
    pub fn get(&self, old: u16) -> Option<u16> {
        self.targets.get(old as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Whether every index maps to itself
    pub fn is_identity(&self) -> bool {
        self.targets.iter().enumerate().all(|(i, &t)| t as usize == i)
    }
}

/// How many entries each stage removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RationalizeReport {
    pub fonts_removed: usize,
    pub formats_removed: usize,
    pub xfs_removed: usize,
}

impl RationalizeReport {
    pub fn total(&self) -> usize {
        self.fonts_removed + self.formats_removed + self.xfs_removed
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for RationalizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "removed {} fonts, {} number formats, {} XFs",
            self.fonts_removed, self.formats_removed, self.xfs_removed
        )
    }
}

/// Result of a rationalization pass.
#[derive(Debug, Clone)]
pub struct Rationalized {
    pub report: RationalizeReport,
    pub fonts: IndexMapping,
    pub formats: IndexMapping,
    pub xfs: IndexMapping,
}

/// Remove duplicate fonts, formats and XFs from `table`.
///
/// Records outside the table that store an XF index must be rewritten through
/// the returned XF mapping, and those naming a font (see
/// [`font_refs`](crate::font_refs)) through the font mapping.
pub fn rationalize(table: &mut FormattingTable) -> Rationalized {
    let (fonts_removed, fonts) = rationalize_fonts(table);
    let (formats_removed, formats) = rationalize_formats(table);
    let (xfs_removed, xfs) = rationalize_xfs(table, &fonts, &formats);

    let report = RationalizeReport {
        fonts_removed,
        formats_removed,
        xfs_removed,
    };
    log::debug!("rationalized formatting table: {report}");
    Rationalized {
        report,
        fonts,
        formats,
        xfs,
    }
}

/// Merge duplicate fonts past the first [`DEFAULT_FONT_COUNT`].
pub fn rationalize_fonts(table: &mut FormattingTable) -> (usize, IndexMapping) {
    let fonts = std::mem::take(&mut table.fonts);
    let size = fonts.iter().map(|f| f.index as usize + 1).max().unwrap_or(0);
    let mut mapping = IndexMapping::new(size.max(fonts.len() + 1));

    let mut accepted: AHashMap<FontRecord, u16> = AHashMap::with_capacity(fonts.len());
    let mut kept: Vec<Indexed<FontRecord>> = Vec::with_capacity(fonts.len());
    let mut removed = 0usize;

    for (position, font) in fonts.into_iter().enumerate() {
        if position < DEFAULT_FONT_COUNT {
            accepted.entry(font.value.clone()).or_insert(font.index);
            kept.push(font);
            continue;
        }
        match accepted.get(&font.value) {
            Some(&survivor) => {
                mapping.set_mapping(font.index, survivor);
                removed += 1;
            }
            None => {
                let index = font_index_at(kept.len());
                mapping.set_mapping(font.index, index);
                accepted.insert(font.value.clone(), index);
                kept.push(Indexed {
                    index,
                    value: font.value,
                });
            }
        }
    }

    table.fonts = kept;
    (removed, mapping)
}

/// Merge duplicate custom number formats.
///
/// Built-in indices map to themselves. The table is left untouched when no
/// custom format is a duplicate.
pub fn rationalize_formats(table: &mut FormattingTable) -> (usize, IndexMapping) {
    let mut mapping = IndexMapping::new(MAX_CUSTOM_FORMAT as usize + 1);
    let mut removed = 0usize;
    {
        let mut custom: Vec<&Indexed<_>> =
            table.formats.iter().filter(|f| is_custom(f.index)).collect();
        custom.sort_by_key(|f| f.index);

        let mut accepted: AHashMap<&str, u16> = AHashMap::with_capacity(custom.len());
        for format in custom {
            match accepted.get(format.value.pattern.as_str()) {
                Some(&survivor) => {
                    mapping.set_mapping(format.index, survivor);
                    removed += 1;
                }
                None => {
                    let index = format.index - removed as u16;
                    mapping.set_mapping(format.index, index);
                    accepted.insert(&format.value.pattern, index);
                }
            }
        }
    }

    if removed == 0 {
        return (0, IndexMapping::new(MAX_CUSTOM_FORMAT as usize + 1));
    }

    let formats = std::mem::take(&mut table.formats);
    let mut seen = Vec::new();
    table.formats = formats
        .into_iter()
        .filter_map(|f| {
            if !is_custom(f.index) {
                return Some(f);
            }
            let index = mapping.new_index(f.index);
            if seen.contains(&index) {
                return None;
            }
            seen.push(index);
            Some(Indexed {
                index,
                value: f.value,
            })
        })
        .collect();
    table.next_format = table.next_format.saturating_sub(removed as u16);
    (removed, mapping)
}

/// Redirect font and format references, then merge duplicate XFs past the
/// first [`MIN_XF_COUNT`].
pub fn rationalize_xfs(
    table: &mut FormattingTable,
    fonts: &IndexMapping,
    formats: &IndexMapping,
) -> (usize, IndexMapping) {
    for (index, xf) in table.xfs.iter_mut().enumerate() {
        match fonts.get(xf.font_index) {
            Some(font) => xf.font_index = font,
            None => log::warn!("XF {index} refers to unknown font {}", xf.font_index),
        }
        match formats.get(xf.format_index) {
            Some(format) => xf.format_index = format,
            None => log::warn!("XF {index} refers to unknown format {}", xf.format_index),
        }
    }

    let count = table.xfs.len();
    if count < MIN_XF_COUNT {
        log::warn!("only {count} XF records, expected at least {MIN_XF_COUNT}; XFs left as they are");
        return (0, IndexMapping::new(count));
    }

    let xfs = std::mem::take(&mut table.xfs);
    let mut mapping = IndexMapping::new(count);
    let mut accepted: AHashMap<XfRecord, u16> = AHashMap::with_capacity(count);
    let mut kept: Vec<XfRecord> = Vec::with_capacity(count);
    let mut removed = 0usize;

    for (old, xf) in xfs.into_iter().enumerate() {
        let old = old as u16;
        if (old as usize) < MIN_XF_COUNT {
            accepted.entry(xf.clone()).or_insert(old);
            kept.push(xf);
            continue;
        }
        match accepted.get(&xf) {
            Some(&survivor) => {
                mapping.set_mapping(old, survivor);
                removed += 1;
            }
            None => {
                let index = old - removed as u16;
                mapping.set_mapping(old, index);
                accepted.insert(xf.clone(), index);
                kept.push(xf);
            }
        }
    }

    for (index, xf) in kept.iter_mut().enumerate() {
        if xf.kind != XfKind::Cell || xf.parent == PARENT_NONE {
            continue;
        }
        match mapping.get(xf.parent) {
            Some(parent) => xf.parent = parent,
            None => log::warn!("XF {index} has unknown parent {}", xf.parent),
        }
    }

    table.xfs = kept;
    (removed, mapping)
}
