//! Row density presets and the page-size arithmetic derived from them

use serde::{Deserialize, Serialize};

/// Density preset fixing header and row heights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompactMode {
    Short,
    #[default]
    Default,
    Tall,
}

impl CompactMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "SHORT" => Some(CompactMode::Short),
            "DEFAULT" => Some(CompactMode::Default),
            "TALL" => Some(CompactMode::Tall),
            _ => None,
        }
    }
}

/// Pixel sizes of one compact mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableSizes {
    pub column_header_height: f64,
    pub table_header_height: f64,
    pub row_height: f64,
    pub row_font_size: f64,
}

impl Default for TableSizes {
    fn default() -> Self {
        TableSizes::for_mode(CompactMode::Default)
    }
}

impl TableSizes {
    pub const fn for_mode(mode: CompactMode) -> Self {
        match mode {
            CompactMode::Default => TableSizes {
                column_header_height: 38.0,
                table_header_height: 42.0,
                row_height: 40.0,
                row_font_size: 14.0,
            },
            CompactMode::Short => TableSizes {
                column_header_height: 38.0,
                table_header_height: 42.0,
                row_height: 20.0,
                row_font_size: 12.0,
            },
            CompactMode::Tall => TableSizes {
                column_header_height: 38.0,
                table_header_height: 42.0,
                row_height: 60.0,
                row_font_size: 18.0,
            },
        }
    }

    /// Rows that fit in `height` pixels below the two headers; a partially
    /// visible trailing row still counts
    pub fn page_size(&self, height: f64) -> usize {
        let available = height - self.table_header_height - self.column_header_height;
        if !available.is_finite() || available <= 0.0 || self.row_height <= 0.0 {
            return 0;
        }
        let mut size = (available / self.row_height).floor();
        if available - self.row_height * size > 0.0 {
            size += 1.0;
        }
        size as usize
    }
}

/// Sizes for every compact mode, overridable from configuration. Fields
/// left out of an override keep that mode's own defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "SizeTableOverrides")]
pub struct SizeTable {
    pub short: TableSizes,
    pub default: TableSizes,
    pub tall: TableSizes,
}

impl Default for SizeTable {
    fn default() -> Self {
        Self {
            short: TableSizes::for_mode(CompactMode::Short),
            default: TableSizes::for_mode(CompactMode::Default),
            tall: TableSizes::for_mode(CompactMode::Tall),
        }
    }
}

/// Partial sizes as written in a config file
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
struct SizeOverrides {
    column_header_height: Option<f64>,
    table_header_height: Option<f64>,
    row_height: Option<f64>,
    row_font_size: Option<f64>,
}

impl SizeOverrides {
    fn apply_to(self, base: TableSizes) -> TableSizes {
        TableSizes {
            column_header_height: self
                .column_header_height
                .unwrap_or(base.column_header_height),
            table_header_height: self.table_header_height.unwrap_or(base.table_header_height),
            row_height: self.row_height.unwrap_or(base.row_height),
            row_font_size: self.row_font_size.unwrap_or(base.row_font_size),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
struct SizeTableOverrides {
    short: SizeOverrides,
    default: SizeOverrides,
    tall: SizeOverrides,
}

impl From<SizeTableOverrides> for SizeTable {
    fn from(overrides: SizeTableOverrides) -> Self {
        Self {
            short: overrides
                .short
                .apply_to(TableSizes::for_mode(CompactMode::Short)),
            default: overrides
                .default
                .apply_to(TableSizes::for_mode(CompactMode::Default)),
            tall: overrides.tall.apply_to(TableSizes::for_mode(CompactMode::Tall)),
        }
    }
}

impl SizeTable {
    pub fn get(&self, mode: CompactMode) -> &TableSizes {
        match mode {
            CompactMode::Short => &self.short,
            CompactMode::Default => &self.default,
            CompactMode::Tall => &self.tall,
        }
    }
}

/// Page number after a "next page" click; there is no upper bound here
pub fn next_page(page_no: usize) -> usize {
    page_no.max(1) + 1
}

/// Page number after a "previous page" click, or None at the first page
pub fn previous_page(page_no: usize) -> Option<usize> {
    let page_no = page_no.max(1);
    if page_no > 1 {
        Some(page_no - 1)
    } else {
        None
    }
}

/// Row range shown on a 1-based page
pub fn page_range(page_no: usize, page_size: usize, total: usize) -> std::ops::Range<usize> {
    let start = page_no.max(1).saturating_sub(1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    start..end
}
