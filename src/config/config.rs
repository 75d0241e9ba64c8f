use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::data::column::RenderMode;
use crate::pagination::{CompactMode, SizeTable};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
    pub table_sizes: SizeTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Row density used when the table does not choose one
    pub compact_mode: CompactMode,

    /// Symbol for CURRENCY columns without an explicit format
    pub currency_symbol: String,

    /// Canvas keeps hidden columns on screen, Page drops them
    pub render_mode: RenderMode,

    /// Height in pixels used by the command line front end
    pub viewport_height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Quiet period before typed search text is applied
    pub search_debounce_ms: u64,

    /// Quiet period for free-form style inputs (colors, labels)
    pub style_debounce_ms: u64,

    /// Data arrives already paged by the server
    pub server_side_pagination: bool,

    /// Select several rows at once
    pub multi_row_selection: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            compact_mode: CompactMode::Default,
            currency_symbol: "$".to_string(),
            render_mode: RenderMode::Page,
            viewport_height: 480.0,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 300,
            style_debounce_ms: 1000,
            server_side_pagination: false,
            multi_row_selection: false,
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("table-pipeline").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# table-pipeline configuration file
# Location: ~/.config/table-pipeline/config.toml (Linux)
#           %APPDATA%\table-pipeline\config.toml (Windows)

[display]
# Row density: "SHORT", "DEFAULT" or "TALL"
compact_mode = "DEFAULT"

# Symbol for currency columns without an explicit format
currency_symbol = "$"

# "CANVAS" keeps hidden columns visible (editor), "PAGE" drops them
render_mode = "PAGE"

# Height in pixels the table is laid out in
viewport_height = 480.0

[behavior]
# Milliseconds of quiet typing before the search runs
search_debounce_ms = 300

# Milliseconds of quiet before style inputs are applied
style_debounce_ms = 1000

# Rows arrive already paged by the server
server_side_pagination = false

# Allow selecting several rows
multi_row_selection = false

# Pixel sizes per compact mode
[table_sizes.short]
column_header_height = 38.0
table_header_height = 42.0
row_height = 20.0
row_font_size = 12.0

[table_sizes.default]
column_header_height = 38.0
table_header_height = 42.0
row_height = 40.0
row_font_size = 14.0

[table_sizes.tall]
column_header_height = 38.0
table_header_height = 42.0
row_height = 60.0
row_font_size = 18.0
"#
        .to_string()
    }
}
