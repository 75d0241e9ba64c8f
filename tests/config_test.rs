use std::io::Write;
use table_pipeline::data::column::RenderMode;
use table_pipeline::pagination::CompactMode;
use table_pipeline::Config;
use tempfile::NamedTempFile;

#[test]
fn test_partial_config_keeps_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[display]
compact_mode = "TALL"
currency_symbol = "€"

[table_sizes.short]
table_header_height = 42.0

[table_sizes.tall]
row_height = 50.0
"#
    )
    .unwrap();
    file.flush().unwrap();

    let config = Config::load_from(file.path()).unwrap();
    assert_eq!(config.display.compact_mode, CompactMode::Tall);
    assert_eq!(config.display.currency_symbol, "€");
    assert_eq!(config.display.render_mode, RenderMode::Page);
    assert_eq!(config.behavior.search_debounce_ms, 300);
    assert_eq!(config.table_sizes.tall.row_height, 50.0);
    assert_eq!(config.table_sizes.tall.row_font_size, 18.0);
    assert_eq!(config.table_sizes.short.row_height, 20.0);
    assert_eq!(config.table_sizes.short.row_font_size, 12.0);
    assert_eq!(config.table_sizes.short.page_size(480.0), 20);
    assert_eq!(config.table_sizes.default.row_height, 40.0);
}

#[test]
fn test_invalid_config_reports_path() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "display = 12").unwrap();
    file.flush().unwrap();

    let err = Config::load_from(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid config file"));
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let mut config = Config::default();
    config.behavior.multi_row_selection = true;
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert!(loaded.behavior.multi_row_selection);
}
