use anyhow::{anyhow, bail, Context, Result};
use crossterm::style::Stylize;
use serde_json::Value;
use std::fs;
use tracing::{debug, info};

mod table_display;

use table_display::{display_page, export_to_csv};
use table_pipeline::config::Config;
use table_pipeline::data::column::{ColumnDefinition, ColumnType};
use table_pipeline::data::row::rows_from_json;
use table_pipeline::pagination::CompactMode;
use table_pipeline::state::table_state::Viewport;
use table_pipeline::utils::logging::init_tracing;
use table_pipeline::{
    Condition, FilterOperator, FilterPredicate, TableEvent, TableState, TableStore,
};

fn print_help() {
    println!(
        "{}",
        "table-pipeline - Sort, filter, page and format JSON rows"
            .blue()
            .bold()
    );
    println!();
    println!("{}", "Usage:".yellow());
    println!("  table-pipeline [OPTIONS] FILE.json");
    println!();
    println!("{}", "Options:".yellow());
    println!(
        "  {}  - Column configuration (JSON array)",
        "--columns <FILE>".green()
    );
    println!("  {}   - Case-insensitive search", "--search <TEXT>".green());
    println!("  {}     - Sort by column", "--sort <COL>".green());
    println!("  {}             - Sort descending", "--desc".green());
    println!(
        "  {} - Filter rows (repeatable)",
        "--filter <COL:CONDITION:VALUE>".green()
    );
    println!(
        "  {}  - Combine filters (AND or OR)",
        "--operator <OP>".green()
    );
    println!("  {}        - Page to show", "--page <N>".green());
    println!("  {}     - Viewport height in pixels", "--height <PX>".green());
    println!(
        "  {}  - SHORT, DEFAULT or TALL",
        "--compact <MODE>".green()
    );
    println!("  {}            - Allow several selected rows", "--multi".green());
    println!("  {}    - Click a row (repeatable)", "--select <N>".green());
    println!("  {}  - Export the page to CSV", "--export <FILE>".green());
    println!(
        "  {}  - Generate config file with defaults",
        "--generate-config".green()
    );
    println!("  {}          - Log to stderr", "--verbose".green());
    println!();
    println!("{}", "Filter conditions:".yellow());
    println!("  isExactly, notEqualTo, contains, doesNotContain, startsWith, endsWith,");
    println!("  lessThan, lessThanEqualTo, greaterThan, greaterThanEqualTo,");
    println!("  empty, notEmpty, is, isNot, isAfter, isBefore");
    println!();
}

/// Value following `flag`, if present
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|pos| args.get(pos + 1))
        .map(String::as_str)
}

/// Every value following a repeatable `flag`
fn flag_values<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
    args.windows(2)
        .filter(|pair| pair[0] == flag)
        .map(|pair| pair[1].as_str())
        .collect()
}

/// Parse "column:condition:value"; the value may itself contain ':'
fn parse_filter(spec: &str, operator: FilterOperator) -> Result<FilterPredicate> {
    let mut parts = spec.splitn(3, ':');
    let column = parts.next().filter(|c| !c.is_empty());
    let condition = parts.next();
    let (Some(column), Some(condition)) = (column, condition) else {
        bail!("Invalid filter '{}', expected COLUMN:CONDITION:VALUE", spec);
    };
    let condition: Condition = serde_json::from_value(Value::String(condition.to_string()))
        .map_err(|_| anyhow!("Unknown filter condition '{}'", condition))?;
    let value = parts
        .next()
        .map(|v| Value::String(v.to_string()))
        .unwrap_or(Value::Null);
    Ok(FilterPredicate::new(column, condition, value).with_operator(operator))
}

fn load_columns(path: &str, config: &Config) -> Result<Vec<ColumnDefinition>> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let mut columns: Vec<ColumnDefinition> =
        serde_json::from_str(&text).with_context(|| format!("Invalid columns file {}", path))?;
    for column in &mut columns {
        if column.column_type == ColumnType::Currency && column.format.is_none() {
            *column = column
                .clone()
                .with_format(None, &config.display.currency_symbol);
        }
    }
    Ok(columns)
}

fn run(args: &[String]) -> Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("{}", format!("Using default config: {}", e).yellow());
        Config::default()
    });

    let columns_file = flag_value(args, "--columns");
    let data_file = args
        .iter()
        .skip(1)
        .find(|arg| arg.ends_with(".json") && columns_file != Some(arg.as_str()))
        .ok_or_else(|| anyhow!("No data file given"))?;

    let text =
        fs::read_to_string(data_file).with_context(|| format!("Failed to read {}", data_file))?;
    let json: Value =
        serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", data_file))?;
    let rows = rows_from_json(&json);
    info!("Loaded {} rows from {}", rows.len(), data_file);

    let compact_mode = match flag_value(args, "--compact") {
        Some(mode) => {
            CompactMode::parse(mode).ok_or_else(|| anyhow!("Unknown compact mode '{}'", mode))?
        }
        None => config.display.compact_mode,
    };
    let height = match flag_value(args, "--height") {
        Some(h) => h.parse().with_context(|| format!("Invalid height '{}'", h))?,
        None => config.display.viewport_height,
    };

    let state = TableState {
        render_mode: config.display.render_mode,
        server_side_pagination: config.behavior.server_side_pagination,
        multi_row_selection: config.behavior.multi_row_selection,
        ..TableState::new(Vec::new())
    };
    let mut store = TableStore::with_config(state, &config);

    store.enqueue(TableEvent::Mounted);
    store.enqueue(TableEvent::TableDataChanged(rows));
    store.enqueue(TableEvent::CompactModeChanged(compact_mode));
    store.enqueue(TableEvent::ViewportResized(Viewport::new(0.0, height)));
    if let Some(path) = columns_file {
        store.enqueue(TableEvent::PrimaryColumnsUpdated(load_columns(path, &config)?));
    }
    if args.iter().any(|arg| arg == "--multi") {
        store.enqueue(TableEvent::MultiRowSelectionToggled(true));
    }
    store.run_until_idle();

    if let Some(column) = flag_value(args, "--sort") {
        let asc = !args.iter().any(|arg| arg == "--desc");
        store.dispatch(TableEvent::ColumnSortClicked {
            column: column.to_string(),
            asc,
        });
    }

    let operator = match flag_value(args, "--operator") {
        Some(op) if op.eq_ignore_ascii_case("and") => FilterOperator::And,
        Some(op) if op.eq_ignore_ascii_case("or") => FilterOperator::Or,
        Some(op) => bail!("Unknown operator '{}'", op),
        None => FilterOperator::Or,
    };
    let filters = flag_values(args, "--filter")
        .into_iter()
        .map(|spec| parse_filter(spec, operator))
        .collect::<Result<Vec<_>>>()?;
    if !filters.is_empty() {
        store.dispatch(TableEvent::FiltersApplied(filters));
    }

    if let Some(text) = flag_value(args, "--search") {
        store.type_search_text(text);
        store.flush_search();
    }

    if let Some(page) = flag_value(args, "--page") {
        let page: usize = page
            .parse()
            .with_context(|| format!("Invalid page '{}'", page))?;
        store.dispatch(TableEvent::PageNumberSet(page));
    }

    for index in flag_values(args, "--select") {
        let index: usize = index
            .parse()
            .with_context(|| format!("Invalid row index '{}'", index))?;
        store.dispatch(TableEvent::RowClicked(index));
    }

    let page = store.page_view();
    debug!(
        "Rendering page {} with {} of {} rows",
        page.page_no,
        page.rows.len(),
        page.total_rows
    );
    display_page(&page);
    if page.selected_row_index >= 0 {
        println!(
            "{}",
            format!("Selected row: {}", Value::Object(page.selected_row.clone())).cyan()
        );
    }

    if let Some(filename) = flag_value(args, "--export") {
        export_to_csv(&page, filename)?;
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|arg| arg == "--verbose");
    init_tracing(verbose);

    if args.iter().any(|arg| arg == "--help" || arg == "-h") || args.len() < 2 {
        print_help();
        return;
    }

    // Check for config file generation
    if args.iter().any(|arg| arg == "--generate-config" || arg == "--init-config") {
        match Config::get_config_path() {
            Ok(path) => {
                if let Some(parent) = path.parent() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        eprintln!("Error creating config directory: {}", e);
                        std::process::exit(1);
                    }
                }
                if let Err(e) = fs::write(&path, Config::create_default_with_comments()) {
                    eprintln!("Error writing config file: {}", e);
                    std::process::exit(1);
                }
                println!("Configuration file created at: {:?}", path);
                return;
            }
            Err(e) => {
                eprintln!("Error determining config path: {}", e);
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = run(&args) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}
