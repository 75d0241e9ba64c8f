use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell, CellAlignment as ComfyAlignment, ContentArrangement, Table};
use crossterm::style::Stylize;
use table_pipeline::data::column::{CellAlignment, ResolvedKind};
use table_pipeline::PageView;

/// Print one page of the table, marking selected rows
pub fn display_page(page: &PageView) {
    if page.rows.is_empty() {
        println!("{}", "No rows to display.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut headers = vec![Cell::new("").add_attribute(Attribute::Bold)];
    headers.extend(page.columns.iter().map(|column| {
        let marker = match column.is_asc_order {
            Some(true) => " ▲",
            Some(false) => " ▼",
            None => "",
        };
        Cell::new(format!("{}{}", column.header, marker)).add_attribute(Attribute::Bold)
    }));
    table.set_header(headers);

    for row in &page.rows {
        let mark = if is_selected(page, row.index) { "*" } else { "" };
        let mut cells = vec![Cell::new(mark)];
        for (column, text) in page.columns.iter().zip(&row.cells) {
            let mut cell = Cell::new(text);
            if let ResolvedKind::Data { cell_style, .. } = &column.kind {
                cell = match cell_style.horizontal_alignment {
                    Some(CellAlignment::Center) => cell.set_alignment(ComfyAlignment::Center),
                    Some(CellAlignment::Right) => cell.set_alignment(ComfyAlignment::Right),
                    _ => cell,
                };
            }
            if column.is_hidden {
                cell = cell.add_attribute(Attribute::Dim);
            }
            cells.push(cell);
        }
        table.add_row(cells);
    }

    println!("{table}");
    let pages = if page.page_size == 0 {
        0
    } else {
        page.total_rows.div_ceil(page.page_size)
    };
    println!(
        "\n{}",
        format!(
            "Page {} of {} ({} rows, {} per page)",
            page.page_no, pages, page.total_rows, page.page_size
        )
        .green()
    );
}

/// Single selection reports one index, multi selection a set
fn is_selected(page: &PageView, index: usize) -> bool {
    page.selected_row_index == index as i64 || page.selected_row_indices.contains(&index)
}

/// Write the formatted cells of a page to a CSV file
pub fn export_to_csv(page: &PageView, filename: &str) -> Result<()> {
    let mut wtr = csv::Writer::from_path(filename)
        .with_context(|| format!("Failed to create {}", filename))?;

    wtr.write_record(page.headers())?;
    for row in &page.rows {
        wtr.write_record(&row.cells)?;
    }

    wtr.flush()?;
    println!("{}", format!("Results exported to {}", filename).green());
    Ok(())
}
