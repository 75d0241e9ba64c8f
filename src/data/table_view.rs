use std::sync::Arc;

use tracing::debug;

use crate::data::column::{ColumnType, ResolvedColumn};
use crate::data::filter::{filter_indices, FilterPredicate};
use crate::data::row::{empty_row, Row};
use crate::data::sort::{sort_indices, SortSpec};
use crate::pagination::page_range;
use crate::state::selection::SelectionState;

/// A view over the table data that sorts and filters row indices without
/// touching the underlying rows
#[derive(Debug, Clone)]
pub struct TableView {
    /// The immutable data snapshot
    source: Arc<Vec<Row>>,

    /// Columns in display order
    columns: Vec<ResolvedColumn>,

    /// Row indices that survive sorting and filtering, in display order
    visible_rows: Vec<usize>,
}

/// One formatted row of a page
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedRow {
    /// Position in the filtered data (the index selection refers to)
    pub index: usize,
    /// One display string per resolved column; empty for the actions column
    pub cells: Vec<String>,
}

/// Everything the grid needs to draw the current page
#[derive(Debug, Clone)]
pub struct PageView {
    pub columns: Vec<ResolvedColumn>,
    pub rows: Vec<FormattedRow>,
    pub page_no: usize,
    pub page_size: usize,
    pub total_rows: usize,
    pub selected_row_index: i64,
    pub selected_row_indices: Vec<usize>,
    pub selected_row: Row,
    pub selected_rows: Vec<Row>,
}

impl PageView {
    /// Display string of `accessor` in page row `row`
    pub fn cell(&self, row: usize, accessor: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c.accessor == accessor)?;
        self.rows.get(row)?.cells.get(col).map(String::as_str)
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header.as_str()).collect()
    }
}

impl TableView {
    /// Create a view showing every row
    pub fn new(source: Arc<Vec<Row>>, columns: Vec<ResolvedColumn>) -> Self {
        let visible_rows = (0..source.len()).collect();
        Self {
            source,
            columns,
            visible_rows,
        }
    }

    /// Sort all rows by the active sort column, if any
    pub fn sort_by(mut self, spec: Option<&SortSpec>) -> Self {
        if let Some(spec) = spec {
            let column = self.columns.iter().find(|c| c.accessor == spec.column);
            let column_type = column
                .and_then(ResolvedColumn::column_type)
                .unwrap_or(ColumnType::Text);
            let input_format = column.map(|c| c.input_format()).unwrap_or("");
            sort_indices(
                &self.source,
                &mut self.visible_rows,
                spec,
                column_type,
                input_format,
            );
        }
        self
    }

    /// Keep rows matching the search text and the structured filters
    pub fn filter(mut self, search_text: &str, filters: &[FilterPredicate]) -> Self {
        self.visible_rows = filter_indices(&self.source, &self.visible_rows, search_text, filters);
        self
    }

    /// Number of rows after filtering
    pub fn row_count(&self) -> usize {
        self.visible_rows.len()
    }

    pub fn columns(&self) -> &[ResolvedColumn] {
        &self.columns
    }

    pub fn visible_row_indices(&self) -> &[usize] {
        &self.visible_rows
    }

    /// Raw row at a position of the filtered data
    pub fn get_row(&self, index: usize) -> Option<&Row> {
        self.visible_rows.get(index).map(|&i| &self.source[i])
    }

    /// The filtered data as raw rows
    pub fn filtered_rows(&self) -> Vec<Row> {
        self.visible_rows
            .iter()
            .map(|&i| self.source[i].clone())
            .collect()
    }

    /// Format the row at a position of the filtered data
    pub fn format_row(&self, index: usize) -> Option<FormattedRow> {
        let row = self.get_row(index)?;
        let cells = self
            .columns
            .iter()
            .map(|column| column.format(row.get(&column.accessor)).unwrap_or_default())
            .collect();
        Some(FormattedRow { index, cells })
    }

    /// Slice out and format one page. With server-side pagination the data
    /// already is the page, so nothing is sliced.
    pub fn page_view(
        &self,
        page_no: usize,
        page_size: usize,
        server_side_pagination: bool,
        selection: &SelectionState,
    ) -> PageView {
        let range = if server_side_pagination {
            0..self.row_count()
        } else {
            page_range(page_no, page_size, self.row_count())
        };
        debug!(
            "Page {} (size {}): rows {:?} of {}",
            page_no,
            page_size,
            range,
            self.row_count()
        );
        let rows = range.filter_map(|i| self.format_row(i)).collect();

        let selected_row = match selection {
            SelectionState::Single(index) => self.get_row(*index).cloned(),
            _ => None,
        }
        .unwrap_or_else(|| empty_row(&self.source));
        let indices = selection.indices();
        let selected_rows = indices
            .iter()
            .filter_map(|&i| self.get_row(i).cloned())
            .collect();

        PageView {
            columns: self.columns.clone(),
            rows,
            page_no,
            page_size,
            total_rows: self.row_count(),
            selected_row_index: selection.selected_row_index(),
            selected_row_indices: indices.into_iter().collect(),
            selected_row,
            selected_rows,
        }
    }
}
