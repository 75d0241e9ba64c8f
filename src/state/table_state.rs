use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::column::{derive_columns, ColumnAction, ColumnDefinition, ColumnResolver, RenderMode, ResolvedColumn};
use crate::data::filter::FilterPredicate;
use crate::data::row::Row;
use crate::data::sort::SortSpec;
use crate::data::table_view::{PageView, TableView};
use crate::pagination::{CompactMode, SizeTable};
use crate::state::selection::SelectionState;

/// Pixel size of the widget
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Which host handlers are bound; notifications are only sent for these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TriggerBindings {
    pub on_row_selected: bool,
    pub on_page_change: bool,
    pub on_search_text_changed: bool,
}

impl TriggerBindings {
    pub fn all() -> Self {
        Self {
            on_row_selected: true,
            on_page_change: true,
            on_search_text_changed: true,
        }
    }
}

/// Complete state of one table. Treated as an immutable snapshot: the
/// reducer returns a new value for every event.
#[derive(Debug, Clone, Default)]
pub struct TableState {
    pub table_data: Arc<Vec<Row>>,
    /// None until derived from the data or supplied by the user
    pub primary_columns: Option<Vec<ColumnDefinition>>,
    pub derived_columns: Vec<ColumnDefinition>,
    pub column_actions: Vec<ColumnAction>,
    pub column_name_map: HashMap<String, String>,
    pub column_order: Option<Vec<String>>,
    pub filters: Vec<FilterPredicate>,
    pub search_text: String,
    pub sorted_column: Option<SortSpec>,
    pub compact_mode: CompactMode,
    pub viewport: Viewport,
    pub multi_row_selection: bool,
    pub server_side_pagination: bool,
    pub render_mode: RenderMode,
    /// None when the host never set a page; read through [`TableState::page_no`]
    pub page_no: Option<usize>,
    pub selection: SelectionState,
    pub triggers: TriggerBindings,
}

impl TableState {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            table_data: Arc::new(rows),
            ..Default::default()
        }
    }

    /// Current 1-based page; defaults to the first page
    pub fn page_no(&self) -> usize {
        self.page_no.unwrap_or(1).max(1)
    }

    /// Displayed columns. Before the column configuration exists the
    /// columns are derived from the data on the fly.
    pub fn resolved_columns(&self) -> Vec<ResolvedColumn> {
        let fallback;
        let primary = match &self.primary_columns {
            Some(columns) => columns.as_slice(),
            None => {
                fallback = derive_columns(&self.table_data);
                fallback.as_slice()
            }
        };
        ColumnResolver {
            primary,
            derived: &self.derived_columns,
            column_order: self.column_order.as_deref(),
            sorted: self.sorted_column.as_ref(),
            render_mode: self.render_mode,
            actions: &self.column_actions,
            column_name_map: Some(&self.column_name_map),
        }
        .resolve()
    }

    /// Sorted and filtered view of the data
    pub fn table_view(&self) -> TableView {
        TableView::new(self.table_data.clone(), self.resolved_columns())
            .sort_by(self.sorted_column.as_ref())
            .filter(&self.search_text, &self.filters)
    }

    /// The filtered data as raw rows
    pub fn filtered_table_data(&self) -> Vec<Row> {
        self.table_view().filtered_rows()
    }

    /// Rows per page for the current viewport and compact mode
    pub fn page_size(&self, sizes: &SizeTable) -> usize {
        sizes.get(self.compact_mode).page_size(self.viewport.height)
    }

    /// Run the whole pipeline and produce the current page
    pub fn page_view(&self, sizes: &SizeTable) -> PageView {
        self.table_view().page_view(
            self.page_no(),
            self.page_size(sizes),
            self.server_side_pagination,
            &self.selection,
        )
    }
}
