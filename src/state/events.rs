//! Events that drive the table state, and the notifications it sends up

use crate::data::column::ColumnDefinition;
use crate::data::filter::FilterPredicate;
use crate::data::row::Row;
use crate::pagination::CompactMode;
use crate::state::table_state::{TableState, Viewport};

/// Input changes and user actions applied by the reducer
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// The widget was mounted with its initial inputs
    Mounted,

    /// New table data arrived from the host
    TableDataChanged(Vec<Row>),

    /// Re-derive the column set from the current data. Only ever enqueued
    /// as a follow-up, never applied inside another event.
    RegenerateColumns,

    /// User edited the column configuration
    PrimaryColumnsUpdated(Vec<ColumnDefinition>),

    /// User edited the derived (computed) columns
    DerivedColumnsUpdated(Vec<ColumnDefinition>),

    /// A row was clicked; index into the filtered data
    RowClicked(usize),

    NextPageClicked,
    PreviousPageClicked,

    /// The grid corrected the page number itself
    PageNumberSet(usize),

    /// A column header was clicked; an empty column clears the sort
    ColumnSortClicked { column: String, asc: bool },

    /// Search box content (already debounced)
    SearchTextChanged(String),

    FiltersApplied(Vec<FilterPredicate>),

    /// New column order, by column id
    ColumnsReordered(Vec<String>),

    CompactModeChanged(CompactMode),

    MultiRowSelectionToggled(bool),

    ViewportResized(Viewport),

    /// A button of the actions column was clicked
    ColumnActionClicked(String),
}

/// One-way notifications to the host
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    RowSelected { index: usize },
    PageChanged { next: bool, page_no: usize },
    SearchTextChanged { text: String },
    ColumnActionTriggered { action: String },
}

/// Result of applying one event
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: TableState,
    /// Events to run after this one has been committed
    pub follow_ups: Vec<TableEvent>,
    pub notifications: Vec<Notification>,
}

impl Transition {
    pub fn to(state: TableState) -> Self {
        Self {
            state,
            follow_ups: Vec::new(),
            notifications: Vec::new(),
        }
    }

    pub fn unchanged(state: &TableState) -> Self {
        Self::to(state.clone())
    }

    pub fn then(mut self, event: TableEvent) -> Self {
        self.follow_ups.push(event);
        self
    }

    pub fn notify(mut self, notification: Notification) -> Self {
        self.notifications.push(notification);
        self
    }

    /// Notify only when the host bound a handler for it
    pub fn notify_if(self, bound: bool, notification: Notification) -> Self {
        if bound {
            self.notify(notification)
        } else {
            self
        }
    }
}
