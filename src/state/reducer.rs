//! The pure reducer: `(state, event) -> transition`

use std::sync::Arc;

use tracing::{debug, trace};

use crate::data::column::{columns_drifted, derive_columns};
use crate::data::sort::SortSpec;
use crate::pagination::{next_page, previous_page};
use crate::state::events::{Notification, TableEvent, Transition};
use crate::state::selection::SelectionState;
use crate::state::table_state::TableState;

/// Apply one event. Never mutates `state` and never applies follow-up
/// events itself; those are returned for the store to queue.
pub fn reduce(state: &TableState, event: &TableEvent) -> Transition {
    trace!("reduce: {:?}", event);
    match event {
        TableEvent::Mounted => {
            let transition = Transition::unchanged(state);
            if state.primary_columns.is_none() {
                transition.then(TableEvent::RegenerateColumns)
            } else {
                transition
            }
        }

        TableEvent::TableDataChanged(rows) => {
            if state.table_data.as_slice() == rows.as_slice() {
                return Transition::unchanged(state);
            }
            debug!("Table data changed: {} rows", rows.len());
            let next = TableState {
                table_data: Arc::new(rows.clone()),
                selection: SelectionState::None,
                ..state.clone()
            };
            Transition::to(next).then(TableEvent::RegenerateColumns)
        }

        TableEvent::RegenerateColumns => {
            let keep = state
                .primary_columns
                .as_ref()
                .is_some_and(|columns| !columns_drifted(columns, &state.table_data));
            if keep {
                return Transition::unchanged(state);
            }
            Transition::to(TableState {
                primary_columns: Some(derive_columns(&state.table_data)),
                ..state.clone()
            })
        }

        TableEvent::PrimaryColumnsUpdated(columns) => Transition::to(TableState {
            primary_columns: Some(columns.clone()),
            ..state.clone()
        }),

        TableEvent::DerivedColumnsUpdated(columns) => Transition::to(TableState {
            derived_columns: columns.clone(),
            ..state.clone()
        }),

        TableEvent::RowClicked(index) => Transition::to(TableState {
            selection: state.selection.click(*index, state.multi_row_selection),
            ..state.clone()
        })
        .notify_if(
            state.triggers.on_row_selected,
            Notification::RowSelected { index: *index },
        ),

        TableEvent::NextPageClicked => {
            let page_no = next_page(state.page_no());
            change_page(state, page_no, true)
        }

        TableEvent::PreviousPageClicked => match previous_page(state.page_no()) {
            Some(page_no) => change_page(state, page_no, false),
            None => Transition::unchanged(state),
        },

        TableEvent::PageNumberSet(page_no) => Transition::to(TableState {
            page_no: Some((*page_no).max(1)),
            ..state.clone()
        }),

        TableEvent::ColumnSortClicked { column, asc } => {
            let sorted_column = if column.is_empty() {
                None
            } else {
                Some(SortSpec::new(column.clone(), *asc))
            };
            Transition::to(TableState {
                sorted_column,
                selection: SelectionState::None,
                ..state.clone()
            })
        }

        TableEvent::SearchTextChanged(text) => Transition::to(TableState {
            search_text: text.clone(),
            page_no: Some(1),
            selection: SelectionState::None,
            ..state.clone()
        })
        .notify_if(
            state.triggers.on_search_text_changed,
            Notification::SearchTextChanged { text: text.clone() },
        ),

        TableEvent::FiltersApplied(filters) => Transition::to(TableState {
            filters: filters.clone(),
            selection: SelectionState::None,
            ..state.clone()
        }),

        TableEvent::ColumnsReordered(order) => Transition::to(TableState {
            column_order: Some(order.clone()),
            ..state.clone()
        }),

        TableEvent::CompactModeChanged(mode) => Transition::to(TableState {
            compact_mode: *mode,
            ..state.clone()
        }),

        TableEvent::MultiRowSelectionToggled(enabled) => {
            if *enabled == state.multi_row_selection {
                return Transition::unchanged(state);
            }
            Transition::to(TableState {
                multi_row_selection: *enabled,
                selection: state.selection.set_multi_row(*enabled),
                ..state.clone()
            })
        }

        TableEvent::ViewportResized(viewport) => Transition::to(TableState {
            viewport: *viewport,
            ..state.clone()
        }),

        TableEvent::ColumnActionClicked(action) => {
            let known = state.column_actions.iter().any(|a| &a.id == action);
            Transition::unchanged(state).notify_if(
                known,
                Notification::ColumnActionTriggered {
                    action: action.clone(),
                },
            )
        }
    }
}

/// Selection is only dropped on a page change when the host listens for it
fn change_page(state: &TableState, page_no: usize, next: bool) -> Transition {
    let bound = state.triggers.on_page_change;
    let selection = if bound {
        SelectionState::None
    } else {
        state.selection.clone()
    };
    Transition::to(TableState {
        page_no: Some(page_no),
        selection,
        ..state.clone()
    })
    .notify_if(bound, Notification::PageChanged { next, page_no })
}
