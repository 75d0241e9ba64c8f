use serde_json::json;
use std::sync::Arc;
use chrono::{TimeZone, Utc};
use table_pipeline::data::cell_format::{format_cell, INVALID_VALUE};
use table_pipeline::data::date_format::DatePattern;
use table_pipeline::data::column::{ColumnDefinition, ColumnType};
use table_pipeline::data::filter::filter_indices;
use table_pipeline::data::row::{rows_from_json, Row};
use table_pipeline::data::table_view::TableView;
use table_pipeline::pagination::{CompactMode, SizeTable, TableSizes};
use table_pipeline::state::reducer::reduce;
use table_pipeline::state::table_state::Viewport;
use table_pipeline::{
    Condition, FilterOperator, FilterPredicate, SortSpec, TableEvent, TableState,
};

fn friends() -> Vec<Row> {
    rows_from_json(&json!([
        {"id": 1, "name": "Ross", "email": "ross@central.perk", "salary": 4000, "joined": "2019-05-01"},
        {"id": 2, "name": "Monica", "email": "monica@boss.com", "salary": 5200, "joined": "2018-11-21"},
        {"id": 3, "name": "Joey", "email": "joey@actors.org", "salary": "abc", "joined": "2020-01-15"},
        {"id": 4, "name": "Chandler", "email": "chandler@boss.com", "salary": 4800, "joined": ""},
        {"id": 5, "name": "Phoebe", "email": "phoebe@central.perk", "salary": 3100, "joined": "2017-07-04"}
    ]))
}

fn state_with(columns: Vec<ColumnDefinition>) -> TableState {
    TableState {
        primary_columns: Some(columns),
        viewport: Viewport::new(800.0, 480.0),
        ..TableState::new(friends())
    }
}

fn apply(state: TableState, events: Vec<TableEvent>) -> TableState {
    events
        .iter()
        .fold(state, |state, event| reduce(&state, event).state)
}

#[test]
fn test_currency_column_marks_non_numeric_cells() {
    let columns = vec![
        ColumnDefinition::new("name", 0),
        ColumnDefinition::new("salary", 1)
            .with_type(ColumnType::Currency)
            .with_format(None, "$"),
    ];
    let page = state_with(columns).page_view(&SizeTable::default());

    assert_eq!(page.cell(0, "salary"), Some("$4000"));
    assert_eq!(page.cell(2, "salary"), Some(INVALID_VALUE));
    assert_eq!(page.cell(4, "salary"), Some("$3100"));
}

#[test]
fn test_date_column_renders_output_pattern() {
    let columns = vec![ColumnDefinition::new("joined", 0)
        .with_type(ColumnType::Date)
        .with_format(Some("YYYY-MM-DD"), "DD/MM/YYYY")];
    let page = state_with(columns).page_view(&SizeTable::default());

    assert_eq!(page.cell(0, "joined"), Some("01/05/2019"));
    assert_eq!(page.cell(3, "joined"), Some(""));
}

#[test]
fn test_date_columns_reformat_their_own_output() {
    let original = Utc.with_ymd_and_hms(2021, 3, 2, 14, 5, 0).unwrap();
    for pattern in [
        "YYYY-MM-DD",
        "DD/MM/YYYY HH:mm",
        "Do MMM YYYY",
        "LLL",
        "h:mm A",
        "MMMM YYYY",
        "YYYY-MM",
        "DD/MM",
        "MMM D",
        "YYYY",
    ] {
        let direct = DatePattern::compile(pattern).format(&original);
        let reformatted = format_cell(Some(&json!(direct)), ColumnType::Date, pattern, pattern);
        assert_eq!(reformatted, direct, "pattern {}", pattern);
    }
}

#[test]
fn test_whole_float_cells_render_without_fraction() {
    let rows = rows_from_json(&json!([{"qty": 30.0, "price": 12.50}]));
    let state = TableState {
        primary_columns: Some(vec![
            ColumnDefinition::new("qty", 0).with_type(ColumnType::Number),
            ColumnDefinition::new("price", 1)
                .with_type(ColumnType::Currency)
                .with_format(None, "$"),
        ]),
        viewport: Viewport::new(800.0, 480.0),
        ..TableState::new(rows)
    };
    let page = state.page_view(&SizeTable::default());
    assert_eq!(page.cell(0, "qty"), Some("30"));
    assert_eq!(page.cell(0, "price"), Some("$12.5"));
}

#[test]
fn test_search_matches_any_cell_case_insensitively() {
    let state = apply(
        state_with(Vec::new()),
        vec![
            TableEvent::RegenerateColumns,
            TableEvent::PageNumberSet(3),
            TableEvent::SearchTextChanged("OSS".into()),
        ],
    );
    let page = state.page_view(&SizeTable::default());

    // "Ross" and both boss.com addresses
    assert_eq!(page.total_rows, 3);
    assert_eq!(page.page_no, 1);
    let names: Vec<_> = (0..page.rows.len())
        .filter_map(|i| page.cell(i, "name"))
        .collect();
    assert_eq!(names, vec!["Ross", "Monica", "Chandler"]);
}

#[test]
fn test_multi_select_toggle_keeps_single_selection() {
    let state = apply(
        state_with(Vec::new()),
        vec![
            TableEvent::RowClicked(2),
            TableEvent::MultiRowSelectionToggled(true),
            TableEvent::RowClicked(4),
        ],
    );
    let page = state.page_view(&SizeTable::default());
    assert_eq!(page.selected_row_indices, vec![2, 4]);
    assert_eq!(page.selected_rows.len(), 2);
    assert_eq!(page.selected_rows[1]["name"], json!("Phoebe"));

    let state = apply(state, vec![TableEvent::MultiRowSelectionToggled(false)]);
    let page = state.page_view(&SizeTable::default());
    assert_eq!(page.selected_row_index, -1);
    assert!(page.selected_row_indices.is_empty());
}

#[test]
fn test_new_data_resets_selection_and_columns() {
    let state = apply(
        state_with(vec![ColumnDefinition::new("name", 0)]),
        vec![TableEvent::RowClicked(1)],
    );
    let next = reduce(
        &state,
        &TableEvent::TableDataChanged(rows_from_json(&json!([{"city": "NYC"}]))),
    );
    assert!(next.state.selection.is_empty());
    assert_eq!(next.follow_ups, vec![TableEvent::RegenerateColumns]);

    let regenerated = reduce(&next.state, &TableEvent::RegenerateColumns).state;
    let ids: Vec<_> = regenerated
        .primary_columns
        .unwrap_or_default()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec!["city"]);
}

#[test]
fn test_selected_row_is_empty_template_without_selection() {
    let page = state_with(Vec::new()).page_view(&SizeTable::default());
    assert_eq!(page.selected_row_index, -1);
    assert_eq!(page.selected_row.len(), 5);
    assert!(page.selected_row.values().all(|v| v.is_null()));
}

#[test]
fn test_sort_is_stable_and_reversible() {
    let rows = rows_from_json(&json!([
        {"team": "b", "n": 1},
        {"team": "a", "n": 2},
        {"team": "b", "n": 3},
        {"team": "a", "n": 4}
    ]));
    let state = TableState {
        viewport: Viewport::new(0.0, 480.0),
        ..TableState::new(rows)
    };
    let asc = apply(
        state.clone(),
        vec![TableEvent::ColumnSortClicked {
            column: "team".into(),
            asc: true,
        }],
    );
    let order: Vec<_> = asc
        .filtered_table_data()
        .iter()
        .map(|r| r["n"].clone())
        .collect();
    assert_eq!(order, vec![json!(2), json!(4), json!(1), json!(3)]);

    let cleared = apply(
        asc,
        vec![TableEvent::ColumnSortClicked {
            column: String::new(),
            asc: true,
        }],
    );
    assert!(cleared.sorted_column.is_none());
    assert_eq!(cleared.filtered_table_data(), *state.table_data);
}

#[test]
fn test_numeric_sort_puts_invalid_values_last() {
    let columns = vec![ColumnDefinition::new("salary", 0).with_type(ColumnType::Number)];
    let state = apply(
        state_with(columns),
        vec![TableEvent::ColumnSortClicked {
            column: "salary".into(),
            asc: true,
        }],
    );
    let salaries: Vec<_> = state
        .filtered_table_data()
        .iter()
        .map(|r| r["salary"].clone())
        .collect();
    assert_eq!(
        salaries,
        vec![json!(3100), json!(4000), json!(4800), json!(5200), json!("abc")]
    );
}

#[test]
fn test_filters_combine_with_operator_of_second_predicate() {
    let rows = friends();
    let all: Vec<usize> = (0..rows.len()).collect();
    let boss = FilterPredicate::new("email", Condition::EndsWith, json!("boss.com"));
    let rich = FilterPredicate::new("salary", Condition::GreaterThan, json!(5000));

    let and = vec![boss.clone(), rich.clone().with_operator(FilterOperator::And)];
    assert_eq!(filter_indices(&rows, &all, "", &and), vec![1]);

    let or = vec![boss, rich.with_operator(FilterOperator::Or)];
    assert_eq!(filter_indices(&rows, &all, "", &or), vec![1, 3]);

    assert_eq!(filter_indices(&rows, &all, "", &[]), all);
}

#[test]
fn test_filtering_is_idempotent() {
    let rows = friends();
    let all: Vec<usize> = (0..rows.len()).collect();
    let filters = vec![FilterPredicate::new("joined", Condition::IsAfter, json!("2018-01-01"))];
    let once = filter_indices(&rows, &all, "o", &filters);
    let twice = filter_indices(&rows, &once, "o", &filters);
    assert_eq!(once, twice);
    assert_eq!(once, vec![0, 1, 2]);
}

#[test]
fn test_page_slicing() {
    let rows: Vec<Row> = (0..25)
        .flat_map(|i| rows_from_json(&json!([{ "n": i }])))
        .collect();
    let view = TableView::new(Arc::new(rows), Vec::new());
    let page = view.page_view(3, 10, false, &Default::default());
    assert_eq!(page.rows.len(), 5);
    assert_eq!(page.rows[0].index, 20);

    let server = view.page_view(3, 10, true, &Default::default());
    assert_eq!(server.rows.len(), 25);
}

#[test]
fn test_page_size_grows_with_height() {
    let sizes = SizeTable::default();
    for mode in [CompactMode::Short, CompactMode::Default, CompactMode::Tall] {
        let table: &TableSizes = sizes.get(mode);
        let mut last = 0;
        for height in (0..2000).step_by(7) {
            let size = table.page_size(height as f64);
            assert!(size >= last, "{:?} shrank at {}", mode, height);
            last = size;
        }
    }
    assert_eq!(sizes.get(CompactMode::Default).page_size(480.0), 10);
    assert_eq!(sizes.get(CompactMode::Tall).page_size(50.0), 0);
}

#[test]
fn test_sort_spec_marks_header() {
    let state = apply(
        state_with(vec![ColumnDefinition::new("name", 0), ColumnDefinition::new("id", 1)]),
        vec![TableEvent::ColumnSortClicked {
            column: "id".into(),
            asc: false,
        }],
    );
    let columns = state.resolved_columns();
    assert_eq!(columns[0].is_asc_order, None);
    assert_eq!(columns[1].is_asc_order, Some(false));
    assert_eq!(state.sorted_column, Some(SortSpec::new("id", false)));
}
