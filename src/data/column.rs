use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::data::cell_format::format_cell;
use crate::data::row::{all_column_keys, Row};
use crate::data::sort::SortSpec;

pub const DEFAULT_COLUMN_WIDTH: u32 = 150;
pub const MIN_COLUMN_WIDTH: u32 = 60;
pub const ACTIONS_COLUMN_ID: &str = "actions";
pub const DEFAULT_TEXT_COLOR: &str = "#231F20";

/// Declared display type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Currency,
    Date,
    Time,
    Image,
    Video,
}

impl ColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Number | ColumnType::Currency)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::Time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CellAlignment {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerticalAlignment {
    Top,
    Bottom,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TextStyle {
    Heading,
    Label,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FontStyle {
    Bold,
    Italic,
    Normal,
}

/// Layout properties handed to the presentation layer with every cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_alignment: Option<CellAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_alignment: Option<VerticalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_style: Option<TextStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

/// Input and output patterns of a column.
///
/// For CURRENCY columns `output` holds the currency symbol. For DATE columns
/// `input` may be one of the epoch sentinels and `output` may be
/// [`crate::data::date_format::SAME_AS_INPUT`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default)]
    pub output: String,
}

fn default_true() -> bool {
    true
}

fn default_width() -> u32 {
    DEFAULT_COLUMN_WIDTH
}

/// User-editable column configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub id: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default)]
    pub index: usize,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ColumnFormat>,
    #[serde(flatten)]
    pub cell_style: CellStyle,
    #[serde(default)]
    pub is_derived: bool,
    #[serde(default = "default_true")]
    pub enable_filter: bool,
    #[serde(default = "default_true")]
    pub enable_sort: bool,
}

impl ColumnDefinition {
    /// Default properties for a column inferred from the data
    pub fn new(id: impl Into<String>, index: usize) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            column_type: ColumnType::Text,
            is_visible: true,
            index,
            width: DEFAULT_COLUMN_WIDTH,
            format: None,
            cell_style: CellStyle {
                horizontal_alignment: Some(CellAlignment::Left),
                vertical_alignment: Some(VerticalAlignment::Center),
                text_style: Some(TextStyle::Body),
                font_style: Some(FontStyle::Normal),
                text_color: Some(DEFAULT_TEXT_COLOR.to_string()),
            },
            is_derived: false,
            enable_filter: true,
            enable_sort: true,
        }
    }

    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    pub fn with_format(mut self, input: Option<&str>, output: &str) -> Self {
        self.format = Some(ColumnFormat {
            input: input.map(str::to_string),
            output: output.to_string(),
        });
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.is_visible = visible;
        self
    }

    pub fn derived(mut self) -> Self {
        self.is_derived = true;
        self
    }

    pub fn output_format(&self) -> &str {
        self.format.as_ref().map(|f| f.output.as_str()).unwrap_or("")
    }

    pub fn input_format(&self) -> &str {
        self.format
            .as_ref()
            .and_then(|f| f.input.as_deref())
            .unwrap_or("")
    }
}

/// One column per distinct key across all rows, in first-seen order
pub fn derive_columns(rows: &[Row]) -> Vec<ColumnDefinition> {
    let columns: Vec<ColumnDefinition> = all_column_keys(rows)
        .into_iter()
        .enumerate()
        .map(|(index, key)| ColumnDefinition::new(key, index))
        .collect();
    debug!("Derived {} columns from {} rows", columns.len(), rows.len());
    columns
}

/// True when the key set of `columns` no longer matches the data's key set
pub fn columns_drifted(columns: &[ColumnDefinition], rows: &[Row]) -> bool {
    let keys = all_column_keys(rows);
    if keys.len() != columns.len() {
        return true;
    }
    !keys.iter().all(|key| columns.iter().any(|c| &c.id == key))
}

/// Whether hidden columns stay on screen (editor) or are dropped (published)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RenderMode {
    #[default]
    Canvas,
    Page,
}

/// A button rendered in the actions column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnAction {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub dynamic_trigger: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedKind {
    Data {
        column_type: ColumnType,
        output_format: String,
        input_format: String,
        cell_style: CellStyle,
    },
    Actions,
}

/// A column as handed to the grid: header, accessor and cell formatting
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumn {
    pub accessor: String,
    pub header: String,
    pub width: u32,
    pub min_width: u32,
    pub is_hidden: bool,
    pub is_derived: bool,
    pub is_asc_order: Option<bool>,
    pub kind: ResolvedKind,
}

impl ResolvedColumn {
    fn from_definition(def: &ColumnDefinition, sorted: Option<&SortSpec>) -> Self {
        Self {
            accessor: def.id.clone(),
            header: def.label.clone(),
            width: def.width,
            min_width: MIN_COLUMN_WIDTH,
            is_hidden: !def.is_visible,
            is_derived: def.is_derived,
            is_asc_order: sorted.filter(|s| s.column == def.id).map(|s| s.asc),
            kind: ResolvedKind::Data {
                column_type: def.column_type,
                output_format: def.output_format().to_string(),
                input_format: def.input_format().to_string(),
                cell_style: def.cell_style.clone(),
            },
        }
    }

    fn actions(header: String) -> Self {
        Self {
            accessor: ACTIONS_COLUMN_ID.to_string(),
            header,
            width: DEFAULT_COLUMN_WIDTH,
            min_width: MIN_COLUMN_WIDTH,
            is_hidden: false,
            is_derived: false,
            is_asc_order: None,
            kind: ResolvedKind::Actions,
        }
    }

    pub fn column_type(&self) -> Option<ColumnType> {
        match &self.kind {
            ResolvedKind::Data { column_type, .. } => Some(*column_type),
            ResolvedKind::Actions => None,
        }
    }

    pub fn input_format(&self) -> &str {
        match &self.kind {
            ResolvedKind::Data { input_format, .. } => input_format,
            ResolvedKind::Actions => "",
        }
    }

    /// Format one raw cell for display; the actions column has no text
    pub fn format(&self, value: Option<&Value>) -> Option<String> {
        match &self.kind {
            ResolvedKind::Data {
                column_type,
                output_format,
                input_format,
                ..
            } => Some(format_cell(value, *column_type, output_format, input_format)),
            ResolvedKind::Actions => None,
        }
    }
}

/// Inputs that decide which columns are displayed and in what order
#[derive(Debug, Clone, Copy)]
pub struct ColumnResolver<'a> {
    pub primary: &'a [ColumnDefinition],
    pub derived: &'a [ColumnDefinition],
    pub column_order: Option<&'a [String]>,
    pub sorted: Option<&'a SortSpec>,
    pub render_mode: RenderMode,
    pub actions: &'a [ColumnAction],
    pub column_name_map: Option<&'a HashMap<String, String>>,
}

impl<'a> ColumnResolver<'a> {
    pub fn new(primary: &'a [ColumnDefinition]) -> Self {
        Self {
            primary,
            derived: &[],
            column_order: None,
            sorted: None,
            render_mode: RenderMode::Canvas,
            actions: &[],
            column_name_map: None,
        }
    }

    /// Visible columns first, then the actions column, then hidden columns
    /// in canvas mode only
    pub fn resolve(&self) -> Vec<ResolvedColumn> {
        if self.primary.is_empty() {
            return Vec::new();
        }

        let mut all: Vec<&ColumnDefinition> =
            self.primary.iter().chain(self.derived.iter()).collect();
        if let Some(order) = self.column_order {
            // sort_by_key is stable, so unordered ids keep their relative order
            all.sort_by_key(|def| {
                order
                    .iter()
                    .position(|id| id == &def.id)
                    .unwrap_or(usize::MAX)
            });
        }

        let mut columns = Vec::new();
        let mut hidden = Vec::new();
        for def in all {
            let resolved = ResolvedColumn::from_definition(def, self.sorted);
            if resolved.is_hidden {
                hidden.push(resolved);
            } else {
                columns.push(resolved);
            }
        }

        if !self.actions.is_empty() {
            let header = self
                .column_name_map
                .and_then(|m| m.get(ACTIONS_COLUMN_ID))
                .cloned()
                .unwrap_or_else(|| "Actions".to_string());
            columns.push(ResolvedColumn::actions(header));
        }

        if self.render_mode == RenderMode::Canvas {
            columns.extend(hidden);
        }

        columns
    }
}
