pub mod config;
pub mod data;
pub mod pagination;
pub mod state;
pub mod utils;

pub use config::Config;
pub use data::column::{ColumnDefinition, ColumnType};
pub use data::filter::{Condition, FilterOperator, FilterPredicate};
pub use data::row::Row;
pub use data::sort::SortSpec;
pub use data::table_view::PageView;
pub use pagination::CompactMode;
pub use state::events::{Notification, TableEvent};
pub use state::store::TableStore;
pub use state::table_state::TableState;
