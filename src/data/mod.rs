//! Data-shaping pipeline
//!
//! Raw rows and column configuration go in; sorted, filtered, paged and
//! formatted display strings come out.

pub mod cell_format;
pub mod column;
pub mod date_format;
pub mod filter;
pub mod row;
pub mod sort;
pub mod table_view;
