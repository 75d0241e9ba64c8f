//! Table state management
//!
//! An immutable [`table_state::TableState`], the events that change it, the
//! pure reducer, and the store that queues events on a single thread.

pub mod events;
pub mod reducer;
pub mod selection;
pub mod store;
pub mod table_state;
