//! Single-threaded event queue around the reducer

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::Config;
use crate::data::column::ColumnDefinition;
use crate::data::table_view::PageView;
use crate::pagination::SizeTable;
use crate::state::events::{Notification, TableEvent};
use crate::state::reducer::reduce;
use crate::state::table_state::TableState;
use crate::utils::debouncer::Debouncer;

/// Trait for components that receive the table's upward notifications
pub trait TableSubscriber {
    /// Handle a notification; `state` is the state after the event
    fn on_notification(&mut self, notification: &Notification, state: &TableState);

    /// Get subscriber name for debugging
    fn name(&self) -> &str;
}

/// Owns the current state and applies events in FIFO order.
///
/// Each event is committed in two phases: the reducer's new state is
/// applied first, then its follow-up events are appended to the back of the
/// queue and run after everything already waiting.
pub struct TableStore {
    state: TableState,

    queue: VecDeque<TableEvent>,

    subscribers: Vec<Box<dyn TableSubscriber>>,

    /// Event history for debugging
    event_history: VecDeque<TableEvent>,

    /// Maximum event history size
    max_history: usize,

    sizes: SizeTable,

    search_debouncer: Debouncer<String>,

    column_edit_debouncer: Debouncer<Vec<ColumnDefinition>>,
}

impl TableStore {
    pub fn new(state: TableState) -> Self {
        Self::with_config(state, &Config::default())
    }

    pub fn with_config(state: TableState, config: &Config) -> Self {
        Self {
            state,
            queue: VecDeque::new(),
            subscribers: Vec::new(),
            event_history: VecDeque::new(),
            max_history: 100,
            sizes: config.table_sizes,
            search_debouncer: Debouncer::new(config.behavior.search_debounce_ms),
            column_edit_debouncer: Debouncer::new(config.behavior.style_debounce_ms),
        }
    }

    /// Add a subscriber
    pub fn subscribe(&mut self, subscriber: Box<dyn TableSubscriber>) {
        info!("TableStore: Adding subscriber: {}", subscriber.name());
        self.subscribers.push(subscriber);
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn sizes(&self) -> &SizeTable {
        &self.sizes
    }

    /// Queue an event without running it
    pub fn enqueue(&mut self, event: TableEvent) {
        self.queue.push_back(event);
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Queue an event and run the queue until it is empty
    pub fn dispatch(&mut self, event: TableEvent) {
        self.enqueue(event);
        self.run_until_idle();
    }

    /// Run queued events, including follow-ups they produce
    pub fn run_until_idle(&mut self) {
        while self.process_next() {}
    }

    /// Apply the next queued event; false when the queue was empty
    pub fn process_next(&mut self) -> bool {
        let Some(event) = self.queue.pop_front() else {
            return false;
        };
        debug!("TableStore: Applying event: {:?}", event);

        self.event_history.push_back(event.clone());
        if self.event_history.len() > self.max_history {
            self.event_history.pop_front();
        }

        // Phase 1: commit the new state
        let transition = reduce(&self.state, &event);
        self.state = transition.state;

        // Phase 2: follow-ups run later, from the queue
        for follow_up in transition.follow_ups {
            debug!("TableStore: Deferring follow-up: {:?}", follow_up);
            self.queue.push_back(follow_up);
        }

        for notification in &transition.notifications {
            for subscriber in &mut self.subscribers {
                debug!(
                    "TableStore: Notifying subscriber {}: {:?}",
                    subscriber.name(),
                    notification
                );
                subscriber.on_notification(notification, &self.state);
            }
        }
        true
    }

    /// Record a keystroke in the search box; the search only runs once the
    /// typing settles (see [`TableStore::tick_at`])
    pub fn type_search_text_at(&mut self, text: impl Into<String>, now: Instant) {
        self.search_debouncer.trigger_at(text.into(), now);
    }

    pub fn type_search_text(&mut self, text: impl Into<String>) {
        self.type_search_text_at(text, Instant::now());
    }

    /// Record an in-progress column style edit (label, color, alignment)
    pub fn edit_columns_at(&mut self, columns: Vec<ColumnDefinition>, now: Instant) {
        self.column_edit_debouncer.trigger_at(columns, now);
    }

    /// Release debounced input whose window has elapsed; true if an event ran
    pub fn tick_at(&mut self, now: Instant) -> bool {
        let mut ran = false;
        if let Some(text) = self.search_debouncer.poll_at(now) {
            self.dispatch(TableEvent::SearchTextChanged(text));
            ran = true;
        }
        if let Some(columns) = self.column_edit_debouncer.poll_at(now) {
            self.dispatch(TableEvent::PrimaryColumnsUpdated(columns));
            ran = true;
        }
        ran
    }

    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Apply pending search text right away
    pub fn flush_search(&mut self) {
        if let Some(text) = self.search_debouncer.flush() {
            self.dispatch(TableEvent::SearchTextChanged(text));
        }
    }

    /// The current page, computed from scratch
    pub fn page_view(&self) -> PageView {
        self.state.page_view(&self.sizes)
    }

    /// Get event history for debugging
    pub fn event_history(&self) -> impl Iterator<Item = &TableEvent> {
        self.event_history.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::row::rows_from_json;
    use crate::state::table_state::TriggerBindings;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    struct Recorder {
        seen: Rc<RefCell<Vec<Notification>>>,
    }

    impl TableSubscriber for Recorder {
        fn on_notification(&mut self, notification: &Notification, _state: &TableState) {
            self.seen.borrow_mut().push(notification.clone());
        }

        fn name(&self) -> &str {
            "recorder"
        }
    }

    fn store() -> TableStore {
        TableStore::new(TableState {
            triggers: TriggerBindings::all(),
            ..TableState::new(rows_from_json(&json!([
                {"name": "Ross", "age": 30},
                {"name": "Joey", "age": 31}
            ])))
        })
    }

    #[test]
    fn test_follow_up_runs_after_queued_events() {
        let mut store = store();
        store.enqueue(TableEvent::Mounted);
        store.enqueue(TableEvent::RowClicked(0));

        assert!(store.process_next());
        // Mounted deferred the derivation behind the queued click
        assert!(store.state().primary_columns.is_none());
        assert_eq!(store.pending_events(), 2);

        assert!(store.process_next());
        assert!(store.state().primary_columns.is_none());

        assert!(store.process_next());
        assert_eq!(store.state().primary_columns.as_ref().map(Vec::len), Some(2));
        assert!(!store.process_next());
    }

    #[test]
    fn test_subscribers_receive_notifications() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = store();
        store.subscribe(Box::new(Recorder { seen: seen.clone() }));
        store.dispatch(TableEvent::RowClicked(1));
        assert_eq!(*seen.borrow(), vec![Notification::RowSelected { index: 1 }]);
    }

    #[test]
    fn test_debounced_search() {
        let start = Instant::now();
        let mut store = store();
        store.type_search_text_at("j", start);
        store.type_search_text_at("jo", start + Duration::from_millis(100));
        assert!(!store.tick_at(start + Duration::from_millis(200)));
        assert_eq!(store.state().search_text, "");

        assert!(store.tick_at(start + Duration::from_millis(450)));
        assert_eq!(store.state().search_text, "jo");
        assert_eq!(store.page_view().total_rows, 1);
        assert!(!store.tick_at(start + Duration::from_secs(5)));
    }

    #[test]
    fn test_column_edits_use_the_style_window() {
        let start = Instant::now();
        let mut store = store();
        store.dispatch(TableEvent::RegenerateColumns);
        let mut columns = store.state().primary_columns.clone().unwrap();
        columns[0].label = "N".into();
        store.edit_columns_at(columns.clone(), start);
        columns[0].label = "Name".into();
        store.edit_columns_at(columns, start + Duration::from_millis(200));

        assert!(!store.tick_at(start + Duration::from_millis(900)));
        assert!(store.tick_at(start + Duration::from_millis(1200)));
        assert_eq!(store.state().primary_columns.as_ref().unwrap()[0].label, "Name");
    }

    #[test]
    fn test_history_is_bounded() {
        let mut store = store();
        for i in 0..150 {
            store.dispatch(TableEvent::RowClicked(i));
        }
        assert_eq!(store.event_history().count(), 100);
    }
}
