use std::collections::BTreeSet;

/// Row selection of the table: nothing, one row, or a set of rows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    None,
    Single(usize),
    Multi(BTreeSet<usize>),
}

impl SelectionState {
    /// Selection after clicking row `index`
    pub fn click(&self, index: usize, multi_row_selection: bool) -> Self {
        if !multi_row_selection {
            return SelectionState::Single(index);
        }
        let mut selected = self.indices();
        if !selected.remove(&index) {
            selected.insert(index);
        }
        SelectionState::Multi(selected)
    }

    /// Selection after toggling multi-row mode
    pub fn set_multi_row(&self, enabled: bool) -> Self {
        match (self, enabled) {
            (SelectionState::Single(index), true) => {
                SelectionState::Multi(BTreeSet::from([*index]))
            }
            (SelectionState::None, true) => SelectionState::Multi(BTreeSet::new()),
            (SelectionState::Multi(_), true) => self.clone(),
            (_, false) => SelectionState::None,
        }
    }

    /// Index reported for single selection; -1 when none
    pub fn selected_row_index(&self) -> i64 {
        match self {
            SelectionState::Single(index) => *index as i64,
            _ => -1,
        }
    }

    /// Indices reported for multi selection
    pub fn indices(&self) -> BTreeSet<usize> {
        match self {
            SelectionState::Multi(set) => set.clone(),
            _ => BTreeSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SelectionState::None => true,
            SelectionState::Single(_) => false,
            SelectionState::Multi(set) => set.is_empty(),
        }
    }
}
