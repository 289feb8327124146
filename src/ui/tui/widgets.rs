use ratatui::widgets::{ListState, TableState};

pub(super) fn list_state(selected: Option<usize>) -> ListState {
    let mut st = ListState::default();
    st.select(selected);
    st
}

pub(super) fn table_state(selected: Option<usize>) -> TableState {
    let mut st = TableState::default();
    st.select(selected);
    st
}
