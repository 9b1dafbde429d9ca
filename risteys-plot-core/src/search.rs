use crate::payload::SearchHit;

/// What currently holds keyboard focus on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    #[default]
    Page,
    SearchInput,
    /// Some other text input or textarea.
    TextField,
}

impl FocusTarget {
    pub fn is_text_entry(self) -> bool {
        matches!(self, Self::SearchInput | Self::TextField)
    }
}

/// The shortcut key only steals focus when the user is not typing somewhere.
pub fn shortcut_focuses(key: char, shortcut: char, focus: FocusTarget) -> bool {
    key == shortcut && !focus.is_text_entry()
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub selected: Option<usize>,
    pub focused: bool,
    pub max_results: usize,
}

impl SearchState {
    pub fn new(max_results: usize) -> Self {
        Self { max_results, ..Self::default() }
    }

    pub fn selected_hit(&self) -> Option<&SearchHit> {
        self.selected.and_then(|i| self.results.get(i))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchMsg {
    Input(char),
    Backspace,
    Results(Vec<SearchHit>),
    Next,
    Prev,
    Focus,
    Blur,
}

/// Query text to send to the search backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest(pub String);

pub fn update(mut state: SearchState, msg: SearchMsg) -> (SearchState, Option<SearchRequest>) {
    let mut request = None;
    match msg {
        SearchMsg::Input(c) => {
            state.query.push(c);
            request = Some(SearchRequest(state.query.clone()));
        }
        SearchMsg::Backspace => {
            if state.query.pop().is_some() {
                request = Some(SearchRequest(state.query.clone()));
            }
        }
        SearchMsg::Results(mut hits) => {
            if state.max_results > 0 {
                hits.truncate(state.max_results);
            }
            state.selected = if hits.is_empty() { None } else { Some(0) };
            state.results = hits;
        }
        SearchMsg::Next => {
            if !state.results.is_empty() {
                state.selected = Some(state.selected.map_or(0, |i| (i + 1) % state.results.len()));
            }
        }
        SearchMsg::Prev => {
            if !state.results.is_empty() {
                let n = state.results.len();
                state.selected = Some(state.selected.map_or(n - 1, |i| (i + n - 1) % n));
            }
        }
        SearchMsg::Focus => state.focused = true,
        SearchMsg::Blur => state.focused = false,
    }
    (state, request)
}
