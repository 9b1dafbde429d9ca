use crate::tui::session::Session;
use crate::tui::theme::Theme;
use risteys_plot_common::Config;
use risteys_plot_core::payload::read_messages;
use risteys_plot_core::search::FocusTarget;
use risteys_plot_core::surface::Surface;
use risteys_plot_core::{ActionRegistry, Applied, PageState};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Plots,
    Help,
    CompBoxes,
}

pub struct App {
    pub page_path: String,
    pub state: PageState,
    pub actions: ActionRegistry,
    pub view: View,
    pub selected: usize, // index of the surface on screen
    pub debug_grid: bool,
    pub help_scroll: u16,
    pub status_msg: String,
    pub should_quit: bool,
    pub config: Config,
    pub theme: Theme,
    pub messages_path: Option<PathBuf>,
    pub messages_applied: usize,
    pub watch_rx: Option<std::sync::mpsc::Receiver<()>>, // reload events from filesystem watcher
}

impl App {
    pub fn new(page_path: String, state: PageState, config: Config) -> Self {
        Self {
            page_path,
            state,
            actions: ActionRegistry::default(),
            view: View::Plots,
            selected: 0,
            debug_grid: config.display.debug_grid,
            help_scroll: 0,
            status_msg: String::new(),
            should_quit: false,
            theme: Theme::from_name(&config.display.theme),
            config,
            messages_path: None,
            messages_applied: 0,
            watch_rx: None,
        }
    }

    pub fn current(&self) -> Option<&Surface> {
        self.state.surfaces.at(self.selected)
    }

    pub fn current_mut(&mut self) -> Option<&mut Surface> {
        self.state.surfaces.at_mut(self.selected)
    }

    pub fn current_mount(&self) -> Option<String> {
        self.current().map(|s| s.mount().to_string())
    }

    pub fn next_surface(&mut self) {
        let n = self.state.surfaces.len();
        if n > 0 {
            self.leave_current();
            self.selected = (self.selected + 1) % n;
        }
    }

    pub fn prev_surface(&mut self) {
        let n = self.state.surfaces.len();
        if n > 0 {
            self.leave_current();
            self.selected = (self.selected + n - 1) % n;
        }
    }

    fn leave_current(&mut self) {
        if let Some(s) = self.current_mut() {
            s.pointer_leave();
        }
    }

    pub fn search_focused(&self) -> bool {
        self.state.focus == FocusTarget::SearchInput
    }

    /// Run a named action against the page, reporting failures in the status bar.
    pub fn invoke(&mut self, action: &str, arg: &str) {
        if let Err(e) = self.actions.invoke(action, &mut self.state, arg) {
            self.status_msg = format!("{action}: {e}");
        }
    }

    pub fn to_session(&self) -> Session {
        Session {
            page_path: self.page_path.clone(),
            selected_mount: self.current_mount(),
            debug_grid: self.debug_grid,
        }
    }

    /// Restore the selection saved for this page; sessions of other pages are ignored.
    pub fn restore(&mut self, session: &Session) {
        if session.page_path != self.page_path {
            return;
        }
        if let Some(idx) = session.selected_mount.as_deref().and_then(|m| self.state.surfaces.index_of(m)) {
            self.selected = idx;
        }
        self.debug_grid = session.debug_grid;
    }

    /// Apply messages appended to the messages file since the last read.
    /// The file is append-only, so already-applied lines are skipped.
    pub fn pump_messages(&mut self) {
        let Some(path) = &self.messages_path else {
            return;
        };
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                self.status_msg = format!("messages: {e}");
                return;
            }
        };
        let msgs = match read_messages(&text) {
            Ok(m) => m,
            Err(e) => {
                self.status_msg = format!("messages: {e}");
                return;
            }
        };
        if msgs.len() < self.messages_applied {
            self.messages_applied = 0; // file was truncated, replay
        }
        let mut bound = 0;
        for msg in &msgs[self.messages_applied..] {
            if let Applied::Bound(_) = self.state.apply(msg) {
                bound += 1;
            }
        }
        let fresh = msgs.len() - self.messages_applied;
        self.messages_applied = msgs.len();
        if fresh > 0 {
            self.status_msg = format!("{fresh} message(s), {bound} panel update(s)");
        }
        if self.selected >= self.state.surfaces.len() {
            self.selected = 0;
        }
    }
}

#[cfg(test)]
mod tests_app {
    use super::*;
    use risteys_plot_core::{DisplayMode, Page, PlotSettings};
    use std::io::Write;

    #[test]
    fn pump_applies_only_new_lines() {
        let mut tmp = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
        writeln!(
            tmp,
            r#"{{"event":"data_age_histogram_FG","payload":{{"data":[{{"interval":{{"left":0,"right":10}},"count":4}}]}}}}"#
        )
        .unwrap();
        let mut app = App::new("page.json".into(), PageState::new(PlotSettings::default(), 20), Config::default());
        app.messages_path = Some(tmp.path().to_path_buf());
        app.pump_messages();
        assert_eq!(app.messages_applied, 1);
        assert_eq!(app.state.surfaces.len(), 1);
        writeln!(tmp, r#"{{"event":"results","payload":{{"body":{{"results":[{{"name":"AB1"}}]}}}}}}"#).unwrap();
        app.pump_messages();
        assert_eq!(app.messages_applied, 2);
        assert_eq!(app.state.search.results.len(), 1);
    }

    #[test]
    fn session_restores_selection_not_mode() {
        let page: Page = serde_json::from_value(serde_json::json!({
            "panels": [
                {"mount": "bin-plot-age-FG", "kind": "discrete", "cumulative_toggle": true,
                 "data": [{"name": "0-9", "value": 2}, {"name": "10-19", "value": 6}]},
                {"mount": "bin-plot-year-FG", "kind": "discrete", "cumulative_toggle": true,
                 "data": [{"name": "2000", "value": 2}, {"name": "2001", "value": 6}]}
            ]
        }))
        .unwrap();
        let state = PageState::from_page(&page, PlotSettings::default(), 20);
        let mut app = App::new("page.json".into(), state.clone(), Config::default());
        app.next_surface();
        app.invoke("showCumulative", "bin-plot-year-FG");
        assert_eq!(app.current().map(|s| s.mode()), Some(DisplayMode::Cumulative));
        let saved = app.to_session();
        assert_eq!(saved.selected_mount.as_deref(), Some("bin-plot-year-FG"));

        let json = serde_json::to_string(&saved).unwrap();
        let saved: Session = serde_json::from_str(&json).unwrap();

        // full reload: state rebuilt from the page
        let reloaded = PageState::from_page(&page, PlotSettings::default(), 20);
        let mut fresh = App::new("page.json".into(), reloaded, Config::default());
        fresh.restore(&saved);
        assert_eq!(fresh.selected, 1);
        assert_eq!(fresh.current().map(|s| s.mode()), Some(DisplayMode::PerPeriod));

        let mut other = App::new("other.json".into(), state, Config::default());
        other.restore(&saved);
        assert_eq!(other.selected, 0);
    }

    #[test]
    fn surface_cycling_wraps() {
        let mut app = App::new("p".into(), PageState::new(PlotSettings::default(), 20), Config::default());
        app.next_surface();
        assert_eq!(app.selected, 0);
        assert!(app.current().is_none());
    }
}
