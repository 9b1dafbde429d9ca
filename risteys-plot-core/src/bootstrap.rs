//! Page state: surfaces built from a page document, then kept current by
//! channel messages.

use crate::compbox::{compbox_geometry, CompBoxGeometry, CompBoxInput};
use crate::payload::{exclusion, panel_data, route, search_hits, ChannelMessage, Dataset, Page, Route};
use crate::search::{update, FocusTarget, SearchMsg, SearchRequest, SearchState};
use crate::surface::{PanelSpec, PlotSettings, Surface, SurfaceRegistry};
use risteys_plot_common::Result;
use serde_json::Value;
use std::collections::BTreeSet;

/// Outcome of applying one channel message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Bound(String),
    Search,
    Excluded,
    Dropped,
}

#[derive(Debug, Clone)]
pub struct PageState {
    pub title: String,
    pub surfaces: SurfaceRegistry,
    pub search: SearchState,
    pub focus: FocusTarget,
    pub open_dialogs: BTreeSet<String>,
    pub compboxes: Vec<(String, CompBoxGeometry)>,
    /// Set once the backend reports that FinRegistry panels must not load.
    pub excluded: Option<String>,
    /// Latest query not yet sent; a newer keystroke replaces it.
    pending_request: Option<SearchRequest>,
    settings: PlotSettings,
}

impl PageState {
    pub fn new(settings: PlotSettings, max_results: usize) -> Self {
        Self {
            title: String::new(),
            surfaces: SurfaceRegistry::new(),
            search: SearchState::new(max_results),
            focus: FocusTarget::Page,
            open_dialogs: BTreeSet::new(),
            compboxes: Vec::new(),
            excluded: None,
            pending_request: None,
            settings,
        }
    }

    /// Mount every panel of the page. A panel whose inline data fails to
    /// decode is logged and left unmounted.
    pub fn from_page(page: &Page, settings: PlotSettings, max_results: usize) -> Self {
        let mut state = Self::new(settings, max_results);
        state.title = page.title.clone();
        for panel in &page.panels {
            let mut surface = Surface::new(panel.spec.clone(), state.settings.clone());
            if let Some(data) = &panel.data {
                if let Err(e) = bind_value(&mut surface, data.clone()) {
                    log::warn!("{}: panel not mounted: {e}", panel.spec.mount);
                    continue;
                }
            }
            state.surfaces.insert(surface);
        }
        let layout = &state.settings.layout.compbox;
        for spec in &page.compboxes {
            let input = match (spec.summary, spec.value) {
                (Some(s), _) => CompBoxInput::Summary(s),
                (None, Some(v)) => CompBoxInput::Binned(v),
                (None, None) => {
                    log::warn!("{}: compbox without value", spec.id);
                    continue;
                }
            };
            match compbox_geometry(layout, input) {
                Ok(g) => state.compboxes.push((spec.id.clone(), g)),
                Err(e) => log::warn!("{}: compbox skipped: {e}", spec.id),
            }
        }
        log::debug!("page mounted {} surface(s), {} compbox(es)", state.surfaces.len(), state.compboxes.len());
        state
    }

    pub fn settings(&self) -> &PlotSettings {
        &self.settings
    }

    pub fn apply(&mut self, msg: &ChannelMessage) -> Applied {
        match route(&msg.event) {
            Route::SearchResults => match search_hits(&msg.payload) {
                Ok(hits) => {
                    self.search_update(SearchMsg::Results(hits));
                    Applied::Search
                }
                Err(e) => {
                    log::warn!("search results dropped: {e}");
                    Applied::Dropped
                }
            },
            Route::Exclusion => {
                self.excluded = exclusion(&msg.payload);
                if let Some(reason) = &self.excluded {
                    log::info!("FinRegistry panels excluded: {reason}");
                }
                Applied::Excluded
            }
            Route::Panel { spec, dataset } => self.apply_panel(spec, dataset, msg.payload.clone()),
            Route::Ignored => {
                log::warn!("unhandled channel event {:?}", msg.event);
                Applied::Dropped
            }
        }
    }

    fn apply_panel(&mut self, spec: PanelSpec, dataset: Dataset, payload: Value) -> Applied {
        if dataset == Dataset::FinRegistry && self.excluded.is_some() {
            log::debug!("{}: dropped, dataset excluded", spec.mount);
            return Applied::Dropped;
        }
        let mount = spec.mount.clone();
        if self.surfaces.get(&mount).is_none() {
            self.surfaces.insert(Surface::new(spec, self.settings.clone()));
        }
        let Some(surface) = self.surfaces.get_mut(&mount) else {
            return Applied::Dropped;
        };
        match bind_value(surface, payload) {
            Ok(()) => Applied::Bound(mount),
            Err(e) => {
                log::warn!("{mount}: payload rejected: {e}");
                Applied::Dropped
            }
        }
    }

    /// Feed the search box and keep the backend query it produces, if any.
    pub fn search_update(&mut self, msg: SearchMsg) {
        let (next, request) = update(std::mem::take(&mut self.search), msg);
        self.search = next;
        if request.is_some() {
            self.pending_request = request;
        }
    }

    /// Hand the pending query to whoever sends it.
    pub fn take_request(&mut self) -> Option<SearchRequest> {
        self.pending_request.take()
    }
}

fn bind_value(surface: &mut Surface, value: Value) -> Result<()> {
    let data = panel_data(&surface.spec, value)?;
    surface.bind(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{PanelKind, SurfaceGeometry};
    use serde_json::json;

    fn page() -> Page {
        serde_json::from_value(json!({
            "title": "I9_HYPTENS",
            "panels": [
                {"mount": "bin-plot-year-FG", "kind": "discrete", "cumulative_toggle": true,
                 "data": [{"name": "2010", "value": 4}, {"name": "2011", "value": 6}]},
                {"mount": "broken", "kind": "interval", "data": [{"interval": {"left": null, "right": null}, "count": 1}]},
                {"mount": "cumulinc-plot-FG", "kind": "cumulinc"}
            ],
            "compboxes": [{"id": "row-1", "value": 0.3}]
        }))
        .unwrap()
    }

    #[test]
    fn bad_panel_is_not_mounted() {
        let state = PageState::from_page(&page(), PlotSettings::default(), 20);
        assert_eq!(state.surfaces.len(), 2);
        assert!(state.surfaces.get("broken").is_none());
        assert_eq!(state.compboxes.len(), 1);
    }

    #[test]
    fn channel_message_binds_known_mount() {
        let mut state = PageState::from_page(&page(), PlotSettings::default(), 20);
        let msg = ChannelMessage::new(
            "data_cumulative_incidence_FG",
            json!({"females": [{"age": 20, "value": 1}, {"age": 30, "value": 2}], "males": [], "max_value": 2}),
        );
        assert_eq!(state.apply(&msg), Applied::Bound("cumulinc-plot-FG".into()));
        let s = state.surfaces.get("cumulinc-plot-FG").unwrap();
        assert!(matches!(s.geometry(), SurfaceGeometry::Cumulinc(_)));
    }

    #[test]
    fn unknown_mount_created_from_route() {
        let mut state = PageState::new(PlotSettings::default(), 20);
        let msg = ChannelMessage::new(
            "data_age_histogram_FG",
            json!({"data": [{"interval": {"left": 0, "right": 10}, "count": 3}]}),
        );
        assert_eq!(state.apply(&msg), Applied::Bound("bin-plot-age-FG".into()));
        assert_eq!(state.surfaces.get("bin-plot-age-FG").map(|s| s.spec.kind), Some(PanelKind::Interval));
    }

    #[test]
    fn empty_cumulinc_shows_no_data() {
        let mut state = PageState::from_page(&page(), PlotSettings::default(), 20);
        let msg = ChannelMessage::new("data_cumulative_incidence_FG", json!({"females": [], "males": []}));
        state.apply(&msg);
        assert_eq!(state.surfaces.get("cumulinc-plot-FG").unwrap().geometry(), &SurfaceGeometry::NoData);
    }

    #[test]
    fn exclusion_blocks_finregistry() {
        let mut state = PageState::new(PlotSettings::default(), 20);
        state.apply(&ChannelMessage::new("result_exclusion", json!({"excl": "sex-specific"})));
        let msg = ChannelMessage::new("data_year_histogram_FR", json!({"data": []}));
        assert_eq!(state.apply(&msg), Applied::Dropped);
        assert!(state.surfaces.is_empty());
    }

    #[test]
    fn search_results_and_unknown_events() {
        let mut state = PageState::new(PlotSettings::default(), 20);
        let msg = ChannelMessage::new("results", json!({"body": {"results": [{"name": "AB1"}]}}));
        assert_eq!(state.apply(&msg), Applied::Search);
        assert_eq!(state.search.results.len(), 1);
        assert_eq!(state.apply(&ChannelMessage::new("data_mortality", Value::Null)), Applied::Dropped);
        state.search_update(SearchMsg::Input('a'));
        assert_eq!(state.take_request(), Some(SearchRequest("a".into())));
    }

    #[test]
    fn only_latest_search_request_is_kept() {
        let mut state = PageState::new(PlotSettings::default(), 20);
        for c in "abc".chars() {
            state.search_update(SearchMsg::Input(c));
        }
        state.search_update(SearchMsg::Next);
        assert_eq!(state.take_request(), Some(SearchRequest("abc".into())));
        assert_eq!(state.take_request(), None);
    }
}
