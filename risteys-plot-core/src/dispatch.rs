use crate::bootstrap::PageState;
use crate::cumulative::DisplayMode;
use crate::search::{FocusTarget, SearchMsg};
use risteys_plot_common::{Result, RisteysPlotError};
use std::collections::BTreeMap;

/// A named page action; the argument is usually a mount or dialog id.
pub type Action = fn(&mut PageState, &str) -> Result<()>;

/// Explicit table of the actions page controls may trigger.
#[derive(Clone)]
pub struct ActionRegistry {
    actions: BTreeMap<&'static str, Action>,
}

impl ActionRegistry {
    pub fn empty() -> Self {
        Self { actions: BTreeMap::new() }
    }

    pub fn register(&mut self, name: &'static str, action: Action) {
        if self.actions.insert(name, action).is_some() {
            log::debug!("action {name} re-registered");
        }
    }

    pub fn invoke(&self, name: &str, state: &mut PageState, arg: &str) -> Result<()> {
        let action = self
            .actions
            .get(name)
            .ok_or_else(|| RisteysPlotError::Other(format!("no action named {name:?}")))?;
        log::debug!("action {name}({arg})");
        action(state, arg)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.actions.keys().copied()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        let mut reg = Self::empty();
        reg.register("openDialog", open_dialog);
        reg.register("closeDialog", close_dialog);
        reg.register("toggleCumulative", toggle_cumulative);
        reg.register("showCumulative", |s, mount| set_mode(s, mount, DisplayMode::Cumulative));
        reg.register("showPerPeriod", |s, mount| set_mode(s, mount, DisplayMode::PerPeriod));
        reg.register("focusSearch", focus_search);
        reg
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.actions.keys()).finish()
    }
}

fn open_dialog(state: &mut PageState, id: &str) -> Result<()> {
    state.open_dialogs.insert(id.to_string());
    Ok(())
}

fn close_dialog(state: &mut PageState, id: &str) -> Result<()> {
    state.open_dialogs.remove(id);
    Ok(())
}

fn toggle_cumulative(state: &mut PageState, mount: &str) -> Result<()> {
    state.surfaces.require_mut(mount)?.toggle_cumulative()?;
    Ok(())
}

fn set_mode(state: &mut PageState, mount: &str, mode: DisplayMode) -> Result<()> {
    state.surfaces.require_mut(mount)?.set_mode(mode)?;
    Ok(())
}

fn focus_search(state: &mut PageState, _: &str) -> Result<()> {
    state.focus = FocusTarget::SearchInput;
    state.search_update(SearchMsg::Focus);
    Ok(())
}
