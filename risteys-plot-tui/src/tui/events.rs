use crate::tui::app::{App, View};
use crate::tui::ui::{canvas_inner, cell_to_canvas, plots_layout};
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use risteys_plot_core::search::{shortcut_focuses, FocusTarget, SearchMsg};
use risteys_plot_core::svg::surface_svg;
use std::path::Path;

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if app.search_focused() {
        handle_search(app, key);
        return;
    }
    if let KeyCode::Char(c) = key.code {
        if shortcut_focuses(c, app.config.search.shortcut, app.state.focus) {
            app.invoke("focusSearch", "");
            return;
        }
    }
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('?') => {
            if app.view == View::Help {
                app.view = View::Plots;
                app.help_scroll = 0;
            } else {
                app.view = View::Help;
            }
        }
        KeyCode::Char('j') if app.view == View::Help => {
            app.help_scroll += 1;
        }
        KeyCode::Char('k') if app.view == View::Help => {
            if app.help_scroll > 0 {
                app.help_scroll -= 1;
            }
        }
        KeyCode::Esc => {
            if let Some(dialog) = app.state.open_dialogs.iter().next().cloned() {
                app.invoke("closeDialog", &dialog);
            } else if app.view != View::Plots {
                app.view = View::Plots;
                app.help_scroll = 0;
            }
        }
        KeyCode::Tab | KeyCode::Right => app.next_surface(),
        KeyCode::BackTab | KeyCode::Left => app.prev_surface(),
        KeyCode::Char('c') => toggle_current(app),
        KeyCode::Char('b') => {
            app.view = if app.view == View::CompBoxes { View::Plots } else { View::CompBoxes };
        }
        KeyCode::Char('g') => {
            app.debug_grid = !app.debug_grid;
            app.status_msg = format!("debug grid {}", if app.debug_grid { "on" } else { "off" });
        }
        KeyCode::Char('r') => {
            if app.messages_path.is_some() {
                app.pump_messages();
            } else {
                app.status_msg = "no messages file (use --messages)".into();
            }
        }
        KeyCode::Char('e') => export_current(app),
        _ => {}
    }
}

fn handle_search(app: &mut App, key: KeyEvent) {
    let msg = match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            if key.code == KeyCode::Enter {
                if let Some(hit) = app.state.search.selected_hit() {
                    app.status_msg = format!("{}: {}", hit.name, hit.description);
                }
            }
            app.state.focus = FocusTarget::Page;
            SearchMsg::Blur
        }
        KeyCode::Backspace => SearchMsg::Backspace,
        KeyCode::Down => SearchMsg::Next,
        KeyCode::Up => SearchMsg::Prev,
        KeyCode::Char(c) => SearchMsg::Input(c),
        _ => return,
    };
    app.state.search_update(msg);
    if let Some(req) = app.state.take_request() {
        // results come back through the messages file
        log::info!("search query: {:?}", req.0);
    }
}

fn toggle_current(app: &mut App) {
    let Some(mount) = app.current_mount() else {
        return;
    };
    let before = app.current().map(|s| s.mode());
    app.status_msg.clear();
    app.invoke("toggleCumulative", &mount);
    if !app.status_msg.is_empty() {
        return;
    }
    let after = app.current().map(|s| s.mode());
    app.status_msg = match after {
        Some(mode) if after != before => format!("{mount}: {}", mode.label()),
        _ => format!("{mount}: toggle unavailable"),
    };
}

fn export_current(app: &mut App) {
    let Some(surface) = app.current() else {
        return;
    };
    let dir = Path::new(&app.config.export.output_dir);
    let out = dir.join(format!("{}.svg", surface.mount()));
    let svg = surface_svg(surface, app.debug_grid);
    let result = std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&out, svg));
    app.status_msg = match result {
        Ok(()) => format!("exported {}", out.display()),
        Err(e) => format!("export failed: {e}"),
    };
}

/// Mouse handling for the plots view. `area` is the full frame area.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent, area: Rect) {
    if app.view != View::Plots {
        return;
    }
    let layout = plots_layout(area);
    match mouse.kind {
        MouseEventKind::Moved => {
            let inner = canvas_inner(layout.canvas);
            let Some(surface) = app.current_mut() else {
                return;
            };
            match cell_to_canvas(inner, mouse.column, mouse.row, surface.canvas_size()) {
                Some((px, py)) => {
                    surface.pointer_move(px, py);
                }
                None => surface.pointer_leave(),
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            let t = layout.toggle;
            if mouse.row == t.y && mouse.column >= t.x && mouse.column < t.x + t.width {
                toggle_current(app);
            }
        }
        MouseEventKind::ScrollDown => app.next_surface(),
        MouseEventKind::ScrollUp => app.prev_surface(),
        _ => {}
    }
}

#[cfg(test)]
mod tests_events {
    use super::*;
    use crossterm::event::KeyModifiers;
    use risteys_plot_common::Config;
    use risteys_plot_core::{ChannelMessage, PageState, PlotSettings};

    fn key(c: KeyCode) -> KeyEvent {
        KeyEvent::new(c, KeyModifiers::NONE)
    }

    fn app_with_year_panel() -> App {
        let mut state = PageState::new(PlotSettings::default(), 20);
        state.apply(&ChannelMessage::new(
            "data_year_histogram_FG",
            serde_json::json!([
                {"interval": {"left": 2000, "right": 2001}, "count": 3},
                {"interval": {"left": 2001, "right": 2002}, "count": 8}
            ]),
        ));
        App::new("page.json".into(), state, Config::default())
    }

    #[test]
    fn shortcut_focuses_search_and_typing_goes_there() {
        let mut app = app_with_year_panel();
        handle_key(&mut app, key(KeyCode::Char('s')));
        assert!(app.search_focused());
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert_eq!(app.state.search.query, "q");
        assert_eq!(app.state.take_request(), None);
        handle_key(&mut app, key(KeyCode::Esc));
        assert!(!app.search_focused());
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn help_toggles_and_scrolls() {
        let mut app = app_with_year_panel();
        handle_key(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.view, View::Help);
        handle_key(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.help_scroll, 1);
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.view, View::Plots);
        assert_eq!(app.help_scroll, 0);
    }

    #[test]
    fn export_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_year_panel();
        app.config.export.output_dir = dir.path().to_string_lossy().into_owned();
        handle_key(&mut app, key(KeyCode::Char('e')));
        let written = std::fs::read_to_string(dir.path().join("bin-plot-year-FG.svg")).unwrap();
        assert!(written.starts_with("<svg"));
        assert!(app.status_msg.starts_with("exported"));
    }
}
