use crate::tui::app::{App, View};
use crate::tui::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap,
    },
    Frame,
};
use risteys_plot_core::compbox::CompBoxGeometry;
use risteys_plot_core::cumulinc::NO_DATA;
use risteys_plot_core::geometry::{debug_grid, BarStyle, Rect as PlotRect, TickMark, YTick};
use risteys_plot_core::surface::{Surface, SurfaceGeometry};
use risteys_plot_core::DisplayMode;

/// Screen regions of the plots view, shared by rendering and mouse handling.
pub struct PlotsLayout {
    pub sidebar: Rect,
    pub canvas: Rect,
    pub toggle: Rect,
    pub readout: Rect,
    pub search: Rect,
}

pub fn plots_layout(area: Rect) -> PlotsLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(3), Constraint::Length(1)])
        .split(area);
    let mid = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(0)])
        .split(rows[1]);
    let plot = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)])
        .split(mid[1]);
    PlotsLayout { sidebar: mid[0], canvas: plot[0], toggle: plot[1], readout: plot[2], search: rows[2] }
}

/// Inside of the canvas block borders.
pub fn canvas_inner(canvas: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(canvas)
}

/// Terminal cell to canvas pixel (y grows downward, like the geometry).
pub fn cell_to_canvas(inner: Rect, col: u16, row: u16, size: (f64, f64)) -> Option<(f64, f64)> {
    if inner.width == 0 || inner.height == 0 {
        return None;
    }
    if col < inner.x || row < inner.y || col >= inner.x + inner.width || row >= inner.y + inner.height {
        return None;
    }
    let fx = (f64::from(col - inner.x) + 0.5) / f64::from(inner.width);
    let fy = (f64::from(row - inner.y) + 0.5) / f64::from(inner.height);
    Some((fx * size.0, fy * size.1))
}

pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = frame.area();
    let layout = plots_layout(area);
    render_topbar(frame, app, Rect { height: 1, ..area }, theme);
    render_sidebar(frame, app, layout.sidebar, theme);
    match app.view {
        View::CompBoxes => render_compboxes(frame, app, Rect {
            x: layout.canvas.x,
            y: layout.canvas.y,
            width: layout.canvas.width,
            height: layout.canvas.height + 2,
        }, theme),
        _ => {
            match app.current() {
                Some(s) => {
                    render_surface(frame, s, app.debug_grid, layout.canvas, theme);
                    render_toggle(frame, s, layout.toggle, theme);
                    render_readout(frame, s, layout.readout, theme);
                }
                None => frame.render_widget(
                    Paragraph::new("No panels on this page.").block(Block::default().borders(Borders::ALL)),
                    layout.canvas,
                ),
            }
        }
    }
    render_search(frame, app, layout.search, theme);
    let bottom = Rect { y: area.y + area.height.saturating_sub(1), height: 1, ..area };
    frame.render_widget(
        Paragraph::new(app.status_msg.as_str()).style(Style::default().bg(theme.bg).fg(theme.fg)),
        bottom,
    );
    if app.search_focused() && !app.state.search.results.is_empty() {
        render_search_results(frame, app, layout.search, theme);
    }
    if app.view == View::Help {
        render_help(frame, app, area);
    }
    if let Some(dialog) = app.state.open_dialogs.iter().next() {
        render_dialog(frame, dialog, area, theme);
    }
}

fn render_topbar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let title = if app.state.title.is_empty() { app.page_path.as_str() } else { app.state.title.as_str() };
    let mut spans = vec![
        Span::styled(" risteys-plot ", Style::default().fg(theme.bg).bg(theme.highlight)),
        Span::raw(format!(" {title} | {} panel(s)", app.state.surfaces.len())),
    ];
    if let Some(reason) = &app.state.excluded {
        spans.push(Span::styled(format!(" | FinRegistry excluded: {reason}"), Style::default().fg(theme.warning)));
    }
    if app.watch_rx.is_some() {
        spans.push(Span::styled(" [watch]", Style::default().fg(theme.success)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.bg).fg(theme.fg)), area);
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let items: Vec<ListItem> = app
        .state
        .surfaces
        .iter()
        .map(|s| {
            let marker = match s.geometry() {
                SurfaceGeometry::NoData => Span::styled("· ", Style::default().fg(theme.suppressed)),
                _ => Span::styled("▪ ", Style::default().fg(theme.success)),
            };
            ListItem::new(Line::from(vec![marker, Span::raw(truncate(s.mount(), 24))]))
        })
        .collect();
    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(app.selected.min(items.len() - 1)));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Panels"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, area, &mut state);
}

fn fill_rect(ctx: &mut Context, r: &PlotRect, h: f64, step: f64, color: Color) {
    if r.width <= 0.0 || r.height <= 0.0 || !(step > 0.0) {
        // zero-height bars still get a baseline mark
        ctx.draw(&CanvasLine::new(r.x, h - r.y, r.x + r.width.max(0.0), h - r.y, color));
        return;
    }
    let mut x = r.x;
    while x <= r.x + r.width {
        ctx.draw(&CanvasLine::new(x, h - r.y, x, h - (r.y + r.height), color));
        x += step;
    }
}

fn draw_x_ticks(ctx: &mut Context, ticks: &[TickMark], h: f64, color: Color) {
    for t in ticks {
        ctx.draw(&CanvasLine::new(t.x1, h - t.y1, t.x2, h - t.y2, color));
        ctx.print(t.label_x, h - t.label_y, Span::styled(t.label.clone(), Style::default().fg(color)));
    }
}

fn draw_y_ticks(ctx: &mut Context, ticks: &[YTick], x: f64, h: f64, color: Color) {
    for t in ticks {
        ctx.draw(&CanvasLine::new(x - 6.0, h - t.y, x, h - t.y, color));
        ctx.print((x - 40.0).max(0.0), h - t.y, Span::styled(t.label.clone(), Style::default().fg(color)));
    }
}

fn render_surface(frame: &mut Frame, s: &Surface, grid: bool, area: Rect, theme: &Theme) {
    let (w, h) = s.canvas_size();
    let mode = match s.mode() {
        DisplayMode::Cumulative => " [cumulative]",
        DisplayMode::PerPeriod => "",
    };
    let title = format!("{} | {} / {}{mode}", s.mount(), s.spec.x_label, s.spec.y_label);
    let block = Block::default().borders(Borders::ALL).title(title);
    if let SurfaceGeometry::NoData = s.geometry() {
        let msg = if s.is_bound() { NO_DATA } else { "Waiting for data…" };
        frame.render_widget(Paragraph::new(msg).block(block).style(Style::default().fg(theme.suppressed)), area);
        return;
    }
    let inner = canvas_inner(area);
    let step = if inner.width > 0 { w / (f64::from(inner.width) * 2.0) } else { w };
    let hist = &s.settings().layout.histogram;
    let bar = theme.plot_color(Some(s.spec.color.as_deref().unwrap_or(hist.bar_color.as_str())));
    let axis = theme.axis;
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, w])
        .y_bounds([0.0, h])
        .paint(|ctx| {
            if grid {
                for g in debug_grid(w, h).iter().filter(|g| g.x1 % 100.0 == 0.0 && g.y1 % 100.0 == 0.0) {
                    ctx.draw(&CanvasLine::new(g.x1, h - g.y1, g.x2, h - g.y2, theme.guide));
                }
                ctx.layer();
            }
            match s.geometry() {
                SurfaceGeometry::Interval(g) => {
                    for b in &g.bins {
                        fill_rect(ctx, &b.hbin, h, step, bar);
                        fill_rect(ctx, &b.vbin, h, step, bar);
                    }
                    ctx.layer();
                    draw_x_ticks(ctx, &g.x_ticks, h, axis);
                    draw_y_ticks(ctx, &g.y_ticks, hist.plot_left(), h, axis);
                }
                SurfaceGeometry::Band(g) => {
                    for b in &g.bins {
                        let c = match b.style {
                            BarStyle::Normal => bar,
                            BarStyle::Suppressed => theme.suppressed,
                        };
                        fill_rect(ctx, &b.bar, h, step, c);
                    }
                    ctx.layer();
                    draw_x_ticks(ctx, &g.x_ticks, h, axis);
                    draw_y_ticks(ctx, &g.y_ticks, hist.plot_left(), h, axis);
                }
                SurfaceGeometry::Cumulinc(g) => {
                    for c in &g.curves {
                        let color = theme.plot_color(c.color.as_deref());
                        for pair in c.points.windows(2) {
                            let ((x1, y1), (x2, y2)) = (pair[0], pair[1]);
                            ctx.draw(&CanvasLine::new(x1, h - y1, x2, h - y2, color));
                        }
                    }
                    ctx.layer();
                    draw_x_ticks(ctx, &g.x_ticks, h, axis);
                    draw_y_ticks(ctx, &g.y_ticks, s.settings().layout.cumulinc.margin.left, h, axis);
                }
                SurfaceGeometry::NoData => {}
            }
            if let Some(sub) = s.geometry().subtitle() {
                ctx.print(hist.plot_left(), h - 30.0, Span::styled(sub, Style::default().fg(theme.warning)));
            }
            if let Some(t) = s.tooltip() {
                ctx.print(t.x, h - t.y, Span::styled(t.text.clone(), Style::default().fg(theme.hover)));
            }
            if let Some(r) = s.readout() {
                ctx.draw(&CanvasLine::new(r.line_x, h - r.line_y1, r.line_x, h - r.line_y2, theme.guide));
                for m in &r.markers {
                    let radius = s.settings().layout.cumulinc.marker_radius;
                    ctx.draw(&Circle { x: m.x, y: h - m.y, radius, color: theme.hover });
                    ctx.print(m.x + m.label_dx() * 10.0, h - m.y, Span::styled(m.label.clone(), Style::default().fg(theme.hover)));
                }
            }
        });
    frame.render_widget(canvas, area);
}

fn render_toggle(frame: &mut Frame, s: &Surface, area: Rect, theme: &Theme) {
    if !s.spec.cumulative_toggle {
        return;
    }
    let on = Style::default().fg(theme.bg).bg(theme.highlight);
    let off = if s.can_toggle() { Style::default().fg(theme.fg) } else { Style::default().fg(theme.suppressed) };
    let (per, cum) = match s.mode() {
        DisplayMode::PerPeriod => (on, off),
        DisplayMode::Cumulative => (off, on),
    };
    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(" per period ", per),
        Span::raw(" "),
        Span::styled(" cumulative ", cum),
        Span::raw("  (c or click)"),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_readout(frame: &mut Frame, s: &Surface, area: Rect, theme: &Theme) {
    let text = if let Some(t) = s.tooltip() {
        format!(" {}", t.text)
    } else if let Some(r) = s.readout() {
        let labels: Vec<&str> = r.markers.iter().map(|m| m.label.as_str()).collect();
        format!(" age {:.0}: {}", r.age, labels.join("  "))
    } else {
        String::new()
    };
    frame.render_widget(Paragraph::new(text).style(Style::default().fg(theme.hover)), area);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let search = &app.state.search;
    let focused = app.search_focused();
    let cursor = if focused { "_" } else { "" };
    let border = if focused { Style::default().fg(theme.highlight) } else { Style::default() };
    let title = format!("Search ({})", app.config.search.shortcut);
    frame.render_widget(
        Paragraph::new(format!("{}{cursor}", search.query))
            .block(Block::default().borders(Borders::ALL).title(title).border_style(border)),
        area,
    );
}

fn render_search_results(frame: &mut Frame, app: &App, anchor: Rect, theme: &Theme) {
    let search = &app.state.search;
    let height = (search.results.len() as u16 + 2).min(anchor.y.saturating_sub(1)).max(3);
    let area = Rect { x: anchor.x, y: anchor.y.saturating_sub(height), width: anchor.width.min(70), height };
    let items: Vec<ListItem> = search
        .results
        .iter()
        .map(|h| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<20} ", truncate(&h.name, 20)), Style::default().fg(theme.highlight)),
                Span::raw(h.description.clone()),
            ]))
        })
        .collect();
    let mut state = ListState::default();
    state.select(search.selected);
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(
        List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Results"))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
        area,
        &mut state,
    );
}

fn render_compboxes(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let width = usize::from(area.width.saturating_sub(30)).max(10);
    let lines: Vec<Line> = if app.state.compboxes.is_empty() {
        vec![Line::from("No comparison boxes on this page.")]
    } else {
        app.state
            .compboxes
            .iter()
            .map(|(id, g)| {
                let cells = compbox_cells(g, width);
                Line::from(vec![
                    Span::raw(format!("{:<24} ", truncate(id, 24))),
                    Span::styled(format!("[{cells}]"), Style::default().fg(theme.fg)),
                ])
            })
            .collect()
    };
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Comparison boxes (b)")),
        area,
    );
}

/// One text row of a comparison box, `width` cells wide.
fn compbox_cells(g: &CompBoxGeometry, width: usize) -> String {
    let width = width.max(1);
    let to_col = |x: f64| {
        ((x / g.frame.width.max(1e-9)) * width as f64).round().clamp(0.0, width as f64 - 1.0) as usize
    };
    let mut cells = vec![' '; width];
    for (r, fill) in [(&g.percentile_box, '░'), (&g.quartile_box, '▒')] {
        let (a, b) = (to_col(r.x), to_col(r.x + r.width));
        for c in &mut cells[a.min(b)..=a.max(b)] {
            *c = fill;
        }
    }
    cells[to_col(g.median_x)] = '│';
    cells[to_col(g.dot_x)] = '●';
    cells.into_iter().collect()
}

fn render_dialog(frame: &mut Frame, id: &str, area: Rect, theme: &Theme) {
    let popup = centered(area, 50, 5);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(vec![Line::from(format!("dialog: {id}")), Line::from("Esc to close")])
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme.highlight)))
            .wrap(Wrap { trim: false }),
        popup,
    );
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let shortcut = app.config.search.shortcut;
    let lines = vec![
        Line::from(Span::styled("Keys", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("Tab / Right      next panel"),
        Line::from("BackTab / Left   previous panel"),
        Line::from("c                toggle cumulative / per period"),
        Line::from(format!("{shortcut}                focus search")),
        Line::from("Up / Down        move through search results"),
        Line::from("Esc              leave search, close dialog"),
        Line::from("e                export panel as SVG"),
        Line::from("g                debug grid"),
        Line::from("b                comparison boxes"),
        Line::from("r                reload messages file"),
        Line::from("?                this help"),
        Line::from("q                quit"),
        Line::from(""),
        Line::from("Mouse: hover bars for counts, click the toggle line to switch mode."),
    ];
    let popup = centered(area, 64, lines.len() as u16 + 2);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Help (?)"))
            .scroll((app.help_scroll, 0)),
        popup,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect { x: area.x + (area.width - w) / 2, y: area.y + (area.height - h) / 2, width: w, height: h }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests_ui {
    use super::*;

    #[test]
    fn cells_map_into_canvas() {
        let inner = Rect { x: 10, y: 5, width: 58, height: 32 };
        let (px, py) = cell_to_canvas(inner, 10, 5, (580.0, 320.0)).unwrap();
        assert!((px - 5.0).abs() < 1e-9);
        assert!((py - 5.0).abs() < 1e-9);
        assert!(cell_to_canvas(inner, 9, 5, (580.0, 320.0)).is_none());
        assert!(cell_to_canvas(inner, 68, 5, (580.0, 320.0)).is_none());
    }

    #[test]
    fn compbox_row_tolerates_inverted_box() {
        let span = |x: f64, width: f64| PlotRect { x, y: 0.0, width, height: 16.0 };
        let g = CompBoxGeometry {
            svg_width: 60.0,
            svg_height: 16.0,
            offset_x: 0.0,
            frame: span(0.0, 60.0),
            percentile_box: span(40.0, -20.0),
            quartile_box: span(35.0, -10.0),
            median_x: 30.0,
            dot_x: 30.0,
            dot_y: 8.0,
            dot_r: 3.2,
        };
        let row = compbox_cells(&g, 60);
        assert_eq!(row.chars().count(), 60);
        assert!(row.contains('░'));
        assert!(row.contains('●'));
    }

    #[test]
    fn fill_rect_with_zero_step_returns() {
        let mut ctx = Context::new(10, 10, [0.0, 10.0], [0.0, 10.0], Marker::Braille);
        let bar = PlotRect { x: 1.0, y: 1.0, width: 4.0, height: 4.0 };
        fill_rect(&mut ctx, &bar, 10.0, 0.0, Color::White);
        fill_rect(&mut ctx, &bar, 10.0, f64::NAN, Color::White);
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("bin-plot-age-FG", 24), "bin-plot-age-FG");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}
