//! Standalone SVG documents of a surface's current geometry.

use crate::cumulinc::NO_DATA;
use crate::geometry::{debug_grid, BarStyle, Rect, TickMark, YTick};
use crate::surface::{Surface, SurfaceGeometry};
use risteys_plot_common::palette;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn rect(r: &Rect, fill: &str, extra: &str) -> String {
    format!(
        "<rect x='{:.2}' y='{:.2}' width='{:.2}' height='{:.2}' fill='{fill}'{extra} />",
        r.x, r.y, r.width, r.height
    )
}

fn text(x: f64, y: f64, anchor: &str, body: &str, extra: &str) -> String {
    format!(
        "<text x='{x:.2}' y='{y:.2}' text-anchor='{anchor}'{extra}>{}</text>",
        escape(body)
    )
}

fn x_axis(id: &str, ticks: &[TickMark]) -> String {
    let mut parts = vec![format!("<g id='{id}' font-size='12'>")];
    for t in ticks {
        parts.push(format!(
            "<line x1='{:.2}' y1='{:.2}' x2='{:.2}' y2='{:.2}' stroke='black' />",
            t.x1, t.y1, t.x2, t.y2
        ));
        let rotate = if t.rotate != 0.0 {
            format!(" transform='rotate({} {:.2} {:.2})'", t.rotate, t.label_x, t.label_y)
        } else {
            String::new()
        };
        let anchor = if t.rotate != 0.0 { "end" } else { "middle" };
        parts.push(text(t.label_x, t.label_y, anchor, &t.label, &rotate));
    }
    parts.push("</g>".into());
    parts.join("")
}

fn y_axis(id: &str, x: f64, ticks: &[YTick]) -> String {
    let mut parts = vec![format!("<g id='{id}' font-size='12'>")];
    for t in ticks {
        parts.push(format!(
            "<line x1='{:.2}' y1='{:.2}' x2='{x:.2}' y2='{:.2}' stroke='black' />",
            x - 6.0,
            t.y,
            t.y
        ));
        parts.push(text(x - 9.0, t.y + 4.0, "end", &t.label, ""));
    }
    parts.push("</g>".into());
    parts.join("")
}

/// Render the surface as it currently stands, including the hovered tooltip.
pub fn surface_svg(surface: &Surface, with_debug_grid: bool) -> String {
    let (w, h) = surface.canvas_size();
    let ids = &surface.ids;
    let hist = &surface.settings().layout.histogram;
    let color = surface.spec.color.clone().unwrap_or_else(|| hist.bar_color.clone());
    let mut parts = vec![format!(
        "<svg xmlns='{SVG_NS}' id='{}' width='{w}' height='{h}' viewBox='0 0 {w} {h}' font-family='sans-serif'>",
        ids.root
    )];
    if with_debug_grid {
        for g in debug_grid(w, h) {
            parts.push(format!(
                "<line x1='{}' y1='{}' x2='{}' y2='{}' stroke='{}' />",
                g.x1, g.y1, g.x2, g.y2, g.stroke
            ));
        }
    }
    match surface.geometry() {
        SurfaceGeometry::NoData => {
            parts.push(text(w / 2.0, h / 2.0, "middle", NO_DATA, ""));
        }
        SurfaceGeometry::Interval(g) => {
            parts.push(format!("<g id='{}' fill='{color}'>", ids.rects));
            for b in &g.bins {
                parts.push(format!("<g id='{}'>", b.id));
                parts.push(rect(&b.capbin, "none", " pointer-events='all'"));
                parts.push(rect(&b.hbin, &color, ""));
                parts.push(rect(&b.vbin, &color, ""));
                parts.push("</g>".into());
            }
            parts.push("</g>".into());
            parts.push(x_axis(&ids.xaxis, &g.x_ticks));
            parts.push(y_axis(&ids.yaxis, hist.plot_left(), &g.y_ticks));
        }
        SurfaceGeometry::Band(g) => {
            parts.push(format!("<g id='{}' fill='{color}'>", ids.rects));
            for b in &g.bins {
                let fill = match b.style {
                    BarStyle::Normal => color.as_str(),
                    BarStyle::Suppressed => palette::SUPPRESSED,
                };
                parts.push(rect(&b.bar, fill, &format!(" id='{}'", b.id)));
            }
            parts.push("</g>".into());
            parts.push(x_axis(&ids.xaxis, &g.x_ticks));
            parts.push(y_axis(&ids.yaxis, hist.plot_left(), &g.y_ticks));
        }
        SurfaceGeometry::Cumulinc(g) => {
            parts.push(format!("<g id='{}' fill='none' stroke-width='3'>", ids.rects));
            for c in &g.curves {
                let d: Vec<String> = c.points.iter().map(|(x, y)| format!("{x:.2},{y:.2}")).collect();
                parts.push(format!(
                    "<polyline points='{}' stroke='{}' stroke-dasharray='{}' />",
                    d.join(" "),
                    c.color.as_deref().unwrap_or(palette::BLACK),
                    c.dasharray.as_deref().unwrap_or("1 0")
                ));
            }
            parts.push("</g>".into());
            parts.push(x_axis(&ids.xaxis, &g.x_ticks));
            let l = &surface.settings().layout.cumulinc;
            parts.push(y_axis(&ids.yaxis, l.margin.left, &g.y_ticks));
        }
    }
    if let Some(sub) = surface.geometry().subtitle() {
        let mid = (hist.plot_left() + hist.plot_right()) / 2.0;
        parts.push(text(mid, 30.0, "middle", sub, " font-size='0.8rem'"));
    }
    parts.push(text(w / 2.0, h - 5.0, "middle", &surface.spec.x_label, ""));
    parts.push(text(
        15.0,
        h / 2.0,
        "middle",
        &surface.spec.y_label,
        &format!(" transform='rotate(-90 15 {:.2})'", h / 2.0),
    ));
    parts.push(format!("<g id='{}'>", ids.tooltip));
    if let Some(t) = surface.tooltip() {
        parts.push(text(t.x, t.y, "middle", &t.text, ""));
    }
    if let Some(r) = surface.readout() {
        parts.push(format!(
            "<line x1='{x:.2}' y1='{:.2}' x2='{x:.2}' y2='{:.2}' stroke='hsl(10deg, 0%, 58%)' stroke-dasharray='1 1' />",
            r.line_y1,
            r.line_y2,
            x = r.line_x
        ));
        for m in &r.markers {
            parts.push(format!(
                "<circle cx='{:.2}' cy='{:.2}' r='{}' stroke='white' stroke-width='2' />",
                m.x, m.y, surface.settings().layout.cumulinc.marker_radius
            ));
            let anchor = if m.label_dx() < 0.0 { "end" } else { "start" };
            parts.push(text(m.x + m.label_dx(), m.y, anchor, &m.label, ""));
        }
    }
    parts.push("</g></svg>".into());
    parts.join("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bins::{DiscreteBin, SUPPRESSED};
    use crate::surface::{PanelData, PanelKind, PanelSpec, PlotSettings};

    fn year_surface(values: &[f64]) -> Surface {
        let spec = PanelSpec {
            mount: "bin-plot-year-FG".into(),
            kind: PanelKind::Discrete,
            x_label: "Year".into(),
            y_label: "Individuals".into(),
            color: None,
            cumulative_toggle: false,
            angled_labels: true,
        };
        let mut s = Surface::new(spec, PlotSettings::default());
        let bins = values.iter().enumerate().map(|(i, v)| DiscreteBin::new(format!("{}", 2000 + i), *v));
        s.bind(PanelData::Discrete(bins.collect())).unwrap();
        s
    }

    #[test]
    fn svg_carries_mount_ids() {
        let svg = surface_svg(&year_surface(&[1.0, 2.0]), false);
        assert!(svg.contains("id='bin-plot-year-FG_rects'"));
        assert!(svg.contains("id='bin-plot-year-FG_xaxis'"));
        assert!(svg.contains("id='bin-plot-year-FG-datum1'"));
        assert!(svg.contains("rotate(-50"));
        assert!(!svg.contains("individuals are not shown"));
    }

    #[test]
    fn subtitle_when_tails_stripped() {
        let svg = surface_svg(&year_surface(&[SUPPRESSED, 2.0]), true);
        assert!(svg.contains("(bins with 1 to 5 individuals are not shown)"));
        assert!(svg.contains("rgba(255, 182, 88, 0.5)"));
    }

    #[test]
    fn unbound_surface_says_no_data() {
        let spec = PanelSpec {
            mount: "cumulinc-plot-FR".into(),
            kind: PanelKind::Cumulinc,
            x_label: "Age".into(),
            y_label: "Probability <%>".into(),
            color: None,
            cumulative_toggle: false,
            angled_labels: false,
        };
        let svg = surface_svg(&Surface::new(spec, PlotSettings::default()), false);
        assert!(svg.contains("No data"));
        assert!(svg.contains("Probability &lt;%&gt;"));
    }
}
