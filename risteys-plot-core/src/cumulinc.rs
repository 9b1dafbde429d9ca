//! Cumulative-incidence curves: one line per subgroup plus an age readout
//! that follows the pointer.

use crate::bins::{CumulincPoint, CumulincSeries};
use crate::geometry::{TickMark, YTick};
use crate::layout::CumulincLayout;
use crate::normalize::fmt_bound;
use crate::scale::LinearScale;
use serde::Serialize;

pub const FEMALE: &str = "female";
pub const MALE: &str = "male";
pub const NO_DATA: &str = "No data";
const MARKER_LABEL_OFFSET: f64 = 4.0;

/// Linear interpolation of the curve at age `x`; `None` outside the
/// series' age range.
pub fn lerp(x: f64, points: &[CumulincPoint]) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;
    if x.is_nan() || x < first.age || x > last.age {
        return None;
    }
    // bisect right on age
    let right = points.partition_point(|p| p.age <= x);
    if right == points.len() {
        return Some(last.value);
    }
    let left = right.saturating_sub(1);
    let (p1, p2) = (&points[left], &points[right]);
    let span = p2.age - p1.age;
    if span == 0.0 {
        return Some(p1.value);
    }
    Some(p1.value + (x - p1.age) / span * (p2.value - p1.value))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurvePath {
    pub name: String,
    pub color: Option<String>,
    pub dasharray: Option<String>,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LabelSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub series: String,
    pub x: f64,
    pub y: f64,
    pub value: f64,
    pub label: String,
    pub side: LabelSide,
}

/// What the hover layer shows for one pointer position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverReadout {
    pub age: f64,
    pub line_x: f64,
    pub line_y1: f64,
    pub line_y2: f64,
    pub markers: Vec<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulincGeometry {
    pub curves: Vec<CurvePath>,
    pub x_ticks: Vec<TickMark>,
    pub y_ticks: Vec<YTick>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CumulincPlot {
    series: Vec<CumulincSeries>,
    layout: CumulincLayout,
    x: LinearScale,
    y: LinearScale,
}

impl CumulincPlot {
    /// `None` when every series is empty; the caller shows [`NO_DATA`].
    pub fn new(series: Vec<CumulincSeries>, layout: CumulincLayout, max_value: Option<f64>) -> Option<Self> {
        if series.iter().all(|s| s.cumulinc.is_empty()) {
            log::debug!("cumulative incidence: no points in any series");
            return None;
        }
        let series = order_female_first(series);
        let x = LinearScale::new(layout.age_domain, layout.x_range()).with_clamp(true);
        let (v0, mut v1) = layout.value_domain;
        if let Some(m) = max_value.filter(|m| m.is_finite() && *m > 0.0) {
            v1 = m;
        }
        let y = LinearScale::new((v0, v1), layout.y_range()).nice(10);
        Some(Self { series, layout, x, y })
    }

    pub fn series(&self) -> &[CumulincSeries] {
        &self.series
    }

    pub fn layout(&self) -> &CumulincLayout {
        &self.layout
    }

    pub fn x_scale(&self) -> &LinearScale {
        &self.x
    }

    pub fn y_scale(&self) -> &LinearScale {
        &self.y
    }

    pub fn geometry(&self) -> CumulincGeometry {
        let curves = self
            .series
            .iter()
            .map(|s| CurvePath {
                name: s.name.clone(),
                color: s.color.clone(),
                dasharray: s.dasharray.clone(),
                points: s.cumulinc.iter().map(|p| (self.x.map(p.age), self.y.map(p.value))).collect(),
            })
            .collect();
        let axis_y = self.layout.canvas_height - self.layout.margin.bottom;
        let (a0, a1) = self.layout.age_domain;
        let mut x_ticks = Vec::new();
        let mut age = a0;
        while age <= a1 {
            let px = self.x.map(age);
            x_ticks.push(TickMark {
                x1: px,
                y1: axis_y,
                x2: px,
                y2: axis_y + 6.0,
                label: fmt_bound(age),
                label_x: px,
                label_y: axis_y + 18.0,
                rotate: 0.0,
            });
            age += self.layout.age_tick_step;
        }
        let y_ticks = self
            .y
            .ticks(10)
            .into_iter()
            .map(|v| YTick { y: self.y.map(v), value: v, label: fmt_bound(v) })
            .collect();
        CumulincGeometry { curves, x_ticks, y_ticks }
    }

    /// Readout for a pointer at canvas x `pointer_x`.
    pub fn hover(&self, pointer_x: f64) -> HoverReadout {
        let age = self.x.invert(pointer_x);
        let line_x = self.x.map(age); // clamped back into the plot
        let flip = line_x / self.layout.canvas_width > self.layout.label_flip_ratio;
        let markers = self
            .series
            .iter()
            .filter_map(|s| {
                let value = lerp(age, &s.cumulinc)?;
                let side = if s.name == MALE && !flip { LabelSide::Right } else { LabelSide::Left };
                Some(Marker {
                    series: s.name.clone(),
                    x: line_x,
                    y: self.y.map(value),
                    value,
                    label: format!("{}: {}%", title_case(&s.name), value.floor()),
                    side,
                })
            })
            .collect();
        HoverReadout {
            age,
            line_x,
            line_y1: 0.0,
            line_y2: self.layout.canvas_height - self.layout.margin.bottom,
            markers,
        }
    }
}

impl Marker {
    /// Label x relative to the marker.
    pub fn label_dx(&self) -> f64 {
        match self.side {
            LabelSide::Left => -MARKER_LABEL_OFFSET,
            LabelSide::Right => MARKER_LABEL_OFFSET,
        }
    }
}

fn order_female_first(mut series: Vec<CumulincSeries>) -> Vec<CumulincSeries> {
    series.sort_by_key(|s| match s.name.as_str() {
        FEMALE => 0,
        MALE => 1,
        _ => 2,
    });
    series
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;

    fn pts(raw: &[(f64, f64)]) -> Vec<CumulincPoint> {
        raw.iter().map(|&(age, value)| CumulincPoint { age, value }).collect()
    }

    #[test]
    fn lerp_between_points() {
        let p = pts(&[(20.0, 1.0), (30.0, 5.0), (40.0, 10.0)]);
        assert_eq!(lerp(35.0, &p), Some(7.5));
        assert_eq!(lerp(20.0, &p), Some(1.0));
        assert_eq!(lerp(40.0, &p), Some(10.0));
        assert_eq!(lerp(10.0, &p), None);
        assert_eq!(lerp(41.0, &p), None);
        assert_eq!(lerp(25.0, &[]), None);
    }

    #[test]
    fn lerp_duplicate_age() {
        let p = pts(&[(20.0, 1.0), (20.0, 3.0)]);
        assert_eq!(lerp(20.0, &p), Some(3.0));
    }

    #[test]
    fn empty_series_is_no_data() {
        let s = vec![CumulincSeries::new(FEMALE, vec![]), CumulincSeries::new(MALE, vec![])];
        assert!(CumulincPlot::new(s, Layout::default().cumulinc, None).is_none());
    }

    #[test]
    fn markers_hidden_independently() {
        let s = vec![
            CumulincSeries::new(MALE, pts(&[(50.0, 2.0), (60.0, 4.0)])),
            CumulincSeries::new(FEMALE, pts(&[(20.0, 1.0), (40.0, 3.0)])),
        ];
        let plot = CumulincPlot::new(s, Layout::default().cumulinc, None).unwrap();
        assert_eq!(plot.series()[0].name, FEMALE);
        let at30 = plot.hover(plot.x_scale().map(30.0));
        assert_eq!(at30.markers.len(), 1);
        assert_eq!(at30.markers[0].series, FEMALE);
        assert_eq!(at30.markers[0].label, "Female: 2%");
        let at55 = plot.hover(plot.x_scale().map(55.0));
        assert_eq!(at55.markers.len(), 1);
        assert_eq!(at55.markers[0].side, LabelSide::Right);
    }

    #[test]
    fn male_label_flips_near_right_edge() {
        let s = vec![CumulincSeries::new(MALE, pts(&[(0.0, 0.0), (100.0, 50.0)]))];
        let plot = CumulincPlot::new(s, Layout::default().cumulinc, None).unwrap();
        let r = plot.hover(530.0);
        assert_eq!(r.markers[0].side, LabelSide::Left);
        assert_eq!(r.markers[0].label_dx(), -4.0);
    }

    #[test]
    fn pointer_outside_plot_is_clamped() {
        let s = vec![CumulincSeries::new(FEMALE, pts(&[(0.0, 0.0), (100.0, 10.0)]))];
        let plot = CumulincPlot::new(s, Layout::default().cumulinc, None).unwrap();
        let r = plot.hover(0.0);
        assert_eq!(r.age, 0.0);
        assert_eq!(r.line_x, 55.0);
    }

    #[test]
    fn age_ticks_every_ten() {
        let s = vec![CumulincSeries::new(FEMALE, pts(&[(0.0, 0.0), (10.0, 1.0)]))];
        let plot = CumulincPlot::new(s, Layout::default().cumulinc, None).unwrap();
        let g = plot.geometry();
        assert_eq!(g.x_ticks.len(), 11);
        assert_eq!(g.x_ticks[10].label, "100");
        assert_eq!(g.curves[0].points[0], (55.0, 210.0));
    }

    #[test]
    fn max_value_narrows_domain() {
        let s = vec![CumulincSeries::new(FEMALE, pts(&[(0.0, 0.0), (10.0, 3.7)]))];
        let plot = CumulincPlot::new(s, Layout::default().cumulinc, Some(3.7)).unwrap();
        assert_eq!(plot.y_scale().domain(), (0.0, 4.0));
        let g = plot.geometry();
        let (first, last) = (&g.y_ticks[0], &g.y_ticks[g.y_ticks.len() - 1]);
        assert_eq!(first.value, 0.0);
        assert_eq!(last.value, 4.0);
        assert_eq!(last.label, "4");
        assert_eq!(last.y, plot.y_scale().map(4.0));
        assert!(g.y_ticks.windows(2).all(|w| w[0].value < w[1].value));
    }
}
