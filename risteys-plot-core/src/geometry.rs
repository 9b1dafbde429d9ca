use crate::bins::{is_suppressed, DiscreteBin};
use crate::layout::HistogramLayout;
use crate::normalize::{fmt_bound, ClosedBin, Normalized};
use crate::scale::{extent, format_si, format_thousands, BandScale, LinearScale};
use risteys_plot_common::{Result, RisteysPlotError};
use serde::Serialize;

pub const SUPPRESSION_NOTICE: &str = "(bins with 1 to 5 individuals are not shown)";
const SUPPRESSED_TOOLTIP: &str = "1 to 5";
const ANGLED_LABEL_DEG: f64 = -50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickMark {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub label: String,
    pub label_x: f64,
    pub label_y: f64,
    pub rotate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YTick {
    pub y: f64,
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipAnchor {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BarStyle {
    Normal,
    Suppressed,
}

/// One bin of a variable-width interval histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalBinGeometry {
    pub id: String,
    pub capbin: Rect, // invisible hover target, full plot height, no gaps
    pub hbin: Rect,
    pub vbin: Rect,
    pub tooltip: TooltipAnchor,
}

/// One bar of a categorical (band) histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandBinGeometry {
    pub id: String,
    pub name: String,
    pub bar: Rect,
    pub capbin: Rect,
    pub tooltip: TooltipAnchor,
    pub style: BarStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramGeometry<G> {
    pub bins: Vec<G>,
    pub x_ticks: Vec<TickMark>,
    pub y_ticks: Vec<YTick>,
    pub nan_tails: bool,
}

impl<G> HistogramGeometry<G> {
    pub fn subtitle(&self) -> Option<&'static str> {
        self.nan_tails.then_some(SUPPRESSION_NOTICE)
    }
}

pub trait HoverTarget {
    fn capture(&self) -> &Rect;
    fn tooltip(&self) -> &TooltipAnchor;
}

impl HoverTarget for IntervalBinGeometry {
    fn capture(&self) -> &Rect {
        &self.capbin
    }
    fn tooltip(&self) -> &TooltipAnchor {
        &self.tooltip
    }
}

impl HoverTarget for BandBinGeometry {
    fn capture(&self) -> &Rect {
        &self.capbin
    }
    fn tooltip(&self) -> &TooltipAnchor {
        &self.tooltip
    }
}

/// Index of the bin whose capture rectangle contains the point.
pub fn hit_test<G: HoverTarget>(bins: &[G], px: f64, py: f64) -> Option<usize> {
    bins.iter().position(|b| b.capture().contains(px, py))
}

pub fn bin_id(mount: &str, idx: usize) -> String {
    format!("{mount}-datum{idx}")
}

fn tooltip_text(v: f64) -> String {
    if is_suppressed(v) {
        SUPPRESSED_TOOLTIP.into()
    } else {
        format_thousands(v)
    }
}

/// `[0, max value]`, niced, onto the inverted plot height.
pub fn value_y_scale(values: impl IntoIterator<Item = f64>, layout: &HistogramLayout) -> LinearScale {
    let max = values.into_iter().filter(|v| !v.is_nan()).fold(0.0_f64, f64::max);
    LinearScale::new((0.0, max), layout.y_range()).nice(layout.y_tick_count)
}

pub fn y_ticks(scale: &LinearScale, layout: &HistogramLayout) -> Vec<YTick> {
    scale
        .ticks(layout.y_tick_count)
        .into_iter()
        .map(|v| YTick { y: scale.map(v), value: v, label: format_si(v) })
        .collect()
}

pub fn interval_x_scale(bins: &[ClosedBin], layout: &HistogramLayout) -> Result<LinearScale> {
    let (lo, hi) = extent(bins.iter().flat_map(|b| [b.left, b.right]))
        .ok_or_else(|| RisteysPlotError::EmptyDistribution("interval histogram".into()))?;
    Ok(LinearScale::new((lo, hi), layout.x_range()))
}

/// Horizontal extent of bin `idx`; inner edges give up half a gap each.
pub fn bin_x_span(
    scale: &LinearScale,
    bins: &[ClosedBin],
    idx: usize,
    gap: f64,
    with_gaps: bool,
) -> (f64, f64) {
    let half_gap = gap / 2.0;
    let bin = &bins[idx];
    let mut x1 = scale.map(bin.left);
    let mut x2 = scale.map(bin.right);
    if with_gaps && idx != 0 {
        x1 += half_gap;
    }
    if with_gaps && idx + 1 != bins.len() {
        x2 -= half_gap;
    }
    (x1, x2)
}

/// Unique sorted bounds that were present in the payload (closed-off ends get no tick).
fn interval_tick_values(bins: &[ClosedBin]) -> Vec<f64> {
    let mut values: Vec<f64> = bins
        .iter()
        .flat_map(|b| {
            let left = (!b.open_left).then_some(b.left);
            let right = (!b.open_right).then_some(b.right);
            [left, right]
        })
        .flatten()
        .collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();
    values
}

pub fn interval_geometry(
    mount: &str,
    data: &Normalized<ClosedBin>,
    layout: &HistogramLayout,
) -> Result<HistogramGeometry<IntervalBinGeometry>> {
    let bins = &data.bins;
    let x = interval_x_scale(bins, layout)?;
    let y = value_y_scale(bins.iter().map(|b| b.count), layout);
    let y0 = y.map(0.0);
    let geoms = bins
        .iter()
        .enumerate()
        .map(|(idx, bin)| {
            let (x1, x2) = bin_x_span(&x, bins, idx, layout.hbin_gap, true);
            let (cx1, cx2) = bin_x_span(&x, bins, idx, layout.hbin_gap, false);
            let middle = (x1 + x2) / 2.0;
            let vbin_width = layout.vbin_width.min((x2 - x1).max(0.0));
            let top = if bin.count.is_nan() { y0 } else { y.map(bin.count) };
            IntervalBinGeometry {
                id: bin_id(mount, idx),
                capbin: Rect {
                    x: cx1,
                    y: layout.plot_top(),
                    width: cx2 - cx1,
                    height: layout.plot_height() + layout.hbin_height,
                },
                hbin: Rect { x: x1, y: layout.plot_bottom(), width: x2 - x1, height: layout.hbin_height },
                vbin: Rect { x: middle - vbin_width / 2.0, y: top, width: vbin_width, height: y0 - top },
                tooltip: TooltipAnchor { x: middle, y: layout.tooltip_margin_top, text: tooltip_text(bin.count) },
            }
        })
        .collect();
    let tick_y1 = layout.plot_bottom() + layout.hbin_height + 1.0;
    let label_y = layout.canvas_height - layout.x_tick_label_margin_bottom;
    let x_ticks = interval_tick_values(bins)
        .into_iter()
        .map(|v| {
            let px = x.map(v);
            TickMark {
                x1: px,
                y1: tick_y1,
                x2: px,
                y2: tick_y1 + layout.x_tick_height,
                label: fmt_bound(v),
                label_x: px,
                label_y,
                rotate: 0.0,
            }
        })
        .collect();
    Ok(HistogramGeometry { bins: geoms, x_ticks, y_ticks: y_ticks(&y, layout), nan_tails: data.nan_tails })
}

pub fn band_x_scale(bins: &[DiscreteBin], layout: &HistogramLayout) -> BandScale {
    let names: Vec<&str> = bins.iter().map(|b| b.name.as_str()).collect();
    BandScale::new(&names, layout.x_range())
        .padding_inner(layout.band_padding_inner)
        .padding_outer(layout.band_padding_outer)
}

pub fn band_geometry(
    mount: &str,
    data: &Normalized<DiscreteBin>,
    layout: &HistogramLayout,
    angled_labels: bool,
) -> Result<HistogramGeometry<BandBinGeometry>> {
    let bins = &data.bins;
    if bins.is_empty() {
        return Err(RisteysPlotError::EmptyDistribution("band histogram".into()));
    }
    let x = band_x_scale(bins, layout);
    let y = value_y_scale(bins.iter().map(|b| b.value), layout);
    let y0 = y.map(0.0);
    let bw = x.bandwidth();
    let step = x.step();
    let geoms = bins
        .iter()
        .enumerate()
        .map(|(idx, bin)| {
            let bx = x.position(&bin.name).unwrap_or_else(|| x.position_at(idx));
            let suppressed = is_suppressed(bin.value);
            let top = if suppressed { y0 } else { y.map(bin.value) };
            BandBinGeometry {
                id: bin_id(mount, idx),
                name: bin.name.clone(),
                bar: Rect { x: bx, y: top, width: bw, height: y0 - top },
                capbin: Rect {
                    x: bx - (step - bw) / 2.0,
                    y: layout.plot_top(),
                    width: step,
                    height: layout.plot_height(),
                },
                tooltip: TooltipAnchor { x: bx + bw / 2.0, y: layout.tooltip_margin_top, text: tooltip_text(bin.value) },
                style: if suppressed { BarStyle::Suppressed } else { BarStyle::Normal },
            }
        })
        .collect();
    let tick_y1 = layout.plot_bottom();
    let x_ticks = x
        .keys()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let px = x.position_at(i) + bw / 2.0;
            TickMark {
                x1: px,
                y1: tick_y1,
                x2: px,
                y2: tick_y1 + layout.x_tick_height,
                label: name.clone(),
                label_x: px,
                label_y: tick_y1 + layout.x_tick_height + 12.0,
                rotate: if angled_labels { ANGLED_LABEL_DEG } else { 0.0 },
            }
        })
        .collect();
    Ok(HistogramGeometry { bins: geoms, x_ticks, y_ticks: y_ticks(&y, layout), nan_tails: data.nan_tails })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridLine {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke: &'static str,
}

/// 10px drawing-debug grid, every 100px emphasised.
pub fn debug_grid(width: f64, height: f64) -> Vec<GridLine> {
    let mut out = Vec::new();
    let mut xx = 0.0;
    while xx < width {
        let stroke = if xx % 100.0 == 0.0 { "rgba(255, 182, 88, 0.5)" } else { "rgba(178, 232, 217, 0.5)" };
        out.push(GridLine { x1: xx, y1: 0.0, x2: xx, y2: height, stroke });
        xx += 10.0;
    }
    let mut yy = 0.0;
    while yy < height {
        let stroke = if yy % 100.0 == 0.0 { "rgba(0, 0, 0, 0.20)" } else { "rgba(0, 0, 0, 0.1)" };
        out.push(GridLine { x1: 0.0, y1: yy, x2: width, y2: yy, stroke });
        yy += 10.0;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bins::{IntervalBin, SUPPRESSED};
    use crate::layout::Layout;
    use crate::normalize::{normalize_discrete, normalize_intervals};
    use risteys_plot_common::TailPolicy;

    fn age_bins() -> Vec<IntervalBin> {
        vec![
            IntervalBin::new(None, Some(10.0), 3.0),
            IntervalBin::new(Some(10.0), Some(20.0), 8.0),
            IntervalBin::new(Some(20.0), None, 5.0),
        ]
    }

    #[test]
    fn outer_edges_have_no_gap() {
        let layout = Layout::default().histogram;
        let n = normalize_intervals(&age_bins(), TailPolicy::StripEdges, 10.0).unwrap();
        let g = interval_geometry("p", &n, &layout).unwrap();
        assert_eq!(g.bins[0].hbin.x, layout.plot_left());
        let last = &g.bins[2].hbin;
        assert!((last.x + last.width - layout.plot_right()).abs() < 1e-9);
        // inner edges are a full gap apart
        let gap = g.bins[1].hbin.x - (g.bins[0].hbin.x + g.bins[0].hbin.width);
        assert!((gap - layout.hbin_gap).abs() < 1e-9);
    }

    #[test]
    fn capture_rects_tile_plot() {
        let layout = Layout::default().histogram;
        let n = normalize_intervals(&age_bins(), TailPolicy::StripEdges, 10.0).unwrap();
        let g = interval_geometry("p", &n, &layout).unwrap();
        for w in g.bins.windows(2) {
            assert!((w[0].capbin.x + w[0].capbin.width - w[1].capbin.x).abs() < 1e-9);
        }
        assert_eq!(g.bins[1].capbin.y, layout.plot_top());
        assert_eq!(g.bins[1].capbin.height, layout.plot_height() + layout.hbin_height);
        let mid = &g.bins[1].capbin;
        assert_eq!(hit_test(&g.bins, mid.x + 1.0, mid.y + 1.0), Some(1));
        assert_eq!(hit_test(&g.bins, 0.0, 0.0), None);
    }

    #[test]
    fn ticks_skip_closed_off_ends() {
        let layout = Layout::default().histogram;
        let n = normalize_intervals(&age_bins(), TailPolicy::StripEdges, 10.0).unwrap();
        let g = interval_geometry("p", &n, &layout).unwrap();
        let labels: Vec<&str> = g.x_ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["10", "20"]);
    }

    #[test]
    fn tallest_bar_reaches_niced_top() {
        let layout = Layout::default().histogram;
        let n = normalize_intervals(&age_bins(), TailPolicy::StripEdges, 10.0).unwrap();
        let g = interval_geometry("p", &n, &layout).unwrap();
        // max 8 nices to 8, so the bar spans the plot
        assert!((g.bins[1].vbin.y - layout.plot_top()).abs() < 1e-9);
        assert!((g.bins[1].vbin.height - layout.plot_height()).abs() < 1e-9);
        assert_eq!(g.bins[1].tooltip.text, "8");
        assert_eq!(g.bins[1].id, "p-datum1");
    }

    #[test]
    fn band_bars_match_names() {
        let layout = Layout::for_generation(risteys_plot_common::Generation::FinregistryR8).histogram;
        let raw = vec![
            DiscreteBin::new("2010", SUPPRESSED),
            DiscreteBin::new("2011", 4.0),
            DiscreteBin::new("2012", 2.0),
        ];
        let n = normalize_discrete(&raw, TailPolicy::StripEdges);
        let g = band_geometry("y", &n, &layout, true).unwrap();
        assert_eq!(g.bins.len(), 2);
        assert_eq!(g.subtitle(), Some(SUPPRESSION_NOTICE));
        assert!(g.bins[0].bar.height > g.bins[1].bar.height);
        assert_eq!(g.x_ticks[0].rotate, ANGLED_LABEL_DEG);
    }

    #[test]
    fn interior_sentinel_is_greyed_placeholder() {
        let layout = Layout::default().histogram;
        let raw = vec![
            DiscreteBin::new("a", 3.0),
            DiscreteBin::new("b", SUPPRESSED),
            DiscreteBin::new("c", 6.0),
        ];
        let n = normalize_discrete(&raw, TailPolicy::StripEdges);
        let g = band_geometry("m", &n, &layout, false).unwrap();
        assert_eq!(g.bins[1].style, BarStyle::Suppressed);
        assert_eq!(g.bins[1].bar.height, 0.0);
        assert_eq!(g.bins[1].tooltip.text, SUPPRESSED_TOOLTIP);
        assert!(g.subtitle().is_none());
    }

    #[test]
    fn all_zero_counts_do_not_panic() {
        let layout = Layout::default().histogram;
        let raw = vec![DiscreteBin::new("a", 0.0), DiscreteBin::new("b", 0.0)];
        let n = normalize_discrete(&raw, TailPolicy::StripAny);
        let g = band_geometry("z", &n, &layout, false).unwrap();
        assert!(g.bins.iter().all(|b| b.bar.height == 0.0));
        assert_eq!(g.y_ticks.len(), 1);
    }

    #[test]
    fn empty_band_is_error() {
        let layout = Layout::default().histogram;
        let n = Normalized { bins: Vec::<DiscreteBin>::new(), nan_tails: true };
        assert!(band_geometry("e", &n, &layout, false).is_err());
    }
}
