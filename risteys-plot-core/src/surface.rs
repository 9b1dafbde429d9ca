//! Rendering surfaces: one per mount id, each owning its bound bins, display
//! mode, hover state and the geometry derived from them.

use crate::bins::{Binned, CumulincSeries, DiscreteBin, IntervalBin};
use crate::cumulative::{convert, DisplayMode};
use crate::cumulinc::{CumulincGeometry, CumulincPlot, HoverReadout};
use crate::geometry::{
    band_geometry, hit_test, interval_geometry, BandBinGeometry, HistogramGeometry, HoverTarget,
    IntervalBinGeometry, TooltipAnchor,
};
use crate::layout::Layout;
use crate::normalize::{normalize_discrete, normalize_intervals, ClosedBin, Normalized};
use risteys_plot_common::{PlotConfig, Result, RisteysPlotError, TailPolicy};
use serde::{Deserialize, Serialize};

/// Element ids owned by a mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountIds {
    pub root: String,
    pub rects: String,
    pub xaxis: String,
    pub yaxis: String,
    pub tooltip: String,
}

impl MountIds {
    pub fn for_mount(mount: &str) -> Self {
        Self {
            root: mount.to_string(),
            rects: format!("{mount}_rects"),
            xaxis: format!("{mount}_xaxis"),
            yaxis: format!("{mount}_yaxis"),
            tooltip: format!("{mount}_tooltip"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    Interval,
    Discrete,
    Cumulinc,
}

/// Static description of a panel as embedded in the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub mount: String,
    pub kind: PanelKind,
    #[serde(default)]
    pub x_label: String,
    #[serde(default)]
    pub y_label: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub cumulative_toggle: bool,
    #[serde(default)]
    pub angled_labels: bool,
}

/// Everything a surface needs from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSettings {
    pub layout: Layout,
    pub tail_policy: TailPolicy,
    pub default_duration: f64,
}

impl PlotSettings {
    pub fn from_config(cfg: &PlotConfig) -> Self {
        Self {
            layout: Layout::from_config(cfg),
            tail_policy: cfg.tail_policy,
            default_duration: cfg.default_duration,
        }
    }
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self::from_config(&PlotConfig::default())
    }
}

/// Raw data as it arrives from a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelData {
    Interval(Vec<IntervalBin>),
    Discrete(Vec<DiscreteBin>),
    Cumulinc { series: Vec<CumulincSeries>, max_value: Option<f64> },
}

impl PanelData {
    pub fn kind(&self) -> PanelKind {
        match self {
            Self::Interval(_) => PanelKind::Interval,
            Self::Discrete(_) => PanelKind::Discrete,
            Self::Cumulinc { .. } => PanelKind::Cumulinc,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Bound {
    Interval(Normalized<ClosedBin>),
    Discrete(Normalized<DiscreteBin>),
    Cumulinc(Option<CumulincPlot>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SurfaceGeometry {
    Interval(HistogramGeometry<IntervalBinGeometry>),
    Band(HistogramGeometry<BandBinGeometry>),
    Cumulinc(CumulincGeometry),
    NoData,
}

impl SurfaceGeometry {
    pub fn subtitle(&self) -> Option<&'static str> {
        match self {
            Self::Interval(g) => g.subtitle(),
            Self::Band(g) => g.subtitle(),
            _ => None,
        }
    }

    pub fn bin_count(&self) -> usize {
        match self {
            Self::Interval(g) => g.bins.len(),
            Self::Band(g) => g.bins.len(),
            Self::Cumulinc(g) => g.curves.len(),
            Self::NoData => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HoverState {
    #[default]
    Idle,
    Bin(usize),
    Pointer(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub spec: PanelSpec,
    pub ids: MountIds,
    settings: PlotSettings,
    bound: Option<Bound>,
    mode: DisplayMode,
    hover: HoverState,
    geometry: SurfaceGeometry,
}

impl Surface {
    pub fn new(spec: PanelSpec, settings: PlotSettings) -> Self {
        let ids = MountIds::for_mount(&spec.mount);
        Self {
            spec,
            ids,
            settings,
            bound: None,
            mode: DisplayMode::PerPeriod,
            hover: HoverState::Idle,
            geometry: SurfaceGeometry::NoData,
        }
    }

    pub fn mount(&self) -> &str {
        &self.spec.mount
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn hover(&self) -> HoverState {
        self.hover
    }

    pub fn geometry(&self) -> &SurfaceGeometry {
        &self.geometry
    }

    pub fn settings(&self) -> &PlotSettings {
        &self.settings
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Normalize and bind new data, replacing whatever was bound before.
    /// The display mode resets to per-period.
    pub fn bind(&mut self, data: PanelData) -> Result<()> {
        if data.kind() != self.spec.kind {
            return Err(RisteysPlotError::Other(format!(
                "{}: expected {:?} data, got {:?}",
                self.spec.mount,
                self.spec.kind,
                data.kind()
            )));
        }
        let policy = self.settings.tail_policy;
        let bound = match data {
            PanelData::Interval(raw) => {
                Bound::Interval(normalize_intervals(&raw, policy, self.settings.default_duration)?)
            }
            PanelData::Discrete(raw) => Bound::Discrete(normalize_discrete(&raw, policy)),
            PanelData::Cumulinc { series, max_value } => {
                Bound::Cumulinc(CumulincPlot::new(series, self.settings.layout.cumulinc.clone(), max_value))
            }
        };
        self.bound = Some(bound);
        self.mode = DisplayMode::PerPeriod;
        self.hover = HoverState::Idle;
        self.rebuild()
    }

    fn rebuild(&mut self) -> Result<()> {
        let mount = self.spec.mount.as_str();
        let layout = &self.settings.layout.histogram;
        let built = match &self.bound {
            None => Ok(SurfaceGeometry::NoData),
            Some(Bound::Interval(n)) => interval_geometry(mount, n, layout).map(SurfaceGeometry::Interval),
            Some(Bound::Discrete(n)) => {
                band_geometry(mount, n, layout, self.spec.angled_labels).map(SurfaceGeometry::Band)
            }
            Some(Bound::Cumulinc(Some(plot))) => Ok(SurfaceGeometry::Cumulinc(plot.geometry())),
            Some(Bound::Cumulinc(None)) => Ok(SurfaceGeometry::NoData),
        };
        self.geometry = match built {
            Ok(g) => g,
            Err(RisteysPlotError::EmptyDistribution(what)) => {
                log::debug!("{mount}: nothing to draw in {what}");
                SurfaceGeometry::NoData
            }
            Err(e) => return Err(e),
        };
        Ok(())
    }

    /// Cumulative mode only makes sense on histograms with no suppressed bins.
    pub fn can_toggle(&self) -> bool {
        if !self.spec.cumulative_toggle {
            return false;
        }
        match &self.bound {
            Some(Bound::Interval(n)) => !n.bins.iter().any(Binned::is_suppressed),
            Some(Bound::Discrete(n)) => !n.bins.iter().any(Binned::is_suppressed),
            _ => false,
        }
    }

    /// Switch display mode. Returns whether anything changed; asking for the
    /// current mode does nothing.
    pub fn set_mode(&mut self, mode: DisplayMode) -> Result<bool> {
        if mode == self.mode {
            return Ok(false);
        }
        if !self.can_toggle() {
            log::debug!("{}: cumulative toggle unavailable", self.spec.mount);
            return Ok(false);
        }
        let from = self.mode;
        match &mut self.bound {
            Some(Bound::Interval(n)) => n.bins = convert(&n.bins, from, mode),
            Some(Bound::Discrete(n)) => n.bins = convert(&n.bins, from, mode),
            _ => return Ok(false),
        }
        self.mode = mode;
        self.rebuild()?;
        Ok(true)
    }

    pub fn toggle_cumulative(&mut self) -> Result<bool> {
        self.set_mode(self.mode.flipped())
    }

    /// Update hover from a pointer position in canvas pixels.
    pub fn pointer_move(&mut self, px: f64, py: f64) -> bool {
        let next = match &self.geometry {
            SurfaceGeometry::Interval(g) => bin_hover(&g.bins, px, py),
            SurfaceGeometry::Band(g) => bin_hover(&g.bins, px, py),
            SurfaceGeometry::Cumulinc(_) => {
                let l = &self.settings.layout.cumulinc;
                if (0.0..=l.canvas_width).contains(&px) && (0.0..=l.canvas_height).contains(&py) {
                    HoverState::Pointer(px)
                } else {
                    HoverState::Idle
                }
            }
            SurfaceGeometry::NoData => HoverState::Idle,
        };
        let changed = next != self.hover;
        self.hover = next;
        changed
    }

    pub fn pointer_leave(&mut self) {
        self.hover = HoverState::Idle;
    }

    /// Tooltip of the hovered histogram bin.
    pub fn tooltip(&self) -> Option<&TooltipAnchor> {
        let HoverState::Bin(idx) = self.hover else {
            return None;
        };
        match &self.geometry {
            SurfaceGeometry::Interval(g) => g.bins.get(idx).map(HoverTarget::tooltip),
            SurfaceGeometry::Band(g) => g.bins.get(idx).map(HoverTarget::tooltip),
            _ => None,
        }
    }

    /// Hover readout of a cumulative-incidence surface.
    pub fn readout(&self) -> Option<HoverReadout> {
        let HoverState::Pointer(px) = self.hover else {
            return None;
        };
        match &self.bound {
            Some(Bound::Cumulinc(Some(plot))) => Some(plot.hover(px)),
            _ => None,
        }
    }

    /// Canvas size of this surface in pixels.
    pub fn canvas_size(&self) -> (f64, f64) {
        match self.spec.kind {
            PanelKind::Cumulinc => {
                let l = &self.settings.layout.cumulinc;
                (l.canvas_width, l.canvas_height)
            }
            _ => {
                let l = &self.settings.layout.histogram;
                (l.canvas_width, l.canvas_height)
            }
        }
    }
}

fn bin_hover<G: HoverTarget>(bins: &[G], px: f64, py: f64) -> HoverState {
    hit_test(bins, px, py).map_or(HoverState::Idle, HoverState::Bin)
}

/// Surfaces in page order, looked up by mount id.
#[derive(Debug, Clone, Default)]
pub struct SurfaceRegistry {
    surfaces: Vec<Surface>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a surface, replacing any previous one on the same mount.
    pub fn insert(&mut self, surface: Surface) {
        match self.surfaces.iter_mut().find(|s| s.mount() == surface.mount()) {
            Some(slot) => *slot = surface,
            None => self.surfaces.push(surface),
        }
    }

    pub fn get(&self, mount: &str) -> Option<&Surface> {
        self.surfaces.iter().find(|s| s.mount() == mount)
    }

    pub fn get_mut(&mut self, mount: &str) -> Option<&mut Surface> {
        self.surfaces.iter_mut().find(|s| s.mount() == mount)
    }

    pub fn require_mut(&mut self, mount: &str) -> Result<&mut Surface> {
        self.get_mut(mount).ok_or_else(|| RisteysPlotError::UnknownMount(mount.to_string()))
    }

    pub fn index_of(&self, mount: &str) -> Option<usize> {
        self.surfaces.iter().position(|s| s.mount() == mount)
    }

    pub fn at(&self, idx: usize) -> Option<&Surface> {
        self.surfaces.get(idx)
    }

    pub fn at_mut(&mut self, idx: usize) -> Option<&mut Surface> {
        self.surfaces.get_mut(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.iter()
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bins::{CumulincPoint, SUPPRESSED};

    fn spec(mount: &str, kind: PanelKind) -> PanelSpec {
        PanelSpec {
            mount: mount.into(),
            kind,
            x_label: "Year".into(),
            y_label: "Individuals".into(),
            color: None,
            cumulative_toggle: true,
            angled_labels: false,
        }
    }

    fn years(values: &[f64]) -> PanelData {
        PanelData::Discrete(
            values.iter().enumerate().map(|(i, v)| DiscreteBin::new(format!("{}", 2010 + i), *v)).collect(),
        )
    }

    #[test]
    fn mount_ids() {
        let ids = MountIds::for_mount("bin-plot-year-FG");
        assert_eq!(ids.rects, "bin-plot-year-FG_rects");
        assert_eq!(ids.tooltip, "bin-plot-year-FG_tooltip");
    }

    #[test]
    fn toggle_rebinds_and_same_mode_is_noop() {
        let mut s = Surface::new(spec("y", PanelKind::Discrete), PlotSettings::default());
        s.bind(years(&[1.0, 2.0, 3.0])).unwrap();
        assert!(!s.set_mode(DisplayMode::PerPeriod).unwrap());
        assert!(s.toggle_cumulative().unwrap());
        assert_eq!(s.mode(), DisplayMode::Cumulative);
        let SurfaceGeometry::Band(g) = s.geometry() else { panic!("band geometry") };
        // last bar is now the tallest: 6 reaches the plot top
        assert!(g.bins[2].bar.height > g.bins[0].bar.height);
        assert!(!s.set_mode(DisplayMode::Cumulative).unwrap());
        assert!(s.toggle_cumulative().unwrap());
        assert_eq!(s.mode(), DisplayMode::PerPeriod);
    }

    #[test]
    fn suppressed_bins_disable_toggle() {
        let mut s = Surface::new(spec("y", PanelKind::Discrete), PlotSettings::default());
        s.bind(years(&[1.0, SUPPRESSED, 3.0])).unwrap();
        assert!(!s.can_toggle());
        assert!(!s.toggle_cumulative().unwrap());
        assert_eq!(s.mode(), DisplayMode::PerPeriod);
    }

    #[test]
    fn wrong_kind_rejected() {
        let mut s = Surface::new(spec("a", PanelKind::Interval), PlotSettings::default());
        assert!(s.bind(years(&[1.0])).is_err());
        assert!(!s.is_bound());
    }

    #[test]
    fn hover_enters_and_leaves() {
        let mut s = Surface::new(spec("y", PanelKind::Discrete), PlotSettings::default());
        s.bind(years(&[1000.0, 2500.0])).unwrap();
        let SurfaceGeometry::Band(g) = s.geometry() else { panic!("band geometry") };
        let target = g.bins[1].capbin;
        assert!(s.pointer_move(target.x + 1.0, target.y + 1.0));
        assert_eq!(s.hover(), HoverState::Bin(1));
        assert_eq!(s.tooltip().map(|t| t.text.as_str()), Some("2\u{a0}500"));
        assert!(!s.pointer_move(target.x + 2.0, target.y + 1.0));
        s.pointer_leave();
        assert!(s.tooltip().is_none());
    }

    #[test]
    fn all_suppressed_has_no_data() {
        let mut s = Surface::new(spec("y", PanelKind::Discrete), PlotSettings::default());
        s.bind(years(&[SUPPRESSED, SUPPRESSED])).unwrap();
        assert_eq!(s.geometry(), &SurfaceGeometry::NoData);
    }

    #[test]
    fn cumulinc_readout_follows_pointer() {
        let mut s = Surface::new(spec("c", PanelKind::Cumulinc), PlotSettings::default());
        let pts = vec![CumulincPoint { age: 20.0, value: 1.0 }, CumulincPoint { age: 40.0, value: 3.0 }];
        s.bind(PanelData::Cumulinc { series: vec![CumulincSeries::new("female", pts)], max_value: None })
            .unwrap();
        assert!(s.pointer_move(200.0, 100.0));
        let r = s.readout().unwrap();
        assert!((r.line_x - 200.0).abs() < 1e-9);
        assert!(s.tooltip().is_none());
    }

    #[test]
    fn registry_replaces_same_mount() {
        let mut reg = SurfaceRegistry::new();
        reg.insert(Surface::new(spec("a", PanelKind::Discrete), PlotSettings::default()));
        reg.insert(Surface::new(spec("b", PanelKind::Discrete), PlotSettings::default()));
        reg.insert(Surface::new(spec("a", PanelKind::Interval), PlotSettings::default()));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get("a").map(|s| s.spec.kind), Some(PanelKind::Interval));
        assert!(matches!(reg.require_mut("zzz"), Err(RisteysPlotError::UnknownMount(_))));
    }
}
