use risteys_plot_common::{palette, Generation, PlotConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Pixel dimensions of a histogram canvas (both interval and band flavours).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramLayout {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub margin: Margins,
    pub hbin_height: f64, // thin bar marking the interval span under the axis
    pub hbin_gap: f64,
    pub vbin_width: f64,
    pub bar_color: String,
    pub band_padding_inner: f64,
    pub band_padding_outer: f64,
    pub tooltip_margin_top: f64,
    pub x_tick_height: f64,
    pub x_tick_label_margin_bottom: f64,
    pub y_tick_count: usize,
}

impl HistogramLayout {
    pub fn plot_left(&self) -> f64 {
        self.margin.left
    }
    pub fn plot_right(&self) -> f64 {
        self.canvas_width - self.margin.right
    }
    pub fn plot_top(&self) -> f64 {
        self.margin.top
    }
    pub fn plot_bottom(&self) -> f64 {
        self.canvas_height - self.margin.bottom
    }
    pub fn plot_height(&self) -> f64 {
        self.plot_bottom() - self.plot_top()
    }
    pub fn x_range(&self) -> (f64, f64) {
        (self.plot_left(), self.plot_right())
    }
    /// Inverted: pixel Y grows downward.
    pub fn y_range(&self) -> (f64, f64) {
        (self.plot_bottom(), self.plot_top())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulincLayout {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub margin: Margins,
    pub age_domain: (f64, f64),
    pub value_domain: (f64, f64), // percent
    pub age_tick_step: f64,
    pub label_flip_ratio: f64, // past this share of the width the male label moves left
    pub marker_radius: f64,
}

impl CumulincLayout {
    pub fn x_range(&self) -> (f64, f64) {
        (self.margin.left, self.canvas_width - self.margin.right)
    }
    pub fn y_range(&self) -> (f64, f64) {
        (self.canvas_height - self.margin.bottom, self.margin.top)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CompBoxDomain {
    /// Value is already a 0..1 position inside the box.
    Binned,
    /// Hazard ratios, domain widened to at least `floor_min..floor_max`.
    HazardRatio { floor_min: f64, floor_max: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompBoxLayout {
    pub svg_width: f64,
    pub svg_height: f64,
    pub domain: CompBoxDomain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub generation: Generation,
    pub histogram: HistogramLayout,
    pub cumulinc: CumulincLayout,
    pub compbox: CompBoxLayout,
}

fn cumulinc_default() -> CumulincLayout {
    CumulincLayout {
        canvas_width: 535.0,
        canvas_height: 260.0,
        margin: Margins { left: 55.0, right: 0.0, top: 0.0, bottom: 50.0 },
        age_domain: (0.0, 100.0),
        value_domain: (0.0, 100.0),
        age_tick_step: 10.0,
        label_flip_ratio: 0.9,
        marker_radius: 4.0,
    }
}

impl Layout {
    pub fn for_generation(generation: Generation) -> Self {
        match generation {
            Generation::Risteys => Self {
                generation,
                histogram: HistogramLayout {
                    canvas_width: 580.0,
                    canvas_height: 320.0,
                    margin: Margins { left: 55.0, right: 15.0, top: 15.0, bottom: 45.0 },
                    hbin_height: 3.0,
                    hbin_gap: 3.0,
                    vbin_width: 30.0,
                    bar_color: palette::GREEN_DARK.into(),
                    band_padding_inner: 0.2,
                    band_padding_outer: 0.2,
                    tooltip_margin_top: 12.0,
                    x_tick_height: 5.0,
                    x_tick_label_margin_bottom: 27.0,
                    y_tick_count: 10,
                },
                cumulinc: cumulinc_default(),
                compbox: CompBoxLayout {
                    svg_width: 55.0,
                    svg_height: 14.0,
                    domain: CompBoxDomain::Binned,
                },
            },
            Generation::FinregistryR8 => Self {
                generation,
                histogram: HistogramLayout {
                    canvas_width: 535.0,
                    canvas_height: 300.0,
                    margin: Margins { left: 35.0, right: 0.0, top: 15.0, bottom: 50.0 },
                    hbin_height: 3.0,
                    hbin_gap: 3.0,
                    vbin_width: 30.0,
                    bar_color: palette::BLUE_R8.into(),
                    band_padding_inner: 0.05,
                    band_padding_outer: 0.0,
                    tooltip_margin_top: 12.0,
                    x_tick_height: 5.0,
                    x_tick_label_margin_bottom: 27.0,
                    y_tick_count: 10,
                },
                cumulinc: cumulinc_default(),
                compbox: CompBoxLayout {
                    svg_width: 60.0,
                    svg_height: 16.0,
                    domain: CompBoxDomain::HazardRatio { floor_min: -3.0, floor_max: 3.0 },
                },
            },
            Generation::FinngenR4 => Self {
                generation,
                histogram: HistogramLayout {
                    canvas_width: 600.0,
                    canvas_height: 300.0,
                    margin: Margins { left: 70.0, right: 0.0, top: 20.0, bottom: 50.0 },
                    hbin_height: 3.0,
                    hbin_gap: 3.0,
                    vbin_width: 30.0,
                    bar_color: palette::STEELBLUE.into(),
                    band_padding_inner: 0.2,
                    band_padding_outer: 0.2,
                    tooltip_margin_top: 12.0,
                    x_tick_height: 5.0,
                    x_tick_label_margin_bottom: 27.0,
                    y_tick_count: 10,
                },
                cumulinc: cumulinc_default(),
                compbox: CompBoxLayout {
                    svg_width: 60.0,
                    svg_height: 16.0,
                    domain: CompBoxDomain::HazardRatio { floor_min: -3.0, floor_max: 3.0 },
                },
            },
        }
    }

    /// Generation preset with the config's overrides applied.
    pub fn from_config(cfg: &PlotConfig) -> Self {
        let mut layout = Self::for_generation(cfg.generation);
        if let Some(p) = cfg.band_padding {
            layout.histogram.band_padding_inner = p;
        }
        if let Some(w) = cfg.canvas_width {
            layout.histogram.canvas_width = w;
        }
        if let Some(h) = cfg.canvas_height {
            layout.histogram.canvas_height = h;
        }
        layout
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::for_generation(Generation::default())
    }
}
