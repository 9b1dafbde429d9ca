//! Hazard-ratio comparison box drawn inline in association tables.

use crate::geometry::Rect;
use crate::layout::{CompBoxDomain, CompBoxLayout};
use risteys_plot_common::{Result, RisteysPlotError};
use serde::{Deserialize, Serialize};

const PERCENTILE_FILL: &str = "#ececec";
const QUARTILE_FILL: &str = "#cacaca";
const MEDIAN_STROKE: &str = "#666";

/// Distribution summary of one association row, in hazard-ratio units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HrSummary {
    pub hr: f64,
    pub hr_min: f64,
    pub hr_max: f64,
    pub lop: f64, // 2.5th percentile
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub hip: f64, // 97.5th percentile
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompBoxInput {
    /// Position already binned to 0..1 against fixed quantiles.
    Binned(f64),
    Summary(HrSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompBoxGeometry {
    pub svg_width: f64,
    pub svg_height: f64,
    pub offset_x: f64,
    pub frame: Rect,
    pub percentile_box: Rect,
    pub quartile_box: Rect,
    pub median_x: f64,
    pub dot_x: f64,
    pub dot_y: f64,
    pub dot_r: f64,
}

fn span_rect(x0: f64, x1: f64, height: f64) -> Rect {
    Rect { x: x0, y: 0.0, width: x1 - x0, height }
}

pub fn compbox_geometry(layout: &CompBoxLayout, input: CompBoxInput) -> Result<CompBoxGeometry> {
    let h = layout.svg_height;
    let dot_r = h / 5.0;
    let (offset_x, box_width, to_box, marks) = match (layout.domain, input) {
        (CompBoxDomain::Binned, CompBoxInput::Binned(pos)) => {
            let margin = dot_r + 1.0; // keep the dot unclipped at either end
            let w = layout.svg_width - 2.0 * margin;
            let to_box: Box<dyn Fn(f64) -> f64> = Box::new(move |x| x * w);
            (margin, w, to_box, [0.025, 0.25, 0.5, 0.75, 0.975, pos])
        }
        (CompBoxDomain::HazardRatio { floor_min, floor_max }, CompBoxInput::Summary(s)) => {
            let lo = (s.hr_min - 1.0).min(floor_min);
            let hi = (s.hr_max + 1.0).max(floor_max);
            let w = layout.svg_width;
            let to_box: Box<dyn Fn(f64) -> f64> = Box::new(move |x| (x - lo) / (hi - lo) * w);
            (0.0, w, to_box, [s.lop, s.q1, s.median, s.q3, s.hip, s.hr])
        }
        (domain, input) => {
            return Err(RisteysPlotError::Other(format!(
                "compbox input {input:?} does not fit domain {domain:?}"
            )))
        }
    };
    let [lop, q1, median, q3, hip, hr] = marks.map(to_box);
    if lop > hip || q1 > q3 {
        log::warn!("compbox percentiles out of order, drawing them sorted");
    }
    let (lop, hip) = (lop.min(hip), lop.max(hip));
    let (q1, q3) = (q1.min(q3), q1.max(q3));
    Ok(CompBoxGeometry {
        svg_width: layout.svg_width,
        svg_height: h,
        offset_x,
        frame: span_rect(0.0, box_width, h),
        percentile_box: span_rect(lop, hip, h),
        quartile_box: span_rect(q1, q3, h),
        median_x: median,
        dot_x: hr,
        dot_y: h / 2.0,
        dot_r,
    })
}

fn rect_path(r: &Rect, stroke: &str, fill: &str) -> String {
    format!(
        "<path stroke=\"{stroke}\" fill=\"{fill}\" d=\"M{x},{y}h{w}v{h}h{nw}Z\" />",
        x = r.x,
        y = r.y,
        w = r.width,
        h = r.height,
        nw = -r.width
    )
}

impl CompBoxGeometry {
    pub fn to_svg(&self) -> String {
        let mut parts = vec![format!("<svg height=\"{}\" width=\"{}\">", self.svg_height, self.svg_width)];
        parts.push(format!("<g transform=\"translate({}, 0)\">", self.offset_x));
        parts.push(rect_path(&self.frame, "none", "#ffffff"));
        parts.push(rect_path(&self.percentile_box, "none", PERCENTILE_FILL));
        parts.push(rect_path(&self.quartile_box, "none", QUARTILE_FILL));
        parts.push(format!(
            "<path stroke=\"{MEDIAN_STROKE}\" fill=\"none\" d=\"M{x},0L{x},{h}\" />",
            x = self.median_x,
            h = self.svg_height
        ));
        parts.push(format!(
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"black\" stroke=\"black\"></circle>",
            self.dot_x, self.dot_y, self.dot_r
        ));
        parts.push(rect_path(&self.frame, "black", "none"));
        parts.push("</g></svg>".into());
        parts.join("")
    }
}
