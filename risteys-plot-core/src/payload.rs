//! Page documents and channel messages, and how they map onto surfaces.

use crate::bins::{CumulincPoint, CumulincSeries, DiscreteBin, IntervalBin};
use crate::cumulinc::{FEMALE, MALE};
use crate::surface::{PanelData, PanelKind, PanelSpec};
use risteys_plot_common::{palette, Result, RisteysPlotError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

pub const DASH_FEMALE: &str = "1 0";
pub const DASH_MALE: &str = "9 1";

/// A page as rendered by the server: panels in display order, each optionally
/// carrying its data inline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub panels: Vec<Panel>,
    #[serde(default)]
    pub compboxes: Vec<CompBoxSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panel {
    #[serde(flatten)]
    pub spec: PanelSpec,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Inline comparison box in an association table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompBoxSpec {
    pub id: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub summary: Option<crate::compbox::HrSummary>,
}

impl Page {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub event: String,
    #[serde(default)]
    pub payload: Value,
}

impl ChannelMessage {
    pub fn new(event: impl Into<String>, payload: Value) -> Self {
        Self { event: event.into(), payload }
    }
}

/// Dataset suffix on mounts and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    FinnGen,
    FinRegistry,
}

impl Dataset {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "FG" => Some(Self::FinnGen),
            "FR" => Some(Self::FinRegistry),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::FinnGen => "FG",
            Self::FinRegistry => "FR",
        }
    }

    pub fn female_color(self) -> &'static str {
        match self {
            Self::FinnGen => palette::BLUE_BASE,
            Self::FinRegistry => palette::TEAL_500,
        }
    }

    pub fn bar_color(self) -> &'static str {
        match self {
            Self::FinnGen => palette::BLACK,
            Self::FinRegistry => palette::TEAL_500,
        }
    }

    /// Dataset a mount belongs to, from its `-FG`/`-FR` suffix.
    pub fn of_mount(mount: &str) -> Option<Self> {
        mount.rsplit('-').next().and_then(Self::parse)
    }
}

/// Where a channel event goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Panel { spec: PanelSpec, dataset: Dataset },
    SearchResults,
    Exclusion,
    Ignored,
}

fn default_spec(mount: String, kind: PanelKind, x_label: &str, y_label: &str, color: Option<&str>) -> PanelSpec {
    PanelSpec {
        mount,
        kind,
        x_label: x_label.into(),
        y_label: y_label.into(),
        color: color.map(str::to_string),
        cumulative_toggle: false,
        angled_labels: false,
    }
}

pub fn route(event: &str) -> Route {
    if event == "results" {
        return Route::SearchResults;
    }
    if event == "result_exclusion" {
        return Route::Exclusion;
    }
    let Some((stem, tag)) = event.rsplit_once('_') else {
        return Route::Ignored;
    };
    let Some(dataset) = Dataset::parse(tag) else {
        return Route::Ignored;
    };
    let color = Some(dataset.bar_color());
    let spec = match stem {
        "data_age_histogram" => {
            default_spec(format!("bin-plot-age-{tag}"), PanelKind::Interval, "Age", "Individuals", color)
        }
        "data_year_histogram" => {
            default_spec(format!("bin-plot-year-{tag}"), PanelKind::Interval, "Year", "Individuals", color)
        }
        "data_cumulative_incidence" => default_spec(
            format!("cumulinc-plot-{tag}"),
            PanelKind::Cumulinc,
            "Age",
            "Probability of first incidence (%)",
            None,
        ),
        _ => return Route::Ignored,
    };
    Route::Panel { spec, dataset }
}

#[derive(Debug, Deserialize)]
struct HistogramPayload<B> {
    data: Vec<B>,
}

#[derive(Debug, Deserialize)]
pub struct CumulincPayload {
    #[serde(default)]
    pub females: Vec<CumulincPoint>,
    #[serde(default)]
    pub males: Vec<CumulincPoint>,
    #[serde(default)]
    pub max_value: Option<f64>,
}

impl CumulincPayload {
    /// Two named series, female first, coloured for the dataset.
    pub fn into_series(self, female_color: &str) -> Vec<CumulincSeries> {
        vec![
            CumulincSeries {
                name: FEMALE.into(),
                cumulinc: self.females,
                color: Some(female_color.into()),
                dasharray: Some(DASH_FEMALE.into()),
            },
            CumulincSeries {
                name: MALE.into(),
                cumulinc: self.males,
                color: Some(palette::BLACK.into()),
                dasharray: Some(DASH_MALE.into()),
            },
        ]
    }
}

/// Histogram data is either a bare bin array or wrapped as `{"data": [...]}`.
fn histogram_bins<B: for<'de> Deserialize<'de>>(value: Value) -> Result<Vec<B>> {
    if value.is_array() {
        return Ok(serde_json::from_value(value)?);
    }
    let wrapped: HistogramPayload<B> = serde_json::from_value(value)?;
    Ok(wrapped.data)
}

/// Decode a payload for a panel of the given kind.
pub fn panel_data(spec: &PanelSpec, value: Value) -> Result<PanelData> {
    match spec.kind {
        PanelKind::Interval => Ok(PanelData::Interval(histogram_bins::<IntervalBin>(value)?)),
        PanelKind::Discrete => Ok(PanelData::Discrete(histogram_bins::<DiscreteBin>(value)?)),
        PanelKind::Cumulinc => {
            // Already-shaped series, as embedded in server-rendered pages.
            if value.is_array() {
                let series: Vec<CumulincSeries> = serde_json::from_value(value)?;
                return Ok(PanelData::Cumulinc { series, max_value: None });
            }
            let payload: CumulincPayload = serde_json::from_value(value)?;
            let female = spec
                .color
                .clone()
                .or_else(|| Dataset::of_mount(&spec.mount).map(|d| d.female_color().to_string()))
                .unwrap_or_else(|| palette::BLUE_BASE.to_string());
            let max_value = payload.max_value;
            Ok(PanelData::Cumulinc { series: payload.into_series(&female), max_value })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(alias = "phenocode", alias = "endpoint")]
    pub name: String,
    #[serde(default, alias = "longname")]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Hits from a `results` message (`payload.body.results`).
pub fn search_hits(payload: &Value) -> Result<Vec<SearchHit>> {
    let results = payload
        .pointer("/body/results")
        .ok_or_else(|| RisteysPlotError::Other("search payload without body.results".into()))?;
    Ok(serde_json::from_value(results.clone())?)
}

/// `Some(reason)` when the FinRegistry panels must not load.
pub fn exclusion(payload: &Value) -> Option<String> {
    match payload.get("excl") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// Read newline-delimited channel messages; blank lines are skipped.
pub fn read_messages(text: &str) -> Result<Vec<ChannelMessage>> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| serde_json::from_str(l).map_err(RisteysPlotError::from))
        .collect()
}
