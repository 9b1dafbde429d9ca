use crate::bins::{Binned, DiscreteBin, IntervalBin};
use risteys_plot_common::{Result, RisteysPlotError, TailPolicy};
use serde::{Deserialize, Serialize};

/// Cleaned bins plus whether any suppressed bin was dropped (drives the
/// "bins with 1 to 5 individuals are not shown" subtitle).
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<B> {
    pub bins: Vec<B>,
    pub nan_tails: bool,
}

pub fn strip_suppressed<B: Binned>(bins: &[B], policy: TailPolicy) -> Normalized<B> {
    let kept: Vec<B> = match policy {
        TailPolicy::StripAny => bins.iter().filter(|b| !b.is_suppressed()).cloned().collect(),
        TailPolicy::StripEdges => {
            let first = bins.iter().position(|b| !b.is_suppressed());
            let last = bins.iter().rposition(|b| !b.is_suppressed());
            match (first, last) {
                (Some(lo), Some(hi)) => bins[lo..=hi].to_vec(),
                _ => Vec::new(), // every bin suppressed
            }
        }
    };
    let nan_tails = kept.len() != bins.len();
    if nan_tails {
        log::debug!("stripped {} suppressed bin(s) ({policy:?})", bins.len() - kept.len());
    }
    Normalized { bins: kept, nan_tails }
}

pub fn normalize_discrete(raw: &[DiscreteBin], policy: TailPolicy) -> Normalized<DiscreteBin> {
    strip_suppressed(raw, policy)
}

/// Interval bin after open bounds were given the default span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedBin {
    pub left: f64,
    pub right: f64,
    pub count: f64,
    pub open_left: bool,
    pub open_right: bool,
}

impl ClosedBin {
    pub fn midpoint(&self) -> f64 {
        (self.left + self.right) / 2.0
    }

    /// Axis label for the bin, keeping the open side visible ("90+", "<10").
    pub fn label(&self) -> String {
        match (self.open_left, self.open_right) {
            (true, _) => format!("<{}", fmt_bound(self.right)),
            (_, true) => format!("{}+", fmt_bound(self.left)),
            _ => format!("{}-{}", fmt_bound(self.left), fmt_bound(self.right)),
        }
    }
}

impl Binned for ClosedBin {
    fn value(&self) -> f64 {
        self.count
    }
    fn set_value(&mut self, v: f64) {
        self.count = v;
    }
}

pub(crate) fn fmt_bound(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

pub fn close_interval(idx: usize, bin: &IntervalBin, default_duration: f64) -> Result<ClosedBin> {
    let (left, right) = match (bin.interval.left, bin.interval.right) {
        (Some(l), Some(r)) => (l, r),
        (None, Some(r)) => (r - default_duration, r),
        (Some(l), None) => (l, l + default_duration),
        (None, None) => return Err(RisteysPlotError::OpenInterval(idx)),
    };
    if left > right {
        return Err(RisteysPlotError::Other(format!(
            "bin {idx}: interval left {left} > right {right}"
        )));
    }
    Ok(ClosedBin {
        left,
        right,
        count: bin.count,
        open_left: bin.interval.left.is_none(),
        open_right: bin.interval.right.is_none(),
    })
}

pub fn close_intervals(bins: &[IntervalBin], default_duration: f64) -> Result<Vec<ClosedBin>> {
    bins.iter()
        .enumerate()
        .map(|(i, b)| close_interval(i, b, default_duration))
        .collect()
}

/// Strip suppressed tails, then close open intervals.
pub fn normalize_intervals(
    raw: &[IntervalBin],
    policy: TailPolicy,
    default_duration: f64,
) -> Result<Normalized<ClosedBin>> {
    let stripped = strip_suppressed(raw, policy);
    Ok(Normalized {
        bins: close_intervals(&stripped.bins, default_duration)?,
        nan_tails: stripped.nan_tails,
    })
}
