use crate::bins::Binned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    PerPeriod,
    Cumulative,
}

impl DisplayMode {
    pub fn flipped(self) -> Self {
        match self {
            Self::PerPeriod => Self::Cumulative,
            Self::Cumulative => Self::PerPeriod,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PerPeriod => "per period",
            Self::Cumulative => "cumulative",
        }
    }
}

fn has_sentinel<B: Binned>(bins: &[B]) -> bool {
    bins.iter().any(|b| b.is_suppressed())
}

/// Running sum. Any suppressed value makes the sum meaningless, so the input
/// comes back untouched.
pub fn accumulate<B: Binned>(bins: &[B]) -> Vec<B> {
    if has_sentinel(bins) {
        return bins.to_vec();
    }
    let mut acc = 0.0;
    bins.iter()
        .map(|b| {
            acc += b.value();
            let mut out = b.clone();
            out.set_value(acc);
            out
        })
        .collect()
}

/// Inverse of [`accumulate`]: each value minus its predecessor.
pub fn decumulate<B: Binned>(bins: &[B]) -> Vec<B> {
    if has_sentinel(bins) {
        return bins.to_vec();
    }
    let mut prev = 0.0;
    bins.iter()
        .map(|b| {
            let cur = b.value();
            let mut out = b.clone();
            out.set_value(cur - prev);
            prev = cur;
            out
        })
        .collect()
}

/// Values as seen in `to`, given bins currently shown in `from`.
pub fn convert<B: Binned>(bins: &[B], from: DisplayMode, to: DisplayMode) -> Vec<B> {
    match (from, to) {
        (DisplayMode::PerPeriod, DisplayMode::Cumulative) => accumulate(bins),
        (DisplayMode::Cumulative, DisplayMode::PerPeriod) => decumulate(bins),
        _ => bins.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bins::{DiscreteBin, SUPPRESSED};

    fn bins(values: &[f64]) -> Vec<DiscreteBin> {
        values.iter().enumerate().map(|(i, v)| DiscreteBin::new(format!("{}", 2000 + i), *v)).collect()
    }

    fn values(b: &[DiscreteBin]) -> Vec<f64> {
        b.iter().map(|b| b.value).collect()
    }

    #[test]
    fn running_sum() {
        assert_eq!(values(&accumulate(&bins(&[1.0, 2.0, 3.0]))), [1.0, 3.0, 6.0]);
        assert_eq!(values(&decumulate(&bins(&[1.0, 3.0, 6.0]))), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn round_trip_within_tolerance() {
        let raw = bins(&[0.1, 0.2, 0.7, 12.5, 0.0]);
        let back = decumulate(&accumulate(&raw));
        for (a, b) in raw.iter().zip(&back) {
            assert_eq!(a.name, b.name);
            assert!((a.value - b.value).abs() < 1e-9);
        }
    }

    #[test]
    fn sentinel_short_circuits() {
        let raw = bins(&[5.0, SUPPRESSED, 7.0]);
        let acc = accumulate(&raw);
        assert_eq!(acc[0].value, 5.0);
        assert!(acc[1].value.is_nan());
        assert_eq!(acc[2].value, 7.0);
        let dec = decumulate(&raw);
        assert_eq!(dec[2].value, 7.0);
    }

    #[test]
    fn same_mode_is_identity() {
        let raw = bins(&[1.0, 2.0]);
        let out = convert(&raw, DisplayMode::Cumulative, DisplayMode::Cumulative);
        assert_eq!(out, raw);
        assert_eq!(DisplayMode::PerPeriod.flipped(), DisplayMode::Cumulative);
    }

    #[test]
    fn empty_is_empty() {
        assert!(accumulate::<DiscreteBin>(&[]).is_empty());
    }
}
