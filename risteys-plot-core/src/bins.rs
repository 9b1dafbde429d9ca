use serde::{Deserialize, Serialize};

/// Placeholder for a count hidden by small-count suppression.
pub const SUPPRESSED: f64 = f64::NAN;

pub fn is_suppressed(v: f64) -> bool {
    v.is_nan()
}

/// A bin carrying one plottable value.
pub trait Binned: Clone {
    fn value(&self) -> f64;
    fn set_value(&mut self, v: f64);

    fn is_suppressed(&self) -> bool {
        is_suppressed(self.value())
    }
}

/// Bin of a categorical distribution, e.g. one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteBin {
    pub name: String,
    #[serde(with = "sentinel")]
    pub value: f64,
}

impl DiscreteBin {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self { name: name.into(), value }
    }
}

impl Binned for DiscreteBin {
    fn value(&self) -> f64 {
        self.value
    }
    fn set_value(&mut self, v: f64) {
        self.value = v;
    }
}

/// `None` on either side is an open ("90+") bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub left: Option<f64>,
    pub right: Option<f64>,
}

impl Interval {
    pub fn closed(left: f64, right: f64) -> Self {
        Self { left: Some(left), right: Some(right) }
    }
    pub fn is_open(&self) -> bool {
        self.left.is_none() || self.right.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalBin {
    pub interval: Interval,
    #[serde(with = "sentinel")]
    pub count: f64,
}

impl IntervalBin {
    pub fn new(left: Option<f64>, right: Option<f64>, count: f64) -> Self {
        Self { interval: Interval { left, right }, count }
    }
}

impl Binned for IntervalBin {
    fn value(&self) -> f64 {
        self.count
    }
    fn set_value(&mut self, v: f64) {
        self.count = v;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CumulincPoint {
    pub age: f64,
    pub value: f64,
}

/// One subgroup curve (e.g. "female") of a cumulative-incidence plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulincSeries {
    pub name: String,
    pub cumulinc: Vec<CumulincPoint>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub dasharray: Option<String>,
}

impl CumulincSeries {
    pub fn new(name: impl Into<String>, points: Vec<CumulincPoint>) -> Self {
        Self { name: name.into(), cumulinc: points, color: None, dasharray: None }
    }
}

/// Wire form of a possibly-suppressed value.
///
/// Reads a number, `null` or the string `"NaN"`; writes `null` for the
/// sentinel since JSON has no NaN.
pub mod sentinel {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        if v.is_finite() {
            s.serialize_f64(*v)
        } else {
            s.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match Option::<Raw>::deserialize(d)? {
            None => Ok(f64::NAN),
            Some(Raw::Num(v)) if v.is_finite() => Ok(v),
            Some(Raw::Num(_)) => Ok(f64::NAN),
            Some(Raw::Text(t)) if t.eq_ignore_ascii_case("nan") => Ok(f64::NAN),
            Some(Raw::Text(t)) => t
                .trim()
                .parse::<f64>()
                .map_err(|_| de::Error::custom(format!("not a count: {t:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_sentinel_forms() {
        let bins: Vec<DiscreteBin> = serde_json::from_str(
            r#"[{"name":"2010","value":5},{"name":"2011","value":null},{"name":"2012","value":"NaN"}]"#,
        )
        .unwrap();
        assert_eq!(bins[0].value, 5.0);
        assert!(bins[1].is_suppressed());
        assert!(bins[2].is_suppressed());
    }

    #[test]
    fn writes_sentinel_as_null() {
        let out = serde_json::to_string(&DiscreteBin::new("x", SUPPRESSED)).unwrap();
        assert_eq!(out, r#"{"name":"x","value":null}"#);
    }

    #[test]
    fn interval_bounds_may_be_null() {
        let bin: IntervalBin =
            serde_json::from_str(r#"{"interval":{"left":90,"right":null},"count":12}"#).unwrap();
        assert_eq!(bin.interval.left, Some(90.0));
        assert!(bin.interval.right.is_none());
        assert!(bin.interval.is_open());
    }

    #[test]
    fn garbage_count_rejected() {
        let res: Result<DiscreteBin, _> = serde_json::from_str(r#"{"name":"a","value":"lots"}"#);
        assert!(res.is_err());
    }
}
