//! Domain-to-pixel mappings.
//!
//! Scales are cheap values rebuilt from the current bins every time the data
//! changes; nothing here caches across data changes.

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
    clamp: bool,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range, clamp: false }
    }

    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        if denom == 0.0 || !denom.is_finite() {
            return r0; // collapsed domain, e.g. all-zero counts
        }
        let mut t = (x - d0) / denom;
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        r0 + t * (r1 - r0)
    }

    pub fn invert(&self, y: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = r1 - r0;
        if denom == 0.0 {
            return d0;
        }
        let mut t = (y - r0) / denom;
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        d0 + t * (d1 - d0)
    }

    /// Extend the domain outward to round tick steps.
    pub fn nice(mut self, count: usize) -> Self {
        let (mut start, mut stop) = self.domain;
        if start == stop || !start.is_finite() || !stop.is_finite() {
            return self; // nice(0..0) stays 0..0
        }
        let reversed = stop < start;
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }
        let mut prestep = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count as f64);
            if prestep == Some(step) {
                break;
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            prestep = Some(step);
        }
        self.domain = if reversed { (stop, start) } else { (start, stop) };
        self
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }
}

fn tick_increment(start: f64, stop: f64, count: f64) -> f64 {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = tick_factor(error);
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -10f64.powf(-power) / factor
    }
}

fn tick_factor(error: f64) -> f64 {
    if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    }
}

/// Round tick values covering `[start, stop]`, about `count` of them.
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reversed = stop < start;
    let (lo, hi) = if reversed { (stop, start) } else { (start, stop) };
    let (i1, i2, inc) = tick_spec(lo, hi, count as f64);
    if i2 < i1 {
        return Vec::new();
    }
    let mut out: Vec<f64> = (0..=(i2 - i1) as i64)
        .map(|i| {
            let k = i1 + i as f64;
            if inc < 0.0 {
                k / -inc
            } else {
                k * inc
            }
        })
        .collect();
    if reversed {
        out.reverse();
    }
    out
}

fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = tick_factor(error);
    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let p = 10f64.powf(-power) / factor;
        i1 = (start * p).round();
        i2 = (stop * p).round();
        if i1 / p < start {
            i1 += 1.0;
        }
        if i2 / p > stop {
            i2 -= 1.0;
        }
        inc = -p;
    } else {
        let p = 10f64.powf(power) * factor;
        i1 = (start / p).round();
        i2 = (stop / p).round();
        if i1 * p < start {
            i1 += 1.0;
        }
        if i2 * p > stop {
            i2 -= 1.0;
        }
        inc = p;
    }
    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Ordered categorical keys to equal, non-overlapping pixel bands.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    keys: Vec<String>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
    align: f64,
}

impl BandScale {
    /// Duplicate keys keep their first position.
    pub fn new<S: AsRef<str>>(keys: &[S], range: (f64, f64)) -> Self {
        let mut uniq: Vec<String> = Vec::with_capacity(keys.len());
        for k in keys {
            if !uniq.iter().any(|u| u == k.as_ref()) {
                uniq.push(k.as_ref().to_owned());
            }
        }
        Self { keys: uniq, range, padding_inner: 0.0, padding_outer: 0.0, align: 0.5 }
    }

    pub fn padding_inner(mut self, p: f64) -> Self {
        self.padding_inner = p.clamp(0.0, 1.0);
        self
    }

    pub fn padding_outer(mut self, p: f64) -> Self {
        self.padding_outer = p.max(0.0);
        self
    }

    /// Same padding inside and outside.
    pub fn padding(self, p: f64) -> Self {
        self.padding_inner(p).padding_outer(p)
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    fn layout(&self) -> (f64, f64) {
        let n = self.keys.len() as f64;
        let (r0, r1) = self.range;
        let (start, stop) = if r1 < r0 { (r1, r0) } else { (r0, r1) };
        let step = (stop - start) / (n - self.padding_inner + self.padding_outer * 2.0).max(1.0);
        let start = start + (stop - start - step * (n - self.padding_inner)) * self.align;
        (start, step)
    }

    pub fn step(&self) -> f64 {
        self.layout().1
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding_inner)
    }

    pub fn position_at(&self, index: usize) -> f64 {
        let (start, step) = self.layout();
        let n = self.keys.len();
        if self.range.1 < self.range.0 {
            // reversed range: first key sits on the right
            start + step * (n.saturating_sub(1) - index.min(n.saturating_sub(1))) as f64
        } else {
            start + step * index as f64
        }
    }

    pub fn position(&self, key: &str) -> Option<f64> {
        self.keys.iter().position(|k| k == key).map(|i| self.position_at(i))
    }

    /// Index of the band whose `[x, x + bandwidth]` contains `px`.
    pub fn band_at(&self, px: f64) -> Option<usize> {
        let bw = self.bandwidth();
        (0..self.keys.len()).find(|&i| {
            let x = self.position_at(i);
            px >= x && px <= x + bw
        })
    }
}

/// SI-prefixed short label, e.g. `6000 -> "6k"`.
pub fn format_si(v: f64) -> String {
    let a = v.abs();
    let (scaled, suffix) = if a >= 1e9 {
        (v / 1e9, "G")
    } else if a >= 1e6 {
        (v / 1e6, "M")
    } else if a >= 1e3 {
        (v / 1e3, "k")
    } else {
        (v, "")
    };
    let mut s = format!("{scaled:.2}");
    while s.contains('.') && (s.ends_with('0') || s.ends_with('.')) {
        s.pop();
    }
    if s == "-0" {
        s = "0".into();
    }
    format!("{s}{suffix}")
}

/// Thousands grouped with a non-breaking space, as the EU locale in the browsers.
pub fn format_thousands(v: f64) -> String {
    if v.is_nan() {
        return "NaN".into();
    }
    let neg = v < 0.0;
    let rounded = v.abs().round() as u64;
    let digits = rounded.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('\u{a0}');
        }
        out.push(c);
    }
    if neg {
        format!("-{out}")
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_map_and_invert() {
        let s = LinearScale::new((0.0, 100.0), (55.0, 535.0));
        assert_eq!(s.map(0.0), 55.0);
        assert_eq!(s.map(100.0), 535.0);
        assert!((s.invert(s.map(37.0)) - 37.0).abs() < 1e-9);
    }

    #[test]
    fn clamp_limits_output() {
        let s = LinearScale::new((0.0, 100.0), (0.0, 10.0)).with_clamp(true);
        assert_eq!(s.map(150.0), 10.0);
        assert_eq!(s.invert(-3.0), 0.0);
    }

    #[test]
    fn nice_rounds_upper_bound() {
        let s = LinearScale::new((0.0, 97.0), (0.0, 1.0)).nice(10);
        assert_eq!(s.domain(), (0.0, 100.0));
        let s = LinearScale::new((0.0, 0.83), (0.0, 1.0)).nice(10);
        assert!((s.domain().1 - 0.9).abs() < 1e-12);
    }

    #[test]
    fn collapsed_domain_does_not_panic() {
        let s = LinearScale::new((0.0, 0.0), (260.0, 15.0)).nice(10);
        assert_eq!(s.domain(), (0.0, 0.0));
        assert_eq!(s.ticks(10), vec![0.0]);
        assert_eq!(s.map(0.0), 260.0);
    }

    #[test]
    fn ticks_are_round() {
        assert_eq!(ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(ticks(0.0, 1.0, 4), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(ticks(0.0, 0.0, 10), vec![0.0]);
    }

    #[test]
    fn band_scale_equal_ordered() {
        let b = BandScale::new(&["A", "B", "C"], (10.0, 310.0)).padding_inner(0.1);
        let xs: Vec<f64> = ["A", "B", "C"].iter().map(|k| b.position(k).unwrap()).collect();
        let bw = b.bandwidth();
        assert!(bw > 0.0);
        assert!(xs[0] < xs[1] && xs[1] < xs[2]);
        assert!(xs[0] + bw <= xs[1] + 1e-9);
        assert!(xs[1] + bw <= xs[2] + 1e-9);
        assert!((xs[1] - xs[0] - (xs[2] - xs[1])).abs() < 1e-9);
        assert!(xs[0] >= 10.0 && xs[2] + bw <= 310.0 + 1e-9);
        assert_eq!(b.band_at(xs[1] + bw / 2.0), Some(1));
        assert_eq!(b.position("Z"), None);
    }

    #[test]
    fn si_labels() {
        assert_eq!(format_si(6000.0), "6k");
        assert_eq!(format_si(1500.0), "1.5k");
        assert_eq!(format_si(40.0), "40");
        assert_eq!(format_si(2_000_000.0), "2M");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands(1234567.0), "1\u{a0}234\u{a0}567");
        assert_eq!(format_thousands(12.0), "12");
    }
}
