//! Scales mapping data domains onto pixel ranges.
//!
//! The scales follow the d3 conventions the charts were designed against: band and point scales
//! over ordinal domains, linear scales over a numeric extent and a quantize scale that buckets a
//! continuous track into integer indices.

/// An ordinal scale that divides a range into equally sized bands.
///
/// A point scale is a band scale with `padding_inner = 1`, i.e. zero bandwidth.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale<K> {
    domain: Vec<K>,
    range: [f64; 2],
    padding_inner: f64,
    padding_outer: f64,
    align: f64,
    round: bool,
    step: f64,
    bandwidth: f64,
    positions: Vec<f64>,
}

impl<K: PartialEq + Clone> BandScale<K> {
    /// Builds a band scale; duplicate domain entries keep their first occurrence.
    pub fn band(domain: impl IntoIterator<Item = K>, range: [f64; 2]) -> Self {
        let mut unique: Vec<K> = Vec::new();
        for k in domain {
            if !unique.contains(&k) {
                unique.push(k);
            }
        }
        let mut scale = Self {
            domain: unique,
            range,
            padding_inner: 0.0,
            padding_outer: 0.0,
            align: 0.5,
            round: false,
            step: 0.0,
            bandwidth: 0.0,
            positions: Vec::new(),
        };
        scale.rescale();
        scale
    }

    pub fn point(domain: impl IntoIterator<Item = K>, range: [f64; 2]) -> Self {
        let mut scale = Self::band(domain, range);
        scale.padding_inner = 1.0;
        scale.rescale();
        scale
    }

    pub fn with_padding_inner(mut self, padding: f64) -> Self {
        self.padding_inner = padding.clamp(0.0, 1.0);
        self.rescale();
        self
    }

    /// Sets inner and outer padding at once.
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding_inner = padding.clamp(0.0, 1.0);
        self.padding_outer = padding;
        self.rescale();
        self
    }

    pub fn with_round(mut self, round: bool) -> Self {
        self.round = round;
        self.rescale();
        self
    }

    pub fn set_range(&mut self, range: [f64; 2]) {
        self.range = range;
        self.rescale();
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    pub fn domain(&self) -> &[K] {
        &self.domain
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn apply(&self, key: &K) -> Option<f64> {
        let index = self.domain.iter().position(|k| k == key)?;
        self.positions.get(index).copied()
    }

    pub fn apply_index(&self, index: usize) -> Option<f64> {
        self.positions.get(index).copied()
    }

    /// Band starts (point positions for point scales), in domain order.
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Index of the domain entry whose position is closest to `pixel`.
    pub fn nearest_index(&self, pixel: f64) -> Option<usize> {
        self.positions
            .iter()
            .enumerate()
            .min_by(|a, b| (a.1 - pixel).abs().total_cmp(&(b.1 - pixel).abs()))
            .map(|(i, _)| i)
    }

    fn rescale(&mut self) {
        let n = self.domain.len() as f64;
        let [r0, r1] = self.range;
        let reverse = r1 < r0;
        let (mut start, stop) = if reverse { (r1, r0) } else { (r0, r1) };
        self.step = (stop - start) / (n - self.padding_inner + self.padding_outer * 2.0).max(1.0);
        if self.round {
            self.step = self.step.floor();
        }
        start += (stop - start - self.step * (n - self.padding_inner)) * self.align;
        self.bandwidth = self.step * (1.0 - self.padding_inner);
        if self.round {
            start = js_round(start);
            self.bandwidth = js_round(self.bandwidth);
        }
        self.positions = (0..self.domain.len())
            .map(|i| start + self.step * i as f64)
            .collect();
        if reverse {
            self.positions.reverse();
        }
    }
}

/// A continuous scale `[d0, d1] -> [r0, r1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: [f64; 2],
    range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    pub fn set_range(&mut self, range: [f64; 2]) {
        self.range = range;
    }

    /// A degenerate domain maps everything onto the middle of the range.
    pub fn apply(&self, v: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let t = if d1 == d0 { 0.5 } else { (v - d0) / (d1 - d0) };
        r0 + t * (r1 - r0)
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let t = if r1 == r0 { 0.5 } else { (pixel - r0) / (r1 - r0) };
        d0 + t * (d1 - d0)
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain[0], self.domain[1], count as f64)
    }
}

/// Maps `[d0, d1]` onto `range.len()` equal buckets.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizeScale<T> {
    domain: [f64; 2],
    range: Vec<T>,
    thresholds: Vec<f64>,
}

impl<T: Clone> QuantizeScale<T> {
    pub fn new(domain: [f64; 2], range: Vec<T>) -> Self {
        let [x0, x1] = domain;
        let n = range.len().saturating_sub(1) as f64;
        let thresholds = (0..range.len().saturating_sub(1))
            .map(|i| {
                let i = i as f64;
                ((i + 1.0) * x1 - (i - n) * x0) / (n + 1.0)
            })
            .collect();
        Self {
            domain,
            range,
            thresholds,
        }
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn apply(&self, v: f64) -> Option<T> {
        let bucket = self.thresholds.partition_point(|t| *t <= v);
        self.range.get(bucket).cloned()
    }
}

/// `Math.round`: halves round towards positive infinity.
pub(crate) fn js_round(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Nicely rounded tick values covering `[start, stop]`, at most about `count` of them.
pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
    let Some((i1, i2, inc)) = tick_spec(lo, hi, count) else {
        return Vec::new();
    };
    if i2 < i1 {
        return Vec::new();
    }
    let n = (i2 - i1 + 1.0) as usize;
    (0..n)
        .map(|i| {
            let k = if reverse { i2 - i as f64 } else { i1 + i as f64 };
            if inc < 0.0 { k / -inc } else { k * inc }
        })
        .collect()
}

fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(f64, f64, f64)> {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();

    let step = (stop - start) / count.max(0.0);
    if !step.is_finite() || step <= 0.0 {
        return None;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };
    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let k = 10f64.powf(-power) / factor;
        i1 = js_round(start * k);
        i2 = js_round(stop * k);
        if i1 / k < start {
            i1 += 1.0;
        }
        if i2 / k > stop {
            i2 -= 1.0;
        }
        inc = -k;
    } else {
        let k = 10f64.powf(power) * factor;
        i1 = js_round(start / k);
        i2 = js_round(stop / k);
        if i1 * k < start {
            i1 += 1.0;
        }
        if i2 * k > stop {
            i2 -= 1.0;
        }
        inc = k;
    }
    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    Some((i1, i2, inc))
}
