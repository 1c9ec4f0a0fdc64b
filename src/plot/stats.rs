//! Summary statistics and point layouts used by the distribution renderers

use std::collections::HashMap;

/// Linear-interpolated quantile of sorted data, `q` in `[0, 1]`.
///
/// Returns `None` for empty data.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Finite values, sorted ascending.
#[must_use]
pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Box-plot summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    /// Lowest value within 1.5 IQR of Q1
    pub lower_whisker: f64,
    /// First quartile
    pub q1: f64,
    /// Median
    pub median: f64,
    /// Third quartile
    pub q3: f64,
    /// Highest value within 1.5 IQR of Q3
    pub upper_whisker: f64,
}

impl BoxSummary {
    /// Summarize sorted data. Returns `None` for empty data.
    #[must_use]
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let q1 = quantile(sorted, 0.25)?;
        let median = quantile(sorted, 0.5)?;
        let q3 = quantile(sorted, 0.75)?;
        let iqr = q3 - q1;
        let lower_fence = q1 - 1.5 * iqr;
        let upper_fence = q3 + 1.5 * iqr;
        // Whiskers never end inside the box
        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|&v| v >= lower_fence)
            .map_or(q1, |v| v.min(q1));
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= upper_fence)
            .map_or(q3, |v| v.max(q3));
        Some(Self {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
        })
    }

    /// Whether `value` lies outside the whiskers.
    #[must_use]
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower_whisker || value > self.upper_whisker
    }
}

/// Letter-value boxes, outermost last: `(lower, upper)` at tail
/// fractions 1/4, 1/8, 1/16, ... while each tail still holds at least
/// two observations.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn letter_values(sorted: &[f64]) -> Vec<(f64, f64)> {
    let n = sorted.len() as f64;
    let mut boxes = Vec::new();
    let mut tail = 0.25;
    while n * tail >= 2.0 || boxes.is_empty() {
        match (quantile(sorted, tail), quantile(sorted, 1.0 - tail)) {
            (Some(lo), Some(hi)) => boxes.push((lo, hi)),
            _ => break,
        }
        tail /= 2.0;
        if boxes.len() >= 8 {
            break;
        }
    }
    boxes
}

/// Gaussian kernel density estimate on `points` evenly spaced samples
/// spanning the data ± 2 bandwidths (Scott's rule). Returns `(y, density)`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn kde(sorted: &[f64], points: usize) -> Vec<(f64, f64)> {
    if sorted.is_empty() || points < 2 {
        return Vec::new();
    }
    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let spread = var.sqrt();
    let bandwidth = if spread > 0.0 {
        1.06 * spread * n.powf(-0.2)
    } else {
        // Degenerate sample: a narrow bump around the single value
        mean.abs().max(1.0) * 1e-2
    };

    let lo = sorted[0] - 2.0 * bandwidth;
    let hi = sorted[sorted.len() - 1] + 2.0 * bandwidth;
    let step = (hi - lo) / (points - 1) as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    (0..points)
        .map(|i| {
            let y = lo + step * i as f64;
            let density = sorted
                .iter()
                .map(|v| (-0.5 * ((y - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            (y, density)
        })
        .collect()
}

/// Deterministic horizontal jitter in `[-width / 2, width / 2]`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn jitter(index: usize, width: f64) -> f64 {
    // Golden-ratio sequence spreads consecutive points evenly
    let frac = (index as f64 * 0.618_033_988_75).fract();
    (frac - 0.5) * width
}

/// Horizontal offsets that keep points with similar values apart.
///
/// Values are bucketed into bins of `bin` height; the k-th point of a bin
/// is placed at alternating offsets `0, +step, -step, +2 step, ...`,
/// clamped to `±max_offset`. Offsets are returned in input order.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn swarm_offsets(values: &[f64], bin: f64, step: f64, max_offset: f64) -> Vec<f64> {
    let mut offsets = vec![0.0; values.len()];
    if bin <= 0.0 {
        return offsets;
    }
    let mut occupancy: HashMap<i64, usize> = HashMap::new();
    for (i, value) in values.iter().enumerate() {
        if !value.is_finite() {
            continue;
        }
        let key = (value / bin).floor() as i64;
        let slot = occupancy.entry(key).or_insert(0);
        let k = *slot;
        *slot += 1;
        let magnitude = ((k + 1) / 2) as f64 * step;
        let signed = if k % 2 == 1 { magnitude } else { -magnitude };
        offsets[i] = signed.clamp(-max_offset, max_offset);
    }
    offsets
}

/// Split a polyline into dash segments of `dash` length separated by `gap`.
#[must_use]
pub fn dash_segments(points: &[(f64, f64)], dash: f64, gap: f64) -> Vec<[(f64, f64); 2]> {
    let mut segments = Vec::new();
    if dash <= 0.0 || points.len() < 2 {
        return segments;
    }
    let period = dash + gap.max(0.0);
    // Distance along the pattern at the start of the current edge
    let mut phase = 0.0;

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let length = (b.0 - a.0).hypot(b.1 - a.1);
        if length == 0.0 {
            continue;
        }
        let at = |t: f64| (a.0 + (b.0 - a.0) * t / length, a.1 + (b.1 - a.1) * t / length);

        let mut t = 0.0;
        while t < length {
            let in_period = (phase + t) % period;
            let end = (t + dash - in_period).min(length);
            if in_period < dash && end > t {
                segments.push([at(t), at(end)]);
                t = end;
            } else {
                // Always advance, even when rounding leaves no gap to skip
                t += (period - in_period).max(length * f64::EPSILON);
            }
        }
        phase = (phase + length) % period;
    }
    segments
}

/// Points of a circle outline, closed (first point repeated).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn circle_points(center: (f64, f64), radius: f64, segments: usize) -> Vec<(f64, f64)> {
    let segments = segments.max(3);
    (0..=segments)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / segments as f64;
            (center.0 + radius * angle.cos(), center.1 + radius * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&data, 0.0), Some(1.0));
        assert_eq!(quantile(&data, 1.0), Some(4.0));
        assert_eq!(quantile(&data, 0.5), Some(2.5));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn test_box_summary_whiskers_exclude_outliers() {
        let sorted = sorted_finite(&[100.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let summary = BoxSummary::from_sorted(&sorted).unwrap();
        assert_eq!(summary.q1, 3.0);
        assert_eq!(summary.median, 5.0);
        assert_eq!(summary.q3, 7.0);
        assert_eq!(summary.upper_whisker, 8.0);
        assert_eq!(summary.lower_whisker, 1.0);
        assert!(summary.is_outlier(100.0));
        assert!(!summary.is_outlier(1.0));
    }

    #[test]
    fn test_letter_values_nest() {
        let sorted: Vec<f64> = (0..100).map(f64::from).collect();
        let boxes = letter_values(&sorted);
        assert!(boxes.len() >= 3);
        for pair in boxes.windows(2) {
            assert!(pair[1].0 <= pair[0].0);
            assert!(pair[1].1 >= pair[0].1);
        }
        assert_eq!(letter_values(&[2.0]).len(), 1);
    }

    #[test]
    fn test_kde_peaks_near_data() {
        let sorted = vec![0.0, 0.1, -0.1, 0.05];
        let curve = kde(&sorted_finite(&sorted), 41);
        let (peak_y, _) = curve
            .iter()
            .copied()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert!(peak_y.abs() < 0.1);
        assert!(kde(&[3.0], 10).iter().all(|(_, d)| d.is_finite()));
    }

    #[test]
    fn test_jitter_bounded() {
        for i in 0..100 {
            assert!(jitter(i, 0.4).abs() <= 0.2);
        }
    }

    #[test]
    fn test_swarm_spreads_equal_values() {
        let offsets = swarm_offsets(&[1.0, 1.0, 1.0, 5.0], 0.5, 0.1, 0.4);
        assert_eq!(offsets[0], 0.0);
        assert!((offsets[1] - 0.1).abs() < 1e-12);
        assert!((offsets[2] + 0.1).abs() < 1e-12);
        assert_eq!(offsets[3], 0.0);
    }

    #[test]
    fn test_dash_segments_cover_half_of_a_line() {
        let segments = dash_segments(&[(0.0, 0.0), (10.0, 0.0)], 1.0, 1.0);
        assert_eq!(segments.len(), 5);
        let drawn: f64 = segments.iter().map(|[a, b]| b.0 - a.0).sum();
        assert!((drawn - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_circle_points_closed() {
        let points = circle_points((1.0, 1.0), 2.0, 16);
        assert_eq!(points.len(), 17);
        let (first, last) = (points[0], points[16]);
        assert!((first.0 - last.0).abs() < 1e-9 && (first.1 - last.1).abs() < 1e-9);
    }
}
