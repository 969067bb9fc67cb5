//! Small descriptive statistics over `f64` slices. Non-finite inputs are
//! ignored everywhere.

fn finite_sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

/// Percentile with linear interpolation between closest ranks
/// (`rank = p / 100 × (n − 1)`).
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    let sorted = finite_sorted(values);
    if sorted.is_empty() || !pct.is_finite() {
        return None;
    }
    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    let finite = finite_sorted(values);
    if finite.is_empty() {
        return None;
    }
    Some(finite.iter().sum::<f64>() / finite.len() as f64)
}

/// Sample standard deviation (`n − 1` denominator). `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let finite = finite_sorted(values);
    if finite.len() < 2 {
        return None;
    }
    let m = finite.iter().sum::<f64>() / finite.len() as f64;
    let var = finite.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (finite.len() - 1) as f64;
    Some(var.sqrt())
}

pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let sorted = finite_sorted(values);
    Some((*sorted.first()?, *sorted.last()?))
}
