//! Robust single-center estimate for the whole clip.

/// Median of a slice; `None` when empty. NaNs sort as equal.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Median x of the smoothed trajectory, rounded to the nearest pixel.
///
/// The median ignores a stray detection or two that smoothing only damped.
/// An empty trajectory falls back to the frame midpoint.
pub fn estimate_center(smoothed: &[(f64, f64)], frame_width: u32) -> i32 {
    let xs: Vec<f64> = smoothed.iter().map(|p| p.0).collect();
    match median(&xs) {
        Some(x) if x.is_finite() => x.round() as i32,
        _ => (frame_width / 2) as i32,
    }
}
