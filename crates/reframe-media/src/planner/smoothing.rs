//! Centered moving-average smoothing of the raw trajectory.

/// Smooth `(x, y)` positions with a centered moving average.
///
/// Trajectories no longer than `window` are returned unchanged. Near the
/// ends the window shrinks instead of padding, so every output point is an
/// average of real samples only.
pub fn smooth_trajectory(positions: &[(f64, f64)], window: usize) -> Vec<(f64, f64)> {
    if positions.len() <= window {
        return positions.to_vec();
    }

    let half = window / 2;
    let len = positions.len();

    (0..len)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(len);
            let slice = &positions[start..end];
            let n = slice.len() as f64;
            let sum_x: f64 = slice.iter().map(|p| p.0).sum();
            let sum_y: f64 = slice.iter().map(|p| p.1).sum();
            (sum_x / n, sum_y / n)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_trajectory_unchanged() {
        let positions = vec![(100.0, 540.0), (900.0, 540.0), (300.0, 540.0)];
        assert_eq!(smooth_trajectory(&positions, 3), positions);
    }

    #[test]
    fn test_window_three_with_shrinking_ends() {
        let positions = vec![
            (0.0, 540.0),
            (300.0, 540.0),
            (600.0, 540.0),
            (900.0, 540.0),
        ];
        let smoothed = smooth_trajectory(&positions, 3);

        assert_eq!(smoothed.len(), 4);
        assert!((smoothed[0].0 - 150.0).abs() < 1e-9);
        assert!((smoothed[1].0 - 300.0).abs() < 1e-9);
        assert!((smoothed[2].0 - 600.0).abs() < 1e-9);
        assert!((smoothed[3].0 - 750.0).abs() < 1e-9);
        assert!(smoothed.iter().all(|p| (p.1 - 540.0).abs() < 1e-9));
    }

    #[test]
    fn test_outlier_is_damped() {
        let positions = vec![
            (500.0, 0.0),
            (500.0, 0.0),
            (1800.0, 0.0),
            (500.0, 0.0),
            (500.0, 0.0),
        ];
        let smoothed = smooth_trajectory(&positions, 3);
        assert!(smoothed[2].0 < 1000.0);
        assert!((smoothed[0].0 - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_one_is_identity() {
        let positions = vec![(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)];
        assert_eq!(smooth_trajectory(&positions, 1), positions);
    }

    proptest! {
        #[test]
        fn preserves_length(
            xs in proptest::collection::vec(0.0f64..4000.0, 0..40),
            window in 1usize..10,
        ) {
            let positions: Vec<(f64, f64)> = xs.iter().map(|&x| (x, 540.0)).collect();
            prop_assert_eq!(smooth_trajectory(&positions, window).len(), positions.len());
        }

        #[test]
        fn constant_input_is_fixed_point(
            x in 0.0f64..4000.0,
            len in 0usize..40,
            window in 1usize..10,
        ) {
            let positions = vec![(x, 540.0); len];
            for p in smooth_trajectory(&positions, window) {
                prop_assert!((p.0 - x).abs() < 1e-6);
                prop_assert!((p.1 - 540.0).abs() < 1e-6);
            }
        }
    }
}
