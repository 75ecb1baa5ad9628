//! Gap-filling face selection.
//!
//! Produces exactly one raw x-position per sample. A missed or failed
//! detection never drops a sample: it holds the last known position, or
//! uses the frame midpoint if nothing has been seen yet.

use reframe_models::{Observation, PositionSource, SamplePlan, TrajectoryPoint};
use tracing::{debug, warn};

use crate::error::MediaResult;

/// Stateful selector for one trajectory.
#[derive(Debug, Clone)]
pub struct GapFillSelector {
    midpoint_x: i32,
    last_x: Option<i32>,
}

impl GapFillSelector {
    pub fn new(midpoint_x: i32) -> Self {
        Self {
            midpoint_x,
            last_x: None,
        }
    }

    /// Position for one sample. `None` or an empty observation is a miss.
    pub fn select(&mut self, time: f64, observation: Option<&Observation>) -> TrajectoryPoint {
        let (x, source) = match observation.and_then(Observation::best) {
            Some(face) => (face.center_x, PositionSource::Observed),
            None => match self.last_x {
                Some(x) => (x, PositionSource::Held),
                None => (self.midpoint_x, PositionSource::Midpoint),
            },
        };

        self.last_x = Some(x);
        TrajectoryPoint { time, x, source }
    }
}

/// Walk the sample plan in order and build the raw trajectory.
///
/// `observe` is called once per sample with its index and time. Errors are
/// logged and treated as misses, except resource failures, which abort.
pub fn fill_trajectory<F>(
    plan: &SamplePlan,
    midpoint_x: i32,
    mut observe: F,
) -> MediaResult<Vec<TrajectoryPoint>>
where
    F: FnMut(usize, f64) -> MediaResult<Observation>,
{
    let mut selector = GapFillSelector::new(midpoint_x);
    let mut trajectory = Vec::with_capacity(plan.len());

    for (idx, &time) in plan.times().iter().enumerate() {
        let observation = match observe(idx, time) {
            Ok(observation) => Some(observation),
            Err(e) if e.is_resource_failure() => return Err(e),
            Err(e) => {
                warn!(
                    sample = idx + 1,
                    time,
                    error = %e,
                    "Sample failed, using fallback position"
                );
                None
            }
        };

        let point = selector.select(time, observation.as_ref());
        debug!(
            sample = idx + 1,
            total = plan.len(),
            x = point.x,
            source = ?point.source,
            "Sample resolved"
        );
        trajectory.push(point);
    }

    Ok(trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediaError;
    use proptest::prelude::*;
    use reframe_models::FaceBox;

    fn hit(x: i32) -> MediaResult<Observation> {
        Ok(Observation::ranked(vec![FaceBox::new(x, 400, 150, 150, 0.9)]))
    }

    fn miss() -> MediaResult<Observation> {
        Ok(Observation::empty())
    }

    fn xs(points: &[TrajectoryPoint]) -> Vec<i32> {
        points.iter().map(|p| p.x).collect()
    }

    #[test]
    fn test_mid_sequence_miss_holds_previous_hit() {
        let plan = SamplePlan::uniform(6.0, 3);
        let outcomes = [hit(500), miss(), hit(520)];
        let mut outcomes = outcomes.into_iter();

        let points = fill_trajectory(&plan, 960, |_, _| outcomes.next().unwrap()).unwrap();

        assert_eq!(xs(&points), vec![500, 500, 520]);
        assert_eq!(points[1].source, PositionSource::Held);
    }

    #[test]
    fn test_leading_misses_use_midpoint_then_hold() {
        let plan = SamplePlan::uniform(8.0, 4);
        let outcomes = [miss(), miss(), hit(300), miss()];
        let mut outcomes = outcomes.into_iter();

        let points = fill_trajectory(&plan, 960, |_, _| outcomes.next().unwrap()).unwrap();

        assert_eq!(xs(&points), vec![960, 960, 300, 300]);
        assert_eq!(points[0].source, PositionSource::Midpoint);
        assert_eq!(points[1].source, PositionSource::Held);
        assert_eq!(points[3].source, PositionSource::Held);
    }

    #[test]
    fn test_detector_errors_count_as_misses() {
        let plan = SamplePlan::uniform(6.0, 3);
        let outcomes = [
            hit(700),
            Err(MediaError::detection_failed("corrupt frame")),
            Err(MediaError::frame_unavailable(6.0, "eof")),
        ];
        let mut outcomes = outcomes.into_iter();

        let points = fill_trajectory(&plan, 960, |_, _| outcomes.next().unwrap()).unwrap();
        assert_eq!(xs(&points), vec![700, 700, 700]);
    }

    #[test]
    fn test_resource_failure_aborts() {
        let plan = SamplePlan::uniform(6.0, 3);
        let result = fill_trajectory(&plan, 960, |idx, _| {
            if idx == 1 {
                Err(MediaError::detector_unavailable("model closed"))
            } else {
                hit(100)
            }
        });
        assert!(matches!(result, Err(MediaError::DetectorUnavailable(_))));
    }

    #[test]
    fn test_best_face_is_selected() {
        let mut selector = GapFillSelector::new(960);
        let observation = Observation::ranked(vec![
            FaceBox::new(200, 300, 40, 40, 0.99),
            FaceBox::new(1400, 300, 220, 220, 0.8),
        ]);
        let point = selector.select(0.0, Some(&observation));
        assert_eq!(point.x, 1400);
        assert_eq!(point.source, PositionSource::Observed);
    }

    #[test]
    fn test_output_length_matches_plan_for_all_misses() {
        for count in 3..=8 {
            let plan = SamplePlan::uniform(20.0, count);
            let points = fill_trajectory(&plan, 640, |_, _| miss()).unwrap();
            assert_eq!(points.len(), count);
            assert!(points.iter().all(|p| p.x == 640));
        }
    }

    #[derive(Debug, Clone)]
    enum Outcome {
        Hit(i32),
        Miss,
        Failed,
    }

    fn outcome() -> impl Strategy<Value = Outcome> {
        prop_oneof![
            (0i32..1920).prop_map(Outcome::Hit),
            Just(Outcome::Miss),
            Just(Outcome::Failed),
        ]
    }

    proptest! {
        #[test]
        fn one_point_per_sample_for_any_outcomes(
            outcomes in proptest::collection::vec(outcome(), 0..12),
        ) {
            let plan = SamplePlan::uniform(30.0, outcomes.len());
            let points = fill_trajectory(&plan, 960, |idx, _| match outcomes[idx] {
                Outcome::Hit(x) => hit(x),
                Outcome::Miss => miss(),
                Outcome::Failed => Err(MediaError::detection_failed("bad frame")),
            })
            .unwrap();

            prop_assert_eq!(points.len(), plan.len());

            let mut last = None;
            for (point, outcome) in points.iter().zip(&outcomes) {
                let expected = match outcome {
                    Outcome::Hit(x) => *x,
                    _ => last.unwrap_or(960),
                };
                prop_assert_eq!(point.x, expected);
                last = Some(point.x);
            }
        }
    }
}
