//! Noise penalty and quiet score from nearby emitters.

use vicinity_core::{NoiseAssessment, NoiseLevel, NoiseSource};

/// Upper bound of both the raw and the applied noise penalty.
pub const MAX_NOISE_PENALTY: f64 = 20.0;

/// Quiet-score points lost per raw penalty point.
const QUIET_PER_PENALTY: f64 = 5.0;

#[expect(
    clippy::float_arithmetic,
    reason = "each source fades quadratically with distance"
)]
fn contribution(source: &NoiseSource) -> f64 {
    let kind = source.kind();
    let reach = kind.reach_m();
    if source.distance_m() >= reach {
        return 0.0;
    }
    let closeness = 1.0 - source.distance_m() / reach;
    kind.intensity() * closeness * closeness
}

/// Band a raw penalty.
///
/// # Examples
/// ```
/// use vicinity_core::NoiseLevel;
/// use vicinity_scorer::noise_level;
///
/// assert_eq!(noise_level(3.9), NoiseLevel::Low);
/// assert_eq!(noise_level(4.0), NoiseLevel::Moderate);
/// assert_eq!(noise_level(15.0), NoiseLevel::Extreme);
/// ```
#[must_use]
pub fn noise_level(raw_penalty: f64) -> NoiseLevel {
    if raw_penalty < 4.0 {
        NoiseLevel::Low
    } else if raw_penalty < 9.0 {
        NoiseLevel::Moderate
    } else if raw_penalty < 15.0 {
        NoiseLevel::High
    } else {
        NoiseLevel::Extreme
    }
}

/// Assess noise for a profile with the given `sensitivity`.
///
/// The raw penalty sums every audible source and is clamped to
/// `0..=20`. The applied penalty scales it by `sensitivity` and is clamped
/// again. Level and quiet score derive from the raw penalty so they do not
/// change between profiles.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "penalties scale and the quiet score is linear in the raw penalty"
)]
pub fn assess_noise(sources: &[NoiseSource], sensitivity: f64) -> NoiseAssessment {
    let total: f64 = sources.iter().map(contribution).sum();
    let raw_penalty = clamp_penalty(total);
    let penalty = clamp_penalty(raw_penalty * sensitivity);
    NoiseAssessment {
        penalty,
        raw_penalty,
        level: noise_level(raw_penalty),
        quiet_score: (100.0 - QUIET_PER_PENALTY * raw_penalty).clamp(0.0, 100.0),
    }
}

fn clamp_penalty(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, MAX_NOISE_PENALTY)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use vicinity_core::NoiseKind;

    const TOLERANCE: f64 = 1e-9;

    fn source(kind: NoiseKind, distance: f64) -> NoiseSource {
        NoiseSource::new("src", kind, distance).expect("valid source")
    }

    #[rstest]
    fn no_sources_is_silent() {
        assert_eq!(assess_noise(&[], 2.0), NoiseAssessment::SILENT);
    }

    #[rstest]
    #[case(NoiseKind::HeavyRoad, 0.0, 12.0)]
    #[case(NoiseKind::HeavyRoad, 500.0, 3.0)]
    #[case(NoiseKind::PrimaryRoad, 250.0, 2.0)]
    #[case(NoiseKind::TransitStop, 100.0, 0.0)]
    #[case(NoiseKind::Nightlife, 400.0, 0.0)]
    fn single_source_contribution(
        #[case] kind: NoiseKind,
        #[case] distance: f64,
        #[case] expected: f64,
    ) {
        let assessment = assess_noise(&[source(kind, distance)], 1.0);
        assert!((assessment.raw_penalty - expected).abs() <= TOLERANCE);
    }

    #[rstest]
    fn raw_penalty_is_capped() {
        let sources = vec![
            source(NoiseKind::HeavyRoad, 0.0),
            source(NoiseKind::Railway, 0.0),
            source(NoiseKind::PrimaryRoad, 0.0),
        ];
        let assessment = assess_noise(&sources, 1.0);
        assert_eq!(assessment.raw_penalty, MAX_NOISE_PENALTY);
        assert_eq!(assessment.level, NoiseLevel::Extreme);
        assert_eq!(assessment.quiet_score, 0.0);
    }

    #[rstest]
    fn sensitivity_scales_applied_penalty_only() {
        let sources = [source(NoiseKind::PrimaryRoad, 0.0)];
        let calm = assess_noise(&sources, 0.5);
        let touchy = assess_noise(&sources, 2.0);
        assert!((calm.penalty - 4.0).abs() <= TOLERANCE);
        assert!((touchy.penalty - 16.0).abs() <= TOLERANCE);
        assert_eq!(calm.raw_penalty, touchy.raw_penalty);
        assert_eq!(calm.quiet_score, touchy.quiet_score);
        assert_eq!(calm.level, NoiseLevel::Moderate);
    }

    #[rstest]
    fn applied_penalty_is_capped() {
        let sources = [source(NoiseKind::HeavyRoad, 0.0)];
        assert_eq!(assess_noise(&sources, 2.0).penalty, MAX_NOISE_PENALTY);
    }
}
