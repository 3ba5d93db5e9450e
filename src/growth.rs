//! Growth percentile estimator.
//!
//! Expected weight and height are linear in age, with a fixed relative spread
//! standing in for the standard deviation. Not an LMS-table lookup; results
//! must match the formulas below exactly.

use std::f64::consts::FRAC_2_SQRT_PI;

use serde::{Deserialize, Serialize};

use crate::models::enums::Gender;

/// Relative spread (SD as a fraction of the expected value).
pub const WEIGHT_SPREAD: f64 = 0.15;
pub const HEIGHT_SPREAD: f64 = 0.10;

pub const LOW_PERCENTILE: f64 = 3.0;
pub const HIGH_PERCENTILE: f64 = 97.0;

/// Linear expected-value model for one sex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthModel {
    pub birth_weight_kg: f64,
    pub weight_gain_kg_per_month: f64,
    pub birth_height_cm: f64,
    pub height_gain_cm_per_month: f64,
}

pub const MALE_MODEL: GrowthModel = GrowthModel {
    birth_weight_kg: 3.3,
    weight_gain_kg_per_month: 0.6,
    birth_height_cm: 50.0,
    height_gain_cm_per_month: 1.8,
};

/// Used for female, other and unrecorded gender.
pub const FEMALE_MODEL: GrowthModel = GrowthModel {
    birth_weight_kg: 3.2,
    weight_gain_kg_per_month: 0.55,
    birth_height_cm: 49.5,
    height_gain_cm_per_month: 1.75,
};

impl GrowthModel {
    pub fn for_gender(gender: Option<Gender>) -> Self {
        match gender {
            Some(Gender::Male) => MALE_MODEL,
            _ => FEMALE_MODEL,
        }
    }

    pub fn expected_weight_kg(&self, age_months: i64) -> f64 {
        self.birth_weight_kg + self.weight_gain_kg_per_month * age_months as f64
    }

    pub fn expected_height_cm(&self, age_months: i64) -> f64 {
        self.birth_height_cm + self.height_gain_cm_per_month * age_months as f64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthEstimate {
    pub weight_percentile: Option<f64>,
    pub height_percentile: Option<f64>,
    pub bmi: Option<f64>,
}

/// A measurement counts only when recorded, finite and positive.
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

pub fn estimate(
    age_months: i64,
    weight_kg: Option<f64>,
    height_cm: Option<f64>,
    gender: Option<Gender>,
) -> GrowthEstimate {
    let model = GrowthModel::for_gender(gender);
    let weight = present(weight_kg);
    let height = present(height_cm);
    let age_known = age_months >= 0;

    let weight_percentile = weight
        .filter(|_| age_known)
        .map(|w| percentile(w, model.expected_weight_kg(age_months), WEIGHT_SPREAD));
    let height_percentile = height
        .filter(|_| age_known)
        .map(|h| percentile(h, model.expected_height_cm(age_months), HEIGHT_SPREAD));
    let bmi = weight.zip(height).map(|(w, h)| bmi(w, h));

    GrowthEstimate {
        weight_percentile,
        height_percentile,
        bmi,
    }
}

pub fn z_score(observed: f64, expected: f64, spread: f64) -> f64 {
    (observed - expected) / (expected * spread)
}

/// Percentile rank (0-100) of `observed` against the expected distribution.
pub fn percentile(observed: f64, expected: f64, spread: f64) -> f64 {
    normal_cdf(z_score(observed, expected, spread)) * 100.0
}

/// Body-mass index from kg and cm, rounded to two decimals.
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    let raw = weight_kg / (height_m * height_m);
    (raw * 100.0).round() / 100.0
}

/// Standard normal CDF.
pub fn normal_cdf(z: f64) -> f64 {
    (1.0 + erf(z / std::f64::consts::SQRT_2)) / 2.0
}

/// Beyond this magnitude `erf` rounds to +-1 in double precision.
const ERF_SATURATION: f64 = 6.0;
const ERF_MAX_TERMS: u32 = 500;

/// Error function to double precision.
///
/// Sums the all-positive series
/// `erf(x) = 2/sqrt(pi) * exp(-x^2) * sum 2^n x^(2n+1) / (1*3*...*(2n+1))`,
/// which has no cancellation, and saturates at +-1 for `|x| >= 6`.
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let z = x.abs();
    if z >= ERF_SATURATION {
        return 1.0_f64.copysign(x);
    }

    let z2 = z * z;
    let mut term = z;
    let mut sum = z;
    for n in 1..=ERF_MAX_TERMS {
        term *= 2.0 * z2 / f64::from(2 * n + 1);
        sum += term;
        if term <= sum * f64::EPSILON {
            break;
        }
    }
    (FRAC_2_SQRT_PI * (-z2).exp() * sum).min(1.0).copysign(x)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthAlert {
    WeightBelowThirdPercentile,
    WeightAboveNinetySeventhPercentile,
    HeightBelowThirdPercentile,
}

impl GrowthAlert {
    pub fn message(self) -> &'static str {
        match self {
            Self::WeightBelowThirdPercentile => {
                "Weight below 3rd percentile - consider nutritional assessment"
            }
            Self::WeightAboveNinetySeventhPercentile => {
                "Weight above 97th percentile - monitor for obesity risk"
            }
            Self::HeightBelowThirdPercentile => {
                "Height below 3rd percentile - consider growth assessment"
            }
        }
    }
}

/// Outlier alerts. There is intentionally no high-height alert.
pub fn growth_alerts(
    weight_percentile: Option<f64>,
    height_percentile: Option<f64>,
) -> Vec<GrowthAlert> {
    let mut alerts = Vec::new();

    if let Some(p) = weight_percentile {
        if p < LOW_PERCENTILE {
            alerts.push(GrowthAlert::WeightBelowThirdPercentile);
        } else if p > HIGH_PERCENTILE {
            alerts.push(GrowthAlert::WeightAboveNinetySeventhPercentile);
        }
    }

    if let Some(p) = height_percentile {
        if p < LOW_PERCENTILE {
            alerts.push(GrowthAlert::HeightBelowThirdPercentile);
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn newborn_boy_at_expected_weight_is_median() {
        let est = estimate(0, Some(3.3), None, Some(Gender::Male));
        let p = est.weight_percentile.unwrap();
        assert!(close(p, 50.0, 1e-4), "got {p}");
        assert!(est.height_percentile.is_none());
        assert!(est.bmi.is_none());
    }

    #[test]
    fn girl_and_unknown_share_model() {
        let girl = estimate(12, Some(9.8), Some(70.5), Some(Gender::Female));
        let other = estimate(12, Some(9.8), Some(70.5), Some(Gender::Other));
        let unknown = estimate(12, Some(9.8), Some(70.5), None);
        assert_eq!(girl, other);
        assert_eq!(girl, unknown);
        assert!(close(girl.weight_percentile.unwrap(), 50.0, 1e-4));
        assert!(close(girl.height_percentile.unwrap(), 50.0, 1e-4));
    }

    #[test]
    fn one_sd_above_expected_height() {
        // Boy, 10 months: expected 68 cm, SD 6.8 cm.
        let est = estimate(10, None, Some(74.8), Some(Gender::Male));
        assert!(close(est.height_percentile.unwrap(), 84.134, 1e-2));
    }

    #[test]
    fn bmi_rounded_when_both_present() {
        let est = estimate(10, Some(10.0), Some(75.0), Some(Gender::Male));
        assert_eq!(est.bmi, Some(17.78));
        assert_eq!(bmi(3.3, 50.0), 13.2);
    }

    #[test]
    fn negative_age_skips_percentiles_but_keeps_bmi() {
        let est = estimate(-1, Some(3.0), Some(48.0), Some(Gender::Female));
        assert!(est.weight_percentile.is_none());
        assert!(est.height_percentile.is_none());
        assert!(est.bmi.is_some());
    }

    #[test]
    fn zero_or_invalid_measurements_are_absent() {
        let est = estimate(6, Some(0.0), Some(f64::NAN), None);
        assert_eq!(est, GrowthEstimate::default());
        let est = estimate(6, Some(-2.0), Some(60.0), None);
        assert!(est.weight_percentile.is_none());
        assert!(est.height_percentile.is_some());
        assert!(est.bmi.is_none());
    }

    #[test]
    fn normal_cdf_reference_points() {
        assert!(close(normal_cdf(0.0), 0.5, 1e-6));
        assert!(close(normal_cdf(1.0), 0.841_344_7, 1e-6));
        assert!(close(normal_cdf(-1.96), 0.024_997_9, 1e-6));
        assert!(close(normal_cdf(8.0), 1.0, 1e-9));
        assert!(close(normal_cdf(-8.0), 0.0, 1e-9));
    }

    #[test]
    fn erf_matches_double_precision_values() {
        assert_eq!(erf(0.0), 0.0);
        assert!(close(erf(0.5), 0.520_499_877_813_046_5, 1e-15));
        assert!(close(erf(1.0), 0.842_700_792_949_714_9, 1e-15));
        assert!(close(erf(2.0), 0.995_322_265_018_952_7, 1e-15));
        assert!(close(erf(3.0), 0.999_977_909_503_001_4, 1e-15));
        assert!(close(normal_cdf(-1.880_793_608_151_251), 0.03, 1e-13));
        assert_eq!(erf(7.0), 1.0);
        assert_eq!(erf(-7.0), -1.0);
        assert!(erf(f64::NAN).is_nan());
    }

    #[test]
    fn erf_is_odd() {
        for x in [0.1, 0.5, 1.0, 2.5] {
            assert_eq!(erf(-x), -erf(x));
        }
    }

    #[test]
    fn weight_alert_threshold_is_strict() {
        assert_eq!(
            growth_alerts(Some(2.9), None),
            vec![GrowthAlert::WeightBelowThirdPercentile]
        );
        assert!(growth_alerts(Some(3.0), None).is_empty());
        assert!(growth_alerts(Some(97.0), None).is_empty());
        assert_eq!(
            growth_alerts(Some(97.1), None),
            vec![GrowthAlert::WeightAboveNinetySeventhPercentile]
        );
    }

    #[test]
    fn tall_children_raise_no_alert() {
        assert!(growth_alerts(None, Some(99.9)).is_empty());
        assert_eq!(
            growth_alerts(Some(50.0), Some(1.0)),
            vec![GrowthAlert::HeightBelowThirdPercentile]
        );
    }

    #[test]
    fn alerts_combine() {
        let alerts = growth_alerts(Some(1.0), Some(2.0));
        assert_eq!(
            alerts,
            vec![
                GrowthAlert::WeightBelowThirdPercentile,
                GrowthAlert::HeightBelowThirdPercentile,
            ]
        );
        assert!(alerts[0].message().starts_with("Weight below 3rd percentile"));
    }

    #[test]
    fn alert_serializes_as_code() {
        let json = serde_json::to_string(&GrowthAlert::HeightBelowThirdPercentile).unwrap();
        assert_eq!(json, "\"height_below_third_percentile\"");
    }

    proptest! {
        #[test]
        fn percentiles_bounded_and_repeatable(
            age in 0i64..60,
            weight in 0.5f64..40.0,
            height in 30.0f64..130.0,
            male in any::<bool>(),
        ) {
            let gender = if male { Some(Gender::Male) } else { Some(Gender::Female) };
            let a = estimate(age, Some(weight), Some(height), gender);
            let b = estimate(age, Some(weight), Some(height), gender);
            prop_assert_eq!(a, b);
            let wp = a.weight_percentile.unwrap();
            let hp = a.height_percentile.unwrap();
            prop_assert!((0.0..=100.0).contains(&wp));
            prop_assert!((0.0..=100.0).contains(&hp));
        }

        #[test]
        fn heavier_is_never_lower_percentile(age in 0i64..60, w in 1.0f64..30.0, extra in 0.0f64..5.0) {
            let lo = estimate(age, Some(w), None, None).weight_percentile.unwrap();
            let hi = estimate(age, Some(w + extra), None, None).weight_percentile.unwrap();
            prop_assert!(hi >= lo - 1e-9);
        }
    }
}
