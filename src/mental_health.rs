//! Mental-health screening: bounded scoring, risk tiers and recommendations
//! for EPDS, GAD-7 and PHQ-9.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::enums::{AssessmentType, RiskLevel};
use crate::models::AssessmentResponses;

pub const HIGH_RISK_RECOMMENDATION: &str = "Please consider speaking with a healthcare professional immediately. Your responses indicate you may benefit from professional support.";
pub const MODERATE_RISK_RECOMMENDATION: &str = "Your responses suggest you may be experiencing some challenges. Consider discussing these feelings with a healthcare provider.";
pub const LOW_RISK_RECOMMENDATION: &str = "Your responses indicate you're doing well. Continue with healthy habits and don't hesitate to seek support if needed.";

/// Result of scoring one questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentOutcome {
    /// `None` when the submitted type was not recognised.
    pub assessment_type: Option<AssessmentType>,
    pub score: u32,
    pub risk_level: RiskLevel,
    pub recommendation: String,
    pub crisis_indicated: bool,
}

pub fn max_score(assessment_type: AssessmentType) -> u32 {
    match assessment_type {
        AssessmentType::Epds => 30,
        AssessmentType::Gad7 => 21,
        AssessmentType::Phq9 => 27,
    }
}

/// Sum of item sub-scores, clamped to `0..=max_score`.
pub fn score(assessment_type: AssessmentType, responses: &AssessmentResponses) -> u32 {
    let total = responses
        .values()
        .fold(0i64, |acc, v| acc.saturating_add(*v));
    total.clamp(0, max_score(assessment_type) as i64) as u32
}

pub fn risk_level(assessment_type: AssessmentType, score: u32) -> RiskLevel {
    match assessment_type {
        AssessmentType::Epds => match score {
            13.. => RiskLevel::High,
            10..=12 => RiskLevel::Moderate,
            _ => RiskLevel::Low,
        },
        AssessmentType::Gad7 => match score {
            15.. => RiskLevel::High,
            10..=14 => RiskLevel::Moderate,
            5..=9 => RiskLevel::Low,
            _ => RiskLevel::Minimal,
        },
        AssessmentType::Phq9 => match score {
            20.. => RiskLevel::High,
            15..=19 => RiskLevel::Moderate,
            10..=14 => RiskLevel::Low,
            _ => RiskLevel::Minimal,
        },
    }
}

pub fn recommendation(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => HIGH_RISK_RECOMMENDATION,
        RiskLevel::Moderate => MODERATE_RISK_RECOMMENDATION,
        RiskLevel::Low | RiskLevel::Minimal => LOW_RISK_RECOMMENDATION,
    }
}

/// Item asking about thoughts of self-harm, if the instrument has one.
fn self_harm_item(assessment_type: AssessmentType) -> Option<u32> {
    match assessment_type {
        AssessmentType::Phq9 => Some(9),
        AssessmentType::Epds => Some(10),
        AssessmentType::Gad7 => None,
    }
}

/// Trailing item number of a response key: "q9" -> 9, "item_10" -> 10.
fn item_number(key: &str) -> Option<u32> {
    let digits_start = key
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    key[digits_start..].parse().ok()
}

/// Any positive answer on the self-harm item. Independent of the total score.
pub fn crisis_indicated(assessment_type: AssessmentType, responses: &AssessmentResponses) -> bool {
    let Some(item) = self_harm_item(assessment_type) else {
        return false;
    };
    responses
        .iter()
        .any(|(key, value)| item_number(key) == Some(item) && *value > 0)
}

pub fn evaluate(assessment_type: AssessmentType, responses: &AssessmentResponses) -> AssessmentOutcome {
    let score = score(assessment_type, responses);
    let risk_level = risk_level(assessment_type, score);
    AssessmentOutcome {
        assessment_type: Some(assessment_type),
        score,
        risk_level,
        recommendation: recommendation(risk_level).to_string(),
        crisis_indicated: crisis_indicated(assessment_type, responses),
    }
}

/// Boundary entry point taking the raw type string. Unknown types score 0 at
/// low risk instead of failing.
pub fn assess(assessment_type: &str, responses: &AssessmentResponses) -> AssessmentOutcome {
    match AssessmentType::from_str(assessment_type) {
        Ok(kind) => evaluate(kind, responses),
        Err(_) => AssessmentOutcome {
            assessment_type: None,
            score: 0,
            risk_level: RiskLevel::Low,
            recommendation: recommendation(RiskLevel::Low).to_string(),
            crisis_indicated: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn responses(items: &[(&str, i64)]) -> AssessmentResponses {
        items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn epds_sum_and_high_risk() {
        let r = responses(&[("q1", 3), ("q2", 3), ("q3", 3), ("q4", 3), ("q5", 3)]);
        assert_eq!(score(AssessmentType::Epds, &r), 15);
        assert_eq!(risk_level(AssessmentType::Epds, 15), RiskLevel::High);
    }

    #[test]
    fn scores_clamp_to_instrument_max() {
        let big = responses(&[("q1", 50)]);
        assert_eq!(score(AssessmentType::Epds, &big), 30);
        assert_eq!(score(AssessmentType::Gad7, &big), 21);
        assert_eq!(score(AssessmentType::Phq9, &big), 27);

        let negative = responses(&[("q1", -10), ("q2", 3)]);
        assert_eq!(score(AssessmentType::Phq9, &negative), 0);
    }

    #[test]
    fn saturating_sum_does_not_overflow() {
        let r = responses(&[("q1", i64::MAX), ("q2", i64::MAX)]);
        assert_eq!(score(AssessmentType::Gad7, &r), 21);
    }

    #[test]
    fn epds_thresholds() {
        assert_eq!(risk_level(AssessmentType::Epds, 9), RiskLevel::Low);
        assert_eq!(risk_level(AssessmentType::Epds, 10), RiskLevel::Moderate);
        assert_eq!(risk_level(AssessmentType::Epds, 12), RiskLevel::Moderate);
        assert_eq!(risk_level(AssessmentType::Epds, 13), RiskLevel::High);
        assert_eq!(risk_level(AssessmentType::Epds, 0), RiskLevel::Low);
    }

    #[test]
    fn gad7_thresholds() {
        assert_eq!(risk_level(AssessmentType::Gad7, 4), RiskLevel::Minimal);
        assert_eq!(risk_level(AssessmentType::Gad7, 5), RiskLevel::Low);
        assert_eq!(risk_level(AssessmentType::Gad7, 10), RiskLevel::Moderate);
        assert_eq!(risk_level(AssessmentType::Gad7, 15), RiskLevel::High);
        assert_eq!(risk_level(AssessmentType::Gad7, 21), RiskLevel::High);
    }

    #[test]
    fn phq9_thresholds() {
        assert_eq!(risk_level(AssessmentType::Phq9, 9), RiskLevel::Minimal);
        assert_eq!(risk_level(AssessmentType::Phq9, 10), RiskLevel::Low);
        assert_eq!(risk_level(AssessmentType::Phq9, 15), RiskLevel::Moderate);
        assert_eq!(risk_level(AssessmentType::Phq9, 19), RiskLevel::Moderate);
        assert_eq!(risk_level(AssessmentType::Phq9, 20), RiskLevel::High);
    }

    #[test]
    fn recommendations_by_tier() {
        assert_eq!(recommendation(RiskLevel::High), HIGH_RISK_RECOMMENDATION);
        assert_eq!(recommendation(RiskLevel::Moderate), MODERATE_RISK_RECOMMENDATION);
        assert_eq!(recommendation(RiskLevel::Low), LOW_RISK_RECOMMENDATION);
        assert_eq!(recommendation(RiskLevel::Minimal), LOW_RISK_RECOMMENDATION);
    }

    #[test]
    fn unknown_type_degrades_to_low() {
        let r = responses(&[("q1", 3), ("q2", 3)]);
        let outcome = assess("hads", &r);
        assert_eq!(outcome.assessment_type, None);
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.risk_level, RiskLevel::Low);
        assert_eq!(outcome.recommendation, LOW_RISK_RECOMMENDATION);
        assert!(!outcome.crisis_indicated);
    }

    #[test]
    fn assess_known_type() {
        let r = responses(&[("q1", 3), ("q2", 3), ("q3", 3), ("q4", 2)]);
        let outcome = assess("gad7", &r);
        assert_eq!(outcome.assessment_type, Some(AssessmentType::Gad7));
        assert_eq!(outcome.score, 11);
        assert_eq!(outcome.risk_level, RiskLevel::Moderate);
        assert_eq!(outcome.recommendation, MODERATE_RISK_RECOMMENDATION);
    }

    #[test]
    fn crisis_item_detection() {
        let phq = responses(&[("q1", 0), ("q9", 1)]);
        assert!(crisis_indicated(AssessmentType::Phq9, &phq));

        let phq_clear = responses(&[("q1", 3), ("q9", 0), ("q19", 2)]);
        assert!(!crisis_indicated(AssessmentType::Phq9, &phq_clear));

        let epds = responses(&[("item_10", 2)]);
        assert!(crisis_indicated(AssessmentType::Epds, &epds));
        assert!(!crisis_indicated(AssessmentType::Gad7, &epds));
    }

    #[test]
    fn crisis_flag_does_not_change_risk() {
        let r = responses(&[("q9", 1)]);
        let outcome = evaluate(AssessmentType::Phq9, &r);
        assert!(outcome.crisis_indicated);
        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.risk_level, RiskLevel::Minimal);
    }

    #[test]
    fn item_number_parsing() {
        assert_eq!(item_number("q9"), Some(9));
        assert_eq!(item_number("item_10"), Some(10));
        assert_eq!(item_number("7"), Some(7));
        assert_eq!(item_number("mood"), None);
        assert_eq!(item_number(""), None);
    }

    proptest! {
        #[test]
        fn score_is_bounded(values in proptest::collection::vec(-5i64..10, 0..15)) {
            let r: AssessmentResponses = values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("q{}", i + 1), *v))
                .collect();
            for kind in [AssessmentType::Epds, AssessmentType::Gad7, AssessmentType::Phq9] {
                let s = score(kind, &r);
                prop_assert!(s <= max_score(kind));
                prop_assert_eq!(evaluate(kind, &r), evaluate(kind, &r));
            }
        }
    }
}
