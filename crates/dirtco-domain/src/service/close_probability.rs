//! Close probability scoring

use crate::model::{CloseProbability, CloseProbabilityInput, ProbabilityLabel, ScoreFactor};

const HIGH_THRESHOLD: u32 = 71;
const MEDIUM_THRESHOLD: u32 = 41;

pub fn label_for_score(score: u32) -> ProbabilityLabel {
    if score >= HIGH_THRESHOLD {
        ProbabilityLabel::High
    } else if score >= MEDIUM_THRESHOLD {
        ProbabilityLabel::Medium
    } else {
        ProbabilityLabel::Low
    }
}

/// Sum the points of each rule that holds. The maximum is 75.
pub fn calculate_close_probability(input: &CloseProbabilityInput) -> CloseProbability {
    let rules = [
        ("returning_customer", 20, input.returning_customer),
        ("high_value", 10, input.job_value > 3000.0),
        ("close_distance", 10, input.distance_miles < 15.0),
        ("good_margin", 20, input.margin_percent > 35.0),
        ("quick_start", 15, input.earliest_start_within_7_days),
    ];

    let factors: Vec<ScoreFactor> = rules
        .into_iter()
        .map(|(key, points, awarded)| ScoreFactor {
            key: key.to_string(),
            points,
            awarded,
        })
        .collect();
    let score: u32 = factors.iter().filter(|f| f.awarded).map(|f| f.points).sum();

    CloseProbability {
        score,
        label: label_for_score(score),
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_true() -> CloseProbabilityInput {
        CloseProbabilityInput {
            returning_customer: true,
            job_value: 5000.0,
            distance_miles: 10.0,
            margin_percent: 40.0,
            earliest_start_within_7_days: true,
        }
    }

    #[test]
    fn test_all_rules_hold() {
        let result = calculate_close_probability(&all_true());
        assert_eq!(result.score, 75);
        assert_eq!(result.label, ProbabilityLabel::High);
        assert!(result.factors.iter().all(|f| f.awarded));
        assert_eq!(result.factors[0].marker(), "✓ +20");
    }

    #[test]
    fn test_nothing_holds() {
        let input = CloseProbabilityInput {
            distance_miles: 40.0,
            ..Default::default()
        };
        let result = calculate_close_probability(&input);
        assert_eq!(result.score, 0);
        assert_eq!(result.label, ProbabilityLabel::Low);
        assert_eq!(result.factors[2].marker(), "✗");
    }

    #[test]
    fn test_boundaries_are_strict() {
        let input = CloseProbabilityInput {
            returning_customer: false,
            job_value: 3000.0,
            distance_miles: 15.0,
            margin_percent: 35.0,
            earliest_start_within_7_days: false,
        };
        assert_eq!(calculate_close_probability(&input).score, 0);
    }

    #[test]
    fn test_label_thresholds() {
        assert_eq!(label_for_score(40), ProbabilityLabel::Low);
        assert_eq!(label_for_score(41), ProbabilityLabel::Medium);
        assert_eq!(label_for_score(70), ProbabilityLabel::Medium);
        assert_eq!(label_for_score(71), ProbabilityLabel::High);
    }

    #[test]
    fn test_adding_a_factor_never_lowers_score() {
        let base = CloseProbabilityInput {
            distance_miles: 40.0,
            ..Default::default()
        };
        let before = calculate_close_probability(&base);
        let after = calculate_close_probability(&CloseProbabilityInput {
            margin_percent: 50.0,
            ..base.clone()
        });
        assert!(after.score > before.score);
        assert!(after.label >= before.label);
    }

    #[test]
    fn test_reachable_medium() {
        // returning + margin + quick start = 55
        let input = CloseProbabilityInput {
            returning_customer: true,
            margin_percent: 45.0,
            earliest_start_within_7_days: true,
            distance_miles: 30.0,
            job_value: 1000.0,
        };
        let result = calculate_close_probability(&input);
        assert_eq!(result.score, 55);
        assert_eq!(result.label, ProbabilityLabel::Medium);
    }
}
