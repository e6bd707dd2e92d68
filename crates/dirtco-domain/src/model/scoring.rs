//! Close probability types

use serde::{Deserialize, Serialize};

/// Deal attributes used to score a quote
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloseProbabilityInput {
    pub returning_customer: bool,
    pub job_value: f64,
    pub distance_miles: f64,
    pub margin_percent: f64,
    pub earliest_start_within_7_days: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProbabilityLabel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ProbabilityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbabilityLabel::Low => write!(f, "Low"),
            ProbabilityLabel::Medium => write!(f, "Medium"),
            ProbabilityLabel::High => write!(f, "High"),
        }
    }
}

/// Outcome of one scoring rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub key: String,
    pub points: u32,
    pub awarded: bool,
}

impl ScoreFactor {
    /// "✓ +20" when awarded, "✗" otherwise
    pub fn marker(&self) -> String {
        if self.awarded {
            format!("✓ +{}", self.points)
        } else {
            "✗".to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseProbability {
    pub score: u32,
    pub label: ProbabilityLabel,
    pub factors: Vec<ScoreFactor>,
}
