//! Job request types
//!
//! Categorical inputs are parsed into enums at the boundary so the pricing
//! code never looks up a multiplier that does not exist.

use std::fmt;
use std::str::FromStr;

use dirtco_types::QuoteError;
use serde::{Deserialize, Serialize};

/// Match `input` against the accepted spellings of each level
fn parse_level<T: Copy>(name: &str, input: &str, levels: &[(&str, T)]) -> Result<T, QuoteError> {
    let key = input.trim().to_lowercase();
    levels
        .iter()
        .find(|(label, _)| *label == key)
        .map(|(_, level)| *level)
        .ok_or_else(|| {
            let accepted: Vec<&str> = levels.iter().map(|(label, _)| *label).collect();
            QuoteError::invalid(
                name,
                format!("unknown value '{}' (expected one of: {})", input, accepted.join(", ")),
            )
        })
}

/// Kind of work being quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    BrushClearing,
    Trenching,
    SitePrep,
    Custom,
    EquipmentRental,
}

impl JobType {
    pub const ALL: [JobType; 5] = [
        JobType::BrushClearing,
        JobType::Trenching,
        JobType::SitePrep,
        JobType::Custom,
        JobType::EquipmentRental,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::BrushClearing => "brush-clearing",
            JobType::Trenching => "trenching",
            JobType::SitePrep => "site-prep",
            JobType::Custom => "custom",
            JobType::EquipmentRental => "equipment-rental",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            JobType::BrushClearing => "Brush Clearing",
            JobType::Trenching => "Trenching",
            JobType::SitePrep => "Site Prep",
            JobType::Custom => "Custom Job",
            JobType::EquipmentRental => "Equipment Rental",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        JobType::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| QuoteError::UnsupportedJobType(s.to_string()))
    }
}

/// Brush density, drives the acres-per-day production rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Light,
    Medium,
    Heavy,
}

impl FromStr for Density {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_level(
            "density",
            s,
            &[
                ("light", Density::Light),
                ("medium", Density::Medium),
                ("heavy", Density::Heavy),
            ],
        )
    }
}

/// Site access difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Easy,
    Moderate,
    Difficult,
}

impl FromStr for Access {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_level(
            "access",
            s,
            &[
                ("easy", Access::Easy),
                ("moderate", Access::Moderate),
                ("difficult", Access::Difficult),
            ],
        )
    }
}

/// Trench depth in inches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TrenchDepth {
    In12,
    In18,
    In24,
    In36,
}

impl TrenchDepth {
    pub fn inches(&self) -> u32 {
        match self {
            TrenchDepth::In12 => 12,
            TrenchDepth::In18 => 18,
            TrenchDepth::In24 => 24,
            TrenchDepth::In36 => 36,
        }
    }
}

impl TryFrom<u32> for TrenchDepth {
    type Error = QuoteError;

    fn try_from(inches: u32) -> Result<Self, Self::Error> {
        match inches {
            12 => Ok(TrenchDepth::In12),
            18 => Ok(TrenchDepth::In18),
            24 => Ok(TrenchDepth::In24),
            36 => Ok(TrenchDepth::In36),
            other => Err(QuoteError::invalid(
                "depth",
                format!("unsupported depth {} in (expected 12, 18, 24 or 36)", other),
            )),
        }
    }
}

impl From<TrenchDepth> for u32 {
    fn from(depth: TrenchDepth) -> Self {
        depth.inches()
    }
}

impl FromStr for TrenchDepth {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inches: u32 = s
            .trim()
            .trim_end_matches("in")
            .trim_end_matches('"')
            .trim()
            .parse()
            .map_err(|_| QuoteError::invalid("depth", format!("not a depth: '{}'", s)))?;
        TrenchDepth::try_from(inches)
    }
}

/// Soil hardness for trenching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    Soft,
    Normal,
    Hard,
}

impl FromStr for SoilType {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_level(
            "soil_type",
            s,
            &[
                ("soft", SoilType::Soft),
                ("normal", SoilType::Normal),
                ("hard", SoilType::Hard),
            ],
        )
    }
}

/// Difficulty of a custom job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Difficult,
}

impl FromStr for Difficulty {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_level(
            "difficulty",
            s,
            &[
                ("easy", Difficulty::Easy),
                ("normal", Difficulty::Normal),
                ("difficult", Difficulty::Difficult),
            ],
        )
    }
}

/// Rental equipment in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EquipmentType {
    MiniExcavator,
    SkidSteer,
    DumpTrailer,
}

impl EquipmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentType::MiniExcavator => "mini-excavator",
            EquipmentType::SkidSteer => "skid-steer",
            EquipmentType::DumpTrailer => "dump-trailer",
        }
    }
}

impl fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquipmentType {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_level(
            "equipment_type",
            s,
            &[
                ("mini-excavator", EquipmentType::MiniExcavator),
                ("skid-steer", EquipmentType::SkidSteer),
                ("dump-trailer", EquipmentType::DumpTrailer),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushClearingJob {
    pub acreage: f64,
    pub density: Density,
    pub access: Access,
    #[serde(default)]
    pub distance_miles: f64,
    #[serde(default)]
    pub add_ons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrenchingJob {
    pub linear_feet: f64,
    pub depth: TrenchDepth,
    pub soil_type: SoilType,
    #[serde(default)]
    pub distance_miles: f64,
    #[serde(default)]
    pub add_ons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitePrepJob {
    pub is_full_day: bool,
    #[serde(default)]
    pub distance_miles: f64,
    #[serde(default)]
    pub add_ons: Vec<String>,
}

/// Generic job priced by the day, with pass-through material and dump costs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomJob {
    pub job_name: String,
    pub estimated_days: f64,
    pub difficulty: Difficulty,
    pub distance_miles: f64,
    pub material_cost: f64,
    pub dump_fees: f64,
    pub extra_labor_days: f64,
    /// Negotiated price that replaces the computed one
    pub override_price: Option<f64>,
}

impl Default for CustomJob {
    fn default() -> Self {
        Self {
            job_name: "Custom Work".to_string(),
            estimated_days: 1.0,
            difficulty: Difficulty::Normal,
            distance_miles: 0.0,
            material_cost: 0.0,
            dump_fees: 0.0,
            extra_labor_days: 0.0,
            override_price: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRentalJob {
    pub equipment_type: EquipmentType,
    pub rental_days: u32,
    #[serde(default)]
    pub damage_waiver: bool,
    #[serde(default)]
    pub has_coi: bool,
    #[serde(default)]
    pub needs_delivery: bool,
    #[serde(default)]
    pub delivery_distance: f64,
}

/// A quote request, one variant per job type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum JobRequest {
    BrushClearing(BrushClearingJob),
    Trenching(TrenchingJob),
    SitePrep(SitePrepJob),
    Custom(CustomJob),
    EquipmentRental(EquipmentRentalJob),
}

impl JobRequest {
    pub fn job_type(&self) -> JobType {
        match self {
            JobRequest::BrushClearing(_) => JobType::BrushClearing,
            JobRequest::Trenching(_) => JobType::Trenching,
            JobRequest::SitePrep(_) => JobType::SitePrep,
            JobRequest::Custom(_) => JobType::Custom,
            JobRequest::EquipmentRental(_) => JobType::EquipmentRental,
        }
    }

    /// Build a request from a job type name and a JSON object of its
    /// parameters. A `null` object means all defaults.
    pub fn from_type_and_params(
        job_type: &str,
        params: &serde_json::Value,
    ) -> Result<Self, QuoteError> {
        let job_type: JobType = job_type.parse()?;
        let mut object = match params {
            serde_json::Value::Object(map) => map.clone(),
            serde_json::Value::Null => serde_json::Map::new(),
            _ => return Err(QuoteError::invalid("params", "expected a JSON object")),
        };
        object.insert(
            "type".to_string(),
            serde_json::Value::String(job_type.as_str().to_string()),
        );
        serde_json::from_value(serde_json::Value::Object(object))
            .map_err(|e| QuoteError::invalid("params", e.to_string()))
    }

    /// Distance from the yard to the job site
    pub fn distance_miles(&self) -> f64 {
        match self {
            JobRequest::BrushClearing(job) => job.distance_miles,
            JobRequest::Trenching(job) => job.distance_miles,
            JobRequest::SitePrep(job) => job.distance_miles,
            JobRequest::Custom(job) => job.distance_miles,
            JobRequest::EquipmentRental(job) => {
                if job.needs_delivery {
                    job.delivery_distance
                } else {
                    0.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels_case_insensitive() {
        assert_eq!("Medium".parse::<Density>().unwrap(), Density::Medium);
        assert_eq!(" difficult ".parse::<Access>().unwrap(), Access::Difficult);
        assert_eq!("HARD".parse::<SoilType>().unwrap(), SoilType::Hard);
    }

    #[test]
    fn test_unknown_level_is_invalid_parameter() {
        let err = "swampy".parse::<SoilType>().unwrap_err();
        match err {
            QuoteError::InvalidParameter { name, reason } => {
                assert_eq!(name, "soil_type");
                assert!(reason.contains("swampy"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_depth_parsing() {
        assert_eq!("18".parse::<TrenchDepth>().unwrap(), TrenchDepth::In18);
        assert_eq!("36in".parse::<TrenchDepth>().unwrap(), TrenchDepth::In36);
        assert!("20".parse::<TrenchDepth>().is_err());
        assert!("deep".parse::<TrenchDepth>().is_err());
    }

    #[test]
    fn test_unknown_job_type() {
        assert_eq!("site-prep".parse::<JobType>().unwrap(), JobType::SitePrep);
        assert_eq!(
            "demolition".parse::<JobType>().unwrap_err(),
            QuoteError::UnsupportedJobType("demolition".to_string())
        );
    }

    #[test]
    fn test_job_request_json_shape() {
        let json = r#"{"type":"trenching","linear_feet":400,"depth":18,
            "soil_type":"normal","distance_miles":30}"#;
        let request: JobRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.job_type(), JobType::Trenching);
        match &request {
            JobRequest::Trenching(job) => {
                assert_eq!(job.depth, TrenchDepth::In18);
                assert!(job.add_ons.is_empty());
            }
            other => panic!("unexpected request: {other:?}"),
        }

        let round = serde_json::to_value(&request).unwrap();
        assert_eq!(round["depth"], 18);
    }

    #[test]
    fn test_from_type_and_params() {
        let params = serde_json::json!({ "job_name": "Pond dig", "estimated_days": 2.5 });
        match JobRequest::from_type_and_params("Custom", &params).unwrap() {
            JobRequest::Custom(job) => {
                assert_eq!(job.job_name, "Pond dig");
                assert!((job.estimated_days - 2.5).abs() < f64::EPSILON);
            }
            other => panic!("unexpected request: {other:?}"),
        }

        // null params take every default
        let request = JobRequest::from_type_and_params("custom", &serde_json::Value::Null).unwrap();
        assert_eq!(request.job_type(), JobType::Custom);

        // a stray "type" in the params never overrides the named job type
        let params = serde_json::json!({ "type": "trenching", "is_full_day": true });
        let request = JobRequest::from_type_and_params("site-prep", &params).unwrap();
        assert_eq!(request.job_type(), JobType::SitePrep);

        match JobRequest::from_type_and_params("trenching", &serde_json::json!([1, 2])) {
            Err(QuoteError::InvalidParameter { name, .. }) => assert_eq!(name, "params"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(
            JobRequest::from_type_and_params("demolition", &serde_json::Value::Null).unwrap_err(),
            QuoteError::UnsupportedJobType("demolition".to_string())
        );
    }

    #[test]
    fn test_bad_depth_rejected_on_deserialize() {
        let json = r#"{"type":"trenching","linear_feet":400,"depth":20,"soil_type":"normal"}"#;
        assert!(serde_json::from_str::<JobRequest>(json).is_err());
    }

    #[test]
    fn test_custom_job_defaults() {
        let job: CustomJob = serde_json::from_str("{}").unwrap();
        assert_eq!(job.job_name, "Custom Work");
        assert!((job.estimated_days - 1.0).abs() < f64::EPSILON);
        assert_eq!(job.difficulty, Difficulty::Normal);
        assert!(job.override_price.is_none());
    }
}
