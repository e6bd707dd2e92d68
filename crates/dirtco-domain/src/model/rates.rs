//! Rate table: day rates, production rates, multipliers, add-ons and the
//! rental catalog.
//!
//! Every categorical table is a struct with one field per level, so a
//! lookup can never miss. Tables loaded from a file must pass
//! [`RateTable::validate`] before use.

use std::collections::BTreeMap;

use dirtco_types::QuoteError;
use serde::{Deserialize, Serialize};

use super::job::{Access, Density, Difficulty, EquipmentType, SoilType, TrenchDepth};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateTable {
    /// Global discount applied to computed production prices
    pub market_adjustment: f64,
    pub brush: BrushRates,
    pub trenching: TrenchingRates,
    pub site_prep: SitePrepRates,
    pub custom: CustomRates,
    pub internal: InternalCostRates,
    pub mobilization: MobilizationRates,
    pub rental: RentalRates,
    /// Flat price per add-on id
    pub add_ons: BTreeMap<String, f64>,
    pub equipment: EquipmentCatalog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushRates {
    pub daily_rate: f64,
    /// Acres cleared per day
    pub production: DensityRates,
    pub access: AccessMultipliers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityRates {
    pub light: f64,
    pub medium: f64,
    pub heavy: f64,
}

impl DensityRates {
    pub fn get(&self, density: Density) -> f64 {
        match density {
            Density::Light => self.light,
            Density::Medium => self.medium,
            Density::Heavy => self.heavy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessMultipliers {
    pub easy: f64,
    pub moderate: f64,
    pub difficult: f64,
}

impl AccessMultipliers {
    pub fn get(&self, access: Access) -> f64 {
        match access {
            Access::Easy => self.easy,
            Access::Moderate => self.moderate,
            Access::Difficult => self.difficult,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrenchingRates {
    pub daily_rate: f64,
    pub feet_per_day: f64,
    pub depth: DepthMultipliers,
    pub soil: SoilMultipliers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthMultipliers {
    #[serde(rename = "12")]
    pub in12: f64,
    #[serde(rename = "18")]
    pub in18: f64,
    #[serde(rename = "24")]
    pub in24: f64,
    #[serde(rename = "36")]
    pub in36: f64,
}

impl DepthMultipliers {
    pub fn get(&self, depth: TrenchDepth) -> f64 {
        match depth {
            TrenchDepth::In12 => self.in12,
            TrenchDepth::In18 => self.in18,
            TrenchDepth::In24 => self.in24,
            TrenchDepth::In36 => self.in36,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilMultipliers {
    pub soft: f64,
    pub normal: f64,
    pub hard: f64,
}

impl SoilMultipliers {
    pub fn get(&self, soil: SoilType) -> f64 {
        match soil {
            SoilType::Soft => self.soft,
            SoilType::Normal => self.normal,
            SoilType::Hard => self.hard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitePrepRates {
    pub half_day: f64,
    pub full_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomRates {
    pub base_day_rate: f64,
    /// Flat internal cost per crew day
    pub internal_daily_cost: f64,
    pub difficulty: DifficultyMultipliers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyMultipliers {
    pub easy: f64,
    pub normal: f64,
    pub difficult: f64,
}

impl DifficultyMultipliers {
    pub fn get(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Normal => self.normal,
            Difficulty::Difficult => self.difficult,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InternalCostRates {
    pub machine_wear_per_hour: f64,
    pub fuel_per_day: f64,
    pub labor_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MobilizationRates {
    pub base_fee: f64,
    pub included_miles: f64,
    pub per_mile: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RentalRates {
    /// Damage waiver as a share of equipment cost
    pub waiver_rate: f64,
    pub delivery_base_fee: f64,
    pub delivery_included_miles: f64,
    pub delivery_per_mile: f64,
    /// Internal cost as a share of equipment cost
    pub internal_cost_share: f64,
}

/// Catalog entry for a rental machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub daily_rate: f64,
    pub weekly_rate: f64,
    pub deposit: f64,
    /// Deposit when a certificate of insurance is on file
    pub coi_deposit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentCatalog {
    pub mini_excavator: EquipmentSpec,
    pub skid_steer: EquipmentSpec,
    pub dump_trailer: EquipmentSpec,
}

impl EquipmentCatalog {
    pub fn get(&self, equipment: EquipmentType) -> &EquipmentSpec {
        match equipment {
            EquipmentType::MiniExcavator => &self.mini_excavator,
            EquipmentType::SkidSteer => &self.skid_steer,
            EquipmentType::DumpTrailer => &self.dump_trailer,
        }
    }

    pub fn entries(&self) -> [(EquipmentType, &EquipmentSpec); 3] {
        [
            (EquipmentType::MiniExcavator, &self.mini_excavator),
            (EquipmentType::SkidSteer, &self.skid_steer),
            (EquipmentType::DumpTrailer, &self.dump_trailer),
        ]
    }
}

impl Default for RateTable {
    fn default() -> Self {
        let add_ons = [
            ("compaction-pass", 250.0),
            ("fine-grading-finish", 300.0),
            ("haul-away-per-load", 450.0),
            ("backfill-compaction", 350.0),
            ("spoil-removal", 400.0),
            ("equipment-operator", 500.0),
            ("lighting-rental", 200.0),
            ("water-truck", 300.0),
        ]
        .into_iter()
        .map(|(id, price)| (id.to_string(), price))
        .collect();

        Self {
            market_adjustment: 0.8,
            brush: BrushRates::default(),
            trenching: TrenchingRates::default(),
            site_prep: SitePrepRates::default(),
            custom: CustomRates::default(),
            internal: InternalCostRates::default(),
            mobilization: MobilizationRates::default(),
            rental: RentalRates::default(),
            add_ons,
            equipment: EquipmentCatalog::default(),
        }
    }
}

impl Default for BrushRates {
    fn default() -> Self {
        Self {
            daily_rate: 2000.0,
            production: DensityRates::default(),
            access: AccessMultipliers::default(),
        }
    }
}

impl Default for DensityRates {
    fn default() -> Self {
        Self {
            light: 0.75,
            medium: 0.5,
            heavy: 0.25,
        }
    }
}

impl Default for AccessMultipliers {
    fn default() -> Self {
        Self {
            easy: 1.0,
            moderate: 1.25,
            difficult: 1.5,
        }
    }
}

impl Default for TrenchingRates {
    fn default() -> Self {
        Self {
            daily_rate: 1800.0,
            feet_per_day: 200.0,
            depth: DepthMultipliers::default(),
            soil: SoilMultipliers::default(),
        }
    }
}

impl Default for DepthMultipliers {
    fn default() -> Self {
        Self {
            in12: 1.0,
            in18: 1.2,
            in24: 1.4,
            in36: 1.8,
        }
    }
}

impl Default for SoilMultipliers {
    fn default() -> Self {
        Self {
            soft: 0.9,
            normal: 1.0,
            hard: 1.3,
        }
    }
}

impl Default for SitePrepRates {
    fn default() -> Self {
        Self {
            half_day: 950.0,
            full_day: 1800.0,
        }
    }
}

impl Default for CustomRates {
    fn default() -> Self {
        Self {
            base_day_rate: 2000.0,
            internal_daily_cost: 850.0,
            difficulty: DifficultyMultipliers::default(),
        }
    }
}

impl Default for DifficultyMultipliers {
    fn default() -> Self {
        Self {
            easy: 0.9,
            normal: 1.0,
            difficult: 1.25,
        }
    }
}

impl Default for InternalCostRates {
    fn default() -> Self {
        Self {
            machine_wear_per_hour: 35.0,
            fuel_per_day: 150.0,
            labor_per_day: 400.0,
        }
    }
}

impl Default for MobilizationRates {
    fn default() -> Self {
        Self {
            base_fee: 250.0,
            included_miles: 20.0,
            per_mile: 3.0,
        }
    }
}

impl Default for RentalRates {
    fn default() -> Self {
        Self {
            waiver_rate: 0.12,
            delivery_base_fee: 80.0,
            delivery_included_miles: 15.0,
            delivery_per_mile: 3.0,
            internal_cost_share: 0.4,
        }
    }
}

impl Default for EquipmentCatalog {
    fn default() -> Self {
        Self {
            mini_excavator: EquipmentSpec {
                name: "Mini Excavator".to_string(),
                description: "Compact design for pools, foundations, trenching".to_string(),
                daily_rate: 500.0,
                weekly_rate: 2000.0,
                deposit: 1000.0,
                coi_deposit: 800.0,
            },
            skid_steer: EquipmentSpec {
                name: "Skid Steer".to_string(),
                description: "Loader for material handling, grading, landscaping".to_string(),
                daily_rate: 280.0,
                weekly_rate: 1120.0,
                deposit: 1000.0,
                coi_deposit: 800.0,
            },
            dump_trailer: EquipmentSpec {
                name: "Dump Trailer".to_string(),
                description: "Hauling dirt, gravel, debris, hydraulic dump".to_string(),
                daily_rate: 100.0,
                weekly_rate: 400.0,
                deposit: 500.0,
                coi_deposit: 500.0,
            },
        }
    }
}

pub(crate) fn check_non_negative(name: &str, value: f64) -> Result<(), QuoteError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(QuoteError::invalid(name, format!("must be >= 0, got {}", value)))
    }
}

pub(crate) fn check_positive(name: &str, value: f64) -> Result<(), QuoteError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(QuoteError::invalid(name, format!("must be > 0, got {}", value)))
    }
}

/// The market adjustment is a discount: 0 < m <= 1
pub fn check_market_adjustment(value: f64) -> Result<(), QuoteError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(QuoteError::invalid(
            "market_adjustment",
            format!("must be in (0, 1], got {}", value),
        ))
    }
}

impl RateTable {
    /// Check the invariants of a rate table
    pub fn validate(&self) -> Result<(), QuoteError> {
        check_market_adjustment(self.market_adjustment)?;

        check_non_negative("brush.daily_rate", self.brush.daily_rate)?;
        check_positive("brush.production.light", self.brush.production.light)?;
        check_positive("brush.production.medium", self.brush.production.medium)?;
        check_positive("brush.production.heavy", self.brush.production.heavy)?;
        check_non_negative("brush.access.easy", self.brush.access.easy)?;
        check_non_negative("brush.access.moderate", self.brush.access.moderate)?;
        check_non_negative("brush.access.difficult", self.brush.access.difficult)?;

        check_non_negative("trenching.daily_rate", self.trenching.daily_rate)?;
        check_positive("trenching.feet_per_day", self.trenching.feet_per_day)?;
        for (name, value) in [
            ("trenching.depth.12", self.trenching.depth.in12),
            ("trenching.depth.18", self.trenching.depth.in18),
            ("trenching.depth.24", self.trenching.depth.in24),
            ("trenching.depth.36", self.trenching.depth.in36),
            ("trenching.soil.soft", self.trenching.soil.soft),
            ("trenching.soil.normal", self.trenching.soil.normal),
            ("trenching.soil.hard", self.trenching.soil.hard),
            ("site_prep.half_day", self.site_prep.half_day),
            ("site_prep.full_day", self.site_prep.full_day),
            ("custom.base_day_rate", self.custom.base_day_rate),
            ("custom.internal_daily_cost", self.custom.internal_daily_cost),
            ("custom.difficulty.easy", self.custom.difficulty.easy),
            ("custom.difficulty.normal", self.custom.difficulty.normal),
            ("custom.difficulty.difficult", self.custom.difficulty.difficult),
            ("internal.machine_wear_per_hour", self.internal.machine_wear_per_hour),
            ("internal.fuel_per_day", self.internal.fuel_per_day),
            ("internal.labor_per_day", self.internal.labor_per_day),
            ("mobilization.base_fee", self.mobilization.base_fee),
            ("mobilization.included_miles", self.mobilization.included_miles),
            ("mobilization.per_mile", self.mobilization.per_mile),
            ("rental.waiver_rate", self.rental.waiver_rate),
            ("rental.delivery_base_fee", self.rental.delivery_base_fee),
            ("rental.delivery_included_miles", self.rental.delivery_included_miles),
            ("rental.delivery_per_mile", self.rental.delivery_per_mile),
            ("rental.internal_cost_share", self.rental.internal_cost_share),
        ] {
            check_non_negative(name, value)?;
        }

        for (id, price) in &self.add_ons {
            check_non_negative(&format!("add_ons.{}", id), *price)?;
        }

        for (equipment, spec) in self.equipment.entries() {
            let prefix = format!("equipment.{}", equipment);
            check_non_negative(&format!("{}.daily_rate", prefix), spec.daily_rate)?;
            check_non_negative(&format!("{}.weekly_rate", prefix), spec.weekly_rate)?;
            check_non_negative(&format!("{}.deposit", prefix), spec.deposit)?;
            check_non_negative(&format!("{}.coi_deposit", prefix), spec.coi_deposit)?;
            if spec.weekly_rate > 7.0 * spec.daily_rate {
                return Err(QuoteError::invalid(
                    format!("{}.weekly_rate", prefix),
                    format!(
                        "{} exceeds seven days at the daily rate ({})",
                        spec.weekly_rate,
                        7.0 * spec.daily_rate
                    ),
                ));
            }
        }

        Ok(())
    }

    /// Price of an add-on, `None` for ids not in the table
    pub fn add_on_price(&self, id: &str) -> Option<f64> {
        self.add_ons.get(id).copied()
    }
}
