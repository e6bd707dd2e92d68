//! Quote result types

use serde::{Deserialize, Serialize};

use super::job::{EquipmentType, JobType};

/// Margin verdict shown next to a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarginStatus {
    #[serde(rename = "WARNING: Low Margin")]
    LowMargin,
    Acceptable,
    Excellent,
}

impl MarginStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MarginStatus::LowMargin => "WARNING: Low Margin",
            MarginStatus::Acceptable => "Acceptable",
            MarginStatus::Excellent => "Excellent",
        }
    }
}

impl std::fmt::Display for MarginStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitAnalysis {
    pub gross_profit: i64,
    /// Gross profit over final price, one decimal
    pub margin_percent: f64,
    pub low_margin_flag: bool,
    pub status: MarginStatus,
}

/// Internal cost of delivering a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalCosts {
    pub estimated_hours: u32,
    pub machine_wear_cost: i64,
    pub fuel_cost: i64,
    pub labor_cost: i64,
    #[serde(default)]
    pub material_cost: i64,
    #[serde(default)]
    pub dump_fees: i64,
    pub mobilization_fee: f64,
    pub total_internal_cost: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Production {
    /// Crew days, one decimal
    pub days_required: f64,
    pub estimated_hours: u32,
    /// Acres or linear feet per day, where the job type has one
    #[serde(default)]
    pub production_rate: Option<f64>,
}

/// Line items for brush clearing, trenching and site prep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionBreakdown {
    pub base_production_price: i64,
    pub adjusted_price: i64,
    pub mobilization_fee: f64,
    pub add_ons_total: f64,
    pub market_adjustment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomBreakdown {
    pub job_name: String,
    pub base_day_rate: f64,
    pub adjusted_day_rate: f64,
    pub base_price: i64,
    pub material_cost: f64,
    pub dump_fees: f64,
    pub mobilization_fee: f64,
    /// Price the computed total would have been without an override
    pub computed_price: i64,
    pub override_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalBreakdown {
    pub equipment_type: EquipmentType,
    pub equipment_name: String,
    pub rental_days: u32,
    pub weeks: u32,
    pub remaining_days: u32,
    pub equipment_cost: f64,
    pub waiver_cost: f64,
    pub delivery_fee: f64,
    pub damage_waiver: bool,
    pub has_coi: bool,
    pub needs_delivery: bool,
    pub deposit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum QuoteBreakdown {
    Production(ProductionBreakdown),
    Custom(CustomBreakdown),
    Rental(RentalBreakdown),
}

/// Add-on suggested to the customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsellSuggestion {
    pub id: String,
    pub name: String,
    pub cost: f64,
    pub benefit: String,
}

/// Complete priced quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub job_type: JobType,
    pub final_price: i64,
    pub breakdown: QuoteBreakdown,
    pub production: Production,
    pub costs: InternalCosts,
    pub profit: ProfitAnalysis,
    #[serde(default)]
    pub upsells: Vec<UpsellSuggestion>,
    /// Final price was set by hand rather than computed
    #[serde(default)]
    pub price_overridden: bool,
}

impl QuoteResult {
    /// Security deposit, rentals only
    pub fn deposit(&self) -> Option<f64> {
        match &self.breakdown {
            QuoteBreakdown::Rental(rental) => Some(rental.deposit),
            _ => None,
        }
    }
}
