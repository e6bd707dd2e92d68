//! Internal cost of running the crew and machine

use dirtco_types::QuoteError;

use super::round_currency;
use crate::model::rates::{check_non_negative, InternalCostRates};
use crate::model::InternalCosts;

/// Length of a crew day
pub const HOURS_PER_DAY: f64 = 8.0;

/// Machine wear, fuel and labor for `days_required`, plus mobilization.
///
/// Every amount is rounded to a whole unit except the mobilization fee,
/// which is carried through as given. The total is rounded from the
/// unrounded parts.
pub fn estimate_internal_cost(
    rates: &InternalCostRates,
    days_required: f64,
    mobilization_fee: f64,
) -> Result<InternalCosts, QuoteError> {
    check_non_negative("days_required", days_required)?;
    check_non_negative("mobilization_fee", mobilization_fee)?;

    let hours = days_required * HOURS_PER_DAY;
    let machine_wear = hours * rates.machine_wear_per_hour;
    let fuel = days_required * rates.fuel_per_day;
    let labor = days_required * rates.labor_per_day;
    let total = machine_wear + fuel + labor + mobilization_fee;

    Ok(InternalCosts {
        estimated_hours: hours.round() as u32,
        machine_wear_cost: round_currency(machine_wear),
        fuel_cost: round_currency(fuel),
        labor_cost: round_currency(labor),
        material_cost: 0,
        dump_fees: 0,
        mobilization_fee,
        total_internal_cost: round_currency(total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_day_job() {
        let costs = estimate_internal_cost(&InternalCostRates::default(), 4.0, 250.0).unwrap();
        assert_eq!(costs.estimated_hours, 32);
        assert_eq!(costs.machine_wear_cost, 1120);
        assert_eq!(costs.fuel_cost, 600);
        assert_eq!(costs.labor_cost, 1600);
        assert!((costs.mobilization_fee - 250.0).abs() < f64::EPSILON);
        assert_eq!(costs.total_internal_cost, 3570);
    }

    #[test]
    fn test_fractional_days() {
        // 1.25 days: 10h, wear 350, fuel 187.5, labor 500
        let costs = estimate_internal_cost(&InternalCostRates::default(), 1.25, 0.0).unwrap();
        assert_eq!(costs.estimated_hours, 10);
        assert_eq!(costs.fuel_cost, 188);
        assert_eq!(costs.total_internal_cost, 1038);
    }

    #[test]
    fn test_zero_days_is_mobilization_only() {
        let costs = estimate_internal_cost(&InternalCostRates::default(), 0.0, 310.0).unwrap();
        assert_eq!(costs.estimated_hours, 0);
        assert_eq!(costs.total_internal_cost, 310);
    }

    #[test]
    fn test_rejects_negative_inputs() {
        let rates = InternalCostRates::default();
        assert!(estimate_internal_cost(&rates, -1.0, 250.0).is_err());
        assert!(estimate_internal_cost(&rates, 1.0, -250.0).is_err());
        assert!(estimate_internal_cost(&rates, f64::NAN, 250.0).is_err());
    }
}
