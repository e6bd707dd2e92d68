//! Domain services

pub mod availability;
pub mod close_probability;
pub mod cost_estimator;
pub mod pricing;
pub mod profit;
pub mod quote_document;
pub mod upsell;

pub use availability::{parse_booked_dates, AvailabilityScheduler};
pub use close_probability::{calculate_close_probability, label_for_score};
pub use cost_estimator::{estimate_internal_cost, HOURS_PER_DAY};
pub use pricing::PricingCalculator;
pub use profit::evaluate_profit;
pub use quote_document::{
    build_quote_document, format_money, render_quote_document, LineItem, QuoteDocument,
};
pub use upsell::suggest_upsells;

/// Round to the nearest whole currency unit
pub(crate) fn round_currency(value: f64) -> i64 {
    value.round() as i64
}

/// Round to one decimal place
pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
