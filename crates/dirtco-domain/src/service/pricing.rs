//! Pricing calculator
//!
//! Production jobs (brush clearing, trenching, site prep) share one
//! skeleton: a base price from duration and day rate, categorical
//! multipliers, mobilization and add-ons, then the market adjustment.
//! Custom jobs and equipment rentals are priced on their own rules and
//! are not market adjusted.

use dirtco_types::QuoteError;
use tracing::{debug, warn};

use super::cost_estimator::{estimate_internal_cost, HOURS_PER_DAY};
use super::profit::evaluate_profit;
use super::upsell::suggest_upsells;
use super::{round_currency, round_tenth};
use crate::model::rates::{check_market_adjustment, check_non_negative, check_positive};
use crate::model::{
    Access, CustomBreakdown, CustomJob, Density, EquipmentRentalJob, InternalCosts, JobRequest,
    JobType, Production, ProductionBreakdown, QuoteBreakdown, QuoteResult, RateTable,
    RentalBreakdown, SoilType, TrenchDepth,
};

/// Inputs shared by the production job types once duration and the
/// multiplied price are known
struct ProductionInput<'a, S> {
    job_type: JobType,
    days_required: f64,
    production_rate: Option<f64>,
    base_price: f64,
    adjusted_price: f64,
    distance_miles: f64,
    add_ons: &'a [S],
}

#[derive(Debug, Clone, Default)]
pub struct PricingCalculator {
    rates: RateTable,
}

impl PricingCalculator {
    /// Build a calculator over a validated rate table
    pub fn new(rates: RateTable) -> Result<Self, QuoteError> {
        rates.validate()?;
        Ok(Self { rates })
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Change the market adjustment for later quotes. Values outside
    /// (0, 1] are rejected and leave the current multiplier in place.
    pub fn update_market_multiplier(&mut self, value: f64) -> Result<(), QuoteError> {
        check_market_adjustment(value)?;
        debug!(
            from = self.rates.market_adjustment,
            to = value,
            "market multiplier updated"
        );
        self.rates.market_adjustment = value;
        Ok(())
    }

    pub fn current_market_multiplier(&self) -> f64 {
        self.rates.market_adjustment
    }

    /// Flat fee within the included radius, plus a per-mile charge beyond it
    pub fn mobilization_fee(&self, distance_miles: f64) -> Result<f64, QuoteError> {
        check_non_negative("distance_miles", distance_miles)?;
        let m = &self.rates.mobilization;
        if distance_miles <= m.included_miles {
            Ok(m.base_fee)
        } else {
            Ok(m.base_fee + (distance_miles - m.included_miles) * m.per_mile)
        }
    }

    /// Sum of add-on prices. Ids missing from the rate table add nothing.
    pub fn add_ons_total<S: AsRef<str>>(&self, add_ons: &[S]) -> f64 {
        add_ons
            .iter()
            .map(|id| {
                let id = id.as_ref();
                self.rates.add_on_price(id).unwrap_or_else(|| {
                    warn!(add_on = id, "unknown add-on ignored");
                    0.0
                })
            })
            .sum()
    }

    pub fn calculate_brush_clearing<S: AsRef<str>>(
        &self,
        acreage: f64,
        density: Density,
        access: Access,
        distance_miles: f64,
        add_ons: &[S],
    ) -> Result<QuoteResult, QuoteError> {
        check_positive("acreage", acreage)?;

        let brush = &self.rates.brush;
        let production_rate = brush.production.get(density);
        let days_required = acreage / production_rate;
        let base_price = days_required * brush.daily_rate;
        let adjusted_price = base_price * brush.access.get(access);

        debug!(acreage, ?density, ?access, days_required, "pricing brush clearing");
        self.price_production(ProductionInput {
            job_type: JobType::BrushClearing,
            days_required,
            production_rate: Some(production_rate),
            base_price,
            adjusted_price,
            distance_miles,
            add_ons,
        })
    }

    pub fn calculate_trenching<S: AsRef<str>>(
        &self,
        linear_feet: f64,
        depth: TrenchDepth,
        soil_type: SoilType,
        distance_miles: f64,
        add_ons: &[S],
    ) -> Result<QuoteResult, QuoteError> {
        check_positive("linear_feet", linear_feet)?;

        let trenching = &self.rates.trenching;
        let days_required = linear_feet / trenching.feet_per_day;
        let base_price = days_required * trenching.daily_rate;
        let adjusted_price =
            base_price * trenching.depth.get(depth) * trenching.soil.get(soil_type);

        debug!(
            linear_feet,
            depth = depth.inches(),
            ?soil_type,
            days_required,
            "pricing trenching"
        );
        self.price_production(ProductionInput {
            job_type: JobType::Trenching,
            days_required,
            production_rate: Some(trenching.feet_per_day),
            base_price,
            adjusted_price,
            distance_miles,
            add_ons,
        })
    }

    pub fn calculate_site_prep<S: AsRef<str>>(
        &self,
        is_full_day: bool,
        distance_miles: f64,
        add_ons: &[S],
    ) -> Result<QuoteResult, QuoteError> {
        let (rate, days_required) = if is_full_day {
            (self.rates.site_prep.full_day, 1.0)
        } else {
            (self.rates.site_prep.half_day, 0.5)
        };

        debug!(is_full_day, "pricing site prep");
        self.price_production(ProductionInput {
            job_type: JobType::SitePrep,
            days_required,
            production_rate: None,
            base_price: rate,
            adjusted_price: rate,
            distance_miles,
            add_ons,
        })
    }

    fn price_production<S: AsRef<str>>(
        &self,
        input: ProductionInput<'_, S>,
    ) -> Result<QuoteResult, QuoteError> {
        let mobilization_fee = self.mobilization_fee(input.distance_miles)?;
        let add_ons_total = self.add_ons_total(input.add_ons);
        let market_adjustment = self.rates.market_adjustment;
        let final_price = round_currency(
            (input.adjusted_price + mobilization_fee + add_ons_total) * market_adjustment,
        );

        let costs =
            estimate_internal_cost(&self.rates.internal, input.days_required, mobilization_fee)?;
        let profit = evaluate_profit(final_price, costs.total_internal_cost)?;

        debug!(
            job_type = %input.job_type,
            final_price,
            total_internal_cost = costs.total_internal_cost,
            "production quote priced"
        );
        Ok(QuoteResult {
            job_type: input.job_type,
            final_price,
            breakdown: QuoteBreakdown::Production(ProductionBreakdown {
                base_production_price: round_currency(input.base_price),
                adjusted_price: round_currency(input.adjusted_price),
                mobilization_fee,
                add_ons_total,
                market_adjustment,
            }),
            production: Production {
                days_required: round_tenth(input.days_required),
                estimated_hours: (input.days_required * HOURS_PER_DAY).round() as u32,
                production_rate: input.production_rate,
            },
            costs,
            profit,
            upsells: suggest_upsells(&self.rates, input.job_type, input.add_ons),
            price_overridden: false,
        })
    }

    /// Day-rate pricing with pass-through material and dump costs. An
    /// override price replaces the computed price; costs still come from
    /// the real inputs.
    pub fn calculate_custom_job(&self, job: &CustomJob) -> Result<QuoteResult, QuoteError> {
        check_positive("estimated_days", job.estimated_days)?;
        check_non_negative("material_cost", job.material_cost)?;
        check_non_negative("dump_fees", job.dump_fees)?;
        check_non_negative("extra_labor_days", job.extra_labor_days)?;
        if let Some(price) = job.override_price {
            check_non_negative("override_price", price)?;
        }

        let custom = &self.rates.custom;
        let mobilization_fee = self.mobilization_fee(job.distance_miles)?;
        let adjusted_day_rate = custom.base_day_rate * custom.difficulty.get(job.difficulty);
        let base_price = job.estimated_days * adjusted_day_rate;
        let labor = (job.estimated_days + job.extra_labor_days) * custom.internal_daily_cost;
        let total_internal = labor + job.material_cost + job.dump_fees + mobilization_fee;

        let computed_price =
            round_currency(base_price + job.material_cost + job.dump_fees + mobilization_fee);
        let final_price = job.override_price.map(round_currency).unwrap_or(computed_price);

        let costs = InternalCosts {
            estimated_hours: (job.estimated_days * HOURS_PER_DAY).round() as u32,
            machine_wear_cost: 0,
            fuel_cost: 0,
            labor_cost: round_currency(labor),
            material_cost: round_currency(job.material_cost),
            dump_fees: round_currency(job.dump_fees),
            mobilization_fee,
            total_internal_cost: round_currency(total_internal),
        };
        let profit = evaluate_profit(final_price, costs.total_internal_cost)?;

        debug!(
            job_name = %job.job_name,
            computed_price,
            final_price,
            overridden = job.override_price.is_some(),
            "custom job priced"
        );
        Ok(QuoteResult {
            job_type: JobType::Custom,
            final_price,
            breakdown: QuoteBreakdown::Custom(CustomBreakdown {
                job_name: job.job_name.clone(),
                base_day_rate: custom.base_day_rate,
                adjusted_day_rate,
                base_price: round_currency(base_price),
                material_cost: job.material_cost,
                dump_fees: job.dump_fees,
                mobilization_fee,
                computed_price,
                override_price: job.override_price,
            }),
            production: Production {
                days_required: round_tenth(job.estimated_days),
                estimated_hours: costs.estimated_hours,
                production_rate: None,
            },
            costs,
            profit,
            upsells: Vec::new(),
            price_overridden: job.override_price.is_some(),
        })
    }

    /// Rental billed in whole weeks first, then leftover days
    pub fn calculate_equipment_rental(
        &self,
        job: &EquipmentRentalJob,
    ) -> Result<QuoteResult, QuoteError> {
        if job.rental_days == 0 {
            return Err(QuoteError::invalid("rental_days", "must be > 0, got 0"));
        }
        check_non_negative("delivery_distance", job.delivery_distance)?;

        let rental = &self.rates.rental;
        let spec = self.rates.equipment.get(job.equipment_type);
        let weeks = job.rental_days / 7;
        let remaining_days = job.rental_days % 7;
        let equipment_cost =
            f64::from(weeks) * spec.weekly_rate + f64::from(remaining_days) * spec.daily_rate;

        let waiver_cost = if job.damage_waiver {
            (equipment_cost * rental.waiver_rate).round()
        } else {
            0.0
        };
        let delivery_fee = if job.needs_delivery {
            let extra_miles = (job.delivery_distance - rental.delivery_included_miles).max(0.0);
            rental.delivery_base_fee + extra_miles * rental.delivery_per_mile
        } else {
            0.0
        };
        let final_price = round_currency(equipment_cost + waiver_cost + delivery_fee);
        let deposit = if job.has_coi { spec.coi_deposit } else { spec.deposit };

        let internal = round_currency(equipment_cost * rental.internal_cost_share);
        let costs = InternalCosts {
            estimated_hours: 0,
            machine_wear_cost: internal,
            fuel_cost: 0,
            labor_cost: 0,
            material_cost: 0,
            dump_fees: 0,
            mobilization_fee: 0.0,
            total_internal_cost: internal,
        };
        let profit = evaluate_profit(final_price, costs.total_internal_cost)?;

        debug!(
            equipment = %job.equipment_type,
            rental_days = job.rental_days,
            weeks,
            remaining_days,
            final_price,
            "equipment rental priced"
        );
        Ok(QuoteResult {
            job_type: JobType::EquipmentRental,
            final_price,
            breakdown: QuoteBreakdown::Rental(RentalBreakdown {
                equipment_type: job.equipment_type,
                equipment_name: spec.name.clone(),
                rental_days: job.rental_days,
                weeks,
                remaining_days,
                equipment_cost,
                waiver_cost,
                delivery_fee,
                damage_waiver: job.damage_waiver,
                has_coi: job.has_coi,
                needs_delivery: job.needs_delivery,
                deposit,
            }),
            production: Production {
                days_required: f64::from(job.rental_days),
                estimated_hours: 0,
                production_rate: None,
            },
            costs,
            profit,
            upsells: Vec::new(),
            price_overridden: false,
        })
    }

    /// Price any job request
    pub fn quote(&self, request: &JobRequest) -> Result<QuoteResult, QuoteError> {
        match request {
            JobRequest::BrushClearing(job) => self.calculate_brush_clearing(
                job.acreage,
                job.density,
                job.access,
                job.distance_miles,
                &job.add_ons,
            ),
            JobRequest::Trenching(job) => self.calculate_trenching(
                job.linear_feet,
                job.depth,
                job.soil_type,
                job.distance_miles,
                &job.add_ons,
            ),
            JobRequest::SitePrep(job) => {
                self.calculate_site_prep(job.is_full_day, job.distance_miles, &job.add_ons)
            }
            JobRequest::Custom(job) => self.calculate_custom_job(job),
            JobRequest::EquipmentRental(job) => self.calculate_equipment_rental(job),
        }
    }

    /// Price a job given its type name and a JSON object of parameters
    pub fn quote_by_type(
        &self,
        job_type: &str,
        params: &serde_json::Value,
    ) -> Result<QuoteResult, QuoteError> {
        self.quote(&JobRequest::from_type_and_params(job_type, params)?)
    }
}
