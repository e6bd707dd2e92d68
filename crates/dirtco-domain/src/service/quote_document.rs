//! Customer-facing quote documents

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{Customer, JobRequest, QuoteBreakdown, QuoteRecord};

pub const COMPANY_NAME: &str = "Temecula Valley Dirt Co.";
pub const COMPANY_ADDRESS: &str = "Temecula, CA 92590 • (951) 555-3478";
pub const COMPANY_CONTACT: &str = "evan@tvdirtco.com • www.tvdirtco.com";

const GENERAL_TERMS: [&str; 3] = [
    "This quote is valid for 7 days from the date issued.",
    "Payment due at time of pickup or delivery.",
    "Accepted payment methods: Cash, Check, Credit Card, Venmo, Zelle.",
];

const RENTAL_TERMS: [&str; 7] = [
    "Security deposit required at time of rental. Refunded upon return with no damage.",
    "Equipment must be returned in clean, working condition.",
    "Customer responsible for fuel costs during rental period.",
    "Late returns subject to additional daily charges.",
    "Damage waiver recommended - covers accidental damage (normal wear excluded).",
    "Certificate of Insurance reduces security deposit requirements.",
    "Delivery fees based on distance. Pickup at yard also available.",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    #[serde(default)]
    pub detail: Option<String>,
    pub amount: f64,
}

impl LineItem {
    fn new(description: impl Into<String>, detail: Option<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            detail,
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteDocument {
    pub quote_number: String,
    pub quote_date: NaiveDate,
    pub valid_until: NaiveDate,
    pub customer_name: String,
    pub customer_company: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub job_label: String,
    pub line_items: Vec<LineItem>,
    pub total: i64,
    pub deposit: Option<f64>,
    pub coi_on_file: bool,
    pub terms: Vec<String>,
}

fn job_detail(request: &JobRequest) -> String {
    match request {
        JobRequest::BrushClearing(job) => format!(
            "{} acres, {:?} brush, {:?} access",
            job.acreage, job.density, job.access
        )
        .to_lowercase(),
        JobRequest::Trenching(job) => format!(
            "{} linear ft at {} in, {:?} soil",
            job.linear_feet,
            job.depth.inches(),
            job.soil_type
        )
        .to_lowercase(),
        JobRequest::SitePrep(job) => {
            if job.is_full_day {
                "Full day".to_string()
            } else {
                "Half day".to_string()
            }
        }
        JobRequest::Custom(job) => job.job_name.clone(),
        JobRequest::EquipmentRental(job) => format!("{} days", job.rental_days),
    }
}

fn line_items(quote: &QuoteRecord) -> Vec<LineItem> {
    let pricing = &quote.pricing;
    let mut items = Vec::new();

    match &pricing.breakdown {
        QuoteBreakdown::Production(b) => {
            items.push(LineItem::new(
                pricing.job_type.label(),
                Some(job_detail(&quote.request)),
                b.adjusted_price as f64,
            ));
            items.push(LineItem::new("Mobilization", None, b.mobilization_fee));
            if b.add_ons_total > 0.0 {
                items.push(LineItem::new("Add-on services", None, b.add_ons_total));
            }
            let subtotal = b.adjusted_price as f64 + b.mobilization_fee + b.add_ons_total;
            let adjustment = pricing.final_price as f64 - subtotal;
            if adjustment.abs() >= 0.5 {
                items.push(LineItem::new("Market adjustment", None, adjustment));
            }
        }
        QuoteBreakdown::Custom(b) => {
            items.push(LineItem::new(
                b.job_name.clone(),
                Some(format!(
                    "{} days at ${:.2}/day",
                    pricing.production.days_required, b.adjusted_day_rate
                )),
                b.base_price as f64,
            ));
            if b.material_cost > 0.0 {
                items.push(LineItem::new("Materials", None, b.material_cost));
            }
            if b.dump_fees > 0.0 {
                items.push(LineItem::new("Dump fees", None, b.dump_fees));
            }
            items.push(LineItem::new("Mobilization", None, b.mobilization_fee));
            if pricing.price_overridden {
                items.push(LineItem::new(
                    "Negotiated price adjustment",
                    None,
                    (pricing.final_price - b.computed_price) as f64,
                ));
            }
        }
        QuoteBreakdown::Rental(b) => {
            items.push(LineItem::new(
                b.equipment_name.clone(),
                Some(format!(
                    "{} days ({} wk + {} day)",
                    b.rental_days, b.weeks, b.remaining_days
                )),
                b.equipment_cost,
            ));
            if b.damage_waiver {
                items.push(LineItem::new(
                    "Damage Waiver (12% - Recommended)",
                    Some("Covers accidental damage up to equipment value".to_string()),
                    b.waiver_cost,
                ));
            }
            if b.needs_delivery {
                items.push(LineItem::new("Delivery & Pickup Service", None, b.delivery_fee));
            }
        }
    }

    // Prices are whole dollars, line amounts may carry cents
    let listed: f64 = items.iter().map(|item| item.amount).sum();
    let rounding = pricing.final_price as f64 - listed;
    if rounding.abs() >= 0.005 {
        items.push(LineItem::new("Rounding", None, rounding));
    }

    items
}

/// Assemble the document for a stored quote. Contact details come from
/// the customer record when one is given.
pub fn build_quote_document(quote: &QuoteRecord, customer: Option<&Customer>) -> QuoteDocument {
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    let is_rental = matches!(quote.pricing.breakdown, QuoteBreakdown::Rental(_));
    let coi_on_file = match &quote.pricing.breakdown {
        QuoteBreakdown::Rental(b) => b.has_coi,
        _ => false,
    };

    let mut terms: Vec<String> = vec![GENERAL_TERMS[0].to_string()];
    if is_rental {
        terms.extend(RENTAL_TERMS.iter().map(|t| t.to_string()));
    }
    terms.extend(GENERAL_TERMS[1..].iter().map(|t| t.to_string()));

    QuoteDocument {
        quote_number: quote.quote_number.clone(),
        quote_date: quote.created_at.date_naive(),
        valid_until: quote.expires_at.date_naive(),
        customer_name: quote.customer_name.clone(),
        customer_company: customer.and_then(|c| non_empty(&c.company)),
        customer_email: customer.and_then(|c| non_empty(&c.email)),
        customer_phone: customer.and_then(|c| non_empty(&c.phone)),
        job_label: quote.job_type().label().to_string(),
        line_items: line_items(quote),
        total: quote.pricing.final_price,
        deposit: quote.pricing.deposit(),
        coi_on_file,
        terms,
    }
}

/// Plain-text rendering of a quote document
pub fn render_quote_document(doc: &QuoteDocument) -> String {
    let rule = "=".repeat(60);
    let thin = "-".repeat(60);
    let date_fmt = "%b %-d, %Y";

    let mut out = String::new();
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!("{:^60}\n", COMPANY_NAME.to_uppercase()));
    out.push_str(&format!("{:^60}\n", "QUOTE"));
    out.push_str(&rule);
    out.push_str("\n\n");

    out.push_str(&format!("Quote #:      {}\n", doc.quote_number));
    out.push_str(&format!("Date:         {}\n", doc.quote_date.format(date_fmt)));
    out.push_str(&format!("Valid Until:  {}\n\n", doc.valid_until.format(date_fmt)));

    out.push_str("CUSTOMER INFORMATION\n");
    out.push_str(&format!("  {}\n", doc.customer_name));
    for line in [&doc.customer_company, &doc.customer_email, &doc.customer_phone]
        .into_iter()
        .flatten()
    {
        out.push_str(&format!("  {}\n", line));
    }
    out.push('\n');

    out.push_str(&format!("{} DETAILS\n", doc.job_label.to_uppercase()));
    out.push_str(&thin);
    out.push('\n');
    out.push_str(&format!("{:<44} {:>15}\n", "DESCRIPTION", "AMOUNT"));
    out.push_str(&thin);
    out.push('\n');
    for item in &doc.line_items {
        out.push_str(&format!("{:<44} {:>15}\n", item.description, format_money(item.amount)));
        if let Some(detail) = &item.detail {
            out.push_str(&format!("  {}\n", detail));
        }
    }
    out.push_str(&thin);
    out.push('\n');
    out.push_str(&format!(
        "{:<44} {:>15}\n",
        "TOTAL QUOTE:",
        format_money(doc.total as f64)
    ));

    if let Some(deposit) = doc.deposit {
        out.push_str(&format!(
            "{:<44} {:>15}\n",
            "Security Deposit Required:",
            format_money(deposit)
        ));
        if doc.coi_on_file {
            out.push_str("  ✓ Reduced deposit - Certificate of Insurance on file\n");
        }
    }
    out.push('\n');

    out.push_str("TERMS & CONDITIONS\n");
    for term in &doc.terms {
        out.push_str(&format!("  • {}\n", term));
    }
    out.push('\n');

    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!("{:^60}\n", COMPANY_NAME));
    out.push_str(&format!("{:^60}\n", COMPANY_ADDRESS));
    out.push_str(&format!("{:^60}\n", COMPANY_CONTACT));
    out
}

/// "$1,234.50", with a leading minus for credits
pub fn format_money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CustomJob, EquipmentRentalJob, EquipmentType, SoilType, TrenchDepth, TrenchingJob,
    };
    use crate::service::PricingCalculator;
    use chrono::{TimeZone, Utc};

    fn record(request: JobRequest) -> (QuoteRecord, Customer) {
        let pricing = PricingCalculator::default().quote(&request).unwrap();
        let customer = Customer::new(
            "Maria Lopez".to_string(),
            "maria@example.com".to_string(),
            "951-555-0101".to_string(),
        );
        let created = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
        let quote = QuoteRecord::new(
            "Q261019-042".to_string(),
            &customer,
            request,
            pricing,
            created,
            7,
        );
        (quote, customer)
    }

    #[test]
    fn test_production_lines_sum_to_total() {
        let (quote, customer) = record(JobRequest::Trenching(TrenchingJob {
            linear_feet: 400.0,
            depth: TrenchDepth::In18,
            soil_type: SoilType::Normal,
            distance_miles: 30.0,
            add_ons: vec![],
        }));
        let doc = build_quote_document(&quote, Some(&customer));
        let sum: f64 = doc.line_items.iter().map(|i| i.amount).sum();
        assert!((sum - 3680.0).abs() < 1e-6);
        assert_eq!(doc.total, 3680);
        assert_eq!(doc.valid_until, NaiveDate::from_ymd_opt(2026, 10, 26).unwrap());
        assert_eq!(doc.terms.len(), 3);
        assert!(doc.deposit.is_none());
        assert_eq!(
            doc.line_items[0].detail.as_deref(),
            Some("400 linear ft at 18 in, normal soil")
        );
    }

    #[test]
    fn test_rental_document_shows_deposit_and_terms() {
        let (quote, customer) = record(JobRequest::EquipmentRental(EquipmentRentalJob {
            equipment_type: EquipmentType::MiniExcavator,
            rental_days: 10,
            damage_waiver: true,
            has_coi: true,
            needs_delivery: false,
            delivery_distance: 0.0,
        }));
        let doc = build_quote_document(&quote, Some(&customer));
        assert_eq!(doc.deposit, Some(800.0));
        assert!(doc.coi_on_file);
        assert_eq!(doc.terms.len(), 10);

        let text = render_quote_document(&doc);
        assert!(text.contains("Quote #:      Q261019-042"));
        assert!(text.contains("Valid Until:  Oct 26, 2026"));
        assert!(text.contains("Damage Waiver (12% - Recommended)"));
        assert!(text.contains("$3,920.00"));
        assert!(text.contains("Certificate of Insurance on file"));
    }

    #[test]
    fn test_fractional_delivery_lines_sum_to_total() {
        // 0.3 miles past the included 15 adds $0.90 of delivery
        let (quote, customer) = record(JobRequest::EquipmentRental(EquipmentRentalJob {
            equipment_type: EquipmentType::MiniExcavator,
            rental_days: 2,
            damage_waiver: false,
            has_coi: false,
            needs_delivery: true,
            delivery_distance: 15.3,
        }));
        let doc = build_quote_document(&quote, Some(&customer));
        assert_eq!(doc.total, 1081);
        let sum: f64 = doc.line_items.iter().map(|i| i.amount).sum();
        assert!((sum - 1081.0).abs() < 1e-6);
        let last = doc.line_items.last().unwrap();
        assert_eq!(last.description, "Rounding");
        assert!((last.amount - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_custom_lines_with_cents_sum_to_total() {
        let (quote, customer) = record(JobRequest::Custom(CustomJob {
            job_name: "Pond dig".to_string(),
            estimated_days: 2.0,
            material_cost: 123.45,
            ..CustomJob::default()
        }));
        let doc = build_quote_document(&quote, Some(&customer));
        let sum: f64 = doc.line_items.iter().map(|i| i.amount).sum();
        assert!((sum - doc.total as f64).abs() < 1e-6);
        assert!(doc.line_items.iter().any(|i| i.description == "Materials"));
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(950.0), "$950.00");
        assert_eq!(format_money(1234567.891), "$1,234,567.89");
        assert_eq!(format_money(-1650.0), "-$1,650.00");
    }
}
