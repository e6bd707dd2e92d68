//! Output formatting module

use dirtco_app::app::{CrmReport, StageJobs};
use dirtco_domain::model::{
    AvailableStart, CloseProbability, Customer, JobRecord, Lead, QuoteBreakdown, QuoteRecord,
    QuoteResult, RateTable,
};
use dirtco_domain::service::format_money;
use dirtco_types::{OutputFormat, Result};
use serde::Serialize;

fn money(amount: i64) -> String {
    format_money(amount as f64)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn factor_label(key: &str) -> &str {
    match key {
        "returning_customer" => "Returning customer",
        "high_value" => "Job value over $3,000",
        "close_distance" => "Under 15 miles",
        "good_margin" => "Margin over 35%",
        "quick_start" => "Start within 7 days",
        other => other,
    }
}

pub fn output_quote(output_format: OutputFormat, quote: &QuoteResult) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(quote);
    }

    println!("\nQuote: {}", quote.job_type.label());
    println!("{}", "=".repeat(40));

    match &quote.breakdown {
        QuoteBreakdown::Production(b) => {
            println!("Base production:   {}", money(b.base_production_price));
            println!("Adjusted:          {}", money(b.adjusted_price));
            println!("Mobilization:      {}", format_money(b.mobilization_fee));
            if b.add_ons_total > 0.0 {
                println!("Add-ons:           {}", format_money(b.add_ons_total));
            }
            println!("Market adjustment: x{:.2}", b.market_adjustment);
        }
        QuoteBreakdown::Custom(b) => {
            println!("Job:               {}", b.job_name);
            println!(
                "Day rate:          {} (adjusted {})",
                format_money(b.base_day_rate),
                format_money(b.adjusted_day_rate)
            );
            println!("Labor:             {}", money(b.base_price));
            println!("Materials:         {}", format_money(b.material_cost));
            println!("Dump fees:         {}", format_money(b.dump_fees));
            println!("Mobilization:      {}", format_money(b.mobilization_fee));
            if quote.price_overridden {
                println!("Computed price:    {}", money(b.computed_price));
            }
        }
        QuoteBreakdown::Rental(b) => {
            println!("Equipment:         {}", b.equipment_name);
            println!(
                "Rental:            {} days ({} wk + {} d)",
                b.rental_days, b.weeks, b.remaining_days
            );
            println!("Equipment cost:    {}", format_money(b.equipment_cost));
            if b.damage_waiver {
                println!("Damage waiver:     {}", format_money(b.waiver_cost));
            }
            if b.needs_delivery {
                println!("Delivery:          {}", format_money(b.delivery_fee));
            }
            println!("Deposit:           {}", format_money(b.deposit));
        }
    }

    println!("{}", "-".repeat(40));
    println!(
        "FINAL PRICE:       {}{}",
        money(quote.final_price),
        if quote.price_overridden { " (override)" } else { "" }
    );

    println!("\n--- Internal ---");
    println!("Days required:     {:.1}", quote.production.days_required);
    println!("Estimated hours:   {}", quote.production.estimated_hours);
    println!("Internal cost:     {}", money(quote.costs.total_internal_cost));
    println!("Gross profit:      {}", money(quote.profit.gross_profit));
    println!(
        "Margin:            {:.1}% ({})",
        quote.profit.margin_percent, quote.profit.status
    );

    if !quote.upsells.is_empty() {
        println!("\nSuggested add-ons:");
        for upsell in &quote.upsells {
            println!(
                "  + {} ({}) - {}",
                upsell.name,
                format_money(upsell.cost),
                upsell.benefit
            );
        }
    }

    Ok(())
}

pub fn output_quote_record(output_format: OutputFormat, quote: &QuoteRecord) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(quote);
    }

    println!("\nQuote {} ({})", quote.quote_number, quote.id);
    println!("Customer:    {} ({})", quote.customer_name, quote.customer_id);
    println!("Status:      {}", quote.status);
    println!("Expires:     {}", quote.expires_at.format("%b %-d, %Y"));
    output_quote(output_format, &quote.pricing)
}

pub fn output_quote_records(output_format: OutputFormat, quotes: &[QuoteRecord]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(quotes);
    }
    if quotes.is_empty() {
        println!("No quotes.");
        return Ok(());
    }

    println!(
        "{:<14} {:<38} {:<22} {:<18} {:>12} {:<11}",
        "Number", "ID", "Customer", "Job", "Price", "Status"
    );
    println!("{}", "-".repeat(120));
    for q in quotes {
        println!(
            "{:<14} {:<38} {:<22} {:<18} {:>12} {:<11}",
            q.quote_number,
            q.id,
            q.customer_name,
            q.job_type().label(),
            money(q.pricing.final_price),
            q.status.to_string()
        );
    }
    Ok(())
}

pub fn output_starts(output_format: OutputFormat, starts: &[AvailableStart]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(starts);
    }
    if starts.is_empty() {
        println!("No available start within the scheduling window.");
        return Ok(());
    }

    println!("\nEarliest available starts");
    println!("=========================");
    for start in starts {
        let when = match start.days_from_today {
            0 => "today".to_string(),
            1 => "tomorrow".to_string(),
            n => format!("in {} days", n),
        };
        println!("  {:<14} {}", start.formatted, when);
    }
    Ok(())
}

pub fn output_probability(output_format: OutputFormat, result: &CloseProbability) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(result);
    }

    println!("\nClose probability: {} ({})", result.score, result.label);
    for factor in &result.factors {
        println!("  {:<24} {}", factor_label(&factor.key), factor.marker());
    }
    Ok(())
}

pub fn output_customers(output_format: OutputFormat, customers: &[Customer]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(customers);
    }
    if customers.is_empty() {
        println!("No customers.");
        return Ok(());
    }

    println!(
        "{:<38} {:<22} {:<26} {:<14} {:>5} {:>12}",
        "ID", "Name", "Email", "Phone", "Jobs", "Revenue"
    );
    println!("{}", "-".repeat(122));
    for c in customers {
        println!(
            "{:<38} {:<22} {:<26} {:<14} {:>5} {:>12}",
            c.id,
            c.name,
            c.email,
            c.phone,
            c.total_jobs,
            money(c.total_revenue)
        );
    }
    Ok(())
}

pub fn output_customer(
    output_format: OutputFormat,
    customer: &Customer,
    jobs: &[JobRecord],
    lifetime_value: i64,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        #[derive(Serialize)]
        struct CustomerView<'a> {
            customer: &'a Customer,
            jobs: &'a [JobRecord],
            lifetime_value: i64,
        }
        return print_json(&CustomerView {
            customer,
            jobs,
            lifetime_value,
        });
    }

    println!("\n{} ({})", customer.name, customer.id);
    println!("{}", "=".repeat(40));
    if !customer.company.is_empty() {
        println!("Company:        {}", customer.company);
    }
    println!("Email:          {}", customer.email);
    println!("Phone:          {}", customer.phone);
    if !customer.address.is_empty() {
        println!("Address:        {}", customer.address);
    }
    if !customer.tags.is_empty() {
        println!("Tags:           {}", customer.tags.join(", "));
    }
    println!("Since:          {}", customer.created_at.format("%Y-%m-%d"));
    if let Some(contacted) = customer.last_contacted {
        println!("Last contacted: {}", contacted.format("%Y-%m-%d"));
    }
    println!("Total jobs:     {}", customer.total_jobs);
    println!("Total revenue:  {}", money(customer.total_revenue));
    println!("Lifetime value: {}", money(lifetime_value));

    if !customer.notes.is_empty() {
        println!("\nNotes:");
        for note in &customer.notes {
            println!(
                "  [{}] {}: {}",
                note.date.format("%Y-%m-%d"),
                note.author,
                note.note
            );
        }
    }

    if !customer.follow_ups.is_empty() {
        println!("\nFollow-ups:");
        for (i, f) in customer.follow_ups.iter().enumerate() {
            println!(
                "  {}. [{}] {} {}",
                i,
                if f.completed { "x" } else { " " },
                f.date,
                f.message
            );
        }
    }

    if !jobs.is_empty() {
        println!("\nJobs:");
        for job in jobs {
            println!(
                "  {} {:<18} {:<12} {}",
                job.id,
                job.job_type.label(),
                job.stage.label(),
                money(job.pricing.final_price)
            );
        }
    }
    Ok(())
}

pub fn output_leads(output_format: OutputFormat, leads: &[Lead]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(leads);
    }
    if leads.is_empty() {
        println!("No leads.");
        return Ok(());
    }

    println!(
        "{:<38} {:<22} {:<26} {:<14} {:<12}",
        "ID", "Name", "Email", "Source", "Stage"
    );
    println!("{}", "-".repeat(116));
    for lead in leads {
        println!(
            "{:<38} {:<22} {:<26} {:<14} {:<12}",
            lead.id,
            lead.customer_name,
            lead.email,
            lead.source,
            lead.stage.label()
        );
    }
    Ok(())
}

pub fn output_jobs(output_format: OutputFormat, jobs: &[JobRecord]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(jobs);
    }
    if jobs.is_empty() {
        println!("No jobs.");
        return Ok(());
    }

    println!(
        "{:<38} {:<22} {:<18} {:<12} {:>12} {:<12}",
        "ID", "Customer", "Job", "Stage", "Price", "Scheduled"
    );
    println!("{}", "-".repeat(118));
    for job in jobs {
        println!(
            "{:<38} {:<22} {:<18} {:<12} {:>12} {:<12}",
            job.id,
            job.customer_name,
            job.job_type.label(),
            job.stage.label(),
            money(job.pricing.final_price),
            job.scheduled_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
    Ok(())
}

pub fn output_job(output_format: OutputFormat, job: &JobRecord) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(job);
    }

    println!("\nJob {}", job.id);
    println!("Customer:    {} ({})", job.customer_name, job.customer_id);
    println!("Type:        {}", job.job_type.label());
    println!("Stage:       {}", job.stage);
    println!("Price:       {}", money(job.pricing.final_price));
    println!("Days:        {:.1}", job.pricing.production.days_required);
    if let Some(date) = job.scheduled_date {
        println!("Scheduled:   {}", date);
    }
    if let Some(done) = job.completed_date {
        println!("Completed:   {}", done.format("%Y-%m-%d"));
    }
    if !job.estimated_start_dates.is_empty() {
        let starts: Vec<&str> = job
            .estimated_start_dates
            .iter()
            .map(|s| s.formatted.as_str())
            .collect();
        println!("Est. starts: {}", starts.join(", "));
    }
    Ok(())
}

pub fn output_pipeline(output_format: OutputFormat, pipeline: &[StageJobs]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(pipeline);
    }

    for stage in pipeline {
        let total: i64 = stage.jobs.iter().map(|j| j.final_price).sum();
        println!(
            "\n{} ({} jobs, {})",
            stage.stage.label(),
            stage.jobs.len(),
            money(total)
        );
        for entry in &stage.jobs {
            println!(
                "  {:<38} {:<22} {:<18} {:>12}",
                entry.id,
                entry.customer,
                entry.job_type.label(),
                money(entry.final_price)
            );
        }
    }
    Ok(())
}

pub fn output_report(output_format: OutputFormat, report: &CrmReport) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(report);
    }

    println!("\nBusiness Report");
    println!("===============");
    println!("Customers:          {}", report.customers);
    println!("Leads:              {}", report.leads);
    println!("Open quotes:        {}", report.open_quotes);
    println!("Jobs:               {}", report.jobs);
    println!("Pending follow-ups: {}", report.pending_follow_ups);
    println!("\nRevenue by stage:");
    for row in report.revenue_by_stage.iter().filter(|r| r.stage.is_active()) {
        println!("  {:<12} {:>12}", row.stage.label(), money(row.revenue));
    }
    println!("\nGross profit:       {}", money(report.gross_profit));
    Ok(())
}

pub fn output_rates(output_format: OutputFormat, rates: &RateTable) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(rates);
    }

    println!("\nRate Table");
    println!("==========");
    println!("Market adjustment:  x{:.2}", rates.market_adjustment);
    println!(
        "Brush clearing:     {}/day",
        format_money(rates.brush.daily_rate)
    );
    println!(
        "Trenching:          {}/day, {} ft/day",
        format_money(rates.trenching.daily_rate),
        rates.trenching.feet_per_day
    );
    println!(
        "Site prep:          {} half day, {} full day",
        format_money(rates.site_prep.half_day),
        format_money(rates.site_prep.full_day)
    );
    println!(
        "Custom:             {}/day",
        format_money(rates.custom.base_day_rate)
    );
    println!(
        "Mobilization:       {} up to {} mi, then {}/mi",
        format_money(rates.mobilization.base_fee),
        rates.mobilization.included_miles,
        format_money(rates.mobilization.per_mile)
    );

    println!("\nAdd-ons:");
    for (id, price) in &rates.add_ons {
        println!("  {:<24} {:>10}", id, format_money(*price));
    }

    println!("\nEquipment:");
    for spec in [
        &rates.equipment.mini_excavator,
        &rates.equipment.skid_steer,
        &rates.equipment.dump_trailer,
    ] {
        println!(
            "  {:<22} {}/day {}/week, deposit {} ({} with COI)",
            spec.name,
            format_money(spec.daily_rate),
            format_money(spec.weekly_rate),
            format_money(spec.deposit),
            format_money(spec.coi_deposit)
        );
    }
    Ok(())
}
