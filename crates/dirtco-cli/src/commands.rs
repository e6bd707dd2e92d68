//! Command handlers

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::cli::{
    Cli, Commands, CustomerCommand, JobCommand, JobsCommand, LeadCommand, QuotesCommand,
    ScoreArgs,
};
use crate::output::{
    output_customer, output_customers, output_job, output_jobs, output_leads, output_pipeline,
    output_probability, output_quote, output_quote_record, output_quote_records, output_rates,
    output_report, output_starts,
};
use dirtco_app::app::{CustomerUpdate, NewCustomer};
use dirtco_app::config::Config;
use dirtco_app::repository::open_crm_service;
use dirtco_app::CrmService;
use dirtco_domain::model::{
    BrushClearingJob, CloseProbabilityInput, CustomJob, EquipmentRentalJob, JobRequest,
    SitePrepJob, TrenchingJob,
};
use dirtco_domain::service::{
    calculate_close_probability, parse_booked_dates, render_quote_document,
    AvailabilityScheduler,
};
use dirtco_infra::{load_booked_dates, load_rate_table, rate_table_to_toml};
use dirtco_types::{OutputFormat, Result};

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let output_format = cli.format.unwrap_or(config.output_format);
    let rates = cli.rates.as_deref();
    debug!(%output_format, ?rates, "loaded configuration");

    match cli.command {
        Commands::Quote { customer, job } => {
            let request = job_request(job)?;
            match customer {
                Some(customer_id) => {
                    let crm = open_crm_service(&config, rates)?;
                    let quote = crm.generate_quote(&customer_id, request)?;
                    output_quote_record(output_format, &quote)
                }
                None => {
                    let quote = config.pricing_calculator(rates)?.quote(&request)?;
                    output_quote(output_format, &quote)
                }
            }
        }

        Commands::Dates {
            days,
            booked,
            booked_csv,
            include_jobs,
            from,
        } => {
            let mut booked = parse_booked_dates(&booked)?;
            if let Some(path) = booked_csv {
                booked.extend(load_booked_dates(&path)?);
            }
            if include_jobs {
                booked.extend(open_crm_service(&config, rates)?.booked_dates()?);
            }
            let today = from.unwrap_or_else(|| Local::now().date_naive());
            let starts =
                AvailabilityScheduler::default().next_available_starts(&booked, days, today)?;
            output_starts(output_format, &starts)
        }

        Commands::Score(args) => cmd_score(output_format, args),

        Commands::Customer { action } => {
            let crm = open_crm_service(&config, rates)?;
            cmd_customer(&crm, output_format, action)
        }

        Commands::Lead { action } => {
            let crm = open_crm_service(&config, rates)?;
            cmd_lead(&crm, output_format, action)
        }

        Commands::Quotes { action } => {
            let crm = open_crm_service(&config, rates)?;
            cmd_quotes(&crm, output_format, action)
        }

        Commands::Jobs { action } => {
            let crm = open_crm_service(&config, rates)?;
            cmd_jobs(&crm, output_format, action)
        }

        Commands::Report => {
            let crm = open_crm_service(&config, rates)?;
            output_report(output_format, &crm.report()?)
        }

        Commands::Rates { toml } => {
            let calculator = config.pricing_calculator(rates)?;
            if toml {
                print!("{}", rate_table_to_toml(calculator.rates())?);
                Ok(())
            } else {
                output_rates(output_format, calculator.rates())
            }
        }

        Commands::Config {
            show,
            set_market_multiplier,
            clear_market_multiplier,
            set_store_dir,
            set_rates_file,
            set_output,
            set_author,
            reset,
        } => cmd_config(
            config,
            show,
            set_market_multiplier,
            clear_market_multiplier,
            set_store_dir,
            set_rates_file,
            set_output,
            set_author,
            reset,
        ),
    }
}

fn job_request(job: JobCommand) -> Result<JobRequest> {
    let request = match job {
        JobCommand::Brush {
            acreage,
            density,
            access,
            distance,
            add_ons,
        } => JobRequest::BrushClearing(BrushClearingJob {
            acreage,
            density,
            access,
            distance_miles: distance,
            add_ons,
        }),
        JobCommand::Trench {
            feet,
            depth,
            soil,
            distance,
            add_ons,
        } => JobRequest::Trenching(TrenchingJob {
            linear_feet: feet,
            depth,
            soil_type: soil,
            distance_miles: distance,
            add_ons,
        }),
        JobCommand::SitePrep {
            full_day,
            distance,
            add_ons,
        } => JobRequest::SitePrep(SitePrepJob {
            is_full_day: full_day,
            distance_miles: distance,
            add_ons,
        }),
        JobCommand::Custom {
            name,
            days,
            difficulty,
            distance,
            materials,
            dump_fees,
            extra_labor_days,
            override_price,
        } => JobRequest::Custom(CustomJob {
            job_name: name,
            estimated_days: days,
            difficulty,
            distance_miles: distance,
            material_cost: materials,
            dump_fees,
            extra_labor_days,
            override_price,
        }),
        JobCommand::Rental {
            equipment,
            days,
            waiver,
            coi,
            deliver,
        } => JobRequest::EquipmentRental(EquipmentRentalJob {
            equipment_type: equipment,
            rental_days: days,
            damage_waiver: waiver,
            has_coi: coi,
            needs_delivery: deliver.is_some(),
            delivery_distance: deliver.unwrap_or(0.0),
        }),
        JobCommand::Json { job_type, params } => {
            let params: serde_json::Value = serde_json::from_str(&params)?;
            JobRequest::from_type_and_params(&job_type, &params)?
        }
    };
    Ok(request)
}

fn cmd_score(output_format: OutputFormat, args: ScoreArgs) -> Result<()> {
    let result = calculate_close_probability(&CloseProbabilityInput {
        returning_customer: args.returning,
        job_value: args.value,
        distance_miles: args.distance,
        margin_percent: args.margin,
        earliest_start_within_7_days: args.quick_start,
    });
    output_probability(output_format, &result)
}

fn cmd_customer(
    crm: &CrmService,
    output_format: OutputFormat,
    action: CustomerCommand,
) -> Result<()> {
    match action {
        CustomerCommand::Add {
            name,
            email,
            phone,
            address,
            company,
            tags,
        } => {
            let customer = crm.add_customer(NewCustomer {
                name,
                email,
                phone,
                address,
                company,
                tags,
            })?;
            println!("Added customer {} ({})", customer.name, customer.id);
            Ok(())
        }
        CustomerCommand::List => output_customers(output_format, &crm.list_customers()?),
        CustomerCommand::Search { query } => {
            output_customers(output_format, &crm.search_customers(&query)?)
        }
        CustomerCommand::Show { id } => {
            let customer = crm.get_customer(&id)?;
            let jobs = crm.jobs_by_customer(&id)?;
            let lifetime_value = crm.customer_lifetime_value(&id)?;
            output_customer(output_format, &customer, &jobs, lifetime_value)
        }
        CustomerCommand::Update {
            id,
            name,
            email,
            phone,
            address,
            company,
            tags,
        } => {
            let customer = crm.update_customer(
                &id,
                CustomerUpdate {
                    name,
                    email,
                    phone,
                    address,
                    company,
                    tags,
                },
            )?;
            println!("Updated customer {}", customer.id);
            Ok(())
        }
        CustomerCommand::Delete { id } => {
            crm.delete_customer(&id)?;
            println!("Deleted customer {}", id);
            Ok(())
        }
        CustomerCommand::Note { id, note } => {
            crm.add_customer_note(&id, &note)?;
            println!("Note added");
            Ok(())
        }
        CustomerCommand::FollowUp { id, message, date } => {
            crm.schedule_follow_up(&id, &message, date)?;
            println!("Follow-up scheduled for {}", date);
            Ok(())
        }
        CustomerCommand::CompleteFollowUp { id, index } => {
            crm.complete_follow_up(&id, index)?;
            println!("Follow-up {} completed", index);
            Ok(())
        }
        CustomerCommand::Export { output } => {
            let count = crm.export_customers(&output)?;
            println!("Exported {} customers to {}", count, output.display());
            Ok(())
        }
    }
}

fn cmd_lead(crm: &CrmService, output_format: OutputFormat, action: LeadCommand) -> Result<()> {
    match action {
        LeadCommand::Add {
            name,
            email,
            phone,
            source,
        } => {
            let lead = crm.add_lead(&name, &email, &phone, source)?;
            println!("Added lead {} ({})", lead.customer_name, lead.id);
            Ok(())
        }
        LeadCommand::List => output_leads(output_format, &crm.list_leads()?),
        LeadCommand::Stage { id, stage } => {
            let lead = crm.update_lead_stage(&id, stage)?;
            println!("Lead {} is now {}", lead.id, lead.stage);
            Ok(())
        }
        LeadCommand::Convert { id } => {
            let customer = crm.convert_lead(&id)?;
            println!("Converted lead to customer {} ({})", customer.name, customer.id);
            Ok(())
        }
    }
}

fn cmd_quotes(crm: &CrmService, output_format: OutputFormat, action: QuotesCommand) -> Result<()> {
    match action {
        QuotesCommand::List => output_quote_records(output_format, &crm.list_quotes()?),
        QuotesCommand::Show { id } => output_quote_record(output_format, &crm.get_quote(&id)?),
        QuotesCommand::Accept { id } => {
            let job = crm.accept_quote(&id)?;
            if output_format == OutputFormat::Table {
                println!("Quote accepted, job {} opened", job.id);
            }
            output_job(output_format, &job)
        }
        QuotesCommand::Score { id } => {
            output_probability(output_format, &crm.quote_close_probability(&id)?)
        }
        QuotesCommand::Document { id } => {
            let document = crm.quote_document(&id)?;
            if output_format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&document)?);
            } else {
                print!("{}", render_quote_document(&document));
            }
            Ok(())
        }
        QuotesCommand::Export { id, output } => {
            let quote = crm.get_quote(&id)?;
            let output_path =
                output.unwrap_or_else(|| PathBuf::from(format!("{}.xlsx", quote.quote_number)));
            crm.export_quote_workbook(&id, &output_path)?;
            println!("Exported to: {}", output_path.display());
            Ok(())
        }
    }
}

fn cmd_jobs(crm: &CrmService, output_format: OutputFormat, action: JobsCommand) -> Result<()> {
    match action {
        JobsCommand::List { customer } => {
            let jobs = match customer {
                Some(customer_id) => crm.jobs_by_customer(&customer_id)?,
                None => crm.list_jobs()?,
            };
            output_jobs(output_format, &jobs)
        }
        JobsCommand::Search { query } => output_jobs(output_format, &crm.search_jobs(&query)?),
        JobsCommand::Show { id } => output_job(output_format, &crm.get_job(&id)?),
        JobsCommand::Stage { id, stage } => {
            let job = crm.update_job_stage(&id, stage)?;
            println!("Job {} is now {}", job.id, job.stage);
            Ok(())
        }
        JobsCommand::Schedule { id, start } => {
            let job = crm.schedule_job(&id, start)?;
            println!("Job {} scheduled to start {}", job.id, start_label(start));
            Ok(())
        }
        JobsCommand::Pipeline => output_pipeline(output_format, &crm.pipeline_overview()?),
    }
}

fn start_label(date: NaiveDate) -> String {
    date.format("%a %b %-d, %Y").to_string()
}

#[allow(clippy::too_many_arguments)]
fn cmd_config(
    mut config: Config,
    show: bool,
    set_market_multiplier: Option<f64>,
    clear_market_multiplier: bool,
    set_store_dir: Option<PathBuf>,
    set_rates_file: Option<PathBuf>,
    set_output: Option<OutputFormat>,
    set_author: Option<String>,
    reset: bool,
) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut modified = false;

    if let Some(multiplier) = set_market_multiplier {
        config.set_market_multiplier(multiplier)?;
        modified = true;
    }

    if clear_market_multiplier {
        config.market_multiplier = None;
        modified = true;
    }

    if let Some(dir) = set_store_dir {
        config.store_dir = Some(dir);
        modified = true;
    }

    if let Some(path) = set_rates_file {
        // Reject a bad rate table before it is saved
        load_rate_table(&path)?;
        config.rates_file = Some(path);
        modified = true;
    }

    if let Some(output_format) = set_output {
        config.output_format = output_format;
        modified = true;
    }

    if let Some(author) = set_author {
        config.quote_author = author;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration saved");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}
