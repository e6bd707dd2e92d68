//! CRM service - customers, leads, quotes and jobs
//!
//! Every mutation is written through to the repositories before the
//! call returns. Quotes are priced by the [`PricingCalculator`] held by
//! the service, and accepted jobs get estimated start dates from the
//! [`AvailabilityScheduler`] using the dates already booked by
//! scheduled jobs.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use dirtco_domain::model::{
    AvailableStart, CloseProbability, CloseProbabilityInput, Customer, CustomerNote, FollowUp,
    JobRecord, JobRequest, JobType, Lead, PipelineStage, QuoteRecord, QuoteStatus,
};
use dirtco_domain::repository::RecordRepository;
use dirtco_domain::service::{
    build_quote_document, calculate_close_probability, AvailabilityScheduler, QuoteDocument,
};
use dirtco_domain::PricingCalculator;
use dirtco_infra::{export_customers_csv, export_quote_workbook, FileRecordRepository};
use dirtco_types::{Error, QuoteError, Result};

/// Days a quote stays valid
pub const QUOTE_VALID_DAYS: i64 = 7;

/// A start this many days out or sooner counts as a quick start
const QUICK_START_DAYS: i64 = 7;

const CONVERTED_LEAD_TAG: &str = "Converted Lead";

#[derive(Debug, Clone, Default)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub company: String,
    pub tags: Vec<String>,
}

/// Fields to change on a customer; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEntry {
    pub id: String,
    pub customer: String,
    pub job_type: JobType,
    pub final_price: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageJobs {
    pub stage: PipelineStage,
    pub jobs: Vec<PipelineEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRevenue {
    pub stage: PipelineStage,
    pub revenue: i64,
}

/// Snapshot of the whole book of business
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmReport {
    pub customers: usize,
    pub leads: usize,
    pub open_quotes: usize,
    pub jobs: usize,
    pub revenue_by_stage: Vec<StageRevenue>,
    pub gross_profit: i64,
    pub pending_follow_ups: usize,
}

fn not_found(kind: &str, id: &str) -> Error {
    Error::NotFound(format!("{} {}", kind, id))
}

fn require_text(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(QuoteError::invalid(name, "must not be empty").into());
    }
    Ok(())
}

pub struct CrmService {
    customers: Box<dyn RecordRepository<Customer>>,
    leads: Box<dyn RecordRepository<Lead>>,
    quotes: Box<dyn RecordRepository<QuoteRecord>>,
    jobs: Box<dyn RecordRepository<JobRecord>>,
    pricing: PricingCalculator,
    scheduler: AvailabilityScheduler,
    author: String,
}

impl CrmService {
    pub fn new(
        customers: Box<dyn RecordRepository<Customer>>,
        leads: Box<dyn RecordRepository<Lead>>,
        quotes: Box<dyn RecordRepository<QuoteRecord>>,
        jobs: Box<dyn RecordRepository<JobRecord>>,
        pricing: PricingCalculator,
    ) -> Self {
        Self {
            customers,
            leads,
            quotes,
            jobs,
            pricing,
            scheduler: AvailabilityScheduler::default(),
            author: "Evan Tremper".to_string(),
        }
    }

    /// Service over file repositories in `store_dir`
    pub fn open(store_dir: &Path, pricing: PricingCalculator) -> Result<Self> {
        Ok(Self::new(
            Box::new(FileRecordRepository::<Customer>::open(store_dir)?),
            Box::new(FileRecordRepository::<Lead>::open(store_dir)?),
            Box::new(FileRecordRepository::<QuoteRecord>::open(store_dir)?),
            Box::new(FileRecordRepository::<JobRecord>::open(store_dir)?),
            pricing,
        ))
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_scheduler(mut self, scheduler: AvailabilityScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn pricing(&self) -> &PricingCalculator {
        &self.pricing
    }

    // ---- customers ----

    pub fn add_customer(&self, new: NewCustomer) -> Result<Customer> {
        require_text("name", &new.name)?;
        let customer = Customer::new(new.name, new.email, new.phone)
            .with_address(new.address)
            .with_company(new.company)
            .with_tags(new.tags);
        self.customers.create(&customer)?;
        info!(customer_id = %customer.id, name = %customer.name, "customer added");
        Ok(customer)
    }

    pub fn get_customer(&self, id: &str) -> Result<Customer> {
        self.customers
            .find_by_id(id)?
            .ok_or_else(|| not_found("customer", id))
    }

    pub fn list_customers(&self) -> Result<Vec<Customer>> {
        self.customers.find_all()
    }

    pub fn search_customers(&self, query: &str) -> Result<Vec<Customer>> {
        Ok(self
            .customers
            .find_all()?
            .into_iter()
            .filter(|c| c.matches(query))
            .collect())
    }

    pub fn update_customer(&self, id: &str, update: CustomerUpdate) -> Result<Customer> {
        let mut customer = self.get_customer(id)?;
        if let Some(name) = update.name {
            require_text("name", &name)?;
            customer.name = name;
        }
        if let Some(email) = update.email {
            customer.email = email;
        }
        if let Some(phone) = update.phone {
            customer.phone = phone;
        }
        if let Some(address) = update.address {
            customer.address = address;
        }
        if let Some(company) = update.company {
            customer.company = company;
        }
        if let Some(tags) = update.tags {
            customer.tags = tags;
        }
        customer.last_updated = Some(Utc::now());
        self.save_customer(&customer)?;
        info!(customer_id = %customer.id, "customer updated");
        Ok(customer)
    }

    pub fn delete_customer(&self, id: &str) -> Result<()> {
        if !self.customers.delete(id)? {
            return Err(not_found("customer", id));
        }
        info!(customer_id = id, "customer deleted");
        Ok(())
    }

    pub fn add_customer_note(&self, id: &str, note: &str) -> Result<Customer> {
        require_text("note", note)?;
        let mut customer = self.get_customer(id)?;
        let now = Utc::now();
        customer.notes.push(CustomerNote {
            note: note.to_string(),
            date: now,
            author: self.author.clone(),
        });
        customer.last_contacted = Some(now);
        self.save_customer(&customer)?;
        info!(customer_id = id, "note added");
        Ok(customer)
    }

    pub fn schedule_follow_up(&self, id: &str, message: &str, date: NaiveDate) -> Result<Customer> {
        require_text("message", message)?;
        let mut customer = self.get_customer(id)?;
        customer.follow_ups.push(FollowUp {
            message: message.to_string(),
            date,
            completed: false,
            created_at: Utc::now(),
            completed_at: None,
        });
        self.save_customer(&customer)?;
        info!(customer_id = id, %date, "follow-up scheduled");
        Ok(customer)
    }

    pub fn complete_follow_up(&self, id: &str, index: usize) -> Result<Customer> {
        let mut customer = self.get_customer(id)?;
        let follow_up = customer
            .follow_ups
            .get_mut(index)
            .ok_or_else(|| not_found("follow-up", &format!("#{} for customer {}", index, id)))?;
        follow_up.completed = true;
        follow_up.completed_at = Some(Utc::now());
        self.save_customer(&customer)?;
        info!(customer_id = id, index, "follow-up completed");
        Ok(customer)
    }

    fn save_customer(&self, customer: &Customer) -> Result<()> {
        if !self.customers.update(customer)? {
            return Err(not_found("customer", &customer.id));
        }
        Ok(())
    }

    // ---- leads ----

    pub fn add_lead(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        source: Option<String>,
    ) -> Result<Lead> {
        require_text("name", name)?;
        let lead = Lead::new(name.to_string(), email.to_string(), phone.to_string(), source);
        self.leads.create(&lead)?;
        info!(lead_id = %lead.id, source = %lead.source, "lead added");
        Ok(lead)
    }

    pub fn get_lead(&self, id: &str) -> Result<Lead> {
        self.leads.find_by_id(id)?.ok_or_else(|| not_found("lead", id))
    }

    pub fn list_leads(&self) -> Result<Vec<Lead>> {
        self.leads.find_all()
    }

    pub fn update_lead_stage(&self, id: &str, stage: PipelineStage) -> Result<Lead> {
        let mut lead = self.get_lead(id)?;
        lead.stage = stage;
        lead.last_updated = Utc::now();
        if !self.leads.update(&lead)? {
            return Err(not_found("lead", id));
        }
        info!(lead_id = id, %stage, "lead stage updated");
        Ok(lead)
    }

    /// Turn a lead into a customer tagged "Converted Lead" and drop the lead
    pub fn convert_lead(&self, id: &str) -> Result<Customer> {
        let lead = self.get_lead(id)?;
        let mut customer = Customer::new(lead.customer_name, lead.email, lead.phone)
            .with_tags(vec![CONVERTED_LEAD_TAG.to_string()]);
        customer.notes = lead.notes;
        self.customers.create(&customer)?;
        self.leads.delete(id)?;
        info!(lead_id = id, customer_id = %customer.id, "lead converted");
        Ok(customer)
    }

    // ---- quotes ----

    /// Price `request` for a customer and store it as a sent quote
    pub fn generate_quote(&self, customer_id: &str, request: JobRequest) -> Result<QuoteRecord> {
        let customer = self.get_customer(customer_id)?;
        let pricing = self.pricing.quote(&request)?;
        let created_at = Utc::now();
        let quote_number = format!(
            "Q{}-{:03}",
            created_at.with_timezone(&Local).format("%y%m%d"),
            uuid::Uuid::new_v4().as_u128() % 1000
        );
        let quote = QuoteRecord::new(
            quote_number,
            &customer,
            request,
            pricing,
            created_at,
            QUOTE_VALID_DAYS,
        );
        self.quotes.create(&quote)?;
        info!(
            quote_id = %quote.id,
            quote_number = %quote.quote_number,
            customer_id,
            final_price = quote.pricing.final_price,
            "quote generated"
        );
        Ok(quote)
    }

    pub fn get_quote(&self, id: &str) -> Result<QuoteRecord> {
        self.quotes.find_by_id(id)?.ok_or_else(|| not_found("quote", id))
    }

    pub fn list_quotes(&self) -> Result<Vec<QuoteRecord>> {
        self.quotes.find_all()
    }

    pub fn accept_quote(&self, quote_id: &str) -> Result<JobRecord> {
        self.accept_quote_on(quote_id, Local::now().date_naive())
    }

    /// Accept a quote as of `today`: mark it accepted, open a job with
    /// estimated start dates and credit the customer
    pub fn accept_quote_on(&self, quote_id: &str, today: NaiveDate) -> Result<JobRecord> {
        let mut quote = self.get_quote(quote_id)?;
        if quote.status == QuoteStatus::Accepted {
            return Err(Error::Duplicate(format!("job for quote {}", quote_id)));
        }

        let starts = self.estimated_starts(&quote, today)?;

        quote.status = QuoteStatus::Accepted;
        self.quotes.update(&quote)?;

        let job = JobRecord::from_quote(&quote, starts);
        self.jobs.create(&job)?;

        if let Some(mut customer) = self.customers.find_by_id(&quote.customer_id)? {
            customer.total_jobs += 1;
            customer.total_revenue += quote.pricing.final_price;
            self.customers.update(&customer)?;
        }

        info!(
            quote_id,
            job_id = %job.id,
            estimated_starts = job.estimated_start_dates.len(),
            "quote accepted"
        );
        Ok(job)
    }

    pub fn quote_close_probability(&self, quote_id: &str) -> Result<CloseProbability> {
        self.quote_close_probability_on(quote_id, Local::now().date_naive())
    }

    /// Score a quote: returning means the customer already has a job, and
    /// a quick start means the scheduler finds a start within a week
    pub fn quote_close_probability_on(
        &self,
        quote_id: &str,
        today: NaiveDate,
    ) -> Result<CloseProbability> {
        let quote = self.get_quote(quote_id)?;
        let returning_customer = self
            .customers
            .find_by_id(&quote.customer_id)?
            .map(|c| c.total_jobs >= 1)
            .unwrap_or(false);

        let starts = self.estimated_starts(&quote, today)?;
        let earliest_start_within_7_days = starts
            .first()
            .map(|s| s.days_from_today <= QUICK_START_DAYS)
            .unwrap_or(false);

        Ok(calculate_close_probability(&CloseProbabilityInput {
            returning_customer,
            job_value: quote.pricing.final_price as f64,
            distance_miles: quote.request.distance_miles(),
            margin_percent: quote.pricing.profit.margin_percent,
            earliest_start_within_7_days,
        }))
    }

    /// Rentals can go out any calendar day. Crew jobs need open weekdays.
    fn estimated_starts(
        &self,
        quote: &QuoteRecord,
        today: NaiveDate,
    ) -> Result<Vec<AvailableStart>> {
        if quote.job_type() == JobType::EquipmentRental {
            return Ok(self.scheduler.next_rental_starts(today));
        }
        let booked = self.booked_dates()?;
        Ok(self
            .scheduler
            .next_available_starts(&booked, quote.pricing.production.days_required, today)?)
    }

    pub fn quote_document(&self, quote_id: &str) -> Result<QuoteDocument> {
        let quote = self.get_quote(quote_id)?;
        let customer = self.customers.find_by_id(&quote.customer_id)?;
        Ok(build_quote_document(&quote, customer.as_ref()))
    }

    pub fn export_quote_workbook(&self, quote_id: &str, path: &Path) -> Result<()> {
        let quote = self.get_quote(quote_id)?;
        let customer = self.customers.find_by_id(&quote.customer_id)?;
        let document = build_quote_document(&quote, customer.as_ref());
        export_quote_workbook(&quote, &document, path)
    }

    // ---- jobs ----

    pub fn get_job(&self, id: &str) -> Result<JobRecord> {
        self.jobs.find_by_id(id)?.ok_or_else(|| not_found("job", id))
    }

    pub fn list_jobs(&self) -> Result<Vec<JobRecord>> {
        self.jobs.find_all()
    }

    pub fn jobs_by_customer(&self, customer_id: &str) -> Result<Vec<JobRecord>> {
        Ok(self
            .jobs
            .find_all()?
            .into_iter()
            .filter(|j| j.customer_id == customer_id)
            .collect())
    }

    /// Case-insensitive match on customer name, job type and job id
    pub fn search_jobs(&self, query: &str) -> Result<Vec<JobRecord>> {
        let q = query.to_lowercase();
        Ok(self
            .jobs
            .find_all()?
            .into_iter()
            .filter(|j| {
                j.customer_name.to_lowercase().contains(&q)
                    || j.job_type.as_str().contains(&q)
                    || j.id.to_lowercase().contains(&q)
            })
            .collect())
    }

    pub fn update_job_stage(&self, id: &str, stage: PipelineStage) -> Result<JobRecord> {
        let mut job = self.get_job(id)?;
        let now = Utc::now();
        job.stage = stage;
        job.last_updated = now;
        if stage == PipelineStage::Completed {
            job.completed_date = Some(now);
        }
        self.jobs.update(&job)?;
        info!(job_id = id, %stage, "job stage updated");
        Ok(job)
    }

    /// Book a job to start on `start`. The crew days must be weekdays not
    /// already taken by another scheduled job. Rentals take any day and
    /// hold no crew days.
    pub fn schedule_job(&self, id: &str, start: NaiveDate) -> Result<JobRecord> {
        let mut job = self.get_job(id)?;
        if !job.is_rental() {
            self.check_crew_days(&job, start)?;
        }

        job.scheduled_date = Some(start);
        job.last_updated = Utc::now();
        self.jobs.update(&job)?;
        info!(job_id = id, %start, "job scheduled");
        Ok(job)
    }

    fn check_crew_days(&self, job: &JobRecord, start: NaiveDate) -> Result<()> {
        let booked: BTreeSet<NaiveDate> = self
            .jobs
            .find_all()?
            .iter()
            .filter(|other| other.id != job.id && other.stage != PipelineStage::Completed)
            .flat_map(|other| other.booked_dates())
            .collect();

        let days_required = job.pricing.production.days_required;
        if !self
            .scheduler
            .is_date_range_available(start, days_required, &booked)
        {
            return Err(QuoteError::invalid(
                "scheduled_date",
                format!(
                    "{} days from {} overlap a weekend or another booking",
                    days_required.ceil(),
                    start
                ),
            )
            .into());
        }
        Ok(())
    }

    /// Crew days taken by scheduled jobs that are not yet completed
    pub fn booked_dates(&self) -> Result<BTreeSet<NaiveDate>> {
        Ok(self
            .jobs
            .find_all()?
            .iter()
            .filter(|job| job.stage != PipelineStage::Completed)
            .flat_map(|job| job.booked_dates())
            .collect())
    }

    // ---- analytics ----

    /// Jobs grouped by stage, every stage listed
    pub fn pipeline_overview(&self) -> Result<Vec<StageJobs>> {
        let jobs = self.jobs.find_all()?;
        Ok(PipelineStage::ALL
            .into_iter()
            .map(|stage| StageJobs {
                stage,
                jobs: jobs
                    .iter()
                    .filter(|j| j.stage == stage)
                    .map(|j| PipelineEntry {
                        id: j.id.clone(),
                        customer: j.customer_name.clone(),
                        job_type: j.job_type,
                        final_price: j.pricing.final_price,
                    })
                    .collect(),
            })
            .collect())
    }

    /// Booked revenue per stage; only Accepted, In Progress and Completed
    /// carry revenue
    pub fn revenue_by_stage(&self) -> Result<Vec<StageRevenue>> {
        let jobs = self.jobs.find_all()?;
        Ok(PipelineStage::ALL
            .into_iter()
            .map(|stage| StageRevenue {
                stage,
                revenue: if stage.is_active() {
                    jobs.iter()
                        .filter(|j| j.stage == stage)
                        .map(|j| j.pricing.final_price)
                        .sum()
                } else {
                    0
                },
            })
            .collect())
    }

    /// Gross profit across Accepted, In Progress and Completed jobs
    pub fn gross_profit(&self) -> Result<i64> {
        Ok(self
            .jobs
            .find_all()?
            .iter()
            .filter(|j| j.stage.is_active())
            .map(|j| j.pricing.profit.gross_profit)
            .sum())
    }

    /// Revenue from the customer's In Progress and Completed jobs
    pub fn customer_lifetime_value(&self, customer_id: &str) -> Result<i64> {
        self.get_customer(customer_id)?;
        Ok(self
            .jobs_by_customer(customer_id)?
            .iter()
            .filter(|j| matches!(j.stage, PipelineStage::InProgress | PipelineStage::Completed))
            .map(|j| j.pricing.final_price)
            .sum())
    }

    pub fn report(&self) -> Result<CrmReport> {
        let customers = self.customers.find_all()?;
        let pending_follow_ups = customers
            .iter()
            .flat_map(|c| c.follow_ups.iter())
            .filter(|f| !f.completed)
            .count();
        let open_quotes = self
            .quotes
            .find_all()?
            .iter()
            .filter(|q| q.status == QuoteStatus::Sent)
            .count();

        Ok(CrmReport {
            customers: customers.len(),
            leads: self.leads.find_all()?.len(),
            open_quotes,
            jobs: self.jobs.find_all()?.len(),
            revenue_by_stage: self.revenue_by_stage()?,
            gross_profit: self.gross_profit()?,
            pending_follow_ups,
        })
    }

    /// Write every customer to a CSV file; returns the number written
    pub fn export_customers(&self, path: &Path) -> Result<usize> {
        let customers = self.customers.find_all()?;
        export_customers_csv(path, &customers)?;
        Ok(customers.len())
    }
}
