//! CRM records: customers, leads, quotes and jobs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use dirtco_types::QuoteError;
use serde::{Deserialize, Serialize};

use super::job::{JobRequest, JobType};
use super::quote::QuoteResult;
use super::schedule::AvailableStart;
use crate::repository::Record;

fn new_id(prefix: char) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Position of a lead or job in the sales pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PipelineStage {
    Lead,
    Contacted,
    #[serde(rename = "Quote Sent")]
    QuoteSent,
    Negotiation,
    Accepted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    #[serde(rename = "Follow-Up")]
    FollowUp,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 8] = [
        PipelineStage::Lead,
        PipelineStage::Contacted,
        PipelineStage::QuoteSent,
        PipelineStage::Negotiation,
        PipelineStage::Accepted,
        PipelineStage::InProgress,
        PipelineStage::Completed,
        PipelineStage::FollowUp,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Lead => "Lead",
            PipelineStage::Contacted => "Contacted",
            PipelineStage::QuoteSent => "Quote Sent",
            PipelineStage::Negotiation => "Negotiation",
            PipelineStage::Accepted => "Accepted",
            PipelineStage::InProgress => "In Progress",
            PipelineStage::Completed => "Completed",
            PipelineStage::FollowUp => "Follow-Up",
        }
    }

    /// Stages whose jobs count as booked revenue
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            PipelineStage::Accepted | PipelineStage::InProgress | PipelineStage::Completed
        )
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PipelineStage {
    type Err = QuoteError;

    /// Accepts "Quote Sent", "quote-sent" or "quote_sent"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalize = |v: &str| {
            v.trim()
                .to_lowercase()
                .replace([' ', '_'], "-")
        };
        let key = normalize(s);
        PipelineStage::ALL
            .into_iter()
            .find(|stage| normalize(stage.label()) == key)
            .ok_or_else(|| QuoteError::invalid("stage", format!("unknown pipeline stage '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerNote {
    pub note: String,
    pub date: DateTime<Utc>,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUp {
    pub message: String,
    pub date: NaiveDate,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub notes: Vec<CustomerNote>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_contacted: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_revenue: i64,
    #[serde(default)]
    pub total_jobs: u32,
    #[serde(default)]
    pub follow_ups: Vec<FollowUp>,
}

impl Customer {
    pub fn new(name: String, email: String, phone: String) -> Self {
        Self {
            id: new_id('C'),
            name,
            email,
            phone,
            address: String::new(),
            company: String::new(),
            notes: Vec::new(),
            tags: Vec::new(),
            created_at: Utc::now(),
            last_updated: None,
            last_contacted: None,
            total_revenue: 0,
            total_jobs: 0,
            follow_ups: Vec::new(),
        }
    }

    pub fn with_company(mut self, company: String) -> Self {
        self.company = company;
        self
    }

    pub fn with_address(mut self, address: String) -> Self {
        self.address = address;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Case-insensitive match on name, email and company; substring on phone
    pub fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.name.to_lowercase().contains(&q)
            || self.email.to_lowercase().contains(&q)
            || self.phone.contains(query)
            || (!self.company.is_empty() && self.company.to_lowercase().contains(&q))
    }
}

impl Record for Customer {
    const COLLECTION: &'static str = "customers";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub source: String,
    pub stage: PipelineStage,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub notes: Vec<CustomerNote>,
}

impl Lead {
    pub fn new(
        customer_name: String,
        email: String,
        phone: String,
        source: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_id('L'),
            customer_name,
            email,
            phone,
            source: source.unwrap_or_else(|| "Website".to_string()),
            stage: PipelineStage::Lead,
            created_at: now,
            last_updated: now,
            notes: Vec::new(),
        }
    }
}

impl Record for Lead {
    const COLLECTION: &'static str = "leads";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteStatus {
    #[serde(rename = "Quote Sent")]
    Sent,
    Accepted,
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteStatus::Sent => write!(f, "Quote Sent"),
            QuoteStatus::Accepted => write!(f, "Accepted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub id: String,
    /// Customer-facing number, e.g. "Q261019-042"
    pub quote_number: String,
    pub customer_id: String,
    pub customer_name: String,
    pub request: JobRequest,
    pub pricing: QuoteResult,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl QuoteRecord {
    pub fn new(
        quote_number: String,
        customer: &Customer,
        request: JobRequest,
        pricing: QuoteResult,
        created_at: DateTime<Utc>,
        valid_days: i64,
    ) -> Self {
        Self {
            id: new_id('Q'),
            quote_number,
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            request,
            pricing,
            status: QuoteStatus::Sent,
            created_at,
            expires_at: created_at + chrono::Duration::days(valid_days),
        }
    }

    pub fn job_type(&self) -> JobType {
        self.request.job_type()
    }
}

impl Record for QuoteRecord {
    const COLLECTION: &'static str = "quotes";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub quote_id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub job_type: JobType,
    pub request: JobRequest,
    pub pricing: QuoteResult,
    pub stage: PipelineStage,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_start_dates: Vec<AvailableStart>,
}

impl JobRecord {
    pub fn from_quote(quote: &QuoteRecord, estimated_start_dates: Vec<AvailableStart>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id('J'),
            quote_id: quote.id.clone(),
            customer_id: quote.customer_id.clone(),
            customer_name: quote.customer_name.clone(),
            job_type: quote.job_type(),
            request: quote.request.clone(),
            pricing: quote.pricing.clone(),
            stage: PipelineStage::Accepted,
            created_at: now,
            last_updated: now,
            scheduled_date: None,
            completed_date: None,
            estimated_start_dates,
        }
    }

    pub fn is_rental(&self) -> bool {
        self.job_type == JobType::EquipmentRental
    }

    /// Calendar days the crew occupies once scheduled. Rentals leave the
    /// yard without a crew and occupy none.
    pub fn booked_dates(&self) -> Vec<NaiveDate> {
        let Some(start) = self.scheduled_date.filter(|_| !self.is_rental()) else {
            return Vec::new();
        };
        let span = self.pricing.production.days_required.ceil().max(1.0) as u64;
        (0..span)
            .filter_map(|offset| start.checked_add_days(chrono::Days::new(offset)))
            .collect()
    }
}

impl Record for JobRecord {
    const COLLECTION: &'static str = "jobs";

    fn id(&self) -> &str {
        &self.id
    }
}
