//! Application use cases

pub mod crm_service;

pub use crm_service::{
    CrmReport, CrmService, CustomerUpdate, NewCustomer, PipelineEntry, StageJobs, StageRevenue,
    QUOTE_VALID_DAYS,
};
