//! Domain model types

pub mod crm;
pub mod job;
pub mod quote;
pub mod rates;
pub mod schedule;
pub mod scoring;

pub use crm::{
    Customer, CustomerNote, FollowUp, JobRecord, Lead, PipelineStage, QuoteRecord, QuoteStatus,
};
pub use job::{
    Access, BrushClearingJob, CustomJob, Density, Difficulty, EquipmentRentalJob, EquipmentType,
    JobRequest, JobType, SitePrepJob, SoilType, TrenchDepth, TrenchingJob,
};
pub use quote::{
    CustomBreakdown, InternalCosts, MarginStatus, Production, ProductionBreakdown,
    ProfitAnalysis, QuoteBreakdown, QuoteResult, RentalBreakdown, UpsellSuggestion,
};
pub use rates::{EquipmentSpec, RateTable};
pub use schedule::AvailableStart;
pub use scoring::{CloseProbability, CloseProbabilityInput, ProbabilityLabel, ScoreFactor};
