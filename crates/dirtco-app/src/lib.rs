//! Application service layer - config, CRM workflow, quote documents

pub mod app;
pub mod config;
pub mod repository;

pub use app::crm_service::CrmService;
pub use config::Config;
