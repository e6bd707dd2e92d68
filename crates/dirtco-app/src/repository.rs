//! Repository adapters for persistence layer

use std::path::Path;

use dirtco_types::Result;

use crate::app::CrmService;
use crate::config::Config;

/// Open the CRM service over the configured store, priced with the
/// configured rates
pub fn open_crm_service(config: &Config, rates_override: Option<&Path>) -> Result<CrmService> {
    let store_dir = config.store_dir()?;
    let pricing = config.pricing_calculator(rates_override)?;
    Ok(CrmService::open(&store_dir, pricing)?.with_author(config.quote_author.clone()))
}
