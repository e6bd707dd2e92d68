//! Rate table loader from TOML
//!
//! Any key left out of the file keeps its default, so a rates file only
//! needs the values that differ from the standard table.

use std::fs;
use std::path::Path;

use dirtco_domain::model::RateTable;
use dirtco_types::{ConfigError, Error, Result};
use tracing::info;

/// Load and validate a rate table from a TOML file
pub fn load_rate_table(path: &Path) -> Result<RateTable> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(ConfigError::ParseError(format!(
            "Failed to read rates file {}: {}",
            path.display(),
            e
        )))
    })?;

    let rates = parse_rate_table(&content)?;
    info!(path = %path.display(), market_adjustment = rates.market_adjustment, "loaded rate table");
    Ok(rates)
}

/// Parse and validate a rate table from a TOML string
pub fn parse_rate_table(toml_content: &str) -> Result<RateTable> {
    let rates: RateTable = toml::from_str(toml_content).map_err(|e| {
        Error::Config(ConfigError::ParseError(format!(
            "Failed to parse rates TOML: {}",
            e
        )))
    })?;
    rates.validate()?;
    Ok(rates)
}

/// Render a rate table as TOML, e.g. to seed a rates file
pub fn rate_table_to_toml(rates: &RateTable) -> Result<String> {
    toml::to_string_pretty(rates)
        .map_err(|e| Error::Config(ConfigError::SaveError(e.to_string())))
}
