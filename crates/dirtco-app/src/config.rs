//! Configuration management for dirtco
//!
//! Config stored at: ~/.config/dirtco/config.json

use std::path::{Path, PathBuf};

use dirtco_domain::model::rates::check_market_adjustment;
use dirtco_domain::model::RateTable;
use dirtco_domain::PricingCalculator;
use dirtco_infra::load_rate_table;
use dirtco_types::{ConfigError, OutputFormat, Result};
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Market adjustment override; the rate table's value applies when unset
    #[serde(default)]
    pub market_multiplier: Option<f64>,

    /// Record store directory override
    #[serde(default)]
    pub store_dir: Option<PathBuf>,

    /// TOML rate table replacing the built-in rates
    #[serde(default)]
    pub rates_file: Option<PathBuf>,

    /// Default output format (json, table)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Name recorded on customer notes
    #[serde(default = "default_quote_author")]
    pub quote_author: String,
}

fn default_quote_author() -> String {
    "Evan Tremper".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            market_multiplier: None,
            store_dir: None,
            rates_file: None,
            output_format: OutputFormat::Table,
            quote_author: default_quote_author(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("dirtco");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the record store directory
    pub fn store_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.store_dir {
            return Ok(dir.clone());
        }

        let store_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join("dirtco");
        Ok(store_dir)
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Set the market multiplier, rejecting values outside (0, 1]
    pub fn set_market_multiplier(&mut self, value: f64) -> Result<()> {
        check_market_adjustment(value)?;
        self.market_multiplier = Some(value);
        Ok(())
    }

    /// Rate table from `rates_override`, else the configured rates file,
    /// else the built-in table
    pub fn rate_table(&self, rates_override: Option<&Path>) -> Result<RateTable> {
        match rates_override.or(self.rates_file.as_deref()) {
            Some(path) => load_rate_table(path),
            None => Ok(RateTable::default()),
        }
    }

    /// Pricing calculator with the configured rates and market multiplier
    pub fn pricing_calculator(&self, rates_override: Option<&Path>) -> Result<PricingCalculator> {
        let mut calculator = PricingCalculator::new(self.rate_table(rates_override)?)?;
        if let Some(multiplier) = self.market_multiplier {
            calculator.update_market_multiplier(multiplier)?;
        }
        Ok(calculator)
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "dirtco Configuration")?;
        writeln!(f, "====================")?;
        writeln!(f)?;
        match self.market_multiplier {
            Some(m) => writeln!(f, "Market multiplier: {}", m)?,
            None => writeln!(f, "Market multiplier: (rate table)")?,
        }
        writeln!(
            f,
            "Store dir:         {}",
            self.store_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(
            f,
            "Rates file:        {}",
            self.rates_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(built-in)".to_string())
        )?;
        writeln!(f, "Output format:     {}", self.output_format)?;
        writeln!(f, "Quote author:      {}", self.quote_author)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:       {}", path.display())?;
        }

        Ok(())
    }
}
