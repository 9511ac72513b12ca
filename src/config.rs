//! Configuration for a reporting pass.

use crate::alerts::Thresholds;
use crate::kpi::find_kpi;
use crate::renewals::DEFAULT_HORIZON_DAYS;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use log::warn;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default config file path
pub const CONFIG_FILE: &str = "haci.toml";

// =============================================================================
// File-based Configuration (haci.toml)
// =============================================================================

/// Configuration loaded from haci.toml. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Directory holding one `<Sheet>.csv` per workbook sheet
    pub data_dir: PathBuf,
    /// Where report.json and the CSV series are written
    pub output_dir: PathBuf,
    /// Currency label used on money cards
    pub currency: String,
    pub renewals: RenewalConfig,
    /// Alert bounds keyed by KPI key (e.g. `gross_margin`)
    pub thresholds: HashMap<String, Thresholds>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenewalConfig {
    pub horizon_days: i64,
}

impl Default for RenewalConfig {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            output_dir: PathBuf::from("./output"),
            currency: "PKR".to_string(),
            renewals: RenewalConfig::default(),
            thresholds: HashMap::new(),
        }
    }
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load `path` if it exists. A missing file is only an error when the
    /// user asked for it explicitly.
    pub fn load_or_default(path: &Path, explicit: bool) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }
        if explicit {
            bail!("Config file '{}' not found.", path.display());
        }
        Ok(Self::default())
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: FileConfig = toml::from_str(content).with_context(|| {
            "Failed to parse config. Check for:\n\
             - Invalid TOML syntax (missing quotes, brackets, etc.)\n\
             - Unknown keys (only data_dir, output_dir, currency, [renewals], [thresholds.<kpi>])\n\
             - Incorrect data types (numbers for low/high/horizon_days)"
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.renewals.horizon_days < 0 {
            bail!(
                "renewals.horizon_days must not be negative (got {})",
                self.renewals.horizon_days
            );
        }
        for (key, t) in &self.thresholds {
            if find_kpi(key).is_none() {
                warn!("thresholds for unknown KPI '{}' will be ignored", key);
            }
            if let (Some(low), Some(high)) = (t.low, t.high) {
                if low > high {
                    bail!("thresholds.{}: low ({}) is greater than high ({})", key, low, high);
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Runtime Settings
// =============================================================================

/// Everything a reporting pass needs besides the data itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub currency: String,
    /// Reference date for the renewal monitor
    pub today: NaiveDate,
    pub horizon_days: i64,
    pub thresholds: HashMap<String, Thresholds>,
}

impl Settings {
    pub fn from_file(file: &FileConfig, today: NaiveDate) -> Self {
        Self {
            currency: file.currency.clone(),
            today,
            horizon_days: file.renewals.horizon_days,
            thresholds: file.thresholds.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = FileConfig::parse("").expect("parse");
        assert_eq!(config, FileConfig::default());
        assert_eq!(config.renewals.horizon_days, 90);
        assert_eq!(config.currency, "PKR");
    }

    #[test]
    fn parses_thresholds_per_kpi() {
        let config = FileConfig::parse(
            r#"
            currency = "USD"

            [renewals]
            horizon_days = 30

            [thresholds.gross_margin]
            low = 30
            high = 70

            [thresholds.net_profit]
            low = 0.0
            "#,
        )
        .expect("parse");

        assert_eq!(config.currency, "USD");
        assert_eq!(config.renewals.horizon_days, 30);
        assert_eq!(
            config.thresholds["gross_margin"],
            Thresholds::new(Some(30.0), Some(70.0))
        );
        assert_eq!(config.thresholds["net_profit"], Thresholds::new(Some(0.0), None));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let err =
            FileConfig::parse("[thresholds.gross_margin]\nlow = 80\nhigh = 20\n").unwrap_err();
        assert!(err.to_string().contains("gross_margin"));
    }

    #[test]
    fn rejects_negative_horizon() {
        assert!(FileConfig::parse("[renewals]\nhorizon_days = -1\n").is_err());
    }

    #[test]
    fn missing_default_file_is_not_an_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(FileConfig::load_or_default(&path, false).unwrap(), FileConfig::default());
        assert!(FileConfig::load_or_default(&path, true).is_err());
    }

    #[test]
    fn settings_take_file_values() {
        let file = FileConfig::parse("[renewals]\nhorizon_days = 45\n").expect("parse");
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let settings = Settings::from_file(&file, today);
        assert_eq!(settings.horizon_days, 45);
        assert_eq!(settings.today, today);
    }
}
