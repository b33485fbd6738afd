use crate::error::{RentalFinanceError, Result};
use crate::forecast::DEFAULT_FORECAST_WINDOW_DAYS;
use crate::period::PeriodMode;
use crate::schema::PropertyFilter;
use crate::seed::default_supplier_start;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_forecast_window_days() -> u32 {
    DEFAULT_FORECAST_WINDOW_DAYS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    #[serde(default)]
    #[schemars(description = "Property id to restrict dashboards to, or \"all\"")]
    pub property_filter: PropertyFilter,

    #[serde(default)]
    #[schemars(description = "Period the headline totals and occupancy cover")]
    pub period_mode: PeriodMode,

    #[serde(default = "default_forecast_window_days")]
    #[schemars(description = "Days scanned for upcoming payments, today included (1-31)")]
    pub forecast_window_days: u32,

    #[serde(default = "default_supplier_start")]
    #[schemars(description = "First month of generated supplier bills (YYYY-MM-DD)")]
    pub seed_supplier_start: NaiveDate,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            property_filter: PropertyFilter::All,
            period_mode: PeriodMode::Current,
            forecast_window_days: DEFAULT_FORECAST_WINDOW_DAYS,
            seed_supplier_start: default_supplier_start(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=31).contains(&self.forecast_window_days) {
            return Err(RentalFinanceError::InvalidForecastWindow(
                self.forecast_window_days,
            ));
        }
        if let PropertyFilter::Property(id) = &self.property_filter {
            if id.trim().is_empty() {
                return Err(RentalFinanceError::ValidationError {
                    entity: "config".to_string(),
                    details: "property filter must be \"all\" or a property id".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = schemars::schema_for!(DashboardConfig);
        serde_json::to_string_pretty(&schema)
    }
}
