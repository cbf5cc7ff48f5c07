use crate::error::{Result, TradeSeriesError};
use crate::schema::YearRange;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Suffixes that mark a period label as a year row or a month row, e.g. `2024년` / `1월`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PeriodMarkers {
    #[schemars(description = "Text following the 4-digit year in a year row (default: 년)")]
    pub year: String,

    #[schemars(description = "Text following the 1-2 digit month in a month row (default: 월)")]
    pub month: String,
}

impl Default for PeriodMarkers {
    fn default() -> Self {
        Self {
            year: "년".to_string(),
            month: "월".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalyticsConfig {
    #[serde(default)]
    #[schemars(description = "Markers used to recognise year and month rows in the period column")]
    pub markers: PeriodMarkers,

    #[serde(default)]
    #[schemars(
        description = "Inclusive year range applied to report and dashboard output. Growth figures are always computed on the full history before filtering."
    )]
    pub year_range: Option<YearRange>,
}

impl AnalyticsConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_year_range(mut self, start: i32, end: i32) -> Result<Self> {
        self.year_range = Some(YearRange::new(start, end)?);
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        validate_marker("year", &self.markers.year)?;
        validate_marker("month", &self.markers.month)?;
        if self.markers.year == self.markers.month {
            return Err(TradeSeriesError::InvalidConfig(
                "year and month markers must differ".to_string(),
            ));
        }
        if let Some(range) = &self.year_range {
            range.validate()?;
        }
        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalyticsConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

fn validate_marker(name: &str, marker: &str) -> Result<()> {
    if marker.trim().is_empty() {
        return Err(TradeSeriesError::InvalidConfig(format!(
            "{} marker must not be empty",
            name
        )));
    }
    if marker.chars().any(|c| c.is_ascii_digit()) {
        return Err(TradeSeriesError::InvalidConfig(format!(
            "{} marker '{}' must not contain digits",
            name, marker
        )));
    }
    Ok(())
}
