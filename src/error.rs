use thiserror::Error;

#[derive(Error, Debug)]
pub enum TradeSeriesError {
    #[error("Missing required columns: {}", missing.join(", "))]
    StructuralInput { missing: Vec<String> },

    #[error("Input table needs at least 2 columns (period label, amount), found {found}")]
    TooFewColumns { found: usize },

    #[error("Invalid record {record}: {details}")]
    Validation { record: String, details: String },

    #[error("Invalid date key '{0}': expected YYYY-MM")]
    InvalidMonthKey(String),

    #[error("Invalid quarter key '{0}': expected YYYYQn")]
    InvalidQuarterKey(String),

    #[error("Invalid year range {start}..={end}: start year must not exceed end year")]
    InvalidYearRange { start: i32, end: i32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TradeSeriesError>;
