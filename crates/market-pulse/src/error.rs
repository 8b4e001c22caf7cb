use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Dataset error: {0}")]
    Data(#[from] market_pulse_data::DataError),
    #[error("Lead submission error: {0}")]
    Lead(#[from] crate::lead::LeadError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PulseError>;
