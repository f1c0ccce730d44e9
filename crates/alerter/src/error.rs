use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlerterError {
    #[error("LINE API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LINE API returned {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Alerter is not configured. Missing channel token or user id.")]
    NotConfigured,
}
