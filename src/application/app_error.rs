use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Mailbox lookup failed: expected one email but found {found}")]
    Lookup { found: usize },

    #[error("Unable to find member csv attachment")]
    AttachmentNotFound,

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("{} contact upload(s) failed: {}", .0.len(), .0.join("; "))]
    AggregateUpload(Vec<String>),

    /// An expected marker was missing from an unofficial web page.
    #[error("Scrape error: {0}")]
    Scrape(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("{status} {reason}")]
    UpstreamStatus { status: u16, reason: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;
