use thiserror::Error;

pub type Result<T> = std::result::Result<T, TimesheetError>;

#[derive(Error, Debug)]
pub enum TimesheetError {
    #[error("Not a git repository: {0}")]
    NotARepository(String),
    #[error("git failed: {0}")]
    Git(String),
    /// Fatal: the aggregator cannot compute a calendar span without valid dates.
    #[error("Invalid commit date '{0}': {1}")]
    InvalidDate(String, String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
