use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RatingError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid date '{value}' on row {row}")]
    InvalidDate { row: usize, value: String },

    // Nothing to rate at all. This is the only failure of the whole pass.
    #[error("Match table has no teams")]
    EmptyVocabulary,

    #[error("Optimization failed on {date}: {message}")]
    NonConvergence { date: NaiveDate, message: String },

    #[error("No matches in the window for {0}")]
    EmptyWindow(NaiveDate),
}

pub type Result<T> = std::result::Result<T, RatingError>;
