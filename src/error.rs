use chrono::NaiveDate;
use thiserror::Error;

pub type LoanResult<T> = Result<T, LoanError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoanError {
    #[error("invalid input: {field} ({reason})")]
    InvalidInput { field: String, reason: String },

    #[error("unknown rate mode: {0}")]
    InvalidRateMode(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("no due date exists one month after {0}")]
    DateOutOfRange(NaiveDate),
}

/// Failures of the terminal front end.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Loan(#[from] LoanError),

    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("logger setup failed: {0}")]
    Logger(#[from] log::SetLoggerError),
}

impl LoanError {
    pub(crate) fn invalid(field: &str, reason: &str) -> Self {
        LoanError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
