use crate::accounts::AccountId;
use chrono::NaiveDate;

/// Fatal conditions encountered while analysing an event stream
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("event {id} dated {date} falls outside all configured periods")]
    DateOutsidePeriods { id: usize, date: NaiveDate },

    #[error("unknown account: {0}")]
    UnknownAccount(AccountId),

    #[error("account {0} has no parent for income attribution")]
    MissingParentAccount(AccountId),

    #[error("chargeable gain years must be positive, got {years}: event {id}")]
    InvalidYears { id: usize, years: i32 },
}
