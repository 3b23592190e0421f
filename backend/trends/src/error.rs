use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrendError {
    #[error("Unparseable sale date: {0:?}")]
    UnparseableDate(String),

    #[error("Unknown filter: {0:?}")]
    UnknownFilter(String),

    #[error("Unknown week start: {0:?}")]
    UnknownWeekStart(String),
}
