use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid disclaimer type: {0}")]
    InvalidDisclaimerType(String),

    #[error("invalid recommendation action: {0}")]
    InvalidAction(String),
}
