//! Render errors.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Render cancelled")]
    Cancelled,
}

pub type RenderResult<T> = Result<T, RenderError>;
