//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `SteerError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::EntityId;

/// The base error type shared by the `st-*` crates.
#[derive(Debug, Error)]
pub enum SteerError {
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    #[error("entity {0} is not an agent")]
    NotAnAgent(EntityId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `st-*` crates.
pub type SteerResult<T> = Result<T, SteerError>;
