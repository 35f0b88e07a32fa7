//! Tool implementations
//!
//! Operations behind the MCP tools. Each takes the shared [`Database`]
//! handle and returns a serializable response.
//!
//! [`Database`]: crate::db::Database

pub mod energy;
pub mod patients;
pub mod statistics;
pub mod status;

use thiserror::Error;

use crate::db::DbError;
use crate::energy::EnergyError;

/// Errors surfaced by tool functions
#[derive(Debug, Error)]
pub enum ToolError {
    /// Caller supplied unusable input; nothing was computed or stored
    #[error(transparent)]
    Invalid(#[from] EnergyError),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] DbError),
}

pub type ToolResult<T> = Result<T, ToolError>;
