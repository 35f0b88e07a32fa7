//! Dietcare library
//!
//! Energy requirement engine for diabetic inpatients, with the storage and
//! MCP layers around it.

pub mod build_info;
pub mod db;
pub mod energy;
pub mod mcp;
pub mod models;
pub mod tools;
