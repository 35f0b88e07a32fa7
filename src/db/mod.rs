//! Database module
//!
//! SQLite storage for patients, visitations and saved energy calculations.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};

use std::path::PathBuf;

/// Database path from `DIETCARE_DATABASE_PATH`, else `<project>/data/dietcare.db`
pub fn database_path() -> PathBuf {
    std::env::var("DIETCARE_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(root) = path.parent().and_then(|p| p.parent()) {
                    path = root.to_path_buf();
                }
            }

            path.push("data");
            path.push("dietcare.db");
            path
        })
}
