//! Data models
//!
//! Records owned by the storage layer around the energy engine.

mod energy_record;
mod patient;
mod visitation;

pub use energy_record::EnergyRecord;
pub use patient::{Patient, PatientCreate};
pub use visitation::{Visitation, VisitationCreate};
