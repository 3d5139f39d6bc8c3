//! Startup corruption detection and quarantine.

pub mod integrity_check;
pub mod quarantine;

pub use integrity_check::check_integrity;
pub use quarantine::quarantine_if_corrupt;
