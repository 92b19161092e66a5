//! ngpm library exports

pub mod config;
pub mod error;
pub mod package;
