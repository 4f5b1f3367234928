//! occ: healthcare occurrence lifecycle
//!
//! Records adverse events and incidents, classifies their severity, drives
//! them through the investigation workflow and tracks the outcome together
//! with its corrective and preventive actions (CAPAs).

pub mod cli;
pub mod core;
pub mod entities;
pub mod store;
pub mod yaml;
