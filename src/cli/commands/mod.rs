//! CLI command implementations

pub mod capa;
pub mod forward;
pub mod list;
pub mod log;
pub mod new;
pub mod outcome;
pub mod show;
pub mod transition;
pub mod triage;
pub mod validate;
