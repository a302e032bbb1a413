//! Use cases (application services)

pub mod orchestrator;
pub mod registry;
pub mod services;
