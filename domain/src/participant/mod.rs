//! Participants and the read-only catalog that holds them.

pub mod entities;
pub mod registry;
