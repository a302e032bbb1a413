//! Conversation aggregate: lifecycle status, message log and events.

pub mod entities;
pub mod event;
pub mod status;
