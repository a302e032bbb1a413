//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod conversation_archive;
pub mod generation_gateway;
pub mod memory_store;
pub mod transcript_logger;
