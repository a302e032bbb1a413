//! Application-level configuration.
//!
//! - [`ConversationSettings`] - turn loop control (interval, context window,
//!   streaming, generation timeout)
//! - [`BroadcastSettings`] - subscriber buffering and delivery bound

pub mod broadcast_settings;
pub mod conversation_settings;

pub use broadcast_settings::BroadcastSettings;
pub use conversation_settings::ConversationSettings;
