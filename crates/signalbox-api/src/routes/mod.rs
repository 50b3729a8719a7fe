//! Route modules.

pub mod messages;
pub mod webhooks;
