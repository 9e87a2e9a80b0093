//! Discord interaction handlers
//!
//! This module provides the hooks poise calls around command execution and
//! the registration of commands with Discord.

/// Failure classification, failure replies and execution logging
pub mod interaction;
/// Guild-scoped slash command registration
pub mod registration;
