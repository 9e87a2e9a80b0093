//! Core logic - framework-agnostic latency, failure and lifecycle types
//!
//! Nothing in here talks to Discord. The bot layer feeds these functions
//! with values taken from poise/serenity and renders their results.

/// Command failure taxonomy and user-facing failure text
pub mod failure;
/// Host lifecycle state machine
pub mod lifecycle;
/// Ping latency computation and reply text
pub mod latency;
