//! Discord command implementations organized by category.

/// General utility commands
pub mod general;

pub use general::*;

use crate::{bot::BotData, errors::Error};

/// Every command the bot serves, in registration order.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        general::ping(),
        // Add more commands here
    ]
}
