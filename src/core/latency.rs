//! Latency measurement for the `/ping` command.
//!
//! This module is framework-agnostic: it works on plain timestamps and
//! durations so the bot layer only has to fetch the inputs and render the
//! resulting [`PingReport`].

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Embed colour of the ping reply.
pub const EMBED_COLOR: u32 = 0x008D_CE3E;

/// Local time at which the bot received an interaction.
///
/// Stored as poise invocation data before the command runs, so the interaction
/// age is measured against this host's clock only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceivedAt(pub DateTime<Utc>);

impl ReceivedAt {
    /// The current time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

/// API latency as reported by the bot: the millisecond component of
/// `now - received_at`.
///
/// Whole seconds are discarded, so a delta of 1 037 ms reports `37`.
#[must_use]
pub fn api_latency_ms(received_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - received_at).num_milliseconds() % 1000
}

/// Heartbeat latency in whole milliseconds.
#[must_use]
pub const fn ws_latency_ms(heartbeat: Duration) -> u128 {
    heartbeat.as_millis()
}

/// Name shown for a user: the global display name when set, the username
/// otherwise.
#[must_use]
pub fn display_name<'a>(global_name: Option<&'a str>, username: &'a str) -> &'a str {
    global_name.unwrap_or(username)
}

/// Everything the ping reply shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingReport {
    /// Truncated API latency, see [`api_latency_ms`]
    pub api_latency_ms: i64,
    /// Last measured gateway heartbeat latency
    pub ws_latency_ms: u128,
    /// Display name of the invoking user
    pub invoker: String,
}

impl PingReport {
    /// Builds a report from raw measurements.
    #[must_use]
    pub fn new(
        received_at: DateTime<Utc>,
        now: DateTime<Utc>,
        heartbeat: Duration,
        invoker: impl Into<String>,
    ) -> Self {
        Self {
            api_latency_ms: api_latency_ms(received_at, now),
            ws_latency_ms: ws_latency_ms(heartbeat),
            invoker: invoker.into(),
        }
    }

    /// Embed title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        "結果 :ping_pong:"
    }

    /// Embed description with both latency fields.
    #[must_use]
    pub fn description(&self) -> String {
        format!(
            "**API Endpoint Ping**: {}ms\n**WebSocket Ping**: {}ms",
            self.api_latency_ms, self.ws_latency_ms
        )
    }

    /// Embed footer naming the invoker.
    #[must_use]
    pub fn footer(&self) -> String {
        format!("実行者: {}", self.invoker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn test_api_latency_under_one_second() {
        let received = at(1_700_000_000_000);
        let now = received + TimeDelta::milliseconds(37);
        assert_eq!(api_latency_ms(received, now), 37);
    }

    #[test]
    fn test_api_latency_drops_whole_seconds() {
        let received = at(1_700_000_000_000);
        assert_eq!(
            api_latency_ms(received, received + TimeDelta::milliseconds(1_037)),
            37
        );
        assert_eq!(
            api_latency_ms(received, received + TimeDelta::milliseconds(2_000)),
            0
        );
    }

    #[test]
    fn test_report_measured_from_receipt_drops_whole_seconds() {
        let received = ReceivedAt(at(1_700_000_000_000));
        let report = PingReport::new(
            received.0,
            received.0 + TimeDelta::milliseconds(1_037),
            Duration::from_millis(10),
            "x",
        );
        assert_eq!(report.api_latency_ms, 37);
        assert_eq!(
            report.description(),
            "**API Endpoint Ping**: 37ms\n**WebSocket Ping**: 10ms"
        );
    }

    #[test]
    fn test_receipt_time_is_never_ahead_of_now() {
        let received = ReceivedAt::now();
        let latency = api_latency_ms(received.0, Utc::now());
        assert!((0..1000).contains(&latency));
    }

    #[test]
    fn test_ws_latency() {
        assert_eq!(ws_latency_ms(Duration::ZERO), 0);
        assert_eq!(ws_latency_ms(Duration::from_micros(42_900)), 42);
    }

    #[test]
    fn test_display_name_prefers_global_name() {
        assert_eq!(display_name(Some("Alice"), "alice_01"), "Alice");
        assert_eq!(display_name(None, "alice_01"), "alice_01");
    }

    #[test]
    fn test_report_text() {
        let received = at(1_700_000_000_000);
        let report = PingReport::new(
            received,
            received + TimeDelta::milliseconds(37),
            Duration::from_millis(81),
            "Alice",
        );

        assert_eq!(report.title(), "結果 :ping_pong:");
        assert_eq!(
            report.description(),
            "**API Endpoint Ping**: 37ms\n**WebSocket Ping**: 81ms"
        );
        assert_eq!(report.footer(), "実行者: Alice");
    }

    #[test]
    fn test_report_before_first_heartbeat() {
        let received = at(1_700_000_000_000);
        let report = PingReport::new(received, received, Duration::ZERO, "bob");
        assert_eq!(
            report.description(),
            "**API Endpoint Ping**: 0ms\n**WebSocket Ping**: 0ms"
        );
        assert_eq!(report.footer(), "実行者: bob");
    }
}
