//! Progress reporting hook.
//!
//! The classifier narrates what it finds through an [`EventSink`]. Delivery is
//! fire-and-forget: a sink cannot fail a classification and the classifier
//! never waits on it. Where the lines end up (a log, a websocket broadcast, a
//! terminal) is the host's business.

/// Which stream a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Step-by-step reasoning: spans before cleanup, per-token tags.
    Trace,
    /// User-facing results: the detected-cases line and one line per match.
    Summary,
}

pub trait EventSink: Send + Sync {
    fn emit(&self, channel: Channel, line: &str);
}

impl<F> EventSink for F
where
    F: Fn(Channel, &str) + Send + Sync,
{
    fn emit(&self, channel: Channel, line: &str) {
        self(channel, line)
    }
}

/// Forwards every line to `tracing`: summary lines at `info`, trace lines at
/// `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, channel: Channel, line: &str) {
        match channel {
            Channel::Summary => tracing::info!(target: "segugio::report", "{line}"),
            Channel::Trace => tracing::debug!(target: "segugio::report", "{line}"),
        }
    }
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _channel: Channel, _line: &str) {}
}
