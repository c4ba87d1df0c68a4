//! Progress reporting seam.
//!
//! Import progress is narrated through [`ProgressSink`] rather than a
//! logger: callers choose where the narration goes, and emission is
//! infallible so reporting can never stall or fail the pipeline it is
//! narrating.

use std::fmt;

/// Weight of a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    /// Routine progress.
    Info,
    /// A stage completed as intended.
    Success,
    /// A problem the run either recorded or stopped for.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// One progress notice emitted during an import run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    /// How the notice should be weighted.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl Event {
    /// Routine progress notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    /// Stage-completed notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    /// Problem notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Receives progress events in emission order.
///
/// Implementations must not fail: an import's outcome is decided by
/// validation and the store, never by its narration.
///
/// # Examples
///
/// ```
/// use rollbook_core::report::{Event, ProgressSink};
///
/// struct Counter(usize);
///
/// impl ProgressSink for Counter {
///     fn emit(&mut self, _event: Event) {
///         self.0 += 1;
///     }
/// }
///
/// let mut sink = Counter(0);
/// sink.emit(Event::info("starting"));
/// assert_eq!(sink.0, 1);
/// ```
pub trait ProgressSink {
    /// Record one event.
    fn emit(&mut self, event: Event);
}

/// Collects events in memory, preserving emission order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Events seen so far, oldest first.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl ProgressSink for EventLog {
    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&mut self, _event: Event) {}
}
