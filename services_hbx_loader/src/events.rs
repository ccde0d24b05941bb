//! Structured session events
//!
//! Logging is explicit and structured, not text-based. Every command handler
//! records what it did as a typed event; tests and diagnostics read the
//! log back or export it as JSON.

use loader_types::SessionId;
use serde::{Deserialize, Serialize};

/// One thing that happened during a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoaderEvent {
    /// A target path was accepted into the slot
    TargetSet {
        /// The accepted path
        path: String,
    },
    /// An argument block was stored
    ArgumentsStored {
        /// Declared argument count of the stored block
        count: u32,
    },
    /// A load began against the given path
    LoadStarted {
        /// The path being opened
        path: String,
        /// True when the path came from the built-in default
        defaulted: bool,
    },
    /// A load produced a codeset
    LoadCompleted {
        /// The loaded path
        path: String,
        /// Raw handle of the created codeset
        codeset: u32,
    },
    /// An extended header was rewritten
    ExHeaderPatched {
        /// Dependency/service pairs appended beyond the fixed templates
        appended_pairs: usize,
    },
    /// A command failed and an error response was written
    CommandRejected {
        /// Opcode of the rejected command
        opcode: u16,
        /// Raw status word sent back
        code: u32,
    },
}

/// Append-only event log scoped to one session
#[derive(Debug, Clone, Serialize)]
pub struct EventLog {
    session: SessionId,
    entries: Vec<LoaderEvent>,
}

impl EventLog {
    /// Creates an empty log for `session`
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            entries: Vec::new(),
        }
    }

    /// Appends one event
    pub fn record(&mut self, event: LoaderEvent) {
        self.entries.push(event);
    }

    /// The session this log belongs to
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// All recorded events, oldest first
    pub fn entries(&self) -> &[LoaderEvent] {
        &self.entries
    }

    /// Exports the log as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_preserves_order() {
        let mut log = EventLog::new(SessionId::new());
        log.record(LoaderEvent::TargetSet { path: "/a.hbx".into() });
        log.record(LoaderEvent::CommandRejected { opcode: 9, code: 1 });
        assert_eq!(log.entries().len(), 2);
        assert!(matches!(log.entries()[0], LoaderEvent::TargetSet { .. }));
    }

    #[test]
    fn test_json_export_names_events() {
        let mut log = EventLog::new(SessionId::new());
        log.record(LoaderEvent::ExHeaderPatched { appended_pairs: 2 });
        let json = log.to_json().unwrap();
        assert!(json.contains("ExHeaderPatched"));
        assert!(json.contains("appended_pairs"));
    }
}
