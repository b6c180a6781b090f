//! Observable schema events
//!
//! Events are explicit and typed; each carries its default severity.

use std::fmt;

use super::logger::Severity;

/// Observable events emitted by the schema layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Schema constructed and normalized
    SchemaInitialized,
    /// Schema lock flag set
    SchemaLocked,

    // Mutation
    /// New fields appended
    FieldsAppended,
    /// Another schema merged in
    SchemaMerged,
    /// Field definitions cleared
    SchemaReset,
    /// Single field removed
    FieldUnset,
    /// Mutation rejected because the schema is locked
    MutationRejected,

    // Casting
    /// Raw value could not be cast
    CastFailed,

    // Loading
    /// Schema file loaded from disk
    FileLoaded,
    /// Schema file could not be loaded
    LoadFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SchemaInitialized => "SCHEMA_INITIALIZED",
            Event::SchemaLocked => "SCHEMA_LOCKED",
            Event::FieldsAppended => "SCHEMA_FIELDS_APPENDED",
            Event::SchemaMerged => "SCHEMA_MERGED",
            Event::SchemaReset => "SCHEMA_RESET",
            Event::FieldUnset => "SCHEMA_FIELD_UNSET",
            Event::MutationRejected => "SCHEMA_MUTATION_REJECTED",
            Event::CastFailed => "SCHEMA_CAST_FAILED",
            Event::FileLoaded => "SCHEMA_FILE_LOADED",
            Event::LoadFailed => "SCHEMA_LOAD_FAILED",
        }
    }

    /// Returns the severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::SchemaInitialized
            | Event::FieldsAppended
            | Event::SchemaMerged
            | Event::FieldUnset => Severity::Trace,
            Event::SchemaLocked | Event::SchemaReset | Event::FileLoaded => Severity::Info,
            Event::MutationRejected | Event::CastFailed => Severity::Warn,
            Event::LoadFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_prefixed() {
        let events = [
            Event::SchemaInitialized,
            Event::SchemaLocked,
            Event::FieldsAppended,
            Event::SchemaMerged,
            Event::SchemaReset,
            Event::FieldUnset,
            Event::MutationRejected,
            Event::CastFailed,
            Event::FileLoaded,
            Event::LoadFailed,
        ];
        for event in events {
            assert!(event.as_str().starts_with("SCHEMA_"), "{}", event);
        }
    }

    #[test]
    fn test_rejections_are_warnings() {
        assert_eq!(Event::MutationRejected.severity(), Severity::Warn);
        assert_eq!(Event::LoadFailed.severity(), Severity::Error);
        assert_eq!(Event::FieldsAppended.severity(), Severity::Trace);
    }
}
