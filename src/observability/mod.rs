//! Observability for the schema layer
//!
//! Provides structured JSON logging with typed events.
//!
//! # Usage
//!
//! ```
//! use docschema::observability::{Event, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Info);
//! Logger::event(Event::FileLoaded, &[("schema", "users")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};
