//! stackwise-audit
//!
//! Application-level audit events for recommendation lifecycle changes.

pub mod events;

pub use events::{AuditAction, AuditEvent};
