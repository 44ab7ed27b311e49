//! Structured logging adapters
//!
//! Implements the [`AuditLogger`](review_application::ports::audit_logger::AuditLogger)
//! port with a JSONL file writer.

mod jsonl_logger;

pub use jsonl_logger::JsonlAuditLogger;
