//! Terminal workflow event sinks

mod logging;
mod webhook;

pub use logging::LoggingEventSink;
pub use webhook::WebhookEventSink;
