//! # mg-observability
//!
//! Observability infrastructure for the Magerisk engine: structured
//! logging bootstrap on the tracing ecosystem.

pub mod logging;

pub use logging::{init_logging, init_logging_with_config, LoggingConfig};
