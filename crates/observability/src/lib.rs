//! Observability for optx
//!
//! Structured logging via `tracing`. The engines only emit events; the
//! binary decides the output format once at startup.
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("optx", LogFormat::Pretty)?;
//! ```

pub mod logging;

pub use logging::{init_logging, LogFormat, DEFAULT_FILTER};
