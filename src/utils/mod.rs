//! The `utils` module provides definitions shared across `topicbus`:
//! the error type and the logging bootstrap.

pub mod error;
pub mod logging;

pub use error::{BusError, Result};
