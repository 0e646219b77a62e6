//! ABM admin console library
//!
//! Command parsing, the in-memory session and the console loop are exposed
//! here so integration tests can drive them without a terminal.

pub mod command;
pub mod console;
pub mod session;
