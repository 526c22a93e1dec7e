//! chaosgen CLI library
//!
//! The `chaosgen` binary is a thin wrapper over these modules so that command
//! handlers can be driven from integration tests.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
