//! Logging utilities.
//!
//! All engine diagnostics go through the `log` facade. `init_logging` installs
//! the `env_logger` backend once per process.

mod init;

pub use init::{LoggingConfig, init_logging};
