//! Driver library for the `m2c` converter binary.
//!
//! The binary in `main.rs` only parses arguments; everything it runs lives
//! here so integration tests can drive the commands directly.

pub mod cli;
pub mod commands;
pub mod discovery;
mod error;

pub use error::CliError;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the global `tracing` subscriber.
///
/// Does nothing unless `RUST_LOG` is set or `verbose` is requested, in which
/// case the filter defaults to `debug` for the converter crates. Safe to call
/// more than once.
pub fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = match std::env::var("RUST_LOG") {
            Ok(directives) => EnvFilter::new(directives),
            Err(_) if verbose => EnvFilter::new("m2c=debug,m2c_rewrite=debug,m2c_mapping=debug"),
            Err(_) => return,
        };
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .init();
    });
}
