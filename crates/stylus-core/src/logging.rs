//! Tracing subscriber setup for hosts embedding the engine
//!
//! The engine only emits `tracing` events. A host that has no subscriber of
//! its own calls [`init`] once at startup; test suites call [`init_for_tests`]
//! so engine events land in the captured output of the failing test.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Directive used when `RUST_LOG` is not set
const DEFAULT_DIRECTIVE: &str = "info";

/// Directive for test runs: engine transitions at debug, the rest at warn
const TEST_DIRECTIVE: &str = "warn,stylus_core=debug";

fn filter(default_directive: &str) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_directive))
}

/// Install a compact stdout subscriber filtered by `RUST_LOG` (default
/// `info`). Fails instead of panicking when a global subscriber is already
/// installed.
pub fn init() -> InitResult {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter(DEFAULT_DIRECTIVE)?)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Install a subscriber writing through the test harness capture. Safe to
/// call from every test: only the first call installs anything.
pub fn init_for_tests() -> InitResult {
    let fmt_layer = fmt::layer()
        .with_test_writer()
        .without_time()
        .with_target(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter(TEST_DIRECTIVE)?)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
