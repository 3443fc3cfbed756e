//! Shared test utilities for the stylus workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`runtime`]: [`FakeRuntime`], a recording controller channel, and
//!   [`ManualClock`]
//! - [`controller`]: [`Controller`], an in-memory style store answering queries
//! - [`builders`]: payload shorthands
//! - [`harness`]: [`Harness`], an engine wired to all of the above

pub mod builders;
pub mod controller;
pub mod harness;
pub mod runtime;

pub use builders::{section, styles};
pub use controller::Controller;
pub use harness::Harness;
pub use runtime::{FakeRuntime, ManualClock};
