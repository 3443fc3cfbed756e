//! Style synchronization engine
//!
//! Keeps the style elements injected into one document in step with the
//! style set owned by a privileged controller, while styles are added,
//! updated, toggled or removed out of band:
//!
//! - **Element Registry** ([`Registry`]): which element belongs to which style
//! - **Injector** ([`Injector`]): element creation and attachment per document type
//! - **Reconciliation**: the per-style state machine behind [`Engine::handle_message`]
//!   and [`Engine::handle_styles`], including the retire/ghost protocol that
//!   keeps an updated style on screen until its replacement is attached
//! - **Root-Rewrite Watchdog**: re-injection after the document root is replaced
//! - **Session Lifecycle Guard**: self-shutdown once the controller channel is gone
//!
//! # Architecture
//!
//! ```text
//!          session::run (tokio)
//!                  |
//!               Engine
//!                  |
//!    +--------+----+-----+----------+
//!    |        |          |          |
//! Registry Injector  TimerQueue  Runtime
//!             |
//!        stylus-dom        stylus-protocol
//! ```
//!
//! The engine itself is synchronous and never sleeps. Timers live in a
//! [`TimerQueue`]; whoever drives the engine asks for
//! [`Engine::next_deadline`] and calls [`Engine::tick`] once it has passed.
//!
//! # Logging
//!
//! Every state transition is a `tracing` event. Hosts without a subscriber
//! of their own call [`logging::init`]; tests use [`logging::init_for_tests`].
//!
//! # Example
//!
//! ```ignore
//! use stylus_core::{Engine, EngineConfig};
//! use stylus_dom::MemoryDocument;
//!
//! let doc = MemoryDocument::html("https://example.com/");
//! let mut engine = Engine::new(EngineConfig::default(), doc, my_runtime)?;
//! engine.start();
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod injector;
pub mod lifecycle;
pub mod logging;
pub mod reconcile;
pub mod registry;
pub mod runtime;
pub mod session;
pub mod timers;
pub mod watchdog;

pub use config::{EngineConfig, WatchdogConfig, WatchdogMode};
pub use engine::{Engine, EngineState};
pub use error::{Error, Result};
pub use injector::{Injector, StyleFlavor, expected_root, xml_viewer_head};
pub use registry::Registry;
pub use runtime::{Clock, Runtime, SystemClock};
pub use session::{Inbound, TokioClock};
pub use timers::{TimerId, TimerQueue, TimerTask};
pub use watchdog::WatchdogState;
