//! Host document abstraction for the stylus injector.
//!
//! The injector never touches a page directly. Everything it needs (creating
//! style elements, attaching and detaching them, looking them up by id,
//! noticing that the root element was replaced, page-level signals) goes
//! through the [`HostDocument`] trait.
//!
//! [`MemoryDocument`] is a complete in-memory implementation covering the
//! three document shapes the injector distinguishes:
//!
//! - markup documents (`<html>` with `head` and `body`)
//! - generic XML documents
//! - SVG documents (an XML document whose root is `<svg>`)
//!
//! plus the browser XML viewer layout, where injected styles must go into the
//! generated `head`.

pub mod error;
pub mod host;
pub mod memory;
pub mod node;

pub use error::{Error, Result};
pub use host::HostDocument;
pub use memory::{MemoryDocument, XML_VIEWER_STYLE_ID};
pub use node::{DocumentKind, MutationRecord, Namespace, NodeId};
