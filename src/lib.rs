//! xml-sync: lossless structural synchronization between XML text and typed values
//!
//! Hand-edited XML resources are read through declarative syncers into typed
//! values and written back by patching only the bytes that changed.
//! Comments, attribute order, quoting and whitespace that no syncer touches
//! survive every round trip.
//!
//! # Architecture
//!
//! - [`xml`]: raw text to a lossless tree, then to the grouped form
//!   ([`GroupedNode`]) that syncers read.
//! - [`syncer`]: the bidirectional [`Syncer`] trait and its combinators.
//! - [`position`]: maps a [`Path`] to the exact byte span in the original text.
//! - [`patch`]: turns the difference between two grouped trees into text edits.
//! - [`format`]: wraps over-long start tags one attribute per line.
//!
//! All text changes compile down to a single primitive, [`Edit`], applied in
//! batches back to front by [`edit::apply_batch`].
//!
//! # Example
//!
//! ```
//! use xml_sync::syncer::{attribute, child, SyncerExt};
//! use xml_sync::SourceDocument;
//!
//! let document = SourceDocument::parse("<a>\n  <!-- keep -->\n  <b k=\"1\"/>\n</a>");
//! let syncer = child("b").then(attribute("k"));
//!
//! let value = document.read(&syncer).value;
//! assert_eq!(value.as_deref(), Some("1"));
//!
//! let written = document.write(&syncer, &Some("2".to_string())).unwrap();
//! assert_eq!(written.text(), "<a>\n  <!-- keep -->\n  <b k=\"2\"/>\n</a>");
//! ```

pub mod config;
pub mod document;
pub mod edit;
pub mod format;
pub mod patch;
pub mod position;
pub mod specs;
pub mod syncer;
pub mod xml;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, EngineConfig};
pub use document::{PositionedDiagnostic, SourceDocument};
pub use edit::{apply_batch, Edit, EditError, EditVerification};
pub use format::{format_attributes, FormatOptions};
pub use patch::{patch, PatchError};
pub use position::{resolve, Path, PathPart, Position};
pub use specs::{ResourceKind, SpecRegistry, TableRegistry};
pub use syncer::{Diagnostic, Severity, SyncContext, SyncResult, Syncer, SyncerExt};
pub use xml::{GroupedNode, XmlError};
