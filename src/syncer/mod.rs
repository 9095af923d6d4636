//! Bidirectional syncers between grouped XML and typed values.
//!
//! Primitives address one part of a node (an attribute, a child, the text);
//! coercions turn strings into typed values; [`pipe`] and [`object`] compose
//! them. Every syncer reads with `serialize` and writes back with
//! `deserialize`, given the value it read from.

pub mod context;
pub mod combinators;
pub mod object;
pub mod values;
pub mod xml;

pub use context::{Diagnostic, Severity, SyncContext, SyncResult};
pub use combinators::{each, map, pipe, Each, FnSyncer, Pipe, Required, Syncer, SyncerExt};
pub use object::{object, Object};
pub use values::{
    boolean, default_value, enumeration, integer, table_reference, Boolean, DefaultValue,
    Enumeration, Integer, TableReference,
};
pub use xml::{
    attribute, child, children, optional_child, required_attribute, text, Attribute, Child,
    Children, OptionalChild, Text,
};
