//! Layout document serialization.
//!
//! # Responsibility
//! - Convert `GridModel` to and from the versioned JSON layout document.
//!
//! # See also
//! - `persist` for reading and writing documents on disk.

pub mod layout_document;

pub use layout_document::{
    export_layout, export_layout_json, from_json_str, import_layout, import_layout_json,
    to_json_string, LayoutDocument, LAYOUT_DOCUMENT_VERSION,
};
