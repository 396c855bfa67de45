//! GFF V4 binary container format
//!
//! Every typed game-data file in the Eclipse engine (MMH, MSH, ANI, PHY and
//! many more) is a GFF container: a header, a table of struct definitions,
//! per-struct field definition arrays, and a variable-length data section.
//! Fields are identified by fixed 32-bit integer labels, not by name; the
//! label table lives in [`labels`].

pub mod document;
pub mod labels;
mod reader;

pub use document::{FieldFlags, GffFieldDef, GffFile, GffHeader, GffStructDef, GffStructRef};
pub use reader::{parse_gff_bytes, read_gff};
