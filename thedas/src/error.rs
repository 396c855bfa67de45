//! Error types for `thedas`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `thedas` operations.
///
/// Only structural/fatal conditions are represented here. Per-record
/// oddities (absent field labels, empty lists, unresolvable bone parents,
/// invalid collision payloads) resolve to empty/default values and never
/// construct an `Error`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== GFF Container Errors ====================
    /// The buffer is too short to hold a GFF header.
    #[error("GFF buffer too short: {len} bytes (header needs 28)")]
    GffTooShort {
        /// The length of the rejected buffer.
        len: usize,
    },

    /// The buffer does not start with the "GFF " magic tag.
    #[error("invalid GFF magic: expected \"GFF \", found {0:?}")]
    InvalidGffMagic([u8; 4]),

    /// The struct definition table extends past the end of the buffer.
    #[error("GFF struct table out of bounds: {count} structs, buffer is {len} bytes")]
    GffStructTableOutOfBounds {
        /// Declared struct count.
        count: u32,
        /// Buffer length.
        len: usize,
    },

    /// A struct's field definition array extends past the end of the buffer.
    #[error("GFF field table out of bounds for struct {struct_index}: offset {offset}, {count} fields, buffer is {len} bytes")]
    GffFieldTableOutOfBounds {
        /// Index of the struct whose field array is invalid.
        struct_index: u32,
        /// Absolute byte offset of the field array.
        offset: u32,
        /// Declared field count.
        count: u32,
        /// Buffer length.
        len: usize,
    },

    // ==================== ERF Archive Errors ====================
    /// The leading 16 bytes match none of the five known ERF signatures.
    #[error("unrecognized ERF signature")]
    UnknownErfSignature,

    /// The archive directory is truncated or otherwise unreadable.
    #[error("ERF directory truncated: {0}")]
    ErfDirectoryTruncated(String),

    /// The requested entry was not found in the archive.
    #[error("entry not found in archive: {0}")]
    ErfEntryNotFound(String),

    /// The merge writer only supports V2.0/V2.2 archives.
    #[error("cannot merge into {version} archive (only V2.0/V2.2 supported)")]
    ErfMergeUnsupported {
        /// The version string of the rejected archive.
        version: String,
    },

    /// The archive file to merge into does not exist.
    #[error("archive not found: {path}")]
    ErfArchiveMissing {
        /// The missing archive path.
        path: PathBuf,
    },

    // ==================== Material (MAO) Errors ====================
    /// XML parsing error in a MAO material description.
    #[error("MAO parse error: {0}")]
    MaoParse(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::MaoParse(err.to_string())
    }
}

/// A specialized Result type for `thedas` operations.
pub type Result<T> = std::result::Result<T, Error>;
