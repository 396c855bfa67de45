//! Types for ERF archive handling

use serde::Serialize;

/// Archive format revision, detected from the 16-byte leading signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErfVersion {
    /// ASCII `"ERF "`/`"MOD "`/`"SAV "`/`"HAK "` + `"V1.0"`.
    V1_0,
    /// Same as V1.0 with 32-byte resref names.
    V1_1,
    /// UTF-16 `"ERF V2.0"`, inline 64-byte entry names.
    V2_0,
    /// UTF-16 `"ERF V2.2"`, adds flags/module-id/digest header block and
    /// per-entry decoded lengths.
    V2_2,
    /// UTF-16 `"ERF V3.0"`, shared name table plus content/type hashes.
    V3_0,
}

impl ErfVersion {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1_0 => "V1.0",
            Self::V1_1 => "V1.1",
            Self::V2_0 => "V2.0",
            Self::V2_2 => "V2.2",
            Self::V3_0 => "V3.0",
        }
    }
}

/// Directory entry describing one named blob in the archive.
#[derive(Debug, Clone, Serialize)]
pub struct ErfEntry {
    /// Entry name; for V3.0 entries without a name-table entry this is the
    /// synthesized `[<hash16>].[<typehash8>]` fallback.
    pub name: String,
    /// 64-bit content-name hash (stored for V3.0, derived for older
    /// versions).
    pub name_hash: u64,
    /// 32-bit type hash (stored for V3.0, the raw restype for V1, else 0).
    pub type_hash: u32,
    /// Byte offset of the blob from the start of the archive file.
    pub offset: u64,
    /// On-disk (packed) length in bytes.
    pub packed_length: u32,
    /// Decoded length; equals `packed_length` in every observed archive
    /// (compression scheme id 0), kept separate so a codec can be added
    /// without an interface change.
    pub length: u32,
    /// Numeric resource id (V1 key table) or the entry's directory index.
    pub resource_id: u32,
    /// Raw resource-type code from V1 key tables; uninterpreted.
    pub resource_type: u16,
}

/// 64-bit FNV-1 hash of a name, matching the engine's resource hashing.
#[must_use]
pub fn fnv64(name: &str) -> u64 {
    let mut hash: u64 = 14695981039346656037;
    for b in name.bytes() {
        hash = hash.wrapping_mul(1099511628211) ^ u64::from(b);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv64_empty_is_offset_basis() {
        assert_eq!(fnv64(""), 14695981039346656037);
    }

    #[test]
    fn fnv64_known_vector() {
        // FNV-1 64 of "a": (basis * prime) ^ 0x61
        let expected = 14695981039346656037u64.wrapping_mul(1099511628211) ^ 0x61;
        assert_eq!(fnv64("a"), expected);
    }
}
