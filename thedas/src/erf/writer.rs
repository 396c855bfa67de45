//! ERF merge writer
//!
//! Merges a set of named byte blobs into an existing V2.0/V2.2 archive:
//! the existing directory is fully reparsed, same-named entries are
//! replaced (case-insensitively), new names are appended, all entries are
//! re-sorted by case-insensitive name, and the whole file is rewritten.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use super::reader::ErfFile;
use super::types::ErfVersion;
use crate::error::{Error, Result};

const V2_0_HEADER_SIZE: usize = 32;
const V2_0_ENTRY_SIZE: usize = 72;
const V2_2_HEADER_SIZE: usize = 56;
const V2_2_ENTRY_SIZE: usize = 76;

/// Merge named blobs into an existing V2.0/V2.2 archive, rewriting it in
/// place.
///
/// # Errors
/// Returns an error if the archive is missing, is not V2.0/V2.2, or any
/// read/write fails.
pub fn merge_into_archive<P: AsRef<Path>>(path: P, files: &[(String, Vec<u8>)]) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::ErfArchiveMissing {
            path: path.to_path_buf(),
        });
    }

    let mut erf = ErfFile::open(path)?;
    let version = erf.version();
    if version != ErfVersion::V2_0 && version != ErfVersion::V2_2 {
        return Err(Error::ErfMergeUnsupported {
            version: version.as_str().to_string(),
        });
    }

    // Photograph the current contents, replacing same-named entries
    let mut contents: Vec<(String, Vec<u8>)> = Vec::with_capacity(erf.entries().len());
    for entry in erf.entries().to_vec() {
        let replacement = files
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&entry.name));
        match replacement {
            Some((_, data)) => {
                debug!(name = %entry.name, "replacing archive entry");
                contents.push((entry.name.clone(), data.clone()));
            }
            None => contents.push((entry.name.clone(), erf.read_entry(&entry)?)),
        }
    }
    for (name, data) in files {
        let exists = contents
            .iter()
            .any(|(existing, _)| existing.eq_ignore_ascii_case(name));
        if !exists {
            contents.push((name.clone(), data.clone()));
        }
    }
    contents.sort_by_key(|(name, _)| name.to_ascii_lowercase());

    let (header_size, entry_size) = match version {
        ErfVersion::V2_0 => (V2_0_HEADER_SIZE, V2_0_ENTRY_SIZE),
        _ => (V2_2_HEADER_SIZE, V2_2_ENTRY_SIZE),
    };

    let mut out = Vec::new();
    write_utf16_fixed(&mut out, "ERF ", 4);
    write_utf16_fixed(&mut out, version.as_str(), 4);
    out.extend_from_slice(&(contents.len() as u32).to_le_bytes());
    out.extend_from_slice(&erf.build_year.to_le_bytes());
    out.extend_from_slice(&erf.build_day.to_le_bytes());
    out.extend_from_slice(&erf.header_unknown.to_le_bytes());
    if version == ErfVersion::V2_2 {
        out.extend_from_slice(&erf.flags.to_le_bytes());
        out.extend_from_slice(&erf.module_id.to_le_bytes());
        out.extend_from_slice(&[0u8; 16]); // digest
    }
    debug_assert_eq!(out.len(), header_size);

    // Reserve the directory, then append payloads at a 16-byte boundary
    let table_start = out.len();
    let mut data_start = table_start + contents.len() * entry_size;
    while data_start % 16 != 0 {
        data_start += 1;
    }
    out.resize(data_start, 0);

    let mut placements = Vec::with_capacity(contents.len());
    for (_, data) in &contents {
        placements.push((out.len() as u32, data.len() as u32));
        out.extend_from_slice(data);
    }

    for (i, (name, _)) in contents.iter().enumerate() {
        let entry_off = table_start + i * entry_size;
        let (offset, size) = placements[i];
        write_utf16_fixed_at(&mut out, entry_off, name, 32);
        out[entry_off + 64..entry_off + 68].copy_from_slice(&offset.to_le_bytes());
        out[entry_off + 68..entry_off + 72].copy_from_slice(&size.to_le_bytes());
        if version == ErfVersion::V2_2 {
            // No compression: decoded length equals packed length
            out[entry_off + 72..entry_off + 76].copy_from_slice(&size.to_le_bytes());
        }
    }

    drop(erf); // release the read handle before rewriting

    let mut file = File::create(path)?;
    file.write_all(&out)?;
    Ok(())
}

fn write_utf16_fixed(out: &mut Vec<u8>, s: &str, char_count: usize) {
    let bytes = s.as_bytes();
    for i in 0..char_count {
        let unit = bytes.get(i).map_or(0u16, |&b| u16::from(b));
        out.extend_from_slice(&unit.to_le_bytes());
    }
}

fn write_utf16_fixed_at(out: &mut [u8], pos: usize, s: &str, char_count: usize) {
    let bytes = s.as_bytes();
    for i in 0..char_count {
        let unit = bytes.get(i).map_or(0u16, |&b| u16::from(b));
        out[pos + i * 2..pos + i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
    }
}
