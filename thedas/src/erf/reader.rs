//! ERF archive reader
//!
//! Five on-disk directory layouts are recognized, distinguished purely by
//! the 16-byte leading signature. The whole directory is photographed into
//! the in-memory entry list at open time; entry payloads stay on disk and
//! are read lazily through the retained file handle.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use super::types::{fnv64, ErfEntry, ErfVersion};
use crate::error::{Error, Result};

/// An open ERF archive.
///
/// Keeps its file handle for random-access entry reads; the handle is
/// released when the archive is dropped. Instances are independent, so
/// archives may be opened concurrently from separate threads without
/// coordination.
pub struct ErfFile {
    reader: BufReader<File>,
    path: PathBuf,
    version: ErfVersion,
    entries: Vec<ErfEntry>,
    encryption: u32,
    compression: u32,
    /// Header fields preserved for the V2.x rewrite path.
    pub(super) build_year: u32,
    pub(super) build_day: u32,
    pub(super) header_unknown: u32,
    pub(super) flags: u32,
    pub(super) module_id: u32,
}

impl ErfFile {
    /// Open an archive and parse its directory.
    ///
    /// # Errors
    /// Returns an error on IO failure, an unrecognized signature, or a
    /// truncated directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let mut reader = BufReader::new(file);

        let mut signature = [0u8; 16];
        reader.read_exact(&mut signature)?;

        let mut erf = Self {
            reader,
            path,
            version: ErfVersion::V1_0,
            entries: Vec::new(),
            encryption: 0,
            compression: 0,
            build_year: 0,
            build_day: 0,
            header_unknown: 0,
            flags: 0,
            module_id: 0,
        };

        let ascii_type = &signature[0..4];
        let ascii_version = &signature[4..8];
        if matches!(ascii_type, b"ERF " | b"MOD " | b"SAV " | b"HAK ") {
            match ascii_version {
                b"V1.0" => {
                    erf.version = ErfVersion::V1_0;
                    erf.parse_v1()?;
                    return Ok(erf);
                }
                b"V1.1" => {
                    erf.version = ErfVersion::V1_1;
                    erf.parse_v1()?;
                    return Ok(erf);
                }
                _ => {}
            }
        }

        match utf16_signature(&signature).as_str() {
            "ERF V2.0" => {
                erf.version = ErfVersion::V2_0;
                erf.parse_v2_0()?;
            }
            "ERF V2.2" => {
                erf.version = ErfVersion::V2_2;
                erf.parse_v2_2()?;
            }
            "ERF V3.0" => {
                erf.version = ErfVersion::V3_0;
                erf.parse_v3_0()?;
            }
            _ => return Err(Error::UnknownErfSignature),
        }

        Ok(erf)
    }

    /// The archive's directory entries, in on-disk order.
    pub fn entries(&self) -> &[ErfEntry] {
        &self.entries
    }

    pub fn version(&self) -> ErfVersion {
        self.version
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The archive file name without its directory.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Whole-archive encryption scheme id (0 in all readable archives).
    pub fn encryption(&self) -> u32 {
        self.encryption
    }

    /// Whole-archive compression scheme id (0 in all readable archives).
    pub fn compression(&self) -> u32 {
        self.compression
    }

    /// Case-insensitive exact-name entry lookup.
    pub fn entry(&self, name: &str) -> Option<&ErfEntry> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// Entry lookup by 64-bit content hash (primarily useful for V3.0
    /// archives, where the hash is authoritative).
    pub fn entry_by_hash(&self, name_hash: u64) -> Option<&ErfEntry> {
        self.entries.iter().find(|e| e.name_hash == name_hash)
    }

    /// Read an entry's raw (packed) bytes.
    ///
    /// # Errors
    /// Returns an error if the seek or read fails.
    pub fn read_entry(&mut self, entry: &ErfEntry) -> Result<Vec<u8>> {
        self.reader.seek(SeekFrom::Start(entry.offset))?;
        let mut data = vec![0u8; entry.packed_length as usize];
        self.reader.read_exact(&mut data)?;
        Ok(data)
    }

    /// Read an entry by case-insensitive name.
    ///
    /// # Errors
    /// Returns an error if the entry does not exist or reading fails.
    pub fn read_entry_by_name(&mut self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .entry(name)
            .cloned()
            .ok_or_else(|| Error::ErfEntryNotFound(name.to_string()))?;
        self.read_entry(&entry)
    }

    /// Extract an entry's bytes to a file.
    ///
    /// # Errors
    /// Returns an error if reading the entry or writing the file fails.
    pub fn extract_entry<P: AsRef<Path>>(&mut self, entry: &ErfEntry, dest: P) -> Result<()> {
        let data = self.read_entry(entry)?;
        let mut out = File::create(dest)?;
        out.write_all(&data)?;
        Ok(())
    }

    // ==================== Directory parsing ====================

    fn parse_v1(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(8))?;

        let _language_count = self.reader.read_u32::<LittleEndian>()?;
        let _localized_size = self.reader.read_u32::<LittleEndian>()?;
        let entry_count = self.reader.read_u32::<LittleEndian>()?;
        let _localized_offset = self.reader.read_u32::<LittleEndian>()?;
        let key_offset = self.reader.read_u32::<LittleEndian>()?;
        let resource_offset = self.reader.read_u32::<LittleEndian>()?;

        // Key table: fixed-width resref name + resource id + type
        self.reader.seek(SeekFrom::Start(u64::from(key_offset)))?;
        let name_len = if self.version == ErfVersion::V1_0 { 16 } else { 32 };

        struct Key {
            resref: String,
            resource_id: u32,
            resource_type: u16,
        }

        let mut keys = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            let mut name_bytes = vec![0u8; name_len];
            self.reader
                .read_exact(&mut name_bytes)
                .map_err(|e| Error::ErfDirectoryTruncated(e.to_string()))?;
            let end = name_bytes.iter().position(|&b| b == 0).unwrap_or(name_len);
            let resref = String::from_utf8_lossy(&name_bytes[..end]).into_owned();

            let resource_id = self.reader.read_u32::<LittleEndian>()?;
            let resource_type = self.reader.read_u16::<LittleEndian>()?;
            self.reader.seek(SeekFrom::Current(2))?;

            keys.push(Key {
                resref,
                resource_id,
                resource_type,
            });
        }

        // Parallel resource table: offset + length pairs
        self.reader
            .seek(SeekFrom::Start(u64::from(resource_offset)))?;
        for key in keys {
            let offset = self.reader.read_u32::<LittleEndian>()?;
            let length = self.reader.read_u32::<LittleEndian>()?;
            self.entries.push(ErfEntry {
                name_hash: fnv64(&key.resref),
                type_hash: u32::from(key.resource_type),
                name: key.resref,
                offset: u64::from(offset),
                packed_length: length,
                length,
                resource_id: key.resource_id,
                resource_type: key.resource_type,
            });
        }

        Ok(())
    }

    fn parse_v2_0(&mut self) -> Result<()> {
        let file_count = self.reader.read_u32::<LittleEndian>()?;
        self.build_year = self.reader.read_u32::<LittleEndian>()?;
        self.build_day = self.reader.read_u32::<LittleEndian>()?;
        self.header_unknown = self.reader.read_u32::<LittleEndian>()?;

        for i in 0..file_count {
            let name = self.read_utf16_name(64)?;
            let offset = self.reader.read_u32::<LittleEndian>()?;
            let packed_length = self.reader.read_u32::<LittleEndian>()?;
            self.entries.push(ErfEntry {
                name_hash: fnv64(&name),
                type_hash: 0,
                name,
                offset: u64::from(offset),
                packed_length,
                length: packed_length,
                resource_id: i,
                resource_type: 0,
            });
        }

        Ok(())
    }

    fn parse_v2_2(&mut self) -> Result<()> {
        let file_count = self.reader.read_u32::<LittleEndian>()?;
        self.build_year = self.reader.read_u32::<LittleEndian>()?;
        self.build_day = self.reader.read_u32::<LittleEndian>()?;
        self.header_unknown = self.reader.read_u32::<LittleEndian>()?;
        self.flags = self.reader.read_u32::<LittleEndian>()?;
        self.module_id = self.reader.read_u32::<LittleEndian>()?;
        self.reader.seek(SeekFrom::Current(16))?; // digest

        self.encryption = (self.flags >> 4) & 0xF;
        self.compression = (self.flags >> 29) & 0x7;

        for i in 0..file_count {
            let name = self.read_utf16_name(64)?;
            let offset = self.reader.read_u32::<LittleEndian>()?;
            let packed_length = self.reader.read_u32::<LittleEndian>()?;
            let length = self.reader.read_u32::<LittleEndian>()?;
            self.entries.push(ErfEntry {
                name_hash: fnv64(&name),
                type_hash: 0,
                name,
                offset: u64::from(offset),
                packed_length,
                length,
                resource_id: i,
                resource_type: 0,
            });
        }

        Ok(())
    }

    fn parse_v3_0(&mut self) -> Result<()> {
        let string_table_size = self.reader.read_u32::<LittleEndian>()?;
        let file_count = self.reader.read_u32::<LittleEndian>()?;
        self.flags = self.reader.read_u32::<LittleEndian>()?;
        self.module_id = self.reader.read_u32::<LittleEndian>()?;
        self.reader.seek(SeekFrom::Current(16))?; // digest

        self.encryption = (self.flags >> 4) & 0xF;
        self.compression = (self.flags >> 29) & 0x7;

        // Shared name table: NUL-separated strings addressed by byte offset
        let mut names: HashMap<u32, String> = HashMap::new();
        if string_table_size > 0 {
            let mut table = vec![0u8; string_table_size as usize];
            self.reader
                .read_exact(&mut table)
                .map_err(|e| Error::ErfDirectoryTruncated(e.to_string()))?;

            let mut start = 0usize;
            for i in 0..table.len() {
                if table[i] == 0 {
                    if i > start {
                        names.insert(
                            start as u32,
                            String::from_utf8_lossy(&table[start..i]).into_owned(),
                        );
                    }
                    start = i + 1;
                }
            }
        }

        for i in 0..file_count {
            let name_offset = self.reader.read_i32::<LittleEndian>()?;
            let name_hash = self.reader.read_u64::<LittleEndian>()?;
            let type_hash = self.reader.read_u32::<LittleEndian>()?;
            let offset = self.reader.read_u32::<LittleEndian>()?;
            let packed_length = self.reader.read_u32::<LittleEndian>()?;
            let length = self.reader.read_u32::<LittleEndian>()?;

            let mut name = if name_offset >= 0 {
                names.get(&(name_offset as u32)).cloned().unwrap_or_default()
            } else {
                String::new()
            };
            if name.is_empty() {
                // No name table entry: synthesize from the hashes
                name = format!("[{name_hash:016x}].[{type_hash:08x}]");
                debug!(entry = i, name = %name, "ERF V3.0 entry without name, using hash fallback");
            }

            self.entries.push(ErfEntry {
                name,
                name_hash,
                type_hash,
                offset: u64::from(offset),
                packed_length,
                length,
                resource_id: i,
                resource_type: 0,
            });
        }

        Ok(())
    }

    /// Read a fixed-size UTF-16LE name field, keeping code units below 128
    /// and stopping at the first NUL (the format only uses ASCII names).
    fn read_utf16_name(&mut self, byte_len: usize) -> Result<String> {
        let mut bytes = vec![0u8; byte_len];
        self.reader
            .read_exact(&mut bytes)
            .map_err(|e| Error::ErfDirectoryTruncated(e.to_string()))?;

        let mut name = String::new();
        for unit in bytes.chunks_exact(2) {
            let c = u16::from_le_bytes([unit[0], unit[1]]);
            if c == 0 {
                break;
            }
            if c < 128 {
                name.push(c as u8 as char);
            }
        }
        Ok(name)
    }
}

/// Decode the leading 16 bytes as an 8-character UTF-16LE signature.
fn utf16_signature(bytes: &[u8; 16]) -> String {
    let mut result = String::with_capacity(8);
    for unit in bytes.chunks_exact(2) {
        let c = u16::from_le_bytes([unit[0], unit[1]]);
        if c == 0 {
            break;
        }
        if c < 128 {
            result.push(c as u8 as char);
        }
    }
    result
}
