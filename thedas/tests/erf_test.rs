//! ERF archive round-trip tests over synthetic on-disk archives

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::tempdir;
use thedas::erf::{find_erf_files, merge_into_archive, ErfFile, ErfVersion};

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_utf16(out: &mut Vec<u8>, s: &str, char_count: usize) {
    let bytes = s.as_bytes();
    for i in 0..char_count {
        let unit = bytes.get(i).map_or(0u16, |&b| u16::from(b));
        out.extend_from_slice(&unit.to_le_bytes());
    }
}

fn put_fixed_ascii(out: &mut Vec<u8>, s: &str, len: usize) {
    let bytes = s.as_bytes();
    for i in 0..len {
        out.push(bytes.get(i).copied().unwrap_or(0));
    }
}

/// Build a V1.0/V1.1 archive: separate key and resource tables.
fn build_v1(entries: &[(&str, &[u8])], v1_1: bool) -> Vec<u8> {
    let name_len = if v1_1 { 32 } else { 16 };
    let key_offset = 32u32;
    let res_offset = key_offset + entries.len() as u32 * (name_len as u32 + 8);
    let mut data_offset = res_offset + entries.len() as u32 * 8;

    let mut out = Vec::new();
    out.extend_from_slice(b"ERF ");
    out.extend_from_slice(if v1_1 { b"V1.1" } else { b"V1.0" });
    put_u32(&mut out, 0); // language count
    put_u32(&mut out, 0); // localized string size
    put_u32(&mut out, entries.len() as u32);
    put_u32(&mut out, 0); // localized string offset
    put_u32(&mut out, key_offset);
    put_u32(&mut out, res_offset);

    for (i, (name, _)) in entries.iter().enumerate() {
        put_fixed_ascii(&mut out, name, name_len);
        put_u32(&mut out, i as u32); // resource id
        out.extend_from_slice(&(1000 + i as u16).to_le_bytes()); // restype
        out.extend_from_slice(&[0, 0]);
    }
    for (_, data) in entries {
        put_u32(&mut out, data_offset);
        put_u32(&mut out, data.len() as u32);
        data_offset += data.len() as u32;
    }
    for (_, data) in entries {
        out.extend_from_slice(data);
    }
    out
}

/// Build a V2.0 archive: inline 64-byte UTF-16 names.
fn build_v2_0(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    put_utf16(&mut out, "ERF ", 4);
    put_utf16(&mut out, "V2.0", 4);
    put_u32(&mut out, entries.len() as u32);
    put_u32(&mut out, 2009); // build year
    put_u32(&mut out, 123); // build day
    put_u32(&mut out, 0);

    let mut data_offset = 32 + entries.len() as u32 * 72;
    for (name, data) in entries {
        put_utf16(&mut out, name, 32);
        put_u32(&mut out, data_offset);
        put_u32(&mut out, data.len() as u32);
        data_offset += data.len() as u32;
    }
    for (_, data) in entries {
        out.extend_from_slice(data);
    }
    out
}

/// Build a V2.2 archive: flags/module-id/digest block, packed and decoded
/// lengths per entry.
fn build_v2_2(entries: &[(&str, &[u8])], flags: u32) -> Vec<u8> {
    let mut out = Vec::new();
    put_utf16(&mut out, "ERF ", 4);
    put_utf16(&mut out, "V2.2", 4);
    put_u32(&mut out, entries.len() as u32);
    put_u32(&mut out, 2010);
    put_u32(&mut out, 45);
    put_u32(&mut out, 0);
    put_u32(&mut out, flags);
    put_u32(&mut out, 7); // module id
    out.extend_from_slice(&[0u8; 16]); // digest

    let mut data_offset = 56 + entries.len() as u32 * 76;
    for (name, data) in entries {
        put_utf16(&mut out, name, 32);
        put_u32(&mut out, data_offset);
        put_u32(&mut out, data.len() as u32);
        put_u32(&mut out, data.len() as u32);
        data_offset += data.len() as u32;
    }
    for (_, data) in entries {
        out.extend_from_slice(data);
    }
    out
}

/// Build a V3.0 archive with a shared name table. A `None` name produces a
/// nameless entry (offset -1) with the given hashes.
fn build_v3_0(entries: &[(Option<&str>, u64, u32, &[u8])]) -> Vec<u8> {
    let mut string_table = Vec::new();
    let mut name_offsets = Vec::new();
    for (name, _, _, _) in entries {
        match name {
            Some(name) => {
                name_offsets.push(string_table.len() as i32);
                string_table.extend_from_slice(name.as_bytes());
                string_table.push(0);
            }
            None => name_offsets.push(-1),
        }
    }

    let mut out = Vec::new();
    put_utf16(&mut out, "ERF ", 4);
    put_utf16(&mut out, "V3.0", 4);
    put_u32(&mut out, string_table.len() as u32);
    put_u32(&mut out, entries.len() as u32);
    put_u32(&mut out, 0); // flags
    put_u32(&mut out, 9); // module id
    out.extend_from_slice(&[0u8; 16]); // digest
    out.extend_from_slice(&string_table);

    let mut data_offset = 48 + string_table.len() as u32 + entries.len() as u32 * 28;
    for (i, (_, name_hash, type_hash, data)) in entries.iter().enumerate() {
        out.extend_from_slice(&name_offsets[i].to_le_bytes());
        out.extend_from_slice(&name_hash.to_le_bytes());
        put_u32(&mut out, *type_hash);
        put_u32(&mut out, data_offset);
        put_u32(&mut out, data.len() as u32);
        put_u32(&mut out, data.len() as u32);
        data_offset += data.len() as u32;
    }
    for (_, _, _, data) in entries {
        out.extend_from_slice(data);
    }
    out
}

fn check_round_trip(path: &Path, expected: &[(&str, &[u8])], version: ErfVersion) {
    let mut erf = ErfFile::open(path).unwrap();
    assert_eq!(erf.version(), version);
    assert_eq!(erf.entries().len(), expected.len());

    // Entries report in on-disk order, contents byte-identical
    for (i, (name, data)) in expected.iter().enumerate() {
        let entry = erf.entries()[i].clone();
        assert_eq!(entry.name, *name);
        assert_eq!(entry.packed_length as usize, data.len());
        assert_eq!(erf.read_entry(&entry).unwrap(), *data);
    }
}

const SAMPLE: &[(&str, &[u8])] = &[
    ("zz_first.msh", b"mesh bytes"),
    ("a_second.mao", b"<MaterialObject/>"),
    ("third.ani", &[0u8, 1, 2, 3, 255]),
];

#[test]
fn v1_0_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.erf");
    fs::write(&path, build_v1(SAMPLE, false)).unwrap();
    check_round_trip(&path, SAMPLE, ErfVersion::V1_0);
}

#[test]
fn v1_1_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.erf");
    fs::write(&path, build_v1(SAMPLE, true)).unwrap();
    check_round_trip(&path, SAMPLE, ErfVersion::V1_1);

    let erf = ErfFile::open(&path).unwrap();
    // V1 passes restype/resid through uninterpreted
    assert_eq!(erf.entries()[0].resource_type, 1000);
    assert_eq!(erf.entries()[2].resource_id, 2);
}

#[test]
fn v2_0_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.erf");
    fs::write(&path, build_v2_0(SAMPLE)).unwrap();
    check_round_trip(&path, SAMPLE, ErfVersion::V2_0);
}

#[test]
fn v2_2_round_trip_and_scheme_ids() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.erf");
    // encryption id 3 in bits 4-7, compression id 5 in bits 29-31
    let flags = (3 << 4) | (5 << 29);
    fs::write(&path, build_v2_2(SAMPLE, flags)).unwrap();
    check_round_trip(&path, SAMPLE, ErfVersion::V2_2);

    let erf = ErfFile::open(&path).unwrap();
    assert_eq!(erf.encryption(), 3);
    assert_eq!(erf.compression(), 5);
}

#[test]
fn v3_0_round_trip_and_hash_fallback_name() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.erf");
    let entries: &[(Option<&str>, u64, u32, &[u8])] = &[
        (Some("named.msh"), 0xDEAD, 0x10, b"payload one"),
        (None, 0x0123456789ABCDEF, 0xC0FFEE42, b"payload two"),
    ];
    fs::write(&path, build_v3_0(entries)).unwrap();

    let mut erf = ErfFile::open(&path).unwrap();
    assert_eq!(erf.version(), ErfVersion::V3_0);
    assert_eq!(erf.entries().len(), 2);
    assert_eq!(erf.entries()[0].name, "named.msh");

    // Nameless entry synthesizes the lowercase hex fallback
    let fallback = erf.entries()[1].clone();
    assert_eq!(fallback.name, "[0123456789abcdef].[c0ffee42]");
    assert_eq!(fallback.name_hash, 0x0123456789ABCDEF);
    assert_eq!(fallback.type_hash, 0xC0FFEE42);
    assert_eq!(erf.read_entry(&fallback).unwrap(), b"payload two");

    // Hash lookup resolves the nameless entry
    assert!(erf.entry_by_hash(0x0123456789ABCDEF).is_some());
}

#[test]
fn unknown_signature_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bogus.erf");
    fs::write(&path, b"NOT AN ARCHIVE!!....extra").unwrap();
    assert!(ErfFile::open(&path).is_err());
}

#[test]
fn lookup_is_case_insensitive() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.erf");
    fs::write(&path, build_v2_0(SAMPLE)).unwrap();

    let mut erf = ErfFile::open(&path).unwrap();
    assert!(erf.entry("ZZ_FIRST.MSH").is_some());
    assert!(erf.entry("zz_first.msh").is_some());
    assert!(erf.entry("missing.msh").is_none());
    assert_eq!(erf.read_entry_by_name("A_Second.MAO").unwrap(), b"<MaterialObject/>");
}

#[test]
fn merge_replaces_and_resorts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.erf");
    fs::write(&path, build_v2_0(SAMPLE)).unwrap();

    let updates = vec![
        ("ZZ_first.msh".to_string(), b"new mesh bytes".to_vec()),
        ("b_added.phy".to_string(), b"phy bytes".to_vec()),
    ];
    merge_into_archive(&path, &updates).unwrap();

    let mut erf = ErfFile::open(&path).unwrap();
    assert_eq!(erf.version(), ErfVersion::V2_0);

    // Entries re-sorted by case-insensitive name, replacement applied
    let names: Vec<_> = erf.entries().iter().map(|e| e.name.clone()).collect();
    assert_eq!(
        names,
        vec!["a_second.mao", "b_added.phy", "third.ani", "zz_first.msh"]
    );
    assert_eq!(erf.read_entry_by_name("zz_first.msh").unwrap(), b"new mesh bytes");
    assert_eq!(erf.read_entry_by_name("b_added.phy").unwrap(), b"phy bytes");
    assert_eq!(erf.read_entry_by_name("third.ani").unwrap(), &[0u8, 1, 2, 3, 255]);

    // Payloads start 16-byte aligned
    assert_eq!(erf.entries()[0].offset % 16, 0);
}

#[test]
fn merge_rejects_v1_archives() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.erf");
    fs::write(&path, build_v1(SAMPLE, false)).unwrap();
    assert!(merge_into_archive(&path, &[("x".to_string(), vec![1])]).is_err());
}

#[test]
fn scan_finds_archives_case_insensitively() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("b.ERF"), build_v2_0(&[])).unwrap();
    fs::write(dir.path().join("sub/a.mod"), build_v2_0(&[])).unwrap();
    fs::write(dir.path().join("sub/c.hak"), build_v2_0(&[])).unwrap();
    fs::write(dir.path().join("ignore.txt"), b"x").unwrap();

    let found = find_erf_files(dir.path());
    assert_eq!(found.len(), 3);
    // Sorted paths
    assert!(found[0].ends_with("b.ERF"));
    assert!(found[1].ends_with("sub/a.mod"));
    assert!(found[2].ends_with("sub/c.hak"));
}
