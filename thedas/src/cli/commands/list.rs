//! CLI command for listing archive contents

use std::path::Path;

use anyhow::Context;

use crate::erf::ErfFile;

/// Format byte size for human-readable output
fn format_size(bytes: u32) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1}M", f64::from(bytes) / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1}K", f64::from(bytes) / 1024.0)
    } else {
        format!("{bytes}")
    }
}

pub fn execute(source: &Path, json: bool) -> anyhow::Result<()> {
    let erf = ErfFile::open(source)
        .with_context(|| format!("failed to open {}", source.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(erf.entries())?);
        return Ok(());
    }

    println!(
        "{} ({}, {} entries)",
        erf.file_name(),
        erf.version().as_str(),
        erf.entries().len()
    );
    if erf.encryption() != 0 {
        println!("  encryption scheme: {}", erf.encryption());
    }
    if erf.compression() != 0 {
        println!("  compression scheme: {}", erf.compression());
    }
    for entry in erf.entries() {
        if entry.packed_length == entry.length {
            println!("  {:>8}  {}", format_size(entry.length), entry.name);
        } else {
            println!(
                "  {:>8} ({} packed)  {}",
                format_size(entry.length),
                format_size(entry.packed_length),
                entry.name
            );
        }
    }
    Ok(())
}
