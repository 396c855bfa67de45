//! CLI command for extracting archive entries

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};

use crate::erf::ErfFile;

pub fn execute(source: &Path, out: &Path, entry: Option<&str>, all: bool) -> anyhow::Result<()> {
    let mut erf = ErfFile::open(source)
        .with_context(|| format!("failed to open {}", source.display()))?;
    fs::create_dir_all(out)?;

    if let Some(name) = entry {
        let entry = erf
            .entry(name)
            .cloned()
            .with_context(|| format!("entry not found: {name}"))?;
        let dest = out.join(sanitize(&entry.name));
        erf.extract_entry(&entry, &dest)?;
        println!("{} -> {}", entry.name, dest.display());
        return Ok(());
    }

    if !all {
        bail!("pass --entry <name> or --all");
    }

    let entries = erf.entries().to_vec();
    let mut failed = 0usize;
    for entry in &entries {
        let dest = out.join(sanitize(&entry.name));
        if let Err(e) = erf.extract_entry(entry, &dest) {
            eprintln!("failed: {} ({e})", entry.name);
            failed += 1;
        }
    }
    println!("extracted {} of {} entries", entries.len() - failed, entries.len());
    Ok(())
}

/// Entry names may carry hash-fallback brackets; keep them filesystem-safe.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}
