//! CLI command for finding archives under a directory

use std::path::Path;

use crate::erf::find_erf_files;

pub fn execute(root: &Path) -> anyhow::Result<()> {
    let archives = find_erf_files(root);
    for path in &archives {
        println!("{}", path.display());
    }
    println!("{} archive(s)", archives.len());
    Ok(())
}
