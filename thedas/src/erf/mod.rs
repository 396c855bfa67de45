//! ERF resource archives
//!
//! An ERF archive holds many named byte blobs (models, textures, materials,
//! animations). Five historical directory layouts exist; all are read into
//! a uniform entry list, and entry payloads are fetched lazily by seeking
//! the retained file handle.

mod reader;
mod types;
mod writer;

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub use reader::ErfFile;
pub use types::{fnv64, ErfEntry, ErfVersion};
pub use writer::merge_into_archive;

/// Find every archive under a root directory.
///
/// Matches the `.erf/.mod/.sav/.hak` extensions case-insensitively and
/// returns the paths sorted.
pub fn find_erf_files<P: AsRef<Path>>(root: P) -> Vec<PathBuf> {
    let mut archives: Vec<_> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.path().is_file()
                && e.path().extension().is_some_and(|ext| {
                    ext.eq_ignore_ascii_case("erf")
                        || ext.eq_ignore_ascii_case("mod")
                        || ext.eq_ignore_ascii_case("sav")
                        || ext.eq_ignore_ascii_case("hak")
                })
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    archives.sort();
    archives
}
