//! # thedas
//!
//! A pure-Rust library for the BioWare Eclipse engine file formats used by
//! Dragon Age: Origins.
//!
//! ## Supported Formats
//!
//! - **ERF archives** - five directory revisions (V1.0-V3.0), lazy entry
//!   extraction, V2.x merge rewriting
//! - **GFF containers** - the generic struct/field binary tree every typed
//!   game file is stored in
//! - **MSH/MMH** - mesh geometry and model hierarchy (skeleton, materials)
//! - **ANI** - keyframe animation with bit-packed quaternion tracks
//! - **PHY** - collision shapes bound to skeleton bones
//! - **MAO** - XML material descriptions (texture resource names)
//!
//! ## Quick Start
//!
//! ```no_run
//! use thedas::erf::ErfFile;
//! use thedas::formats::msh::load_msh;
//!
//! let mut erf = ErfFile::open("modelmeshdata.erf")?;
//! let data = erf.read_entry_by_name("c_wolf_0.msh")?;
//! let model = load_msh(data)?;
//! println!("{} meshes", model.meshes.len());
//! # Ok::<(), thedas::Error>(())
//! ```
//!
//! Loading a complete model composes the decoders: `load_msh` for
//! geometry, then [`formats::mmh::apply_mmh`] for the skeleton and
//! material bindings, then [`formats::phy::apply_phy`] for collision
//! (the skeleton must be resolved first).
//!
//! ## Feature Flags
//!
//! - `cli` - enables the `thedas` command-line binary

pub mod erf;
pub mod error;
pub mod formats;
pub mod model;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::erf::{find_erf_files, merge_into_archive, ErfEntry, ErfFile, ErfVersion};
    pub use crate::error::{Error, Result};
    pub use crate::formats::ani::load_ani;
    pub use crate::formats::gff::{parse_gff_bytes, read_gff, GffFile};
    pub use crate::formats::mao::parse_mao;
    pub use crate::formats::mmh::apply_mmh;
    pub use crate::formats::msh::load_msh;
    pub use crate::formats::phy::apply_phy;
    pub use crate::model::{
        Animation, Bone, CollisionShape, Material, Mesh, Model, ShapeKind, Skeleton,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
