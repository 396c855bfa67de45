//! CLI command for decoding a model and printing its statistics

use std::path::Path;

use anyhow::Context;

use crate::erf::ErfFile;
use crate::formats::{ani, mmh, msh, phy};

pub fn execute(
    source: &Path,
    msh_entry: &str,
    mmh_entry: Option<&str>,
    phy_entry: Option<&str>,
) -> anyhow::Result<()> {
    let mut erf = ErfFile::open(source)
        .with_context(|| format!("failed to open {}", source.display()))?;

    let msh_data = erf.read_entry_by_name(msh_entry)?;
    let mut model = msh::load_msh(msh_data).context("MSH decode failed")?;
    model.name = msh_entry.to_string();

    if let Some(name) = mmh_entry {
        let data = erf.read_entry_by_name(name)?;
        mmh::apply_mmh(data, &mut model).context("MMH decode failed")?;
    }
    if let Some(name) = phy_entry {
        let data = erf.read_entry_by_name(name)?;
        phy::apply_phy(data, &mut model).context("PHY decode failed")?;
    }

    println!("model: {}", model.name);
    let total_verts: usize = model.meshes.iter().map(|m| m.vertices.len()).sum();
    let total_tris: usize = model.meshes.iter().map(|m| m.indices.len() / 3).sum();
    println!(
        "  {} meshes, {} vertices, {} triangles",
        model.meshes.len(),
        total_verts,
        total_tris
    );
    for mesh in &model.meshes {
        let skin = if mesh.has_skinning { ", skinned" } else { "" };
        let material = if mesh.material_name.is_empty() {
            String::new()
        } else {
            format!(", material {}", mesh.material_name)
        };
        println!(
            "    {}: {} verts, {} tris{skin}{material}",
            mesh.name,
            mesh.vertices.len(),
            mesh.indices.len() / 3
        );
    }
    if !model.skeleton.bones.is_empty() {
        println!("  {} bones", model.skeleton.bones.len());
    }
    if !model.collision_shapes.is_empty() {
        println!("  {} collision shapes", model.collision_shapes.len());
    }

    // Sibling animation entries share the mesh's name prefix
    let base = msh_entry.rsplit_once('.').map_or(msh_entry, |(b, _)| b);
    let ani_names: Vec<String> = erf
        .entries()
        .iter()
        .filter(|e| {
            e.name.to_ascii_lowercase().ends_with(".ani")
                && e.name.to_ascii_lowercase().starts_with(&base.to_ascii_lowercase())
        })
        .map(|e| e.name.clone())
        .collect();
    for name in ani_names {
        let data = erf.read_entry_by_name(&name)?;
        if let Ok(mut anim) = ani::load_ani(data, &name) {
            anim.resolve_bone_indices(&model.skeleton);
            let bound = anim.tracks.iter().filter(|t| t.bone_index.is_some()).count();
            println!(
                "  animation {}: {:.2}s, {} tracks ({} bound)",
                anim.name,
                anim.duration,
                anim.tracks.len(),
                bound
            );
        }
    }

    Ok(())
}
