//! MMH model hierarchy decoding
//!
//! An MMH file is a GFF tree of nodes. Struct type `node` introduces a
//! bone; `mshh` binds a mesh name to a material object and a bones-used
//! index list; every other struct type is transparently recursed through
//! via its generic children list. Parent links are stored as names and
//! children can reference bones that appear later in traversal order, so
//! name resolution runs once after the whole walk completes.

use std::collections::HashMap;

use glam::{Quat, Vec3};
use tracing::debug;

use crate::error::Result;
use crate::formats::gff::{labels, parse_gff_bytes, GffFile};
use crate::model::{Bone, Model};

/// Guard against cyclic children lists in corrupt files.
const MAX_WALK_DEPTH: u32 = 256;

#[derive(Default)]
struct HierarchyWalk {
    mesh_materials: HashMap<String, String>,
    mesh_bones_used: HashMap<String, Vec<i32>>,
    bone_index_names: HashMap<i32, String>,
    bones: Vec<Bone>,
}

/// Decode an MMH hierarchy into an already-loaded model: skeleton bones
/// with resolved world transforms, mesh material-name bindings, bones-used
/// lists and the skinning bone-index table.
///
/// # Errors
/// Returns an error only for structural GFF failures.
pub fn apply_mmh(data: Vec<u8>, model: &mut Model) -> Result<()> {
    let gff = parse_gff_bytes(data)?;

    let mut walk = HierarchyWalk::default();
    walk_struct(&gff, 0, 0, "", &mut walk, 0);

    // Skinning bone-index table: slot -> bone name
    if !walk.bone_index_names.is_empty() {
        let max_index = walk.bone_index_names.keys().copied().max().unwrap_or(0);
        model.bone_index_names = vec![String::new(); max_index as usize + 1];
        for (index, name) in walk.bone_index_names {
            model.bone_index_names[index as usize] = name;
        }
    }

    // Join material names and bones-used lists onto meshes by name,
    // exact match first, case-insensitive second
    for mesh in &mut model.meshes {
        if let Some(material) = walk.mesh_materials.get(&mesh.name) {
            mesh.material_name.clone_from(material);
        }
        if let Some(bones) = walk.mesh_bones_used.get(&mesh.name) {
            mesh.bones_used.clone_from(bones);
        } else if let Some((_, bones)) = walk
            .mesh_bones_used
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&mesh.name))
        {
            mesh.bones_used.clone_from(bones);
        }
    }

    model.skeleton.bones = walk.bones;
    model.skeleton.resolve_parents();
    model.skeleton.compute_world_transforms();

    Ok(())
}

fn walk_struct(
    gff: &GffFile,
    struct_index: u32,
    offset: u32,
    parent_name: &str,
    walk: &mut HierarchyWalk,
    depth: u32,
) {
    if depth > MAX_WALK_DEPTH {
        debug!("MMH walk depth limit reached, stopping descent");
        return;
    }
    let Some(def) = gff.structs.get(struct_index as usize) else {
        return;
    };

    match def.type_tag() {
        "mshh" => {
            let mesh_name = gff.read_string(struct_index, labels::MESH_NAME, offset);
            let material_name = gff.read_string(struct_index, labels::MATERIAL_NAME, offset);
            if !mesh_name.is_empty() && !material_name.is_empty() {
                walk.mesh_materials.insert(mesh_name.clone(), material_name);
            }

            let bones_used = gff.read_u32_list(struct_index, labels::BONES_USED, offset);
            if !bones_used.is_empty() {
                walk.mesh_bones_used
                    .insert(mesh_name, bones_used.into_iter().map(|i| i as i32).collect());
            }

            for child in gff.children(struct_index, offset) {
                walk_struct(gff, child.struct_index, child.offset, parent_name, walk, depth + 1);
            }
        }
        "node" => {
            let mut bone = Bone {
                name: gff.read_string(struct_index, labels::NODE_NAME, offset),
                parent_name: parent_name.to_string(),
                ..Bone::default()
            };

            if gff.find_field(struct_index, labels::BONE_INDEX).is_some() {
                let bone_index = gff.read_i32(struct_index, labels::BONE_INDEX, offset);
                if bone_index >= 0 {
                    walk.bone_index_names.insert(bone_index, bone.name.clone());
                }
            }

            // Local transforms live in `trsl`/`rota` child structs
            let children = gff.children(struct_index, offset);
            for child in &children {
                if let Some(t) =
                    gff.read_f32_array::<3>(child.struct_index, labels::TRANSLATION, child.offset)
                {
                    bone.local_position = Vec3::from_array(t);
                }
                if let Some(r) =
                    gff.read_f32_array::<4>(child.struct_index, labels::ROTATION, child.offset)
                {
                    // Source data may carry slightly non-unit quaternions
                    bone.local_rotation =
                        normalize_quat(Quat::from_xyzw(r[0], r[1], r[2], r[3]));
                }
            }

            let child_parent = bone.name.clone();
            if !bone.name.is_empty() {
                walk.bones.push(bone);
            }
            for child in children {
                walk_struct(gff, child.struct_index, child.offset, &child_parent, walk, depth + 1);
            }
        }
        _ => {
            for child in gff.children(struct_index, offset) {
                walk_struct(gff, child.struct_index, child.offset, parent_name, walk, depth + 1);
            }
        }
    }
}

fn normalize_quat(q: Quat) -> Quat {
    let len = q.length();
    if len > 1.0e-5 {
        q / len
    } else {
        Quat::IDENTITY
    }
}
