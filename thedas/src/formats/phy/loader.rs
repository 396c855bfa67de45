//! PHY collision decoding
//!
//! A PHY file is a GFF tree walked depth-first: `node` structs update the
//! "current bone name" context that children inherit, `shap` structs emit
//! one collision shape bound to that context. A shape's payload is reached
//! through one of three reference encodings; source files use them
//! inconsistently, so all three are attempted in a fixed priority order.
//! Shapes failing their kind-specific validity check are silently dropped.

use glam::{Quat, Vec3};
use tracing::debug;

use crate::error::Result;
use crate::formats::gff::{labels, parse_gff_bytes, GffFile, GffStructRef};
use crate::model::{CollisionShape, Model, ShapeKind};

/// Guard against cyclic children lists in corrupt files.
const MAX_WALK_DEPTH: u32 = 256;

/// Bytes between a `mshs` payload's list redirect and its vertex count.
const CONVEX_MESH_SUBHEADER: u32 = 28;

/// Decode a PHY file's collision shapes into a model.
///
/// The skeleton's world transforms must already be resolved: a shape whose
/// bone-name context matches a skeleton bone is composed with that bone's
/// world transform; otherwise the stored values are used as-is and the
/// shape is flagged `world_space`.
///
/// # Errors
/// Returns an error only for structural GFF failures.
pub fn apply_phy(data: Vec<u8>, model: &mut Model) -> Result<()> {
    let gff = parse_gff_bytes(data)?;
    walk_struct(&gff, 0, 0, "", model, 0);
    Ok(())
}

fn walk_struct(
    gff: &GffFile,
    struct_index: u32,
    offset: u32,
    bone_context: &str,
    model: &mut Model,
    depth: u32,
) {
    if depth > MAX_WALK_DEPTH {
        debug!("PHY walk depth limit reached, stopping descent");
        return;
    }
    let Some(def) = gff.structs.get(struct_index as usize) else {
        return;
    };

    let mut current_bone = bone_context.to_string();
    match def.type_tag() {
        "node" => {
            let name = gff.read_string(struct_index, labels::NODE_NAME, offset);
            if !name.is_empty() {
                current_bone = name;
            }
        }
        "shap" => {
            if let Some(shape) = decode_shape(gff, struct_index, offset, &current_bone, model) {
                model.collision_shapes.push(shape);
            }
        }
        _ => {}
    }

    for child in gff.children(struct_index, offset) {
        walk_struct(gff, child.struct_index, child.offset, &current_bone, model, depth + 1);
    }
}

fn decode_shape(
    gff: &GffFile,
    struct_index: u32,
    offset: u32,
    bone_name: &str,
    model: &Model,
) -> Option<CollisionShape> {
    let mut name = gff.read_string(struct_index, labels::SHAPE_NAME, offset);
    if name.is_empty() {
        name = format!("collision_{}", model.collision_shapes.len());
    }

    let local_position = gff
        .read_f32_array::<3>(struct_index, labels::SHAPE_POSITION, offset)
        .map_or(Vec3::ZERO, Vec3::from_array);
    let local_rotation = gff
        .read_f32_array::<4>(struct_index, labels::SHAPE_ROTATION, offset)
        .map_or(Quat::IDENTITY, |r| Quat::from_xyzw(r[0], r[1], r[2], r[3]));

    // Compose against the owning bone's world transform when it resolves
    let (position, rotation, world_space) = match model.skeleton.find_bone(bone_name) {
        Some(bone_idx) => {
            let bone = &model.skeleton.bones[bone_idx];
            (
                bone.world_position + bone.world_rotation * local_position,
                bone.world_rotation * local_rotation,
                false,
            )
        }
        None => (local_position, local_rotation, true),
    };

    let payload = resolve_payload(gff, struct_index, offset)?;
    let payload_def = gff.structs.get(payload.struct_index as usize)?;

    let kind = match payload_def.type_tag() {
        "boxs" => {
            let half_extents =
                gff.read_f32_array::<3>(payload.struct_index, labels::BOX_EXTENTS, payload.offset)?;
            // An all-zero box carries no volume and is invalid
            if half_extents.iter().all(|&e| e == 0.0) {
                return None;
            }
            ShapeKind::Box { half_extents }
        }
        "sphs" => {
            let radius = gff.read_f32(payload.struct_index, labels::SHAPE_RADIUS, payload.offset);
            if radius <= 0.0 {
                return None;
            }
            ShapeKind::Sphere { radius }
        }
        "caps" => {
            let radius = gff.read_f32(payload.struct_index, labels::SHAPE_RADIUS, payload.offset);
            let height = gff.read_f32(payload.struct_index, labels::SHAPE_HEIGHT, payload.offset);
            if radius <= 0.0 || height <= 0.0 {
                return None;
            }
            ShapeKind::Capsule { radius, height }
        }
        "mshs" => decode_convex_mesh(gff, payload)?,
        other => {
            debug!(tag = other, "unrecognized collision payload struct");
            return None;
        }
    };

    Some(CollisionShape {
        name,
        kind,
        position,
        rotation,
        world_space,
    })
}

/// Resolve the shape payload through the three reference encodings source
/// files use: a direct reference, a struct-valued offset, then a generic
/// list whose first element is taken.
fn resolve_payload(gff: &GffFile, struct_index: u32, offset: u32) -> Option<GffStructRef> {
    let field = gff.find_field(struct_index, labels::SHAPE_PAYLOAD)?;
    let data_pos = gff.data_offset() + field.data_offset + offset;

    if field.is_reference() && !field.is_list() && !field.is_struct() {
        let ref_index = u32::from(gff.u16_at(data_pos));
        if (ref_index as usize) < gff.structs.len() {
            return Some(GffStructRef {
                struct_index: ref_index,
                offset: gff.u32_at(data_pos + 4),
            });
        }
        None
    } else if field.is_struct() && !field.is_list() {
        let payload_offset = gff.i32_at(data_pos);
        if payload_offset >= 0 {
            return Some(GffStructRef {
                struct_index: u32::from(field.type_id),
                offset: payload_offset as u32,
            });
        }
        None
    } else {
        gff.read_struct_list(struct_index, labels::SHAPE_PAYLOAD, offset)
            .into_iter()
            .next()
    }
}

/// Decode a `mshs` payload's embedded convex mesh: a 4-byte list redirect,
/// a fixed 28-byte sub-header, a vertex count and face count, then 3-float
/// vertices and 3-byte triangles. Indices are deliberately 8-bit, capping
/// embedded collision meshes at 256 vertices.
fn decode_convex_mesh(gff: &GffFile, payload: GffStructRef) -> Option<ShapeKind> {
    let field = gff.find_field(payload.struct_index, labels::SHAPE_MESH_DATA)?;
    let data_pos = gff.data_offset() + field.data_offset + payload.offset;
    let list_ref = gff.i32_at(data_pos);
    if list_ref < 0 {
        return None;
    }

    let mut pos = gff.data_offset() + (list_ref as u32) + 4;
    if pos as usize + 36 >= gff.data().len() {
        return None;
    }
    pos += CONVEX_MESH_SUBHEADER;

    let vertex_count = gff.u32_at(pos);
    pos += 4;
    let face_count = gff.u32_at(pos);
    pos += 4;

    let vertex_bytes = vertex_count.checked_mul(12)?;
    if (pos + vertex_bytes) as usize > gff.data().len() {
        return None;
    }
    let mut vertices = Vec::with_capacity(vertex_count as usize);
    for _ in 0..vertex_count {
        vertices.push([gff.f32_at(pos), gff.f32_at(pos + 4), gff.f32_at(pos + 8)]);
        pos += 12;
    }

    let face_bytes = face_count.checked_mul(3)?;
    if (pos + face_bytes) as usize > gff.data().len() {
        return None;
    }
    let mut indices = Vec::with_capacity(face_count as usize * 3);
    for _ in 0..face_count {
        indices.push(u32::from(gff.u8_at(pos)));
        indices.push(u32::from(gff.u8_at(pos + 1)));
        indices.push(u32::from(gff.u8_at(pos + 2)));
        pos += 3;
    }

    if vertices.is_empty() {
        return None;
    }
    Some(ShapeKind::Mesh { vertices, indices })
}
