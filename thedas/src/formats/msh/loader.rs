//! MSH mesh geometry decoding
//!
//! An MSH file is a GFF tree whose root struct points at a raw vertex
//! buffer blob, a raw index buffer blob, and a list of mesh chunk structs
//! describing slices of those blobs.

use tracing::debug;

use super::vertex::{self, usage, VertexDataType};
use crate::error::Result;
use crate::formats::gff::{labels, parse_gff_bytes};
use crate::model::{Mesh, Model, Vertex};

/// One stream picked out of the vertex declarator.
#[derive(Debug, Clone, Copy)]
struct StreamDesc {
    offset: u32,
    data_type: VertexDataType,
}

/// Decode the meshes of an MSH file.
///
/// A file with no mesh chunks yields a model with an empty mesh list, not
/// an error. Chunks with zero vertices/indices/stride or without a
/// position stream are skipped.
///
/// # Errors
/// Returns an error only for structural GFF failures (short buffer, bad
/// magic, out-of-bounds struct/field tables).
pub fn load_msh(data: Vec<u8>) -> Result<Model> {
    let gff = parse_gff_bytes(data)?;
    let mut model = Model::default();

    let vertex_buffer_offset = gff.list_data_offset(0, labels::VERTEX_BUFFER, 0);
    let index_buffer_offset = gff.list_data_offset(0, labels::INDEX_BUFFER, 0);

    let chunks = gff.read_struct_list(0, labels::MESH_CHUNKS, 0);
    for chunk in chunks {
        let mut mesh = Mesh {
            name: gff.read_string(chunk.struct_index, labels::NAME, chunk.offset),
            ..Mesh::default()
        };
        if mesh.name.is_empty() {
            mesh.name = format!("chunk_{}", model.meshes.len());
        }

        let vertex_size = gff.read_u32(chunk.struct_index, labels::VERTEX_SIZE, chunk.offset);
        let vertex_count = gff.read_u32(chunk.struct_index, labels::VERTEX_COUNT, chunk.offset);
        let index_count = gff.read_u32(chunk.struct_index, labels::INDEX_COUNT, chunk.offset);
        let index_format = gff.read_u32(chunk.struct_index, labels::INDEX_FORMAT, chunk.offset);
        let vertex_offset = gff.read_u32(chunk.struct_index, labels::VERTEX_OFFSET, chunk.offset);
        let index_offset = gff.read_u32(chunk.struct_index, labels::INDEX_OFFSET, chunk.offset);

        if vertex_count == 0 || index_count == 0 || vertex_size == 0 {
            debug!(chunk = %mesh.name, "skipping empty mesh chunk");
            continue;
        }

        // Pick the first stream of each usage we decode
        let mut position: Option<StreamDesc> = None;
        let mut normal: Option<StreamDesc> = None;
        let mut texcoord: Option<StreamDesc> = None;
        let mut blend_weight: Option<StreamDesc> = None;
        let mut blend_indices: Option<StreamDesc> = None;

        let decls = gff.read_struct_list(chunk.struct_index, labels::VERTEX_DECLARATOR, chunk.offset);
        for decl in decls {
            let stream_usage = gff.read_u32(decl.struct_index, labels::DECL_USAGE, decl.offset);
            let desc = StreamDesc {
                offset: gff.read_u32(decl.struct_index, labels::DECL_OFFSET, decl.offset),
                data_type: VertexDataType::from_u32(gff.read_u32(
                    decl.struct_index,
                    labels::DECL_DATA_TYPE,
                    decl.offset,
                )),
            };
            let slot = match stream_usage {
                usage::POSITION => &mut position,
                usage::NORMAL => &mut normal,
                usage::TEXCOORD => &mut texcoord,
                usage::BLEND_WEIGHT => &mut blend_weight,
                usage::BLEND_INDICES => &mut blend_indices,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(desc);
            }
        }

        let Some(position) = position else {
            debug!(chunk = %mesh.name, "skipping mesh chunk without position stream");
            continue;
        };

        // Both blobs are count-prefixed: skip 4 bytes to the payload
        let vertex_data_base = gff.data_offset() + vertex_buffer_offset + 4 + vertex_offset;
        let mut index_data_base = gff.data_offset() + index_buffer_offset + 4;
        if index_format == 0 {
            index_data_base += index_offset * 2;
        } else {
            index_data_base += index_offset * 4;
        }

        mesh.has_skinning = blend_weight.is_some() && blend_indices.is_some();

        // A corrupt count cannot describe more records than the buffer holds
        let buffer_len = gff.data().len() as u32;
        let vertex_count = vertex_count
            .min(buffer_len.saturating_sub(vertex_data_base).div_ceil(vertex_size));
        let index_width = if index_format == 0 { 2 } else { 4 };
        let index_count = index_count
            .min(buffer_len.saturating_sub(index_data_base).div_ceil(index_width));

        mesh.vertices.reserve(vertex_count as usize);
        for i in 0..vertex_count {
            let base = vertex_data_base + i * vertex_size;
            let mut v = Vertex::default();

            let p = vertex::decode_attribute(gff.data(), base + position.offset, position.data_type);
            v.position = [p[0], p[1], p[2]];

            if let Some(normal) = normal {
                let n = vertex::decode_attribute(gff.data(), base + normal.offset, normal.data_type);
                v.normal = [n[0], n[1], n[2]];
            } else {
                v.normal = [0.0, 1.0, 0.0];
            }

            if let Some(texcoord) = texcoord {
                let t =
                    vertex::decode_attribute(gff.data(), base + texcoord.offset, texcoord.data_type);
                // Flip V to the renderer's texture coordinate convention
                v.uv = [t[0], 1.0 - t[1]];
            }

            if let (Some(w), Some(bi)) = (blend_weight, blend_indices) {
                v.bone_weights = vertex::decode_attribute(gff.data(), base + w.offset, w.data_type);
                v.bone_indices =
                    vertex::decode_blend_indices(gff.data(), base + bi.offset, bi.data_type);
            }

            mesh.vertices.push(v);
        }

        mesh.indices.reserve(index_count as usize);
        for i in 0..index_count {
            let idx = if index_format == 0 {
                u32::from(gff.u16_at(index_data_base + i * 2))
            } else {
                gff.u32_at(index_data_base + i * 4)
            };
            mesh.indices.push(idx);
        }

        mesh.recalculate_bounds();
        model.meshes.push(mesh);
    }

    Ok(model)
}
