//! Field label conventions for GFF files
//!
//! GFF field labels are plain 32-bit integers with fixed, documented
//! meanings per struct-type context. They are the format's schema: a label
//! absent from a struct's field list is an ordinary optional field, never
//! an error. The subset below covers everything this crate decodes.

// ==================== Common ====================
/// Chunk name (in MSH mesh chunks).
pub const NAME: u32 = 2;
/// Node name (in MMH/PHY `node` structs).
pub const NODE_NAME: u32 = 6000;
/// Material object name (in MMH `mshh` structs).
pub const MATERIAL_NAME: u32 = 6001;
/// Mesh name reference (in MMH `mshh` structs).
pub const MESH_NAME: u32 = 6006;
/// Generic child-struct list, present on most tree nodes.
pub const CHILDREN: u32 = 6999;

// ==================== MMH node transforms ====================
/// Local translation, 3 floats (in a `trsl` child struct).
pub const TRANSLATION: u32 = 6047;
/// Local rotation quaternion, 4 floats (in a `rota` child struct).
pub const ROTATION: u32 = 6048;
/// Skinning bone index of a node.
pub const BONE_INDEX: u32 = 6254;
/// Bones-used index list of a `mshh` binding.
pub const BONES_USED: u32 = 6255;

// ==================== PHY collision ====================
/// Shape rotation quaternion, 4 floats.
pub const SHAPE_ROTATION: u32 = 6060;
/// Shape position, 3 floats.
pub const SHAPE_POSITION: u32 = 6061;
/// Box half-extents, 3 floats (in a `boxs` payload).
pub const BOX_EXTENTS: u32 = 6071;
/// Sphere/capsule radius (in `sphs`/`caps` payloads).
pub const SHAPE_RADIUS: u32 = 6072;
/// Capsule height (in a `caps` payload).
pub const SHAPE_HEIGHT: u32 = 6073;
/// Embedded convex mesh blob (in a `mshs` payload).
pub const SHAPE_MESH_DATA: u32 = 6077;
/// Collision shape name.
pub const SHAPE_NAME: u32 = 6241;
/// Shape payload reference (box/sphere/capsule/mesh struct).
pub const SHAPE_PAYLOAD: u32 = 6998;

// ==================== ANI animation ====================
/// Track node name ("<bone>_rotation" / "<bone>_translation").
pub const TRACK_NAME: u32 = 4000;
/// Keyframe payload packing selector ("target").
pub const TRACK_TARGET: u32 = 4001;
/// Keyframe data reference (on a track node) and keyframe list (on the
/// referenced struct) share this label.
pub const KEY_DATA: u32 = 4004;
/// Track node list on the ANI root.
pub const NODE_LIST: u32 = 4005;
/// Animation name, alternate label.
pub const ANIM_NAME_ALT: u32 = 4006;
/// Animation name.
pub const ANIM_NAME: u32 = 4007;
/// Animation duration in seconds.
pub const DURATION: u32 = 4009;
/// Keyframe time as a 16-bit fraction of the duration.
pub const KEY_TIME: u32 = 4035;
/// Keyframe payload component 0.
pub const KEY_DATA0: u32 = 4036;
/// Keyframe payload component 1.
pub const KEY_DATA1: u32 = 4037;
/// Keyframe payload component 2.
pub const KEY_DATA2: u32 = 4038;

// ==================== MSH root ====================
/// Mesh chunk list.
pub const MESH_CHUNKS: u32 = 8021;
/// Vertex buffer blob.
pub const VERTEX_BUFFER: u32 = 8022;
/// Index buffer blob.
pub const INDEX_BUFFER: u32 = 8023;

// ==================== MSH chunk ====================
/// Size of one vertex record in bytes.
pub const VERTEX_SIZE: u32 = 8000;
/// Number of vertices in the chunk.
pub const VERTEX_COUNT: u32 = 8001;
/// Number of indices in the chunk.
pub const INDEX_COUNT: u32 = 8002;
/// Primitive topology (triangle list in all observed files).
pub const PRIMITIVE_TYPE: u32 = 8003;
/// Index width: 0 = 16-bit, nonzero = 32-bit.
pub const INDEX_FORMAT: u32 = 8004;
/// Base vertex index.
pub const BASE_VERTEX_INDEX: u32 = 8005;
/// Byte offset of the chunk's vertices within the vertex buffer.
pub const VERTEX_OFFSET: u32 = 8006;
/// Smallest index used by the chunk.
pub const MIN_INDEX: u32 = 8007;
/// Number of vertices referenced by the chunk's indices.
pub const REFERENCED_VERTS: u32 = 8008;
/// Index offset of the chunk within the index buffer (in indices).
pub const INDEX_OFFSET: u32 = 8009;
/// Vertex declarator list.
pub const VERTEX_DECLARATOR: u32 = 8025;

// ==================== MSH vertex declarator ====================
/// Stream number of a declarator entry.
pub const DECL_STREAM: u32 = 8026;
/// Byte offset of the attribute within one vertex record.
pub const DECL_OFFSET: u32 = 8027;
/// Packed data type code of the attribute.
pub const DECL_DATA_TYPE: u32 = 8028;
/// Semantic usage of the attribute.
pub const DECL_USAGE: u32 = 8029;
/// Usage index (e.g. which texcoord set).
pub const DECL_USAGE_INDEX: u32 = 8030;
