//! Decoded model data structures
//!
//! These types are the library's only interface to downstream consumers
//! (renderers, exporters): meshes with decoded vertex/index data, a bone
//! skeleton with resolved world transforms, material bindings and collision
//! shapes. No particular serialization is mandated.

mod skeleton;
mod types;

pub use skeleton::{processing_order, Bone, Skeleton};
pub use types::{
    Aabb, AnimKeyframe, AnimTrack, Animation, CollisionShape, Material, Mesh, Model, ShapeKind,
    TrackKind, Vertex, MAX_BONES_PER_VERTEX,
};
