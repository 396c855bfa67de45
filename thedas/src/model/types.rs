//! Model, mesh, material, collision and animation data types

use glam::{Quat, Vec3};

use super::skeleton::Skeleton;

/// Maximum number of bone influences per vertex.
pub const MAX_BONES_PER_VERTEX: usize = 4;

/// A decoded vertex with all attributes this library extracts.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Skinning weights; all zero when the mesh carries no skinning data.
    pub bone_weights: [f32; MAX_BONES_PER_VERTEX],
    /// Bone-local indices into the mesh's bones-used list, -1 when unused.
    /// Resolving these to skeleton bone indices is the renderer's job.
    pub bone_indices: [i32; MAX_BONES_PER_VERTEX],
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            normal: [0.0; 3],
            uv: [0.0; 2],
            bone_weights: [0.0; MAX_BONES_PER_VERTEX],
            bone_indices: [-1; MAX_BONES_PER_VERTEX],
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Bounds of a vertex set; the default (zero) box for an empty set.
    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        let Some(first) = vertices.first() else {
            return Self::default();
        };
        let mut min = Vec3::from_array(first.position);
        let mut max = min;
        for v in vertices {
            let p = Vec3::from_array(v.position);
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }

    pub fn radius(&self) -> f32 {
        (self.max - self.min).length() / 2.0
    }
}

/// One decoded mesh chunk.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    /// Material object name, joined from the MMH hierarchy.
    pub material_name: String,
    /// Index into [`Model::materials`] once materials are attached.
    pub material_index: Option<usize>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Skeleton bone indices referenced by this mesh's skinning data,
    /// in bone-local index order (from the MMH `mshh` binding).
    pub bones_used: Vec<i32>,
    /// Set when both blend-weight and blend-index vertex streams were found.
    pub has_skinning: bool,
    pub bounds: Aabb,
}

impl Mesh {
    pub fn recalculate_bounds(&mut self) {
        self.bounds = Aabb::from_vertices(&self.vertices);
    }
}

/// A material binding: texture resource names only, no texture data.
#[derive(Debug, Clone, Default)]
pub struct Material {
    pub name: String,
    pub diffuse_map: String,
    pub normal_map: String,
    pub specular_map: String,
    pub tint_map: String,
}

/// Shape-specific collision payload.
#[derive(Debug, Clone)]
pub enum ShapeKind {
    /// Box with half-extents per axis.
    Box { half_extents: [f32; 3] },
    Sphere { radius: f32 },
    Capsule { radius: f32, height: f32 },
    /// Embedded convex mesh with local vertices and triangle indices.
    Mesh {
        vertices: Vec<[f32; 3]>,
        indices: Vec<u32>,
    },
}

/// A collision shape attached to a skeleton bone.
#[derive(Debug, Clone)]
pub struct CollisionShape {
    pub name: String,
    pub kind: ShapeKind,
    /// Model-space position, composed with the owning bone's world
    /// transform at load time when the bone resolved.
    pub position: Vec3,
    pub rotation: Quat,
    /// Set when no owning bone resolved: the stored values are used as-is
    /// and mesh-type shape vertices are already in world space.
    pub world_space: bool,
}

/// A decoded model: meshes, skeleton, materials and collision shapes.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub collision_shapes: Vec<CollisionShape>,
    pub skeleton: Skeleton,
    /// Skinning bone-index table from the MMH hierarchy: maps a bone index
    /// slot to the bone's name (empty string for unassigned slots).
    pub bone_index_names: Vec<String>,
}

impl Model {
    /// Find a material by exact name.
    pub fn find_material(&self, name: &str) -> Option<usize> {
        self.materials.iter().position(|m| m.name == name)
    }

    /// Re-derive per-mesh material indices from their material names.
    pub fn bind_materials(&mut self) {
        for i in 0..self.meshes.len() {
            if self.meshes[i].material_name.is_empty() {
                continue;
            }
            let idx = self.find_material(&self.meshes[i].material_name.clone());
            self.meshes[i].material_index = idx;
        }
    }
}

/// Track payload kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Rotation,
    Translation,
}

/// One animation keyframe: a time in seconds and either a unit quaternion
/// (x, y, z, w) or a translation vector packed into the same four floats.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimKeyframe {
    pub time: f32,
    pub value: [f32; 4],
}

/// A keyframe track bound to one bone.
#[derive(Debug, Clone)]
pub struct AnimTrack {
    /// Bone name with the `_rotation`/`_translation` suffix stripped.
    pub bone_name: String,
    /// Resolved index into the skeleton, once
    /// [`Animation::resolve_bone_indices`] has run.
    pub bone_index: Option<usize>,
    pub kind: TrackKind,
    /// Keyframes in source order, which is already time-ordered.
    pub keyframes: Vec<AnimKeyframe>,
}

/// A decoded animation.
#[derive(Debug, Clone, Default)]
pub struct Animation {
    pub name: String,
    /// The archive entry or file name the animation came from.
    pub source_name: String,
    /// Duration in seconds; never zero (defaults to 1.0 when the source
    /// omits it), so keyframe time normalization cannot divide by zero.
    pub duration: f32,
    pub tracks: Vec<AnimTrack>,
}

impl Animation {
    /// Bind tracks to skeleton bones by name, exact match first and
    /// case-insensitive second. Unmatched tracks keep `bone_index: None`.
    pub fn resolve_bone_indices(&mut self, skeleton: &Skeleton) {
        for track in &mut self.tracks {
            track.bone_index = skeleton
                .find_bone(&track.bone_name)
                .or_else(|| skeleton.find_bone_ci(&track.bone_name));
        }
    }
}
