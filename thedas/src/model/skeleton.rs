//! Skeleton bones and world-transform resolution
//!
//! Bones arrive from the MMH walk as unordered (name, parent-name) pairs.
//! Parents are resolved to indices in one pass after the whole list exists,
//! then world transforms are computed in strict parent-before-child order.
//! A malformed hierarchy (cycle or dangling parent) must still terminate
//! with every bone processed exactly once, so the ordering falls back to
//! forced progress when a sweep emits nothing.

use glam::{Quat, Vec3};

/// A skeleton bone with local and derived world transforms.
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    /// Parent bone name as stored in the source file; empty for roots.
    pub parent_name: String,
    /// Resolved at load time; `None` for roots and unresolvable parents.
    pub parent_index: Option<usize>,
    pub local_position: Vec3,
    pub local_rotation: Quat,
    pub world_position: Vec3,
    pub world_rotation: Quat,
}

impl Default for Bone {
    fn default() -> Self {
        Self {
            name: String::new(),
            parent_name: String::new(),
            parent_index: None,
            local_position: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            world_position: Vec3::ZERO,
            world_rotation: Quat::IDENTITY,
        }
    }
}

/// An ordered list of bones.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
}

impl Skeleton {
    /// Find a bone by exact name.
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Find a bone by case-insensitive name.
    pub fn find_bone_ci(&self, name: &str) -> Option<usize> {
        self.bones
            .iter()
            .position(|b| b.name.eq_ignore_ascii_case(name))
    }

    /// Resolve every bone's parent name to a parent index. Bones whose
    /// parent name matches nothing become roots.
    pub fn resolve_parents(&mut self) {
        for i in 0..self.bones.len() {
            let parent = if self.bones[i].parent_name.is_empty() {
                None
            } else {
                self.find_bone(&self.bones[i].parent_name.clone())
            };
            self.bones[i].parent_index = parent;
        }
    }

    /// Compute world transforms in parent-before-child order.
    ///
    /// Roots take their local transform as world directly; children compose
    /// as `world_pos = parent.world_pos + rotate(parent.world_rot, local_pos)`
    /// and `world_rot = normalize(parent.world_rot * local_rot)`.
    pub fn compute_world_transforms(&mut self) {
        for idx in processing_order(&self.bones) {
            match self.bones[idx].parent_index {
                None => {
                    self.bones[idx].world_position = self.bones[idx].local_position;
                    self.bones[idx].world_rotation = self.bones[idx].local_rotation;
                }
                Some(p) => {
                    let parent_pos = self.bones[p].world_position;
                    let parent_rot = self.bones[p].world_rotation;
                    let bone = &mut self.bones[idx];
                    bone.world_position = parent_pos + parent_rot * bone.local_position;
                    bone.world_rotation = normalize_or_identity(parent_rot * bone.local_rotation);
                }
            }
        }
    }
}

/// Derive a processing order that places every bone after its parent.
///
/// Repeatedly sweeps the list emitting bones whose parent is already
/// emitted. If a sweep makes no progress (a cycle, or a parent index that
/// can never be satisfied), all remaining bones are emitted in list order -
/// the result always contains every index exactly once.
pub fn processing_order(bones: &[Bone]) -> Vec<usize> {
    let mut order = Vec::with_capacity(bones.len());
    let mut done = vec![false; bones.len()];

    while order.len() < bones.len() {
        let mut any = false;
        for i in 0..bones.len() {
            if done[i] {
                continue;
            }
            let ready = match bones[i].parent_index {
                None => true,
                Some(p) => done.get(p).copied().unwrap_or(true),
            };
            if ready {
                order.push(i);
                done[i] = true;
                any = true;
            }
        }
        if !any {
            // Forced progress: a cycle can never drain on its own.
            for i in 0..bones.len() {
                if !done[i] {
                    order.push(i);
                    done[i] = true;
                }
            }
            break;
        }
    }

    order
}

/// Quaternion product normalization that never yields NaN; degenerate
/// inputs collapse to identity.
pub(crate) fn normalize_or_identity(q: Quat) -> Quat {
    let len_sq = q.length_squared();
    if len_sq > 1.0e-10 {
        q / len_sq.sqrt()
    } else {
        Quat::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bone(name: &str, parent: Option<usize>) -> Bone {
        Bone {
            name: name.to_string(),
            parent_index: parent,
            ..Bone::default()
        }
    }

    #[test]
    fn order_places_parents_first() {
        // Children listed before their parents on purpose
        let bones = vec![
            bone("hand", Some(1)),
            bone("arm", Some(2)),
            bone("root", None),
        ];
        let order = processing_order(&bones);
        assert_eq!(order.len(), 3);
        let pos = |i: usize| order.iter().position(|&x| x == i).unwrap();
        assert!(pos(2) < pos(1));
        assert!(pos(1) < pos(0));
    }

    #[test]
    fn order_survives_cycles() {
        let bones = vec![bone("a", Some(1)), bone("b", Some(0)), bone("c", None)];
        let mut order = processing_order(&bones);
        assert_eq!(order.len(), 3);
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn order_survives_dangling_parent() {
        let bones = vec![bone("a", Some(17)), bone("b", None)];
        let mut order = processing_order(&bones);
        assert_eq!(order.len(), 2);
        order.sort_unstable();
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn world_transforms_compose_down_the_chain() {
        let mut skeleton = Skeleton {
            bones: vec![
                Bone {
                    name: "root".into(),
                    local_position: Vec3::new(1.0, 0.0, 0.0),
                    local_rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
                    ..Bone::default()
                },
                Bone {
                    name: "child".into(),
                    parent_index: Some(0),
                    local_position: Vec3::new(1.0, 0.0, 0.0),
                    ..Bone::default()
                },
            ],
        };
        skeleton.compute_world_transforms();

        let child = &skeleton.bones[1];
        // Parent rotates +X onto +Y before translating
        assert!((child.world_position - Vec3::new(1.0, 1.0, 0.0)).length() < 1.0e-5);
        assert!((child.world_rotation.length() - 1.0).abs() < 1.0e-5);
    }

    #[test]
    fn resolve_parents_rootifies_unknown_names() {
        let mut skeleton = Skeleton {
            bones: vec![
                Bone {
                    name: "a".into(),
                    parent_name: "missing".into(),
                    ..Bone::default()
                },
                Bone {
                    name: "b".into(),
                    parent_name: "a".into(),
                    ..Bone::default()
                },
            ],
        };
        skeleton.resolve_parents();
        assert_eq!(skeleton.bones[0].parent_index, None);
        assert_eq!(skeleton.bones[1].parent_index, Some(0));
    }
}
