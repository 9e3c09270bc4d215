//! Skeleton descriptions and validated skeletons.
//!
//! A [`SkeletonDefinition`] is the raw ordered bone list handed over by the
//! asset or streaming layer. [`Skeleton::from_definition`] validates it once;
//! everything downstream works on the validated form and addresses bones by
//! their position in the list ([`BoneIndex`]).

use std::collections::HashMap;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{RetargetError, RetargetResult};

/// Stable integer id of a bone, as assigned by the skeleton's producer.
pub type BoneId = i32;

/// Position of a bone in its skeleton's declared order.
pub type BoneIndex = usize;

/// Parent id marking a bone attached directly to the skeleton origin.
pub const ROOT_PARENT_ID: BoneId = 0;

// =============================================================================
// Definitions
// =============================================================================

/// One bone of a skeleton description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoneDefinition {
    /// Stable bone id. Must be non-zero and unique within the skeleton.
    pub id: BoneId,
    /// Display name matched against naming tables.
    pub name: String,
    /// Parent bone id, or [`ROOT_PARENT_ID`].
    #[serde(default)]
    pub parent_id: BoneId,
    /// Local offset from the parent joint.
    #[serde(default)]
    pub offset: Vec3,
    /// Local rest rotation `[x, y, z, w]`.
    #[serde(default)]
    pub rest_rotation: Quat,
}

impl BoneDefinition {
    /// Creates a bone with zero offset and identity rest rotation.
    pub fn new(id: BoneId, name: impl Into<String>, parent_id: BoneId) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
            offset: Vec3::ZERO,
            rest_rotation: Quat::IDENTITY,
        }
    }

    /// Sets the local offset.
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the local rest rotation.
    pub fn with_rest_rotation(mut self, rotation: Quat) -> Self {
        self.rest_rotation = rotation;
        self
    }
}

/// An ordered skeleton description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkeletonDefinition {
    /// Skeleton name, used in error reports.
    pub name: String,
    /// Bones in declared order. Parents precede their children.
    pub bones: Vec<BoneDefinition>,
}

impl SkeletonDefinition {
    /// Creates an empty description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bones: Vec::new(),
        }
    }

    /// Appends a bone.
    pub fn with_bone(mut self, bone: BoneDefinition) -> Self {
        self.bones.push(bone);
        self
    }

    /// Parses a description from JSON.
    pub fn from_json(json: &str) -> RetargetResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the description to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> RetargetResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// =============================================================================
// Validated skeleton
// =============================================================================

/// A bone of a validated skeleton.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    /// Stable bone id.
    pub id: BoneId,
    /// Display name.
    pub name: String,
    /// Parent index, `None` for bones attached to the origin.
    pub parent: Option<BoneIndex>,
    /// Local offset from the parent joint.
    pub offset: Vec3,
    /// Local rest rotation.
    pub rest_rotation: Quat,
}

/// A validated skeleton.
///
/// Ids are non-zero and unique, and every parent is declared before its
/// children, so the hierarchy is acyclic by construction. Rest rotations are
/// finite and non-zero, and offsets are finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    name: String,
    bones: Vec<Bone>,
    index_by_id: HashMap<BoneId, BoneIndex>,
}

impl Skeleton {
    /// Validates a description.
    pub fn from_definition(definition: &SkeletonDefinition) -> RetargetResult<Self> {
        let name = definition.name.clone();
        let mut bones = Vec::with_capacity(definition.bones.len());
        let mut index_by_id = HashMap::with_capacity(definition.bones.len());

        for (index, bone) in definition.bones.iter().enumerate() {
            if bone.id == ROOT_PARENT_ID {
                return Err(RetargetError::ReservedBoneId {
                    skeleton: name,
                    bone: bone.name.clone(),
                });
            }
            if index_by_id.contains_key(&bone.id) {
                return Err(RetargetError::DuplicateBoneId {
                    skeleton: name,
                    id: bone.id,
                });
            }

            let rest = bone.rest_rotation;
            if !rest.is_finite() || rest.length_squared() < 1e-6 || !bone.offset.is_finite() {
                return Err(RetargetError::InvalidRestTransform {
                    skeleton: name,
                    bone: bone.name.clone(),
                });
            }

            let parent = if bone.parent_id == ROOT_PARENT_ID {
                None
            } else {
                match index_by_id.get(&bone.parent_id) {
                    Some(&parent) => Some(parent),
                    None => {
                        return Err(RetargetError::UnknownParent {
                            skeleton: name,
                            bone: bone.name.clone(),
                            parent_id: bone.parent_id,
                        })
                    }
                }
            };

            index_by_id.insert(bone.id, index);
            bones.push(Bone {
                id: bone.id,
                name: bone.name.clone(),
                parent,
                offset: bone.offset,
                rest_rotation: bone.rest_rotation,
            });
        }

        Ok(Self {
            name,
            bones,
            index_by_id,
        })
    }

    /// Skeleton name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of bones.
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Returns true when the skeleton has no bones.
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Bones in declared order.
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Returns the bone at `index`.
    pub fn bone(&self, index: BoneIndex) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// Returns the parent of the bone at `index`.
    pub fn parent(&self, index: BoneIndex) -> Option<BoneIndex> {
        self.bones.get(index).and_then(|bone| bone.parent)
    }

    /// Returns the index of the bone with `id`.
    pub fn index_of_id(&self, id: BoneId) -> Option<BoneIndex> {
        self.index_by_id.get(&id).copied()
    }

    /// Returns the first bone named `name` in declared order.
    pub fn find_by_name(&self, name: &str) -> Option<BoneIndex> {
        self.bones.iter().position(|bone| bone.name == name)
    }

    /// Returns every bone named `name` in declared order.
    pub fn indices_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = BoneIndex> + 'a {
        self.bones
            .iter()
            .enumerate()
            .filter(move |(_, bone)| bone.name == name)
            .map(|(index, _)| index)
    }

    /// Replaces the rest rotation of the bone at `index`.
    pub fn set_rest_rotation(&mut self, index: BoneIndex, rotation: Quat) {
        if let Some(bone) = self.bones.get_mut(index) {
            bone.rest_rotation = rotation;
        }
    }
}
