//! Name-keyed bone arena and hierarchy ordering

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use super::bone::{AttachmentPoint, Bone, BoneLayer, OriginalBonePosition};
use crate::error::{Result, RigError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Process-wide source of revision stamps
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Bone arena keyed by name
///
/// Parent links are name lookups into the same arena. A parent name that is
/// not present is a dangling reference and the bone is treated as a root.
/// `revision` is a stamp unique across all skeletons, renewed on every edit
/// that can change the processing order. Clones share a stamp until one of
/// them is edited.
#[derive(Debug, Clone)]
pub struct Skeleton {
    bones: IndexMap<String, Bone>,
    revision: u64,
}

impl Default for Skeleton {
    fn default() -> Self {
        Self {
            bones: IndexMap::new(),
            revision: next_revision(),
        }
    }
}

impl Skeleton {
    /// Create an empty skeleton
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a skeleton from bones in any order
    ///
    /// Any parent graph is accepted here, including dangling parents and
    /// cycles; cycles are reported when the processing order is computed.
    pub fn from_bones(bones: impl IntoIterator<Item = Bone>) -> Result<Self> {
        let mut skeleton = Self::new();
        for bone in bones {
            skeleton.insert_unlinked(bone)?;
        }
        skeleton.rebuild_children();
        Ok(skeleton)
    }

    fn insert_unlinked(&mut self, mut bone: Bone) -> Result<()> {
        bone.validate()?;
        if self.bones.contains_key(&bone.name) {
            return Err(RigError::DuplicateName {
                kind: "bone",
                name: bone.name,
            });
        }
        bone.children.clear();
        self.bones.insert(bone.name.clone(), bone);
        Ok(())
    }

    fn rebuild_children(&mut self) {
        let links: Vec<(String, String)> = self
            .bones
            .values()
            .filter_map(|bone| bone.parent.clone().map(|parent| (parent, bone.name.clone())))
            .collect();

        for bone in self.bones.values_mut() {
            bone.children.clear();
        }
        for (parent, child) in links {
            if let Some(parent) = self.bones.get_mut(&parent) {
                parent.children.push(child);
            }
        }
        self.revision = next_revision();
    }

    fn bone_mut(&mut self, name: &str) -> Result<&mut Bone> {
        self.bones
            .get_mut(name)
            .ok_or_else(|| RigError::ReferenceError(format!("no bone named '{name}'")))
    }

    /// Add a bone and link it into the hierarchy
    pub fn add_bone(&mut self, bone: Bone) -> Result<()> {
        self.insert_unlinked(bone)?;
        self.rebuild_children();
        Ok(())
    }

    /// Remove a bone, re-attaching its children to its parent
    pub fn remove_bone(&mut self, name: &str) -> Result<Bone> {
        let removed = self
            .bones
            .shift_remove(name)
            .ok_or_else(|| RigError::ReferenceError(format!("no bone named '{name}'")))?;

        for child in &removed.children {
            if let Some(child) = self.bones.get_mut(child) {
                child.parent.clone_from(&removed.parent);
            }
        }

        self.rebuild_children();
        Ok(removed)
    }

    /// Move a bone under a new parent, or make it a root with `None`
    ///
    /// Fails if the new parent does not exist or is the bone itself or one
    /// of its descendants.
    pub fn reparent(
        &mut self,
        name: &str,
        new_parent: Option<&str>,
        attachment: AttachmentPoint,
    ) -> Result<()> {
        if !self.bones.contains_key(name) {
            return Err(RigError::ReferenceError(format!("no bone named '{name}'")));
        }

        if let Some(parent) = new_parent {
            if !self.bones.contains_key(parent) {
                return Err(RigError::ReferenceError(format!(
                    "cannot attach '{name}' to missing bone '{parent}'"
                )));
            }
            if parent == name || self.is_ancestor(name, parent) {
                return Err(RigError::validation(format!(
                    "attaching '{name}' to '{parent}' would make it its own ancestor"
                )));
            }
        }

        let bone = self.bone_mut(name)?;
        bone.parent = new_parent.map(str::to_string);
        bone.parent_attachment_point = attachment;
        self.rebuild_children();
        Ok(())
    }

    /// Whether `ancestor` appears on the parent chain of `name`
    pub fn is_ancestor(&self, ancestor: &str, name: &str) -> bool {
        let mut current = self.bones.get(name).and_then(|bone| bone.parent.as_deref());
        // Bounded walk so a pre-existing cycle cannot spin forever
        for _ in 0..self.bones.len() {
            match current {
                Some(parent) if parent == ancestor => return true,
                Some(parent) => {
                    current = self.bones.get(parent).and_then(|bone| bone.parent.as_deref());
                }
                None => return false,
            }
        }
        false
    }

    /// Move a bone's rest pose
    pub fn set_rest_pose(&mut self, name: &str, x: f64, y: f64, angle: f64) -> Result<()> {
        let bone = self.bone_mut(name)?;
        bone.x = x;
        bone.y = y;
        bone.angle = angle;
        Ok(())
    }

    pub fn set_length(&mut self, name: &str, length: f64) -> Result<()> {
        if !length.is_finite() || length < 0.0 {
            return Err(RigError::validation(format!(
                "bone '{name}' has invalid length {length}"
            )));
        }
        self.bone_mut(name)?.length = length;
        Ok(())
    }

    pub fn set_layer(&mut self, name: &str, layer: BoneLayer, layer_order: i32) -> Result<()> {
        let bone = self.bone_mut(name)?;
        bone.layer = layer;
        bone.layer_order = layer_order;
        Ok(())
    }

    pub fn set_parent_attachment(&mut self, name: &str, attachment: AttachmentPoint) -> Result<()> {
        self.bone_mut(name)?.parent_attachment_point = attachment;
        Ok(())
    }

    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bones.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bones.contains_key(name)
    }

    /// Bones in insertion order
    pub fn bones(&self) -> impl Iterator<Item = &Bone> {
        self.bones.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bones.keys().map(String::as_str)
    }

    /// Bones without a parent present in the arena
    pub fn roots(&self) -> impl Iterator<Item = &Bone> {
        self.bones.values().filter(|bone| {
            bone.parent
                .as_deref()
                .is_none_or(|parent| !self.bones.contains_key(parent))
        })
    }

    pub fn children(&self, name: &str) -> &[String] {
        self.bones.get(name).map(Bone::children).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Stamp renewed on every structural edit, never shared by two
    /// independently built skeletons
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Snapshot every bone's rest pose
    pub fn capture_original_positions(&self) -> IndexMap<String, OriginalBonePosition> {
        self.bones
            .iter()
            .map(|(name, bone)| (name.clone(), OriginalBonePosition::of(bone)))
            .collect()
    }

    /// Bone names ordered so every parent precedes its children
    ///
    /// Walks each bone's parent chain with an explicit worklist. Reaching a
    /// bone that is still on the current chain is a cycle and fails with
    /// [`RigError::StructuralCycle`].
    pub fn topological_order(&self) -> Result<Vec<String>> {
        let count = self.bones.len();
        let mut marks = vec![Mark::Unvisited; count];
        let mut order = Vec::with_capacity(count);
        let mut chain: Vec<usize> = Vec::new();

        for start in 0..count {
            if marks[start] == Mark::Done {
                continue;
            }

            chain.clear();
            let mut current = Some(start);

            while let Some(index) = current {
                match marks[index] {
                    Mark::Done => break,
                    Mark::InProgress => {
                        let from = chain.iter().position(|&i| i == index).unwrap_or(0);
                        let mut names: Vec<String> =
                            chain[from..].iter().map(|&i| self.name_at(i)).collect();
                        names.push(self.name_at(index));
                        return Err(RigError::StructuralCycle {
                            bone: self.name_at(index),
                            chain: names,
                        });
                    }
                    Mark::Unvisited => {
                        marks[index] = Mark::InProgress;
                        chain.push(index);
                        current = self.parent_index(index);
                    }
                }
            }

            for &index in chain.iter().rev() {
                marks[index] = Mark::Done;
                order.push(self.name_at(index));
            }
        }

        Ok(order)
    }

    fn name_at(&self, index: usize) -> String {
        self.bones
            .get_index(index)
            .map(|(name, _)| name.clone())
            .unwrap_or_default()
    }

    fn parent_index(&self, index: usize) -> Option<usize> {
        let (name, bone) = self.bones.get_index(index)?;
        let parent = bone.parent.as_deref()?;
        let parent_index = self.bones.get_index_of(parent);
        if parent_index.is_none() {
            log::warn!("Bone '{name}' references missing parent '{parent}', treating it as a root");
        }
        parent_index
    }
}
