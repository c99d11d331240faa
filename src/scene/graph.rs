use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::cat::CatModel;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a visual attached to the scene graph. Goes stale once the
    /// node is detached, even if its slot is reused.
    pub struct VisualHandle;
}

/// Placement of a visual in world space. Rotation is XYZ Euler angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        let rot = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rot, self.position)
    }
}

/// A visual in the scene plus the pool member that owns it, if any.
pub struct Node {
    pub transform: Transform,
    pub model: CatModel,
    /// Owning entity, recorded at attach time so hit tests never walk a
    /// hierarchy. Props and decorations have no owner.
    pub owner: Option<hecs::Entity>,
}

/// Flat scene graph: every attached visual is one node.
pub struct SceneGraph {
    nodes: SlotMap<VisualHandle, Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(64),
        }
    }

    pub fn attach(&mut self, model: CatModel, transform: Transform, owner: Option<hecs::Entity>) -> VisualHandle {
        self.nodes.insert(Node {
            transform,
            model,
            owner,
        })
    }

    /// Link a node to the entity that owns it.
    pub fn set_owner(&mut self, handle: VisualHandle, owner: hecs::Entity) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.owner = Some(owner);
        }
    }

    /// Detach and release a node. Stale handles are ignored.
    pub fn detach(&mut self, handle: VisualHandle) -> Option<Node> {
        self.nodes.remove(handle)
    }

    #[cfg(test)]
    pub fn get(&self, handle: VisualHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn transform(&self, handle: VisualHandle) -> Option<&Transform> {
        self.nodes.get(handle).map(|n| &n.transform)
    }

    pub fn transform_mut(&mut self, handle: VisualHandle) -> Option<&mut Transform> {
        self.nodes.get_mut(handle).map(|n| &mut n.transform)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (VisualHandle, &Node)> {
        self.nodes.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
