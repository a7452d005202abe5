//! Draw-order records produced by scene traversal.

use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::node::{Geometry, Material, NodeId, ShaderId};

/// Identifies one drawable (node + geometry element) and its state group.
///
/// Keys are regenerated every frame. The scene orders them by
/// [`shader`](Self::shader) alone, with a stable sort, so draws sharing a
/// shader are contiguous and keep their traversal order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub node: NodeId,
    pub element_index: usize,
    pub shader: ShaderId,
    /// Coarse distance from the camera, see [`distance_class`].
    pub distance_class: u16,
}

/// Power-of-two distance bucket: 0 within one unit of the camera, then one
/// class per doubling. Lets a driver order draws front-to-back inside a
/// shader batch without exact depths.
pub fn distance_class(distance: f32) -> u16 {
    if distance.is_nan() || distance <= 1.0 {
        return 0;
    }
    distance.log2().ceil().min(f32::from(u16::MAX)) as u16
}

/// One entry of a scene's sorted draw list.
#[derive(Clone, Debug)]
pub struct DrawCall {
    pub key: SortKey,
    /// Node-to-world transform accumulated down the tree.
    pub world_transform: Mat4,
    /// Opacity accumulated down the tree, including the scene's own.
    pub opacity: f32,
    pub geometry: Rc<Geometry>,
}

impl DrawCall {
    /// Material for this call's element.
    pub fn material(&self) -> Option<&Rc<Material>> {
        self.geometry.material_for_element(self.key.element_index)
    }

    pub fn world_position(&self) -> Vec3 {
        self.world_transform.w_axis.truncate()
    }
}
