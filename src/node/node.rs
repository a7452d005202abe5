use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Mat4, Quat, Vec3};

use super::{Geometry, NodeCamera};
use crate::picking::{HitTestResult, Ray};

/// Shared handle to a node in the tree.
pub type NodeRef = Rc<RefCell<Node>>;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identity, stable for the node's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

/// A node in the scene tree.
///
/// Position, rotation and scale are relative to the parent. Opacity
/// multiplies down the tree: a child of a half-transparent parent renders at
/// most half opaque.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use parallax::{Geometry, Material, Node, ShaderId, Vec3};
///
/// let box_node = Node::new()
///     .position(Vec3::new(0.0, 0.0, -3.0))
///     .geometry(Geometry::single(Material::new(ShaderId(1))))
///     .into_ref();
///
/// let root = Node::new().child(Rc::clone(&box_node)).into_ref();
/// assert_eq!(root.borrow().children().len(), 1);
/// ```
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    name: Option<String>,
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    opacity: f32,
    hidden: bool,
    geometry: Option<Rc<Geometry>>,
    camera: Option<NodeCamera>,
    children: Vec<NodeRef>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            id: NodeId::next(),
            name: None,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            opacity: 1.0,
            hidden: false,
            geometry: None,
            camera: None,
            children: Vec::new(),
        }
    }
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the node in a shared handle.
    pub fn into_ref(self) -> NodeRef {
        Rc::new(RefCell::new(self))
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn position(mut self, position: impl Into<Vec3>) -> Self {
        self.position = position.into();
        self
    }

    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scale(mut self, scale: impl Into<Vec3>) -> Self {
        self.scale = scale.into();
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(Rc::new(geometry));
        self
    }

    pub fn camera(mut self, camera: NodeCamera) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn child(mut self, child: NodeRef) -> Self {
        self.children.push(child);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn get_position(&self) -> Vec3 {
        self.position
    }

    pub fn get_rotation(&self) -> Quat {
        self.rotation
    }

    pub fn get_scale(&self) -> Vec3 {
        self.scale
    }

    pub fn get_opacity(&self) -> f32 {
        self.opacity
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn get_geometry(&self) -> Option<&Rc<Geometry>> {
        self.geometry.as_ref()
    }

    pub fn get_camera(&self) -> Option<&NodeCamera> {
        self.camera.as_ref()
    }

    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn set_geometry(&mut self, geometry: Option<Rc<Geometry>>) {
        self.geometry = geometry;
    }

    pub fn set_camera(&mut self, camera: Option<NodeCamera>) {
        self.camera = camera;
    }

    pub fn add_child(&mut self, child: NodeRef) {
        self.children.push(child);
    }

    /// Detach `child` (by identity). Returns whether it was a child.
    pub fn remove_child(&mut self, child: &NodeRef) -> bool {
        let before = self.children.len();
        self.children.retain(|c| !Rc::ptr_eq(c, child));
        self.children.len() != before
    }

    /// Parent-relative transform: scale, then rotate, then translate.
    pub fn local_transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Hit test `node` and its descendants, appending to `results`.
///
/// With `bounds_only` the world-space axis-aligned box around the geometry is
/// tested. Otherwise the ray is carried into the node's local space and
/// tested against the geometry's own bounds, which follows rotation exactly.
pub(crate) fn hit_test_node(
    node: &NodeRef,
    ray: &Ray,
    parent_transform: Mat4,
    bounds_only: bool,
    results: &mut Vec<HitTestResult>,
) {
    let borrowed = node.borrow();
    if borrowed.hidden {
        return;
    }
    let world = parent_transform * borrowed.local_transform();

    if let Some(geometry) = &borrowed.geometry {
        let hit = if bounds_only {
            ray.intersect_aabb(&geometry.bounds().transformed(&world))
                .map(|t| ray.point_at(t))
        } else {
            let local_ray = ray.transformed(&world.inverse());
            local_ray
                .intersect_aabb(geometry.bounds())
                .map(|t| world.transform_point3(local_ray.point_at(t)))
        };

        if let Some(point) = hit {
            results.push(HitTestResult {
                node: Rc::clone(node),
                distance: point.distance(ray.origin),
                point,
            });
        }
    }

    for child in &borrowed.children {
        hit_test_node(child, ray, world, bounds_only, results);
    }
}
