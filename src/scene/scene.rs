//! Node container and draw ordering.

use std::rc::Rc;

use glam::{Mat4, Vec3};
use log::trace;

use crate::animation::AnimatedValue;
use crate::context::RenderContext;
use crate::driver::Driver;
use crate::node::{NodeRef, ShaderId, TextureId, hit_test_node};
use crate::picking::{HitTestResult, Ray};
use crate::sort_key::{DrawCall, SortKey, distance_class};

use super::background::Background;

/// Transform and opacity stacks threaded through a traversal.
struct RenderParameters {
    transforms: Vec<Mat4>,
    opacities: Vec<f32>,
}

impl RenderParameters {
    fn new(root_opacity: f32) -> Self {
        Self {
            transforms: vec![Mat4::IDENTITY],
            opacities: vec![root_opacity],
        }
    }

    fn transform(&self) -> Mat4 {
        self.transforms.last().copied().unwrap_or(Mat4::IDENTITY)
    }

    fn opacity(&self) -> f32 {
        self.opacities.last().copied().unwrap_or(1.0)
    }

    fn push(&mut self, transform: Mat4, opacity: f32) {
        self.transforms.push(transform);
        self.opacities.push(opacity);
    }

    fn pop(&mut self) {
        self.transforms.pop();
        self.opacities.pop();
    }
}

/// Root nodes, an optional background, and the frame's sorted draw list.
///
/// A scene has no transition state of its own; crossfades are driven by the
/// owning [`SceneController`](super::SceneController) through
/// [`opacity`](Self::opacity).
#[derive(Debug)]
pub struct Scene {
    nodes: Vec<NodeRef>,
    background: Option<Background>,
    draws: Vec<DrawCall>,
    opacity: AnimatedValue,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            background: None,
            draws: Vec::new(),
            opacity: AnimatedValue::new(1.0),
        }
    }

    /// Append a root node. Roots are traversed in insertion order.
    pub fn add_node(&mut self, node: NodeRef) {
        self.nodes.push(node);
    }

    /// Detach a root node by identity. Returns whether it was a root.
    pub fn remove_node(&mut self, node: &NodeRef) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| !Rc::ptr_eq(n, node));
        self.nodes.len() != before
    }

    pub fn root_nodes(&self) -> &[NodeRef] {
        &self.nodes
    }

    pub fn set_background_cube(&mut self, texture: TextureId) {
        self.background = Some(Background::cube(texture));
    }

    pub fn set_background_sphere(&mut self, texture: TextureId) {
        self.background = Some(Background::sphere(texture));
    }

    pub fn clear_background(&mut self) {
        self.background = None;
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// Opacity applied on top of every node, animated during transitions.
    pub fn opacity(&self) -> &AnimatedValue {
        &self.opacity
    }

    /// The draw list produced by the last [`update_sort_keys`](Self::update_sort_keys).
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn sort_keys(&self) -> impl Iterator<Item = &SortKey> {
        self.draws.iter().map(|d| &d.key)
    }

    /// Rebuild the draw list from the node tree.
    ///
    /// Every visible element contributes one [`DrawCall`]; the list is then
    /// stably sorted by shader so equal shaders are contiguous and keep
    /// traversal order. The previous list's storage is reused.
    pub fn update_sort_keys(&mut self, context: &RenderContext) {
        self.draws.clear();

        let camera_position = context.camera().position();
        let mut params = RenderParameters::new(self.opacity.get());
        for node in &self.nodes {
            collect_draws(node, &mut params, camera_position, &mut self.draws);
        }

        self.draws.sort_by_key(|d| d.key.shader);
        trace!(
            "frame {}: {} draw(s) in scene",
            context.frame(),
            self.draws.len()
        );
    }

    /// Draw the background, if any, centered on the camera.
    pub fn render_background(&self, context: &RenderContext, driver: &mut dyn Driver) {
        let Some(background) = &self.background else {
            return;
        };
        driver.bind_material(&background.material, context);
        let transform = Mat4::from_translation(context.camera().position());
        driver.draw_background(background, transform, context);
    }

    /// Issue the sorted draw list, binding materials only on shader change.
    pub fn render(&self, context: &RenderContext, driver: &mut dyn Driver) {
        let mut bound: Option<ShaderId> = None;
        for call in &self.draws {
            let Some(material) = call.material() else {
                continue;
            };
            if bound != Some(call.key.shader) {
                driver.bind_material(material, context);
                bound = Some(call.key.shader);
            }
            driver.draw(call, context);
        }
    }

    /// Cast a ray from the camera along `direction` through every node.
    ///
    /// Results from all nodes are returned in traversal order, unsorted.
    pub fn hit_test(
        &self,
        direction: Vec3,
        context: &RenderContext,
        bounds_only: bool,
    ) -> Vec<HitTestResult> {
        let ray = Ray::new(context.camera().position(), direction);
        let mut results = Vec::new();
        for node in &self.nodes {
            hit_test_node(node, &ray, Mat4::IDENTITY, bounds_only, &mut results);
        }
        results
    }
}

fn collect_draws(
    node: &NodeRef,
    params: &mut RenderParameters,
    camera_position: Vec3,
    draws: &mut Vec<DrawCall>,
) {
    let node = node.borrow();
    if node.is_hidden() {
        return;
    }
    let opacity = params.opacity() * node.get_opacity();
    if opacity <= 0.0 {
        return;
    }
    let world = params.transform() * node.local_transform();

    if let Some(geometry) = node.get_geometry() {
        let class = distance_class(world.w_axis.truncate().distance(camera_position));
        for element in 0..geometry.element_count() {
            let Some(material) = geometry.material_for_element(element) else {
                continue;
            };
            draws.push(DrawCall {
                key: SortKey {
                    node: node.id(),
                    element_index: element,
                    shader: material.shader,
                    distance_class: class,
                },
                world_transform: world,
                opacity,
                geometry: Rc::clone(geometry),
            });
        }
    }

    params.push(world, opacity);
    for child in node.children() {
        collect_draws(child, params, camera_position, draws);
    }
    params.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_sync::FrameSynchronizer;
    use crate::node::{Geometry, Material, Node};
    use crate::testing::{DriverEvent, RecordingDriver};
    use approx::assert_relative_eq;

    fn context() -> RenderContext {
        RenderContext::new(Rc::new(FrameSynchronizer::new()))
    }

    fn mesh(shader: u32) -> Geometry {
        Geometry::single(Material::new(ShaderId(shader)))
    }

    fn shaders(scene: &Scene) -> Vec<u32> {
        scene.sort_keys().map(|k| k.shader.0).collect()
    }

    #[test]
    fn equal_shaders_are_contiguous_and_stable() {
        let mut scene = Scene::new();
        let ids: Vec<_> = [2, 1, 2, 3, 1, 2]
            .into_iter()
            .map(|shader| {
                let node = Node::new().geometry(mesh(shader)).into_ref();
                let id = node.borrow().id();
                scene.add_node(node);
                (shader, id)
            })
            .collect();

        scene.update_sort_keys(&context());

        assert_eq!(shaders(&scene), vec![1, 1, 2, 2, 2, 3]);
        let twos: Vec<_> = scene
            .sort_keys()
            .filter(|k| k.shader == ShaderId(2))
            .map(|k| k.node)
            .collect();
        let expected: Vec<_> = ids.iter().filter(|(s, _)| *s == 2).map(|(_, id)| *id).collect();
        assert_eq!(twos, expected);
    }

    #[test]
    fn multi_material_geometry_emits_one_key_per_element() {
        let geometry = Geometry::new(
            3,
            vec![
                Rc::new(Material::new(ShaderId(5))),
                Rc::new(Material::new(ShaderId(4))),
            ],
        );
        let mut scene = Scene::new();
        scene.add_node(Node::new().geometry(geometry).into_ref());
        scene.update_sort_keys(&context());

        let keys: Vec<_> = scene
            .sort_keys()
            .map(|k| (k.shader.0, k.element_index))
            .collect();
        assert_eq!(keys, vec![(4, 1), (5, 0), (5, 2)]);
    }

    #[test]
    fn transform_and_opacity_accumulate_down_the_tree() {
        let child = Node::new()
            .position([0.0, 1.0, 0.0])
            .opacity(0.5)
            .geometry(mesh(1))
            .into_ref();
        let parent = Node::new()
            .position([2.0, 0.0, 0.0])
            .scale([2.0, 2.0, 2.0])
            .opacity(0.5)
            .child(child)
            .into_ref();
        let mut scene = Scene::new();
        scene.add_node(parent);
        scene.update_sort_keys(&context());

        let call = &scene.draws()[0];
        assert_relative_eq!(call.world_position(), Vec3::new(2.0, 2.0, 0.0));
        assert_relative_eq!(call.opacity, 0.25);
    }

    #[test]
    fn hidden_and_transparent_subtrees_are_skipped() {
        let hidden = Node::new()
            .geometry(mesh(1))
            .child(Node::new().geometry(mesh(1)).into_ref())
            .into_ref();
        hidden.borrow_mut().set_hidden(true);
        let transparent = Node::new()
            .opacity(0.0)
            .child(Node::new().geometry(mesh(2)).into_ref())
            .into_ref();
        let visible = Node::new().geometry(mesh(3)).into_ref();

        let mut scene = Scene::new();
        scene.add_node(hidden);
        scene.add_node(transparent);
        scene.add_node(visible);
        scene.update_sort_keys(&context());

        assert_eq!(shaders(&scene), vec![3]);
    }

    #[test]
    fn scene_opacity_scales_every_draw() {
        let mut scene = Scene::new();
        scene.add_node(Node::new().opacity(0.5).geometry(mesh(1)).into_ref());
        scene.opacity().set(0.5);
        scene.update_sort_keys(&context());
        assert_relative_eq!(scene.draws()[0].opacity, 0.25);

        scene.opacity().set(0.0);
        scene.update_sort_keys(&context());
        assert!(scene.draws().is_empty());
    }

    #[test]
    fn draw_buffer_is_reused() {
        let mut scene = Scene::new();
        for shader in 0..8 {
            scene.add_node(Node::new().geometry(mesh(shader)).into_ref());
        }
        let ctx = context();
        scene.update_sort_keys(&ctx);
        let capacity = scene.draws.capacity();
        let ptr = scene.draws.as_ptr();

        scene.update_sort_keys(&ctx);
        assert_eq!(scene.draws().len(), 8);
        assert_eq!(scene.draws.capacity(), capacity);
        assert_eq!(scene.draws.as_ptr(), ptr);
    }

    #[test]
    fn render_binds_only_on_shader_change() {
        let mut scene = Scene::new();
        for shader in [1, 2, 1, 1, 2] {
            scene.add_node(Node::new().geometry(mesh(shader)).into_ref());
        }
        let ctx = context();
        scene.update_sort_keys(&ctx);

        let mut driver = RecordingDriver::default();
        scene.render(&ctx, &mut driver);

        assert_eq!(driver.binds(), 2);
        assert_eq!(driver.draws(), 5);
        assert!(matches!(driver.events[0], DriverEvent::Bind(ShaderId(1))));
        assert!(matches!(driver.events[4], DriverEvent::Bind(ShaderId(2))));
    }

    #[test]
    fn shared_shader_keeps_per_element_materials() {
        let mut scene = Scene::new();
        for texture in [10, 20] {
            let material = Material::new(ShaderId(1)).diffuse(TextureId(texture));
            scene.add_node(Node::new().geometry(Geometry::single(material)).into_ref());
        }
        let ctx = context();
        scene.update_sort_keys(&ctx);

        let mut driver = RecordingDriver::default();
        scene.render(&ctx, &mut driver);
        assert_eq!(driver.binds(), 1);

        let textures: Vec<_> = scene
            .draws()
            .iter()
            .map(|d| d.material().and_then(|m| m.diffuse))
            .collect();
        assert_eq!(textures, vec![Some(TextureId(10)), Some(TextureId(20))]);
    }

    #[test]
    fn background_is_drawn_at_the_camera() {
        let mut scene = Scene::new();
        let ctx = context();
        let mut driver = RecordingDriver::default();
        scene.render_background(&ctx, &mut driver);
        assert!(driver.events.is_empty());

        scene.set_background_sphere(TextureId(7));
        scene.render_background(&ctx, &mut driver);
        assert_eq!(
            driver.events,
            vec![
                DriverEvent::Bind(ShaderId::BACKGROUND_SPHERE),
                DriverEvent::Background(ShaderId::BACKGROUND_SPHERE),
            ]
        );
        let writes_depth = scene
            .background()
            .map(|b| b.material.writes_to_depth_buffer);
        assert_eq!(writes_depth, Some(false));
    }

    #[test]
    fn hit_test_reports_every_node_along_the_ray() {
        let near = Node::new()
            .position([0.0, 0.0, -3.0])
            .geometry(mesh(1))
            .into_ref();
        let far = Node::new()
            .position([0.0, 0.0, -8.0])
            .geometry(mesh(1))
            .into_ref();
        let aside = Node::new()
            .position([5.0, 0.0, -3.0])
            .geometry(mesh(1))
            .into_ref();
        let mut scene = Scene::new();
        scene.add_node(Rc::clone(&near));
        scene.add_node(far);
        scene.add_node(aside);

        let results = scene.hit_test(Vec3::NEG_Z, &context(), true);
        assert_eq!(results.len(), 2);
        assert!(Rc::ptr_eq(&results[0].node, &near));
        assert_relative_eq!(results[0].distance, 2.5);
    }
}
