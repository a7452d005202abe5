//! The per-frame camera and how it is derived from the point-of-view node.
//!
//! The camera is rebuilt every frame from three inputs: the point-of-view
//! node (if any), the camera behavior attached to that node (if any), and the
//! head rotation reported by the VR framework.
//!
//! A standard camera composes head rotation directly onto the node's
//! rotation. An orbit camera also lets head rotation move the camera: the
//! camera swings around the focal point on a sphere, and only the head
//! rotation's difference from the orbit's own forward direction is applied to
//! the view.

use glam::{Mat4, Quat, Vec3};

use crate::node::{CameraRotationType, Node, NodeCamera};

/// Forward direction of an unrotated camera.
pub const BASE_FORWARD: Vec3 = Vec3::NEG_Z;

/// Up direction of an unrotated camera.
pub const BASE_UP: Vec3 = Vec3::Y;

/// Pixel rectangle an eye renders into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Width over height, or 1.0 for an empty viewport.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Field of view as four half-angles in degrees, as headsets report them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldOfView {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl FieldOfView {
    pub fn new(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        Self {
            left,
            right,
            bottom,
            top,
        }
    }

    /// Same half-angle on every side.
    pub fn symmetric(half_angle_degrees: f32) -> Self {
        Self::new(
            half_angle_degrees,
            half_angle_degrees,
            half_angle_degrees,
            half_angle_degrees,
        )
    }

    /// Total horizontal angle in degrees.
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Total vertical angle in degrees.
    pub fn vertical(&self) -> f32 {
        self.bottom + self.top
    }
}

impl Default for FieldOfView {
    fn default() -> Self {
        Self::symmetric(45.0)
    }
}

/// The camera for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    position: Vec3,
    base_rotation: Mat4,
    head_rotation: Mat4,
    fov: FieldOfView,
    viewport: Viewport,
    forward: Vec3,
    up: Vec3,
    look_at: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            base_rotation: Mat4::IDENTITY,
            head_rotation: Mat4::IDENTITY,
            fov: FieldOfView::default(),
            viewport: Viewport::default(),
            forward: BASE_FORWARD,
            up: BASE_UP,
            look_at: Mat4::IDENTITY,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn base_rotation(&self) -> Mat4 {
        self.base_rotation
    }

    pub fn head_rotation(&self) -> Mat4 {
        self.head_rotation
    }

    pub fn fov(&self) -> FieldOfView {
        self.fov
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// World-to-head view matrix, valid after [`compute_look_at_matrix`](Self::compute_look_at_matrix).
    pub fn look_at_matrix(&self) -> Mat4 {
        self.look_at
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_base_rotation(&mut self, rotation: Mat4) {
        self.base_rotation = rotation;
    }

    pub fn set_head_rotation(&mut self, rotation: Mat4) {
        self.head_rotation = rotation;
    }

    pub fn set_fov(&mut self, fov: FieldOfView) {
        self.fov = fov;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Right vector from forward and up.
    pub fn right(&self) -> Vec3 {
        self.forward.cross(self.up).normalize_or_zero()
    }

    /// Derive forward, up and the look-at matrix from position and rotations.
    ///
    /// Head rotation is applied in the frame of the base rotation.
    pub fn compute_look_at_matrix(&mut self) {
        let rotation = self.base_rotation * self.head_rotation;
        self.forward = rotation
            .transform_vector3(BASE_FORWARD)
            .normalize_or(BASE_FORWARD);
        self.up = rotation.transform_vector3(BASE_UP).normalize_or(BASE_UP);
        self.look_at = Mat4::look_to_rh(self.position, self.forward, self.up);
    }
}

/// Build the frame camera from the point-of-view node and head rotation.
pub fn compute_frame_camera(
    point_of_view: Option<&Node>,
    head_rotation: Mat4,
    viewport: Viewport,
    fov: FieldOfView,
) -> Camera {
    let mut camera = Camera::new();
    camera.set_head_rotation(head_rotation);
    camera.set_viewport(viewport);
    camera.set_fov(fov);

    match point_of_view {
        None => {
            camera.set_position(Vec3::ZERO);
            camera.set_base_rotation(Mat4::IDENTITY);
        }
        Some(node) => match node.get_camera() {
            None => {
                camera.set_position(node.get_position());
                camera.set_base_rotation(Mat4::from_quat(node.get_rotation()));
            }
            Some(behavior) => {
                camera.set_base_rotation(
                    Mat4::from_quat(node.get_rotation()) * Mat4::from_quat(behavior.base_rotation),
                );
                match behavior.rotation_type {
                    CameraRotationType::Standard => {
                        camera.set_position(node.get_position() + behavior.position);
                    }
                    CameraRotationType::Orbit { focal_point } => {
                        let (position, orbit_head) =
                            orbit(node.get_position(), behavior, focal_point, head_rotation);
                        camera.set_position(position);
                        camera.set_head_rotation(orbit_head);
                    }
                }
            }
        },
    }

    camera.compute_look_at_matrix();
    camera
}

/// Orbit camera position and head-rotation component.
///
/// The camera is pushed out from the focal point along the head-rotated ray,
/// keeping its distance to the focal point. The rotation that takes the orbit
/// ray onto [`BASE_FORWARD`] is inverted and composed with the head rotation so
/// that only head movement relative to the orbit direction turns the view.
fn orbit(
    node_position: Vec3,
    behavior: &NodeCamera,
    focal_point: Vec3,
    head_rotation: Mat4,
) -> (Vec3, Mat4) {
    let pos = node_position + behavior.position;
    let focal = node_position + focal_point;

    let v = focal - pos;
    let ray = v.normalize_or_zero();

    let orbited_ray = head_rotation.transform_vector3(ray);
    let position = focal - orbited_ray * v.length();

    // Camera sits on the focal point: no orbit direction to compensate for.
    if ray == Vec3::ZERO {
        return (position, head_rotation);
    }

    let rotation = Quat::from_rotation_arc(ray, BASE_FORWARD);
    (position, Mat4::from_quat(rotation).inverse() * head_rotation)
}
