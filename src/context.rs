//! Per-frame state shared by every render operation.

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::animation::{AnimatedValue, Transaction};
use crate::camera::Camera;
use crate::config::{DEFAULT_Z_FAR, DEFAULT_Z_NEAR};
use crate::frame_sync::FrameSynchronizer;

/// Which eye is being rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EyeType {
    /// Single view, used for non-stereo displays.
    #[default]
    Monocular,
    Left,
    Right,
}

/// Frame state owned by the [`Renderer`](crate::Renderer) and mutated in place
/// as the frame advances.
///
/// The context is only meaningful inside the current frame's
/// prepare/render/end sequence; matrices are overwritten by the next eye or
/// frame, so copy values out rather than holding on to the context.
pub struct RenderContext {
    frame: u64,
    time: f64,
    camera: Camera,
    view: Mat4,
    projection: Mat4,
    enclosure_view: Mat4,
    hud_view: Mat4,
    eye: EyeType,
    z_near: f32,
    z_far: f32,
    frame_synchronizer: Rc<FrameSynchronizer>,
    transaction: RefCell<Transaction>,
}

impl RenderContext {
    pub fn new(frame_synchronizer: Rc<FrameSynchronizer>) -> Self {
        Self {
            frame: 0,
            time: 0.0,
            camera: Camera::default(),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            enclosure_view: Mat4::IDENTITY,
            hud_view: Mat4::IDENTITY,
            eye: EyeType::default(),
            z_near: DEFAULT_Z_NEAR,
            z_far: DEFAULT_Z_FAR,
            frame_synchronizer,
            transaction: RefCell::new(Transaction::new()),
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Frame start time in seconds on the renderer's clock.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// View matrix for the current eye.
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Rotation-only view matrix for geometry that follows the camera, such
    /// as skyboxes.
    pub fn enclosure_view_matrix(&self) -> Mat4 {
        self.enclosure_view
    }

    /// View matrix that cancels the head pose, for elements fixed in front
    /// of the eye (reticle, HUD).
    pub fn hud_view_matrix(&self) -> Mat4 {
        self.hud_view
    }

    pub fn eye_type(&self) -> EyeType {
        self.eye
    }

    pub fn z_near(&self) -> f32 {
        self.z_near
    }

    pub fn z_far(&self) -> f32 {
        self.z_far
    }

    /// Registry for per-frame listeners.
    pub fn frame_synchronizer(&self) -> &Rc<FrameSynchronizer> {
        &self.frame_synchronizer
    }

    /// The frame's animation batch.
    ///
    /// # Panics
    ///
    /// Panics if the transaction is already borrowed, e.g. when called from
    /// inside a staged change while it is being committed.
    pub fn transaction(&self) -> RefMut<'_, Transaction> {
        self.transaction.borrow_mut()
    }

    /// Stage `value` into `target`, taking effect when the frame ends.
    pub fn animate(&self, target: &AnimatedValue, value: f32) {
        self.transaction().set_value(target, value);
    }

    /// Snapshot for GPU upload.
    pub fn view_uniforms(&self) -> ViewUniforms {
        ViewUniforms {
            view: self.view.to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
            enclosure_view: self.enclosure_view.to_cols_array_2d(),
            hud_view: self.hud_view.to_cols_array_2d(),
            camera_position: self.camera.position().to_array(),
            time: self.time as f32,
            z_near: self.z_near,
            z_far: self.z_far,
            _padding: [0.0; 2],
        }
    }

    pub(crate) fn set_frame(&mut self, frame: u64) {
        self.frame = frame;
    }

    pub(crate) fn set_time(&mut self, seconds: f64) {
        self.time = seconds;
    }

    pub(crate) fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub(crate) fn set_view_matrix(&mut self, view: Mat4) {
        self.view = view;
    }

    pub(crate) fn set_projection_matrix(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    pub(crate) fn set_enclosure_view_matrix(&mut self, enclosure_view: Mat4) {
        self.enclosure_view = enclosure_view;
    }

    pub(crate) fn set_hud_view_matrix(&mut self, hud_view: Mat4) {
        self.hud_view = hud_view;
    }

    pub(crate) fn set_eye_type(&mut self, eye: EyeType) {
        self.eye = eye;
    }

    pub(crate) fn set_clip_planes(&mut self, z_near: f32, z_far: f32) {
        self.z_near = z_near;
        self.z_far = z_far;
    }

    /// Look-at matrix for `camera` placed at the origin: rotation only.
    pub(crate) fn enclosure_from(camera: &Camera) -> Mat4 {
        Mat4::look_to_rh(Vec3::ZERO, camera.forward(), camera.up())
    }
}

/// GPU-ready copy of the per-eye matrices.
///
/// Matrices are column-major. Layout is 16-byte aligned for uniform buffers.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub enclosure_view: [[f32; 4]; 4],
    pub hud_view: [[f32; 4]; 4],
    /// Camera position in world space.
    pub camera_position: [f32; 3],
    /// Frame time in seconds.
    pub time: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Padding for 16-byte alignment.
    pub _padding: [f32; 2],
}
