//! # Parallax
//!
//! **The per-frame core of a stereo (VR/AR) renderer.**
//!
//! Parallax decides what a frame looks like and in what order it is drawn;
//! a [`Driver`](driver::Driver) you provide turns that into GPU calls. Each
//! display refresh the host calls three methods on a [`Renderer`]:
//!
//! 1. [`prepare_frame`](Renderer::prepare_frame) with the head pose. The camera
//!    is derived from the point-of-view node and every scene rebuilds its
//!    shader-sorted draw list.
//! 2. [`render_eye`](Renderer::render_eye) once per eye (once for mono). The
//!    background pass and then the opaque pass are issued for the active scene,
//!    and for the outgoing scene too while a crossfade runs.
//! 3. [`end_frame`](Renderer::end_frame). Finished transitions settle and the
//!    frame's animated changes are committed.
//!
//! ## Quick Start
//!
//! ```
//! use parallax::*;
//! use parallax::driver::Driver;
//! use parallax::input::NoInput;
//! use parallax::scene::{Background, Scene, SceneController};
//! use parallax::sort_key::DrawCall;
//!
//! struct LogDriver;
//!
//! impl Driver for LogDriver {
//!     fn on_frame(&mut self, ctx: &RenderContext) {
//!         log::trace!("frame {}", ctx.frame());
//!     }
//!     fn bind_material(&mut self, material: &Material, _: &RenderContext) {
//!         log::trace!("bind {:?}", material.shader);
//!     }
//!     fn draw(&mut self, call: &DrawCall, _: &RenderContext) {
//!         log::trace!("draw {:?}", call.key);
//!     }
//!     fn draw_background(&mut self, _: &Background, _: Mat4, _: &RenderContext) {}
//! }
//!
//! let mut scene = Scene::new();
//! scene.add_node(
//!     Node::new()
//!         .position(Vec3::new(0.0, 0.0, -3.0))
//!         .geometry(Geometry::single(Material::new(ShaderId(1))))
//!         .into_ref(),
//! );
//!
//! let mut driver = LogDriver;
//! let mut renderer = Renderer::new(NoInput);
//! renderer.set_scene_controller(SceneController::new(scene).into_ref(), &mut driver);
//!
//! let viewport = Viewport::new(0, 0, 1920, 1080);
//! renderer.prepare_frame(1, viewport, FieldOfView::default(), Mat4::IDENTITY, &mut driver);
//! renderer.render_eye(EyeType::Monocular, Mat4::IDENTITY, Mat4::IDENTITY, &mut driver);
//! renderer.end_frame(&mut driver);
//! ```
//!
//! ## Design
//!
//! - **Single-threaded**: Shared state is `Rc`/`RefCell`; the host drives every call.
//! - **Weak host delegate**: The renderer never keeps the application alive.
//! - **Committed once per frame**: Animated values change at `end_frame`, so both eyes agree.
//! - **Logging through `log`**: Install any logger to see lifecycle and per-frame detail.

mod animation;
mod camera;
mod clock;
mod config;
mod context;
pub mod delegate;
pub mod driver;
mod error;
mod fps;
mod frame_sync;
pub mod input;
mod node;
mod picking;
mod renderer;
pub mod scene;
pub mod sort_key;

#[cfg(test)]
mod testing;

pub use animation::{AnimatedValue, Animation, TimingFunction, Transaction};
pub use camera::{BASE_FORWARD, BASE_UP, Camera, FieldOfView, Viewport, compute_frame_camera};
pub use clock::{FrameClock, ManualClock, SystemClock};
pub use config::{DEFAULT_FPS_SAMPLES, DEFAULT_Z_FAR, DEFAULT_Z_NEAR, RendererConfig};
pub use context::{EyeType, RenderContext, ViewUniforms};
pub use error::ConfigError;
pub use fps::FpsTracker;
pub use frame_sync::{FrameListener, FrameSynchronizer};
pub use node::{
    CameraRotationType, Geometry, LightingModel, Material, Node, NodeCamera, NodeId, NodeRef,
    ShaderId, TextureId,
};
pub use renderer::Renderer;

// 3D picking
pub use picking::{BoundingBox, HitTestResult, Ray};

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec3, Vec4};
