//! Input controller and gaze reticle hooks.

use std::cell::RefCell;
use std::rc::Rc;

use crate::camera::Camera;
use crate::context::{EyeType, RenderContext};
use crate::driver::Driver;
use crate::scene::Scene;

/// Head-locked gaze indicator, drawn after the scenes with the HUD view
/// matrix in the context.
pub trait Reticle {
    fn render_eye(&self, eye: EyeType, context: &RenderContext, driver: &mut dyn Driver);
}

/// Controller-driven interaction (gaze, clicks, hovering).
pub trait InputController {
    /// Called once when the renderer is created.
    fn set_context(&mut self, context: &RenderContext);

    /// Called whenever a new scene becomes the interaction target.
    fn attach_scene(&mut self, scene: Rc<RefCell<Scene>>);

    /// Called once per frame with the new camera, when a scene is attached.
    fn on_process(&mut self, camera: &Camera);

    /// The reticle to draw, if any.
    fn reticle(&self) -> Option<Rc<dyn Reticle>> {
        None
    }
}

/// Input controller for hosts with no interaction.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInput;

impl InputController for NoInput {
    fn set_context(&mut self, _context: &RenderContext) {}

    fn attach_scene(&mut self, _scene: Rc<RefCell<Scene>>) {}

    fn on_process(&mut self, _camera: &Camera) {}
}
