//! Recording fakes for the renderer's collaborators.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::context::{EyeType, RenderContext};
use crate::delegate::RenderDelegate;
use crate::driver::Driver;
use crate::input::{InputController, Reticle};
use crate::node::{Material, NodeId, ShaderId};
use crate::scene::{Background, Scene};
use crate::sort_key::DrawCall;

#[derive(Clone, Debug, PartialEq)]
pub enum DriverEvent {
    Frame(u64),
    Bind(ShaderId),
    Draw(NodeId),
    Background(ShaderId),
}

#[derive(Debug, Default)]
pub struct RecordingDriver {
    pub events: Vec<DriverEvent>,
}

impl RecordingDriver {
    pub fn binds(&self) -> usize {
        self.count(|e| matches!(e, DriverEvent::Bind(_)))
    }

    pub fn draws(&self) -> usize {
        self.count(|e| matches!(e, DriverEvent::Draw(_)))
    }

    pub fn backgrounds(&self) -> usize {
        self.count(|e| matches!(e, DriverEvent::Background(_)))
    }

    fn count(&self, f: impl Fn(&DriverEvent) -> bool) -> usize {
        self.events.iter().filter(|e| f(e)).count()
    }
}

impl Driver for RecordingDriver {
    fn on_frame(&mut self, context: &RenderContext) {
        self.events.push(DriverEvent::Frame(context.frame()));
    }

    fn bind_material(&mut self, material: &Material, _context: &RenderContext) {
        self.events.push(DriverEvent::Bind(material.shader));
    }

    fn draw(&mut self, call: &DrawCall, _context: &RenderContext) {
        self.events.push(DriverEvent::Draw(call.key.node));
    }

    fn draw_background(&mut self, background: &Background, _transform: Mat4, _context: &RenderContext) {
        self.events.push(DriverEvent::Background(background.material.shader));
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DelegateCall {
    Setup,
    Resized(f32, f32),
    WillRenderEye(EyeType),
    DidRenderEye(EyeType),
    ExitVr,
    Shutdown,
}

#[derive(Debug, Default)]
pub struct RecordingDelegate {
    pub calls: RefCell<Vec<DelegateCall>>,
}

impl RecordingDelegate {
    pub fn count(&self, call: &DelegateCall) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }
}

impl RenderDelegate for RecordingDelegate {
    fn setup_renderer_with_driver(&self, _driver: &mut dyn Driver) {
        self.calls.borrow_mut().push(DelegateCall::Setup);
    }

    fn render_view_did_change_size(&self, width: f32, height: f32, _context: &RenderContext) {
        self.calls.borrow_mut().push(DelegateCall::Resized(width, height));
    }

    fn will_render_eye(&self, eye: EyeType, _context: &RenderContext) {
        self.calls.borrow_mut().push(DelegateCall::WillRenderEye(eye));
    }

    fn did_render_eye(&self, eye: EyeType, _context: &RenderContext) {
        self.calls.borrow_mut().push(DelegateCall::DidRenderEye(eye));
    }

    fn user_did_request_exit_vr(&self) {
        self.calls.borrow_mut().push(DelegateCall::ExitVr);
    }

    fn shutdown_renderer(&self) {
        self.calls.borrow_mut().push(DelegateCall::Shutdown);
    }
}

/// Records each reticle draw with the HUD matrix it saw.
#[derive(Debug, Default)]
pub struct RecordingReticle {
    pub draws: RefCell<Vec<(EyeType, Mat4)>>,
}

impl Reticle for RecordingReticle {
    fn render_eye(&self, eye: EyeType, context: &RenderContext, _driver: &mut dyn Driver) {
        self.draws.borrow_mut().push((eye, context.hud_view_matrix()));
    }
}

#[derive(Debug, Default)]
pub struct InputLog {
    pub context_set: bool,
    pub attached: Vec<Rc<RefCell<Scene>>>,
    pub processed: Vec<Vec3>,
}

/// Input controller whose log stays readable after the renderer takes it.
#[derive(Default)]
pub struct RecordingInput {
    pub log: Rc<RefCell<InputLog>>,
    pub reticle: Option<Rc<RecordingReticle>>,
}

impl InputController for RecordingInput {
    fn set_context(&mut self, _context: &RenderContext) {
        self.log.borrow_mut().context_set = true;
    }

    fn attach_scene(&mut self, scene: Rc<RefCell<Scene>>) {
        self.log.borrow_mut().attached.push(scene);
    }

    fn on_process(&mut self, camera: &Camera) {
        self.log.borrow_mut().processed.push(camera.position());
    }

    fn reticle(&self) -> Option<Rc<dyn Reticle>> {
        self.reticle.clone().map(|r| r as Rc<dyn Reticle>)
    }
}
