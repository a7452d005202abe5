//! The per-frame orchestrator.

use std::fmt;
use std::rc::{Rc, Weak};

use glam::Mat4;
use log::{debug, trace, warn};

use crate::animation::TimingFunction;
use crate::camera::{FieldOfView, Viewport, compute_frame_camera};
use crate::clock::{FrameClock, SystemClock};
use crate::config::RendererConfig;
use crate::context::{EyeType, RenderContext};
use crate::delegate::RenderDelegate;
use crate::driver::Driver;
use crate::error::ConfigError;
use crate::fps::FpsTracker;
use crate::frame_sync::FrameSynchronizer;
use crate::input::InputController;
use crate::node::NodeRef;
use crate::scene::SceneControllerRef;

/// Drives one `prepare_frame` → `render_eye` (once per eye) → `end_frame`
/// sequence per display refresh.
///
/// The renderer owns the [`RenderContext`] and the [`FrameSynchronizer`],
/// shares the active scene controller (and, during a crossfade, the outgoing
/// one) and holds the host's [`RenderDelegate`] weakly.
///
/// ```
/// use parallax::{EyeType, FieldOfView, Mat4, Renderer, Viewport};
/// use parallax::input::NoInput;
/// # use parallax::driver::Driver;
/// # use parallax::{Material, RenderContext};
/// # use parallax::scene::Background;
/// # use parallax::sort_key::DrawCall;
/// # struct Null;
/// # impl Driver for Null {
/// #     fn on_frame(&mut self, _: &RenderContext) {}
/// #     fn bind_material(&mut self, _: &Material, _: &RenderContext) {}
/// #     fn draw(&mut self, _: &DrawCall, _: &RenderContext) {}
/// #     fn draw_background(&mut self, _: &Background, _: Mat4, _: &RenderContext) {}
/// # }
/// # let mut driver = Null;
///
/// let mut renderer = Renderer::new(NoInput);
/// let viewport = Viewport::new(0, 0, 1280, 720);
///
/// renderer.prepare_frame(1, viewport, FieldOfView::default(), Mat4::IDENTITY, &mut driver);
/// renderer.render_eye(EyeType::Monocular, Mat4::IDENTITY, Mat4::IDENTITY, &mut driver);
/// renderer.end_frame(&mut driver);
/// ```
pub struct Renderer {
    config: RendererConfig,
    initialized: bool,
    context: RenderContext,
    frame_synchronizer: Rc<FrameSynchronizer>,
    input: Box<dyn InputController>,
    delegate: Option<Weak<dyn RenderDelegate>>,
    point_of_view: Option<NodeRef>,
    scene_controller: Option<SceneControllerRef>,
    outgoing_scene_controller: Option<SceneControllerRef>,
    /// Latched in `prepare_frame` so every eye of a frame renders the same scenes.
    crossfading: bool,
    fps: FpsTracker,
    clock: Box<dyn FrameClock>,
    last_frame_nanos: u64,
}

impl Renderer {
    /// Renderer with the default configuration and the system clock.
    pub fn new(input: impl InputController + 'static) -> Self {
        Self::build(RendererConfig::default(), Box::new(input))
    }

    pub fn with_config(
        config: RendererConfig,
        input: impl InputController + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, Box::new(input)))
    }

    /// Replace the time source used for frame timing and animations.
    pub fn with_clock(mut self, clock: impl FrameClock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    fn build(config: RendererConfig, mut input: Box<dyn InputController>) -> Self {
        let frame_synchronizer = Rc::new(FrameSynchronizer::new());
        let mut context = RenderContext::new(Rc::clone(&frame_synchronizer));
        context.set_clip_planes(config.z_near, config.z_far);
        input.set_context(&context);

        Self {
            fps: FpsTracker::new(config.fps_samples),
            config,
            initialized: false,
            context,
            frame_synchronizer,
            input,
            delegate: None,
            point_of_view: None,
            scene_controller: None,
            outgoing_scene_controller: None,
            crossfading: false,
            clock: Box::new(SystemClock::new()),
            last_frame_nanos: 0,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn frame_synchronizer(&self) -> &Rc<FrameSynchronizer> {
        &self.frame_synchronizer
    }

    /// Moving-average frame rate over the configured window.
    pub fn fps(&self) -> f64 {
        self.fps.fps()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Set the host delegate. Only a weak reference is kept.
    pub fn set_delegate<D: RenderDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        let delegate = Rc::downgrade(delegate);
        let delegate: Weak<dyn RenderDelegate> = delegate;
        self.delegate = Some(delegate);
    }

    fn delegate(&self) -> Option<Rc<dyn RenderDelegate>> {
        self.delegate.as_ref().and_then(Weak::upgrade)
    }

    /// Node whose transform anchors the camera; `None` puts the camera at
    /// the origin.
    pub fn set_point_of_view(&mut self, node: Option<NodeRef>) {
        self.point_of_view = node;
    }

    pub fn point_of_view(&self) -> Option<&NodeRef> {
        self.point_of_view.as_ref()
    }

    pub fn scene_controller(&self) -> Option<&SceneControllerRef> {
        self.scene_controller.as_ref()
    }

    pub fn outgoing_scene_controller(&self) -> Option<&SceneControllerRef> {
        self.outgoing_scene_controller.as_ref()
    }

    pub fn update_render_view_size(&self, width: f32, height: f32) {
        if let Some(delegate) = self.delegate() {
            delegate.render_view_did_change_size(width, height, &self.context);
        }
    }

    pub fn request_exit_vr(&self) {
        if let Some(delegate) = self.delegate() {
            delegate.user_did_request_exit_vr();
        }
    }

    /// Start a frame: compute the camera and rebuild the scenes' draw lists.
    pub fn prepare_frame(
        &mut self,
        frame: u64,
        viewport: Viewport,
        fov: FieldOfView,
        head_rotation: Mat4,
        driver: &mut dyn Driver,
    ) {
        let now = self.clock.now_nanos();
        if self.initialized {
            self.fps.push(now.saturating_sub(self.last_frame_nanos));
        } else {
            match self.delegate() {
                Some(delegate) => delegate.setup_renderer_with_driver(driver),
                None => trace!("no delegate to set up"),
            }
            self.initialized = true;
            debug!("renderer initialized at frame {frame}");
        }
        self.last_frame_nanos = now;

        self.context.transaction().begin_implicit();
        self.context.set_frame(frame);
        self.context.set_time(now as f64 / 1e9);
        self.frame_synchronizer.notify_frame_start(&self.context);

        let camera = {
            let point_of_view = self.point_of_view.as_ref().map(|node| node.borrow());
            compute_frame_camera(point_of_view.as_deref(), head_rotation, viewport, fov)
        };
        self.context
            .set_enclosure_view_matrix(RenderContext::enclosure_from(&camera));
        self.context.set_camera(camera);

        if let Some(active) = &self.scene_controller {
            if let Some(outgoing) = &self.outgoing_scene_controller {
                let scene = Rc::clone(outgoing.borrow().scene());
                scene.borrow_mut().update_sort_keys(&self.context);
            }
            let scene = Rc::clone(active.borrow().scene());
            scene.borrow_mut().update_sort_keys(&self.context);

            self.input.on_process(self.context.camera());
        }

        self.crossfading = self
            .outgoing_scene_controller
            .as_ref()
            .is_some_and(|outgoing| outgoing.borrow().has_active_transition_animation());

        driver.on_frame(&self.context);
    }

    /// Render one eye. Call once per eye between `prepare_frame` and `end_frame`.
    pub fn render_eye(
        &mut self,
        eye: EyeType,
        eye_from_head: Mat4,
        projection: Mat4,
        driver: &mut dyn Driver,
    ) {
        let delegate = self.delegate();
        if let Some(delegate) = &delegate {
            delegate.will_render_eye(eye, &self.context);
        }

        let eye_view = eye_from_head * self.context.camera().look_at_matrix();
        self.context
            .set_hud_view_matrix(eye_from_head * eye_view.inverse());
        self.context.set_view_matrix(eye_view);
        self.context.set_projection_matrix(projection);
        self.context.set_eye_type(eye);
        self.context
            .set_clip_planes(self.config.z_near, self.config.z_far);

        self.render_scenes(driver);

        if let Some(reticle) = self.input.reticle() {
            reticle.render_eye(eye, &self.context, driver);
        }

        if let Some(delegate) = &delegate {
            delegate.did_render_eye(eye, &self.context);
        }
    }

    fn render_scenes(&self, driver: &mut dyn Driver) {
        let Some(active) = &self.scene_controller else {
            trace!("frame {}: no scene to render", self.context.frame());
            return;
        };
        let ctx = &self.context;

        match &self.outgoing_scene_controller {
            Some(outgoing) if self.crossfading => {
                outgoing.borrow_mut().scene_will_render(ctx);
                active.borrow_mut().scene_will_render(ctx);

                let outgoing_scene = Rc::clone(outgoing.borrow().scene());
                let active_scene = Rc::clone(active.borrow().scene());
                let outgoing_scene = outgoing_scene.borrow();
                let active_scene = active_scene.borrow();

                outgoing_scene.render_background(ctx, driver);
                active_scene.render_background(ctx, driver);
                outgoing_scene.render(ctx, driver);
                active_scene.render(ctx, driver);
            }
            _ => {
                active.borrow_mut().scene_will_render(ctx);
                let scene = Rc::clone(active.borrow().scene());
                let scene = scene.borrow();
                scene.render_background(ctx, driver);
                scene.render(ctx, driver);
            }
        }
    }

    /// Finish the frame: settle a completed transition, notify listeners and
    /// commit the frame's animation batch.
    pub fn end_frame(&mut self, driver: &mut dyn Driver) {
        let settled = self
            .outgoing_scene_controller
            .take_if(|outgoing| !outgoing.borrow().has_active_transition_animation());

        if let Some(outgoing) = settled {
            if let Some(active) = &self.scene_controller {
                active.borrow_mut().on_scene_did_appear(&self.context, driver);
            }
            outgoing
                .borrow_mut()
                .on_scene_did_disappear(&self.context, driver);
            debug!("transition settled at frame {}", self.context.frame());
        }

        self.frame_synchronizer.notify_frame_end(&self.context);
        let committed = self.context.transaction().commit_all();
        trace!(
            "frame {}: committed {committed} animated change(s)",
            self.context.frame()
        );
    }

    /// Present `controller` immediately, without a transition.
    ///
    /// Any crossfade in flight is abandoned: its outgoing controller is
    /// dropped without completion callbacks.
    pub fn set_scene_controller(&mut self, controller: SceneControllerRef, driver: &mut dyn Driver) {
        if self
            .scene_controller
            .as_ref()
            .is_some_and(|active| Rc::ptr_eq(active, &controller))
        {
            return;
        }
        if self.outgoing_scene_controller.take().is_some() {
            warn!("scene change abandons a transition in progress");
        }
        self.crossfading = false;

        let outgoing = self.scene_controller.take();
        controller.borrow_mut().reset_transition();
        self.input
            .attach_scene(Rc::clone(controller.borrow().scene()));

        controller
            .borrow_mut()
            .on_scene_will_appear(&self.context, driver);
        if let Some(outgoing) = &outgoing {
            outgoing
                .borrow_mut()
                .on_scene_will_disappear(&self.context, driver);
        }

        self.scene_controller = Some(Rc::clone(&controller));

        controller
            .borrow_mut()
            .on_scene_did_appear(&self.context, driver);
        if let Some(outgoing) = &outgoing {
            outgoing
                .borrow_mut()
                .on_scene_did_disappear(&self.context, driver);
        }
        debug!("scene controller replaced immediately");
    }

    /// Crossfade from the active controller to `controller` over `seconds`.
    ///
    /// # Panics
    ///
    /// Panics if `controller` is already the active controller.
    pub fn set_scene_controller_with_transition(
        &mut self,
        controller: SceneControllerRef,
        seconds: f64,
        timing: TimingFunction,
        driver: &mut dyn Driver,
    ) {
        assert!(
            !self
                .scene_controller
                .as_ref()
                .is_some_and(|active| Rc::ptr_eq(active, &controller)),
            "cannot transition a scene controller to itself"
        );
        if self.outgoing_scene_controller.is_some() {
            warn!("new transition supersedes one in progress");
        }

        self.outgoing_scene_controller = self.scene_controller.replace(Rc::clone(&controller));
        self.input
            .attach_scene(Rc::clone(controller.borrow().scene()));

        controller
            .borrow_mut()
            .on_scene_will_appear(&self.context, driver);
        if let Some(outgoing) = &self.outgoing_scene_controller {
            outgoing
                .borrow_mut()
                .on_scene_will_disappear(&self.context, driver);
        }

        controller
            .borrow_mut()
            .start_incoming_transition(seconds, timing, &self.context);
        if let Some(outgoing) = &self.outgoing_scene_controller {
            outgoing
                .borrow_mut()
                .start_outgoing_transition(seconds, timing, &self.context);
            self.crossfading = true;
        }
        debug!("scene transition of {seconds}s started");
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Some(delegate) = self.delegate() {
            delegate.shutdown_renderer();
        }
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .field("initialized", &self.initialized)
            .field("frame", &self.context.frame())
            .field("has_scene", &self.scene_controller.is_some())
            .field("transitioning", &self.outgoing_scene_controller.is_some())
            .finish_non_exhaustive()
    }
}
