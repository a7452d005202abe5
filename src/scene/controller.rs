//! Scene ownership, lifecycle callbacks, and crossfade transitions.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::animation::{Animation, TimingFunction};
use crate::context::RenderContext;
use crate::driver::Driver;

use super::scene::Scene;

/// Shared handle to a scene controller, as held by the renderer.
pub type SceneControllerRef = Rc<RefCell<SceneController>>;

/// Lifecycle notifications delivered to a scene controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneEvent {
    WillAppear,
    DidAppear,
    WillDisappear,
    DidDisappear,
}

/// Which side of a crossfade a controller is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionRole {
    /// Fading in, opacity 0 to 1.
    Incoming,
    /// Fading out, opacity 1 to 0.
    Outgoing,
}

#[derive(Clone, Copy, Debug)]
struct ActiveTransition {
    role: TransitionRole,
    duration: f64,
    timing: TimingFunction,
    /// Latched from the first frame that samples the transition.
    start: Option<f64>,
    finished: bool,
}

type EventCallback = Box<dyn FnMut(SceneEvent, &RenderContext, &mut dyn Driver)>;

/// Owns a [`Scene`] and drives its appearance and crossfades.
///
/// The crossfade animates the scene's opacity. Each
/// [`scene_will_render`](Self::scene_will_render) samples the animation at the
/// frame time and stages the value on the frame's transaction, so it becomes
/// visible once the frame is committed.
///
/// ```
/// use parallax::scene::{SceneController, SceneEvent};
///
/// let controller = SceneController::default()
///     .on_event(|event, _ctx, _driver| {
///         if event == SceneEvent::DidAppear {
///             log::info!("scene on screen");
///         }
///     })
///     .into_ref();
/// assert!(!controller.borrow().has_active_transition_animation());
/// ```
pub struct SceneController {
    scene: Rc<RefCell<Scene>>,
    transition: Option<ActiveTransition>,
    on_event: Option<EventCallback>,
}

impl Default for SceneController {
    fn default() -> Self {
        Self::new(Scene::new())
    }
}

impl SceneController {
    pub fn new(scene: Scene) -> Self {
        Self::with_scene(Rc::new(RefCell::new(scene)))
    }

    /// Wrap a scene that is shared with other owners.
    pub fn with_scene(scene: Rc<RefCell<Scene>>) -> Self {
        Self {
            scene,
            transition: None,
            on_event: None,
        }
    }

    /// Set the lifecycle callback.
    ///
    /// The callback runs while the renderer holds this controller borrowed,
    /// so it must not borrow the controller again.
    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: FnMut(SceneEvent, &RenderContext, &mut dyn Driver) + 'static,
    {
        self.on_event = Some(Box::new(callback));
        self
    }

    pub fn into_ref(self) -> SceneControllerRef {
        Rc::new(RefCell::new(self))
    }

    pub fn scene(&self) -> &Rc<RefCell<Scene>> {
        &self.scene
    }

    pub fn on_scene_will_appear(&mut self, context: &RenderContext, driver: &mut dyn Driver) {
        self.emit(SceneEvent::WillAppear, context, driver);
    }

    pub fn on_scene_did_appear(&mut self, context: &RenderContext, driver: &mut dyn Driver) {
        self.emit(SceneEvent::DidAppear, context, driver);
    }

    pub fn on_scene_will_disappear(&mut self, context: &RenderContext, driver: &mut dyn Driver) {
        self.emit(SceneEvent::WillDisappear, context, driver);
    }

    pub fn on_scene_did_disappear(&mut self, context: &RenderContext, driver: &mut dyn Driver) {
        self.emit(SceneEvent::DidDisappear, context, driver);
    }

    fn emit(&mut self, event: SceneEvent, context: &RenderContext, driver: &mut dyn Driver) {
        if let Some(callback) = &mut self.on_event {
            callback(event, context, driver);
        }
    }

    /// Called once per eye before this controller's scene is drawn.
    pub fn scene_will_render(&mut self, context: &RenderContext) {
        let Some(transition) = &mut self.transition else {
            return;
        };
        if transition.finished {
            return;
        }

        let now = context.time();
        let start = *transition.start.get_or_insert(now);
        let animation = Animation::new(start, transition.duration, transition.timing);
        let progress = animation.progress(now);
        let opacity = match transition.role {
            TransitionRole::Incoming => progress,
            TransitionRole::Outgoing => 1.0 - progress,
        };
        context.animate(self.scene.borrow().opacity(), opacity);

        if animation.is_finished(now) {
            transition.finished = true;
            debug!(
                "{:?} transition finished at frame {}",
                transition.role,
                context.frame()
            );
        }
    }

    /// Begin fading this controller's scene in over `duration` seconds.
    pub fn start_incoming_transition(
        &mut self,
        duration: f64,
        timing: TimingFunction,
        context: &RenderContext,
    ) {
        self.start_transition(TransitionRole::Incoming, duration, timing, context);
        self.scene.borrow().opacity().set(0.0);
    }

    /// Begin fading this controller's scene out over `duration` seconds.
    pub fn start_outgoing_transition(
        &mut self,
        duration: f64,
        timing: TimingFunction,
        context: &RenderContext,
    ) {
        self.start_transition(TransitionRole::Outgoing, duration, timing, context);
        self.scene.borrow().opacity().set(1.0);
    }

    fn start_transition(
        &mut self,
        role: TransitionRole,
        duration: f64,
        timing: TimingFunction,
        context: &RenderContext,
    ) {
        debug!(
            "{role:?} transition of {duration}s ({timing:?}) requested at frame {}",
            context.frame()
        );
        self.transition = Some(ActiveTransition {
            role,
            duration: duration.max(0.0),
            timing,
            start: None,
            finished: false,
        });
    }

    /// Drop any transition and show the scene fully opaque.
    pub(crate) fn reset_transition(&mut self) {
        self.transition = None;
        self.scene.borrow().opacity().set(1.0);
    }

    /// Whether a transition was started and has not yet been sampled at or
    /// past its end.
    pub fn has_active_transition_animation(&self) -> bool {
        self.transition.is_some_and(|t| !t.finished)
    }

    pub fn transition_role(&self) -> Option<TransitionRole> {
        self.transition.map(|t| t.role)
    }
}

impl fmt::Debug for SceneController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneController")
            .field("transition", &self.transition)
            .field("on_event", &self.on_event.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_sync::FrameSynchronizer;
    use crate::testing::RecordingDriver;
    use approx::assert_relative_eq;

    fn context_at(time: f64) -> RenderContext {
        let mut ctx = RenderContext::new(Rc::new(FrameSynchronizer::new()));
        ctx.set_time(time);
        ctx.transaction().begin_implicit();
        ctx
    }

    fn opacity(controller: &SceneController) -> f32 {
        controller.scene().borrow().opacity().get()
    }

    #[test]
    fn events_reach_the_callback() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut controller = SceneController::default()
            .on_event(move |event, _, _| sink.borrow_mut().push(event));
        let ctx = context_at(0.0);
        let mut driver = RecordingDriver::default();

        controller.on_scene_will_appear(&ctx, &mut driver);
        controller.on_scene_did_appear(&ctx, &mut driver);
        controller.on_scene_will_disappear(&ctx, &mut driver);
        controller.on_scene_did_disappear(&ctx, &mut driver);

        assert_eq!(
            *seen.borrow(),
            vec![
                SceneEvent::WillAppear,
                SceneEvent::DidAppear,
                SceneEvent::WillDisappear,
                SceneEvent::DidDisappear,
            ]
        );
    }

    #[test]
    fn incoming_fades_in_from_first_sample() {
        let mut controller = SceneController::default();
        controller.start_incoming_transition(2.0, TimingFunction::Linear, &context_at(10.0));
        assert_eq!(opacity(&controller), 0.0);
        assert!(controller.has_active_transition_animation());

        // Start latches at the first rendered frame, not the request.
        let ctx = context_at(20.0);
        controller.scene_will_render(&ctx);
        ctx.transaction().commit_all();
        assert_relative_eq!(opacity(&controller), 0.0);

        let ctx = context_at(21.0);
        controller.scene_will_render(&ctx);
        assert_relative_eq!(opacity(&controller), 0.0);
        ctx.transaction().commit_all();
        assert_relative_eq!(opacity(&controller), 0.5);
        assert!(controller.has_active_transition_animation());

        let ctx = context_at(22.5);
        controller.scene_will_render(&ctx);
        ctx.transaction().commit_all();
        assert_relative_eq!(opacity(&controller), 1.0);
        assert!(!controller.has_active_transition_animation());
        assert_eq!(controller.transition_role(), Some(TransitionRole::Incoming));
    }

    #[test]
    fn outgoing_fades_out_with_easing() {
        let mut controller = SceneController::default();
        controller.start_outgoing_transition(1.0, TimingFunction::EaseIn, &context_at(0.0));
        assert_eq!(opacity(&controller), 1.0);

        controller.scene_will_render(&context_at(0.0));
        let ctx = context_at(0.5);
        controller.scene_will_render(&ctx);
        ctx.transaction().commit_all();
        assert_relative_eq!(opacity(&controller), 0.75);
    }

    #[test]
    fn zero_length_transition_finishes_on_first_sample() {
        let mut controller = SceneController::default();
        controller.start_incoming_transition(0.0, TimingFunction::Linear, &context_at(0.0));
        assert!(controller.has_active_transition_animation());

        let ctx = context_at(3.0);
        controller.scene_will_render(&ctx);
        ctx.transaction().commit_all();
        assert!(!controller.has_active_transition_animation());
        assert_relative_eq!(opacity(&controller), 1.0);
    }

    #[test]
    fn reset_restores_full_opacity() {
        let mut controller = SceneController::default();
        controller.start_incoming_transition(1.0, TimingFunction::Linear, &context_at(0.0));
        controller.reset_transition();
        assert!(!controller.has_active_transition_animation());
        assert_eq!(controller.transition_role(), None);
        assert_eq!(opacity(&controller), 1.0);
    }
}
