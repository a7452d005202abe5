//! Host application callbacks.

use crate::context::{EyeType, RenderContext};
use crate::driver::Driver;

/// Notifications from the renderer to the host application.
///
/// The renderer holds its delegate weakly; once the host drops it, the
/// callbacks silently stop. All methods default to doing nothing.
pub trait RenderDelegate {
    /// One-time, driver-dependent setup before the first frame is prepared.
    fn setup_renderer_with_driver(&self, _driver: &mut dyn Driver) {}

    fn render_view_did_change_size(&self, _width: f32, _height: f32, _context: &RenderContext) {}

    fn will_render_eye(&self, _eye: EyeType, _context: &RenderContext) {}

    fn did_render_eye(&self, _eye: EyeType, _context: &RenderContext) {}

    /// The user asked to leave VR (e.g. pressed the headset's back button).
    fn user_did_request_exit_vr(&self) {}

    /// The renderer is being destroyed.
    fn shutdown_renderer(&self) {}
}
