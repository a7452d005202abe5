//! The graphics backend as seen from the frame loop.

use glam::Mat4;

use crate::context::RenderContext;
use crate::node::Material;
use crate::scene::Background;
use crate::sort_key::DrawCall;

/// Issues the actual GPU work for a frame.
///
/// The renderer and scenes only decide *what* is drawn and in which order; a
/// driver turns that into API calls. Within a scene's opaque pass,
/// [`bind_material`](Self::bind_material) is only called when the shader
/// changes between consecutive draws, so only shader state is batched. Draws
/// sharing a shader may still differ in textures, lighting or depth state; a
/// driver reads those per element from [`DrawCall::material`].
pub trait Driver {
    /// Called once per frame after the camera and sort keys are ready.
    fn on_frame(&mut self, context: &RenderContext);

    /// Bind the shader for the draws that follow.
    fn bind_material(&mut self, material: &Material, context: &RenderContext);

    /// Draw one geometry element with the bound shader and the call's own material.
    fn draw(&mut self, call: &DrawCall, context: &RenderContext);

    /// Draw the scene background. `transform` centers it on the camera.
    fn draw_background(&mut self, background: &Background, transform: Mat4, context: &RenderContext);
}
