//! Scenes and the controllers that present them.
//!
//! A [`Scene`] holds the node tree and produces the sorted draw list each
//! frame. A [`SceneController`] owns a scene, receives lifecycle events when
//! the renderer shows or hides it, and animates crossfades between scenes.

mod background;
mod controller;
#[allow(clippy::module_inception)]
mod scene;

pub use background::{
    BACKGROUND_SPHERE_RADIUS, BACKGROUND_SPHERE_SEGMENTS, Background, BackgroundKind,
};
pub use controller::{SceneController, SceneControllerRef, SceneEvent, TransitionRole};
pub use scene::Scene;
