//! The scene node tree: transforms, geometry, materials and camera behaviors.
//!
//! Nodes are shared through [`NodeRef`] (`Rc<RefCell<Node>>`). Scenes hold
//! their root nodes, the renderer may hold one as its point of view, and the
//! host keeps whatever handles it needs to animate them.

mod camera;
mod geometry;
#[allow(clippy::module_inception)]
mod node;

pub use camera::{CameraRotationType, NodeCamera};
pub use geometry::{Geometry, LightingModel, Material, ShaderId, TextureId};
pub use node::{Node, NodeId, NodeRef};

pub(crate) use node::hit_test_node;
