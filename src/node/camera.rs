use glam::{Quat, Vec3};

/// How a camera attached to a node derives its pose from that node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CameraRotationType {
    /// Camera sits at the node (plus offset) and head tracking rotates the view.
    #[default]
    Standard,
    /// Camera orbits a focal point; head tracking sweeps it around the sphere
    /// through the node's camera position.
    Orbit {
        /// Focal point, relative to the node's position.
        focal_point: Vec3,
    },
}

/// Camera behavior attached to a point-of-view node.
///
/// ```
/// use parallax::{NodeCamera, Vec3};
///
/// let orbit = NodeCamera::orbit(Vec3::new(0.0, 0.0, -3.0)).position(Vec3::new(0.0, 1.0, 0.0));
/// assert!(orbit.is_orbit());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeCamera {
    /// Offset from the node's position.
    pub position: Vec3,
    /// Rotation applied after the node's own rotation.
    pub base_rotation: Quat,
    pub rotation_type: CameraRotationType,
}

impl NodeCamera {
    /// A standard camera with no offsets.
    pub fn new() -> Self {
        Self::default()
    }

    /// An orbit camera around `focal_point` (relative to the node).
    pub fn orbit(focal_point: impl Into<Vec3>) -> Self {
        Self {
            rotation_type: CameraRotationType::Orbit {
                focal_point: focal_point.into(),
            },
            ..Self::default()
        }
    }

    pub fn position(mut self, offset: impl Into<Vec3>) -> Self {
        self.position = offset.into();
        self
    }

    pub fn base_rotation(mut self, rotation: Quat) -> Self {
        self.base_rotation = rotation;
        self
    }

    pub fn is_orbit(&self) -> bool {
        matches!(self.rotation_type, CameraRotationType::Orbit { .. })
    }
}
