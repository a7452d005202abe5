use std::rc::Rc;

use crate::node::{LightingModel, Material, ShaderId, TextureId};

/// Radius of the background sphere, in world units.
pub const BACKGROUND_SPHERE_RADIUS: f32 = 1.0;
/// Width and height segment count of the background sphere.
pub const BACKGROUND_SPHERE_SEGMENTS: u32 = 20;

/// Shape of a scene background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BackgroundKind {
    /// Cube-map skybox.
    Cube,
    /// Inward-facing sphere textured with an equirectangular image.
    Sphere { radius: f32, segments: u32 },
}

/// Geometry drawn behind everything else, following the camera.
///
/// Backgrounds are unlit and neither read nor write depth, so the opaque
/// pass always draws over them.
#[derive(Clone, Debug, PartialEq)]
pub struct Background {
    pub kind: BackgroundKind,
    pub material: Rc<Material>,
}

impl Background {
    pub fn cube(texture: TextureId) -> Self {
        Self {
            kind: BackgroundKind::Cube,
            material: Rc::new(Self::material(ShaderId::SKYBOX, texture)),
        }
    }

    pub fn sphere(texture: TextureId) -> Self {
        Self {
            kind: BackgroundKind::Sphere {
                radius: BACKGROUND_SPHERE_RADIUS,
                segments: BACKGROUND_SPHERE_SEGMENTS,
            },
            material: Rc::new(Self::material(ShaderId::BACKGROUND_SPHERE, texture)),
        }
    }

    fn material(shader: ShaderId, texture: TextureId) -> Material {
        Material::new(shader)
            .lighting_model(LightingModel::Constant)
            .diffuse(texture)
            .depth(false, false)
    }
}
