use std::rc::Rc;

use crate::picking::BoundingBox;

/// Identity of a compiled shader program. Draws sharing a shader are batched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub u32);

impl ShaderId {
    /// Shader used for cube-map backgrounds.
    pub const SKYBOX: ShaderId = ShaderId(u32::MAX);
    /// Shader used for spherical (equirectangular) backgrounds.
    pub const BACKGROUND_SPHERE: ShaderId = ShaderId(u32::MAX - 1);
}

/// Opaque handle to a texture owned by the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightingModel {
    /// Unlit; diffuse color only.
    Constant,
    Lambert,
    #[default]
    Blinn,
    Phong,
}

/// Surface description for one geometry element.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub shader: ShaderId,
    pub lighting_model: LightingModel,
    pub diffuse: Option<TextureId>,
    pub writes_to_depth_buffer: bool,
    pub reads_from_depth_buffer: bool,
}

impl Material {
    pub fn new(shader: ShaderId) -> Self {
        Self {
            shader,
            lighting_model: LightingModel::default(),
            diffuse: None,
            writes_to_depth_buffer: true,
            reads_from_depth_buffer: true,
        }
    }

    pub fn lighting_model(mut self, model: LightingModel) -> Self {
        self.lighting_model = model;
        self
    }

    pub fn diffuse(mut self, texture: TextureId) -> Self {
        self.diffuse = Some(texture);
        self
    }

    /// Toggle both depth read and depth write.
    pub fn depth(mut self, reads: bool, writes: bool) -> Self {
        self.reads_from_depth_buffer = reads;
        self.writes_to_depth_buffer = writes;
        self
    }
}

/// Renderable geometry: a number of elements, each drawn with a material.
///
/// Materials are assigned to elements round-robin, so a single material
/// covers every element.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    element_count: usize,
    materials: Vec<Rc<Material>>,
    bounds: BoundingBox,
}

impl Geometry {
    pub fn new(element_count: usize, materials: Vec<Rc<Material>>) -> Self {
        Self {
            element_count,
            materials,
            bounds: BoundingBox::unit(),
        }
    }

    /// Single-element geometry drawn with `material`.
    pub fn single(material: Material) -> Self {
        Self::new(1, vec![Rc::new(material)])
    }

    /// Set the local-space bounds used for hit testing.
    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn materials(&self) -> &[Rc<Material>] {
        &self.materials
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Material for `element`, or `None` if the geometry has no materials.
    pub fn material_for_element(&self, element: usize) -> Option<&Rc<Material>> {
        if self.materials.is_empty() {
            return None;
        }
        self.materials.get(element % self.materials.len())
    }
}
