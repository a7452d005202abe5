//! Renderer configuration.

use crate::error::ConfigError;

/// Number of frame durations averaged by the FPS tracker unless overridden.
pub const DEFAULT_FPS_SAMPLES: usize = 100;

/// Near clip plane used for every eye unless overridden.
pub const DEFAULT_Z_NEAR: f32 = 0.25;

/// Far clip plane used for every eye unless overridden.
pub const DEFAULT_Z_FAR: f32 = 50.0;

/// Tunables for a [`Renderer`](crate::Renderer).
///
/// # Example
///
/// ```
/// use parallax::RendererConfig;
///
/// let config = RendererConfig::new().fps_samples(30).clip_planes(0.1, 100.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RendererConfig {
    /// Size of the FPS moving-average window, in frames.
    pub fps_samples: usize,
    /// Near clip plane written to the render context for each eye.
    pub z_near: f32,
    /// Far clip plane written to the render context for each eye.
    pub z_far: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            fps_samples: DEFAULT_FPS_SAMPLES,
            z_near: DEFAULT_Z_NEAR,
            z_far: DEFAULT_Z_FAR,
        }
    }
}

impl RendererConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fps_samples(mut self, samples: usize) -> Self {
        self.fps_samples = samples;
        self
    }

    pub fn clip_planes(mut self, z_near: f32, z_far: f32) -> Self {
        self.z_near = z_near;
        self.z_far = z_far;
        self
    }

    /// Check the configuration before a renderer is built from it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps_samples == 0 {
            return Err(ConfigError::EmptyFpsWindow);
        }
        for (name, value) in [("z_near", self.z_near), ("z_far", self.z_far)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidClipPlane { name, value });
            }
        }
        if self.z_near >= self.z_far {
            return Err(ConfigError::InvertedClipPlanes {
                near: self.z_near,
                far: self.z_far,
            });
        }
        Ok(())
    }
}
