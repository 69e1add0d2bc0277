//! Toolkit configuration.
//!
//! All knobs live in [`ToolkitConfig`]. It can be built in code or loaded
//! from YAML; missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::alignment::{SolverConfig, WarpConfig, WarperKind};
use crate::geometry::Size;

// =============================================================================
// Magnifier
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagnifierConfig {
    /// Side length of the square lens, in output pixels.
    pub size: usize,
    /// Enlargement factor relative to image pixels.
    pub factor: usize,
}

impl Default for MagnifierConfig {
    fn default() -> Self {
        Self {
            size: 200,
            factor: 4,
        }
    }
}

impl MagnifierConfig {
    pub fn validate(&self) {
        assert!(self.size > 0, "magnifier size must be positive");
        assert!(
            self.factor >= 1,
            "magnifier factor must be at least 1, got {}",
            self.factor
        );
        assert!(
            self.size >= self.factor,
            "magnifier size {} must be at least the factor {}",
            self.size,
            self.factor
        );
    }
}

// =============================================================================
// Toolkit
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Fixed canvas size each panel renders into.
    pub canvas: Size,
    pub warper: WarperKind,
    pub warp: WarpConfig,
    pub solver: SolverConfig,
    /// `|r|` at or above this raises a collinearity warning.
    pub collinearity_threshold: f64,
    /// Multiplicative step for zoom in/out.
    pub zoom_step: f64,
    /// Largest render-to-image scale reachable by zooming in.
    pub max_zoom: f64,
    /// Control-point hit radius, in canvas pixels.
    pub hit_radius: f64,
    pub magnifier: MagnifierConfig,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            canvas: Size::new(600, 600),
            warper: WarperKind::default(),
            warp: WarpConfig::default(),
            solver: SolverConfig::default(),
            collinearity_threshold: 0.8,
            zoom_step: 1.25,
            max_zoom: 16.0,
            hit_radius: 10.0,
            magnifier: MagnifierConfig::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid toolkit configuration: {0}")]
    Yaml(#[from] serde_yml::Error),
}

impl ToolkitConfig {
    /// Validate configuration parameters.
    ///
    /// # Panics
    /// Panics on values that make the toolkit meaningless (zero canvas,
    /// zoom step ≤ 1, ...).
    pub fn validate(&self) {
        assert!(
            !self.canvas.is_empty(),
            "canvas must be non-empty, got {}x{}",
            self.canvas.w,
            self.canvas.h
        );
        assert!(
            self.collinearity_threshold > 0.0 && self.collinearity_threshold <= 1.0,
            "collinearity_threshold must be in (0, 1], got {}",
            self.collinearity_threshold
        );
        assert!(
            self.zoom_step > 1.0,
            "zoom_step must be greater than 1, got {}",
            self.zoom_step
        );
        assert!(
            self.max_zoom >= 1.0,
            "max_zoom must be at least 1, got {}",
            self.max_zoom
        );
        assert!(
            self.hit_radius > 0.0,
            "hit_radius must be positive, got {}",
            self.hit_radius
        );
        self.solver.validate();
        self.magnifier.validate();
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yml::to_string(self)?)
    }

    /// The subset of settings each panel needs for view and pointer handling.
    pub fn view(&self) -> ViewConfig {
        ViewConfig {
            canvas: self.canvas,
            zoom_step: self.zoom_step,
            max_zoom: self.max_zoom,
            hit_radius: self.hit_radius,
            magnifier: self.magnifier,
            border: self.warp.border,
        }
    }
}

/// Per-panel view settings, copied out of [`ToolkitConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewConfig {
    pub canvas: Size,
    pub zoom_step: f64,
    pub max_zoom: f64,
    pub hit_radius: f64,
    pub magnifier: MagnifierConfig,
    /// Fill for magnifier samples outside the image.
    pub border: [u8; 4],
}

impl Default for ViewConfig {
    fn default() -> Self {
        ToolkitConfig::default().view()
    }
}
