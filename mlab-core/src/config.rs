//! Lab configuration.
//!
//! Loaded from JSON; every field is optional and falls back to the values
//! the lab starts with.
use std::path::Path;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::basis::Basis;
use crate::camera::OrbitCamera;
use crate::controls::ControlSettings;
use crate::error::ConfigError;
use crate::geometry::{CubeMesh, MAX_GRID_DIVISIONS};
use crate::projection::ViewParams;
use crate::scene::{Lab, SceneGeometry, DEFAULT_GRID_DIVISIONS};
use crate::shading::PhongTerms;

/// Initial orbit of the camera around the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub radius: f32,
    /// Radians
    pub yaw: f32,
    /// Radians
    pub pitch: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let camera = OrbitCamera::default();
        Self {
            radius: camera.radius,
            yaw: camera.yaw,
            pitch: camera.pitch,
        }
    }
}

/// Root configuration of the lab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub controls: ControlSettings,
    pub view: ViewParams,
    pub camera: CameraConfig,
    pub cube_half_size: f32,
    /// Rows are `v1`, `v2`, `v3`
    pub v_basis: [[f32; 3]; 3],
    /// Rows are `u1`, `u2`, `u3`
    pub u_basis: [[f32; 3]; 3],
    /// Coefficients of `w` in the v-basis
    pub a: [f32; 3],
    /// Light position above the ground
    pub light: [f32; 3],
    pub phong: PhongTerms,
    pub grid_divisions: usize,
    /// Target frame rate of the front end
    pub fps: u32,
}

impl Default for LabConfig {
    fn default() -> Self {
        let scene = SceneGeometry::default();
        let rows = |b: &Basis| b.vectors().map(|v| [v.x, v.y, v.z]);
        Self {
            controls: ControlSettings::default(),
            view: ViewParams::default(),
            camera: CameraConfig::default(),
            cube_half_size: 0.5,
            v_basis: rows(&scene.v_basis),
            u_basis: rows(&scene.u_basis),
            a: scene.a.into(),
            light: scene.light.coords.into(),
            phong: PhongTerms::default(),
            grid_divisions: DEFAULT_GRID_DIVISIONS,
            fps: 30,
        }
    }
}

impl LabConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &'static str, value: f32| {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                })
            }
        };

        positive("camera.radius", self.camera.radius)?;
        positive("cube_half_size", self.cube_half_size)?;
        positive("view.ortho_size", self.view.ortho_size)?;
        positive("view.focal_length", self.view.focal_length)?;
        if self.fps == 0 {
            return Err(ConfigError::Invalid {
                field: "fps",
                reason: "must be at least 1".into(),
            });
        }
        if !(self.view.fov_deg > 0.0 && self.view.fov_deg < 180.0) {
            return Err(ConfigError::Invalid {
                field: "view.fov_deg",
                reason: format!("must lie in (0, 180), got {}", self.view.fov_deg),
            });
        }
        if self.grid_divisions > MAX_GRID_DIVISIONS {
            return Err(ConfigError::Invalid {
                field: "grid_divisions",
                reason: format!(
                    "must be at most {MAX_GRID_DIVISIONS}, got {}",
                    self.grid_divisions
                ),
            });
        }
        Ok(())
    }

    /// A fresh lab in the configured state.
    pub fn build_lab(&self) -> Lab {
        let basis = |rows: &[[f32; 3]; 3]| {
            let [e1, e2, e3] = rows.map(Vector3::from);
            Basis::new(e1, e2, e3)
        };
        let mut camera = OrbitCamera::new(self.camera.radius);
        camera.yaw = self.camera.yaw;
        camera.pitch = self.camera.pitch;

        Lab {
            view: self.view,
            camera,
            controls: self.controls,
            scene: SceneGeometry::new(
                basis(&self.v_basis),
                basis(&self.u_basis),
                Vector3::from(self.a),
                Point3::from(self.light),
            ),
            cube: CubeMesh::new(self.cube_half_size),
            phong: self.phong,
            grid_divisions: self.grid_divisions,
            ..Lab::default()
        }
    }
}
