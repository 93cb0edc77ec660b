//! Parameter increments driven by held keys
use serde::{Deserialize, Serialize};

use crate::scene::Lab;

/// Narrowest and widest field of view the controls allow, in degrees
const FOV_RANGE: (f32, f32) = (1.0, 179.0);
const MIN_FOCAL_LENGTH: f32 = 0.1;
const MIN_ORTHO_SIZE: f32 = 0.1;

/// Input sensitivity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    /// Radians (or world units) per second for rotations and translations
    pub turn_speed: f32,
    /// Units per second for focal length and field of view
    pub focal_speed: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            turn_speed: 1.0,
            focal_speed: 30.0,
        }
    }
}

/// Direction of a continuous adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Increase,
    Decrease,
}

impl Step {
    pub fn sign(self) -> f32 {
        match self {
            Step::Increase => 1.0,
            Step::Decrease => -1.0,
        }
    }
}

/// One front-end action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    FocalLength(Step),
    Distance(Step),
    Yaw(Step),
    Pitch(Step),
    Fov(Step),
    YTranslate(Step),
    PlanePitch(Step),
    CameraYaw(Step),
    CameraPitch(Step),
    AxisAngle(Step),
    OrthoSize(Step),
    ToggleLookAt,
    ToggleProjection,
    ResetTransform,
    ResetArcball,
}

impl Control {
    /// Apply this action to `lab` for a frame lasting `dt` seconds.
    pub fn apply(self, lab: &mut Lab, dt: f32) {
        let turn = lab.controls.turn_speed * dt;
        let focal = lab.controls.focal_speed * dt;

        match self {
            Control::FocalLength(step) => {
                let view = &mut lab.view;
                view.focal_length = (view.focal_length + step.sign() * focal).max(MIN_FOCAL_LENGTH);
            }
            Control::Distance(step) => lab.transform.distance += step.sign() * turn,
            Control::Yaw(step) => lab.transform.yaw += step.sign() * turn,
            Control::Pitch(step) => lab.transform.pitch += step.sign() * turn,
            Control::Fov(step) => {
                let view = &mut lab.view;
                view.fov_deg = (view.fov_deg + step.sign() * focal).clamp(FOV_RANGE.0, FOV_RANGE.1);
            }
            Control::YTranslate(step) => lab.transform.y_trans += step.sign() * turn,
            Control::PlanePitch(step) => lab.transform.pitch_plane += step.sign() * turn,
            Control::CameraYaw(step) => lab.camera.yaw += step.sign() * turn,
            Control::CameraPitch(step) => lab.camera.pitch += step.sign() * turn,
            Control::AxisAngle(step) => lab.transform.axis_angle += step.sign() * turn,
            Control::OrthoSize(step) => {
                let view = &mut lab.view;
                view.ortho_size = (view.ortho_size + step.sign() * turn).max(MIN_ORTHO_SIZE);
            }
            Control::ToggleLookAt => lab.view.look_at = lab.view.look_at.toggled(),
            Control::ToggleProjection => lab.view.projection = lab.view.projection.toggled(),
            Control::ResetTransform => lab.transform.reset(),
            Control::ResetArcball => lab.arcball.reset(),
        }
    }
}
