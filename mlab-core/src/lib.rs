//! MLab Core Library - linear algebra and projection pipeline
//!
//! This library provides the math behind the lab: change of basis,
//! rotation builders (axis alignment, quaternions, arcball), the camera,
//! the world -> clip -> NDC -> screen pipeline and Phong shading with planar
//! shadows. [`scene::Lab`] ties them together and assembles backend
//! independent draw lists once per frame.

pub mod arcball;
pub mod basis;
pub mod camera;
pub mod command;
pub mod config;
pub mod controls;
pub mod error;
pub mod geometry;
pub mod primitive;
pub mod projection;
pub mod quaternion;
pub mod scene;
pub mod shading;
pub mod transform;

// Re-export commonly used types
pub use arcball::{map_mouse_to_arcball, Arcball, ArcballEvent};
pub use basis::Basis;
pub use camera::{LookAtMode, OrbitCamera};
pub use command::{parse_command, Command};
pub use config::LabConfig;
pub use controls::{Control, ControlSettings, Step};
pub use error::{CommandError, ConfigError};
pub use geometry::CubeMesh;
pub use primitive::{Color, Primitive, PrimitiveKind};
pub use projection::{PipelineTrace, ProjectionMode, ViewParams, Viewport};
pub use quaternion::Quat;
pub use scene::{Frame, Lab};
pub use transform::{Transform, TransformParams};
