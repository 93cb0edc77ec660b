//! Console commands typed into the front end.
//!
//! ```text
//! set <v1|v2|v3|u1|u2|u3|a|light> <x> <y> <z>
//! mode <persp|ortho>
//! lookat <library|custom>
//! fov <degrees>
//! reset
//! ```
use nalgebra::{Point3, Vector3};
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{multispace0, multispace1},
    combinator::{all_consuming, map, value},
    number::complete::float,
    sequence::{delimited, preceded, tuple},
    IResult,
};
use tracing::debug;

use crate::camera::LookAtMode;
use crate::error::CommandError;
use crate::projection::ProjectionMode;
use crate::scene::Lab;

/// Editable vector of the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorSlot {
    V1,
    V2,
    V3,
    U1,
    U2,
    U3,
    A,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Set(VectorSlot, Vector3<f32>),
    Mode(ProjectionMode),
    LookAt(LookAtMode),
    Fov(f32),
    Reset,
}

fn slot(input: &str) -> IResult<&str, VectorSlot> {
    alt((
        value(VectorSlot::V1, tag_no_case("v1")),
        value(VectorSlot::V2, tag_no_case("v2")),
        value(VectorSlot::V3, tag_no_case("v3")),
        value(VectorSlot::U1, tag_no_case("u1")),
        value(VectorSlot::U2, tag_no_case("u2")),
        value(VectorSlot::U3, tag_no_case("u3")),
        value(VectorSlot::Light, tag_no_case("light")),
        value(VectorSlot::A, tag_no_case("a")),
    ))(input)
}

fn vector(input: &str) -> IResult<&str, Vector3<f32>> {
    map(
        tuple((
            preceded(multispace1, float),
            preceded(multispace1, float),
            preceded(multispace1, float),
        )),
        |(x, y, z)| Vector3::new(x, y, z),
    )(input)
}

fn set(input: &str) -> IResult<&str, Command> {
    map(
        tuple((tag_no_case("set"), multispace1, slot, vector)),
        |(_, _, slot, v)| Command::Set(slot, v),
    )(input)
}

fn mode(input: &str) -> IResult<&str, Command> {
    let projection = alt((
        value(ProjectionMode::Perspective, tag_no_case("persp")),
        value(ProjectionMode::Orthographic, tag_no_case("ortho")),
    ));
    map(
        preceded(tuple((tag_no_case("mode"), multispace1)), projection),
        Command::Mode,
    )(input)
}

fn look_at(input: &str) -> IResult<&str, Command> {
    let construction = alt((
        value(LookAtMode::Library, tag_no_case("library")),
        value(LookAtMode::Custom, tag_no_case("custom")),
    ));
    map(
        preceded(tuple((tag_no_case("lookat"), multispace1)), construction),
        Command::LookAt,
    )(input)
}

fn fov(input: &str) -> IResult<&str, Command> {
    map(
        preceded(tuple((tag_no_case("fov"), multispace1)), float),
        Command::Fov,
    )(input)
}

fn command(input: &str) -> IResult<&str, Command> {
    all_consuming(delimited(
        multispace0,
        alt((set, mode, look_at, fov, value(Command::Reset, tag_no_case("reset")))),
        multispace0,
    ))(input)
}

/// Parse one console line.
pub fn parse_command(input: &str) -> Result<Command, CommandError> {
    if input.trim().is_empty() {
        return Err(CommandError::Empty);
    }
    command(input)
        .map(|(_, cmd)| cmd)
        .map_err(|_| CommandError::Parse {
            input: input.trim().to_string(),
        })
}

impl Lab {
    /// Apply a console command; edits to the scene refresh `w` and `b`.
    pub fn execute(&mut self, command: Command) {
        debug!(?command, "console command");
        match command {
            Command::Set(slot, v) => {
                let scene = &mut self.scene;
                match slot {
                    VectorSlot::V1 => scene.v_basis.e1 = v,
                    VectorSlot::V2 => scene.v_basis.e2 = v,
                    VectorSlot::V3 => scene.v_basis.e3 = v,
                    VectorSlot::U1 => scene.u_basis.e1 = v,
                    VectorSlot::U2 => scene.u_basis.e2 = v,
                    VectorSlot::U3 => scene.u_basis.e3 = v,
                    VectorSlot::A => scene.a = v,
                    VectorSlot::Light => scene.light = Point3::from(v),
                }
            }
            Command::Mode(projection) => self.view.projection = projection,
            Command::LookAt(mode) => self.view.look_at = mode,
            Command::Fov(deg) => self.view.fov_deg = deg.clamp(1.0, 179.0),
            Command::Reset => {
                self.transform.reset();
                self.arcball.reset();
            }
        }
        self.scene.recompute();
    }
}
