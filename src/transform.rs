use std::fmt;
use std::str::FromStr;

use glam::{Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};
use crate::scene::SceneObject;

/// Builds the rotation for XYZ Euler angles given in degrees.
pub fn rotation_from_euler_degrees(rotation: Vec3) -> Quat {
    Quat::from_rotation_z(rotation.z.to_radians())
        * Quat::from_rotation_y(rotation.y.to_radians())
        * Quat::from_rotation_x(rotation.x.to_radians())
}

/// Local transform of an object relative to its parent.
pub fn local_matrix(object: &SceneObject) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        object.scale,
        rotation_from_euler_degrees(object.rotation),
        object.position,
    )
}

/// Resolves the world matrix of `name` by walking its parent chain.
///
/// Returns `None` when the object, or one of its ancestors, is missing or when
/// the chain loops back on itself.
pub fn world_matrix(objects: &[SceneObject], name: &str) -> Option<Mat4> {
    let mut matrix = Mat4::IDENTITY;
    let mut current = objects.iter().find(|object| object.name == name)?;
    for _ in 0..=objects.len() {
        matrix = local_matrix(current) * matrix;
        match current.parent.as_deref() {
            None => return Some(matrix),
            Some(parent) => {
                current = objects.iter().find(|object| object.name == parent)?;
            }
        }
    }
    None
}

/// Offset that, added to local vertex positions, carries a translation of
/// `location` into the vertex data of an object rotated by `rotation` and
/// scaled by `scale`.
///
/// This is `(R·S)⁻¹·location`; axes with a zero scale receive no offset.
pub fn location_offset(location: Vec3, rotation: Quat, scale: Vec3) -> Vec3 {
    let unrotated = rotation.inverse() * location;
    let divide = |value: f32, factor: f32| {
        if factor.abs() <= f32::EPSILON {
            0.0
        } else {
            value / factor
        }
    };
    Vec3::new(
        divide(unrotated.x, scale.x),
        divide(unrotated.y, scale.y),
        divide(unrotated.z, scale.z),
    )
}

/// Signed coordinate axis used to describe forward/up conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Axis {
    X,
    Y,
    Z,
    NegX,
    NegY,
    NegZ,
}

impl Axis {
    pub fn to_vec3(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
            Axis::NegX => Vec3::NEG_X,
            Axis::NegY => Vec3::NEG_Y,
            Axis::NegZ => Vec3::NEG_Z,
        }
    }

    fn index(self) -> usize {
        match self {
            Axis::X | Axis::NegX => 0,
            Axis::Y | Axis::NegY => 1,
            Axis::Z | Axis::NegZ => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
            Axis::NegX => "-X",
            Axis::NegY => "-Y",
            Axis::NegZ => "-Z",
        })
    }
}

impl FromStr for Axis {
    type Err = ExportError;

    fn from_str(value: &str) -> Result<Self> {
        Ok(match value.trim().to_ascii_uppercase().as_str() {
            "X" | "+X" => Axis::X,
            "Y" | "+Y" => Axis::Y,
            "Z" | "+Z" => Axis::Z,
            "-X" => Axis::NegX,
            "-Y" => Axis::NegY,
            "-Z" => Axis::NegZ,
            other => return Err(ExportError::Config(format!("unknown axis: {other}"))),
        })
    }
}

impl TryFrom<String> for Axis {
    type Error = ExportError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Axis> for String {
    fn from(axis: Axis) -> Self {
        axis.to_string()
    }
}

/// Forward/up pair describing the orientation of a coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisConvention {
    pub forward: Axis,
    pub up: Axis,
}

impl AxisConvention {
    /// Convention of the scene files: Z up, looking down +Y.
    pub const SCENE: Self = Self {
        forward: Axis::Y,
        up: Axis::Z,
    };

    pub fn new(forward: Axis, up: Axis) -> Result<Self> {
        if forward.index() == up.index() {
            return Err(ExportError::Config(format!(
                "forward axis {forward} and up axis {up} must differ"
            )));
        }
        Ok(Self { forward, up })
    }

    /// Orthonormal basis with columns (right, forward, up).
    fn basis(self) -> Mat3 {
        let forward = self.forward.to_vec3();
        let up = self.up.to_vec3();
        Mat3::from_cols(forward.cross(up), forward, up)
    }
}

/// Rotation that re-expresses vectors from the `from` convention in the `to`
/// convention.
pub fn axis_conversion(from: AxisConvention, to: AxisConvention) -> Mat3 {
    to.basis() * from.basis().transpose()
}
