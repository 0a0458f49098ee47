use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use glam::{Mat3, Vec3};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};
use crate::pipeline::ExportObject;
use crate::scene::ObjectType;
use crate::transform::{axis_conversion, Axis, AxisConvention};

/// How normals are written for exported geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shading {
    /// One normal per face.
    #[default]
    Flat,
    /// Vertex normals averaged over adjacent faces.
    Smooth,
}

/// Settings passed to the exporter for every file.
///
/// The defaults match what game engines expect: -Z forward, Y up, axis
/// conversion baked into the vertex data and flat-shaded triangles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSettings {
    pub axis_forward: Axis,
    pub axis_up: Axis,
    pub global_scale: f32,
    pub shading: Shading,
    pub bake_space_transform: bool,
    pub object_types: Vec<ObjectType>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            axis_forward: Axis::NegZ,
            axis_up: Axis::Y,
            global_scale: 1.0,
            shading: Shading::Flat,
            bake_space_transform: true,
            object_types: vec![ObjectType::Mesh, ObjectType::Armature, ObjectType::Empty],
        }
    }
}

impl ExportSettings {
    pub fn validate(&self) -> Result<()> {
        AxisConvention::new(self.axis_forward, self.axis_up)?;
        if !self.global_scale.is_finite() || self.global_scale <= 0.0 {
            return Err(ExportError::Config(format!(
                "global_scale must be a positive number, got {}",
                self.global_scale
            )));
        }
        Ok(())
    }

    /// Matrix that carries scene-space vectors into the target convention.
    fn space_transform(&self) -> Result<Mat3> {
        if !self.bake_space_transform {
            return Ok(Mat3::IDENTITY);
        }
        let target = AxisConvention::new(self.axis_forward, self.axis_up)?;
        Ok(axis_conversion(AxisConvention::SCENE, target))
    }
}

/// Serializes one group of prepared objects into a single file.
pub trait MeshExporter {
    /// File extension, without the leading dot.
    fn extension(&self) -> &str;

    fn export(&self, path: &Path, objects: &[ExportObject], settings: &ExportSettings)
        -> Result<()>;
}

/// Writes Wavefront OBJ files, one `o` group per mesh object.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjExporter;

impl ObjExporter {
    pub const EXTENSION: &'static str = "obj";
}

impl MeshExporter for ObjExporter {
    fn extension(&self) -> &str {
        Self::EXTENSION
    }

    fn export(
        &self,
        path: &Path,
        objects: &[ExportObject],
        settings: &ExportSettings,
    ) -> Result<()> {
        settings.validate()?;
        let space = settings.space_transform()?;
        let io_error = |source: io::Error| ExportError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        write_obj(&mut writer, objects, settings, space).map_err(io_error)?;
        writer.flush().map_err(io_error)?;
        debug!("wrote {} object(s) to {}", objects.len(), path.display());
        Ok(())
    }
}

fn write_obj(
    writer: &mut impl Write,
    objects: &[ExportObject],
    settings: &ExportSettings,
    space: Mat3,
) -> io::Result<()> {
    writeln!(
        writer,
        "# forward {} up {}",
        settings.axis_forward, settings.axis_up
    )?;
    let mut vertex_base = 1usize;
    let mut normal_base = 1usize;

    for object in objects {
        if !settings.object_types.contains(&object.object_type) {
            continue;
        }
        let mesh = match (&object.object_type, &object.mesh) {
            (ObjectType::Mesh, Some(mesh)) => mesh,
            _ => {
                writeln!(writer, "# {} {}", object.object_type, object.name)?;
                continue;
            }
        };

        let linear = space * object.linear_transform() * settings.global_scale;
        let offset = space * object.location * settings.global_scale;
        let positions: Vec<Vec3> = mesh
            .positions
            .iter()
            .map(|position| linear * *position + offset)
            .collect();
        let mirrored = linear.determinant() < 0.0;
        let triangles: Vec<[usize; 3]> = mesh
            .triangles
            .iter()
            .filter(|triangle| triangle.iter().all(|&i| (i as usize) < positions.len()))
            .map(|[a, b, c]| {
                let (a, b, c) = (*a as usize, *b as usize, *c as usize);
                if mirrored {
                    [a, c, b]
                } else {
                    [a, b, c]
                }
            })
            .collect();

        writeln!(writer, "o {}", object.name)?;
        for position in &positions {
            write_vec3(writer, "v", *position)?;
        }

        match settings.shading {
            Shading::Flat => {
                writeln!(writer, "s off")?;
                for triangle in &triangles {
                    write_vec3(writer, "vn", face_normal(&positions, triangle))?;
                }
                for (face, [a, b, c]) in triangles.iter().enumerate() {
                    let n = normal_base + face;
                    writeln!(
                        writer,
                        "f {}//{n} {}//{n} {}//{n}",
                        vertex_base + a,
                        vertex_base + b,
                        vertex_base + c
                    )?;
                }
                normal_base += triangles.len();
            }
            Shading::Smooth => {
                writeln!(writer, "s 1")?;
                let mut normals = vec![Vec3::ZERO; positions.len()];
                for triangle in &triangles {
                    let normal = face_normal(&positions, triangle);
                    for &index in triangle {
                        normals[index] += normal;
                    }
                }
                for normal in &normals {
                    write_vec3(writer, "vn", normal.normalize_or_zero())?;
                }
                for [a, b, c] in &triangles {
                    writeln!(
                        writer,
                        "f {}//{} {}//{} {}//{}",
                        vertex_base + a,
                        normal_base + a,
                        vertex_base + b,
                        normal_base + b,
                        vertex_base + c,
                        normal_base + c
                    )?;
                }
                normal_base += normals.len();
            }
        }
        vertex_base += positions.len();
    }
    Ok(())
}

fn write_vec3(writer: &mut impl Write, tag: &str, value: Vec3) -> io::Result<()> {
    // Adding zero folds -0.0 into 0.0 so output never shows "-0.000000".
    let value = value + Vec3::ZERO;
    writeln!(writer, "{tag} {:.6} {:.6} {:.6}", value.x, value.y, value.z)
}

fn face_normal(positions: &[Vec3], [a, b, c]: &[usize; 3]) -> Vec3 {
    let (p0, p1, p2) = (positions[*a], positions[*b], positions[*c]);
    (p1 - p0).cross(p2 - p0).normalize_or_zero()
}
