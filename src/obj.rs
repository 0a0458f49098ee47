use anyhow::{anyhow, Context, Result};
use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Vertex positions and triangle list of a single mesh.
///
/// Positions are in the owning object's local space. Polygons are fanned into
/// triangles when the mesh is read, so every face references three entries of
/// `positions`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl MeshData {
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            triangles,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Arithmetic mean of all vertex positions, `None` for an empty mesh.
    ///
    /// Accumulates in `f64` so dense meshes far from the origin keep their
    /// precision.
    pub fn centroid(&self) -> Option<Vec3> {
        if self.positions.is_empty() {
            return None;
        }
        let sum = self
            .positions
            .iter()
            .fold(DVec3::ZERO, |acc, position| acc + position.as_dvec3());
        Some((sum / self.positions.len() as f64).as_vec3())
    }
}

/// Parses an OBJ file from memory.
///
/// Only positions and faces are read; texture coordinates and normals are
/// ignored since normals are rebuilt on export. A file without any `v` line
/// yields an empty mesh.
pub fn load_obj_from_str(data: &str) -> Result<MeshData> {
    let mut positions = Vec::new();
    let mut triangles = Vec::new();

    for (line_no, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };
        match tag {
            "v" => positions.push(
                parse_vec3(parts)
                    .with_context(|| format!("invalid vertex on line {}", line_no + 1))?,
            ),
            "f" => {
                let polygon = parse_face(parts, positions.len())
                    .with_context(|| format!("invalid face on line {}", line_no + 1))?;
                triangulate_face(&polygon, &mut triangles);
            }
            _ => {}
        }
    }

    Ok(MeshData {
        positions,
        triangles,
    })
}

fn parse_vec3<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Vec3> {
    let mut next = || -> Result<f32> {
        Ok(parts
            .next()
            .ok_or_else(|| anyhow!("missing vector component"))?
            .parse::<f32>()?)
    };
    let x = next()?;
    let y = next()?;
    let z = next()?;
    Ok(Vec3::new(x, y, z))
}

/// Resolves the position index of every corner of a face against the
/// vertices declared so far.
fn parse_face<'a>(parts: impl Iterator<Item = &'a str>, declared: usize) -> Result<Vec<u32>> {
    let mut indices = Vec::new();
    for part in parts {
        let raw = part
            .split('/')
            .next()
            .ok_or_else(|| anyhow!("missing vertex index"))?
            .parse::<i32>()?;
        let index = fix_index(raw, declared)
            .ok_or_else(|| anyhow!("vertex index {raw} out of range"))?;
        indices.push(index as u32);
    }
    if indices.len() < 3 {
        return Err(anyhow!("faces must reference at least 3 vertices"));
    }
    Ok(indices)
}

fn triangulate_face(polygon: &[u32], triangles: &mut Vec<[u32; 3]>) {
    if polygon.len() < 3 {
        return;
    }
    for i in 1..(polygon.len() - 1) {
        triangles.push([polygon[0], polygon[i], polygon[i + 1]]);
    }
}

fn fix_index(index: i32, len: usize) -> Option<usize> {
    if index > 0 {
        let zero_based = index as usize - 1;
        (zero_based < len).then_some(zero_based)
    } else if index < 0 {
        let abs = index.unsigned_abs() as usize;
        (abs <= len).then_some(len - abs)
    } else {
        None
    }
}
