//! Host-independent export core.
//!
//! Everything here works on [`SceneObject`] snapshots, so none of it can
//! reach back into the scene it was handed. An export iteration clones the
//! objects it needs into a [`DuplicateSet`], prepares the clones and hands
//! them to a [`MeshExporter`]. The set is dropped when the iteration ends,
//! whether the exporter succeeded or not.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glam::{Mat3, Quat, Vec3};
use log::{debug, info, warn};

use crate::error::{ExportError, Result};
use crate::exporter::{ExportSettings, MeshExporter};
use crate::obj::MeshData;
use crate::scene::{ObjectType, SceneObject};
use crate::transform::{location_offset, world_matrix};

/// Per-invocation switches of the export command.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Export each object together with all of its descendants.
    pub include_children: bool,
    /// Also move the Z centroid of each mesh to zero.
    pub center_vertical: bool,
    pub settings: ExportSettings,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_children: true,
            center_vertical: false,
            settings: ExportSettings::default(),
        }
    }
}

/// A cloned object flattened to world space, ready for the exporter.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportObject {
    pub name: String,
    pub object_type: ObjectType,
    pub mesh: Option<MeshData>,
    pub location: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl ExportObject {
    /// Rotation and scale part of the object transform.
    pub fn linear_transform(&self) -> Mat3 {
        Mat3::from_quat(self.rotation) * Mat3::from_diagonal(self.scale)
    }
}

/// Scratch copies of one object and, optionally, its descendants.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateSet {
    pub root: String,
    pub objects: Vec<ExportObject>,
}

impl DuplicateSet {
    /// Clones `root` (and its descendants when `include_children` is set)
    /// out of `objects`, resolving each clone's world transform.
    pub fn collect(objects: &[SceneObject], root: &str, include_children: bool) -> Result<Self> {
        let mut names = vec![root.to_string()];
        if include_children {
            names.extend(descendants(objects, root));
        }

        let clones = names
            .iter()
            .map(|name| {
                let source = objects
                    .iter()
                    .find(|object| &object.name == name)
                    .ok_or_else(|| ExportError::UnknownObject(name.clone()))?;
                let world = world_matrix(objects, name)
                    .ok_or_else(|| ExportError::UnknownObject(name.clone()))?;
                let (scale, rotation, location) = world.to_scale_rotation_translation();
                Ok(ExportObject {
                    name: source.name.clone(),
                    object_type: source.object_type.clone(),
                    mesh: source.mesh.clone(),
                    location,
                    rotation,
                    scale,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("duplicated {} object(s) for {root}", clones.len());
        Ok(Self {
            root: root.to_string(),
            objects: clones,
        })
    }

    /// Moves every object's location into its vertex data.
    ///
    /// Rotation and scale stay on the object, and world-space vertex
    /// positions do not change.
    pub fn bake_location(&mut self) {
        for object in &mut self.objects {
            let offset = location_offset(object.location, object.rotation, object.scale);
            if let Some(mesh) = object.mesh.as_mut() {
                for position in &mut mesh.positions {
                    *position += offset;
                }
            }
            object.location = Vec3::ZERO;
        }
    }

    /// Centers every mesh on X/Y (and Z when `vertical` is set).
    pub fn center(&mut self, vertical: bool) {
        for object in &mut self.objects {
            if object.object_type != ObjectType::Mesh {
                continue;
            }
            let Some(mesh) = object.mesh.as_mut() else {
                continue;
            };
            if mesh.is_empty() {
                warn!("{} has no vertices; left as is", object.name);
                continue;
            }
            if let Some(shift) = center_mesh(mesh, vertical) {
                debug!("centered {} by {shift}", object.name);
            }
        }
    }
}

/// Subtracts the vertex mean from every position.
///
/// Z is only shifted when `vertical` is set. Returns the applied shift, or
/// `None` for a mesh without vertices.
pub fn center_mesh(mesh: &mut MeshData, vertical: bool) -> Option<Vec3> {
    let centroid = mesh.centroid()?;
    let shift = Vec3::new(
        centroid.x,
        centroid.y,
        if vertical { centroid.z } else { 0.0 },
    );
    for position in &mut mesh.positions {
        *position -= shift;
    }
    Some(shift)
}

/// Transitive children of `name`, depth first, in scene order.
pub fn descendants(objects: &[SceneObject], name: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut visited = HashSet::from([name.to_string()]);
    collect_descendants(objects, name, &mut visited, &mut result);
    result
}

fn collect_descendants(
    objects: &[SceneObject],
    name: &str,
    visited: &mut HashSet<String>,
    result: &mut Vec<String>,
) {
    for child in objects
        .iter()
        .filter(|object| object.parent.as_deref() == Some(name))
    {
        if !visited.insert(child.name.clone()) {
            continue;
        }
        result.push(child.name.clone());
        collect_descendants(objects, &child.name, visited, result);
    }
}

/// Replaces every character that is not alphanumeric, a space, `-`, `_` or
/// `.` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Output file for `name` inside `dir`.
pub fn output_path(dir: &Path, name: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{extension}", sanitize_filename(name)))
}

/// A single written file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub object: String,
    pub path: PathBuf,
}

/// Outcome of a batch export.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportResult {
    pub files: Vec<ExportedFile>,
}

impl ExportResult {
    pub fn exported(&self) -> usize {
        self.files.len()
    }
}

/// Exports every approved object into its own file inside `dir`.
///
/// Fails before writing anything when `dir` is missing, when nothing is
/// approved or when an approved name is unknown. An exporter failure aborts
/// the batch; files written before it stay on disk.
pub fn export_meshes(
    objects: &[SceneObject],
    approved: &[&str],
    dir: &Path,
    options: &ExportOptions,
    exporter: &dyn MeshExporter,
) -> Result<ExportResult> {
    export_meshes_with(objects, approved, dir, options, exporter, |_| {})
}

/// Same as [`export_meshes`], calling `before_each` with the name of every
/// object right before it is duplicated.
pub fn export_meshes_with(
    objects: &[SceneObject],
    approved: &[&str],
    dir: &Path,
    options: &ExportOptions,
    exporter: &dyn MeshExporter,
    mut before_each: impl FnMut(&str),
) -> Result<ExportResult> {
    if !dir.is_dir() {
        return Err(ExportError::MissingDirectory(dir.to_path_buf()));
    }
    if approved.is_empty() {
        return Err(ExportError::EmptySelection);
    }
    if let Some(unknown) = approved
        .iter()
        .find(|name| !objects.iter().any(|object| object.name == **name))
    {
        return Err(ExportError::UnknownObject(unknown.to_string()));
    }
    options.settings.validate()?;

    let mut result = ExportResult::default();
    let mut written = HashSet::new();
    for &name in approved {
        let is_mesh = objects
            .iter()
            .any(|object| object.name == name && object.is_mesh());
        if !is_mesh {
            warn!("{name} is not a mesh object; skipped");
            continue;
        }

        before_each(name);
        let mut duplicates = DuplicateSet::collect(objects, name, options.include_children)?;
        duplicates.bake_location();
        duplicates.center(options.center_vertical);

        let path = output_path(dir, name, exporter.extension());
        if !written.insert(path.clone()) {
            warn!("{} is written more than once; last export wins", path.display());
        }
        exporter.export(&path, &duplicates.objects, &options.settings)?;
        info!("exported {name} to {}", path.display());
        result.files.push(ExportedFile {
            object: name.to_string(),
            path,
        });
    }

    Ok(result)
}
