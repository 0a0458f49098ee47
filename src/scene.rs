use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use glam::Vec3;
use log::debug;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::obj::{load_obj_from_str, MeshData};

/// Scene as described by a scene XML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    /// Names of the objects flagged `<selected>`, in declaration order.
    #[serde(default)]
    pub selected: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
}

impl Scene {
    /// Reads a scene file and loads every referenced OBJ mesh.
    ///
    /// Mesh paths are resolved relative to the directory holding the scene.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path)
            .with_context(|| format!("unable to read scene {}", path.display()))?;
        let mut scene = Self::from_xml(&xml)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));

        for object in &mut scene.objects {
            let Some(mesh_path) = object.mesh_path.as_deref() else {
                continue;
            };
            let full = base.join(mesh_path);
            let data = fs::read_to_string(&full)
                .with_context(|| format!("unable to read mesh {}", full.display()))?;
            let mesh = load_obj_from_str(&data)
                .with_context(|| format!("failed to parse mesh {}", full.display()))?;
            debug!(
                "loaded mesh {} for {} ({} vertices)",
                full.display(),
                object.name,
                mesh.vertex_count()
            );
            object.mesh = Some(mesh);
        }

        Ok(scene)
    }

    /// Parses the scene XML without touching the filesystem.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let root = document.root_element();
        let mut objects = Vec::new();
        let mut selected = Vec::new();

        for node in root.descendants().filter(|n| n.has_tag_name("object")) {
            let mut object = SceneObject::default();
            object.name = required_text(&node, "name")?;
            object.object_type = optional_text(&node, "type")
                .map(|value| ObjectType::from_name(&value))
                .unwrap_or(ObjectType::Mesh);
            object.mesh_path = optional_text(&node, "mesh");
            object.parent = optional_text(&node, "parent");
            object.visible = parse_bool(optional_text(&node, "visible"), true)
                .with_context(|| format!("invalid <visible> on {}", object.name))?;
            object.position = parse_vec3(optional_text(&node, "position"), object.position)
                .with_context(|| format!("invalid <position> on {}", object.name))?;
            object.rotation = parse_vec3(optional_text(&node, "rotation"), object.rotation)
                .with_context(|| format!("invalid <rotation> on {}", object.name))?;
            object.scale = parse_vec3(optional_text(&node, "scale"), object.scale)
                .with_context(|| format!("invalid <scale> on {}", object.name))?;
            if parse_bool(optional_text(&node, "selected"), false)
                .with_context(|| format!("invalid <selected> on {}", object.name))?
            {
                selected.push(object.name.clone());
            }
            objects.push(object);
        }

        let active = root
            .attribute("active")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let scene = Self {
            objects,
            selected,
            active,
        };
        scene.validate()?;
        Ok(scene)
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.name == name)
    }

    fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for object in &self.objects {
            if !names.insert(object.name.as_str()) {
                bail!("duplicate object name: {}", object.name);
            }
        }
        for object in &self.objects {
            if let Some(parent) = object.parent.as_deref() {
                if !names.contains(parent) {
                    bail!("{} refers to unknown parent {parent}", object.name);
                }
            }
            let mut seen = HashSet::from([object.name.as_str()]);
            let mut cursor = object.parent.as_deref();
            while let Some(parent) = cursor {
                if !seen.insert(parent) {
                    bail!("parent cycle through {}", object.name);
                }
                cursor = self.object(parent).and_then(|p| p.parent.as_deref());
            }
        }
        if let Some(active) = self.active.as_deref() {
            if !names.contains(active) {
                bail!("active object {active} is not in the scene");
            }
        }
        Ok(())
    }
}

/// Kind of node in the scene graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Mesh,
    Empty,
    Armature,
    Camera,
    Light,
    Other(String),
}

impl ObjectType {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "mesh" => Self::Mesh,
            "empty" => Self::Empty,
            "armature" => Self::Armature,
            "camera" => Self::Camera,
            "light" => Self::Light,
            _ => Self::Other(name.to_string()),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mesh => f.write_str("mesh"),
            Self::Empty => f.write_str("empty"),
            Self::Armature => f.write_str("armature"),
            Self::Camera => f.write_str("camera"),
            Self::Light => f.write_str("light"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Scene object as described by the scene file.
///
/// `position`, `rotation` (XYZ Euler, degrees) and `scale` are relative to
/// `parent` when one is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
}

impl SceneObject {
    pub fn is_mesh(&self) -> bool {
        self.object_type == ObjectType::Mesh
    }
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            name: String::new(),
            object_type: ObjectType::Mesh,
            mesh_path: None,
            mesh: None,
            parent: None,
            visible: default_visible(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: default_scale(),
        }
    }
}

fn default_visible() -> bool {
    true
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let components = value
        .split_whitespace()
        .map(|component| component.parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| anyhow!("failed to parse vector {value:?}: {err}"))?;
    match components.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(anyhow!("vector {value:?} must have 3 components")),
    }
}

fn parse_bool(value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref() {
        None => Ok(default),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(anyhow!("expected a boolean, got {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    <scene active="Crate">
        <object>
            <name>Crate</name>
            <position>1 2 3</position>
            <rotation>0 0 90</rotation>
            <selected>true</selected>
        </object>
        <object>
            <name>Lid</name>
            <parent>Crate</parent>
            <visible>false</visible>
        </object>
        <object>
            <name>Pivot</name>
            <type>empty</type>
        </object>
    </scene>
    "#;

    #[test]
    fn parse_scene_populates_objects_and_selection() {
        let scene = Scene::from_xml(SAMPLE).unwrap();
        assert_eq!(scene.objects.len(), 3);
        let crate_object = scene.object("Crate").unwrap();
        assert_eq!(crate_object.object_type, ObjectType::Mesh);
        assert_eq!(crate_object.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(crate_object.rotation, Vec3::new(0.0, 0.0, 90.0));
        assert_eq!(crate_object.scale, Vec3::ONE);

        let lid = scene.object("Lid").unwrap();
        assert_eq!(lid.parent.as_deref(), Some("Crate"));
        assert!(!lid.visible);

        assert_eq!(scene.object("Pivot").unwrap().object_type, ObjectType::Empty);
        assert_eq!(scene.selected, vec!["Crate".to_string()]);
        assert_eq!(scene.active.as_deref(), Some("Crate"));
    }

    #[test]
    fn missing_name_is_an_error() {
        let bad = "<scene><object><type>mesh</type></object></scene>";
        assert!(Scene::from_xml(bad).is_err());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let bad = "<scene><object><name>A</name></object><object><name>A</name></object></scene>";
        assert!(Scene::from_xml(bad).is_err());
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let bad = "<scene><object><name>A</name><parent>Ghost</parent></object></scene>";
        assert!(Scene::from_xml(bad).is_err());
    }

    #[test]
    fn parent_cycle_is_rejected() {
        let bad = r#"<scene>
            <object><name>A</name><parent>B</parent></object>
            <object><name>B</name><parent>A</parent></object>
        </scene>"#;
        assert!(Scene::from_xml(bad).is_err());
    }

    #[test]
    fn short_vector_is_rejected() {
        let bad = "<scene><object><name>A</name><position>1 2</position></object></scene>";
        assert!(Scene::from_xml(bad).is_err());
    }

    #[test]
    fn load_resolves_meshes_next_to_scene() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("meshes")).unwrap();
        std::fs::write(
            dir.path().join("meshes/tri.obj"),
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        )
        .unwrap();
        let scene_path = dir.path().join("scene.xml");
        std::fs::write(
            &scene_path,
            "<scene><object><name>Tri</name><mesh>meshes/tri.obj</mesh></object></scene>",
        )
        .unwrap();

        let scene = Scene::load(&scene_path).unwrap();
        let mesh = scene.object("Tri").unwrap().mesh.as_ref().unwrap();
        assert_eq!(mesh.vertex_count(), 3);
    }
}
