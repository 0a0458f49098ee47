use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::scene::{Scene, SceneObject};

/// Selected objects plus the active one, as the host tracks them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub selected: BTreeSet<String>,
    pub active: Option<String>,
}

impl Selection {
    /// Selection holding only `name`, which is also made active.
    pub fn only(name: &str) -> Self {
        Self {
            selected: BTreeSet::from([name.to_string()]),
            active: Some(name.to_string()),
        }
    }
}

/// Thread-safe container mirroring the mutable state of the scene document.
#[derive(Debug, Default)]
pub struct DataModel {
    objects: Arc<RwLock<Vec<SceneObject>>>,
    selection: Arc<RwLock<Selection>>,
}

impl Clone for DataModel {
    fn clone(&self) -> Self {
        Self {
            objects: Arc::clone(&self.objects),
            selection: Arc::clone(&self.selection),
        }
    }
}

impl DataModel {
    /// Creates a data model from an initial set of objects with nothing selected.
    pub fn from_objects(objects: Vec<SceneObject>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(objects)),
            selection: Arc::default(),
        }
    }

    /// Creates a data model holding the objects and selection of a scene.
    pub fn from_scene(scene: Scene) -> Self {
        let selection = Selection {
            selected: scene.selected.into_iter().collect(),
            active: scene.active,
        };
        Self {
            objects: Arc::new(RwLock::new(scene.objects)),
            selection: Arc::new(RwLock::new(selection)),
        }
    }

    /// Returns a snapshot of all stored objects.
    pub fn all_objects(&self) -> Vec<SceneObject> {
        self.objects.read().clone()
    }

    /// Names of the visible mesh objects, in scene order.
    pub fn visible_meshes(&self) -> Vec<String> {
        self.objects
            .read()
            .iter()
            .filter(|object| object.is_mesh() && object.visible)
            .map(|object| object.name.clone())
            .collect()
    }

    /// Returns a snapshot of the current selection.
    pub fn selection(&self) -> Selection {
        self.selection.read().clone()
    }

    /// Replaces the selection, dropping names that are not in the scene.
    pub fn set_selection(&self, selection: Selection) {
        let objects = self.objects.read();
        let known = |name: &String| objects.iter().any(|object| &object.name == name);
        let selected = selection.selected.into_iter().filter(known).collect();
        let active = selection.active.filter(known);
        *self.selection.write() = Selection { selected, active };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ObjectType;

    fn make_object(name: &str, parent: Option<&str>) -> SceneObject {
        SceneObject {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            ..SceneObject::default()
        }
    }

    #[test]
    fn snapshots_are_copies() {
        let model = DataModel::from_objects(vec![make_object("Cube", None)]);
        let mut snapshot = model.all_objects();
        snapshot[0].name = "Sphere".to_string();
        assert_eq!(model.all_objects()[0].name, "Cube");
    }

    #[test]
    fn from_scene_carries_selection() {
        let scene = Scene {
            objects: vec![make_object("Root", None), make_object("Child", Some("Root"))],
            selected: vec!["Child".to_string()],
            active: Some("Root".to_string()),
        };
        let model = DataModel::from_scene(scene);
        let selection = model.selection();
        assert_eq!(selection.selected, BTreeSet::from(["Child".to_string()]));
        assert_eq!(selection.active.as_deref(), Some("Root"));
    }

    #[test]
    fn visible_meshes_skip_hidden_and_non_mesh_objects() {
        let mut hidden = make_object("Hidden", None);
        hidden.visible = false;
        let mut empty = make_object("Pivot", None);
        empty.object_type = ObjectType::Empty;
        let model = DataModel::from_objects(vec![make_object("Cube", None), hidden, empty]);
        assert_eq!(model.visible_meshes(), vec!["Cube".to_string()]);
    }

    #[test]
    fn set_selection_ignores_unknown_names() {
        let model = DataModel::from_objects(vec![make_object("Cube", None)]);
        model.set_selection(Selection {
            selected: BTreeSet::from(["Cube".to_string(), "Ghost".to_string()]),
            active: Some("Ghost".to_string()),
        });
        let selection = model.selection();
        assert_eq!(selection.selected, BTreeSet::from(["Cube".to_string()]));
        assert_eq!(selection.active, None);
    }

    #[test]
    fn clones_share_state() {
        let model = DataModel::from_objects(vec![make_object("Cube", None)]);
        let handle = model.clone();
        handle.set_selection(Selection::only("Cube"));
        assert_eq!(model.selection(), Selection::only("Cube"));
    }
}
