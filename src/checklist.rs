use serde::{Deserialize, Serialize};

use crate::data_model::DataModel;

/// One row of the export checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub name: String,
    pub include: bool,
}

/// Objects offered for export, sorted by name.
///
/// The checklist is a value: every edit returns a new checklist and leaves the
/// original untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExportChecklist {
    entries: Vec<ExportEntry>,
}

impl ExportChecklist {
    /// Lists every visible mesh object of the model, all included.
    pub fn discover(model: &DataModel) -> Self {
        Self::from_names(model.visible_meshes())
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries: Vec<ExportEntry> = names
            .into_iter()
            .map(|name| ExportEntry {
                name: name.into(),
                include: true,
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.dedup_by(|a, b| a.name == b.name);
        Self { entries }
    }

    pub fn entries(&self) -> &[ExportEntry] {
        &self.entries
    }

    /// Whether `name` is offered for export, included or not.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub fn with_all_included(&self) -> Self {
        self.map(|_| true)
    }

    pub fn with_none_included(&self) -> Self {
        self.map(|_| false)
    }

    /// Sets the flag of `name`; unknown names leave the checklist unchanged.
    pub fn with_included(&self, name: &str, include: bool) -> Self {
        self.map(|entry| {
            if entry.name == name {
                include
            } else {
                entry.include
            }
        })
    }

    pub fn toggled(&self, name: &str) -> Self {
        self.map(|entry| {
            if entry.name == name {
                !entry.include
            } else {
                entry.include
            }
        })
    }

    /// Names marked for export, in checklist order.
    pub fn approved(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.include)
            .map(|entry| entry.name.as_str())
            .collect()
    }

    fn map(&self, mut include: impl FnMut(&ExportEntry) -> bool) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|entry| ExportEntry {
                    name: entry.name.clone(),
                    include: include(entry),
                })
                .collect(),
        }
    }
}
