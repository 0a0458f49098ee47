//! Batch export command bound to a live [`DataModel`].
//!
//! The operator owns the host-facing concerns: it builds the checklist shown
//! when the command opens, turns the two guard failures into user reports and
//! keeps the document's selection intact across the run. The export work is
//! delegated to [`crate::pipeline`].

use std::fmt;
use std::path::Path;

use crate::checklist::ExportChecklist;
use crate::data_model::{DataModel, Selection};
use crate::error::{ExportError, Result};
use crate::exporter::MeshExporter;
use crate::pipeline::{export_meshes_with, ExportOptions, ExportResult};

/// Severity of a message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportLevel::Info => "Info",
            ReportLevel::Warning => "Warning",
            ReportLevel::Error => "Error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub level: ReportLevel,
    pub message: String,
}

impl Report {
    fn new(level: ReportLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorStatus {
    Finished,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorOutcome {
    pub status: OperatorStatus,
    pub report: Report,
    pub result: ExportResult,
}

impl OperatorOutcome {
    fn cancelled(level: ReportLevel, message: impl Into<String>) -> Self {
        Self {
            status: OperatorStatus::Cancelled,
            report: Report::new(level, message),
            result: ExportResult::default(),
        }
    }
}

/// Restores a captured selection when dropped.
struct SelectionGuard<'a> {
    model: &'a DataModel,
    saved: Selection,
}

impl<'a> SelectionGuard<'a> {
    fn capture(model: &'a DataModel) -> Self {
        Self {
            model,
            saved: model.selection(),
        }
    }
}

impl Drop for SelectionGuard<'_> {
    fn drop(&mut self) {
        self.model.set_selection(self.saved.clone());
    }
}

/// Export command operating on a scene document.
pub struct BatchExportOperator<'a> {
    model: &'a DataModel,
    exporter: &'a dyn MeshExporter,
}

impl<'a> BatchExportOperator<'a> {
    pub fn new(model: &'a DataModel, exporter: &'a dyn MeshExporter) -> Self {
        Self { model, exporter }
    }

    /// Checklist presented when the command is opened.
    pub fn checklist(&self) -> ExportChecklist {
        ExportChecklist::discover(self.model)
    }

    /// Runs the export for every object approved in `checklist`.
    ///
    /// A missing directory or an empty checklist cancels the command with a
    /// report; any other failure is returned as an error. The selection is
    /// restored in every case.
    pub fn execute(
        &self,
        dir: &Path,
        checklist: &ExportChecklist,
        options: &ExportOptions,
    ) -> Result<OperatorOutcome> {
        if !dir.is_dir() {
            let err = ExportError::MissingDirectory(dir.to_path_buf());
            return Ok(OperatorOutcome::cancelled(ReportLevel::Error, err.to_string()));
        }
        let approved = checklist.approved();
        if approved.is_empty() {
            return Ok(OperatorOutcome::cancelled(
                ReportLevel::Warning,
                ExportError::EmptySelection.to_string(),
            ));
        }

        let _restore = SelectionGuard::capture(self.model);
        let snapshot = self.model.all_objects();
        let result = export_meshes_with(
            &snapshot,
            &approved,
            dir,
            options,
            self.exporter,
            |name| self.model.set_selection(Selection::only(name)),
        )?;

        let message = format!(
            "Exported {} mesh(es) to {}",
            result.exported(),
            dir.display()
        );
        Ok(OperatorOutcome {
            status: OperatorStatus::Finished,
            report: Report::new(ReportLevel::Info, message),
            result,
        })
    }
}
