//! Batch export of scene meshes into engine-ready files.
//!
//! Every mesh object of a scene is written to its own file, with its
//! geometry centered on the X/Y origin while height, rotation and scale are
//! kept. The pipeline is split into a host-independent core working on object
//! snapshots ([`pipeline`]) and a thin command layer bound to a live scene
//! document ([`operator`]), so the centering and naming rules can be used
//! and tested without a running editor.

pub mod checklist;
pub mod config;
pub mod data_model;
pub mod error;
pub mod exporter;
pub mod obj;
pub mod operator;
pub mod pipeline;
pub mod scene;
pub mod transform;

pub use checklist::{ExportChecklist, ExportEntry};
pub use config::{load_config, ExportConfig};
pub use data_model::{DataModel, Selection};
pub use error::ExportError;
pub use exporter::{ExportSettings, MeshExporter, ObjExporter, Shading};
pub use obj::{load_obj_from_str, MeshData};
pub use operator::{BatchExportOperator, OperatorOutcome, OperatorStatus, Report, ReportLevel};
pub use pipeline::{
    center_mesh, export_meshes, sanitize_filename, DuplicateSet, ExportObject, ExportOptions,
    ExportResult, ExportedFile,
};
pub use scene::{ObjectType, Scene, SceneObject};
pub use transform::{Axis, AxisConvention};
