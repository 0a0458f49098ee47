use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use batch_mesh_export::{
    load_config, BatchExportOperator, DataModel, ExportConfig, ObjExporter, OperatorStatus,
    ReportLevel, Scene,
};

/// Export every mesh of a scene as its own file, centered on X/Y.
#[derive(Parser, Debug)]
#[command(name = "batch-mesh-export")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Scene XML file to read
    scene: PathBuf,

    /// Directory receiving one file per exported object
    #[arg(short, long, required_unless_present = "list")]
    output: Option<PathBuf>,

    /// Export only the object itself, without its children
    #[arg(long)]
    no_children: bool,

    /// Also move each mesh's Z centroid to zero
    #[arg(long)]
    center_vertical: bool,

    /// Export only these objects (repeatable)
    #[arg(long, value_name = "NAME")]
    only: Vec<String>,

    /// Leave these objects out (repeatable)
    #[arg(long, value_name = "NAME")]
    exclude: Vec<String>,

    /// Print the export checklist and exit
    #[arg(long)]
    list: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, env = "BATCH_EXPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ExportConfig::default(),
    };
    let mut options = config.options();
    if cli.no_children {
        options.include_children = false;
    }
    if cli.center_vertical {
        options.center_vertical = true;
    }

    let scene = Scene::load(&cli.scene)
        .with_context(|| format!("failed to load scene {}", cli.scene.display()))?;
    let model = DataModel::from_scene(scene);
    let exporter = ObjExporter;
    let operator = BatchExportOperator::new(&model, &exporter);

    let mut checklist = operator.checklist();
    for name in cli.only.iter().chain(&cli.exclude) {
        if !checklist.contains(name) {
            bail!("{name} is not a visible mesh object");
        }
    }
    if !cli.only.is_empty() {
        checklist = checklist.with_none_included();
        for name in &cli.only {
            checklist = checklist.with_included(name, true);
        }
    }
    for name in &cli.exclude {
        checklist = checklist.with_included(name, false);
    }

    if cli.list {
        for entry in checklist.entries() {
            let mark = if entry.include { 'x' } else { ' ' };
            println!("[{mark}] {}", entry.name);
        }
        return Ok(());
    }

    let Some(output) = cli.output.as_deref() else {
        bail!("--output is required");
    };
    let outcome = operator.execute(output, &checklist, &options)?;
    match (outcome.status, outcome.report.level) {
        (OperatorStatus::Finished, _) => {
            for file in &outcome.result.files {
                println!(" - {} -> {}", file.object, file.path.display());
            }
            println!("{}", outcome.report.message);
            Ok(())
        }
        (OperatorStatus::Cancelled, ReportLevel::Error) => bail!("{}", outcome.report.message),
        (OperatorStatus::Cancelled, _) => {
            eprintln!("{}", outcome.report);
            Ok(())
        }
    }
}
