use assert_cmd::prelude::*;
use batch_mesh_export::load_obj_from_str;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const QUAD: &str = "v 4 4 0\nv 6 4 0\nv 6 6 0\nv 4 6 0\nf 1 2 3 4\n";
const TRIANGLE: &str = "v 0 0 1\nv 1 0 1\nv 0 1 1\nf 1 2 3\n";

fn build_scene() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::create_dir(dir.path().join("meshes")).expect("mesh dir");
    fs::write(dir.path().join("meshes/quad.obj"), QUAD).expect("write quad");
    fs::write(dir.path().join("meshes/tri.obj"), TRIANGLE).expect("write tri");
    let scene = r#"<scene active="Crate">
  <object>
    <name>Crate</name>
    <mesh>meshes/quad.obj</mesh>
    <position>10 0 2</position>
    <selected>true</selected>
  </object>
  <object>
    <name>Lid</name>
    <mesh>meshes/tri.obj</mesh>
    <parent>Crate</parent>
  </object>
  <object>
    <name>Rock/Big*1</name>
    <mesh>meshes/tri.obj</mesh>
  </object>
  <object>
    <name>Hidden</name>
    <mesh>meshes/tri.obj</mesh>
    <visible>false</visible>
  </object>
  <object>
    <name>Pivot</name>
    <type>empty</type>
  </object>
</scene>
"#;
    fs::write(dir.path().join("scene.xml"), scene).expect("write scene");
    dir
}

fn exported_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read output")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn cli_exports_every_visible_mesh() {
    let scene = build_scene();
    let out = TempDir::new().expect("output dir");
    let mut cmd = Command::cargo_bin("batch-mesh-export").expect("binary exists");
    cmd.arg(scene.path().join("scene.xml"))
        .arg("--output")
        .arg(out.path());
    cmd.assert()
        .success()
        .stdout(contains("Exported 3 mesh(es) to"))
        .stdout(contains(" - Rock/Big*1 -> "));

    assert_eq!(
        exported_files(out.path()),
        vec!["Crate.obj", "Lid.obj", "Rock_Big_1.obj"]
    );

    let crate_obj = fs::read_to_string(out.path().join("Crate.obj")).expect("crate output");
    assert!(crate_obj.contains("o Crate"));
    assert!(crate_obj.contains("o Lid"));
    let mesh = load_obj_from_str(&crate_obj).expect("valid obj");
    assert_eq!(mesh.positions.len(), 7);
}

#[test]
fn cli_no_children_exports_single_objects() {
    let scene = build_scene();
    let out = TempDir::new().expect("output dir");
    let mut cmd = Command::cargo_bin("batch-mesh-export").expect("binary exists");
    cmd.arg(scene.path().join("scene.xml"))
        .arg("-o")
        .arg(out.path())
        .arg("--no-children")
        .arg("--only")
        .arg("Crate");
    cmd.assert()
        .success()
        .stdout(contains("Exported 1 mesh(es) to"));

    let crate_obj = fs::read_to_string(out.path().join("Crate.obj")).expect("crate output");
    assert!(!crate_obj.contains("o Lid"));
    let mesh = load_obj_from_str(&crate_obj).expect("valid obj");
    // Engine space is Y up: the quad keeps its height of 2 and is centered on X/Z.
    for position in &mesh.positions {
        assert!((position.y - 2.0).abs() < 1e-5, "{position}");
        assert!(position.x.abs() <= 1.0 + 1e-5);
        assert!(position.z.abs() <= 1.0 + 1e-5);
    }
}

#[test]
fn cli_reports_missing_directory() {
    let scene = build_scene();
    let out = TempDir::new().expect("output dir");
    let missing = out.path().join("does-not-exist");
    let mut cmd = Command::cargo_bin("batch-mesh-export").expect("binary exists");
    cmd.arg(scene.path().join("scene.xml"))
        .arg("--output")
        .arg(&missing);
    cmd.assert()
        .failure()
        .stderr(contains("Directory does not exist"));
    assert!(!missing.exists());
    assert!(exported_files(out.path()).is_empty());
}

#[test]
fn cli_warns_when_nothing_is_selected() {
    let scene = build_scene();
    let out = TempDir::new().expect("output dir");
    let mut cmd = Command::cargo_bin("batch-mesh-export").expect("binary exists");
    cmd.arg(scene.path().join("scene.xml"))
        .arg("--output")
        .arg(out.path())
        .arg("--only")
        .arg("Lid")
        .arg("--exclude")
        .arg("Lid");
    cmd.assert()
        .success()
        .stderr(contains("Warning: No mesh objects selected for export"));
    assert!(exported_files(out.path()).is_empty());
}

#[test]
fn cli_lists_checklist() {
    let scene = build_scene();
    let mut cmd = Command::cargo_bin("batch-mesh-export").expect("binary exists");
    cmd.arg(scene.path().join("scene.xml"))
        .arg("--list")
        .arg("--exclude")
        .arg("Lid");
    cmd.assert()
        .success()
        .stdout(contains("[x] Crate"))
        .stdout(contains("[ ] Lid"))
        .stdout(contains("[x] Rock/Big*1"))
        .stdout(contains("Hidden").not());
}

#[test]
fn cli_rejects_unknown_only_name() {
    let scene = build_scene();
    let out = TempDir::new().expect("output dir");
    let mut cmd = Command::cargo_bin("batch-mesh-export").expect("binary exists");
    cmd.arg(scene.path().join("scene.xml"))
        .arg("--output")
        .arg(out.path())
        .arg("--only")
        .arg("Pivot");
    cmd.assert()
        .failure()
        .stderr(contains("Pivot is not a visible mesh object"));
}

#[test]
fn cli_rejects_unknown_exclude_name() {
    let scene = build_scene();
    let out = TempDir::new().expect("output dir");
    let mut cmd = Command::cargo_bin("batch-mesh-export").expect("binary exists");
    cmd.arg(scene.path().join("scene.xml"))
        .arg("--output")
        .arg(out.path())
        .arg("--exclude")
        .arg("Ghost");
    cmd.assert()
        .failure()
        .stderr(contains("Ghost is not a visible mesh object"));
    assert!(exported_files(out.path()).is_empty());
}

#[test]
fn cli_prints_warning_once() {
    let scene = build_scene();
    let out = TempDir::new().expect("output dir");
    let mut cmd = Command::cargo_bin("batch-mesh-export").expect("binary exists");
    cmd.arg(scene.path().join("scene.xml"))
        .arg("--output")
        .arg(out.path())
        .arg("--only")
        .arg("Crate")
        .arg("--exclude")
        .arg("Crate");
    cmd.assert()
        .success()
        .stderr(contains("No mesh objects selected for export").count(1));
}
