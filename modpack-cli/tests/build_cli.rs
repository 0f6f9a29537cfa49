use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn modpack_cmd(cwd: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("modpack"));
    cmd.current_dir(cwd)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

/// `<workspace>/MyMod` with the default layout.
fn init_project(workspace: &TempDir) -> PathBuf {
    let project = workspace.path().join("MyMod");
    fs::create_dir_all(project.join("About")).expect("mkdir About");
    fs::write(project.join("About/About.xml"), "<ModMetaData/>").expect("write About.xml");
    fs::create_dir_all(project.join("Assemblies")).expect("mkdir Assemblies");
    fs::write(project.join("Assemblies/MyMod.dll"), [0x4d, 0x5a]).expect("write dll");
    fs::create_dir_all(project.join("Defs")).expect("mkdir Defs");
    fs::write(project.join("Defs/A.xml"), "<Defs/>").expect("write def");
    project
}

#[test]
fn no_argument_builds_into_project_build_dir_with_warning() {
    let workspace = TempDir::new().expect("workspace");
    let project = init_project(&workspace);

    modpack_cmd(&project)
        .assert()
        .success()
        .stderr(contains("Output directory automatically chosen"))
        .stdout(contains("'MyMod' packaged into"));

    let mod_dir = project.join("build").join("MyMod");
    assert_eq!(fs::read(mod_dir.join("Defs/A.xml")).unwrap(), b"<Defs/>");
    assert!(mod_dir.join("Assemblies/MyMod.dll").is_file());
}

#[test]
fn explicit_relative_output_is_resolved_from_cwd() {
    let workspace = TempDir::new().expect("workspace");
    let project = init_project(&workspace);

    modpack_cmd(workspace.path())
        .args(["dist", "--project-root", "MyMod"])
        .assert()
        .success();

    assert!(workspace.path().join("dist/MyMod/About/About.xml").is_file());
    assert!(!project.join("build").exists());
}

#[test]
fn stale_output_is_cleared_before_copy() {
    let workspace = TempDir::new().expect("workspace");
    let project = init_project(&workspace);
    let out = workspace.path().join("out");
    fs::create_dir_all(out.join("MyMod/Defs")).unwrap();
    fs::write(out.join("MyMod/Defs/Old.xml"), "stale").unwrap();

    modpack_cmd(&project)
        .arg(&out)
        .assert()
        .success();

    assert!(!out.join("MyMod/Defs/Old.xml").exists());
    assert!(out.join("MyMod/Defs/A.xml").is_file());
}

#[test]
fn missing_output_parent_fails_with_nonzero_exit() {
    let workspace = TempDir::new().expect("workspace");
    let project = init_project(&workspace);
    let out = workspace.path().join("missing").join("out");

    modpack_cmd(&project)
        .arg(&out)
        .assert()
        .failure()
        .code(1)
        .stderr(contains("cannot create more than one directory"));

    assert!(!workspace.path().join("missing").exists());
}

#[test]
fn missing_manifest_file_fails_with_context() {
    let workspace = TempDir::new().expect("workspace");
    let project = init_project(&workspace);
    fs::remove_file(project.join("About/About.xml")).unwrap();

    modpack_cmd(&project)
        .arg(workspace.path().join("out"))
        .assert()
        .failure()
        .stderr(contains("failed to package 'MyMod'"))
        .stderr(contains("About/About.xml"));
}

#[test]
fn dry_run_reports_and_writes_nothing() {
    let workspace = TempDir::new().expect("workspace");
    let project = init_project(&workspace);
    let out = workspace.path().join("out");

    modpack_cmd(&project)
        .arg(&out)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("Defs/A.xml"));

    assert!(!out.exists(), "dry-run must not create the output root");
}

#[test]
fn json_report_lists_events() {
    let workspace = TempDir::new().expect("workspace");
    let project = init_project(&workspace);

    let output = modpack_cmd(&project)
        .arg(workspace.path().join("out"))
        .args(["--json", "--verify"])
        .output()
        .expect("run modpack --json");
    assert!(
        output.status.success(),
        "command failed: status={} stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr),
    );

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["mod_name"], "MyMod");
    assert_eq!(report["dry_run"], false);
    assert_eq!(report["clear_mode"], "keep-empty");
    assert_eq!(report["verification"].as_array().map(Vec::len), Some(0));
    let kinds: Vec<&str> = report["events"]
        .as_array()
        .expect("events array")
        .iter()
        .filter_map(|e| e["kind"].as_str())
        .collect();
    assert_eq!(kinds.first(), Some(&"output_root_created"));
    assert!(kinds.contains(&"file_copied"));
}

#[test]
fn clear_mode_flag_overrides_config() {
    let workspace = TempDir::new().expect("workspace");
    let project = init_project(&workspace);
    fs::write(project.join("modpack.yaml"), "relevant_folders: [Defs, Textures]\n").unwrap();
    let out = workspace.path().join("out");
    fs::create_dir_all(out.join("MyMod/Textures")).unwrap();

    modpack_cmd(&project)
        .arg(&out)
        .args(["--clear-mode", "remove-empty"])
        .assert()
        .success();

    assert!(!out.join("MyMod/Textures").exists());
}

#[test]
fn unknown_clear_mode_is_rejected_by_parser() {
    let workspace = TempDir::new().expect("workspace");
    let project = init_project(&workspace);

    modpack_cmd(&project)
        .args(["--clear-mode", "sometimes"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("unknown clear mode"));
}

#[test]
fn invalid_config_fails_before_building() {
    let workspace = TempDir::new().expect("workspace");
    let project = init_project(&workspace);
    fs::write(project.join("modpack.yaml"), "relevant_folders: ['..']\n").unwrap();

    modpack_cmd(&project)
        .assert()
        .failure()
        .stderr(contains("failed to load build configuration"));

    assert!(!project.join("build").exists());
}
