use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

// Minimal uncompressed true-color TGA.
fn write_tga(path: &Path, width: u16, height: u16, rgb: [u8; 3]) {
    let mut buffer = Vec::new();
    buffer.push(0); // id length
    buffer.push(0); // no color map
    buffer.push(2); // uncompressed true-color
    buffer.extend_from_slice(&[0; 5]); // color map spec
    buffer.extend_from_slice(&0u16.to_le_bytes()); // x origin
    buffer.extend_from_slice(&0u16.to_le_bytes()); // y origin
    buffer.extend_from_slice(&width.to_le_bytes());
    buffer.extend_from_slice(&height.to_le_bytes());
    buffer.push(24); // bits per pixel
    buffer.push(0); // image descriptor
    let [r, g, b] = rgb;
    for _ in 0..(width as usize * height as usize) {
        buffer.extend_from_slice(&[b, g, r]);
    }
    fs::write(path, buffer).expect("write tga fixture");
}

fn build_fixtures(dir: &TempDir) -> std::path::PathBuf {
    let root = dir.path();
    let obj = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";
    fs::write(root.join("model.obj"), obj).expect("write obj fixture");
    write_tga(&root.join("paper.tga"), 8, 8, [240, 236, 228]);
    write_tga(&root.join("noise.tga"), 4, 4, [128, 128, 128]);
    write_tga(&root.join("contrast.tga"), 4, 4, [64, 64, 64]);

    let config = format!(
        r#"{{
  "mesh": "{root}/model.obj",
  "paper_texture": "{root}/paper.tga",
  "noise_texture": "{root}/noise.tga",
  "contrast_texture": "{root}/contrast.tga"
}}"#,
        root = root.display()
    );
    let config_path = root.join("viewer.json");
    fs::write(&config_path, config).expect("write config fixture");
    config_path
}

#[test]
fn summary_only_reports_loaded_assets() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = build_fixtures(&dir);

    let mut cmd = Command::cargo_bin("charcoal-viewer").expect("binary exists");
    cmd.arg(&config_path).arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("(4 vertices, 2 triangles)"))
        .stdout(contains(" - paper texture"))
        .stdout(contains("(8x8)"))
        .stdout(contains(" - noise texture"))
        .stdout(contains(" - contrast texture"));
}

#[test]
fn missing_mesh_is_a_fatal_startup_error() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("viewer.json");
    fs::write(&config_path, r#"{"mesh": "nowhere/missing.obj"}"#).expect("write config");

    let mut cmd = Command::cargo_bin("charcoal-viewer").expect("binary exists");
    cmd.arg(&config_path).arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("failed to read mesh"));
}

#[test]
fn unknown_arguments_are_rejected() {
    let mut cmd = Command::cargo_bin("charcoal-viewer").expect("binary exists");
    cmd.arg("--frobnicate");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument"));
}
