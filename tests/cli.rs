// Copyright 2026 Sift Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const CONFIG: &str = r#"
default_per_page = 25

[[types]]
name = "Article"
attributes = ["lat", "lng"]
sortable_fields = ["title"]
subtypes = ["Review"]

[[types]]
name = "Review"
"#;

fn sift_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("sift"))
}

fn sift_cmd_with_env(config_root: &Path) -> Command {
    let mut cmd = sift_cmd();
    cmd.env("XDG_CONFIG_HOME", config_root);
    cmd.env("HOME", config_root);
    cmd.env("APPDATA", config_root);
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("sift.toml");
    fs::write(&path, CONFIG).expect("write config");
    path
}

fn run_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("run sift");
    assert!(output.status.success(), "sift failed: {output:?}");
    serde_json::from_slice(&output.stdout).expect("json output")
}

#[test]
fn request_json_reflects_config_and_options() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir);
    let value = run_json(sift_cmd_with_env(dir.path()).args([
        "request",
        "--config",
        config.to_str().unwrap(),
        "rust",
        "daemon",
        "--class",
        "Article",
        "--page",
        "3",
        "--order-clause",
        "created_at DESC, title ASC",
        "--with",
        "year=2000..2010",
        "--json",
    ]));

    assert_eq!(value["ok"], true);
    let request = &value["request"];
    assert_eq!(request["query"], "rust daemon");
    assert_eq!(request["limit"], 25);
    assert_eq!(request["offset"], 50);
    assert_eq!(request["sort_mode"], "extended");
    assert_eq!(request["sort_by"], "created_at DESC, title_sort ASC");
    assert_eq!(
        request["indexes"],
        serde_json::json!(["article_core", "article_delta"])
    );

    let filters = request["filters"].as_array().expect("filters");
    assert_eq!(filters[0]["attribute"], "class_crc");
    assert_eq!(filters[0]["values"]["values"].as_array().unwrap().len(), 2);
    assert_eq!(filters[1]["attribute"], "sphinx_deleted");
    assert_eq!(filters[2]["attribute"], "year");
    assert_eq!(filters[2]["values"]["kind"], "range");
    assert_eq!(filters[2]["values"]["min"], 2000);
    assert_eq!(filters[2]["values"]["max"], 2010);
}

#[test]
fn request_text_output() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir);
    sift_cmd_with_env(dir.path())
        .args(["request", "--config", config.to_str().unwrap()])
        .args(["foo@bar.com", "--star", "--group", "edition"])
        .assert()
        .success()
        .stdout(predicate::str::contains("query: *foo*@*bar*.*com*"))
        .stdout(predicate::str::contains("group_by: edition (attr)"))
        .stdout(predicate::str::contains("indexes: *"));
}

#[test]
fn geo_without_attributes_warns() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir);
    let value = run_json(sift_cmd_with_env(dir.path()).args([
        "request",
        "--config",
        config.to_str().unwrap(),
        "--class",
        "Review",
        "--geo",
        "0.5,-0.25",
        "--json",
    ]));
    assert!(value["request"].get("anchor").is_none());
    assert_eq!(value["warnings"].as_array().unwrap().len(), 1);
}

#[test]
fn request_errors_render_as_json() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir);
    let value = run_json(sift_cmd_with_env(dir.path()).args([
        "request",
        "--config",
        config.to_str().unwrap(),
        "--class",
        "Ghost",
        "--json",
    ]));
    assert_eq!(value["ok"], false);
    assert_eq!(value["error"]["code"], "unknown_type");
}

#[test]
fn request_errors_exit_nonzero_without_json() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir);
    sift_cmd_with_env(dir.path())
        .args(["request", "--config", config.to_str().unwrap()])
        .args(["--per-page", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: invalid pagination"));
}

#[test]
fn types_lists_fingerprints() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir);
    let value = run_json(sift_cmd_with_env(dir.path()).args([
        "types",
        "--config",
        config.to_str().unwrap(),
        "--json",
    ]));
    let types = value["types"].as_array().expect("types");
    assert_eq!(types.len(), 2);
    assert_eq!(types[0]["name"], "Article");
    assert_eq!(
        types[0]["fingerprint"],
        u64::from(sift::registry::fingerprint("Article"))
    );
    assert_eq!(types[1]["core_index"], "review_core");
}

#[test]
fn types_without_config_is_empty() {
    let dir = TempDir::new().expect("tempdir");
    sift_cmd_with_env(dir.path())
        .arg("types")
        .assert()
        .success()
        .stdout(predicate::str::contains("no types configured"));
}

#[test]
fn config_path_points_into_config_dir() {
    let dir = TempDir::new().expect("tempdir");
    sift_cmd_with_env(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sift.toml"));
}
