use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A project directory plus a `STRATA_HOME` whose repository holds the modules.
struct Workspace {
    _tmp: TempDir,
    home: PathBuf,
    project: PathBuf,
}

fn publish(repo: &Path, group: &str, name: &str, version: &str, descriptor: &str) {
    let mut dir: PathBuf = group.split('.').collect();
    dir.push(name);
    dir.push(version);
    let dir = repo.join(dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("module.toml"), descriptor).unwrap();
    fs::write(dir.join(format!("{name}-{version}.jar")), "jar").unwrap();
}

fn workspace(manifest: &str) -> Workspace {
    let tmp = TempDir::new().unwrap();
    let home = tmp.path().join("home");
    let repo = home.join("repository");
    fs::create_dir_all(&repo).unwrap();
    fs::write(
        home.join("config.toml"),
        format!("[repository]\npath = {:?}\n", repo.display().to_string()),
    )
    .unwrap();

    publish(
        &repo,
        "org.a",
        "a",
        "1.0",
        "[[dependencies]]\nmodule = \"org.x:x:1.2\"\nconfiguration = \"compile\"\n",
    );
    publish(
        &repo,
        "org.b",
        "b",
        "1.0",
        "[[dependencies]]\nmodule = \"org.x:x:1.5\"\nconfiguration = \"compile\"\n",
    );
    publish(&repo, "org.x", "x", "1.2", "");
    publish(&repo, "org.x", "x", "1.5", "");
    publish(&repo, "org.junit", "junit", "4.12", "");

    let project = tmp.path().join("app");
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join("Strata.toml"), manifest).unwrap();
    Workspace {
        _tmp: tmp,
        home,
        project,
    }
}

const MANIFEST: &str = r#"
[package]
group = "com.example"
name = "app"
version = "0.1.0"

[[dependencies]]
module = "org.a:a:1.0"
scopes = ["compile"]

[[dependencies]]
module = "org.b:b:1.0"
scopes = ["compile"]

[[dependencies]]
module = "org.junit:junit:4.12"
scopes = ["test"]
"#;

fn strata_cmd(ws: &Workspace) -> Command {
    let mut cmd = Command::cargo_bin("strata").unwrap();
    cmd.current_dir(&ws.project)
        .env("STRATA_HOME", &ws.home)
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_tree_prints_rooted_tree() {
    let ws = workspace(MANIFEST);
    strata_cmd(&ws)
        .args(["tree", "--scope", "compile"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("com.example:app:0.1.0\n"))
        .stdout(predicate::str::contains("├── org.a:a:1.0 [compile]"))
        .stdout(predicate::str::contains("(evicted)"))
        .stdout(predicate::str::contains("junit").not());
}

#[test]
fn test_files_lists_jars_in_order() {
    let ws = workspace(MANIFEST);
    let output = strata_cmd(&ws)
        .args(["files", "-s", "test"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let names: Vec<&str> = stdout
        .lines()
        .map(|l| l.rsplit(['/', '\\']).next().unwrap())
        .collect();
    assert_eq!(names, ["a-1.0.jar", "b-1.0.jar", "x-1.5.jar", "junit-4.12.jar"]);
}

#[test]
fn test_versions_json() {
    let ws = workspace(MANIFEST);
    strata_cmd(&ws)
        .args(["versions", "--scope", "compile", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"org.x:x\": \"1.5\""));
}

#[test]
fn test_conflicts_report() {
    let ws = workspace(MANIFEST);
    strata_cmd(&ws)
        .args(["conflicts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Version conflicts (1):"))
        .stdout(predicate::str::contains(
            "org.x:x requested 1.2 but resolved 1.5 (highest version wins)",
        ));
}

#[test]
fn test_why_for_absent_module() {
    let ws = workspace(MANIFEST);
    strata_cmd(&ws)
        .args(["why", "org.junit:junit", "--scope", "compile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("org.junit:junit is not in the resolved tree."));
}

#[test]
fn test_strict_fails_on_missing_module() {
    let manifest = format!("{MANIFEST}\n[[dependencies]]\nmodule = \"org.gone:gone:1.0\"\nscopes = [\"compile\"]\n");
    let ws = workspace(&manifest);

    strata_cmd(&ws)
        .args(["files", "--scope", "compile"])
        .assert()
        .success()
        .stderr(predicate::str::contains("org.gone:gone:1.0"));

    strata_cmd(&ws)
        .args(["--strict", "files", "--scope", "compile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("org.gone:gone"));
}

#[test]
fn test_unknown_scope_fails() {
    let ws = workspace(MANIFEST);
    strata_cmd(&ws)
        .args(["tree", "--scope", "integration"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown scope 'integration'"));
}

#[test]
fn test_missing_manifest_fails() {
    let tmp = TempDir::new().unwrap();
    Command::cargo_bin("strata")
        .unwrap()
        .current_dir(tmp.path())
        .env("STRATA_HOME", tmp.path())
        .args(["tree"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No Strata.toml found"));
}
