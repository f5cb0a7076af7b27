use strata_core::config::{dirs_path, expand_home, GlobalConfig};

#[test]
fn test_global_config_defaults() {
    let config = GlobalConfig::default();
    assert_eq!(config.resolve.jobs, 8);
    assert_eq!(config.resolve.fetch_timeout_secs, 30);
    assert!(!config.resolve.fail_fast);
    assert_eq!(config.resolve.default_scope, "compile");
    assert_eq!(config.repository.path, "~/.strata/repository");
}

#[test]
fn test_global_config_empty_toml_uses_defaults() {
    let config = GlobalConfig::parse("").unwrap();
    assert_eq!(config, GlobalConfig::default());
}

#[test]
fn test_global_config_parse_from_toml() {
    let toml = r#"
[resolve]
jobs = 2
fetch-timeout-secs = 5
fail-fast = true
default-scope = "runtime"

[repository]
path = "/srv/strata/repo"
"#;
    let config = GlobalConfig::parse(toml).unwrap();
    assert_eq!(config.resolve.jobs, 2);
    assert_eq!(config.resolve.fetch_timeout_secs, 5);
    assert!(config.resolve.fail_fast);
    assert_eq!(config.resolve.default_scope, "runtime");
    assert_eq!(
        config.repository.resolved_path(),
        std::path::PathBuf::from("/srv/strata/repo")
    );
}

#[test]
fn test_global_config_partial_section() {
    let config = GlobalConfig::parse("[resolve]\njobs = 3\n").unwrap();
    assert_eq!(config.resolve.jobs, 3);
    assert_eq!(config.resolve.fetch_timeout_secs, 30);
}

#[test]
fn test_global_config_invalid_toml() {
    let err = GlobalConfig::parse("[resolve\njobs = ").unwrap_err();
    assert!(err.to_string().starts_with("Config error"), "got: {err}");
}

#[test]
fn test_load_from_missing_file_gives_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let config = GlobalConfig::load_from(&tmp.path().join("config.toml")).unwrap();
    assert_eq!(config, GlobalConfig::default());
}

#[test]
fn test_load_from_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[resolve]\nfail-fast = true\n").unwrap();
    let config = GlobalConfig::load_from(&path).unwrap();
    assert!(config.resolve.fail_fast);
}

#[test]
fn test_dirs_path_is_strata_dir() {
    let path = dirs_path();
    if std::env::var("STRATA_HOME").map(|h| h.is_empty()).unwrap_or(true) {
        assert!(path.ends_with(".strata"));
    }
}

#[test]
fn test_expand_home() {
    assert_eq!(expand_home("/abs/path"), std::path::PathBuf::from("/abs/path"));
    assert!(expand_home("~/repo").ends_with("repo"));
    assert!(!expand_home("~/repo").starts_with("~"));
}
