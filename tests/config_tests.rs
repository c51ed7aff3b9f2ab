use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use wafagent::config::generate::generate_starter_config;
use wafagent::config::{load_config, Config, ConfigError};
use wafagent::{LogHarvester, RuleStore};

#[test]
fn test_generated_config_is_valid() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(&config_path, generate_starter_config()).unwrap();

    let config = load_config(&config_path).expect("Generated config should be valid");

    assert_eq!(config, Config::default());
    assert_eq!(config.harvest.log_paths.len(), 3);
    assert_eq!(config.rules.candidate_dirs.len(), 4);
}

#[test]
fn test_config_drives_engines() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join("rules")).unwrap();
    fs::write(root.join("audit.log"), "").unwrap();

    let config_path = root.join("config.yml");
    fs::write(
        &config_path,
        format!(
            r#"
web:
  listen: "127.0.0.1:0"
  request_timeout: 2s
harvest:
  log_paths:
    - {root}/audit.log
  state_dir: {root}/state
rules:
  candidate_dirs:
    - {root}/missing
    - {root}/rules
  file_name: test.conf
"#,
            root = root.display()
        ),
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    assert_eq!(config.web.request_timeout, Duration::from_secs(2));

    let harvester = LogHarvester::from_config(&config.harvest);
    assert!(harvester.collect().is_empty());
    assert!(root.join("state").is_dir());

    let rules = RuleStore::from_config(&config.rules);
    rules.append("SecRule A \"id:1\"").unwrap();
    assert_eq!(rules.rules_path().unwrap(), root.join("rules").join("test.conf"));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = load_config(&PathBuf::from("/nonexistent/wafagent/config.yml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
    assert!(err.to_string().contains("/nonexistent/wafagent/config.yml"));
}

#[test]
fn test_bad_file_name_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(&config_path, "rules:\n  file_name: sub/dir.conf\n").unwrap();

    let err = load_config(&config_path).unwrap_err();
    assert!(err.to_string().contains("rules.file_name"));
}
