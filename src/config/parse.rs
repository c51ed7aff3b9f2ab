use super::types::Config;
use super::{expand_env_vars, expand_tilde};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let yaml_string = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    parse_config(&yaml_string)
}

/// Parse, expand and validate config text.
pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    let yaml = expand_env_vars(yaml);

    // An empty document means "all defaults".
    let mut config: Config = if yaml.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&yaml)?
    };

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load the config at `path`, or fall back to defaults when there is no
/// config file. A file that exists but fails to parse or validate is an error.
pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) if path.exists() => load_config(path),
        _ => Ok(Config::default()),
    }
}

fn expand_paths(config: &mut Config) {
    for path in &mut config.harvest.log_paths {
        *path = expand_tilde(path);
    }
    config.harvest.state_dir = expand_tilde(&config.harvest.state_dir);
    for dir in &mut config.rules.candidate_dirs {
        *dir = expand_tilde(dir);
    }
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.web.listen.parse::<SocketAddr>().is_err() {
        errors.push(format!(
            "web.listen: '{}' is not a socket address",
            config.web.listen
        ));
    }
    if config.web.request_timeout.is_zero() {
        errors.push("web.request_timeout: must be greater than zero".to_string());
    }

    for (i, path) in config.harvest.log_paths.iter().enumerate() {
        if path.as_os_str().is_empty() {
            errors.push(format!("harvest.log_paths[{}]: path is empty", i));
        }
    }
    if config.harvest.state_dir.as_os_str().is_empty() {
        errors.push("harvest.state_dir: path is empty".to_string());
    }

    if config.rules.candidate_dirs.is_empty() {
        errors.push("rules.candidate_dirs: at least one directory is required".to_string());
    }
    for (i, dir) in config.rules.candidate_dirs.iter().enumerate() {
        if dir.as_os_str().is_empty() {
            errors.push(format!("rules.candidate_dirs[{}]: path is empty", i));
        }
    }

    let name = config.rules.file_name.as_str();
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        errors.push(format!(
            "rules.file_name: '{}' must be a plain file name",
            name
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}
