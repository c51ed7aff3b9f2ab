use crate::config::Config;
use crate::rules::RuleStore;
use std::io::Read;
use std::path::Path;

pub fn list(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let content = RuleStore::from_config(&config.rules).list()?;
    print!("{}", content);
    Ok(())
}

/// Append the rule text in `file`, or on stdin when no file is given.
pub fn add(config: &Config, file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let content = match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read rule file {}: {}", path.display(), e))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let content = content.trim_end_matches(['\n', '\r']);
    if content.trim().is_empty() {
        return Err("Rule content is empty".into());
    }

    let store = RuleStore::from_config(&config.rules);
    store.append(content)?;
    println!("Rule added to {}", store.rules_path()?.display());
    Ok(())
}

pub fn remove(config: &Config, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    RuleStore::from_config(&config.rules).remove(id)?;
    println!("Rule {} removed", id);
    Ok(())
}

pub fn clear(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    RuleStore::from_config(&config.rules).clear()?;
    println!("Custom rules cleared");
    Ok(())
}
