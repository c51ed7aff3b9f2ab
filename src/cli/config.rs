use crate::config::generate::generate_starter_config;
use std::fs;
use std::path::PathBuf;

pub fn init(stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_content = generate_starter_config();

    if stdout {
        print!("{}", config_content);
        return Ok(());
    }

    // Prefer ~/.config/wafagent/config.yml, fall back to /etc/wafagent/config.yml
    let config_path = match dirs::home_dir() {
        Some(home_dir) => {
            let user_config = home_dir.join(".config/wafagent/config.yml");
            match user_config.parent().map(fs::create_dir_all) {
                Some(Ok(())) => Some(user_config),
                _ => {
                    eprintln!("Warning: Could not create ~/.config/wafagent");
                    eprintln!("Falling back to /etc/wafagent/config.yml");
                    None
                }
            }
        }
        None => None,
    };

    let config_path = config_path.unwrap_or_else(|| PathBuf::from("/etc/wafagent/config.yml"));

    if config_path.exists() {
        return Err(format!(
            "Config file already exists at {}. Remove it first or use --stdout to print the config",
            config_path.display()
        )
        .into());
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&config_path, config_content)?;

    println!("Config file written to {}", config_path.display());
    Ok(())
}

pub fn validate(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path.ok_or("No config file found. Use --config to specify a path.")?;

    println!("Validating config file: {}", path.display());

    match crate::config::load_config(&path) {
        Ok(_) => {
            println!("✓ Config is valid");
            Ok(())
        }
        Err(e) => Err(format!("✗ Config validation failed:\n{}", e).into()),
    }
}
