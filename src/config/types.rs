use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Agent configuration. Every section is optional; omitted values fall back
/// to the stock ModSecurity layouts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub web: WebConfig,
    pub harvest: HarvestConfig,
    pub rules: RulesConfig,
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub listen: String,
    /// Deadline for a single harvest or rule operation behind an HTTP request.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Audit logs to watch. All existing files are harvested, in this order.
    pub log_paths: Vec<PathBuf>,
    /// Where per-file cursors are kept between runs.
    pub state_dir: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            log_paths: vec![
                PathBuf::from("/var/log/modsecurity/audit.log"),
                PathBuf::from("/var/log/httpd/modsecurity_audit.log"),
                PathBuf::from("/var/log/apache2/modsecurity_audit.log"),
            ],
            state_dir: PathBuf::from("/var/lib/wafagent/state"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Firewall rules directories; the first one that exists is used.
    pub candidate_dirs: Vec<PathBuf>,
    /// Name of the agent-owned rule file inside that directory.
    pub file_name: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            candidate_dirs: vec![
                PathBuf::from("/etc/modsecurity/rules/"),
                PathBuf::from("/etc/apache2/modsecurity/rules/"),
                PathBuf::from("/usr/local/modsecurity/rules/"),
                PathBuf::from("/etc/httpd/modsecurity/rules/"),
            ],
            file_name: "wafagent-custom.conf".to_string(),
        }
    }
}
