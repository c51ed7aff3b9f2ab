pub fn generate_starter_config() -> String {
    r#"# =============================================================================
# WAFAGENT CONFIGURATION
# =============================================================================
# Every section is optional. Anything left out uses the defaults shown here.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/wafagent/config.yml
#   3. /etc/wafagent/config.yml
#
# Any value may reference environment variables as $env{VAR_NAME}.

# =============================================================================
# WEB
# =============================================================================
web:
  # Address the query API binds to
  listen: "127.0.0.1:8080"
  # Deadline for one harvest or rule operation behind a request
  request_timeout: 30s

# =============================================================================
# HARVEST
# =============================================================================
# Audit logs to watch. Missing files are skipped; every existing file is read,
# in this order. A file seen for the first time is read from its current end.
harvest:
  log_paths:
    - /var/log/modsecurity/audit.log
    - /var/log/httpd/modsecurity_audit.log
    - /var/log/apache2/modsecurity_audit.log
  # One small JSON cursor per log file is kept here
  state_dir: /var/lib/wafagent/state

# =============================================================================
# RULES
# =============================================================================
# The first directory that exists is used. If none exist, rule requests fail
# with a "rules directory not found" error.
rules:
  candidate_dirs:
    - /etc/modsecurity/rules/
    - /etc/apache2/modsecurity/rules/
    - /usr/local/modsecurity/rules/
    - /etc/httpd/modsecurity/rules/
  # Agent-owned file inside that directory
  file_name: wafagent-custom.conf

# Log at debug level unless RUST_LOG says otherwise
debug: false
"#
    .to_string()
}
