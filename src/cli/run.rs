use crate::config::Config;
use crate::harvest::LogHarvester;
use crate::rules::RuleStore;
use crate::web::{run_server, AppState};
use std::sync::Arc;
use thiserror::Error;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("web server error: {0}")]
    WebServer(#[from] std::io::Error),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Serve the query API until Ctrl+C.
pub async fn run(config: Config) -> Result<(), RunError> {
    let harvester = Arc::new(LogHarvester::from_config(&config.harvest));
    let rules = Arc::new(RuleStore::from_config(&config.rules));

    for path in harvester.log_paths() {
        if path.is_file() {
            info!(path = %path.display(), "Watching audit log");
        } else {
            info!(path = %path.display(), "Audit log not present, will skip until it appears");
        }
    }
    info!(state_dir = %config.harvest.state_dir.display(), "Harvest cursors directory");

    match rules.rules_path() {
        Ok(path) => info!(path = %path.display(), "Managing custom rules file"),
        Err(e) => warn!(error = %e, "Rule requests will fail until a rules directory exists"),
    }

    let state = AppState::new(harvester, rules, config.web.request_timeout);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let listen = config.web.listen.clone();
    let mut server = tokio::spawn(async move { run_server(state, &listen, shutdown_rx).await });

    let finished = tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
            None
        }
        result = &mut server => Some(result),
    };

    let result = match finished {
        Some(result) => result,
        None => server.await,
    };
    match result {
        Ok(Ok(())) => info!("Web server stopped"),
        Ok(Err(e)) => {
            error!(error = %e, "Web server error");
            return Err(e.into());
        }
        Err(e) => {
            error!(error = %e, "Web server task join error");
            return Err(e.into());
        }
    }

    info!("Shutdown complete");
    Ok(())
}
