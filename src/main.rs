//! Thin CLI entrypoint: load configuration, build the backend registry,
//! run the listener. Argument parsing is deliberately minimal — one
//! optional config-file path — full CLI parsing is out of scope.

use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;

use papercut_nntp::auth::DenyAll;
use papercut_nntp::backend::maildir::MaildirBackend;
use papercut_nntp::backend::Storage;
use papercut_nntp::config::{ServerConfig, GLOBAL_HIERARCHY};
use papercut_nntp::logging::EventLog;
use papercut_nntp::protocol::ProtocolContext;
use papercut_nntp::router::Router;
use papercut_nntp::server;

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "papercut.toml".to_string());
    let config = match ServerConfig::from_file(&config_path).and_then(|cfg| {
        cfg.validate()?;
        Ok(cfg)
    }) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(async_main(config))
}

async fn async_main(config: ServerConfig) -> ExitCode {
    let mut backends: HashMap<String, Arc<dyn Storage>> = HashMap::new();
    backends.insert(
        GLOBAL_HIERARCHY.to_string(),
        Arc::new(MaildirBackend::new(config.maildir_path.clone(), config.nntp_hostname.clone())),
    );
    for (prefix, hierarchy) in &config.hierarchies {
        let root = hierarchy.options.get("maildir_path").cloned().unwrap_or_else(|| config.maildir_path.clone());
        backends.insert(prefix.clone(), Arc::new(MaildirBackend::new(root, config.nntp_hostname.clone())));
    }

    let event_log = match EventLog::open(&config.log_file).await {
        Ok(log) => log,
        Err(e) => {
            eprintln!("failed to open log file {}: {e}", config.log_file);
            return ExitCode::FAILURE;
        }
    };

    let ctx = Arc::new(ProtocolContext {
        config: Arc::new(config),
        router: Arc::new(Router::new(backends)),
        auth: Arc::new(DenyAll),
        event_log,
    });

    match server::run(ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("server error: {e}");
            ExitCode::FAILURE
        }
    }
}
