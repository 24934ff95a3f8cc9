use std::sync::Arc;
use std::time::Duration;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod probe;
mod routing;
mod server;
mod upstream;

use error::StartupError;
use upstream::HttpUpstream;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg).map_err(StartupError::Logger)?;

    // Worker threads follow `server.workers`, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))?;
    Ok(())
}

async fn async_main(cfg: config::Config) -> Result<(), StartupError> {
    let addr = cfg.get_socket_addr()?;

    let upstream = HttpUpstream::new(
        &cfg.upstream.user_agent,
        Duration::from_secs(cfg.upstream.timeout_secs),
    )?;
    let state = Arc::new(config::AppState::new(cfg, Arc::new(upstream)));

    if state.config.upstream.probe_on_start {
        if state.routes.credentials().api_key().is_empty() {
            logger::log_probe_skipped("no API key configured (set GATEWAY_UPSTREAM__API_KEY)");
        } else {
            let probe_client = HttpUpstream::new(
                &state.config.upstream.user_agent,
                Duration::from_secs(state.config.upstream.probe_timeout_secs),
            )?;
            probe::run(&probe_client, &state.routes).await;
        }
    }

    let listener = server::create_listener(addr)?;
    logger::log_server_start(&addr, &state.config, state.routes.paths());

    server::run(listener, state, server::signal::shutdown_signal()).await;
    Ok(())
}
