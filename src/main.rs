use std::sync::Arc;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;
mod storage;

/// Settings file looked up in the working directory when no path is given
const DEFAULT_SETTINGS_PATH: &str = "server";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let cfg = config::Config::load_from(&settings_path)?;

    logger::init(&cfg)?;

    // 根据 workers 配置设置线程数
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("[CONFIG] Using {workers} worker threads"));
    } else {
        logger::log_debug("[CONFIG] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let state = Arc::new(config::AppState::new(cfg));
    logger::log_server_start(&addr, &state.config, state.store.path());

    let shutdown = Arc::new(tokio::sync::Notify::new());
    server::signal::start_signal_handler(Arc::clone(&shutdown));

    server::run(listener, state, shutdown).await;

    logger::log_shutdown();
    Ok(())
}
