pub mod api;
pub mod config;
pub mod pipeline;

use tracing_subscriber::EnvFilter;

/// Process entry: load `.env`, init tracing, resolve config, serve.
///
/// The model client is blocking, so the API context is built before the
/// async runtime exists and dropped after it has shut down.
pub fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let config = config::AppConfig::from_env()?;
    let addr = config.bind_addr;
    tracing::info!(
        app = config::APP_NAME,
        version = config::APP_VERSION,
        reports_dir = %config.reports_dir.display(),
        "Starting"
    );

    let ctx = api::ApiContext::from_config(config).map_err(anyhow::Error::msg)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let served = runtime.block_on(api::serve(ctx.clone(), addr));
    drop(runtime);
    drop(ctx);

    served.map_err(anyhow::Error::msg)
}
