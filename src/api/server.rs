//! Server lifecycle: bind, serve, shut down on Ctrl-C.

use std::net::SocketAddr;

use crate::api::router::build_router;
use crate::api::types::ApiContext;

/// Serve the API on `addr` until Ctrl-C.
pub async fn serve(ctx: ApiContext, addr: SocketAddr) -> Result<(), String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {addr}: {e}"))?;

    let local = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    tracing::info!(
        addr = %local,
        output_mode = %ctx.config.output_mode,
        vision_model = %ctx.config.vision_model,
        report_model = %ctx.config.report_model,
        "Evaluation server started"
    );

    let app = build_router(ctx);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {e}"))?;

    tracing::info!("Evaluation server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Evaluation server received shutdown signal");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::config::AppConfig;
    use crate::pipeline::evaluation::MockModelClient;

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = occupied.local_addr().unwrap();

        let ctx = ApiContext::new(AppConfig::new("sk-test"), Arc::new(MockModelClient::echo()));
        let result = tokio::time::timeout(Duration::from_secs(5), serve(ctx, addr))
            .await
            .unwrap();
        assert!(result.unwrap_err().contains("Failed to bind"));
    }
}
