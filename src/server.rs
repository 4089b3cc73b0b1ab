//! TCP listener: accepts connections and spawns one protocol handler per
//! connection.

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::protocol::{handle_connection, ProtocolContext};

/// Bind `ctx.config`'s host:port and serve connections until `ctrl_c`/SIGINT.
pub async fn run(ctx: Arc<ProtocolContext>) -> std::io::Result<()> {
    let addr = format!("0.0.0.0:{}", ctx.config.nntp_port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                        continue;
                    }
                };
                let ctx = Arc::clone(&ctx);
                tokio::spawn(async move {
                    handle_connection(socket, peer.ip().to_string(), ctx).await;
                });
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received");
                return Ok(());
            }
        }
    }
}
