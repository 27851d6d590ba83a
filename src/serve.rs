use axum::Router;
use axum::response::Json;
use axum::routing::get;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::cli::ServeArgs;
use crate::config::SiteConfig;

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    timestamp: String,
}

/// `/` serves the compiled template, `/health` reports liveness, and every
/// other path is looked up under the public directory.
pub fn router(config: &SiteConfig) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(config.template_path()))
        .route("/health", get(health))
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.site.load()?;
    let port = resolve_port(args.port, std::env::var("PORT").ok().as_deref());
    let addr = format!("{}:{port}", args.host);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {addr}: {err}"))?;
    tracing::info!(%addr, public_dir = %config.public_dir.display(), "listening");

    axum::serve(listener, router(&config))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("stopping server");
        })
        .await?;
    Ok(())
}

fn resolve_port(flag: Option<u16>, env: Option<&str>) -> u16 {
    if let Some(port) = flag {
        return port;
    }
    match env.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
            tracing::warn!(port = raw, "ignoring invalid PORT");
            DEFAULT_PORT
        }),
        None => DEFAULT_PORT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_prefers_flag_then_env() {
        assert_eq!(resolve_port(Some(8080), Some("9000")), 8080);
        assert_eq!(resolve_port(None, Some(" 9000 ")), 9000);
        assert_eq!(resolve_port(None, Some("nope")), DEFAULT_PORT);
        assert_eq!(resolve_port(None, Some("")), DEFAULT_PORT);
        assert_eq!(resolve_port(None, None), DEFAULT_PORT);
    }
}
