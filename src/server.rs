use anyhow::{Context, Result};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::graphql::{self, InfrascanSchema};
use crate::api::rest::{self, AppState};
use crate::config::Config;
use crate::domain::inventory_service::InventoryService;
use crate::extraction::GeminiExtractor;
use crate::logging;
use crate::scan::SystemClock;

pub async fn run(config: Config) -> Result<()> {
    logging::init_json(&config.daemon.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "InfraScan daemon starting");

    // Create shared services
    let extractor = Arc::new(GeminiExtractor::new(&config.extraction)?);
    let inventory = Arc::new(
        InventoryService::new(&config, extractor, Arc::new(SystemClock))
            .context("initialising inventory")?,
    );

    info!(
        servers = inventory.server_count().await,
        jump_host = %inventory.jump_host().await.hostname,
        model = %config.extraction.model,
        "inventory ready"
    );

    let app = build_app(inventory);

    let http_addr = &config.daemon.http_addr;
    let listener = TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("binding to {}", http_addr))?;

    info!(addr = %http_addr, "HTTP server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("InfraScan daemon stopped");
    Ok(())
}

/// REST (with AppState) + GraphQL (with schema state).
pub fn build_app(inventory: Arc<InventoryService>) -> Router {
    let schema = graphql::build_schema(inventory.clone());

    let graphql_router = Router::new()
        .route("/graphql", get(graphql_playground).post(graphql_handler))
        .with_state(schema);

    rest::router(AppState { inventory })
        .merge(graphql_router)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn graphql_playground() -> Html<String> {
    Html(
        async_graphql::http::playground_source(
            async_graphql::http::GraphQLPlaygroundConfig::new("/graphql"),
        ),
    )
}

async fn graphql_handler(
    State(schema): State<InfrascanSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { info!("Received Ctrl+C, shutting down"); },
        _ = terminate => { info!("Received SIGTERM, shutting down"); },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::testing::{FakeExtractor, RecordingClock};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_graphql_route_is_mounted() {
        let inventory = InventoryService::new(
            &Config::default(),
            Arc::new(FakeExtractor::succeeding()),
            Arc::new(RecordingClock::default()),
        )
        .unwrap();
        let app = build_app(Arc::new(inventory));

        let body = serde_json::json!({ "query": "{ searchHistory }" });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/graphql")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
