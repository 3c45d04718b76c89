//! Axum web framework integration demo.
//!
//! Installs `ZipkinIds` as an axum middleware layer. Requests under `/api`
//! continue an inbound B3 trace or start a new one, and handlers receive the
//! `RequestTrace` as a request extension.
//!
//! # Running
//!
//! ```bash
//! RUST_LOG=zipkin_ids=debug cargo run -p zipkin-ids-demos --bin axum_propagation
//! ```
//!
//! Then test with:
//! ```bash
//! curl -i http://localhost:3000/api/trace
//! curl -i -H 'b3: 80f198ee56343ba864fe8b2a57d3eff7-e457b5a2e4d86bd1-1' http://localhost:3000/api/trace
//! curl -i -H 'X-B3-Sampled: 0' http://localhost:3000/api/trace
//! curl -i http://localhost:3000/health
//! ```

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Extension, Router,
    extract::{Request, State},
    http::HeaderMap,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use tracing_subscriber::EnvFilter;
use zipkin_ids::{RequestTrace, ZipkinIds, ZipkinIdsConfig};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "zipkin_ids=debug,info".into()),
        )
        .init();

    let config =
        ZipkinIdsConfig::builder().initiate_trace_path_prefixes(vec!["/api".to_string()]).build();
    let zipkin = Arc::new(ZipkinIds::new(config));

    let app = Router::new()
        .route("/api/trace", get(show_trace))
        .route("/health", get(health_check))
        .layer(middleware::from_fn_with_state(zipkin.clone(), propagate))
        .with_state(zipkin);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!(%addr, "server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Reads B3 headers off the request and writes them onto the response.
async fn propagate(
    State(zipkin): State<Arc<ZipkinIds>>,
    mut request: Request,
    next: Next,
) -> Response {
    let trace = zipkin.start(request.uri().path(), request.headers());
    if let Some(trace) = &trace {
        request.extensions_mut().insert(trace.clone());
    }

    let mut response = next.run(request).await;
    if let Some(trace) = &trace {
        zipkin.finish(trace, response.headers_mut());
    }
    response
}

/// Shows the request's trace and the headers a downstream call would carry.
async fn show_trace(
    State(zipkin): State<Arc<ZipkinIds>>,
    Extension(trace): Extension<RequestTrace>,
) -> String {
    let mut outbound = HeaderMap::new();
    zipkin.downstream(&trace, &mut outbound);

    let mut body = format!(
        "trace: {}\ninitiated here: {}\nstyle: {}\ndownstream:\n",
        trace.context(),
        trace.context().initiated_here(),
        trace.style().as_str(),
    );
    for (name, value) in &outbound {
        body.push_str(&format!("  {name}: {}\n", value.to_str().unwrap_or("<binary>")));
    }
    body
}

/// Health check endpoint (never traced)
async fn health_check() -> &'static str {
    "OK"
}
