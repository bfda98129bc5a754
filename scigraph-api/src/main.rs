//! The scigraph HTTP service: a schema-validated document store reachable
//! over JSON/HTTP. See `routes` for the route table.

mod error;
mod routes;
mod state;

use salvo::prelude::*;
use scigraph_config::ServiceConfig;
use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = ServiceConfig::get();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_filter.clone())),
        )
        .init();

    // Schema files themselves are loaded by an external tool; this service
    // only remembers where one would live and imports schemas through
    // `POST /{db}/schema`.
    if let Some(dir) = &config.schema_dir {
        tracing::info!(schema_dir = %dir.display(), "schema directory configured; schemas are still imported via POST /{{db}}/schema");
    }

    let state = AppState::new(config);
    let router = routes::build(state);

    tracing::info!(addr = %config.listen_addr, "starting scigraph-api");
    let acceptor = TcpListener::new(&config.listen_addr).bind().await;
    Server::new(acceptor).serve(router).await;
}
