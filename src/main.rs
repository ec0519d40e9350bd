use axum::{routing::get, Router};
use mysync_matching::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    middleware::{cors::api_cors, rate_limit},
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,sqlx=warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(config.json_logs);

    let pool = create_pool().await?;
    run_migrations(&pool).await?;
    info!(policy = %config.rescore_policy, "Matching service configured");

    let app_state = AppState::new(pool);

    let matches_api = routes::matches::router().layer(axum::middleware::from_fn_with_state(
        rate_limit::RateLimiter::per_second(config.api_rps),
        rate_limit::limit_requests,
    ));

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .merge(matches_api)
        .with_state(app_state)
        .layer(api_cors())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
