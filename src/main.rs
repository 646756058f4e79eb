use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;

use almanac_server::config::Config;
use almanac_server::enrichment::HttpEnrichment;
use almanac_server::routes::create_routes;
use almanac_server::store::EventStore;
use almanac_server::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let enrichment = HttpEnrichment::new(
        &config.holiday_api_url,
        &config.weather_api_url,
        config.enrichment_timeout,
    )
    .expect("Failed to build enrichment client");

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        store: Arc::new(EventStore::new()),
        enrichment: Arc::new(enrichment),
        config: Arc::new(config),
    };

    let app: Router = create_routes(state);

    tracing::info!("🚀 Server running at http://{}", bind_addr);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
