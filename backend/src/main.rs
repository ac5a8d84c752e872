use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tracing::{info, Level};

mod db;
mod rest;
mod views;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Setting up database");
    // Opening the store or reading the schema script failing here aborts startup
    let db = db::Db::init().await?;

    let state = rest::AppState::new(db);

    // Set up our application routes
    let app = Router::new()
        .route("/", get(rest::list_products))
        .route("/add", get(rest::add_product_page).post(rest::create_product))
        .route("/delete", post(rest::delete_products))
        .route("/templates/form", get(rest::product_form_fragment))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state);

    // Start the server
    let addr = SocketAddr::from(([127, 0, 0, 1], 8080));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
