use axum::Router;
use dotenvy::dotenv;

use epic_auth_axum::{Auth, AuthConfig, DataStore, epic_auth_router};

mod notes;
mod server;
use server::{init_tracing, spawn_http_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("demo_notes");

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./notes.db".to_string());
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let store = DataStore::connect(&database_url).await?;
    let auth = Auth::new(AuthConfig::from_env(), store).await?;

    let app: Router = epic_auth_router()
        .merge(notes::router(auth.clone()))
        .with_state(auth);

    spawn_http_server(port, app).await??;
    Ok(())
}
