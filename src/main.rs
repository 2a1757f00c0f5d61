//! caeros - Entry point for the relay server

use std::sync::Arc;

use rocket::http::Method;
use rocket_cors::{AllowedOrigins, CorsOptions};

use caeros::providers::outreach::PiplProvider;
use caeros::{api, RelayService, Settings};

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting caeros relay");

    let settings = Settings::from_env()?;
    tracing::info!(workspace_id = %settings.workspace_id, "configuration loaded");

    let provider = PiplProvider::new(&settings)?;
    let service = RelayService::new(Arc::new(provider));

    // Permissive CORS for the development frontend.
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![Method::Get, Method::Post]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allow_credentials(true)
        .to_cors()?;

    rocket::build()
        .manage(service)
        .attach(cors)
        .mount("/", api::root_routes())
        .mount("/api", api::api_routes())
        .launch()
        .await?;

    Ok(())
}
