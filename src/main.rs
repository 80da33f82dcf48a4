// src/main.rs
use actix_web::{App, HttpServer, middleware};
use anyhow::Context;
use closet_colors::{
    AppState,
    config::Config,
    services::{ColorAnalyzer, OpenAiVisionProvider, VisionProvider},
};
use log::{info, warn};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting closet-colors proxy...");

    let config = Config::from_env().context("invalid configuration")?;

    let provider = OpenAiVisionProvider::from_config(&config.provider)?
        .map(|p| Arc::new(p) as Arc<dyn VisionProvider>);
    if provider.is_some() {
        info!(
            "Vision provider configured: model {} at {}",
            config.provider.model, config.provider.base_url
        );
    } else {
        warn!("OPENAI_API_KEY is not set; color analysis requests will fail");
    }

    let app_state = AppState::new(ColorAnalyzer::new(provider), config.max_payload_bytes);

    info!("Starting HTTP server on {}", config.bind_addr);

    HttpServer::new(move || {
        let state = app_state.clone();
        App::new()
            .wrap(middleware::Logger::default())
            .configure(move |cfg| closet_colors::configure(cfg, &state))
    })
    .bind(&config.bind_addr)
    .with_context(|| format!("failed to bind {}", config.bind_addr))?
    .run()
    .await?;

    Ok(())
}
