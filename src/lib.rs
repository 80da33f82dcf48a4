// src/lib.rs
use actix_web::web;
use std::sync::Arc;

pub mod analysis;
pub mod capture;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod inventory;
pub mod models;
pub mod palette;
pub mod services;

use crate::handlers::{
    analysis_status, analyze_backend_base64, analyze_base64, analyze_file, health_check,
};
use crate::services::ColorAnalyzer;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<ColorAnalyzer>,
    pub max_payload_bytes: usize,
}

impl AppState {
    pub fn new(analyzer: ColorAnalyzer, max_payload_bytes: usize) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            max_payload_bytes,
        }
    }
}

/// Registers the proxy routes and their shared state on an app.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::new(state.clone()))
        .app_data(handlers::json_config(state.max_payload_bytes))
        .route("/api/analyze-colors", web::post().to(analyze_base64))
        .service(
            web::scope("/api/color-analysis")
                .app_data(handlers::backend_json_config(state.max_payload_bytes))
                .route("/test", web::get().to(analysis_status))
                .route("/analyze-base64", web::post().to(analyze_backend_base64))
                .route("/analyze-file", web::post().to(analyze_file)),
        )
        .route("/health", web::get().to(health_check));
}
