// tests/common/mod.rs
#![allow(dead_code)]

use actix_web::{App, HttpServer, dev::ServerHandle};
use async_trait::async_trait;
use closet_colors::{
    AppState,
    errors::AnalysisError,
    models::EncodedImagePayload,
    services::{ColorAnalyzer, VisionProvider},
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const LIMIT: usize = 10 * 1024 * 1024;

/// Stands in for the remote model: replays one answer and counts calls.
pub struct MockProvider {
    reply: Result<String, AnalysisError>,
    delay: Duration,
    calls: AtomicUsize,
    last: Mutex<Option<EncodedImagePayload>>,
}

impl MockProvider {
    pub fn replying(content: &str) -> Arc<Self> {
        Self::build(Ok(content.to_string()), Duration::ZERO)
    }

    pub fn failing(err: AnalysisError) -> Arc<Self> {
        Self::build(Err(err), Duration::ZERO)
    }

    pub fn slow(content: &str, delay: Duration) -> Arc<Self> {
        Self::build(Ok(content.to_string()), delay)
    }

    fn build(reply: Result<String, AnalysisError>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply,
            delay,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<EncodedImagePayload> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionProvider for MockProvider {
    async fn complete(&self, image: &EncodedImagePayload) -> Result<String, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(image.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.clone()
    }

    fn name(&self) -> &str {
        "mock"
    }
}

pub fn state_with(provider: &Arc<MockProvider>, limit: usize) -> AppState {
    let provider: Arc<dyn VisionProvider> = provider.clone();
    AppState::new(ColorAnalyzer::new(Some(provider)), limit)
}

/// Runs the proxy on an ephemeral local port.
pub async fn start_proxy(state: AppState) -> (String, ServerHandle) {
    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new().configure(move |cfg| closet_colors::configure(cfg, &state))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (format!("http://{}", addr), handle)
}

pub fn multipart_body(boundary: &str, parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, content_type, bytes) in parts {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}.bin\"\r\nContent-Type: {}\r\n\r\n",
                boundary, name, name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([0x11, 0x22, 0x33]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}
