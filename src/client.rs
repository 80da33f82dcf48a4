// src/client.rs
//! Client side of the analysis round trip.
//!
//! [`AnalysisClient`] runs at most one analysis at a time and exposes the
//! attempt as an [`AnalysisState`], so a UI can show a spinner while
//! `Analyzing`, a colour breakdown on `Succeeded`, and an explicit message on
//! `Failed`.

use crate::analysis;
use crate::capture::{ImageSource, capture_payload};
use crate::errors::{CaptureError, ClientError};
use crate::models::{AnalyzeRequest, ColorAnalysisResult, EncodedImagePayload, ErrorBody};
use crate::services::ImageProcessor;
use log::{error, info};
use reqwest::Client;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

pub const ANALYZE_PATH: &str = "/api/analyze-colors";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3001";
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    Idle,
    Analyzing,
    Succeeded(ColorAnalysisResult),
    Failed(ClientError),
}

impl AnalysisState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisState::Succeeded(_) | AnalysisState::Failed(_))
    }
}

struct Inner {
    state: AnalysisState,
    attempt: u64,
    cancel: Option<Arc<Notify>>,
}

pub struct AnalysisClient {
    http: Client,
    endpoint: String,
    inner: Mutex<Inner>,
}

impl AnalysisClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), ANALYZE_PATH),
            inner: Mutex::new(Inner {
                state: AnalysisState::Idle,
                attempt: 0,
                cancel: None,
            }),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> AnalysisState {
        self.lock().state.clone()
    }

    /// Sends an already encoded image for analysis.
    ///
    /// Only valid from `Idle`. Returns [`ClientError::Busy`] while an attempt
    /// is in flight and [`ClientError::OutcomePending`] while a finished
    /// attempt's outcome has not been collected with
    /// [`take_outcome`](Self::take_outcome). Neither touches the current
    /// state.
    pub async fn start_analysis(
        &self,
        payload: EncodedImagePayload,
    ) -> Result<ColorAnalysisResult, ClientError> {
        self.run(async move { Ok(payload) }).await
    }

    /// Captures and preprocesses an image on a blocking thread, then
    /// analyses it. A capture failure ends the attempt before any request is
    /// sent, and [`cancel`](Self::cancel) also covers the capture step.
    ///
    /// Same start rules as [`start_analysis`](Self::start_analysis).
    pub async fn analyze_capture<S>(
        &self,
        source: S,
        processor: ImageProcessor,
    ) -> Result<ColorAnalysisResult, ClientError>
    where
        S: ImageSource + 'static,
    {
        self.run(async move {
            tokio::task::spawn_blocking(move || capture_payload(&source, &processor))
                .await
                .map_err(|e| CaptureError::CaptureFailed(format!("capture task failed: {}", e)))?
        })
        .await
    }

    /// Takes a terminal outcome and returns the client to `Idle`.
    pub fn take_outcome(&self) -> Option<Result<ColorAnalysisResult, ClientError>> {
        let mut inner = self.lock();
        if !inner.state.is_terminal() {
            return None;
        }
        match std::mem::replace(&mut inner.state, AnalysisState::Idle) {
            AnalysisState::Succeeded(result) => Some(Ok(result)),
            AnalysisState::Failed(err) => Some(Err(err)),
            _ => None,
        }
    }

    /// Aborts the in-flight attempt, if any. It finishes as
    /// `Failed(Cancelled)`.
    pub fn cancel(&self) -> bool {
        let inner = self.lock();
        match (&inner.state, &inner.cancel) {
            (AnalysisState::Analyzing, Some(cancel)) => {
                cancel.notify_one();
                true
            }
            _ => false,
        }
    }

    async fn run<F>(&self, prepare: F) -> Result<ColorAnalysisResult, ClientError>
    where
        F: Future<Output = Result<EncodedImagePayload, CaptureError>>,
    {
        let (attempt, cancel) = self.begin()?;
        let mut guard = AttemptGuard {
            client: self,
            attempt,
            done: false,
        };

        let work = async {
            let payload = prepare.await?;
            self.send(&payload).await
        };
        let outcome = tokio::select! {
            result = work => result,
            _ = cancel.notified() => Err(ClientError::Cancelled),
        };

        match &outcome {
            Ok(result) => info!("Analysis succeeded: primary {}", result.primary),
            Err(e) => error!("Error analyzing image: {}", e),
        }

        self.finish(attempt, outcome.clone());
        guard.done = true;
        outcome
    }

    fn begin(&self) -> Result<(u64, Arc<Notify>), ClientError> {
        let mut inner = self.lock();
        match inner.state {
            AnalysisState::Idle => {}
            AnalysisState::Analyzing => return Err(ClientError::Busy),
            AnalysisState::Succeeded(_) | AnalysisState::Failed(_) => {
                return Err(ClientError::OutcomePending);
            }
        }
        let cancel = Arc::new(Notify::new());
        inner.attempt += 1;
        inner.state = AnalysisState::Analyzing;
        inner.cancel = Some(cancel.clone());
        Ok((inner.attempt, cancel))
    }

    fn finish(&self, attempt: u64, outcome: Result<ColorAnalysisResult, ClientError>) {
        let mut inner = self.lock();
        if inner.attempt != attempt || inner.state != AnalysisState::Analyzing {
            return;
        }
        inner.cancel = None;
        inner.state = match outcome {
            Ok(result) => AnalysisState::Succeeded(result),
            Err(e) => AnalysisState::Failed(e),
        };
    }

    async fn send(&self, payload: &EncodedImagePayload) -> Result<ColorAnalysisResult, ClientError> {
        let request = AnalyzeRequest {
            image: Some(payload.data.clone()),
            mime_type: Some(payload.mime_type.clone()),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(service_error(status.as_u16(), &text));
        }

        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))?;
        analysis::validate(&value).map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks an attempt cancelled if its future is dropped before finishing.
struct AttemptGuard<'a> {
    client: &'a AnalysisClient,
    attempt: u64,
    done: bool,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.client
                .finish(self.attempt, Err(ClientError::Cancelled));
        }
    }
}

fn transport_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Transport(e.to_string())
    }
}

fn service_error(status: u16, text: &str) -> ClientError {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) if status == 400 => ClientError::MissingInput { error: body.error },
        Ok(body) => ClientError::Service {
            status,
            detail: body.detail().map(str::to_string),
            error: body.error,
        },
        Err(_) => ClientError::Service {
            status,
            error: format!("HTTP {}", status),
            detail: Some(text.trim().to_string()).filter(|t| !t.is_empty()),
        },
    }
}
