// src/handlers.rs
use crate::{AppState, errors::AnalysisError, models::*};
use actix_multipart::{Multipart, MultipartError};
use actix_web::{HttpRequest, HttpResponse, error::JsonPayloadError, web};
use base64::{Engine as _, engine::general_purpose};
use bytes::BytesMut;
use futures_util::TryStreamExt;
use log::{error, warn};

const IMAGE_FIELD: &str = "image";

/// JSON extractor settings: body cap plus errors in the endpoint's shape.
pub fn json_config(limit: usize) -> web::JsonConfig {
    json_config_with(limit, |reason| AnalysisError::malformed_json(reason))
}

/// Same cap for the `/api/color-analysis` scope, where an unreadable body is
/// reported like a missing image.
pub fn backend_json_config(limit: usize) -> web::JsonConfig {
    json_config_with(limit, |_| AnalysisError::image_required())
}

fn json_config_with(limit: usize, malformed: fn(String) -> AnalysisError) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(move |err: JsonPayloadError, _req: &HttpRequest| {
            warn!("Rejected analysis request body: {}", err);
            let mapped = match err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    AnalysisError::PayloadTooLarge { limit }
                }
                other => malformed(other.to_string()),
            };
            mapped.into()
        })
}

/// `POST /api/analyze-colors`
pub async fn analyze_base64(
    body: web::Json<AnalyzeRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AnalysisError> {
    let payload = encoded_payload(body.into_inner(), AnalysisError::missing_json_image)?;
    run_analysis(&data, payload).await
}

/// `POST /api/color-analysis/analyze-base64`: same body, but a missing image
/// is answered with `{"error": "Image data is required"}`.
pub async fn analyze_backend_base64(
    body: web::Json<AnalyzeRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AnalysisError> {
    let payload = encoded_payload(body.into_inner(), AnalysisError::image_required)?;
    run_analysis(&data, payload).await
}

fn encoded_payload(
    request: AnalyzeRequest,
    missing: fn() -> AnalysisError,
) -> Result<EncodedImagePayload, AnalysisError> {
    let image = request
        .image
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(missing)?;

    let payload = match split_data_url(image) {
        Some((mime_type, encoded)) => EncodedImagePayload {
            data: encoded.to_string(),
            mime_type: mime_type.to_string(),
        },
        None => EncodedImagePayload {
            data: image.to_string(),
            mime_type: request
                .mime_type
                .filter(|m| m.starts_with("image/"))
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
        },
    };

    if payload.data.is_empty() {
        return Err(missing());
    }
    Ok(payload)
}

/// `POST /api/color-analysis/analyze-file`: multipart upload with a single
/// `image` file part.
pub async fn analyze_file(
    mut payload: Multipart,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AnalysisError> {
    let limit = data.max_payload_bytes;
    let mut upload: Option<(BytesMut, Option<String>)> = None;
    let mut received = 0usize;

    while let Some(mut field) = payload.try_next().await.map_err(unreadable_upload)? {
        let is_image = upload.is_none()
            && field.content_disposition().get_name() == Some(IMAGE_FIELD);
        let content_type = field.content_type().map(|ct| ct.to_string());

        let mut buffer = BytesMut::new();
        while let Some(chunk) = field.try_next().await.map_err(unreadable_upload)? {
            received += chunk.len();
            if received > limit {
                warn!("Rejected upload over {} bytes", limit);
                return Err(AnalysisError::PayloadTooLarge { limit });
            }
            if is_image {
                buffer.extend_from_slice(&chunk);
            }
        }

        if is_image && !buffer.is_empty() {
            upload = Some((buffer, content_type));
        }
    }

    let (bytes, content_type) = upload.ok_or_else(AnalysisError::image_required)?;
    let payload = EncodedImagePayload {
        data: general_purpose::STANDARD.encode(&bytes),
        mime_type: content_type
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
    };

    run_analysis(&data, payload).await
}

/// A body that is not a readable multipart stream has no image in it.
fn unreadable_upload(err: MultipartError) -> AnalysisError {
    warn!("Could not read multipart upload: {}", err);
    AnalysisError::image_required()
}

async fn run_analysis(
    data: &AppState,
    payload: EncodedImagePayload,
) -> Result<HttpResponse, AnalysisError> {
    match data.analyzer.analyze(&payload).await {
        Ok(analysis) => Ok(HttpResponse::Ok().json(analysis.raw)),
        Err(e) => {
            error!("Error analyzing image: {}", e);
            Err(e)
        }
    }
}

/// `GET /api/color-analysis/test`
pub async fn analysis_status(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Color analysis API is working",
        "openaiConfigured": data.analyzer.provider_configured()
    }))
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "closet-colors",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Splits `data:image/png;base64,AAAA` into its MIME type and payload.
fn split_data_url(image: &str) -> Option<(&str, &str)> {
    let rest = image.strip_prefix("data:")?;
    let (mime_type, encoded) = rest.split_once(";base64,")?;
    Some((mime_type, encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_urls_are_split() {
        assert_eq!(
            split_data_url("data:image/png;base64,dGVzdA=="),
            Some(("image/png", "dGVzdA=="))
        );
        assert_eq!(split_data_url("dGVzdA=="), None);
        assert_eq!(split_data_url("data:image/png,raw"), None);
    }
}
