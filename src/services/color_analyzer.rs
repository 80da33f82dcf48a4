// src/services/color_analyzer.rs
use crate::analysis::{ValidatedAnalysis, parse_provider_content};
use crate::errors::AnalysisError;
use crate::models::EncodedImagePayload;
use crate::services::VisionProvider;
use log::{info, warn};
use std::sync::Arc;
use std::time::Instant;

pub const PROVIDER_NOT_CONFIGURED: &str =
    "OpenAI not configured. Please check OPENAI_API_KEY environment variable.";

/// Forwards one image to the vision provider and validates the answer.
///
/// Holds no per-request state; every call is an independent provider round
/// trip.
#[derive(Clone)]
pub struct ColorAnalyzer {
    provider: Option<Arc<dyn VisionProvider>>,
}

impl ColorAnalyzer {
    pub fn new(provider: Option<Arc<dyn VisionProvider>>) -> Self {
        Self { provider }
    }

    pub fn unconfigured() -> Self {
        Self { provider: None }
    }

    pub fn provider_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn analyze(
        &self,
        image: &EncodedImagePayload,
    ) -> Result<ValidatedAnalysis, AnalysisError> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            AnalysisError::UpstreamUnavailable(PROVIDER_NOT_CONFIGURED.to_string())
        })?;

        let start = Instant::now();
        let content = provider.complete(image).await?;
        let analysis = parse_provider_content(&content).map_err(|e| {
            warn!(
                "{} answered with content that failed validation: {}",
                provider.name(),
                e
            );
            e
        })?;

        info!(
            "{} analysis finished in {}ms: {} color(s)",
            provider.name(),
            start.elapsed().as_millis(),
            analysis.result.colors().len()
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Canned(&'static str);

    #[async_trait]
    impl VisionProvider for Canned {
        async fn complete(&self, _image: &EncodedImagePayload) -> Result<String, AnalysisError> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    #[actix_web::test]
    async fn unconfigured_analyzer_is_unavailable() {
        let analyzer = ColorAnalyzer::unconfigured();
        assert!(!analyzer.provider_configured());
        let err = analyzer
            .analyze(&EncodedImagePayload::jpeg("dGVzdA=="))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::UpstreamUnavailable(PROVIDER_NOT_CONFIGURED.to_string())
        );
    }

    #[actix_web::test]
    async fn validated_content_is_returned_raw() {
        let analyzer = ColorAnalyzer::new(Some(Arc::new(Canned(
            r##"{"primary":"#112233","secondary":null}"##,
        ))));
        let analysis = analyzer
            .analyze(&EncodedImagePayload::jpeg("dGVzdA=="))
            .await
            .unwrap();
        assert_eq!(
            analysis.raw,
            serde_json::json!({"primary":"#112233","secondary":null})
        );
        assert_eq!(analysis.result.secondary, None);
    }

    #[actix_web::test]
    async fn garbage_content_is_parse_error() {
        let analyzer = ColorAnalyzer::new(Some(Arc::new(Canned("not json at all"))));
        let err = analyzer
            .analyze(&EncodedImagePayload::jpeg("dGVzdA=="))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::UpstreamParseError(_)));
    }
}
