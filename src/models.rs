// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Dominant colours of a photographed garment, most prominent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorAnalysisResult {
    pub primary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tertiary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quaternary: Option<String>,
    /// Approximate area share per hex code, 0-100. A populated colour with
    /// no entry here is unknown, not zero.
    #[serde(default)]
    pub percentages: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRank {
    Primary,
    Secondary,
    Tertiary,
    Quaternary,
}

impl ColorRank {
    pub const ALL: [ColorRank; 4] = [
        ColorRank::Primary,
        ColorRank::Secondary,
        ColorRank::Tertiary,
        ColorRank::Quaternary,
    ];

    pub fn field(&self) -> &'static str {
        match self {
            ColorRank::Primary => "primary",
            ColorRank::Secondary => "secondary",
            ColorRank::Tertiary => "tertiary",
            ColorRank::Quaternary => "quaternary",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorRank::Primary => "Primary",
            ColorRank::Secondary => "Secondary",
            ColorRank::Tertiary => "Tertiary",
            ColorRank::Quaternary => "Quaternary",
        }
    }
}

/// One populated colour row, as rendered by the analysis overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRow<'a> {
    pub rank: ColorRank,
    pub hex: &'a str,
    pub percentage: Option<f64>,
}

/// A base64 encoded still image, created per capture and dropped after the
/// analysis round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImagePayload {
    pub data: String,
    pub mime_type: String,
}

impl EncodedImagePayload {
    pub fn jpeg(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: DEFAULT_MIME_TYPE.to_string(),
        }
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    /// `message` or `details`, whichever the server filled in.
    pub fn detail(&self) -> Option<&str> {
        self.message.as_deref().or(self.details.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothingColors {
    pub primary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tertiary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quaternary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClothingItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub image_uri: Option<String>,
    pub colors: ClothingColors,
    pub date_added: DateTime<Utc>,
}
