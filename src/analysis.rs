// src/analysis.rs
//! Validation of the colour analysis the vision provider embeds in its
//! completion text.
//!
//! The provider's reply is free text that is expected to be a JSON document
//! shaped like [`ColorAnalysisResult`]. Nothing guarantees that, so the
//! content goes through two steps: locate and parse the JSON document, then
//! check it against the result schema. Either step failing is an
//! [`AnalysisError::UpstreamParseError`].

use crate::errors::AnalysisError;
use crate::models::{ColorAnalysisResult, ColorRank, ColorRow};
use serde_json::Value;
use std::collections::BTreeMap;

/// A provider answer that passed schema validation.
///
/// `raw` is the JSON document exactly as the provider produced it and is what
/// the proxy forwards. `result` is the normalised, typed view of the same
/// document.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAnalysis {
    pub raw: Value,
    pub result: ColorAnalysisResult,
}

pub fn parse_provider_content(content: &str) -> Result<ValidatedAnalysis, AnalysisError> {
    let raw = extract_json(content)?;
    let result = validate(&raw)?;
    Ok(ValidatedAnalysis { raw, result })
}

/// Finds the JSON document in `content`: bare, inside a markdown code fence,
/// or surrounded by prose.
pub fn extract_json(content: &str) -> Result<Value, AnalysisError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::UpstreamParseError(
            "empty completion content".to_string(),
        ));
    }

    let first_error = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if let Some(fenced) = strip_code_fence(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(fenced) {
            return Ok(value);
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(AnalysisError::UpstreamParseError(format!(
        "completion is not valid JSON: {}",
        first_error
    )))
}

fn strip_code_fence(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("```")?;
    // Skip the info string ("json") up to the first newline.
    let body = &rest[rest.find('\n')? + 1..];
    let body = body.trim_end();
    Some(body.strip_suffix("```").unwrap_or(body).trim())
}

/// Checks a parsed document against the result schema.
///
/// `primary` must be a hex colour. Optional colours that are missing, null,
/// or not hex are dropped, and later colours move up to close any gap.
/// Percentages are kept only for populated colours.
pub fn validate(value: &Value) -> Result<ColorAnalysisResult, AnalysisError> {
    let object = value.as_object().ok_or_else(|| {
        AnalysisError::UpstreamParseError("analysis is not a JSON object".to_string())
    })?;

    let primary = match object.get("primary") {
        Some(Value::String(s)) => normalize_hex(s).ok_or_else(|| {
            AnalysisError::UpstreamParseError(format!("primary {:?} is not a hex color", s))
        })?,
        Some(other) => {
            return Err(AnalysisError::UpstreamParseError(format!(
                "primary must be a string, got {}",
                other
            )));
        }
        None => {
            return Err(AnalysisError::UpstreamParseError(
                "analysis has no primary color".to_string(),
            ));
        }
    };

    // Each colour appears once in the chain; later repeats are dropped.
    let mut chain = vec![primary.clone()];
    for hex in ColorRank::ALL[1..]
        .iter()
        .filter_map(|rank| object.get(rank.field()))
        .filter_map(|v| v.as_str())
        .filter_map(normalize_hex)
    {
        if !chain.contains(&hex) {
            chain.push(hex);
        }
    }
    let mut extras = chain.into_iter().skip(1);

    let secondary = extras.next();
    let tertiary = extras.next();
    let quaternary = extras.next();

    let populated: Vec<&str> = std::iter::once(primary.as_str())
        .chain(secondary.as_deref())
        .chain(tertiary.as_deref())
        .chain(quaternary.as_deref())
        .collect();

    let mut percentages = BTreeMap::new();
    if let Some(Value::Object(map)) = object.get("percentages") {
        for (key, raw) in map {
            let Some(hex) = normalize_hex(key) else {
                continue;
            };
            if !populated.contains(&hex.as_str()) {
                continue;
            }
            if let Some(pct) = parse_percentage(raw) {
                percentages.insert(hex, pct);
            }
        }
    }

    let description = object
        .get("description")
        .and_then(|d| d.as_str())
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Ok(ColorAnalysisResult {
        primary,
        secondary,
        tertiary,
        quaternary,
        percentages,
        description,
    })
}

/// Uppercases a `#RGB` / `#RRGGBB` code; anything else is `None`.
pub fn normalize_hex(raw: &str) -> Option<String> {
    let digits = raw.trim().strip_prefix('#')?;
    if !matches!(digits.len(), 3 | 6) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", digits.to_ascii_uppercase()))
}

fn parse_percentage(raw: &Value) -> Option<f64> {
    let pct = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    pct.is_finite().then(|| pct.clamp(0.0, 100.0))
}

impl ColorAnalysisResult {
    /// Populated colours in prominence order.
    pub fn colors(&self) -> Vec<ColorRow<'_>> {
        let fields = [
            Some(self.primary.as_str()),
            self.secondary.as_deref(),
            self.tertiary.as_deref(),
            self.quaternary.as_deref(),
        ];
        ColorRank::ALL
            .iter()
            .zip(fields)
            .filter_map(|(rank, hex)| {
                let hex = hex?;
                Some(ColorRow {
                    rank: *rank,
                    hex,
                    percentage: self.percentage_of(hex),
                })
            })
            .collect()
    }

    pub fn percentage_of(&self, hex: &str) -> Option<f64> {
        let key = normalize_hex(hex).unwrap_or_else(|| hex.to_string());
        self.percentages.get(&key).copied()
    }

    /// One text row per populated colour, e.g. `Primary: #112233 (100%)`.
    pub fn render_lines(&self) -> Vec<String> {
        self.colors()
            .into_iter()
            .map(|row| match row.percentage {
                Some(pct) => format!("{}: {} ({}%)", row.rank.label(), row.hex, format_pct(pct)),
                None => format!("{}: {}", row.rank.label(), row.hex),
            })
            .collect()
    }
}

fn format_pct(pct: f64) -> String {
    if pct.fract() == 0.0 {
        format!("{}", pct as u64)
    } else {
        format!("{:.1}", pct)
    }
}
