//! Image-based size-chart extraction via the Gemini `generateContent`
//! REST endpoint.
//!
//! Some stores publish their size chart only as an image. This module
//! resolves the image source (protocol-relative, bare-host, absolute, or
//! inline `data:` URLs), obtains the raw bytes, and asks a vision model
//! to read the table out of the pixels. The model is instructed to answer
//! in JSON; rows come back as key/value column lists and are flattened to
//! the standard chart shape.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use sizechart_core::SizeChart;

use crate::client::StoreClient;
use crate::error::ExtractError;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const SYSTEM_PROMPT: &str = r#"You are an expert at extracting size chart data from images. Your task is to analyze the provided image and extract size chart information in a structured format.

Instructions:
1. Identify if the image contains a size chart
2. Extract ALL column headers exactly as they appear (e.g., "Size", "Bust", "Waist", "Hip", "Length", etc.)
3. Extract ALL rows of data, preserving the exact values
4. Handle various formats: tables, grids, or text-based size charts
5. Include units if specified (e.g., "in", "cm", "inches", "centimeters")
6. If multiple size charts exist (e.g., US/UK/EU sizes), extract all of them
7. If no size chart is found, return null

Important:
- Preserve exact text from the image (don't convert or standardize)
- Include ALL columns, even if they seem redundant
- Keep original formatting of sizes (S, M, L or 36, 38, 40, etc.)
- Extract numeric ranges as they appear (e.g., "32-34" not just "33")"#;

const USER_PROMPT: &str = r#"Analyze this image and extract the size chart data as JSON with this exact shape:
{"size_chart": {"headers": ["..."], "rows": [{"columns": [{"key": "...", "value": "..."}]}]} or null, "confidence": 0.0, "has_size_chart": true or false}"#;

/// Client for the Gemini vision endpoint.
pub struct VisionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: RequestContent,
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// The model's answer, parsed from the JSON text it returns.
#[derive(Debug, Deserialize)]
struct VisionExtraction {
    #[serde(default)]
    size_chart: Option<ExtractedChart>,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    has_size_chart: bool,
}

#[derive(Debug, Deserialize)]
struct ExtractedChart {
    #[serde(default)]
    headers: Vec<String>,
    #[serde(default)]
    rows: Vec<ExtractedRow>,
}

#[derive(Debug, Deserialize)]
struct ExtractedRow {
    #[serde(default)]
    columns: Vec<KeyValuePair>,
}

#[derive(Debug, Deserialize)]
struct KeyValuePair {
    key: String,
    value: String,
}

impl VisionClient {
    /// # Errors
    ///
    /// Returns [`ExtractError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: String, model: String, timeout_secs: u64) -> Result<Self, ExtractError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(60)))
            .build()?;
        Ok(Self {
            http,
            base_url: GEMINI_BASE_URL.to_owned(),
            api_key,
            model,
        })
    }

    /// Overrides the API base URL. Used by tests to point at a mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Extracts a size chart from the image at `image_src`.
    ///
    /// `image_src` may be protocol-relative (`//cdn...`), site-relative
    /// (`/files/chart.png`, resolved against `origin`), a bare host, an
    /// absolute URL, or an inline `data:image/...;base64,` payload.
    /// Returns `Ok(None)` when the model reports no chart in the image.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::Vision`] — the model call failed or returned an
    ///   unusable answer.
    /// - image fetch errors from [`StoreClient::fetch_bytes`].
    pub async fn extract_chart(
        &self,
        client: &StoreClient,
        origin: &str,
        image_src: &str,
    ) -> Result<Option<SizeChart>, ExtractError> {
        let (bytes, mime_type) = match decode_data_url(image_src) {
            Some(inline) => inline?,
            None => {
                let url = resolve_image_url(origin, image_src);
                let (bytes, content_type) = client.fetch_bytes(&url).await?;
                let mime = content_type
                    .map(|ct| ct.split(';').next().unwrap_or("image/jpeg").trim().to_owned())
                    .unwrap_or_else(|| "image/jpeg".to_owned());
                (bytes, mime)
            }
        };

        let extraction = self.generate(&bytes, &mime_type).await?;
        match extraction.size_chart {
            Some(chart) if extraction.has_size_chart => {
                tracing::debug!(
                    confidence = extraction.confidence,
                    columns = chart.headers.len(),
                    rows = chart.rows.len(),
                    "vision model extracted a chart"
                );
                let flattened = flatten_chart(chart);
                if flattened.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(flattened))
                }
            }
            _ => {
                tracing::debug!(
                    confidence = extraction.confidence,
                    "vision model found no size chart in image"
                );
                Ok(None)
            }
        }
    }

    async fn generate(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<VisionExtraction, ExtractError> {
        let request = GenerateRequest {
            system_instruction: RequestContent {
                parts: vec![RequestPart {
                    text: Some(SYSTEM_PROMPT.to_owned()),
                    inline_data: None,
                }],
            },
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: mime_type.to_owned(),
                            data: BASE64.encode(image_bytes),
                        }),
                    },
                    RequestPart {
                        text: Some(USER_PROMPT.to_owned()),
                        inline_data: None,
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_owned(),
            },
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Vision {
                reason: format!("model endpoint returned status {status}"),
            });
        }

        let body: GenerateResponse = response.json().await?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| ExtractError::Vision {
                reason: "model response contained no text part".to_owned(),
            })?;

        serde_json::from_str(&text).map_err(|e| ExtractError::Vision {
            reason: format!("model answer is not the expected JSON: {e}"),
        })
    }
}

/// Decodes an inline `data:image/...;base64,` source. Returns `None` when
/// the source is not a data URL.
fn decode_data_url(image_src: &str) -> Option<Result<(Vec<u8>, String), ExtractError>> {
    if !image_src.starts_with("data:image/") {
        return None;
    }
    let Some((header, payload)) = image_src.split_once(',') else {
        return Some(Err(ExtractError::Vision {
            reason: "data URL has no payload".to_owned(),
        }));
    };
    let mime = header
        .strip_prefix("data:")
        .and_then(|h| h.split(';').next())
        .unwrap_or("image/jpeg")
        .to_owned();
    Some(
        BASE64
            .decode(payload)
            .map(|bytes| (bytes, mime))
            .map_err(|e| ExtractError::Vision {
                reason: format!("data URL payload is not valid base64: {e}"),
            }),
    )
}

/// Resolves an image `src` attribute to a fetchable absolute URL.
fn resolve_image_url(origin: &str, image_src: &str) -> String {
    let src = image_src.trim();
    if let Some(rest) = src.strip_prefix("//") {
        return format!("https://{rest}");
    }
    if src.starts_with("http://") || src.starts_with("https://") {
        return src.to_owned();
    }
    if src.starts_with('/') {
        return format!("{origin}{src}");
    }
    format!("https://{src}")
}

/// Flattens key/value column rows into header-keyed row mappings.
fn flatten_chart(chart: ExtractedChart) -> SizeChart {
    let rows = chart
        .rows
        .into_iter()
        .map(|row| {
            row.columns
                .into_iter()
                .map(|kv| (kv.key, kv.value))
                .collect::<BTreeMap<String, String>>()
        })
        .filter(|row| !row.is_empty())
        .collect();
    SizeChart {
        headers: chart.headers,
        rows,
    }
}
