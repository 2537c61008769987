use crate::analysis::{Analyzer, AnalysisError};
use crate::analysis::prompt::{self, AnalysisRequest};
use crate::model::{AnalysisResult, OptimizationSuggestion, TaxData};
use async_trait::async_trait;
use serde_json::{json, Map, Value};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Fast multimodal model for document extraction and analysis.
pub const GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Low temperature favors literal extraction over creative variation.
pub const ANALYSIS_TEMPERATURE: f64 = 0.1;

/// Gemini `generateContent` client. Model identity and temperature are
/// configuration constants; the API key comes from the environment with an
/// empty permissive default (the service rejects it server-side).
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: GEMINI_MODEL.to_string(),
        }
    }

    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .unwrap_or_default();
        Self::new(api_key)
    }

    fn request_body(&self, request: &AnalysisRequest) -> Value {
        let mut parts: Vec<Value> = request
            .payloads()
            .iter()
            .map(|payload| {
                json!({
                    "inlineData": {
                        "data": payload.data,
                        "mimeType": payload.mime_type,
                    }
                })
            })
            .collect();
        parts.push(json!({ "text": request.prompt() }));

        json!({
            "contents": [{ "parts": parts }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": prompt::response_schema(),
                "temperature": ANALYSIS_TEMPERATURE,
            }
        })
    }
}

#[async_trait]
impl Analyzer for GeminiClient {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let url = format!("{GEMINI_API_URL}/{}:generateContent", self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(&request))
            .send()
            .await
            .map_err(|err| AnalysisError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Transport(format!(
                "HTTP {status}: {}",
                truncate(&body, 300)
            )));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|err| AnalysisError::MalformedResponse(err.to_string()))?;
        parse_analysis_text(candidate_text(&envelope).unwrap_or_default())
    }
}

/// First candidate's first text part; `None` when the envelope has no usable
/// body, which the parser then treats as an empty object.
fn candidate_text(envelope: &Value) -> Option<&str> {
    envelope
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
}

/// Parses the model's JSON text into the typed result.
///
/// An empty body degrades to an empty object, which then fails the required
/// subset check instead of crashing. `extractedData` is strict (missing
/// required field is an error); `optimizations` is best-effort: malformed
/// entries are dropped with a warning rather than rejecting the whole run.
pub fn parse_analysis_text(text: &str) -> Result<AnalysisResult, AnalysisError> {
    let trimmed = text.trim();
    let raw: Value = if trimmed.is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_str(trimmed)
            .map_err(|err| AnalysisError::MalformedResponse(err.to_string()))?
    };

    let extracted_data: TaxData =
        serde_json::from_value(raw.get("extractedData").cloned().unwrap_or(Value::Null))
            .map_err(|err| AnalysisError::IncompleteResponse(err.to_string()))?;

    let mut optimizations = Vec::new();
    if let Some(entries) = raw.get("optimizations").and_then(Value::as_array) {
        for entry in entries {
            match serde_json::from_value::<OptimizationSuggestion>(entry.clone()) {
                Ok(suggestion) => optimizations.push(suggestion),
                Err(err) => tracing::warn!("dropping malformed optimization entry: {err}"),
            }
        }
    }

    let summary = raw
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(AnalysisResult {
        extracted_data,
        optimizations,
        summary,
    })
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::EncodedPayload;
    use crate::model::OptimizationCategory;

    const SCENARIO_ONE: &str = r#"{"extractedData":{"fullName":"Jean Dupont","year":2023,"householdParts":2,"taxableIncome":45000,"tmi":30,"totalTaxPaid":6000,"perCeilingAvailable":3000},"optimizations":[],"summary":"ok"}"#;

    #[test]
    fn parse_preserves_required_fields_verbatim() {
        let result = parse_analysis_text(SCENARIO_ONE).expect("scenario payload should parse");
        assert_eq!(result.extracted_data.full_name, "Jean Dupont");
        assert_eq!(result.extracted_data.taxable_income, 45_000.0);
        assert_eq!(result.extracted_data.tmi, 30.0);
        assert!(result.optimizations.is_empty());
        assert_eq!(result.summary, "ok");
    }

    #[test]
    fn empty_body_degrades_to_missing_required_fields() {
        let err = parse_analysis_text("").expect_err("empty body must not succeed");
        assert!(matches!(err, AnalysisError::IncompleteResponse(_)));

        let err = parse_analysis_text("   \n").expect_err("blank body must not succeed");
        assert!(matches!(err, AnalysisError::IncompleteResponse(_)));
    }

    #[test]
    fn missing_tmi_is_an_incomplete_response() {
        let err = parse_analysis_text(
            r#"{"extractedData":{"fullName":"Jean Dupont","taxableIncome":45000},"optimizations":[],"summary":""}"#,
        )
        .expect_err("missing tmi must fail");
        match err {
            AnalysisError::IncompleteResponse(detail) => assert!(detail.contains("tmi")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = parse_analysis_text("désolé, je ne peux pas").expect_err("prose must fail");
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }

    #[test]
    fn malformed_optimization_entries_are_dropped_not_fatal() {
        let result = parse_analysis_text(
            r#"{
                "extractedData": {"fullName": "Jean Dupont", "taxableIncome": 45000, "tmi": 30},
                "optimizations": [
                    {"category": "Retirement", "title": "Verser sur le PER", "description": "d",
                     "estimatedGain": "900 €", "complexity": "Low", "actionable": "a"},
                    {"category": "NotACategory", "title": "invalide"}
                ],
                "summary": "ok"
            }"#,
        )
        .expect("valid entries should survive");

        assert_eq!(result.optimizations.len(), 1);
        assert_eq!(
            result.optimizations[0].category,
            OptimizationCategory::Retirement
        );
    }

    #[test]
    fn candidate_text_walks_the_envelope() {
        let envelope = json!({
            "candidates": [{"content": {"parts": [{"text": "{\"a\":1}"}]}}]
        });
        assert_eq!(candidate_text(&envelope), Some("{\"a\":1}"));
        assert_eq!(candidate_text(&json!({})), None);
        assert_eq!(candidate_text(&json!({"candidates": []})), None);
    }

    #[test]
    fn request_body_orders_documents_before_the_instruction() {
        let client = GeminiClient::new(String::new());
        let request = AnalysisRequest::new(
            vec![
                EncodedPayload {
                    data: "QQ==".to_string(),
                    mime_type: "application/pdf".to_string(),
                },
                EncodedPayload {
                    data: "Qg==".to_string(),
                    mime_type: "image/jpeg".to_string(),
                },
            ],
            "",
        )
        .expect("valid request");

        let body = client.request_body(&request);
        let parts = body["contents"][0]["parts"].as_array().expect("parts array");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(parts[1]["inlineData"]["data"], "Qg==");
        assert!(parts[2]["text"].as_str().unwrap().contains("fiscalité"));

        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["temperature"], ANALYSIS_TEMPERATURE);
        assert_eq!(
            config["responseSchema"]["properties"]["extractedData"]["required"][2],
            "tmi"
        );
    }
}
