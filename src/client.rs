use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::error::{AnalyzeError, Result};
use crate::types::{AnalyzeOptions, GeminiConfig};

/// Header carrying the static API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

pub const DEFAULT_COACH_PROMPT: &str = r#"
You are a virtual sports coach which speak hebrew. Your role is to analyze video footage of a user performing physical activities. Your tasks are:
Sport Identification: Detect and identify which sport the user is performing based on body movements, equipment, and environment.
Form and Technique Evaluation: Analyze the user's posture, gestures, and movement patterns to determine if they align with the correct technique for the identified sport.
Feedback and Alerts:
If the technique is correct, provide positive reinforcement and suggestions for improvement.
If the technique is incorrect or potentially harmful, issue an alert with a clear explanation of what is wrong and how to correct it.
Tone and Style: Be encouraging, constructive, and professional. Use terminology appropriate to the sport and skill level of the user.
Safety Awareness: Prioritize injury prevention. If a movement appears unsafe, flag it immediately and suggest safer alternatives.
You are capable of understanding video input, recognizing human motion, and comparing it to sport-specific biomechanical models.
You adapt your feedback based on the user's apparent skill level and progress over time.
"#;

/// Async client for the Gemini `generateContent` API.
///
/// # Example
/// ```no_run
/// use frame_coach::{AnalyzeOptions, GeminiClient, GeminiConfig};
///
/// # async fn example(image_b64: &str) -> frame_coach::Result<()> {
/// let client = GeminiClient::new(GeminiConfig::with_api_key("my-key"));
/// let feedback = client.analyze(image_b64, &AnalyzeOptions::default()).await?;
/// println!("{feedback}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Send one base64 JPEG plus the prompt and return the model's text.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The endpoint is unreachable or the request times out
    /// - Gemini answers with a non-success status
    /// - The body is not JSON, or has no text in its first candidate
    pub async fn analyze(&self, image_b64: &str, options: &AnalyzeOptions) -> Result<String> {
        let prompt = options.prompt.as_deref().unwrap_or(DEFAULT_COACH_PROMPT);
        let body = request_body(prompt, &self.config.mime_type, image_b64);

        let mut req = self.http.post(self.config.generate_url()).json(&body);
        if !self.config.api_key.is_empty() {
            req = req.header(API_KEY_HEADER, self.config.api_key.as_str());
        }
        if let Some(timeout) = self.config.timeout {
            req = req.timeout(timeout);
        }

        let resp = req.send().await.map_err(|e| self.connection_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(AnalyzeError::Api { status, body: text });
        }

        let raw = resp.text().await.map_err(|e| self.connection_error(e))?;
        let json: Value = serde_json::from_str(&raw)
            .map_err(|e| AnalyzeError::InvalidResponse(e.to_string()))?;

        match extract_text(&json) {
            Some(text) => Ok(text.to_string()),
            None => Err(AnalyzeError::MissingText(json.to_string())),
        }
    }

    // reqwest's Display includes the request URL; keep it out of caller-visible text.
    fn connection_error(&self, err: reqwest::Error) -> AnalyzeError {
        AnalyzeError::Connection {
            endpoint: self.config.endpoint.clone(),
            message: err.without_url().to_string(),
        }
    }

    /// Like [`GeminiClient::analyze`], but never fails: errors are logged and
    /// replaced by [`AnalyzeError::fallback_text`].
    pub async fn analyze_or_fallback(&self, image_b64: &str, options: &AnalyzeOptions) -> String {
        match self.analyze(image_b64, options).await {
            Ok(text) => {
                debug!(chars = text.chars().count(), "Gemini responded");
                text
            }
            Err(err @ AnalyzeError::MissingText(_)) => {
                warn!("{}", err);
                err.fallback_text()
            }
            Err(err) => {
                error!("Error calling Gemini API: {}", err);
                err.fallback_text()
            }
        }
    }
}

/// Build the `generateContent` body: one user turn with a text part and an
/// inline image part.
pub fn request_body(prompt: &str, mime_type: &str, image_b64: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": prompt },
                {
                    "inlineData": {
                        "mimeType": mime_type,
                        "data": image_b64,
                    }
                },
            ],
        }],
    })
}

/// First text part of the first candidate, if the response has one.
pub fn extract_text(response: &Value) -> Option<&str> {
    response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(|v| v.as_str())
}
