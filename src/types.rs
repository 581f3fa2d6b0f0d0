use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API base URL (e.g., "https://generativelanguage.googleapis.com/v1beta")
    pub endpoint: String,
    /// Model name (e.g., "gemini-2.0-flash")
    pub model: String,
    /// Static API key sent as the `key` query parameter. Empty = omitted.
    pub api_key: String,
    /// Request timeout (default: none)
    pub timeout: Option<Duration>,
    /// MIME type declared for the inline image part
    pub mime_type: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: String::new(),
            timeout: None,
            mime_type: "image/jpeg".to_string(),
        }
    }
}

impl GeminiConfig {
    /// Create a new config with the given API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the API base URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Full `generateContent` URL for the configured model.
    pub fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

/// Per-call analysis options.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Custom prompt (overrides the default coaching prompt)
    pub prompt: Option<String>,
}

impl AnalyzeOptions {
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
        }
    }
}

/// Capture loop settings.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Minimum time between two analysis calls (default: 2s)
    pub interval: Duration,
    /// JPEG quality used when encoding a frame, 1-100 (default: 80)
    pub jpeg_quality: u8,
    /// Options forwarded to the analyzer
    pub options: AnalyzeOptions,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            jpeg_quality: 80,
            options: AnalyzeOptions::default(),
        }
    }
}

impl CaptureSettings {
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn options(mut self, options: AnalyzeOptions) -> Self {
        self.options = options;
        self
    }
}

/// HTTP server bind settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    /// Listening port (default: 5001)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5001,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_url() {
        let config = GeminiConfig::with_api_key("k")
            .endpoint("http://127.0.0.1:9000/v1beta/")
            .model("gemini-test");
        assert_eq!(
            config.generate_url(),
            "http://127.0.0.1:9000/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_defaults() {
        let config = GeminiConfig::default();
        assert!(config.api_key.is_empty());
        assert!(config.timeout.is_none());
        assert_eq!(config.mime_type, "image/jpeg");

        let settings = CaptureSettings::default();
        assert_eq!(settings.interval, Duration::from_secs(2));
        assert_eq!(settings.jpeg_quality, 80);

        assert_eq!(ServerConfig::default().addr().to_string(), "0.0.0.0:5001");
    }

    #[test]
    fn test_jpeg_quality_clamped() {
        assert_eq!(CaptureSettings::default().jpeg_quality(0).jpeg_quality, 1);
        assert_eq!(CaptureSettings::default().jpeg_quality(255).jpeg_quality, 100);
    }
}
