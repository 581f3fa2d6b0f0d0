use thiserror::Error;

/// Errors returned when asking the Gemini API to analyze a frame.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// Network-level request failure (connect, DNS, timeout).
    #[error("Cannot connect to Gemini at {endpoint}: {message}")]
    Connection { endpoint: String, message: String },

    /// Gemini returned a non-success HTTP status.
    #[error("Gemini returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("Invalid response from Gemini: {0}")]
    InvalidResponse(String),

    /// The response parsed but had no `candidates[0].content.parts[0].text`.
    #[error("Unexpected Gemini response structure: {0}")]
    MissingText(String),
}

impl AnalyzeError {
    /// Human-readable text returned in place of an analysis when the call fails.
    pub fn fallback_text(&self) -> String {
        match self {
            AnalyzeError::Connection { .. } | AnalyzeError::Api { .. } => {
                format!("API Error: {}", self)
            }
            AnalyzeError::InvalidResponse(_) => "Error decoding API response.".to_string(),
            AnalyzeError::MissingText(_) => "No valid response from Gemini API.".to_string(),
        }
    }
}

/// Errors from turning a frame into a base64 JPEG.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("JPEG encoding failed: {0}")]
    Jpeg(#[from] image::ImageError),
}

/// Errors raised by the capture loop and its frame sources.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The camera device could not be opened or configured.
    #[error("Could not open webcam: {0}")]
    Device(String),

    /// A frame could not be read from the device.
    #[error("Failed to grab frame: {0}")]
    Read(String),

    /// A captured buffer could not be decoded.
    #[error("Failed to decode frame: {0}")]
    Decode(String),

    #[error("Preview window error: {0}")]
    Preview(String),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AnalyzeError>;
