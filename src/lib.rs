//! # frame-coach
//!
//! Send webcam frames, or frames uploaded over HTTP, to a Gemini vision model
//! and get back its coaching feedback.
//!
//! ## Features
//!
//! - **Gemini client** that posts a prompt plus an inline base64 JPEG to
//!   `generateContent` and returns the first candidate's text
//! - **Typed errors** with [`GeminiClient::analyze`], or the never-failing
//!   [`GeminiClient::analyze_or_fallback`] that turns failures into text
//! - **Capture loop** that previews a webcam and analyzes one frame every
//!   capture interval (`camera` feature for the V4L2 source and window)
//! - **HTTP endpoint** `POST /analyze_frame` built on axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use frame_coach::{encode_frame, AnalyzeOptions, GeminiClient, GeminiConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GeminiClient::new(GeminiConfig::with_api_key("my-key"));
//!
//!     let frame = image::open("squat.jpg")?.to_rgb8();
//!     let image_b64 = encode_frame(&frame, 80)?;
//!
//!     let feedback = client.analyze(&image_b64, &AnalyzeOptions::default()).await?;
//!     println!("{}", feedback);
//!     Ok(())
//! }
//! ```

#[cfg(feature = "camera")]
pub mod camera;
pub mod capture;
pub mod client;
pub mod encode;
pub mod error;
#[cfg(feature = "camera")]
pub mod preview;
pub mod server;
pub mod types;

// Re-export main types at crate root
pub use capture::{
    run_capture_loop, CaptureGate, CaptureSummary, Clock, FrameAnalyzer, FrameSource, Preview,
    SystemClock,
};
pub use client::{GeminiClient, API_KEY_HEADER, DEFAULT_COACH_PROMPT};
pub use encode::{encode_frame, encode_jpeg, to_base64, Frame};
pub use error::{AnalyzeError, CaptureError, EncodeError, Result};
pub use server::{router, serve, AnalysisResponse, AppState, ErrorResponse};
pub use types::{AnalyzeOptions, CaptureSettings, GeminiConfig, ServerConfig};
