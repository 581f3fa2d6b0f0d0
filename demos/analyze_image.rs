use frame_coach::{encode_frame, AnalyzeOptions, GeminiClient, GeminiConfig};

/// Analyze a still image from disk, the same way the capture loop analyzes a
/// webcam frame.
///
/// Reads the key from GEMINI_API_KEY.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let image_path = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: analyze_image <image.jpg> [prompt]");
        std::process::exit(1);
    });
    let options = match std::env::args().nth(2) {
        Some(prompt) => AnalyzeOptions::with_prompt(prompt),
        None => AnalyzeOptions::default(),
    };

    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
    let client = GeminiClient::new(GeminiConfig::with_api_key(api_key));

    let frame = image::open(&image_path)?.to_rgb8();
    let image_b64 = encode_frame(&frame, 80)?;

    println!("Sending {} ({}x{}) to Gemini...", image_path, frame.width(), frame.height());

    // Typed result here; the server and capture loop use analyze_or_fallback.
    match client.analyze(&image_b64, &options).await {
        Ok(feedback) => println!("\n{}", feedback),
        Err(err) => {
            eprintln!("Analysis failed: {}", err);
            std::process::exit(2);
        }
    }

    Ok(())
}
