use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use frame_coach::{
    AnalyzeOptions, AppState, CaptureSettings, GeminiClient, GeminiConfig, ServerConfig,
};
use tracing::warn;

#[derive(Parser)]
#[command(name = "frame-coach")]
#[command(about = "Send webcam or uploaded frames to Gemini for coaching feedback")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    gemini: GeminiArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct GeminiArgs {
    /// Gemini API key
    #[arg(
        long,
        global = true,
        env = "GEMINI_API_KEY",
        default_value = "",
        hide_env_values = true
    )]
    api_key: String,

    /// Gemini API base URL
    #[arg(
        long,
        global = true,
        env = "GEMINI_ENDPOINT",
        default_value = "https://generativelanguage.googleapis.com/v1beta"
    )]
    endpoint: String,

    /// Model used for generateContent
    #[arg(long, global = true, env = "GEMINI_MODEL", default_value = "gemini-2.0-flash")]
    model: String,

    /// Request timeout in seconds (default: no timeout)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Read the prompt from a file instead of using the built-in coaching prompt
    #[arg(long, global = true)]
    prompt_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve POST /analyze_frame (default)
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,

        #[arg(short, long, env = "PORT", default_value_t = 5001)]
        port: u16,
    },

    /// Preview the webcam and analyze a frame every interval
    Capture {
        /// Camera index (0 = /dev/video0)
        #[arg(short, long, default_value_t = 0)]
        device: usize,

        #[arg(long, default_value_t = 640)]
        width: u32,

        #[arg(long, default_value_t = 480)]
        height: u32,

        /// Seconds between two analysis calls
        #[arg(short, long, default_value_t = 2)]
        interval_secs: u64,

        #[arg(long, default_value_t = 80, value_parser = clap::value_parser!(u8).range(1..=100))]
        jpeg_quality: u8,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // RUST_LOG overrides, e.g. RUST_LOG=frame_coach=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let client = GeminiClient::new(gemini_config(&cli.gemini));
    let options = analyze_options(&cli.gemini)?;

    let command = cli.command.unwrap_or_else(|| Commands::Serve {
        host: ServerConfig::default().host,
        port: default_port(),
    });

    match command {
        Commands::Serve { host, port } => {
            let config = ServerConfig { host, port };
            let state = Arc::new(AppState::new(client, options));
            frame_coach::serve(&config, state)
                .await
                .with_context(|| format!("HTTP server on {} failed", config.addr()))
        }
        Commands::Capture {
            device,
            width,
            height,
            interval_secs,
            jpeg_quality,
        } => {
            let settings = CaptureSettings::default()
                .interval(Duration::from_secs(interval_secs))
                .jpeg_quality(jpeg_quality)
                .options(options);
            run_capture(client, settings, device, width, height).await
        }
    }
}

fn gemini_config(args: &GeminiArgs) -> GeminiConfig {
    if args.api_key.is_empty() {
        warn!("GEMINI_API_KEY is not set; requests will be sent without a key");
    }
    let mut config = GeminiConfig::with_api_key(args.api_key.clone())
        .endpoint(args.endpoint.clone())
        .model(args.model.clone());
    if let Some(secs) = args.timeout_secs {
        config = config.timeout(Duration::from_secs(secs));
    }
    config
}

fn analyze_options(args: &GeminiArgs) -> Result<AnalyzeOptions> {
    match &args.prompt_file {
        Some(path) => {
            let prompt = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read prompt file {}", path.display()))?;
            Ok(AnalyzeOptions::with_prompt(prompt))
        }
        None => Ok(AnalyzeOptions::default()),
    }
}

/// PORT when running without a subcommand.
fn default_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(ServerConfig::default().port)
}

#[cfg(feature = "camera")]
async fn run_capture(
    client: GeminiClient,
    settings: CaptureSettings,
    device: usize,
    width: u32,
    height: u32,
) -> Result<()> {
    use frame_coach::camera::{CameraConfig, V4l2Camera};
    use frame_coach::preview::PreviewWindow;

    let camera_config = CameraConfig {
        index: device,
        width,
        height,
        ..Default::default()
    };
    let mut camera = V4l2Camera::open(&camera_config)
        .context("Please ensure the webcam is connected and not in use")?;
    let (w, h) = camera.size();
    let mut window = PreviewWindow::open(w, h)?;

    println!("Webcam started. Press 'q' to quit.");
    println!(
        "Sending frames to Gemini every {} seconds...",
        settings.interval.as_secs_f32()
    );
    println!("{}", "-".repeat(50));

    let summary = frame_coach::run_capture_loop(
        &mut camera,
        &mut window,
        &frame_coach::SystemClock,
        &client,
        &settings,
    )
    .await?;

    println!("\nQuit requested. Exiting...");
    tracing::info!(frames = summary.frames, analyses = summary.analyses, "capture finished");
    drop(window);
    drop(camera);
    println!("Webcam released and windows closed.");
    Ok(())
}

#[cfg(not(feature = "camera"))]
async fn run_capture(
    _client: GeminiClient,
    _settings: CaptureSettings,
    _device: usize,
    _width: u32,
    _height: u32,
) -> Result<()> {
    anyhow::bail!(
        "frame-coach was built without the `camera` feature; rebuild with --features camera"
    )
}
