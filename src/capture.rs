//! Capture loop: read frames, show them, and send one to the analyzer every
//! capture interval.
//!
//! The loop is written against small traits so it runs the same with a real
//! webcam and preview window (feature `camera`) or with test doubles.

use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::client::GeminiClient;
use crate::encode::{self, Frame};
use crate::error::CaptureError;
use crate::types::{AnalyzeOptions, CaptureSettings};

/// Blocking source of frames.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Frame, CaptureError>;
}

/// Where frames are displayed while the loop runs.
pub trait Preview {
    fn show(&mut self, frame: &Frame) -> Result<(), CaptureError>;

    /// True once the user asked to quit.
    fn quit_requested(&self) -> bool;
}

pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Turns a base64 JPEG into feedback text. Never fails; failures come back as
/// descriptive text.
#[allow(async_fn_in_trait)]
pub trait FrameAnalyzer {
    async fn analyze(&self, image_b64: &str, options: &AnalyzeOptions) -> String;
}

impl FrameAnalyzer for GeminiClient {
    async fn analyze(&self, image_b64: &str, options: &AnalyzeOptions) -> String {
        self.analyze_or_fallback(image_b64, options).await
    }
}

/// Elapsed-time gate between analysis calls.
#[derive(Debug, Clone)]
pub struct CaptureGate {
    interval: Duration,
    last: Instant,
}

impl CaptureGate {
    /// The first call becomes due `interval` after `start`.
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            last: start,
        }
    }

    /// Returns true and rearms at `now` once `interval` has elapsed.
    pub fn ready(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

/// Counters reported when the loop exits cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    pub frames: u64,
    pub analyses: u64,
}

/// Run until the preview reports a quit request.
///
/// The analyzer is awaited inline, so the preview stalls while a call is in
/// flight. A frame read failure ends the loop with an error.
pub async fn run_capture_loop<S, P, C, A>(
    source: &mut S,
    preview: &mut P,
    clock: &C,
    analyzer: &A,
    settings: &CaptureSettings,
) -> Result<CaptureSummary, CaptureError>
where
    S: FrameSource,
    P: Preview,
    C: Clock,
    A: FrameAnalyzer,
{
    let mut gate = CaptureGate::new(settings.interval, clock.now());
    let mut summary = CaptureSummary::default();

    loop {
        let frame = match source.next_frame() {
            Ok(frame) => frame,
            Err(err) => {
                error!("{}", err);
                return Err(err);
            }
        };
        summary.frames += 1;

        preview.show(&frame)?;

        if gate.ready(clock.now()) {
            println!("\n[{}] Capturing frame and sending to Gemini...", timestamp());
            let image_b64 = encode::encode_frame(&frame, settings.jpeg_quality)?;
            let feedback = analyzer.analyze(&image_b64, &settings.options).await;
            summary.analyses += 1;
            println!("[{}] Gemini says: {}", timestamp(), feedback);
            println!("{}", "-".repeat(50));
        }

        if preview.quit_requested() {
            info!(
                frames = summary.frames,
                analyses = summary.analyses,
                "quit requested, stopping capture"
            );
            return Ok(summary);
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::cell::{Cell, RefCell};

    struct FakeClock {
        now: Cell<Instant>,
    }

    impl FakeClock {
        fn new() -> Self {
            Self {
                now: Cell::new(Instant::now()),
            }
        }

        fn advance(&self, by: Duration) {
            self.now.set(self.now.get() + by);
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            self.now.get()
        }
    }

    /// Yields `remaining` frames, advancing the clock by `step` before each.
    struct FakeSource<'a> {
        clock: &'a FakeClock,
        step: Duration,
        remaining: usize,
    }

    impl FrameSource for FakeSource<'_> {
        fn next_frame(&mut self) -> Result<Frame, CaptureError> {
            if self.remaining == 0 {
                return Err(CaptureError::Read("end of stream".to_string()));
            }
            self.remaining -= 1;
            self.clock.advance(self.step);
            Ok(RgbImage::from_pixel(16, 12, Rgb([10, 200, 30])))
        }
    }

    struct FakePreview {
        shown: usize,
        quit_after: usize,
    }

    impl FakePreview {
        fn quit_after(quit_after: usize) -> Self {
            Self {
                shown: 0,
                quit_after,
            }
        }
    }

    impl Preview for FakePreview {
        fn show(&mut self, _frame: &Frame) -> Result<(), CaptureError> {
            self.shown += 1;
            Ok(())
        }

        fn quit_requested(&self) -> bool {
            self.shown >= self.quit_after
        }
    }

    #[derive(Default)]
    struct RecordingAnalyzer {
        calls: RefCell<Vec<String>>,
    }

    impl FrameAnalyzer for RecordingAnalyzer {
        async fn analyze(&self, image_b64: &str, _options: &AnalyzeOptions) -> String {
            self.calls.borrow_mut().push(image_b64.to_string());
            "ok".to_string()
        }
    }

    async fn run(step_ms: u64, frames: usize) -> (CaptureSummary, RecordingAnalyzer) {
        let clock = FakeClock::new();
        let mut source = FakeSource {
            clock: &clock,
            step: Duration::from_millis(step_ms),
            remaining: frames,
        };
        let mut preview = FakePreview::quit_after(frames);
        let analyzer = RecordingAnalyzer::default();
        let settings = CaptureSettings::default();

        let summary = run_capture_loop(&mut source, &mut preview, &clock, &analyzer, &settings)
            .await
            .unwrap();
        (summary, analyzer)
    }

    #[test]
    fn test_gate_waits_for_full_interval() {
        let start = Instant::now();
        let mut gate = CaptureGate::new(Duration::from_secs(2), start);
        assert!(!gate.ready(start));
        assert!(!gate.ready(start + Duration::from_millis(1999)));
        assert!(gate.ready(start + Duration::from_secs(2)));
        // rearmed at 2s
        assert!(!gate.ready(start + Duration::from_secs(3)));
        assert!(gate.ready(start + Duration::from_secs(4)));
    }

    #[tokio::test]
    async fn test_no_calls_within_interval() {
        // 10 frames, last one at 1.0s
        let (summary, analyzer) = run(100, 10).await;
        assert_eq!(summary.frames, 10);
        assert_eq!(summary.analyses, 0);
        assert!(analyzer.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_one_call_at_interval() {
        // frames at 0.5s, 1.0s, 1.5s, 2.0s
        let (summary, analyzer) = run(500, 4).await;
        assert_eq!(summary.frames, 4);
        assert_eq!(summary.analyses, 1);
        assert_eq!(analyzer.calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_single_late_frame_triggers_once() {
        let (summary, _) = run(2500, 1).await;
        assert_eq!(summary.analyses, 1);
    }

    #[tokio::test]
    async fn test_calls_are_spaced_by_interval() {
        // 4.5s of frames every 0.5s: calls at 2.0s and 4.0s
        let (summary, analyzer) = run(500, 9).await;
        assert_eq!(summary.frames, 9);
        assert_eq!(summary.analyses, 2);
        assert_eq!(analyzer.calls.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_analyzer_receives_base64_jpeg() {
        let (_, analyzer) = run(2000, 1).await;
        let calls = analyzer.calls.borrow();
        let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, &calls[0])
            .unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_read_failure_ends_loop() {
        let clock = FakeClock::new();
        let mut source = FakeSource {
            clock: &clock,
            step: Duration::from_millis(100),
            remaining: 3,
        };
        let mut preview = FakePreview::quit_after(usize::MAX);
        let analyzer = RecordingAnalyzer::default();

        let result = run_capture_loop(
            &mut source,
            &mut preview,
            &clock,
            &analyzer,
            &CaptureSettings::default(),
        )
        .await;

        assert!(matches!(result, Err(CaptureError::Read(_))));
        assert_eq!(preview.shown, 3);
        assert!(analyzer.calls.borrow().is_empty());
    }
}
