//! Live preview window.

use minifb::{Key, Window, WindowOptions};

use crate::capture::Preview;
use crate::encode::Frame;
use crate::error::CaptureError;

pub const WINDOW_TITLE: &str = "Webcam Feed (Press \"q\" to quit)";

/// minifb window showing the most recent frame. `q` or closing the window quits.
pub struct PreviewWindow {
    window: Window,
    buffer: Vec<u32>,
}

impl PreviewWindow {
    pub fn open(width: u32, height: u32) -> Result<Self, CaptureError> {
        let mut window = Window::new(
            WINDOW_TITLE,
            width as usize,
            height as usize,
            WindowOptions::default(),
        )
        .map_err(|e| CaptureError::Preview(e.to_string()))?;
        window.set_target_fps(30);

        Ok(Self {
            window,
            buffer: Vec::new(),
        })
    }
}

impl Preview for PreviewWindow {
    fn show(&mut self, frame: &Frame) -> Result<(), CaptureError> {
        rgb_to_0rgb(frame, &mut self.buffer);
        self.window
            .update_with_buffer(&self.buffer, frame.width() as usize, frame.height() as usize)
            .map_err(|e| CaptureError::Preview(e.to_string()))
    }

    fn quit_requested(&self) -> bool {
        !self.window.is_open() || self.window.is_key_down(Key::Q)
    }
}

/// Pack RGB pixels as minifb's `0RGB` u32s.
fn rgb_to_0rgb(frame: &Frame, out: &mut Vec<u32>) {
    out.clear();
    out.extend(frame.pixels().map(|p| {
        let [r, g, b] = p.0;
        (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }));
}
