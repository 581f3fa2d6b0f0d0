//! V4L2 webcam frame source.

use tracing::info;
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

use crate::capture::FrameSource;
use crate::encode::Frame;
use crate::error::CaptureError;

/// Configuration for camera capture.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    /// Device index, 0 = `/dev/video0`
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub buffer_count: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: 640,
            height: 480,
            fps: 30,
            buffer_count: 4,
        }
    }
}

/// MJPEG webcam read through an mmap stream.
pub struct V4l2Camera {
    stream: MmapStream<'static>,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for V4l2Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Camera")
            .field("stream", &"<v4l::MmapStream>")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl V4l2Camera {
    /// Open the device, request MJPEG at the configured size and frame rate,
    /// and start streaming.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::Device` if the device cannot be opened, does not
    /// accept MJPEG, or refuses the stream setup.
    pub fn open(config: &CameraConfig) -> Result<Self, CaptureError> {
        let device = Device::new(config.index).map_err(|e| device_error(config, e))?;

        let requested = Format::new(config.width, config.height, FourCC::new(b"MJPG"));
        let format =
        Capture::set_format(&device, &requested).map_err(|e| device_error(config, e))?;
        if format.fourcc != FourCC::new(b"MJPG") {
            return Err(CaptureError::Device(format!(
                "/dev/video{} does not support MJPEG (got {})",
                config.index, format.fourcc
            )));
        }

        let params = v4l::video::capture::Parameters::with_fps(config.fps);
        Capture::set_params(&device, &params).map_err(|e| device_error(config, e))?;

        let stream = MmapStream::with_buffers(&device, Type::VideoCapture, config.buffer_count)
            .map_err(|e| device_error(config, e))?;

        info!(
            device = config.index,
            width = format.width,
            height = format.height,
            "webcam opened"
        );

        Ok(Self {
            stream,
            width: format.width,
            height: format.height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl FrameSource for V4l2Camera {
    fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        let (data, _metadata) =
            CaptureStream::next(&mut self.stream).map_err(|e| CaptureError::Read(e.to_string()))?;
        let decoded = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)
            .map_err(|e| CaptureError::Decode(e.to_string()))?;
        Ok(decoded.to_rgb8())
    }
}

fn device_error(config: &CameraConfig, err: std::io::Error) -> CaptureError {
    CaptureError::Device(format!("/dev/video{}: {}", config.index, err))
}
