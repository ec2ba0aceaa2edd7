//! Animated GIF destination
//!
//! Frames are encoded as they arrive, so an endless recording never grows a
//! frame backlog in memory and an interrupted run still leaves a playable
//! file behind. The loop repeats forever.

use std::fs::File;
use std::path::PathBuf;

use gif::{Encoder, Frame, Repeat};

use super::{CapturedFrame, RecordDestination, RecordError};

pub struct GifWriter {
    path: PathBuf,
    encoder: Option<Encoder<File>>,
    width: u16,
    height: u16,
    frames_written: u64,
    /// Delay between frames in centiseconds
    frame_delay: u16,
}

impl GifWriter {
    pub fn new(path: impl Into<PathBuf>, fps: u16) -> Self {
        // Nearest centisecond, never zero (a zero delay means "unspecified"
        // and plays back at whatever rate the viewer picks)
        let frame_delay = if fps > 0 {
            ((100 + fps / 2) / fps).max(1)
        } else {
            10
        };
        Self {
            path: path.into(),
            encoder: None,
            width: 0,
            height: 0,
            frames_written: 0,
            frame_delay,
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
        for pixel in rgba.chunks_exact(4) {
            rgb.extend_from_slice(&pixel[..3]);
        }
        rgb
    }

    /// First frame fixes the dimensions and opens the file
    fn open_encoder(&mut self, frame: &CapturedFrame) -> Result<(), RecordError> {
        let file = File::create(&self.path)?;
        let mut encoder = Encoder::new(file, frame.width, frame.height, &[])
            .map_err(|e| RecordError::Encode(e.to_string()))?;
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| RecordError::Encode(e.to_string()))?;
        self.encoder = Some(encoder);
        self.width = frame.width;
        self.height = frame.height;
        Ok(())
    }
}

impl RecordDestination for GifWriter {
    fn receive(&mut self, frame: &CapturedFrame) -> Result<(), RecordError> {
        if self.encoder.is_none() {
            self.open_encoder(frame)?;
        } else if frame.width != self.width || frame.height != self.height {
            return Err(RecordError::Encode(format!(
                "frame size changed mid-recording: {}x{} then {}x{}",
                self.width, self.height, frame.width, frame.height
            )));
        }

        let rgb = Self::rgba_to_rgb(frame.rgba);
        let mut gif_frame = Frame::from_rgb(frame.width, frame.height, &rgb);
        gif_frame.delay = self.frame_delay;
        if let Some(encoder) = self.encoder.as_mut() {
            encoder
                .write_frame(&gif_frame)
                .map_err(|e| RecordError::Encode(e.to_string()))?;
            self.frames_written += 1;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RecordError> {
        if self.encoder.take().is_none() {
            log::warn!("No frames captured, skipping {:?}", self.path);
            return Ok(());
        }
        log::info!("Wrote {} frames to {:?}", self.frames_written, self.path);
        Ok(())
    }
}
