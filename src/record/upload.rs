//! Remote frame-sink destination
//!
//! Streams each frame as a PNG to a collector service over HTTP. The
//! collector is optional infrastructure, so transport failures are logged and
//! the recording keeps going; only a failed health probe at startup is an
//! error.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{CapturedFrame, RecordDestination, RecordError};

pub struct FrameUploader {
    base_url: String,
    agent: ureq::Agent,
    failures: u64,
}

impl FrameUploader {
    /// Probes the collector before accepting frames
    pub fn connect(base_url: impl Into<String>) -> Result<Self, RecordError> {
        let base_url = base_url.into();
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(5))
            .build();
        agent
            .get(&format!("{base_url}/ping"))
            .call()
            .map_err(|e| RecordError::Encode(format!("frame collector unreachable: {e}")))?;
        log::info!("Frame collector reachable at {base_url}");
        Ok(Self {
            base_url,
            agent,
            failures: 0,
        })
    }

    fn encode_png(frame: &CapturedFrame) -> Result<Vec<u8>, RecordError> {
        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(
                frame.rgba,
                frame.width as u32,
                frame.height as u32,
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| RecordError::Encode(e.to_string()))?;
        Ok(png)
    }
}

impl RecordDestination for FrameUploader {
    fn receive(&mut self, frame: &CapturedFrame) -> Result<(), RecordError> {
        let png = Self::encode_png(frame)?;
        let result = self
            .agent
            .post(&format!("{}/upload-frame", self.base_url))
            .set("Content-Type", "image/png")
            .send_bytes(&png);
        if let Err(e) = result {
            self.failures += 1;
            log::warn!("Frame upload failed ({} so far): {e}", self.failures);
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RecordError> {
        let result = self
            .agent
            .post(&format!("{}/end-frame", self.base_url))
            .send_json(serde_json::json!({ "finish": true }));
        if let Err(e) = result {
            log::warn!("Failed to close remote recording: {e}");
        }
        Ok(())
    }
}
