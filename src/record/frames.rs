//! Numbered-PNG destination
//!
//! Writes each captured frame as `frame_NNNNNN.png` into a directory, for
//! offline encoding or inspection.

use std::path::PathBuf;

use super::{CapturedFrame, RecordDestination, RecordError};

pub struct FrameDirWriter {
    dir: PathBuf,
    index: u64,
}

impl FrameDirWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, RecordError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, index: 0 })
    }
}

impl RecordDestination for FrameDirWriter {
    fn receive(&mut self, frame: &CapturedFrame) -> Result<(), RecordError> {
        let path = self.dir.join(format!("frame_{:06}.png", self.index));
        image::save_buffer(
            &path,
            frame.rgba,
            frame.width as u32,
            frame.height as u32,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| RecordError::Encode(e.to_string()))?;
        self.index += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RecordError> {
        log::info!("Wrote {} frames to {:?}", self.index, self.dir);
        Ok(())
    }
}
