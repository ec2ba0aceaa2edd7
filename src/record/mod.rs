//! Frame recording
//!
//! The workflow captures exactly one frame per tick and hands it to a
//! [`RecordDestination`]; how frames are encoded or shipped is the
//! destination's concern. A [`Recorder`] without a destination is a no-op so
//! the workflow loop never branches on recording being enabled.

mod frames;
mod gif_writer;
mod upload;

pub use frames::FrameDirWriter;
pub use gif_writer::GifWriter;
pub use upload::FrameUploader;

use thiserror::Error;

use crate::render::PixelFrame;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame encoding failed: {0}")]
    Encode(String),
}

/// One rendered frame on its way to a destination
pub struct CapturedFrame<'a> {
    pub width: u16,
    pub height: u16,
    /// Tightly packed RGBA
    pub rgba: &'a [u8],
}

/// Sink for captured frames
pub trait RecordDestination {
    fn receive(&mut self, frame: &CapturedFrame) -> Result<(), RecordError>;
    /// Flush and close; called once when the workflow ends
    fn finish(&mut self) -> Result<(), RecordError>;
}

/// Forwards frames to an optional destination and counts them
pub struct Recorder {
    destination: Option<Box<dyn RecordDestination>>,
    frames: u64,
}

impl Recorder {
    /// A recorder that drops every frame
    pub fn disabled() -> Self {
        Self {
            destination: None,
            frames: 0,
        }
    }

    pub fn to(destination: Box<dyn RecordDestination>) -> Self {
        Self {
            destination: Some(destination),
            frames: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.destination.is_some()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn capture(&mut self, frame: &PixelFrame) -> Result<(), RecordError> {
        let Some(destination) = &mut self.destination else {
            return Ok(());
        };
        destination.receive(&CapturedFrame {
            width: frame.width as u16,
            height: frame.height as u16,
            rgba: &frame.buffer,
        })?;
        self.frames += 1;
        Ok(())
    }

    pub fn finish(&mut self) -> Result<(), RecordError> {
        if let Some(destination) = &mut self.destination {
            destination.finish()?;
            log::info!("Recording finished after {} frames", self.frames);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Counting {
        received: Rc<RefCell<u64>>,
        finished: Rc<RefCell<bool>>,
    }

    impl RecordDestination for Counting {
        fn receive(&mut self, frame: &CapturedFrame) -> Result<(), RecordError> {
            assert_eq!(
                frame.rgba.len(),
                frame.width as usize * frame.height as usize * 4
            );
            *self.received.borrow_mut() += 1;
            Ok(())
        }
        fn finish(&mut self) -> Result<(), RecordError> {
            *self.finished.borrow_mut() = true;
            Ok(())
        }
    }

    #[test]
    fn test_disabled_recorder_is_a_no_op() {
        let mut recorder = Recorder::disabled();
        let frame = PixelFrame::new(8, 6);
        recorder.capture(&frame).unwrap();
        recorder.finish().unwrap();
        assert!(!recorder.is_active());
        assert_eq!(recorder.frames(), 0);
    }

    #[test]
    fn test_recorder_forwards_every_frame() {
        let received = Rc::new(RefCell::new(0));
        let finished = Rc::new(RefCell::new(false));
        let mut recorder = Recorder::to(Box::new(Counting {
            received: received.clone(),
            finished: finished.clone(),
        }));

        let frame = PixelFrame::new(8, 6);
        for _ in 0..5 {
            recorder.capture(&frame).unwrap();
        }
        recorder.finish().unwrap();

        assert_eq!(*received.borrow(), 5);
        assert_eq!(recorder.frames(), 5);
        assert!(*finished.borrow());
    }
}
