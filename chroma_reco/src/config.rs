// THEORY:
// `RecoConfig` gathers every tunable number of the recognition engine in one
// place, the same way `PipelineConfig` does for a vision pipeline. The defaults
// reproduce a 640x480 webcam session: a 50 px selection square in the middle of
// the frame, 128 px tiles when learning the background, and 8 px blocks for the
// recognition scan.

use crate::error::{RecoError, Result};

pub const DEFAULT_FRAME_WIDTH: u32 = 640;
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;
pub const DEFAULT_SELECTION_SIZE: u32 = 50;
pub const DEFAULT_BACKGROUND_BLOCK_SIZE: u32 = 128;
pub const DEFAULT_RECOGNITION_BLOCK_SIZE: u32 = 8;
pub const DEFAULT_BLEND_RATIO: f32 = 0.5;

/// Configuration for a `RecognitionSession` and the scanners it drives.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoConfig {
    pub frame_width: u32,
    pub frame_height: u32,
    /// Side of the square selection centered in the frame, in pixels.
    pub selection_size: u32,
    /// Tile size used when (re)learning the background class.
    pub background_block_size: u32,
    /// Block size of the recognition scan.
    pub recognition_block_size: u32,
    /// Number of workers used by the parallel scanner.
    pub worker_count: usize,
    /// Weight of the label image when blended over the grayscale frame (0.0-1.0).
    pub blend_ratio: f32,
}

impl Default for RecoConfig {
    fn default() -> Self {
        Self {
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            selection_size: DEFAULT_SELECTION_SIZE,
            background_block_size: DEFAULT_BACKGROUND_BLOCK_SIZE,
            recognition_block_size: DEFAULT_RECOGNITION_BLOCK_SIZE,
            worker_count: num_cpus::get(),
            blend_ratio: DEFAULT_BLEND_RATIO,
        }
    }
}

impl RecoConfig {
    /// Default configuration resized to a given frame. The selection shrinks
    /// to the frame's shorter side when the frame is smaller than it.
    pub fn for_frame(frame_width: u32, frame_height: u32) -> Self {
        Self {
            frame_width,
            frame_height,
            selection_size: DEFAULT_SELECTION_SIZE.min(frame_width).min(frame_height),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(RecoError::InvalidConfig(format!(
                "frame size {}x{} must be non-zero",
                self.frame_width, self.frame_height
            )));
        }
        if self.background_block_size == 0 {
            return Err(RecoError::InvalidBlockSize(self.background_block_size));
        }
        if self.recognition_block_size == 0 {
            return Err(RecoError::InvalidBlockSize(self.recognition_block_size));
        }
        if self.selection_size == 0
            || self.selection_size > self.frame_width
            || self.selection_size > self.frame_height
        {
            return Err(RecoError::InvalidConfig(format!(
                "selection size {} must fit in a {}x{} frame",
                self.selection_size, self.frame_width, self.frame_height
            )));
        }
        if self.worker_count == 0 {
            return Err(RecoError::InvalidConfig("worker count must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.blend_ratio) {
            return Err(RecoError::InvalidConfig(format!(
                "blend ratio {} must be within 0.0..=1.0",
                self.blend_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RecoConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.recognition_block_size, 8);
        assert_eq!(config.background_block_size, 128);
        assert!(config.worker_count >= 1);
    }

    #[test]
    fn rejects_zero_block_size() {
        let config = RecoConfig {
            recognition_block_size: 0,
            ..RecoConfig::default()
        };
        assert_eq!(config.validate(), Err(RecoError::InvalidBlockSize(0)));
    }

    #[test]
    fn small_frames_get_a_fitting_selection() {
        let config = RecoConfig::for_frame(40, 40);
        assert_eq!(config.selection_size, 40);
        assert!(config.validate().is_ok());

        let wide = RecoConfig::for_frame(200, 30);
        assert_eq!(wide.selection_size, 30);
        assert!(wide.validate().is_ok());

        assert_eq!(RecoConfig::for_frame(640, 480).selection_size, DEFAULT_SELECTION_SIZE);
    }

    #[test]
    fn rejects_selection_larger_than_frame() {
        let config = RecoConfig {
            selection_size: 100,
            ..RecoConfig::for_frame(64, 64)
        };
        assert!(matches!(config.validate(), Err(RecoError::InvalidConfig(_))));
    }
}
