use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{bounds::BoundsConfig, render::FrameSize, view::ViewMode, RenderError, Result};

/// Parameters of one render run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Directory holding the snapshot files.
    pub input_dir: PathBuf,
    pub snapshot_prefix: String,
    pub snapshot_extension: String,
    /// Directory receiving `frame_NNN.png` and the frame index.
    pub frames_dir: PathBuf,
    /// Video file; a `.gif` next to it is written if video encoding fails.
    pub save_file: PathBuf,
    pub fps: u32,
    pub mode: ViewMode,
    /// Frame width in pixels; ignored edge-on, where it follows the window.
    pub width: Option<u32>,
    /// Frame height in pixels; the mode's default when unset.
    pub height: Option<u32>,
    pub bounds: BoundsConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("../output"),
            snapshot_prefix: "snapshot_".to_owned(),
            snapshot_extension: "hdf5".to_owned(),
            frames_dir: PathBuf::from("frames"),
            save_file: PathBuf::from("galaxy_collision.mp4"),
            fps: 2,
            mode: ViewMode::default(),
            width: None,
            height: None,
            bounds: BoundsConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Read a JSON config; missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| RenderError::io(path, e))?;
        let config: Self = serde_json::from_str(&text).map_err(|source| RenderError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(RenderError::InvalidConfig("fps must be positive".to_owned()));
        }
        if self.width == Some(0) || self.height == Some(0) {
            return Err(RenderError::InvalidConfig(
                "frame size must be positive".to_owned(),
            ));
        }

        self.bounds.validate()
    }

    /// Square face-on frames, 6:5 tilted frames, and edge-on frames whose
    /// width follows the window's aspect ratio, all at 150 dpi unless
    /// overridden.
    #[must_use]
    pub fn frame_size(&self) -> FrameSize {
        let (width, height) = match self.mode {
            ViewMode::FaceOn => (1500, 1500),
            ViewMode::Tilted { .. } => (1800, 1500),
            ViewMode::EdgeOn => return FrameSize::FitHeight(self.height.unwrap_or(1200)),
        };

        FrameSize::Fixed {
            width: self.width.unwrap_or(width),
            height: self.height.unwrap_or(height),
        }
    }
}
