use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    process::Command,
};

use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay, Frame,
};

use crate::{RenderError, Result};

/// Turns an ordered sequence of rendered frames into one artifact.
pub trait SequenceAssembler {
    fn name(&self) -> &str;

    /// Encode `frames` at `fps` and return the path actually written, which
    /// may differ from `output` in its extension.
    fn assemble(&self, frames: &[PathBuf], output: &Path, fps: u32) -> Result<PathBuf>;
}

/// Encodes an H.264 video by running an external `ffmpeg`.
#[derive(Clone, Debug)]
pub struct FfmpegAssembler {
    program: PathBuf,
    input_pattern: String,
    codec: String,
}

impl Default for FfmpegAssembler {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            input_pattern: "frame_%03d.png".to_owned(),
            codec: "libx264".to_owned(),
        }
    }
}

impl FfmpegAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// printf-style pattern of the frame file names inside their directory.
    #[must_use]
    pub fn input_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.input_pattern = pattern.into();
        self
    }

    fn encode_error(&self, reason: impl Into<String>) -> RenderError {
        RenderError::Encode {
            encoder: self.name().to_owned(),
            reason: reason.into(),
        }
    }
}

impl SequenceAssembler for FfmpegAssembler {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn assemble(&self, frames: &[PathBuf], output: &Path, fps: u32) -> Result<PathBuf> {
        let status = self
            .command(frames, output, fps)?
            .status()
            .map_err(|e| {
                self.encode_error(format!("could not run {}: {e}", self.program.display()))
            })?;

        if !status.success() {
            return Err(self.encode_error(format!("exited with {status}")));
        }

        Ok(output.to_path_buf())
    }
}

impl FfmpegAssembler {
    /// Encodes exactly `frames.len()` frames; yuv420p needs even dimensions,
    /// so odd sizes are truncated by one pixel.
    fn command(&self, frames: &[PathBuf], output: &Path, fps: u32) -> Result<Command> {
        let dir = frames
            .first()
            .and_then(|f| f.parent())
            .ok_or_else(|| self.encode_error("no frames to encode"))?;

        let fps = fps.to_string();
        let count = frames.len().to_string();
        let mut cmd = Command::new(&self.program);
        cmd.arg("-y")
            .args(["-loglevel", "error"])
            .args(["-framerate", fps.as_str()])
            .arg("-i")
            .arg(dir.join(&self.input_pattern))
            .args(["-frames:v", count.as_str()])
            .args(["-vf", "scale=trunc(iw/2)*2:trunc(ih/2)*2"])
            .args(["-vcodec", self.codec.as_str(), "-pix_fmt", "yuv420p"])
            .arg(output);

        Ok(cmd)
    }
}

/// Encodes a looping GIF next to the requested output.
#[derive(Clone, Copy, Debug, Default)]
pub struct GifAssembler;

impl SequenceAssembler for GifAssembler {
    fn name(&self) -> &str {
        "gif"
    }

    fn assemble(&self, frames: &[PathBuf], output: &Path, fps: u32) -> Result<PathBuf> {
        let encode_error = |reason: String| RenderError::Encode {
            encoder: self.name().to_owned(),
            reason,
        };
        if frames.is_empty() {
            return Err(encode_error("no frames to encode".to_owned()));
        }

        let gif_path = output.with_extension("gif");
        let file = File::create(&gif_path).map_err(|e| RenderError::io(&gif_path, e))?;
        let mut encoder = GifEncoder::new(BufWriter::new(file));
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| encode_error(e.to_string()))?;

        let delay = Delay::from_numer_denom_ms(1000, fps.max(1));
        for path in frames {
            let img = image::open(path)
                .map_err(|e| RenderError::image(path, e))?
                .to_rgba8();
            encoder
                .encode_frame(Frame::from_parts(img, 0, 0, delay))
                .map_err(|e| encode_error(e.to_string()))?;
        }

        Ok(gif_path)
    }
}

/// What the run finally produced besides the individual frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Assembly {
    Encoded { encoder: String, path: PathBuf },
    ImageSequence { frames: usize },
}

/// Try each assembler in order, falling back to the next on encoding errors.
///
/// If none succeeds, the frames are kept as a plain image sequence. Errors
/// other than encoding failures (e.g. unreadable frames) are returned.
pub fn assemble_with_fallback(
    assemblers: &[Box<dyn SequenceAssembler>],
    frames: &[PathBuf],
    output: &Path,
    fps: u32,
) -> Result<Assembly> {
    for assembler in assemblers {
        match assembler.assemble(frames, output, fps) {
            Ok(path) => {
                log::info!("{} wrote {}", assembler.name(), path.display());
                return Ok(Assembly::Encoded {
                    encoder: assembler.name().to_owned(),
                    path,
                });
            }
            Err(e) if e.is_recoverable() => log::warn!("{e}, trying next encoder"),
            Err(e) => return Err(e),
        }
    }

    log::info!("keeping {} frames as an image sequence", frames.len());
    Ok(Assembly::ImageSequence {
        frames: frames.len(),
    })
}
