use std::{
    fs,
    path::{Path, PathBuf},
};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{
    bounds::{FrameBoundsEstimator, ViewWindow},
    config::RenderConfig,
    csv::{write_frame_index, FrameRecord},
    frame::ProjectedFrame,
    render::{assemble_with_fallback, Assembly, FrameRenderer, FrameRequest, Overlay, SequenceAssembler},
    snapshot::{discover_snapshots, SnapshotReader, SnapshotSequence},
    RenderError, Result,
};

pub const FRAME_INDEX: &str = "frames.csv";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Execution {
    #[default]
    SingleThreaded,
    /// Project frames on the rayon thread pool. The result is identical.
    #[cfg(feature = "rayon")]
    Rayon,
}

/// Outcome of a completed run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub window: ViewWindow,
    pub frames: Vec<PathBuf>,
    pub index: PathBuf,
    pub assembly: Assembly,
}

/// Two-pass renderer: frame every snapshot with one shared window, then draw.
#[derive(Clone, Debug)]
pub struct Pipeline {
    config: RenderConfig,
    execution: Execution,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            execution: Execution::SingleThreaded,
        }
    }

    #[must_use]
    pub fn execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    #[cfg(feature = "rayon")]
    #[must_use]
    pub fn rayon(self) -> Self {
        self.execution(Execution::Rayon)
    }

    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[must_use]
    pub fn project_sequence(&self, sequence: &SnapshotSequence) -> Vec<ProjectedFrame> {
        let transform = self.config.mode.transform();

        match self.execution {
            Execution::SingleThreaded => sequence
                .iter()
                .map(|snap| ProjectedFrame::from_snapshot(snap, &transform))
                .collect(),
            #[cfg(feature = "rayon")]
            Execution::Rayon => sequence
                .as_slice()
                .par_iter()
                .map(|snap| ProjectedFrame::from_snapshot(snap, &transform))
                .collect(),
        }
    }

    /// Pass 1: one window over every class of every frame.
    pub fn estimate_window(&self, frames: &[ProjectedFrame]) -> Result<ViewWindow> {
        let bounds = &self.config.bounds;
        FrameBoundsEstimator::new(bounds.clone())
            .thin_axis(self.config.mode.thin_axis(bounds))
            .estimate(frames.iter().flat_map(|frame| frame.point_sets()))
    }

    /// Pass 2: draw each frame against the fixed window.
    pub fn render_frames<F: FrameRenderer + ?Sized>(
        &self,
        frames: &[ProjectedFrame],
        window: &ViewWindow,
        renderer: &F,
    ) -> Result<Vec<PathBuf>> {
        let dir = &self.config.frames_dir;
        fs::create_dir_all(dir).map_err(|e| RenderError::io(dir, e))?;
        remove_stale_frames(dir)?;

        let mut records = Vec::with_capacity(frames.len());
        for (index, frame) in frames.iter().enumerate() {
            let path = dir.join(format!("frame_{index:03}.png"));
            let request = FrameRequest {
                index,
                frame,
                window,
                overlay: Overlay::for_frame(frame, &self.config.mode),
            };
            renderer.render(&request, &path)?;
            log::info!("saved {}", path.display());

            records.push(FrameRecord {
                file: path,
                frame,
                overlay: request.overlay,
            });
        }

        let index = dir.join(FRAME_INDEX);
        write_frame_index(&records, &index).map_err(|e| RenderError::io(&index, e))?;

        Ok(records.into_iter().map(|r| r.file).collect())
    }

    /// Project, frame, render and assemble an already loaded sequence.
    pub fn run_sequence<F: FrameRenderer + ?Sized>(
        &self,
        sequence: &SnapshotSequence,
        renderer: &F,
        assemblers: &[Box<dyn SequenceAssembler>],
    ) -> Result<RunSummary> {
        self.config.validate()?;
        log::info!(
            "rendering {} snapshots, {} view",
            sequence.len(),
            self.config.mode
        );

        let frames = self.project_sequence(sequence);
        let window = self.estimate_window(&frames)?;
        let paths = self.render_frames(&frames, &window, renderer)?;
        let assembly =
            assemble_with_fallback(assemblers, &paths, &self.config.save_file, self.config.fps)?;

        Ok(RunSummary {
            window,
            index: self.config.frames_dir.join(FRAME_INDEX),
            frames: paths,
            assembly,
        })
    }

    /// Discover and load every snapshot in the input directory, then render.
    pub fn run<R, F>(
        &self,
        reader: &R,
        renderer: &F,
        assemblers: &[Box<dyn SequenceAssembler>],
    ) -> Result<RunSummary>
    where
        R: SnapshotReader + ?Sized,
        F: FrameRenderer + ?Sized,
    {
        let config = &self.config;
        let paths = discover_snapshots(
            &config.input_dir,
            &config.snapshot_prefix,
            &config.snapshot_extension,
        )?;
        if paths.is_empty() {
            log::error!("no snapshots found in {}", config.input_dir.display());
            return Err(RenderError::EmptyDataset);
        }
        log::info!("found {} snapshots", paths.len());

        let sequence = SnapshotSequence::load(reader, &paths)?;
        self.run_sequence(&sequence, renderer, assemblers)
    }
}

/// Remove `frame_*.png` left in `dir` by an earlier run.
fn remove_stale_frames(dir: &Path) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| RenderError::io(dir, e))?;

    let mut removed = 0;
    for entry in entries {
        let path = entry.map_err(|e| RenderError::io(dir, e))?.path();
        let is_frame = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("frame_") && name.ends_with(".png"));
        if is_frame && path.is_file() {
            fs::remove_file(&path).map_err(|e| RenderError::io(&path, e))?;
            removed += 1;
        }
    }
    if removed > 0 {
        log::debug!("removed {removed} old frames from {}", dir.display());
    }

    Ok(())
}
