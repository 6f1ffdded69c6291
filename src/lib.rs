//! Render galaxy-collision snapshots into frames that share one camera window.
//!
//! Every snapshot is projected to 2D with a [`ViewTransform`], the projected
//! points of the whole sequence are pooled to estimate a single
//! [`ViewWindow`], and each frame is then drawn against that window so the
//! camera never drifts between frames.

pub mod bounds;
pub mod config;
pub mod csv;
mod error;
pub mod frame;
pub mod pipeline;
pub mod projection;
pub mod render;
pub mod snapshot;
pub mod view;

pub use bounds::{BoundsConfig, FrameBoundsEstimator, ViewWindow};
pub use config::RenderConfig;
pub use error::{RenderError, Result};
pub use frame::ProjectedFrame;
pub use pipeline::{Execution, Pipeline, RunSummary};
pub use projection::{project, Axis, ViewTransform};
pub use snapshot::{
    discover_snapshots, NewStars, ParticleClass, Snapshot, SnapshotReader, SnapshotSequence,
};
pub use view::ViewMode;
