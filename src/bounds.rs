use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::{RenderError, Result};

const SINGULAR_EXPANSION: f64 = 0.05;

/// Tuning of the shared viewing window.
///
/// The defaults were picked by eye for galaxy-collision runs; other datasets
/// may need different values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsConfig {
    /// Lower percentile (0..=100) of the pooled coordinates per axis.
    pub lower_percentile: f64,
    /// Upper percentile (0..=100) of the pooled coordinates per axis.
    pub upper_percentile: f64,
    /// Fraction of the percentile range added on both ends.
    pub padding: f64,
    /// Half-extent of the thin axis as a fraction of the padded horizontal width.
    pub thin_axis_ratio: f64,
    /// Apply the thin-axis override in tilted views too, not only edge-on.
    pub tilted_thin_axis: bool,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            lower_percentile: 1.,
            upper_percentile: 99.,
            padding: 0.1,
            thin_axis_ratio: 1. / 3.,
            tilted_thin_axis: true,
        }
    }
}

impl BoundsConfig {
    pub fn validate(&self) -> Result<()> {
        let in_range = |p: f64| (0. ..=100.).contains(&p);
        if !in_range(self.lower_percentile) || !in_range(self.upper_percentile) {
            return Err(RenderError::InvalidConfig(format!(
                "percentiles must lie in 0..=100, got {} and {}",
                self.lower_percentile, self.upper_percentile
            )));
        }
        if self.lower_percentile >= self.upper_percentile {
            return Err(RenderError::InvalidConfig(format!(
                "lower percentile {} must be below upper percentile {}",
                self.lower_percentile, self.upper_percentile
            )));
        }
        if !(self.padding >= 0.) {
            return Err(RenderError::InvalidConfig(format!(
                "padding must be non-negative, got {}",
                self.padding
            )));
        }
        if !(self.thin_axis_ratio > 0.) {
            return Err(RenderError::InvalidConfig(format!(
                "thin-axis ratio must be positive, got {}",
                self.thin_axis_ratio
            )));
        }

        Ok(())
    }
}

/// Axis-aligned 2D box shared by every frame of a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewWindow {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl ViewWindow {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    #[must_use]
    pub fn center(&self) -> Vector2<f64> {
        Vector2::new(0.5 * (self.xmin + self.xmax), 0.5 * (self.ymin + self.ymax))
    }

    /// Width over height.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        self.width() / self.height()
    }

    #[must_use]
    pub fn contains(&self, p: &Vector2<f64>) -> bool {
        (self.xmin..=self.xmax).contains(&p.x) && (self.ymin..=self.ymax).contains(&p.y)
    }
}

/// Percentile of already sorted data, interpolating linearly between closest ranks.
///
/// `q` is in percent. Returns `None` for empty data.
#[must_use]
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }

    let rank = (q / 100.).clamp(0., 1.) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Computes one [`ViewWindow`] from the projected points of every frame.
#[derive(Clone, Debug, Default)]
pub struct FrameBoundsEstimator {
    config: BoundsConfig,
    thin_axis: bool,
}

impl FrameBoundsEstimator {
    #[must_use]
    pub fn new(config: BoundsConfig) -> Self {
        Self {
            config,
            thin_axis: false,
        }
    }

    /// Replace the vertical range by a fixed fraction of the horizontal one,
    /// centred on zero.
    #[must_use]
    pub fn thin_axis(mut self, enabled: bool) -> Self {
        self.thin_axis = enabled;
        self
    }

    #[must_use]
    pub fn config(&self) -> &BoundsConfig {
        &self.config
    }

    /// Pool all point sets (every class of every frame) and frame them.
    ///
    /// Fails with [`RenderError::EmptyDataset`] if there is no finite point at all.
    pub fn estimate<'a, I>(&self, point_sets: I) -> Result<ViewWindow>
    where
        I: IntoIterator<Item = &'a [Vector2<f64>]>,
    {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for p in point_sets.into_iter().flatten() {
            if p.x.is_finite() && p.y.is_finite() {
                xs.push(p.x);
                ys.push(p.y);
            }
        }
        if xs.is_empty() {
            return Err(RenderError::EmptyDataset);
        }

        let (xmin, xmax) = self.padded_range(&mut xs);
        let (ymin, ymax) = if self.thin_axis {
            let half = self.config.thin_axis_ratio * (xmax - xmin);
            (-half, half)
        } else {
            self.padded_range(&mut ys)
        };

        let window = ViewWindow {
            xmin,
            xmax,
            ymin,
            ymax,
        };
        log::info!(
            "view window from {} points: x = [{:.3}, {:.3}], y = [{:.3}, {:.3}]",
            xs.len(),
            window.xmin,
            window.xmax,
            window.ymin,
            window.ymax
        );

        Ok(window)
    }

    fn padded_range(&self, values: &mut [f64]) -> (f64, f64) {
        values.sort_unstable_by(f64::total_cmp);

        // values is non-empty here
        let lo = percentile(values, self.config.lower_percentile).unwrap_or_default();
        let hi = percentile(values, self.config.upper_percentile).unwrap_or_default();
        let pad = self.config.padding * (hi - lo);

        nonsingular(lo - pad, hi + pad)
    }
}

/// Widen a zero-width range so it can still be mapped onto pixels.
fn nonsingular(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo {
        return (lo, hi);
    }
    if lo == 0. {
        return (-SINGULAR_EXPANSION, SINGULAR_EXPANSION);
    }

    (
        lo - SINGULAR_EXPANSION * lo.abs(),
        hi + SINGULAR_EXPANSION * hi.abs(),
    )
}
