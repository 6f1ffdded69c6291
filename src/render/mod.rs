mod assemble;
mod raster;

pub use assemble::*;
pub use raster::*;

use std::path::Path;

use crate::{bounds::ViewWindow, frame::ProjectedFrame, view::ViewMode, Result};

/// Caption lines drawn on top of a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlay {
    pub time: String,
    pub new_stars: String,
    pub view: String,
}

impl Overlay {
    #[must_use]
    pub fn for_frame(frame: &ProjectedFrame, mode: &ViewMode) -> Self {
        Self {
            time: format!("Time: {:.3} Gyr", frame.time),
            new_stars: format!("New stars: {}", thousands(frame.new_star_count())),
            view: mode.label(),
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug)]
pub struct FrameRequest<'a> {
    pub index: usize,
    pub frame: &'a ProjectedFrame,
    pub window: &'a ViewWindow,
    pub overlay: Overlay,
}

/// Draws one frame to an image file.
pub trait FrameRenderer {
    fn render(&self, request: &FrameRequest<'_>, path: &Path) -> Result<()>;
}

impl<R: FrameRenderer + ?Sized> FrameRenderer for &R {
    fn render(&self, request: &FrameRequest<'_>, path: &Path) -> Result<()> {
        (**self).render(request, path)
    }
}

/// Format a count with `,` as thousands separator.
#[must_use]
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::*;
    use crate::{
        snapshot::{NewStars, Snapshot},
        ViewTransform,
    };

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_overlay() {
        let stars: NewStars = (0..1_500).map(|_| (Vector3::zeros(), 1., 0.)).collect();
        let snap = Snapshot::new(0.5, Vec::new(), Vec::new(), stars);
        let frame = ProjectedFrame::from_snapshot(&snap, &ViewTransform::edge_on());

        let overlay = Overlay::for_frame(&frame, &ViewMode::EdgeOn);
        assert_eq!(overlay.time, "Time: 0.500 Gyr");
        assert_eq!(overlay.new_stars, "New stars: 1,500");
        assert_eq!(overlay.view, "Edge-on view (X-Z plane)");
    }
}
