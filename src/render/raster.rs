use std::path::Path;

use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use nalgebra::Vector2;

use super::{FrameRenderer, FrameRequest, Overlay};
use crate::{bounds::ViewWindow, snapshot::ParticleClass, RenderError, Result};

/// How a particle class is splatted onto the raster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassStyle {
    pub color: [u8; 3],
    pub alpha: f32,
    /// Splat radius in pixels; 0 draws a single pixel.
    pub radius: u32,
}

impl ClassStyle {
    #[must_use]
    pub fn default_for(class: ParticleClass) -> Self {
        match class {
            ParticleClass::PreexistingDisk | ParticleClass::Bulge => Self {
                color: [255, 255, 255],
                alpha: 0.4,
                radius: 0,
            },
            ParticleClass::NewlyFormedStar => Self {
                color: [0, 255, 255],
                alpha: 0.9,
                radius: 1,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameSize {
    Fixed { width: u32, height: u32 },
    /// Fixed height, width following the window's aspect ratio.
    FitHeight(u32),
}

impl FrameSize {
    #[must_use]
    pub fn pixels(&self, window: &ViewWindow) -> (u32, u32) {
        match *self {
            FrameSize::Fixed { width, height } => (width.max(1), height.max(1)),
            FrameSize::FitHeight(height) => {
                let aspect = window.aspect();
                let width = if aspect.is_finite() && aspect > 0. {
                    (f64::from(height) * aspect).round().max(1.) as u32
                } else {
                    height
                };
                (width, height.max(1))
            }
        }
    }
}

/// Maps window coordinates to pixel coordinates with equal scaling on both
/// axes, centring the window in the image.
#[derive(Clone, Copy, Debug)]
struct PixelMap {
    scale: f64,
    x0: f64,
    y0: f64,
    width: u32,
    height: u32,
    window: ViewWindow,
}

impl PixelMap {
    fn new(window: &ViewWindow, width: u32, height: u32) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        let scale = (w / window.width()).min(h / window.height());
        Self {
            scale,
            x0: 0.5 * (w - scale * window.width()),
            y0: 0.5 * (h - scale * window.height()),
            width,
            height,
            window: *window,
        }
    }

    /// Points on the closing edges (`xmax`, `ymin`) land in the last pixel.
    fn to_pixel(&self, p: &Vector2<f64>) -> Option<(i64, i64)> {
        if !self.window.contains(p) {
            return None;
        }
        let x = self.x0 + self.scale * (p.x - self.window.xmin);
        // image rows grow downwards
        let y = f64::from(self.height) - (self.y0 + self.scale * (p.y - self.window.ymin));

        let last_x = i64::from(self.width) - 1;
        let last_y = i64::from(self.height) - 1;
        Some((
            (x.floor() as i64).clamp(0, last_x),
            (y.floor() as i64).clamp(0, last_y),
        ))
    }
}

static CAPTION_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// One caption line: colour and size in points.
#[derive(Clone, Copy, Debug, PartialEq)]
struct CaptionStyle {
    color: [u8; 3],
    points: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Captions {
    time: CaptionStyle,
    new_stars: CaptionStyle,
    view: CaptionStyle,
    dpi: f32,
}

impl Default for Captions {
    fn default() -> Self {
        Self {
            time: CaptionStyle {
                color: [255, 255, 255],
                points: 14.,
            },
            new_stars: CaptionStyle {
                color: [0, 255, 255],
                points: 12.,
            },
            view: CaptionStyle {
                color: [255, 255, 0],
                points: 12.,
            },
            dpi: 150.,
        }
    }
}

/// Renders frames as PNG point clouds on a black background.
#[derive(Clone, Debug)]
pub struct RasterRenderer {
    size: FrameSize,
    styles: [ClassStyle; 3],
    background: [u8; 3],
    captions: Option<Captions>,
}

impl RasterRenderer {
    #[must_use]
    pub fn new(size: FrameSize) -> Self {
        Self {
            size,
            styles: ParticleClass::ALL.map(ClassStyle::default_for),
            background: [0, 0, 0],
            captions: Some(Captions::default()),
        }
    }

    #[must_use]
    pub fn style(mut self, class: ParticleClass, style: ClassStyle) -> Self {
        self.styles[class.index()] = style;
        self
    }

    /// Draw the time, new-star count and view label on each frame.
    #[must_use]
    pub fn captions(mut self, enabled: bool) -> Self {
        self.captions = enabled.then(Captions::default);
        self
    }

    /// Pixel density used to turn caption point sizes into pixels.
    #[must_use]
    pub fn dpi(mut self, dpi: f32) -> Self {
        if let Some(captions) = &mut self.captions {
            captions.dpi = dpi;
        }
        self
    }

    /// Rasterise one frame without writing it anywhere.
    #[must_use]
    pub fn draw(&self, request: &FrameRequest<'_>) -> RgbImage {
        let (width, height) = self.size.pixels(request.window);
        let mut img = RgbImage::from_pixel(width, height, Rgb(self.background));
        let map = PixelMap::new(request.window, width, height);

        // old stars first so new stars stay on top
        for class in [
            ParticleClass::PreexistingDisk,
            ParticleClass::Bulge,
            ParticleClass::NewlyFormedStar,
        ] {
            let style = self.styles[class.index()];
            for p in request.frame.points(class) {
                if let Some((x, y)) = map.to_pixel(p) {
                    splat(&mut img, x, y, &style);
                }
            }
        }

        if let Some(captions) = &self.captions {
            draw_captions(&mut img, &request.overlay, captions);
        }

        img
    }
}

impl FrameRenderer for RasterRenderer {
    fn render(&self, request: &FrameRequest<'_>, path: &Path) -> Result<()> {
        self.draw(request)
            .save(path)
            .map_err(|e| RenderError::image(path, e))
    }
}

/// Time and new-star count top-left, view label top-right, each on a
/// half-transparent black box.
fn draw_captions(img: &mut RgbImage, overlay: &Overlay, captions: &Captions) {
    let font = match FontRef::try_from_slice(CAPTION_FONT) {
        Ok(font) => font,
        Err(e) => {
            log::warn!("caption font unusable, drawing frame without captions: {e}");
            return;
        }
    };
    let (w, h) = (img.width() as f32, img.height() as f32);
    let left = (0.02 * w) as i32;

    caption(img, &font, &overlay.time, captions.time, captions.dpi, left, (0.02 * h) as i32);
    caption(
        img,
        &font,
        &overlay.new_stars,
        captions.new_stars,
        captions.dpi,
        left,
        (0.08 * h) as i32,
    );

    let scale = PxScale::from(captions.view.points * captions.dpi / 72.);
    let (text_w, _) = text_size(scale, &font, &overlay.view);
    let right = (0.98 * w) as i32 - text_w as i32;
    caption(img, &font, &overlay.view, captions.view, captions.dpi, right, (0.02 * h) as i32);
}

fn caption(
    img: &mut RgbImage,
    font: &FontRef<'_>,
    text: &str,
    style: CaptionStyle,
    dpi: f32,
    x: i32,
    y: i32,
) {
    let scale = PxScale::from(style.points * dpi / 72.);
    let (text_w, text_h) = text_size(scale, font, text);
    let pad = (scale.y / 4.) as i32;

    dim(
        img,
        x - pad,
        y - pad,
        text_w as i32 + 2 * pad,
        text_h as i32 + 2 * pad,
    );
    draw_text_mut(img, Rgb(style.color), x, y, scale, font, text);
}

fn dim(img: &mut RgbImage, x: i32, y: i32, width: i32, height: i32) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    for py in y.max(0)..(y + height).min(h) {
        for px in x.max(0)..(x + width).min(w) {
            let pixel = img.get_pixel_mut(px as u32, py as u32);
            for c in &mut pixel.0 {
                *c /= 2;
            }
        }
    }
}

fn splat(img: &mut RgbImage, x: i64, y: i64, style: &ClassStyle) {
    let r = i64::from(style.radius);
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));

    for py in y - r..=y + r {
        for px in x - r..=x + r {
            if px < 0 || py < 0 || px >= w || py >= h {
                continue;
            }
            if (px - x).pow(2) + (py - y).pow(2) > r * r {
                continue;
            }
            let pixel = img.get_pixel_mut(px as u32, py as u32);
            for (dst, src) in pixel.0.iter_mut().zip(style.color) {
                let blended = f32::from(*dst) * (1. - style.alpha) + f32::from(src) * style.alpha;
                *dst = blended.round().clamp(0., 255.) as u8;
            }
        }
    }
}
