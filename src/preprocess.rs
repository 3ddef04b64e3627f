use std::path::PathBuf;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

use crate::error::TableError;
use crate::options::OcrOptions;

/// An image given either in memory or by path, resolved once at the
/// pipeline boundary.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Image(DynamicImage),
    Path(PathBuf),
}

impl ImageSource {
    pub fn load(self) -> Result<DynamicImage, TableError> {
        match self {
            Self::Image(image) => Ok(image),
            Self::Path(path) => {
                debug!(path = %path.display(), "loading image");
                Ok(image::open(path)?)
            }
        }
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(image: DynamicImage) -> Self {
        Self::Image(image)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

pub trait Preprocessor {
    fn preprocess(&self, image: &DynamicImage, options: &OcrOptions) -> DynamicImage;
}

/// Grayscale, zoom, brightness, contrast, optional sharpen and optional
/// binarization, in that order.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPreprocessor;

impl Preprocessor for StandardPreprocessor {
    fn preprocess(&self, image: &DynamicImage, options: &OcrOptions) -> DynamicImage {
        let gray = image.to_luma8();
        let zoomed = zoom(&gray, options.zoom_factor);
        let mut processed = adjust_brightness(&zoomed, options.brightness);
        processed = adjust_contrast(&processed, options.contrast);
        if options.sharpen {
            processed = imageops::unsharpen(&processed, 1.0, 2);
        }
        if options.threshold > 0 {
            processed = binarize(&processed, options.threshold, options.invert_colors);
        }
        DynamicImage::ImageLuma8(processed)
    }
}

fn zoom(image: &GrayImage, zoom_factor: u32) -> GrayImage {
    let zoom_factor = zoom_factor.max(1);
    if zoom_factor == 1 {
        return image.clone();
    }
    imageops::resize(
        image,
        image.width().saturating_mul(zoom_factor),
        image.height().saturating_mul(zoom_factor),
        FilterType::CatmullRom,
    )
}

fn clamp_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Scales every pixel towards black (factor < 1) or white (factor > 1).
fn adjust_brightness(image: &GrayImage, factor: f32) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = clamp_channel(f32::from(pixel.0[0]) * factor);
    }
    out
}

/// Spreads pixels away from (factor > 1) or towards (factor < 1) the mean
/// luminance.
fn adjust_contrast(image: &GrayImage, factor: f32) -> GrayImage {
    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return image.clone();
    }
    let sum = image.pixels().map(|pixel| u64::from(pixel.0[0])).sum::<u64>();
    let mean = (sum as f64 / count as f64).round() as f32;

    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let value = f32::from(pixel.0[0]);
        pixel.0[0] = clamp_channel(mean + (value - mean) * factor);
    }
    out
}

fn binarize(image: &GrayImage, threshold: i32, invert: bool) -> GrayImage {
    let (above, below) = if invert { (0, 255) } else { (255, 0) };
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let value = if i32::from(pixel.0[0]) > threshold {
            above
        } else {
            below
        };
        *pixel = Luma([value]);
    }
    out
}
