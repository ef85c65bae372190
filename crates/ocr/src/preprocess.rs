use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::contrast::adaptive_threshold;
use imageproc::filter::median_filter;
use std::io::Cursor;
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::types::Binarization;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Image has no pixels")]
    Empty,
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Upscaling never grows the longer side past this many pixels.
pub const MAX_PREPARED_SIDE: u32 = 8000;

/// Knobs for turning a scanned page into OCR input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessOptions {
    pub upscale_factor: u32,
    pub denoise_radius: u32,
    pub binarization: Binarization,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for PreprocessOptions {
    fn from(c: &PipelineConfig) -> Self {
        Self {
            upscale_factor: c.upscale_factor,
            denoise_radius: c.denoise_radius,
            binarization: c.binarization,
        }
    }
}

/// Decode raw image bytes (PNG / JPEG / BMP / …).
pub fn decode(data: &[u8]) -> Result<DynamicImage, PreprocessError> {
    let img = image::load_from_memory(data)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(PreprocessError::Empty);
    }
    Ok(img)
}

/// Grayscale → upscale → denoise → binarize. The input is left untouched.
///
/// Small dot-matrix glyphs have gaps between their dots; enlarging them before
/// thresholding keeps strokes connected, and the median filter removes the
/// speckle that would otherwise be binarized into stray glyph fragments.
pub fn prepare(img: &DynamicImage, opts: &PreprocessOptions) -> GrayImage {
    let gray = img.to_luma8();

    let (w, h) = gray.dimensions();
    let (tw, th) = upscaled_dimensions(w, h, opts.upscale_factor);
    let gray = if (tw, th) != (w, h) {
        image::imageops::resize(&gray, tw, th, FilterType::CatmullRom)
    } else {
        gray
    };

    let gray = if opts.denoise_radius > 0 {
        median_filter(&gray, opts.denoise_radius, opts.denoise_radius)
    } else {
        gray
    };

    binarize(&gray, opts.binarization)
}

/// Target size for upscaling `w`×`h` by `factor`, shrunk so the longer side
/// stays within [`MAX_PREPARED_SIDE`]. Never smaller than the input.
pub fn upscaled_dimensions(w: u32, h: u32, factor: u32) -> (u32, u32) {
    let longest = u64::from(w.max(h));
    if factor <= 1 || longest == 0 || longest >= u64::from(MAX_PREPARED_SIDE) {
        return (w, h);
    }
    let scale = u64::from(factor);
    let (tw, th) = (u64::from(w) * scale, u64::from(h) * scale);
    if longest * scale <= u64::from(MAX_PREPARED_SIDE) {
        return (tw as u32, th as u32);
    }
    let limit = u64::from(MAX_PREPARED_SIDE);
    let fit = |side: u64| (side * limit / longest).max(1) as u32;
    (fit(u64::from(w)), fit(u64::from(h)))
}

pub fn binarize(gray: &GrayImage, mode: Binarization) -> GrayImage {
    match mode {
        Binarization::Adaptive { block_radius } => adaptive_threshold(gray, block_radius.max(1)),
        Binarization::Fixed { cutoff } => fixed_threshold(gray, cutoff),
    }
}

fn fixed_threshold(gray: &GrayImage, cutoff: u8) -> GrayImage {
    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] > cutoff {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Decode, prepare, and return PNG bytes ready for the OCR backend, together
/// with the prepared image's dimensions.
pub fn prepare_bytes(
    data: &[u8],
    opts: &PreprocessOptions,
) -> Result<(Vec<u8>, (u32, u32)), PreprocessError> {
    let img = decode(data)?;
    let prepared = prepare(&img, opts);
    let dims = prepared.dimensions();
    Ok((encode_as_png(&prepared)?, dims))
}

pub fn encode_as_png(img: &GrayImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
