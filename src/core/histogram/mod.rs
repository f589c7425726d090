//! # Histogram Module
//!
//! Turns an image file into an [`ImageSignature`]: its dimensions plus a
//! fixed-resolution color histogram.
//!
//! ## Resolution
//! Images are converted to 8-bit RGB and counted into 256 buckets per
//! channel, 768 buckets in total. Every bucket is divided by the pixel
//! count, so a resized copy with the same color distribution produces the
//! same histogram as its original.
//!
//! Decoding sits behind [`SignatureDecoder`] so callers (and tests) can
//! swap the image backend without touching the comparator.

use crate::error::DecodeError;
use image::{DynamicImage, ImageError, ImageReader};
use std::path::Path;

/// Buckets per RGB channel
pub const BUCKETS_PER_CHANNEL: usize = 256;

/// Total histogram length (three channels)
pub const HISTOGRAM_LEN: usize = BUCKETS_PER_CHANNEL * 3;

/// Decoded summary of one image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSignature {
    width: u32,
    height: u32,
    histogram: Vec<f64>,
}

impl ImageSignature {
    /// Build a signature from already-computed parts
    pub fn new(width: u32, height: u32, histogram: Vec<f64>) -> Self {
        Self {
            width,
            height,
            histogram,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn histogram(&self) -> &[f64] {
        &self.histogram
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Relative difference between two aspect ratios, in `[0, 1)`
    pub fn aspect_difference(&self, other: &Self) -> f64 {
        let (a, b) = (self.aspect_ratio(), other.aspect_ratio());
        (a - b).abs() / a.max(b)
    }

    /// Root-mean-square deviation between the two histograms.
    ///
    /// Histograms of different (or zero) length cannot be compared and
    /// yield infinity, which never passes a threshold.
    pub fn rms_deviation(&self, other: &Self) -> f64 {
        let len = self.histogram.len();
        if len == 0 || len != other.histogram.len() {
            return f64::INFINITY;
        }

        let sum_of_squares: f64 = self
            .histogram
            .iter()
            .zip(&other.histogram)
            .map(|(a, b)| (a - b).powi(2))
            .sum();

        (sum_of_squares / len as f64).sqrt()
    }
}

/// Source of image signatures
pub trait SignatureDecoder: Send + Sync {
    /// Decode the file at `path`. Unreadable, unsupported and corrupt files
    /// are errors, never panics.
    fn decode(&self, path: &Path) -> Result<ImageSignature, DecodeError>;
}

/// Decoder backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct HistogramDecoder;

impl HistogramDecoder {
    /// Compute the signature of an in-memory image
    pub fn signature_of(image: &DynamicImage) -> ImageSignature {
        let rgb = image.to_rgb8();
        let mut counts = vec![0u64; HISTOGRAM_LEN];

        for pixel in rgb.pixels() {
            for (channel, value) in pixel.0.iter().enumerate() {
                counts[channel * BUCKETS_PER_CHANNEL + *value as usize] += 1;
            }
        }

        let pixels = (rgb.width() as u64 * rgb.height() as u64).max(1) as f64;
        let histogram = counts.into_iter().map(|c| c as f64 / pixels).collect();

        ImageSignature::new(rgb.width(), rgb.height(), histogram)
    }
}

impl SignatureDecoder for HistogramDecoder {
    fn decode(&self, path: &Path) -> Result<ImageSignature, DecodeError> {
        let io_error = |source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        };

        let image = ImageReader::open(path)
            .map_err(io_error)?
            .with_guessed_format()
            .map_err(io_error)?
            .decode()
            .map_err(|e| match e {
                ImageError::IoError(source) => DecodeError::Io {
                    path: path.to_path_buf(),
                    source,
                },
                ImageError::Unsupported(_) => DecodeError::Unsupported {
                    path: path.to_path_buf(),
                },
                other => DecodeError::Corrupt {
                    path: path.to_path_buf(),
                    reason: other.to_string(),
                },
            })?;

        if image.width() == 0 || image.height() == 0 {
            return Err(DecodeError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        Ok(Self::signature_of(&image))
    }
}
