//! Pixel engine trait and shared types.
//!
//! The [`ImageBackend`] trait is the whole surface the pipeline needs from a
//! pixel engine: decode, the geometric transforms, colour conversion and
//! encode. Planning never touches pixels; it only calls these.
//!
//! Every transform takes its input image **by value** and hands back a new
//! one. The previous image is gone once the call returns, whether it
//! succeeded or not, so exactly one image is alive per pipeline and nothing
//! leaks on an early `?` return.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::{Angle, Direction, Extend, ImageFormat, Interpolator, Quality};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("{op} failed: {message}")]
    Transform { op: &'static str, message: String },
    #[error("Encode failed: {0}")]
    Encode(String),
}

impl BackendError {
    pub fn transform(op: &'static str, message: impl Into<String>) -> Self {
        BackendError::Transform {
            op,
            message: message.into(),
        }
    }
}

/// Pixel size of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for pixel engines.
pub trait ImageBackend: Sync {
    /// Decoded raster owned by the pipeline.
    type Image;

    /// Decode an in-memory buffer. `shrink_on_load` > 1 asks the decoder for a
    /// reduced image (JPEG only; 2, 4 or 8).
    fn decode(
        &self,
        buf: &[u8],
        format: ImageFormat,
        shrink_on_load: u32,
    ) -> Result<Self::Image, BackendError>;

    /// Read size and EXIF orientation from the header without decoding pixels.
    fn probe(&self, buf: &[u8], format: ImageFormat) -> Result<(Dimensions, u32), BackendError>;

    /// Load and decode a file, sniffing the format from its content.
    fn load_file(&self, path: &Path) -> Result<Self::Image, BackendError>;

    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// EXIF orientation tag of the source, 0 when absent.
    fn exif_orientation(&self, image: &Self::Image) -> u32;

    /// Integral box shrink.
    fn shrink(
        &self,
        image: Self::Image,
        xshrink: u32,
        yshrink: u32,
    ) -> Result<Self::Image, BackendError>;

    /// Uniform scale by `scale` using the given kernel.
    fn affine(
        &self,
        image: Self::Image,
        scale: f64,
        interpolator: Interpolator,
    ) -> Result<Self::Image, BackendError>;

    fn extract_area(
        &self,
        image: Self::Image,
        left: u32,
        top: u32,
        width: u32,
        height: u32,
    ) -> Result<Self::Image, BackendError>;

    /// Place `image` at (`left`, `top`) on a `width` x `height` canvas.
    fn embed(
        &self,
        image: Self::Image,
        left: i64,
        top: i64,
        width: u32,
        height: u32,
        extend: Extend,
    ) -> Result<Self::Image, BackendError>;

    /// Clockwise rotation.
    fn rotate(&self, image: Self::Image, angle: Angle) -> Result<Self::Image, BackendError>;

    fn flip(&self, image: Self::Image, direction: Direction) -> Result<Self::Image, BackendError>;

    /// Convert to 8-bit sRGB, keeping alpha if present.
    fn colourspace_srgb(&self, image: Self::Image) -> Result<Self::Image, BackendError>;

    /// Encode and consume the image.
    fn encode(
        &self,
        image: Self::Image,
        format: ImageFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;
}
