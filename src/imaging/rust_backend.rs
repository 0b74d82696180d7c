//! Pure Rust pixel engine.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate decoders |
//! | JPEG shrink-on-load | `jpeg-decoder` DCT scaling (1/2, 1/4, 1/8) |
//! | EXIF orientation | `kamadak-exif` |
//! | Box shrink | custom integral averaging ([`box_shrink`]) |
//! | Affine scale | `DynamicImage::resize_exact` (bicubic → CatmullRom, bilinear → Triangle, nohalo → Lanczos3) |
//! | Crop / embed | `crop_imm` / `imageops::overlay` onto a filled canvas |
//! | Rotate / mirror | `rotate90/180/270`, `fliph`, `flipv` |
//! | Encode | `JpegEncoder` (quality), `PngEncoder`, `WebPEncoder` (lossless) |
//!
//! Decodes and the two operations that allocate a new size (affine and embed)
//! are bounded by [`PixelLimits`].

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{Angle, Direction, Extend, ImageFormat, Interpolator, Quality};
use super::sniff;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageBuffer, ImageReader, Limits, Pixel, Rgb, RgbImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Upper bounds on any raster the backend produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PixelLimits {
    /// Maximum bytes a single raster may take.
    pub max_alloc: u64,
    /// Maximum width or height in pixels.
    pub max_dimension: u32,
}

impl Default for PixelLimits {
    fn default() -> Self {
        Self {
            max_alloc: 100 * 1024 * 1024,
            max_dimension: 32_768,
        }
    }
}

impl PixelLimits {
    fn to_image_limits(self) -> Limits {
        let mut limits = Limits::default();
        limits.max_alloc = Some(self.max_alloc);
        limits.max_image_width = Some(self.max_dimension);
        limits.max_image_height = Some(self.max_dimension);
        limits
    }

    fn check_output(
        &self,
        op: &'static str,
        width: u32,
        height: u32,
        bytes_per_pixel: u8,
    ) -> Result<(), BackendError> {
        if width > self.max_dimension || height > self.max_dimension {
            return Err(BackendError::transform(
                op,
                format!("{width}x{height} exceeds the {}px limit", self.max_dimension),
            ));
        }
        let bytes = u64::from(width) * u64::from(height) * u64::from(bytes_per_pixel);
        if bytes > self.max_alloc {
            return Err(BackendError::transform(
                op,
                format!("{width}x{height} needs {bytes} bytes, limit is {}", self.max_alloc),
            ));
        }
        Ok(())
    }
}

/// Decoded raster plus the source's EXIF orientation.
#[derive(Debug, Clone)]
pub struct Raster {
    image: DynamicImage,
    orientation: u32,
}

impl Raster {
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    fn map(self, f: impl FnOnce(DynamicImage) -> DynamicImage) -> Self {
        Self {
            image: f(self.image),
            orientation: self.orientation,
        }
    }
}

/// Decode/encode strategy for one container format.
#[derive(Clone, Copy)]
struct Codec {
    format: ImageFormat,
    container: image::ImageFormat,
    decode: fn(&[u8], u32, &PixelLimits) -> Result<DynamicImage, BackendError>,
    encode: fn(&DynamicImage, Quality) -> Result<Vec<u8>, BackendError>,
}

/// Indexed by `ImageFormat` discriminant.
const CODECS: [Codec; 3] = [
    Codec {
        format: ImageFormat::Jpeg,
        container: image::ImageFormat::Jpeg,
        decode: decode_jpeg,
        encode: encode_jpeg,
    },
    Codec {
        format: ImageFormat::Png,
        container: image::ImageFormat::Png,
        decode: decode_png,
        encode: encode_png,
    },
    Codec {
        format: ImageFormat::Webp,
        container: image::ImageFormat::WebP,
        decode: decode_webp,
        encode: encode_webp,
    },
];

fn codec(format: ImageFormat) -> &'static Codec {
    let codec = &CODECS[format as usize];
    debug_assert_eq!(codec.format, format);
    codec
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Clone, Default)]
pub struct RustBackend {
    limits: PixelLimits,
}

impl RustBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: PixelLimits) -> Self {
        Self { limits }
    }
}

fn decode_with(
    buf: &[u8],
    format: image::ImageFormat,
    limits: &PixelLimits,
) -> Result<DynamicImage, BackendError> {
    let mut reader = ImageReader::with_format(Cursor::new(buf), format);
    reader.limits(limits.to_image_limits());
    reader
        .decode()
        .map_err(|e| BackendError::Decode(format!("{format:?}: {e}")))
}

fn decode_png(
    buf: &[u8],
    _shrink_on_load: u32,
    limits: &PixelLimits,
) -> Result<DynamicImage, BackendError> {
    decode_with(buf, image::ImageFormat::Png, limits)
}

fn decode_webp(
    buf: &[u8],
    _shrink_on_load: u32,
    limits: &PixelLimits,
) -> Result<DynamicImage, BackendError> {
    decode_with(buf, image::ImageFormat::WebP, limits)
}

fn decode_jpeg(
    buf: &[u8],
    shrink_on_load: u32,
    limits: &PixelLimits,
) -> Result<DynamicImage, BackendError> {
    if shrink_on_load <= 1 {
        return decode_with(buf, image::ImageFormat::Jpeg, limits);
    }
    match decode_jpeg_scaled(buf, shrink_on_load, limits) {
        Ok(image) => Ok(image),
        Err(err) => {
            debug!("scaled JPEG decode failed: {err}; falling back to full decode + shrink");
            let full = decode_with(buf, image::ImageFormat::Jpeg, limits)?;
            Ok(shrink_dynamic(&full, shrink_on_load, shrink_on_load))
        }
    }
}

/// Decode a JPEG at 1/`shrink_on_load` of its size in the DCT domain.
fn decode_jpeg_scaled(
    buf: &[u8],
    shrink_on_load: u32,
    limits: &PixelLimits,
) -> Result<DynamicImage, BackendError> {
    use jpeg_decoder::PixelFormat;

    let jpeg_err = |e: jpeg_decoder::Error| BackendError::Decode(format!("Jpeg: {e}"));

    let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(buf));
    decoder.set_max_decoding_buffer_size(usize::try_from(limits.max_alloc).unwrap_or(usize::MAX));
    decoder.read_info().map_err(jpeg_err)?;
    let info = decoder
        .info()
        .ok_or_else(|| BackendError::Decode("Jpeg: missing frame header".into()))?;
    if u32::from(info.width) > limits.max_dimension || u32::from(info.height) > limits.max_dimension {
        return Err(BackendError::Decode(format!(
            "Jpeg: {}x{} exceeds the {}px limit",
            info.width, info.height, limits.max_dimension
        )));
    }

    let request_w = u32::from(info.width).div_ceil(shrink_on_load) as u16;
    let request_h = u32::from(info.height).div_ceil(shrink_on_load) as u16;
    decoder.scale(request_w, request_h).map_err(jpeg_err)?;
    let pixels = decoder.decode().map_err(jpeg_err)?;
    let info = decoder
        .info()
        .ok_or_else(|| BackendError::Decode("Jpeg: missing frame header".into()))?;
    let (width, height) = (u32::from(info.width), u32::from(info.height));

    let image = match info.pixel_format {
        PixelFormat::RGB24 => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        PixelFormat::L8 => GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
        PixelFormat::CMYK32 => {
            let mut rgb = Vec::with_capacity(pixels.len() / 4 * 3);
            for chunk in pixels.chunks_exact(4) {
                let k = chunk[3] as f32 / 255.0;
                for &ink in &chunk[..3] {
                    let c = ink as f32 / 255.0 * (1.0 - k) + k;
                    rgb.push(((1.0 - c) * 255.0).round().clamp(0.0, 255.0) as u8);
                }
            }
            RgbImage::from_raw(width, height, rgb).map(DynamicImage::ImageRgb8)
        }
        PixelFormat::L16 => {
            return Err(BackendError::Decode(
                "Jpeg: 16-bit grayscale is not supported by the scaled decoder".into(),
            ));
        }
    };

    image.ok_or_else(|| BackendError::Decode("Jpeg: decoded buffer does not match frame size".into()))
}

/// Read the EXIF orientation tag from an encoded buffer, 0 when absent.
fn read_orientation(buf: &[u8]) -> u32 {
    let Ok(exif) = exif::Reader::new().read_from_container(&mut Cursor::new(buf)) else {
        return 0;
    };
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(0)
}

/// Average `xshrink` x `yshrink` blocks into single pixels.
///
/// Partial blocks at the right and bottom edges are dropped, except that the
/// output is never smaller than 1x1.
pub fn box_shrink<P>(src: &ImageBuffer<P, Vec<u8>>, xshrink: u32, yshrink: u32) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (xshrink, yshrink) = (xshrink.max(1), yshrink.max(1));
    let width = (src.width() / xshrink).max(1);
    let height = (src.height() / yshrink).max(1);
    let mut out = ImageBuffer::<P, Vec<u8>>::new(width, height);
    let mut acc = vec![0u32; P::CHANNEL_COUNT as usize];

    for (x, y, pixel) in out.enumerate_pixels_mut() {
        acc.fill(0);
        let mut count = 0u32;
        for sy in y * yshrink..((y + 1) * yshrink).min(src.height()) {
            for sx in x * xshrink..((x + 1) * xshrink).min(src.width()) {
                for (sum, &channel) in acc.iter_mut().zip(src.get_pixel(sx, sy).channels()) {
                    *sum += channel as u32;
                }
                count += 1;
            }
        }
        let count = count.max(1);
        for (channel, &sum) in pixel.channels_mut().iter_mut().zip(&acc) {
            *channel = ((sum + count / 2) / count) as u8;
        }
    }

    out
}

fn shrink_dynamic(image: &DynamicImage, xshrink: u32, yshrink: u32) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(box_shrink(buf, xshrink, yshrink)),
        DynamicImage::ImageLumaA8(buf) => {
            DynamicImage::ImageLumaA8(box_shrink(buf, xshrink, yshrink))
        }
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(box_shrink(buf, xshrink, yshrink)),
        other if other.color().has_alpha() => {
            DynamicImage::ImageRgba8(box_shrink(&other.to_rgba8(), xshrink, yshrink))
        }
        other => DynamicImage::ImageRgb8(box_shrink(&other.to_rgb8(), xshrink, yshrink)),
    }
}

fn filter_for(interpolator: Interpolator) -> FilterType {
    match interpolator {
        Interpolator::Bicubic => FilterType::CatmullRom,
        Interpolator::Bilinear => FilterType::Triangle,
        Interpolator::Nohalo => FilterType::Lanczos3,
    }
}

fn encode_jpeg(image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut out = Vec::new();
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality.value() as u8))
        .map_err(|e| BackendError::Encode(format!("Jpeg: {e}")))?;
    Ok(out)
}

fn encode_png(image: &DynamicImage, _quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut out = Vec::new();
    image
        .write_with_encoder(PngEncoder::new(&mut out))
        .map_err(|e| BackendError::Encode(format!("Png: {e}")))?;
    Ok(out)
}

fn encode_webp(image: &DynamicImage, _quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut out = Vec::new();
    image
        .write_with_encoder(WebPEncoder::new_lossless(&mut out))
        .map_err(|e| BackendError::Encode(format!("WebP: {e}")))?;
    Ok(out)
}

impl ImageBackend for RustBackend {
    type Image = Raster;

    fn decode(
        &self,
        buf: &[u8],
        format: ImageFormat,
        shrink_on_load: u32,
    ) -> Result<Raster, BackendError> {
        let image = (codec(format).decode)(buf, shrink_on_load, &self.limits)?;
        let orientation = read_orientation(buf);
        debug!(
            "decoded {} {}x{} (shrink-on-load {shrink_on_load}, exif orientation {orientation})",
            format.name(),
            image.width(),
            image.height()
        );
        Ok(Raster { image, orientation })
    }

    fn probe(&self, buf: &[u8], format: ImageFormat) -> Result<(Dimensions, u32), BackendError> {
        let (width, height) = ImageReader::with_format(Cursor::new(buf), codec(format).container)
            .into_dimensions()
            .map_err(|e| BackendError::Decode(format!("{}: {e}", format.name())))?;
        Ok((Dimensions { width, height }, read_orientation(buf)))
    }

    fn load_file(&self, path: &Path) -> Result<Raster, BackendError> {
        let buf = std::fs::read(path)?;
        let format = sniff::classify(&buf).ok_or_else(|| {
            BackendError::Decode(format!("{}: unknown image format", path.display()))
        })?;
        self.decode(&buf, format, 1)
    }

    fn dimensions(&self, raster: &Raster) -> Dimensions {
        Dimensions {
            width: raster.image.width(),
            height: raster.image.height(),
        }
    }

    fn exif_orientation(&self, raster: &Raster) -> u32 {
        raster.orientation
    }

    fn shrink(&self, raster: Raster, xshrink: u32, yshrink: u32) -> Result<Raster, BackendError> {
        if xshrink == 0 || yshrink == 0 {
            return Err(BackendError::transform("shrink", "shrink factors must be >= 1"));
        }
        Ok(raster.map(|image| shrink_dynamic(&image, xshrink, yshrink)))
    }

    fn affine(
        &self,
        raster: Raster,
        scale: f64,
        interpolator: Interpolator,
    ) -> Result<Raster, BackendError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(BackendError::transform("affine", format!("invalid scale {scale}")));
        }
        let width = ((raster.image.width() as f64 * scale).round() as u32).max(1);
        let height = ((raster.image.height() as f64 * scale).round() as u32).max(1);
        self.limits
            .check_output("affine", width, height, raster.image.color().bytes_per_pixel())?;
        let filter = filter_for(interpolator);
        Ok(raster.map(|image| image.resize_exact(width, height, filter)))
    }

    fn extract_area(
        &self,
        raster: Raster,
        left: u32,
        top: u32,
        width: u32,
        height: u32,
    ) -> Result<Raster, BackendError> {
        let (w, h) = (raster.image.width(), raster.image.height());
        if width == 0 || height == 0 || left + width > w || top + height > h {
            return Err(BackendError::transform(
                "extract_area",
                format!("area {width}x{height}+{left}+{top} outside {w}x{h} image"),
            ));
        }
        Ok(raster.map(|image| image.crop_imm(left, top, width, height)))
    }

    fn embed(
        &self,
        raster: Raster,
        left: i64,
        top: i64,
        width: u32,
        height: u32,
        extend: Extend,
    ) -> Result<Raster, BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::transform("embed", "canvas must not be empty"));
        }
        let bytes_per_pixel = if raster.image.color().has_alpha() { 4 } else { 3 };
        self.limits.check_output("embed", width, height, bytes_per_pixel)?;
        let fill = match extend {
            Extend::Black => 0,
            Extend::White => 255,
        };
        Ok(raster.map(|image| {
            if image.color().has_alpha() {
                let mut canvas = RgbaImage::from_pixel(width, height, Rgba([fill; 4]));
                imageops::overlay(&mut canvas, &image.to_rgba8(), left, top);
                DynamicImage::ImageRgba8(canvas)
            } else {
                let mut canvas = RgbImage::from_pixel(width, height, Rgb([fill; 3]));
                imageops::overlay(&mut canvas, &image.to_rgb8(), left, top);
                DynamicImage::ImageRgb8(canvas)
            }
        }))
    }

    fn rotate(&self, raster: Raster, angle: Angle) -> Result<Raster, BackendError> {
        Ok(raster.map(|image| match angle {
            Angle::D0 => image,
            Angle::D90 => image.rotate90(),
            Angle::D180 => image.rotate180(),
            Angle::D270 => image.rotate270(),
        }))
    }

    fn flip(&self, raster: Raster, direction: Direction) -> Result<Raster, BackendError> {
        Ok(raster.map(|image| match direction {
            Direction::Horizontal => image.fliph(),
            Direction::Vertical => image.flipv(),
        }))
    }

    fn colourspace_srgb(&self, raster: Raster) -> Result<Raster, BackendError> {
        Ok(raster.map(|image| match image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
            other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        }))
    }

    fn encode(
        &self,
        raster: Raster,
        format: ImageFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        let bytes = (codec(format).encode)(&raster.image, quality)?;
        debug!(
            "encoded {}x{} as {} ({} bytes, quality {})",
            raster.image.width(),
            raster.image.height(),
            format.name(),
            bytes.len(),
            quality.value()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{jpeg_bytes, orient6_jpeg, png_bytes, rgba_png_bytes};

    fn decode(buf: &[u8], format: ImageFormat) -> Raster {
        RustBackend::new().decode(buf, format, 1).unwrap()
    }

    #[test]
    fn decode_synthetic_jpeg() {
        let raster = decode(&jpeg_bytes(200, 150), ImageFormat::Jpeg);
        let dims = RustBackend::new().dimensions(&raster);
        assert_eq!(dims.as_tuple(), (200, 150));
    }

    #[test]
    fn codec_table_matches_format_order() {
        for format in [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::Webp] {
            assert_eq!(codec(format).format, format);
        }
    }

    #[test]
    fn probe_reads_header_only() {
        let backend = RustBackend::new();
        let (dims, orientation) = backend.probe(&orient6_jpeg(), ImageFormat::Jpeg).unwrap();
        assert_eq!(dims.as_tuple(), (2, 1));
        assert_eq!(orientation, 6);

        let (dims, _) = backend.probe(&png_bytes(30, 20), ImageFormat::Png).unwrap();
        assert_eq!(dims.as_tuple(), (30, 20));
    }

    #[test]
    fn decode_garbage_errors() {
        let backend = RustBackend::new();
        let result = backend.decode(&[0xFF, 0xD8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0], ImageFormat::Jpeg, 1);
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn jpeg_shrink_on_load_rounds_up() {
        let backend = RustBackend::new();
        for (factor, expected) in [(2, (401, 300)), (4, (201, 150)), (8, (101, 75))] {
            let raster = backend.decode(&jpeg_bytes(801, 600), ImageFormat::Jpeg, factor).unwrap();
            assert_eq!(backend.dimensions(&raster).as_tuple(), expected, "1/{factor}");
        }
    }

    #[test]
    fn decode_limits_reject_oversized_images() {
        let backend = RustBackend::with_limits(PixelLimits {
            max_dimension: 100,
            ..PixelLimits::default()
        });
        assert!(backend.decode(&png_bytes(200, 50), ImageFormat::Png, 1).is_err());
        assert!(backend.decode(&jpeg_bytes(200, 50), ImageFormat::Jpeg, 2).is_err());
    }

    #[test]
    fn affine_output_respects_dimension_limit() {
        let backend = RustBackend::with_limits(PixelLimits {
            max_dimension: 100,
            ..PixelLimits::default()
        });
        let raster = decode(&png_bytes(50, 50), ImageFormat::Png);
        let err = backend.affine(raster, 20.0, Interpolator::Bicubic).unwrap_err();
        assert_eq!(err.to_string(), "affine failed: 1000x1000 exceeds the 100px limit");
    }

    #[test]
    fn embed_output_respects_alloc_limit() {
        let backend = RustBackend::with_limits(PixelLimits {
            max_alloc: 10_000,
            ..PixelLimits::default()
        });
        let raster = decode(&png_bytes(10, 10), ImageFormat::Png);
        let err = backend.embed(raster, 0, 0, 100, 100, Extend::Black).unwrap_err();
        assert!(err.to_string().starts_with("embed failed: 100x100 needs 30000 bytes"));

        let raster = decode(&png_bytes(10, 10), ImageFormat::Png);
        assert!(backend.embed(raster, 0, 0, 50, 50, Extend::Black).is_ok());
    }

    #[test]
    fn reads_exif_orientation() {
        let backend = RustBackend::new();
        let raster = decode(&orient6_jpeg(), ImageFormat::Jpeg);
        assert_eq!(backend.exif_orientation(&raster), 6);
    }

    #[test]
    fn missing_exif_is_zero() {
        let backend = RustBackend::new();
        let raster = decode(&jpeg_bytes(16, 16), ImageFormat::Jpeg);
        assert_eq!(backend.exif_orientation(&raster), 0);
    }

    #[test]
    fn box_shrink_averages_blocks() {
        let src = GrayImage::from_raw(4, 2, vec![0, 100, 10, 10, 200, 100, 10, 10]).unwrap();
        let out = box_shrink(&src, 2, 2);
        assert_eq!(out.dimensions(), (2, 1));
        assert_eq!(out.as_raw(), &vec![100, 10]);
    }

    #[test]
    fn box_shrink_drops_partial_blocks() {
        let src = GrayImage::new(5, 3);
        assert_eq!(box_shrink(&src, 2, 2).dimensions(), (2, 1));
        assert_eq!(box_shrink(&src, 8, 8).dimensions(), (1, 1));
    }

    #[test]
    fn affine_scales_and_rounds() {
        let backend = RustBackend::new();
        let raster = decode(&png_bytes(500, 375), ImageFormat::Png);
        let raster = backend.affine(raster, 0.8, Interpolator::Bicubic).unwrap();
        assert_eq!(backend.dimensions(&raster).as_tuple(), (400, 300));
    }

    #[test]
    fn affine_rejects_zero_scale() {
        let backend = RustBackend::new();
        let raster = decode(&png_bytes(10, 10), ImageFormat::Png);
        assert!(backend.affine(raster, 0.0, Interpolator::Bilinear).is_err());
    }

    #[test]
    fn extract_area_out_of_bounds_errors() {
        let backend = RustBackend::new();
        let raster = decode(&png_bytes(100, 100), ImageFormat::Png);
        let err = backend.extract_area(raster, 50, 0, 60, 10).unwrap_err();
        assert!(err.to_string().starts_with("extract_area failed"));
    }

    #[test]
    fn embed_fills_with_extend_colour() {
        let backend = RustBackend::new();
        let raster = decode(&png_bytes(10, 10), ImageFormat::Png);
        let raster = backend.embed(raster, 5, 0, 20, 10, Extend::White).unwrap();
        let image = raster.image().to_rgb8();
        assert_eq!(image.dimensions(), (20, 10));
        assert_eq!(image.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(image.get_pixel(19, 9), &Rgb([255, 255, 255]));
    }

    #[test]
    fn embed_black_keeps_alpha_transparent() {
        let backend = RustBackend::new();
        let raster = decode(&rgba_png_bytes(4, 4), ImageFormat::Png);
        let raster = backend.embed(raster, 2, 2, 8, 8, Extend::Black).unwrap();
        let image = raster.image().to_rgba8();
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn rotate_and_flip_geometry() {
        let backend = RustBackend::new();
        let raster = decode(&png_bytes(40, 30), ImageFormat::Png);
        let raster = backend.flip(raster, Direction::Horizontal).unwrap();
        let raster = backend.rotate(raster, Angle::D270).unwrap();
        assert_eq!(backend.dimensions(&raster).as_tuple(), (30, 40));
    }

    #[test]
    fn colourspace_keeps_alpha() {
        let backend = RustBackend::new();
        let raster = decode(&rgba_png_bytes(4, 4), ImageFormat::Png);
        let raster = backend.colourspace_srgb(raster).unwrap();
        assert!(matches!(raster.image(), DynamicImage::ImageRgba8(_)));
    }

    #[test]
    fn encodes_every_format() {
        let backend = RustBackend::new();
        for format in [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::Webp] {
            let raster = decode(&rgba_png_bytes(24, 16), ImageFormat::Png);
            let bytes = backend.encode(raster, format, Quality::new(80)).unwrap();
            assert_eq!(sniff::classify(&bytes), Some(format));

            let back = decode(&bytes, format);
            assert_eq!(backend.dimensions(&back).as_tuple(), (24, 16));
        }
    }

    #[test]
    fn load_file_sniffs_content() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("no-extension");
        std::fs::write(&path, png_bytes(12, 8)).unwrap();

        let backend = RustBackend::new();
        let raster = backend.load_file(&path).unwrap();
        assert_eq!(backend.dimensions(&raster).as_tuple(), (12, 8));
    }

    #[test]
    fn load_file_nonexistent_errors() {
        let backend = RustBackend::new();
        let result = backend.load_file(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }
}
