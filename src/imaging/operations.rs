//! High-level image operations.
//!
//! These functions combine calculations with backend execution: sniff the
//! buffer, ask the planner what to do, then drive the backend one transform at
//! a time. Each step consumes the previous image, so an error at any point
//! drops everything that was alive.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{CanvasOp, PlanResult, needs_affine, plan, plan_canvas, residual_after_shrink};
use super::orientation::Orientation;
use super::params::{Angle, Direction, ImageFormat, Options};
use super::sniff::classify;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("unknown image format")]
    UnknownFormat,
    #[error("engine is not initialized")]
    NotInitialized,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, ResizeError>;

/// Outcome of [`auto_rotate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoRotated {
    /// The image needs no correction; nothing was encoded.
    Unchanged,
    /// Re-encoded, upright image.
    Rotated(Vec<u8>),
}

/// Everything the pipeline would decide for a buffer, without touching pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestPlan {
    pub format: ImageFormat,
    /// Stored size, before orientation.
    pub source: Dimensions,
    pub exif_orientation: u32,
    pub orientation: Orientation,
    pub plan: PlanResult,
}

/// Plan a request from the image header alone.
pub fn plan_buffer(backend: &impl ImageBackend, buf: &[u8], opts: &Options) -> Result<RequestPlan> {
    let format = classify(buf).ok_or(ResizeError::UnknownFormat)?;
    let (source, exif_orientation) = backend.probe(buf, format)?;
    let orientation = Orientation::compose(exif_orientation, opts);
    let (width, height) = orientation.oriented_size(source.width, source.height);

    Ok(RequestPlan {
        format,
        source,
        exif_orientation,
        orientation,
        plan: plan(width, height, format, opts),
    })
}

/// Mirror and rotate in the order the orientation asks for, skipping no-ops.
fn apply_orientation<B: ImageBackend>(
    backend: &B,
    image: B::Image,
    orientation: &Orientation,
) -> std::result::Result<B::Image, BackendError> {
    let mut image = image;
    let mirror = orientation.mirror();
    if orientation.mirror_first {
        image = apply_mirror(backend, image, mirror)?;
    }
    if orientation.angle != Angle::D0 {
        debug!("rotate {}°", orientation.angle.degrees());
        image = backend.rotate(image, orientation.angle)?;
    }
    if !orientation.mirror_first {
        image = apply_mirror(backend, image, mirror)?;
    }
    Ok(image)
}

fn apply_mirror<B: ImageBackend>(
    backend: &B,
    image: B::Image,
    mirror: Option<Direction>,
) -> std::result::Result<B::Image, BackendError> {
    match mirror {
        Some(direction) => {
            debug!("mirror {direction:?}");
            backend.flip(image, direction)
        }
        None => Ok(image),
    }
}

/// Resize and re-encode an image buffer.
///
/// The steps, in order:
/// sniff → decode → orientation decision → [`plan`] → optional shrink-on-load
/// re-decode → mirror/rotate → box shrink → affine → crop or embed → sRGB →
/// encode.
pub fn resize(backend: &impl ImageBackend, buf: &[u8], opts: &Options) -> Result<Vec<u8>> {
    let format = classify(buf).ok_or(ResizeError::UnknownFormat)?;

    let mut image = backend.decode(buf, format, 1)?;
    let stored = backend.dimensions(&image);
    let orientation = Orientation::compose(backend.exif_orientation(&image), opts);
    let (in_width, in_height) = orientation.oriented_size(stored.width, stored.height);
    debug!(
        "{} input {}x{} (oriented {in_width}x{in_height}), orientation {:?}",
        format.name(),
        stored.width,
        stored.height,
        orientation
    );

    let plan = plan(in_width, in_height, format, opts);
    debug!(
        "plan: factor {:.4}, shrink {}, shrink-on-load {}, residual {:.4}, target {}x{}",
        plan.factor, plan.shrink, plan.shrink_on_load, plan.residual, plan.width, plan.height
    );

    if plan.shrink_on_load > 1 {
        // Release the full-size decode before asking for the reduced one.
        drop(image);
        image = backend.decode(buf, format, plan.shrink_on_load)?;
    }

    image = apply_orientation(backend, image, &orientation)?;

    if plan.shrink > 1 {
        image = backend.shrink(image, plan.shrink, plan.shrink)?;
    }

    // The decoder rounds scaled sizes up and box shrink rounds down, so the
    // residual comes from what is actually in hand.
    let mut residual = plan.residual;
    if plan.shrink > 1 || plan.shrink_on_load > 1 {
        let shrunk = backend.dimensions(&image);
        residual = residual_after_shrink(shrunk.as_tuple(), (plan.width, plan.height), opts.crop);
        debug!(
            "shrunk to {}x{}, residual {residual:.4}",
            shrunk.width, shrunk.height
        );
    }

    if needs_affine(residual) {
        image = backend.affine(image, residual, opts.interpolator)?;
        debug!("affine {residual:.4} → {:?}", backend.dimensions(&image));
    }

    let affined = backend.dimensions(&image).as_tuple();
    match plan_canvas(affined, &plan, opts) {
        CanvasOp::None => {}
        CanvasOp::Crop {
            left,
            top,
            width,
            height,
        } => {
            debug!("crop {width}x{height}+{left}+{top}");
            image = backend.extract_area(image, left, top, width, height)?;
        }
        CanvasOp::Embed {
            left,
            top,
            width,
            height,
            extend,
        } => {
            debug!("embed at ({left}, {top}) on {width}x{height}, extend {extend:?}");
            image = backend.embed(image, left, top, width, height, extend)?;
        }
    }

    image = backend.colourspace_srgb(image)?;
    let encoded = backend.encode(image, opts.savetype, opts.quality)?;
    Ok(encoded)
}

/// Apply a file's EXIF orientation and re-encode it.
///
/// Only the EXIF tag is consulted; the caller's rotate/flip/flop are not.
/// `opts.savetype` and `opts.quality` pick the output encoding.
pub fn auto_rotate(backend: &impl ImageBackend, path: &Path, opts: &Options) -> Result<AutoRotated> {
    let image = backend.load_file(path)?;
    let orientation = Orientation::from_exif(backend.exif_orientation(&image));
    if orientation.is_identity() {
        debug!("{}: already upright", path.display());
        return Ok(AutoRotated::Unchanged);
    }

    debug!("{}: applying {:?}", path.display(), orientation);
    let image = apply_orientation(backend, image, &orientation)?;
    let image = backend.colourspace_srgb(image)?;
    let encoded = backend.encode(image, opts.savetype, opts.quality)?;
    Ok(AutoRotated::Rotated(encoded))
}
