//! Pure geometry for the resize pipeline.
//!
//! All functions here are pure and testable without any I/O or images. The
//! pipeline in [`operations`](super::operations) calls them in this order:
//!
//! 1. [`plan`]: target box, integral shrink, JPEG shrink-on-load, residual scale
//! 2. [`residual_after_shrink`]: re-derives the residual from the real shrunk size
//! 3. [`needs_affine`]: whether the residual scale is worth a resample
//! 4. [`plan_canvas`]: crop (via [`resolve_crop`]) or embed to reach the target box

use super::params::{Extend, Gravity, ImageFormat, Options};
use serde::Serialize;

/// Geometry derived from the input size and the request.
///
/// `residual` is the scale left over after the integral shrink; `0.0` means the
/// enlarge guard kicked in and no resample should happen at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanResult {
    /// Remaining input-to-target ratio after shrink-on-load.
    pub factor: f64,
    /// Integral box-shrink factor (>= 1).
    pub shrink: u32,
    /// Decoder-side reduction: 1, 2, 4 or 8. Only ever > 1 for JPEG input.
    pub shrink_on_load: u32,
    pub residual: f64,
    /// Final target width.
    pub width: u32,
    /// Final target height.
    pub height: u32,
}

impl PlanResult {
    fn identity(width: u32, height: u32) -> Self {
        Self {
            factor: 1.0,
            shrink: 1,
            shrink_on_load: 1,
            residual: 0.0,
            width,
            height,
        }
    }
}

/// Compute the resize plan for an image of `in_width` x `in_height`.
///
/// # Arguments
/// * `in_width`, `in_height` - Decoded (and orientation-corrected) source size
/// * `source` - Detected input format; only JPEG supports shrink-on-load
/// * `opts` - The request
///
/// # Examples
/// ```
/// # use vipsize::imaging::{plan, ImageFormat, Options};
/// // 4000x3000 JPEG to 400 wide: decode at 1/8, then scale 500x375 by 0.8
/// let p = plan(4000, 3000, ImageFormat::Jpeg, &Options { width: 400, ..Options::default() });
/// assert_eq!((p.width, p.height), (400, 300));
/// assert_eq!(p.shrink_on_load, 8);
/// assert_eq!(p.shrink, 1);
/// assert!((p.residual - 0.8).abs() < 1e-9);
/// ```
pub fn plan(in_width: u32, in_height: u32, source: ImageFormat, opts: &Options) -> PlanResult {
    if in_width == 0 || in_height == 0 {
        return PlanResult::identity(in_width, in_height);
    }

    let in_w = in_width as f64;
    let in_h = in_height as f64;

    let (mut factor, width, height) = match (opts.width, opts.height) {
        (w, h) if w > 0 && h > 0 => {
            let xf = in_w / w as f64;
            let yf = in_h / h as f64;
            let f = if opts.crop { xf.min(yf) } else { xf.max(yf) };
            (f, w, h)
        }
        (w, _) if w > 0 => {
            let f = in_w / w as f64;
            (f, w, derived_side(in_h, f))
        }
        (_, h) if h > 0 => {
            let f = in_h / h as f64;
            (f, derived_side(in_w, f), h)
        }
        _ => (1.0, in_width, in_height),
    };

    let mut shrink = integral_shrink(factor);
    let mut residual = shrink as f64 / factor;

    // Never upscale when the whole image already fits inside the box
    if !opts.enlarge && in_width < width && in_height < height {
        return PlanResult::identity(in_width, in_height);
    }

    let shrink_on_load = if source == ImageFormat::Jpeg {
        shrink_on_load_factor(shrink)
    } else {
        1
    };

    if shrink_on_load > 1 {
        factor = (factor / shrink_on_load as f64).max(1.0);
        shrink = integral_shrink(factor);
        residual = shrink as f64 / factor;
    }

    PlanResult {
        factor,
        shrink,
        shrink_on_load,
        residual,
        width,
        height,
    }
}

fn integral_shrink(factor: f64) -> u32 {
    factor.floor().max(1.0) as u32
}

/// The side left unconstrained by the caller, kept at least one pixel.
fn derived_side(in_side: f64, factor: f64) -> u32 {
    ((in_side / factor).floor() as u32).max(1)
}

/// Largest decoder reduction (8, 4 or 2) not exceeding `shrink`; 1 if none applies.
pub fn shrink_on_load_factor(shrink: u32) -> u32 {
    match shrink {
        s if s >= 8 => 8,
        s if s >= 4 => 4,
        s if s >= 2 => 2,
        _ => 1,
    }
}

/// Residual scale measured from the actual post-shrink size.
///
/// Integral shrinking rounds, so the theoretical residual from [`plan`] drifts.
/// Cropping needs the image to cover the box (larger axis ratio); fitting
/// needs it to stay inside (smaller axis ratio).
pub fn residual_after_shrink(shrunk: (u32, u32), target: (u32, u32), crop: bool) -> f64 {
    let rx = target.0 as f64 / shrunk.0.max(1) as f64;
    let ry = target.1 as f64 / shrunk.1.max(1) as f64;
    if crop { rx.max(ry) } else { rx.min(ry) }
}

/// Whether a residual scale calls for an affine resample.
pub fn needs_affine(residual: f64) -> bool {
    residual != 0.0 && residual != 1.0
}

/// Final canvas adjustment after the affine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CanvasOp {
    /// Already the right size, or neither crop nor embed requested.
    None,
    Crop {
        left: u32,
        top: u32,
        width: u32,
        height: u32,
    },
    /// Place the image at (`left`, `top`) on a `width` x `height` canvas.
    /// Offsets are negative when the image overhangs the canvas.
    Embed {
        left: i64,
        top: i64,
        width: u32,
        height: u32,
        extend: Extend,
    },
}

/// Decide how to get from the affined size to the planned target box.
pub fn plan_canvas(affined: (u32, u32), plan: &PlanResult, opts: &Options) -> CanvasOp {
    let (aw, ah) = affined;
    if aw == plan.width && ah == plan.height {
        return CanvasOp::None;
    }

    if opts.crop {
        let (left, top) = resolve_crop(
            aw,
            ah,
            plan.width,
            plan.height,
            opts.left_pos,
            opts.top_pos,
            opts.gravity,
        );
        CanvasOp::Crop {
            left,
            top,
            width: plan.width.min(aw),
            height: plan.height.min(ah),
        }
    } else if opts.embed {
        CanvasOp::Embed {
            left: (plan.width as i64 - aw as i64) / 2,
            top: (plan.height as i64 - ah as i64) / 2,
            width: plan.width,
            height: plan.height,
            extend: opts.extend,
        }
    } else {
        CanvasOp::None
    }
}

/// Crop origin for cutting `out_w` x `out_h` out of `in_w` x `in_h`.
///
/// `left_frac`/`top_frac` are only read for [`Gravity::Custom`]. The result is
/// always clamped to `[0, in - out]` (or 0 when the crop is larger than the
/// source on that axis).
pub fn resolve_crop(
    in_w: u32,
    in_h: u32,
    out_w: u32,
    out_h: u32,
    left_frac: f32,
    top_frac: f32,
    gravity: Gravity,
) -> (u32, u32) {
    let (iw, ih, ow, oh) = (in_w as i64, in_h as i64, out_w as i64, out_h as i64);
    let centre_x = (iw - ow + 1) / 2;
    let centre_y = (ih - oh + 1) / 2;

    let (left, top) = match gravity {
        Gravity::North => (centre_x, 0),
        Gravity::East => (iw - ow, centre_y),
        Gravity::South => (centre_x, ih - oh),
        Gravity::West => (0, centre_y),
        Gravity::Custom => (
            custom_offset(in_w, out_w, left_frac),
            custom_offset(in_h, out_h, top_frac),
        ),
        Gravity::Centre => (centre_x, centre_y),
    };

    (clamp_offset(left, iw, ow), clamp_offset(top, ih, oh))
}

fn custom_offset(in_side: u32, out_side: u32, frac: f32) -> i64 {
    let pos = in_side as f32 * frac;
    if pos + out_side as f32 > in_side as f32 {
        in_side as i64 - out_side as i64
    } else {
        pos as i64
    }
}

fn clamp_offset(offset: i64, in_side: i64, out_side: i64) -> u32 {
    offset.clamp(0, (in_side - out_side).max(0)) as u32
}
