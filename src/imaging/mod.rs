//! Image processing in pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Sniff** | magic bytes ([`classify`]) |
//! | **Decode** | `image` + `jpeg-decoder` (DCT shrink-on-load) |
//! | **EXIF orientation** | `kamadak-exif` |
//! | **Shrink / affine / crop / embed** | box average, `resize_exact`, `crop_imm`, `overlay` |
//! | **Encode** | JPEG (quality), PNG, WebP (lossless) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for the resize plan and crop geometry (unit testable)
//! - **Orientation**: EXIF table and composition with caller intent
//! - **Parameters**: The request ([`Options`]) and its value types
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`resize`] and [`auto_rotate`], combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod orientation;
mod params;
pub mod rust_backend;
mod sniff;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    CanvasOp, PlanResult, needs_affine, plan, plan_canvas, residual_after_shrink, resolve_crop,
    shrink_on_load_factor,
};
pub use operations::{AutoRotated, RequestPlan, ResizeError, auto_rotate, plan_buffer, resize};
pub use orientation::{Orientation, resolve_orientation};
pub use params::{
    Angle, Direction, Extend, Gravity, ImageFormat, Interpolator, Options, Quality,
};
pub use rust_backend::{PixelLimits, RustBackend};
pub use sniff::classify;
