//! Request options for resize and auto-rotate.
//!
//! These types describe *what* the caller wants, not *how* to do it. They are
//! read by the planner in [`calculations`](super::calculations) and by the
//! pipeline in [`operations`](super::operations); neither ever mutates them.
//! Everything the planner derives lives in a separate
//! [`PlanResult`](super::calculations::PlanResult).
//!
//! ## Types
//!
//! - [`Options`]: full request: target box, crop/embed/enlarge policy, gravity, output format.
//! - [`Quality`]: encoder quality (1–100, default 100). `0` means "unset".
//! - [`ImageFormat`]: JPEG, PNG or WebP, both as detected input and as output.
//! - [`Angle`]: right-angle rotation; arbitrary degrees go through [`Angle::from_degrees`].

use serde::{Deserialize, Serialize};

/// Encoded image container handled by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    pub fn name(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
        }
    }
}

/// Encoder quality (1-100).
///
/// A raw value of `0` is the "unset" marker and resolves to the default of 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        if value == 0 {
            Self::default()
        } else {
            Self(value.clamp(1, 100))
        }
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

impl From<u32> for Quality {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for u32 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Resampling kernel for the residual affine scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolator {
    #[default]
    Bicubic,
    Bilinear,
    Nohalo,
}

/// Fill used for the border when embedding into a larger canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extend {
    #[default]
    Black,
    White,
}

/// Which part of an oversized image survives a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gravity {
    #[default]
    Centre,
    North,
    East,
    South,
    West,
    /// Uses [`Options::left_pos`] / [`Options::top_pos`].
    Custom,
}

/// Clockwise rotation in right-angle steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub enum Angle {
    #[default]
    D0,
    D90,
    D180,
    D270,
}

impl Angle {
    /// Round `degrees` down to a multiple of 90 and cap at 270.
    ///
    /// Anything below 90 (negative values included) is no rotation.
    pub fn from_degrees(degrees: i64) -> Self {
        if degrees < 90 {
            return Angle::D0;
        }
        match (degrees - degrees % 90).min(270) {
            90 => Angle::D90,
            180 => Angle::D180,
            _ => Angle::D270,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Angle::D0 => 0,
            Angle::D90 => 90,
            Angle::D180 => 180,
            Angle::D270 => 270,
        }
    }

    /// True when the rotation swaps width and height.
    pub fn is_transposing(self) -> bool {
        matches!(self, Angle::D90 | Angle::D270)
    }
}

impl TryFrom<i64> for Angle {
    type Error = String;

    fn try_from(degrees: i64) -> Result<Self, Self::Error> {
        if degrees < 0 {
            return Err(format!("rotation must not be negative, got {degrees}"));
        }
        Ok(Angle::from_degrees(degrees))
    }
}

impl From<Angle> for u32 {
    fn from(angle: Angle) -> Self {
        angle.degrees()
    }
}

/// Mirror axis. `Horizontal` is a left-right mirror (flip), `Vertical` a
/// top-bottom mirror (flop).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
}

/// One resize or auto-rotate request.
///
/// `width`/`height` of 0 leave that side unconstrained; the planner derives it
/// from the aspect ratio. With both at 0 the geometry is left untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    pub width: u32,
    pub height: u32,
    /// Fill the box and cut the overflow instead of fitting inside it.
    pub crop: bool,
    /// Allow the output to be larger than the input.
    pub enlarge: bool,
    /// Pad a fitted image out to the full box.
    pub embed: bool,
    pub extend: Extend,
    pub interpolator: Interpolator,
    pub gravity: Gravity,
    /// Custom gravity, as a fraction of the width (0.0–1.0).
    pub left_pos: f32,
    /// Custom gravity, as a fraction of the height (0.0–1.0).
    pub top_pos: f32,
    pub quality: Quality,
    /// Output format.
    pub savetype: ImageFormat,
    /// Never consult the EXIF orientation tag.
    pub no_auto_rotate: bool,
    pub rotate: Angle,
    pub flip: bool,
    pub flop: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            crop: false,
            enlarge: false,
            embed: false,
            extend: Extend::default(),
            interpolator: Interpolator::default(),
            gravity: Gravity::default(),
            left_pos: 0.0,
            top_pos: 0.0,
            quality: Quality::default(),
            savetype: ImageFormat::default(),
            no_auto_rotate: false,
            rotate: Angle::default(),
            flip: false,
            flop: false,
        }
    }
}
