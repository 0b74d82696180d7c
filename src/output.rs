//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Resize
//!
//! ```text
//! photo.jpg → thumb.jpg
//!     Output: jpeg, 48213 bytes
//! ```
//!
//! ## Auto-rotate
//!
//! ```text
//! sideways.jpg → upright.jpg
//!     Output: jpeg, 102400 bytes
//! ```
//!
//! or, when the image is already upright, the single line `unchanged`.
//!
//! ## Plan
//!
//! ```text
//! jpeg 4000x3000 (EXIF 6)
//!     Orientation: rotate 90°, no mirror
//!     Target: 300x400
//!     Shrink-on-load: 8
//!     Shrink: 1
//!     Residual: 0.8000
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::imaging::{AutoRotated, Direction, ImageFormat, RequestPlan};
use std::path::Path;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn transfer_line(input: &Path, output: &Path) -> String {
    format!("{} → {}", input.display(), output.display())
}

fn output_line(format: ImageFormat, bytes: usize) -> String {
    format!("{}Output: {}, {} bytes", indent(1), format.name(), bytes)
}

// ============================================================================
// Resize / auto-rotate
// ============================================================================

pub fn format_resize_output(
    input: &Path,
    output: &Path,
    format: ImageFormat,
    bytes: usize,
) -> Vec<String> {
    vec![transfer_line(input, output), output_line(format, bytes)]
}

pub fn print_resize_output(input: &Path, output: &Path, format: ImageFormat, bytes: usize) {
    for line in format_resize_output(input, output, format, bytes) {
        println!("{}", line);
    }
}

pub fn format_auto_rotate_output(
    input: &Path,
    output: &Path,
    format: ImageFormat,
    outcome: &AutoRotated,
) -> Vec<String> {
    match outcome {
        AutoRotated::Unchanged => vec!["unchanged".to_string()],
        AutoRotated::Rotated(bytes) => format_resize_output(input, output, format, bytes.len()),
    }
}

pub fn print_auto_rotate_output(
    input: &Path,
    output: &Path,
    format: ImageFormat,
    outcome: &AutoRotated,
) {
    for line in format_auto_rotate_output(input, output, format, outcome) {
        println!("{}", line);
    }
}

// ============================================================================
// Plan
// ============================================================================

pub fn format_plan_output(request: &RequestPlan) -> Vec<String> {
    let mut lines = Vec::new();
    let exif = match request.exif_orientation {
        0 => String::new(),
        tag => format!(" (EXIF {tag})"),
    };
    lines.push(format!(
        "{} {}x{}{}",
        request.format.name(),
        request.source.width,
        request.source.height,
        exif
    ));

    let mirror = match request.orientation.mirror() {
        Some(Direction::Horizontal) => "flip",
        Some(Direction::Vertical) => "flop",
        None => "no mirror",
    };
    lines.push(format!(
        "{}Orientation: rotate {}°, {}",
        indent(1),
        request.orientation.angle.degrees(),
        mirror
    ));

    let plan = &request.plan;
    lines.push(format!("{}Target: {}x{}", indent(1), plan.width, plan.height));
    if plan.shrink_on_load > 1 {
        lines.push(format!("{}Shrink-on-load: {}", indent(1), plan.shrink_on_load));
    }
    lines.push(format!("{}Shrink: {}", indent(1), plan.shrink));
    lines.push(format!("{}Residual: {:.4}", indent(1), plan.residual));
    lines
}

pub fn print_plan_output(request: &RequestPlan) {
    for line in format_plan_output(request) {
        println!("{}", line);
    }
}

/// Machine-readable form of [`format_plan_output`].
pub fn plan_json(request: &RequestPlan) -> serde_json::Value {
    serde_json::json!({
        "format": request.format,
        "source": {
            "width": request.source.width,
            "height": request.source.height,
        },
        "exif_orientation": request.exif_orientation,
        "orientation": {
            "angle": request.orientation.angle,
            "flip": request.orientation.flip,
            "flop": request.orientation.flop,
        },
        "plan": request.plan,
    })
}
