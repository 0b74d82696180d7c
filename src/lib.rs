//! # vipsize
//!
//! Resize, crop, embed and EXIF-rotate JPEG, PNG and WebP images in memory.
//!
//! # Architecture: Plan, Then Execute
//!
//! Every request goes through two halves:
//!
//! ```text
//! 1. Plan      header + Options  →  PlanResult   (pure geometry, no pixels)
//! 2. Execute   PlanResult        →  encoded bytes (decode, transform, encode)
//! ```
//!
//! The planner never touches pixels and the executor never makes geometric
//! decisions of its own. Reasons:
//!
//! - **Testability**: the whole decision table (target derivation, shrink
//!   factors, crop offsets, EXIF handling) is unit tested without an image.
//! - **Swappable engines**: execution goes through the [`imaging::ImageBackend`]
//!   trait, so a recording mock drives the same pipeline in tests.
//! - **Inspectability**: `vipsize plan` prints what would happen, cheaply.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Sniffer, planner, orientation resolver, backend trait + pure-Rust backend, pipeline |
//! | [`engine`] | Process-wide initialize/shutdown flag and the [`engine::Engine`] request context |
//! | [`config`] | `vipsize.toml` loading, validation, merging onto stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Owned Image Handles
//!
//! Each backend transform consumes its input image and returns a new one. The
//! borrow checker guarantees a pipeline holds exactly one live image, and an
//! early `?` return drops it. There is no reference counting to get wrong.
//!
//! ## Shrink-on-Load
//!
//! Large JPEGs are decoded directly at 1/2, 1/4 or 1/8 scale in the DCT domain
//! (`jpeg-decoder`), so a 4000x3000 photo headed for a 400px thumbnail is
//! resampled from a 500x375 decode. The reduced size is rounded up, so the
//! residual scale is measured on the image actually decoded. PNG and WebP are
//! always decoded in full.
//!
//! ## Mirror Order
//!
//! An EXIF flip is applied before the clockwise rotation. With that order the
//! eight EXIF orientations map onto a small table
//! ([`imaging::resolve_orientation`]), including the transposed cases 5 and 7.
//! A flip or flop the caller asks for is applied after the rotation.
//!
//! # Example
//!
//! ```no_run
//! use vipsize::engine::{Engine, EngineSettings};
//! use vipsize::imaging::Options;
//!
//! let engine = Engine::new(EngineSettings::default());
//! let input = std::fs::read("photo.jpg").unwrap();
//! let opts = Options { width: 400, ..Options::default() };
//! let thumb = engine.resize(&input, &opts).unwrap();
//! std::fs::write("thumb.jpg", thumb).unwrap();
//! ```

pub mod config;
pub mod engine;
pub mod imaging;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
