//! `captacity` — caption layout and timing synthesis for rendering timed captions onto video.
//!
//! This crate provides:
//! - Word-level timing synthesis for coarse transcript segments
//! - Arabic-script shaping and prefix-token merging
//! - Greedy line wrapping against real glyph metrics, with bounded memoisation
//! - A scheduler that turns segments into timed, positioned render instructions
//! - Subtitle artifact encoders (JSON, SRT)
//!
//! Transcription, decoding, rasterisation of the final frames and encoding are left to
//! external collaborators; this crate consumes their outputs and produces inputs for them.

mod error;
pub use error::{Error, Result};

// High-level API (most consumers should start here).
pub mod opts;
pub mod scheduler;

// Segment data structures and timing.
pub mod segments;
pub mod timing;

// Text shaping, measurement and wrapping.
pub mod font;
pub mod metrics;
pub mod reshape;
pub mod shadow;
pub mod shaper;
pub mod splitter;
pub mod wrapper;

// Output selection and encoder interfaces.
pub mod output_type;
pub mod segment_encoder;

// Encoders that serialize segments into subtitle artifacts.
pub mod json_array_encoder;
pub mod srt_encoder;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;
