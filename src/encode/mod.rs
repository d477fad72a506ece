//! Encoding sinks.
//!
//! Sinks consume captured frames in timeline order and are driven by the exporter.

/// `ffmpeg`-based sinks (MP4 and WebM output via system `ffmpeg`).
pub mod ffmpeg;
/// Animated GIF sink.
pub mod gif;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
