//! Edit plans: parsing model output and applying it to the scene.

mod applier;
mod parser;

pub use applier::{apply, AppliedOperation, AppliedResult};
pub use parser::parse;

/// Opacity percent, rounded and clamped to 0..=100.
pub(crate) fn clamp_opacity(value: f64) -> u8 {
    // NaN casts to 0
    value.round().clamp(0.0, 100.0) as u8
}

/// Stroke widths are never negative.
pub(crate) fn clamp_stroke_width(value: f64) -> f64 {
    value.max(0.0)
}
