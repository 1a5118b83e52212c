//! Half-precision texture codec.
//!
//! Lossy f32 to binary16 conversion and the texel layouts used to upload
//! amplitude and band data.

pub mod half;
pub mod packing;

pub use half::{f16_step, f16_to_f32, f32_to_f16, F16_MAX, F16_MIN_POSITIVE};
pub use packing::{pack_amplitude, pack_bands, texture_width, transpose_bands};
