//! Intensity windowing and normalization
//!
//! Every function here borrows its input and returns a freshly allocated
//! array, so the same slice can be windowed several ways.

mod channels;
mod ct;
mod mri;

pub use channels::to_u8;
pub use ct::{norm, window};
pub use mri::{MriNormalization, norm_mri, window_mri};
