pub mod encode;
pub mod normalize;
pub mod pipeline;
pub mod types;

// Re-export commonly used functions
pub use encode::{SliceFormat, encode, encode_slice};
pub use normalize::{MriNormalization, norm, norm_mri, to_u8, window, window_mri};
pub use pipeline::{Modality, encode_windowed, windowed_rgb};
pub use types::{RescaleParams, Window, WindowError};
