mod resize;
mod transcoder;

pub use resize::ImageResize;
pub use transcoder::{decode, ImageTranscoder, NativeImageTranscoder};
