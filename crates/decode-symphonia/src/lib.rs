// Demuxing and decoding with Symphonia

pub mod decoder;
pub mod demuxer;
pub mod locator;

pub use decoder::AudioDecoder;
pub use demuxer::{Demuxer, TrackInfo};
pub use locator::{format_hint, Locator};
