// Streaming media engine: HTTP/file source -> Symphonia -> audio sink

pub mod source;
pub mod streaming;

#[cfg(test)]
mod test_media;

pub use source::{prepare_media, PreparedMedia};
pub use streaming::{EngineState, StreamingEngine};
