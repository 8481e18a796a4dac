// HTTP transport for streaming audio sources

pub mod client;
pub mod stream;

pub use client::{HttpClient, HttpConfig};
pub use stream::HttpStream;
