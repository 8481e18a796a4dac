// Synthesized media and sink fixtures for engine tests

use crate::StreamingEngine;
use musicplayer_renderer::{AudioSink, NullSink, NullSinkProbe, SinkFactory};
use musicplayer_transport_http::HttpConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub const SAMPLE_RATE: u32 = 8000;

/// Mono 16-bit PCM WAV of `frames` samples in the temp dir
pub fn write_wav(name: &str, frames: u32) -> PathBuf {
    let data_len = frames * 2;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    out.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for frame in 0..frames {
        out.extend_from_slice(&(((frame % 64) as i16 - 32) * 256).to_le_bytes());
    }

    let path = std::env::temp_dir().join(format!(
        "musicplayer-engine-{}-{}.wav",
        name,
        std::process::id()
    ));
    std::fs::write(&path, out).unwrap();
    path
}

pub fn engine_with_probe(realtime: bool) -> (StreamingEngine, NullSinkProbe) {
    let probe = NullSinkProbe::default();
    let sink_probe = probe.clone();
    let factory: SinkFactory = Arc::new(move || {
        Ok(Box::new(NullSink::with_probe(sink_probe.clone(), realtime)) as Box<dyn AudioSink>)
    });
    (StreamingEngine::new(&HttpConfig::default(), factory), probe)
}

pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}
