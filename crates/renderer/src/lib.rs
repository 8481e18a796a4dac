// Audio output sinks
// Platform-specific implementations (Android, desktop) implement AudioSink

pub mod null_sink;
pub mod queue;

#[cfg(feature = "cpal")]
pub mod cpal_sink;

#[cfg(target_os = "android")]
pub mod oboe_sink;

use musicplayer_core::Result;
use std::sync::Arc;
use std::time::Duration;

pub use null_sink::{NullSink, NullSinkProbe};
pub use queue::SampleQueue;

#[cfg(feature = "cpal")]
pub use cpal_sink::CpalSink;

#[cfg(target_os = "android")]
pub use oboe_sink::OboeSink;

/// How long a blocked `write` waits for room before returning
pub const WRITE_WAIT: Duration = Duration::from_millis(20);

/// PCM format of the samples handed to a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for AudioSpec {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 2,
        }
    }
}

impl AudioSpec {
    /// Interleaved samples per second
    pub fn samples_per_second(&self) -> usize {
        self.sample_rate as usize * self.channels.max(1) as usize
    }
}

/// Audio sink trait
///
/// A sink is created and driven on the engine's decode thread.
pub trait AudioSink {
    /// Open the output for the given format and start consuming samples
    fn open(&mut self, spec: AudioSpec) -> Result<()>;

    /// Queue interleaved samples. Blocks for at most [`WRITE_WAIT`] when the
    /// output is full and returns how many samples were accepted.
    fn write(&mut self, samples: &[f32]) -> Result<usize>;

    /// Wait until queued samples have been played (end of track)
    fn drain(&mut self);

    /// Stop output and release the device
    fn close(&mut self) -> Result<()>;
}

/// Creates a sink for each started track
pub type SinkFactory = Arc<dyn Fn() -> Result<Box<dyn AudioSink>> + Send + Sync>;

/// Default sink for the current platform
pub fn default_sink_factory() -> SinkFactory {
    #[cfg(target_os = "android")]
    {
        Arc::new(|| Ok(Box::new(OboeSink::new()) as Box<dyn AudioSink>))
    }

    #[cfg(all(not(target_os = "android"), feature = "cpal"))]
    {
        Arc::new(|| Ok(Box::new(CpalSink::new()) as Box<dyn AudioSink>))
    }

    #[cfg(all(not(target_os = "android"), not(feature = "cpal")))]
    {
        log::warn!("[sink] no audio backend compiled in, output is discarded");
        Arc::new(|| Ok(Box::new(NullSink::realtime()) as Box<dyn AudioSink>))
    }
}
