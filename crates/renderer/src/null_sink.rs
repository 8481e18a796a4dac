// Sink that discards samples, optionally at the real-time rate

use crate::{AudioSink, AudioSpec};
use musicplayer_core::{AudioError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Observes what a [`NullSink`] received
#[derive(Clone, Default)]
pub struct NullSinkProbe {
    written: Arc<AtomicUsize>,
    spec: Arc<Mutex<Option<AudioSpec>>>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl NullSinkProbe {
    pub fn samples_written(&self) -> usize {
        self.written.load(Ordering::SeqCst)
    }

    pub fn spec(&self) -> Option<AudioSpec> {
        *self.spec.lock()
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Sink without a device
pub struct NullSink {
    probe: NullSinkProbe,
    realtime: bool,
    spec: Option<AudioSpec>,
}

impl NullSink {
    /// Accepts samples as fast as they are written
    pub fn new() -> Self {
        Self::with_probe(NullSinkProbe::default(), false)
    }

    /// Sleeps for the duration of every write, like a device would
    pub fn realtime() -> Self {
        Self::with_probe(NullSinkProbe::default(), true)
    }

    pub fn with_probe(probe: NullSinkProbe, realtime: bool) -> Self {
        Self {
            probe,
            realtime,
            spec: None,
        }
    }
}

impl Default for NullSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for NullSink {
    fn open(&mut self, spec: AudioSpec) -> Result<()> {
        self.spec = Some(spec);
        *self.probe.spec.lock() = Some(spec);
        self.probe.opened.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn write(&mut self, samples: &[f32]) -> Result<usize> {
        let spec = self
            .spec
            .ok_or_else(|| AudioError::InvalidState("sink not opened".to_string()))?;
        let mut accepted = samples.len();
        if self.realtime && accepted > 0 {
            let per_second = spec.samples_per_second();
            let per_wait = (per_second * crate::WRITE_WAIT.as_millis() as usize / 1000).max(1);
            accepted = accepted.min(per_wait);
            let micros = accepted as u64 * 1_000_000 / per_second as u64;
            std::thread::sleep(Duration::from_micros(micros));
        }
        self.probe.written.fetch_add(accepted, Ordering::SeqCst);
        Ok(accepted)
    }

    fn drain(&mut self) {}

    fn close(&mut self) -> Result<()> {
        self.spec = None;
        self.probe.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
