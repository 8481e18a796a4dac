// cpal-based output for desktop platforms

use crate::queue::SampleQueue;
use crate::{AudioSink, AudioSpec, WRITE_WAIT};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, Stream, StreamConfig};
use musicplayer_core::{AudioError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Milliseconds of audio buffered between decoder and device
const QUEUE_MS: usize = 500;

/// cpal output sink
pub struct CpalSink {
    stream: Option<Stream>,
    queue: Option<Arc<SampleQueue>>,
}

impl CpalSink {
    pub fn new() -> Self {
        Self {
            stream: None,
            queue: None,
        }
    }
}

impl Default for CpalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for CpalSink {
    fn open(&mut self, spec: AudioSpec) -> Result<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::Device("no output device available".to_string()))?;

        let config = StreamConfig {
            channels: spec.channels,
            sample_rate: SampleRate(spec.sample_rate),
            buffer_size: BufferSize::Default,
        };

        let queue = Arc::new(SampleQueue::new(spec.samples_per_second() * QUEUE_MS / 1000));
        let queue_for_cb = queue.clone();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    queue_for_cb.pop_into(data);
                },
                |err| log::error!("[sink] output stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::Device(format!("build output stream: {}", e)))?;
        stream
            .play()
            .map_err(|e| AudioError::Device(format!("start output stream: {}", e)))?;

        log::info!(
            "[sink] cpal output opened: {} Hz, {} channels",
            spec.sample_rate,
            spec.channels
        );
        self.stream = Some(stream);
        self.queue = Some(queue);
        Ok(())
    }

    fn write(&mut self, samples: &[f32]) -> Result<usize> {
        let queue = self
            .queue
            .as_ref()
            .ok_or_else(|| AudioError::InvalidState("sink not opened".to_string()))?;
        Ok(queue.push(samples, WRITE_WAIT))
    }

    fn drain(&mut self) {
        if let Some(queue) = &self.queue {
            // Bounded by the queue length; the device consumes it in real time
            for _ in 0..(QUEUE_MS / 10 + 1) {
                if queue.is_empty() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(queue) = self.queue.take() {
            queue.clear();
        }
        if let Some(stream) = self.stream.take() {
            stream
                .pause()
                .map_err(|e| AudioError::Device(format!("pause output stream: {}", e)))?;
            log::info!("[sink] cpal output closed");
        }
        Ok(())
    }
}

impl Drop for CpalSink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
