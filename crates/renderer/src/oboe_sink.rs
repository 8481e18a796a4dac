// Oboe-based output for Android
// The stream is opened as stereo f32; mono input is duplicated, extra channels are dropped

use crate::queue::SampleQueue;
use crate::{AudioSink, AudioSpec, WRITE_WAIT};
use musicplayer_core::{AudioError, Result};
use oboe::{
    AudioOutputCallback, AudioOutputStreamSafe, AudioStream, AudioStreamAsync, AudioStreamBuilder,
    DataCallbackResult, Output, PerformanceMode, SharingMode, Stereo, Usage,
};
use std::sync::Arc;
use std::time::Duration;

const QUEUE_MS: usize = 500;

struct OboeCallback {
    queue: Arc<SampleQueue>,
    scratch: Vec<f32>,
}

impl AudioOutputCallback for OboeCallback {
    type FrameType = (f32, Stereo);

    fn on_audio_ready(
        &mut self,
        _stream: &mut dyn AudioOutputStreamSafe,
        output: &mut [(f32, f32)],
    ) -> DataCallbackResult {
        self.scratch.resize(output.len() * 2, 0.0);
        self.queue.pop_into(&mut self.scratch);
        for (frame, pair) in output.iter_mut().zip(self.scratch.chunks_exact(2)) {
            *frame = (pair[0], pair[1]);
        }
        DataCallbackResult::Continue
    }
}

/// Oboe output sink
pub struct OboeSink {
    stream: Option<AudioStreamAsync<Output, OboeCallback>>,
    queue: Option<Arc<SampleQueue>>,
    channels: u16,
    stereo: Vec<f32>,
}

impl OboeSink {
    pub fn new() -> Self {
        Self {
            stream: None,
            queue: None,
            channels: 2,
            stereo: Vec::new(),
        }
    }

    fn to_stereo(&mut self, samples: &[f32]) {
        self.stereo.clear();
        let channels = self.channels.max(1) as usize;
        for frame in samples.chunks(channels) {
            let left = frame[0];
            let right = frame.get(1).copied().unwrap_or(left);
            self.stereo.push(left);
            self.stereo.push(right);
        }
    }
}

impl Default for OboeSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for OboeSink {
    fn open(&mut self, spec: AudioSpec) -> Result<()> {
        let stereo_spec = AudioSpec {
            sample_rate: spec.sample_rate,
            channels: 2,
        };
        let queue = Arc::new(SampleQueue::new(
            stereo_spec.samples_per_second() * QUEUE_MS / 1000,
        ));

        let callback = OboeCallback {
            queue: queue.clone(),
            scratch: Vec::new(),
        };

        let mut stream = AudioStreamBuilder::default()
            .set_performance_mode(PerformanceMode::PowerSaving)
            .set_sharing_mode(SharingMode::Shared)
            .set_usage(Usage::Media)
            .set_format::<f32>()
            .set_channel_count::<Stereo>()
            .set_sample_rate(spec.sample_rate as i32)
            .set_callback(callback)
            .open_stream()
            .map_err(|e| AudioError::Device(format!("open Oboe stream: {:?}", e)))?;
        stream
            .request_start()
            .map_err(|e| AudioError::Device(format!("start Oboe stream: {:?}", e)))?;

        log::info!("[sink] oboe output opened: {} Hz", spec.sample_rate);
        self.channels = spec.channels;
        self.stream = Some(stream);
        self.queue = Some(queue);
        Ok(())
    }

    fn write(&mut self, samples: &[f32]) -> Result<usize> {
        let queue = self
            .queue
            .clone()
            .ok_or_else(|| AudioError::InvalidState("sink not opened".to_string()))?;

        // Accept whole frames only so the stereo conversion stays aligned
        let channels = self.channels.max(1) as usize;
        let whole = samples.len() - samples.len() % channels;
        self.to_stereo(&samples[..whole]);

        let pushed = queue.push_aligned(&self.stereo, 2, WRITE_WAIT);
        Ok(pushed / 2 * channels)
    }

    fn drain(&mut self) {
        if let Some(queue) = &self.queue {
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
        if let Some(mut stream) = self.stream.take() {
            stream
                .request_stop()
                .map_err(|e| AudioError::Device(format!("stop Oboe stream: {:?}", e)))?;
            log::info!("[sink] oboe output closed");
        }
        Ok(())
    }
}

impl Drop for OboeSink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
