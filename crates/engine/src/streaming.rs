// MediaEngine implementation with a media-player style state machine
//
// Idle -> Initialized -> Preparing -> Prepared -> Started -> Stopped
// reset() returns to Idle from anywhere, release() ends in End.

use crate::source::{prepare_media, PreparedMedia};
use musicplayer_core::{
    AudioError, ErrorCallback, MediaEngine, PreparedCallback, Result, StreamType,
};
use musicplayer_decode_symphonia::Locator;
use musicplayer_renderer::{default_sink_factory, AudioSink, AudioSpec, SinkFactory};
use musicplayer_transport_http::{HttpClient, HttpConfig};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Initialized,
    Preparing,
    Prepared,
    Started,
    Stopped,
    Error,
    End,
}

/// State shared with the preparation worker
struct Shared {
    state: EngineState,
    /// Bumped by stop/reset so a running preparation knows it was cancelled
    generation: u64,
    prepared: Option<PreparedMedia>,
}

struct Playback {
    stop: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
}

/// Streaming engine: network or file source decoded by Symphonia into a sink
pub struct StreamingEngine {
    shared: Arc<Mutex<Shared>>,
    client: HttpClient,
    sink_factory: SinkFactory,
    locator: Option<Locator>,
    looping: Arc<AtomicBool>,
    stream_type: StreamType,
    on_error: Option<ErrorCallback>,
    playback: Option<Playback>,
}

impl StreamingEngine {
    pub fn new(http: &HttpConfig, sink_factory: SinkFactory) -> Self {
        log::info!("[engine] creating streaming engine");
        Self {
            shared: Arc::new(Mutex::new(Shared {
                state: EngineState::Idle,
                generation: 0,
                prepared: None,
            })),
            client: HttpClient::new(http),
            sink_factory,
            locator: None,
            looping: Arc::new(AtomicBool::new(false)),
            stream_type: StreamType::Music,
            on_error: None,
            playback: None,
        }
    }

    /// Engine writing to the platform's default output
    pub fn with_default_output(http: &HttpConfig) -> Self {
        Self::new(http, default_sink_factory())
    }

    pub fn state(&self) -> EngineState {
        self.shared.lock().state
    }

    /// Whether the decode thread is still producing output
    pub fn is_outputting(&self) -> bool {
        self.playback
            .as_ref()
            .map(|p| !p.handle.is_finished())
            .unwrap_or(false)
    }

    fn expect_state(&self, allowed: &[EngineState], op: &str) -> Result<EngineState> {
        let state = self.state();
        if state == EngineState::End {
            return Err(AudioError::Released);
        }
        if allowed.contains(&state) {
            Ok(state)
        } else {
            Err(AudioError::InvalidState(format!(
                "{} not allowed in state {:?}",
                op, state
            )))
        }
    }

    /// Cancel any preparation and drop prepared media
    fn invalidate(&self, next: EngineState) {
        let mut shared = self.shared.lock();
        shared.generation = shared.generation.wrapping_add(1);
        shared.prepared = None;
        shared.state = next;
    }

    fn stop_playback(&mut self) {
        if let Some(playback) = self.playback.take() {
            log::info!("[engine] stopping output");
            playback.stop.store(true, Ordering::SeqCst);
            if playback.handle.join().is_err() {
                log::error!("[engine] decode thread panicked");
            }
        }
    }
}

impl Default for StreamingEngine {
    fn default() -> Self {
        Self::with_default_output(&HttpConfig::default())
    }
}

impl MediaEngine for StreamingEngine {
    fn set_audio_stream_type(&mut self, stream_type: StreamType) -> Result<()> {
        self.expect_state(
            &[EngineState::Idle, EngineState::Initialized],
            "set_audio_stream_type",
        )?;
        self.stream_type = stream_type;
        Ok(())
    }

    fn set_source(&mut self, url: &str) -> Result<()> {
        self.expect_state(&[EngineState::Idle], "set_source")?;
        let locator = Locator::parse(url)?;
        log::info!("[engine] source set: {:?}", locator);
        self.locator = Some(locator);
        self.shared.lock().state = EngineState::Initialized;
        Ok(())
    }

    fn prepare_async(&mut self, on_prepared: PreparedCallback) -> Result<()> {
        self.expect_state(
            &[EngineState::Initialized, EngineState::Stopped],
            "prepare_async",
        )?;
        let locator = self
            .locator
            .clone()
            .ok_or_else(|| AudioError::InvalidState("no source set".to_string()))?;

        let generation = {
            let mut shared = self.shared.lock();
            shared.state = EngineState::Preparing;
            shared.generation
        };

        let shared = self.shared.clone();
        let client = self.client.clone();
        thread::Builder::new()
            .name("musicplayer-prepare".to_string())
            .spawn(move || {
                let result = prepare_media(&locator, &client);

                let mut guard = shared.lock();
                if guard.generation != generation {
                    log::debug!("[engine] preparation of {:?} was cancelled", locator);
                    return;
                }
                let signal = match result {
                    Ok(media) => {
                        guard.prepared = Some(media);
                        guard.state = EngineState::Prepared;
                        Ok(())
                    }
                    Err(err) => {
                        log::error!("[engine] preparation of {:?} failed: {}", locator, err);
                        guard.state = EngineState::Error;
                        Err(err)
                    }
                };
                drop(guard);

                on_prepared(signal);
            })?;

        Ok(())
    }

    fn set_on_error(&mut self, on_error: ErrorCallback) {
        self.on_error = Some(on_error);
    }

    fn start(&mut self) -> Result<()> {
        if self.expect_state(&[EngineState::Prepared, EngineState::Started], "start")?
            == EngineState::Started
        {
            return Ok(());
        }

        let media = {
            let mut shared = self.shared.lock();
            let media = shared
                .prepared
                .take()
                .ok_or_else(|| AudioError::InvalidState("prepared media missing".to_string()))?;
            shared.state = EngineState::Started;
            media
        };

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let looping = self.looping.clone();
        let sink_factory = self.sink_factory.clone();
        let on_error = self.on_error.take();
        let handle = thread::Builder::new()
            .name("musicplayer-decode".to_string())
            .spawn(move || {
                let result = run_playback(media, &sink_factory, &thread_stop, &looping);
                if let Err(err) = result {
                    if thread_stop.load(Ordering::SeqCst) {
                        log::debug!("[engine] playback ended during stop: {}", err);
                    } else {
                        log::error!("[engine] playback failed: {}", err);
                        report_playback_error(on_error, err);
                    }
                }
            })?;

        log::info!("[engine] output started ({:?} stream)", self.stream_type);
        self.playback = Some(Playback { stop, handle });
        Ok(())
    }

    /// Also accepted after a failed preparation, where there is nothing to stop.
    fn stop(&mut self) -> Result<()> {
        self.expect_state(
            &[
                EngineState::Error,
                EngineState::Preparing,
                EngineState::Prepared,
                EngineState::Started,
                EngineState::Stopped,
            ],
            "stop",
        )?;
        self.stop_playback();
        self.invalidate(EngineState::Stopped);
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        if self.state() == EngineState::End {
            return Err(AudioError::Released);
        }
        self.stop_playback();
        self.invalidate(EngineState::Idle);
        self.locator = None;
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) -> Result<()> {
        self.expect_state(
            &[
                EngineState::Idle,
                EngineState::Initialized,
                EngineState::Preparing,
                EngineState::Prepared,
                EngineState::Started,
                EngineState::Stopped,
            ],
            "set_looping",
        )?;
        self.looping.store(looping, Ordering::SeqCst);
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if self.state() == EngineState::End {
            return Ok(());
        }
        log::info!("[engine] release");
        self.stop_playback();
        self.invalidate(EngineState::End);
        self.locator = None;
        Ok(())
    }
}

impl Drop for StreamingEngine {
    fn drop(&mut self) {
        self.stop_playback();
    }
}

/// Hand a playback failure to the listener.
///
/// The listener resets the engine, which joins the decode thread, so it runs on
/// a thread of its own.
fn report_playback_error(on_error: Option<ErrorCallback>, err: AudioError) {
    let Some(on_error) = on_error else {
        return;
    };
    let spawned = thread::Builder::new()
        .name("musicplayer-error".to_string())
        .spawn(move || on_error(err));
    if let Err(spawn_err) = spawned {
        log::error!("[engine] failed to report playback error: {}", spawn_err);
    }
}

/// Decode thread body
fn run_playback(
    media: PreparedMedia,
    sink_factory: &SinkFactory,
    stop: &AtomicBool,
    looping: &AtomicBool,
) -> Result<()> {
    let mut sink = sink_factory()?;
    sink.open(AudioSpec {
        sample_rate: media.info.sample_rate,
        channels: media.info.channels,
    })?;

    let played = pump(media, sink.as_mut(), stop, looping);
    let closed = sink.close();
    played.and(closed)
}

fn pump(
    media: PreparedMedia,
    sink: &mut dyn AudioSink,
    stop: &AtomicBool,
    looping: &AtomicBool,
) -> Result<()> {
    let PreparedMedia {
        mut demuxer,
        mut decoder,
        ..
    } = media;

    'packets: while !stop.load(Ordering::SeqCst) {
        let packet = match demuxer.next_packet()? {
            Some(packet) => packet,
            None if looping.load(Ordering::SeqCst) => {
                log::debug!("[engine] end of track, looping");
                demuxer.rewind()?;
                decoder.reset();
                continue;
            }
            None => {
                log::info!("[engine] end of track");
                sink.drain();
                break;
            }
        };

        let samples = decoder.decode(&packet)?;
        let mut offset = 0;
        while offset < samples.len() {
            if stop.load(Ordering::SeqCst) {
                break 'packets;
            }
            offset += sink.write(&samples[offset..])?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_media::{engine_with_probe, wait_until, write_wav, SAMPLE_RATE};
    use std::sync::mpsc;
    use std::time::Duration;

    fn prepare_and_wait(engine: &mut StreamingEngine) -> Result<()> {
        let (tx, rx) = mpsc::channel();
        engine.prepare_async(Box::new(move |result| {
            let _ = tx.send(result);
        }))?;
        rx.recv_timeout(Duration::from_secs(10))
            .expect("prepared signal not delivered")
    }

    #[test]
    fn test_rejects_unknown_scheme() {
        let (mut engine, _) = engine_with_probe(false);
        assert!(matches!(engine.set_source("bad://url"), Err(AudioError::Source(_))));
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn test_calls_out_of_order() {
        let (mut engine, _) = engine_with_probe(false);
        assert!(matches!(engine.start(), Err(AudioError::InvalidState(_))));
        assert!(matches!(engine.stop(), Err(AudioError::InvalidState(_))));
        assert!(matches!(
            engine.prepare_async(Box::new(|_| {})),
            Err(AudioError::InvalidState(_))
        ));

        engine.set_source("/tmp/whatever.mp3").unwrap();
        assert!(matches!(
            engine.set_source("/tmp/other.mp3"),
            Err(AudioError::InvalidState(_))
        ));
        assert!(matches!(
            engine.set_audio_stream_type(StreamType::Alarm),
            Ok(())
        ));
    }

    #[test]
    fn test_missing_file_fails_preparation() {
        let (mut engine, _) = engine_with_probe(false);
        engine
            .set_source("/nonexistent/musicplayer/missing.wav")
            .unwrap();

        let result = prepare_and_wait(&mut engine);

        assert!(matches!(result, Err(AudioError::Source(_))));
        assert_eq!(engine.state(), EngineState::Error);
        engine.reset().unwrap();
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn test_stop_after_failed_preparation() {
        let (mut engine, _) = engine_with_probe(false);
        engine
            .set_source("/nonexistent/musicplayer/missing.wav")
            .unwrap();
        assert!(prepare_and_wait(&mut engine).is_err());

        engine.stop().unwrap();
        assert_eq!(engine.state(), EngineState::Stopped);
        engine.reset().unwrap();
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn test_output_failure_reaches_error_listener() {
        let path = write_wav("no-device", 4000);
        let factory: SinkFactory =
            Arc::new(|| Err(AudioError::Device("no output device".to_string())));
        let mut engine = StreamingEngine::new(&HttpConfig::default(), factory);
        engine.set_source(path.to_str().unwrap()).unwrap();
        prepare_and_wait(&mut engine).unwrap();

        let (tx, rx) = mpsc::channel();
        engine.set_on_error(Box::new(move |err| {
            let _ = tx.send(err);
        }));
        engine.start().unwrap();

        let err = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(matches!(err, AudioError::Device(_)));
        // The listener may reset the engine; the decode thread has already exited
        engine.reset().unwrap();
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_stop_does_not_report_error() {
        let path = write_wav("quiet-stop", SAMPLE_RATE * 10);
        let (mut engine, probe) = engine_with_probe(true);
        engine.set_source(path.to_str().unwrap()).unwrap();
        prepare_and_wait(&mut engine).unwrap();

        let (tx, rx) = mpsc::channel::<AudioError>();
        engine.set_on_error(Box::new(move |err| {
            let _ = tx.send(err);
        }));
        engine.start().unwrap();
        assert!(wait_until(|| probe.samples_written() > 0));
        engine.stop().unwrap();

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_plays_file_to_end() {
        let path = write_wav("to-end", 4000);
        let (mut engine, probe) = engine_with_probe(false);
        engine.set_source(path.to_str().unwrap()).unwrap();

        prepare_and_wait(&mut engine).unwrap();
        assert_eq!(engine.state(), EngineState::Prepared);
        engine.start().unwrap();

        assert!(wait_until(|| probe.closed() == 1));
        assert_eq!(probe.samples_written(), 4000);
        assert_eq!(
            probe.spec(),
            Some(AudioSpec {
                sample_rate: SAMPLE_RATE,
                channels: 1
            })
        );
        assert!(!engine.is_outputting());

        engine.stop().unwrap();
        engine.reset().unwrap();
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_stop_interrupts_output() {
        // Ten seconds of audio written in real time
        let path = write_wav("interrupt", SAMPLE_RATE * 10);
        let (mut engine, probe) = engine_with_probe(true);
        engine.set_source(path.to_str().unwrap()).unwrap();
        prepare_and_wait(&mut engine).unwrap();
        engine.start().unwrap();

        assert!(wait_until(|| probe.samples_written() > 0));
        engine.stop().unwrap();

        assert_eq!(engine.state(), EngineState::Stopped);
        assert_eq!(probe.closed(), 1);
        assert!(probe.samples_written() < (SAMPLE_RATE * 10) as usize);
        assert!(matches!(engine.start(), Err(AudioError::InvalidState(_))));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_looping_restarts_track() {
        let path = write_wav("looping", 1000);
        let (mut engine, probe) = engine_with_probe(false);
        engine.set_source(path.to_str().unwrap()).unwrap();
        prepare_and_wait(&mut engine).unwrap();
        engine.set_looping(true).unwrap();
        engine.start().unwrap();

        assert!(wait_until(|| probe.samples_written() > 3000));
        engine.stop().unwrap();
        assert!(!engine.is_outputting());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_release_is_final() {
        let (mut engine, _) = engine_with_probe(false);
        engine.release().unwrap();
        engine.release().unwrap();

        assert_eq!(engine.state(), EngineState::End);
        assert_eq!(engine.set_source("/tmp/a.wav"), Err(AudioError::Released));
        assert_eq!(engine.reset(), Err(AudioError::Released));
    }
}
