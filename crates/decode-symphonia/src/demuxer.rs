// Container probing and packet reading

use musicplayer_core::{AudioError, Result};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet, SeekMode, SeekTo};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Track information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_ms: u64,
}

/// Format reader bound to the default track of a source
pub struct Demuxer {
    format_reader: Box<dyn FormatReader>,
    track_id: u32,
}

impl Demuxer {
    /// Probe the source and select its default track
    pub fn probe(media_source: Box<dyn MediaSource>, hint: Hint) -> Result<Self> {
        let stream = MediaSourceStream::new(media_source, Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::UnsupportedFormat(format!("probe failed: {}", e)))?;

        let format_reader = probed.format;
        let track_id = format_reader
            .default_track()
            .map(|t| t.id)
            .ok_or_else(|| AudioError::UnsupportedFormat("no audio track".to_string()))?;

        Ok(Self {
            format_reader,
            track_id,
        })
    }

    /// Next packet of the selected track, or `None` at end of stream
    pub fn next_packet(&mut self) -> Result<Option<Packet>> {
        loop {
            match self.format_reader.next_packet() {
                Ok(packet) if packet.track_id() == self.track_id => return Ok(Some(packet)),
                Ok(_) => continue,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Ok(None)
                }
                Err(SymphoniaError::ResetRequired) => return Ok(None),
                Err(e) => return Err(AudioError::Decoding(format!("read packet: {}", e))),
            }
        }
    }

    /// Seek back to the first frame of the track
    pub fn rewind(&mut self) -> Result<()> {
        self.format_reader
            .seek(
                SeekMode::Coarse,
                SeekTo::TimeStamp {
                    ts: 0,
                    track_id: self.track_id,
                },
            )
            .map(|_| ())
            .map_err(|e| AudioError::Decoding(format!("rewind failed: {}", e)))
    }

    pub fn track_info(&self) -> Result<TrackInfo> {
        let track = self
            .format_reader
            .tracks()
            .iter()
            .find(|t| t.id == self.track_id)
            .ok_or_else(|| AudioError::Decoding("track disappeared".to_string()))?;
        let params = &track.codec_params;

        let sample_rate = params
            .sample_rate
            .ok_or_else(|| AudioError::UnsupportedFormat("sample rate not specified".into()))?;
        let channels = params.channels.map(|c| c.count() as u16).unwrap_or(2);
        let duration_ms = match (params.time_base, params.n_frames) {
            (Some(tb), Some(frames)) => {
                let time = tb.calc_time(frames);
                time.seconds * 1000 + (time.frac * 1000.0) as u64
            }
            _ => 0,
        };

        Ok(TrackInfo {
            sample_rate,
            channels,
            duration_ms,
        })
    }

    pub fn format_reader(&self) -> &dyn FormatReader {
        &*self.format_reader
    }

    pub fn track_id(&self) -> u32 {
        self.track_id
    }
}
