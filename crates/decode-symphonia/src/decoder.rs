// Packet decoding to interleaved f32

use crate::demuxer::Demuxer;
use musicplayer_core::{AudioError, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::Packet;

/// Audio decoder for the demuxer's selected track
pub struct AudioDecoder {
    decoder: Box<dyn Decoder>,
    samples: Option<SampleBuffer<f32>>,
}

impl AudioDecoder {
    pub fn from_demuxer(demuxer: &Demuxer) -> Result<Self> {
        let track = demuxer
            .format_reader()
            .tracks()
            .iter()
            .find(|t| t.id == demuxer.track_id())
            .ok_or_else(|| AudioError::Decoding("track not found".to_string()))?;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::UnsupportedFormat(format!("no decoder: {}", e)))?;

        Ok(Self {
            decoder,
            samples: None,
        })
    }

    /// Decode one packet. A corrupt packet yields no samples rather than an error.
    pub fn decode(&mut self, packet: &Packet) -> Result<Vec<f32>> {
        let decoded = match self.decoder.decode(packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::warn!("[decode] skipping corrupt packet: {}", msg);
                return Ok(Vec::new());
            }
            Err(e) => return Err(AudioError::Decoding(e.to_string())),
        };

        let spec = *decoded.spec();
        let needed = decoded.capacity() * spec.channels.count();
        let reuse = matches!(&self.samples, Some(buf) if buf.capacity() >= needed);
        if !reuse {
            self.samples = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }

        match self.samples.as_mut() {
            Some(buf) => {
                buf.copy_interleaved_ref(decoded);
                Ok(buf.samples().to_vec())
            }
            None => Ok(Vec::new()),
        }
    }

    /// Clear decoder state after a seek
    pub fn reset(&mut self) {
        self.decoder.reset();
    }
}
