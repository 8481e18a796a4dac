// Opening and probing a source

use musicplayer_core::{AudioError, Result};
use musicplayer_decode_symphonia::{format_hint, AudioDecoder, Demuxer, Locator, TrackInfo};
use musicplayer_transport_http::{HttpClient, HttpStream};
use std::fs::File;
use symphonia::core::io::MediaSource;
use symphonia::core::probe::Hint;

/// A probed source with a decoder, ready to produce samples
pub struct PreparedMedia {
    pub demuxer: Demuxer,
    pub decoder: AudioDecoder,
    pub info: TrackInfo,
}

fn open(locator: &Locator, client: &HttpClient) -> Result<(Box<dyn MediaSource>, Hint)> {
    match locator {
        Locator::Http(url) => {
            let stream = HttpStream::open(client, url)?;
            let hint = format_hint(locator, stream.content_type());
            Ok((Box::new(stream), hint))
        }
        Locator::File(path) => {
            let file = File::open(path)
                .map_err(|e| AudioError::Source(format!("open {}: {}", path.display(), e)))?;
            Ok((Box::new(file), format_hint(locator, None)))
        }
    }
}

/// Open, probe and build a decoder for `locator`. Blocks on network I/O.
pub fn prepare_media(locator: &Locator, client: &HttpClient) -> Result<PreparedMedia> {
    let (source, hint) = open(locator, client)?;
    let demuxer = Demuxer::probe(source, hint)?;
    let info = demuxer.track_info()?;
    let decoder = AudioDecoder::from_demuxer(&demuxer)?;

    log::info!(
        "[engine] prepared {:?}: {} Hz, {} channels, {} ms",
        locator,
        info.sample_rate,
        info.channels,
        info.duration_ms
    );

    Ok(PreparedMedia {
        demuxer,
        decoder,
        info,
    })
}
