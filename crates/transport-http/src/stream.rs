// Streaming HTTP body exposed as a symphonia MediaSource
// Seeking re-issues the request with a Range header when the server advertises byte ranges

use crate::client::HttpClient;
use musicplayer_core::Result;
use std::io::{self, Read, Seek, SeekFrom};
use symphonia::core::io::MediaSource;

type BodyReader = Box<dyn Read + Send + Sync + 'static>;

/// Response body of a GET request
pub struct HttpStream {
    client: HttpClient,
    url: String,
    reader: BodyReader,
    position: u64,
    length: Option<u64>,
    seekable: bool,
    content_type: Option<String>,
}

impl HttpStream {
    /// Issue the request and wrap the response body
    pub fn open(client: &HttpClient, url: &str) -> Result<Self> {
        let response = client.get(url)?;

        let length = response
            .header("Content-Length")
            .and_then(|v| v.trim().parse::<u64>().ok());
        let seekable = length.is_some()
            && response
                .header("Accept-Ranges")
                .map(|v| v.eq_ignore_ascii_case("bytes"))
                .unwrap_or(false);
        let content_type = Some(response.content_type().to_string()).filter(|c| !c.is_empty());

        log::info!(
            "[http] opened {} (length={:?}, seekable={}, type={:?})",
            url,
            length,
            seekable,
            content_type
        );

        Ok(Self {
            client: client.clone(),
            url: url.to_string(),
            reader: response.into_reader(),
            position: 0,
            length,
            seekable,
            content_type,
        })
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn reopen_at(&mut self, offset: u64) -> io::Result<()> {
        log::debug!("[http] range request {} from byte {}", self.url, offset);
        let response = self
            .client
            .get_from(&self.url, offset)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        if response.status() != 206 {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("server ignored range request (HTTP {})", response.status()),
            ));
        }
        self.reader = response.into_reader();
        self.position = offset;
        Ok(())
    }
}

impl Read for HttpStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.reader.read(buf)?;
        self.position += read as u64;
        Ok(read)
    }
}

impl Seek for HttpStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = resolve_seek(self.position, self.length, pos)?;
        if target == self.position {
            return Ok(target);
        }
        if !self.seekable {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "stream does not support seeking",
            ));
        }
        self.reopen_at(target)?;
        Ok(target)
    }
}

impl MediaSource for HttpStream {
    fn is_seekable(&self) -> bool {
        self.seekable
    }

    fn byte_len(&self) -> Option<u64> {
        self.length
    }
}

fn resolve_seek(position: u64, length: Option<u64>, pos: SeekFrom) -> io::Result<u64> {
    let target = match pos {
        SeekFrom::Start(offset) => Some(offset),
        SeekFrom::Current(delta) => position.checked_add_signed(delta),
        SeekFrom::End(delta) => match length {
            Some(len) => len.checked_add_signed(delta),
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "stream length unknown",
                ))
            }
        },
    };
    target.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "seek before start"))
}
