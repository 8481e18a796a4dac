// Presentation-side controller: turns the URL field and the two buttons into
// service requests

use crate::config::PlayerConfig;
use crate::intent::make_intent;
use crate::service::MusicService;
use musicplayer_core::{Result, StopOutcome};

/// Shown when stop is pressed while nothing is playing
pub const NOTHING_PLAYING_MESSAGE: &str = "No song is currently playing.";

/// `input` trimmed, or `default_url` when that leaves nothing
pub fn resolve_song_url(input: &str, default_url: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        default_url.to_string()
    } else {
        input.to_string()
    }
}

/// Front end of the music service
pub struct PlayerController {
    service: MusicService,
    default_url: String,
}

impl PlayerController {
    pub fn new(service: MusicService, config: &PlayerConfig) -> Self {
        log::debug!("[controller] ready, default song {}", config.default_url);
        Self {
            service,
            default_url: config.default_url.clone(),
        }
    }

    /// The entered URL, or the default song when the field is blank
    pub fn resolve_url(&self, input: &str) -> String {
        resolve_song_url(input, &self.default_url)
    }

    /// Play button: start the service if needed and hand it the URL
    pub fn play(&mut self, input: &str) -> Result<()> {
        let url = self.resolve_url(input);
        log::debug!("[controller] play clicked, url is {}", url);

        self.service.on_activate()?;
        self.service.on_request(&make_intent(&url))?;
        Ok(())
    }

    /// Stop button
    pub fn stop(&mut self) -> Result<StopOutcome> {
        log::debug!("[controller] stop clicked");
        if !self.service.is_active() {
            return Ok(StopOutcome::NothingPlaying);
        }
        self.service.on_deactivate_request()
    }

    /// User-facing message for a stop outcome, if any
    pub fn stop_message(outcome: StopOutcome) -> Option<&'static str> {
        match outcome {
            StopOutcome::Stopped => None,
            StopOutcome::NothingPlaying => Some(NOTHING_PLAYING_MESSAGE),
        }
    }

    /// Tear the service down (the host is going away)
    pub fn shutdown(&mut self) -> Result<()> {
        self.service.on_teardown()
    }

    pub fn service(&self) -> &MusicService {
        &self.service
    }
}
