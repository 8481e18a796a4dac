// Play request passed from the presentation layer to the service

/// Action of an intent asking the service to play its data locator
pub const ACTION_PLAY: &str = "musicplayer.action.PLAY";

/// A request to the service: an action plus the locator it applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayIntent {
    pub action: String,
    pub data: String,
}

impl PlayIntent {
    pub fn is_play(&self) -> bool {
        self.action == ACTION_PLAY
    }

    pub fn data_string(&self) -> &str {
        &self.data
    }
}

/// Build the intent that plays `song_url`
pub fn make_intent(song_url: &str) -> PlayIntent {
    PlayIntent {
        action: ACTION_PLAY.to_string(),
        data: song_url.to_string(),
    }
}
