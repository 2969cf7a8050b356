use log::debug;

use crate::config::RINGTONE_NONE;
use crate::error::AppResult;

/// Playback capability. The desktop shell forwards these calls to the
/// webview, which owns the only audio element; tests substitute a fake.
pub trait AudioDevice: Send {
    /// May fail asynchronously on the real device (autoplay policy, bad URL).
    fn play(&mut self, url: &str, looping: bool) -> AppResult<()>;
    fn stop(&mut self);
}

/// The single audio channel. Alert ringtones and manual previews share it
/// and pre-empt each other; at most one sound plays at a time.
pub struct AudioPlayer {
    device: Box<dyn AudioDevice>,
    current_url: Option<String>,
}

impl AudioPlayer {
    pub fn new(device: Box<dyn AudioDevice>) -> Self {
        Self {
            device,
            current_url: None,
        }
    }

    /// Starts `url`, pre-empting whatever is playing. A failed start leaves
    /// the channel silent rather than erroring out of the caller.
    pub fn play(&mut self, url: &str, looping: bool) {
        if self.current_url.is_some() {
            self.device.stop();
        }
        match self.device.play(url, looping) {
            Ok(()) => self.current_url = Some(url.to_string()),
            Err(e) => {
                debug!("audio playback failed: {}", e);
                self.current_url = None;
            }
        }
    }

    pub fn stop(&mut self) {
        self.device.stop();
        self.current_url = None;
    }

    /// The device reports non-looping playback finished on its own.
    pub fn playback_ended(&mut self) {
        self.current_url = None;
    }

    pub fn is_playing(&self, url: &str) -> bool {
        self.current_url.as_deref() == Some(url)
    }
}

/// Settles the alert ringtone against its invariant: a looping ringtone
/// plays while the fullscreen slot is occupied, the ringtone is not the
/// "none" sentinel, sound alerts are enabled, and the user has interacted
/// with the page at least once (autoplay policy). The stop path only
/// silences the alert's own ringtone; a manual preview owns the channel
/// otherwise.
pub fn sync_alert_sound(
    player: &mut AudioPlayer,
    slot_occupied: bool,
    ringtone: &str,
    sound_alert: bool,
    has_interacted: bool,
) {
    let should_play = slot_occupied && ringtone != RINGTONE_NONE && sound_alert && has_interacted;
    if should_play {
        if !player.is_playing(ringtone) {
            player.play(ringtone, true);
        }
    } else if player.is_playing(ringtone) {
        player.stop();
    }
}
