use std::collections::VecDeque;

use thiserror::Error;

use crate::channels::AnimationError;
use crate::overlay::{OverlayMotion, SongListOverlay};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
}

impl Track {
    fn new(id: &str, title: &str, artist: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
        }
    }
}

/// The fixed, read-only catalog. Not loaded from anywhere; this mockup has
/// exactly these ten tracks.
pub fn builtin_catalog() -> Vec<Track> {
    vec![
        Track::new("1", "Blinding Lights", "The Weeknd"),
        Track::new("2", "Night Drive", "Kavinsky"),
        Track::new("3", "Strobe", "Deadmau5"),
        Track::new("4", "Midnight City", "M83"),
        Track::new("5", "Sunset Lover", "Petit Biscuit"),
        Track::new("6", "Ghosts n Stuff", "Deadmau5"),
        Track::new("7", "Turbo Killer", "Carpenter Brut"),
        Track::new("8", "The Island – Pt. 1 (Dawn)", "Pendulum"),
        Track::new("9", "Starboy", "The Weeknd ft. Daft Punk"),
        Track::new("10", "Bad Guy", "Billie Eilish"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("track id '{id}' is not in the catalog")]
    InvalidTrackSelection { id: String },
}

/// Change notifications published by state mutations and drained by the
/// rendering surface once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    TrackSelected { index: usize },
    PlaybackToggled { is_playing: bool },
    OverlayToggled { is_open: bool },
}

/// All user-facing player state: the selection, the play/pause flag and the
/// song-list overlay. Mutated only by the input handlers below; the frame
/// clock merely advances the overlay's channels.
#[derive(Debug, Clone)]
pub struct PlayerCore {
    catalog: Vec<Track>,
    current: usize,
    is_playing: bool,
    overlay: SongListOverlay,
    events: VecDeque<PlayerEvent>,
}

impl PlayerCore {
    pub fn new(motion: OverlayMotion) -> Result<Self, AnimationError> {
        let catalog = builtin_catalog();
        let overlay = SongListOverlay::new(catalog.len(), motion)?;
        Ok(Self {
            catalog,
            current: 0,
            is_playing: false,
            overlay,
            events: VecDeque::new(),
        })
    }

    pub fn catalog(&self) -> &[Track] {
        &self.catalog
    }

    pub fn current_track(&self) -> &Track {
        &self.catalog[self.current]
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_slider_visible(&self) -> bool {
        self.overlay.is_open()
    }

    pub fn overlay(&self) -> &SongListOverlay {
        &self.overlay
    }

    /// Swap the overlay's motion parameters (config hot reload).
    pub fn set_overlay_motion(&mut self, motion: OverlayMotion) -> Result<(), AnimationError> {
        self.overlay.set_motion(motion)
    }

    /// Select a catalog track by id. A successful selection also starts
    /// playback and dismisses the song list, as one compound transition.
    /// An unknown id leaves everything unchanged.
    pub fn select_track(&mut self, id: &str) -> Result<(), SelectionError> {
        let index = self
            .catalog
            .iter()
            .position(|track| track.id == id)
            .ok_or_else(|| SelectionError::InvalidTrackSelection { id: id.to_string() })?;
        self.current = index;
        self.is_playing = true;
        self.overlay.close();
        self.events.push_back(PlayerEvent::TrackSelected { index });
        Ok(())
    }

    pub fn toggle_play_pause(&mut self) {
        self.is_playing = !self.is_playing;
        self.events.push_back(PlayerEvent::PlaybackToggled {
            is_playing: self.is_playing,
        });
    }

    pub fn toggle_song_list(&mut self) {
        self.overlay.toggle();
        self.events.push_back(PlayerEvent::OverlayToggled {
            is_open: self.overlay.is_open(),
        });
    }

    /// Accepted with no effect; the button only gives press feedback.
    pub fn tap_back(&mut self) {}

    /// Accepted with no effect; the button only gives press feedback.
    pub fn tap_previous(&mut self) {}

    /// Accepted with no effect; the button only gives press feedback.
    pub fn tap_next(&mut self) {}

    /// Advance the overlay's animation channels. Never touches selection
    /// or playback state.
    pub fn advance(&mut self, dt: f32) {
        self.overlay.advance(dt);
    }

    pub fn is_animating(&self) -> bool {
        self.overlay.is_animating()
    }

    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_first_track_paused_and_hidden() {
        let core = PlayerCore::new(OverlayMotion::default()).unwrap();
        assert_eq!(core.current_track().title, "Blinding Lights");
        assert!(!core.is_playing());
        assert!(!core.is_slider_visible());
    }

    #[test]
    fn selecting_any_track_plays_it_and_hides_the_list() {
        let ids: Vec<String> = builtin_catalog().iter().map(|t| t.id.clone()).collect();
        for id in ids {
            let mut core = PlayerCore::new(OverlayMotion::default()).unwrap();
            core.toggle_song_list();
            core.select_track(&id).unwrap();
            assert_eq!(core.current_track().id, id);
            assert!(core.is_playing());
            assert!(!core.is_slider_visible());
        }
    }

    #[test]
    fn unknown_id_is_rejected_and_changes_nothing() {
        let mut core = PlayerCore::new(OverlayMotion::default()).unwrap();
        let before = core.current_track().clone();
        let err = core.select_track("99").unwrap_err();
        assert_eq!(
            err,
            SelectionError::InvalidTrackSelection {
                id: "99".to_string()
            }
        );
        assert_eq!(core.current_track(), &before);
        assert!(!core.is_playing());
    }

    #[test]
    fn toggle_play_pause_twice_restores_the_flag() {
        let mut core = PlayerCore::new(OverlayMotion::default()).unwrap();
        for start in [false, true] {
            if core.is_playing() != start {
                core.toggle_play_pause();
            }
            core.toggle_play_pause();
            core.toggle_play_pause();
            assert_eq!(core.is_playing(), start);
        }
    }

    #[test]
    fn play_pause_does_not_touch_the_overlay() {
        let mut core = PlayerCore::new(OverlayMotion::default()).unwrap();
        core.toggle_song_list();
        core.toggle_play_pause();
        assert!(core.is_slider_visible());
    }

    #[test]
    fn transport_taps_are_accepted_noops() {
        let mut core = PlayerCore::new(OverlayMotion::default()).unwrap();
        core.tap_back();
        core.tap_previous();
        core.tap_next();
        assert_eq!(core.current_track().title, "Blinding Lights");
        assert!(!core.is_playing());
        assert!(core.drain_events().is_empty());
    }

    #[test]
    fn mutations_publish_events() {
        let mut core = PlayerCore::new(OverlayMotion::default()).unwrap();
        core.toggle_song_list();
        core.select_track("5").unwrap();
        core.toggle_play_pause();
        assert_eq!(
            core.drain_events(),
            vec![
                PlayerEvent::OverlayToggled { is_open: true },
                PlayerEvent::TrackSelected { index: 4 },
                PlayerEvent::PlaybackToggled { is_playing: false },
            ]
        );
        assert!(core.drain_events().is_empty());
    }
}
