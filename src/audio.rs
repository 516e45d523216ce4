//! Sound cues and background music
//!
//! The simulation only names what should be heard; this module maps those
//! names to sample keys and volumes. On the web, [`AudioManager`] plays them
//! through `HtmlAudioElement`s.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Sound effect categories; each has several interchangeable samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// Player got hit
    Grunt,
    /// Rod dips into the water
    Splash,
    /// Treasure banked
    TreasureChime,
}

impl SoundCue {
    /// Sample keys for this cue
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            SoundCue::Grunt => &["grunt1", "grunt2", "grunt3"],
            SoundCue::Splash => &["splash1", "splash2"],
            SoundCue::TreasureChime => &[
                "treasure1",
                "treasure2",
                "treasure3",
                "treasure4",
                "treasure5",
                "treasure6",
            ],
        }
    }

    /// Playback volume before the player's settings are applied
    pub fn volume(&self) -> f32 {
        match self {
            SoundCue::Grunt => 0.8,
            SoundCue::Splash => 0.5,
            SoundCue::TreasureChime => 0.6,
        }
    }

    /// Pick one of the cue's samples
    pub fn pick_key<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        self.keys().choose(rng).copied().unwrap_or("")
    }

    /// The cue a simulation event asks for, if any
    pub fn for_event(event: &GameEvent) -> Option<SoundCue> {
        match event {
            GameEvent::Damaged { .. } => Some(SoundCue::Grunt),
            GameEvent::Splash => Some(SoundCue::Splash),
            GameEvent::TreasureCollected { .. } => Some(SoundCue::TreasureChime),
            _ => None,
        }
    }
}

/// Sample file for a sound key
pub fn sample_path(key: &str) -> Option<&'static str> {
    Some(match key {
        "grunt1" => "/assets/sounds/grunt1.wav",
        "grunt2" => "/assets/sounds/grunt2.wav",
        "grunt3" => "/assets/sounds/grunt3.wav",
        "splash1" => "/assets/sounds/splash1.wav",
        "splash2" => "/assets/sounds/splash2.wav",
        "treasure1" => "/assets/sounds/Coin01.wav",
        "treasure2" => "/assets/sounds/Rise01.wav",
        "treasure3" => "/assets/sounds/Rise02.wav",
        "treasure4" => "/assets/sounds/Rise03.wav",
        "treasure5" => "/assets/sounds/Rise06.wav",
        "treasure6" => "/assets/sounds/Rise07.wav",
        _ => return None,
    })
}

/// Background music tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BgmTrack {
    Bgm1,
    Bgm2,
    Bgm3,
    Bgm4,
    Bgm5,
    Bgm6,
    Bgm7,
}

impl BgmTrack {
    pub const ALL: [BgmTrack; 7] = [
        BgmTrack::Bgm1,
        BgmTrack::Bgm2,
        BgmTrack::Bgm3,
        BgmTrack::Bgm4,
        BgmTrack::Bgm5,
        BgmTrack::Bgm6,
        BgmTrack::Bgm7,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            BgmTrack::Bgm1 => "bgm1",
            BgmTrack::Bgm2 => "bgm2",
            BgmTrack::Bgm3 => "bgm3",
            BgmTrack::Bgm4 => "bgm4",
            BgmTrack::Bgm5 => "bgm5",
            BgmTrack::Bgm6 => "bgm6",
            BgmTrack::Bgm7 => "bgm7",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            BgmTrack::Bgm1 => "/assets/sounds/bgm1.mp3",
            BgmTrack::Bgm2 => "/assets/sounds/bgm2.wav",
            BgmTrack::Bgm3 => "/assets/sounds/bgm3.mp3",
            BgmTrack::Bgm4 => "/assets/sounds/bgm4.mp3",
            BgmTrack::Bgm5 => "/assets/sounds/bgm5.mp3",
            BgmTrack::Bgm6 => "/assets/sounds/bgm6.mp3",
            BgmTrack::Bgm7 => "/assets/sounds/bgm7.mp3",
        }
    }

    /// Two tracks are mastered louder and play quieter
    pub fn volume(&self) -> f32 {
        match self {
            BgmTrack::Bgm5 | BgmTrack::Bgm6 => 0.3,
            _ => 0.4,
        }
    }
}

/// Pick a random track, never repeating `previous`
pub fn pick_background_track<R: Rng + ?Sized>(previous: Option<BgmTrack>, rng: &mut R) -> BgmTrack {
    let candidates: Vec<BgmTrack> = BgmTrack::ALL
        .iter()
        .copied()
        .filter(|t| Some(*t) != previous)
        .collect();
    candidates.choose(rng).copied().unwrap_or(BgmTrack::Bgm1)
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use web_sys::HtmlAudioElement;

    use super::{BgmTrack, SoundCue, sample_path};
    use crate::settings::Settings;

    /// Plays cues and music with `<audio>` elements
    pub struct AudioManager {
        music: Option<HtmlAudioElement>,
        master_volume: f32,
        sfx_volume: f32,
        music_volume: f32,
        muted: bool,
        rng: Pcg32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings, seed: u64) -> Self {
            Self {
                music: None,
                master_volume: settings.master_volume,
                sfx_volume: settings.sfx_volume,
                music_volume: settings.music_volume,
                muted: settings.muted,
                rng: Pcg32::seed_from_u64(seed),
            }
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
            if let Some(music) = &self.music {
                music.set_muted(muted);
            }
        }

        pub fn is_muted(&self) -> bool {
            self.muted
        }

        /// Play one random sample of `cue`
        pub fn play(&mut self, cue: SoundCue) {
            if self.muted {
                return;
            }
            let key = cue.pick_key(&mut self.rng);
            let Some(path) = sample_path(key) else {
                log::warn!("No sample for sound key {key}");
                return;
            };
            match HtmlAudioElement::new_with_src(path) {
                Ok(el) => {
                    el.set_volume((cue.volume() * self.master_volume * self.sfx_volume) as f64);
                    if let Err(e) = el.play() {
                        log::warn!("Failed to play {key}: {e:?}");
                    }
                }
                Err(e) => log::warn!("Failed to create audio element for {key}: {e:?}"),
            }
        }

        /// Loop `track`, replacing whatever was playing
        pub fn play_music(&mut self, track: BgmTrack) {
            self.stop_music();
            match HtmlAudioElement::new_with_src(track.path()) {
                Ok(el) => {
                    el.set_loop(true);
                    el.set_muted(self.muted);
                    el.set_volume((track.volume() * self.master_volume * self.music_volume) as f64);
                    // Autoplay may be blocked until the first user gesture
                    if let Err(e) = el.play() {
                        log::warn!("Music autoplay blocked: {e:?}");
                    }
                    self.music = Some(el);
                    log::info!("Playing {}", track.key());
                }
                Err(e) => log::warn!("Failed to load {}: {e:?}", track.key()),
            }
        }

        /// Retry music after a user gesture unlocked audio
        pub fn resume(&self) {
            if let Some(music) = &self.music
                && music.paused()
            {
                let _ = music.play();
            }
        }

        pub fn stop_music(&mut self) {
            if let Some(music) = self.music.take() {
                let _ = music.pause();
            }
        }
    }
}
