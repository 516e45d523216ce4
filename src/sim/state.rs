//! Game state and core simulation types
//!
//! Everything a session needs lives in [`GameState`]; the presentation layer
//! only reads it (see [`super::snapshot`]) and drains its events.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::hook::{Hook, Rod};
use super::rect::Rect;
use super::scheduler::{Scheduler, TimerKind};
use super::spawn::fish_spawn_delay;
use crate::audio::{BgmTrack, pick_background_track};
use crate::consts::{DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
use crate::tuning::Tuning;

/// Entity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Fish,
    Whale,
    Treasure,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Fish, EntityKind::Whale, EntityKind::Treasure];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Fish => "fish",
            EntityKind::Whale => "whale",
            EntityKind::Treasure => "treasure",
        }
    }

    /// Sprite keys of every variant of this kind
    pub fn variants(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Fish => &["Anchova", "Corvina", "Linguado", "Pampos", "Tainha"],
            EntityKind::Whale => &["Baleia"],
            EntityKind::Treasure => &["Caveira", "Mascara", "Relogio", "Vaso", "Jarro", "Zarabatana"],
        }
    }

    /// Fish and whales hurt; treasures are caught
    pub fn is_enemy(&self) -> bool {
        !matches!(self, EntityKind::Treasure)
    }
}

/// A fish, whale or treasure crossing the screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    /// Index into [`EntityKind::variants`]
    pub variant: u8,
    /// Center position
    pub pos: Vec2,
    /// Signed horizontal speed in px/s (negative moves left)
    pub speed: f32,
    /// Hitbox size, centered on `pos`
    pub hitbox: Vec2,
    /// Treasure is hanging from the hook
    pub caught: bool,
    /// Points awarded on collection (treasures only)
    pub value: u32,
}

impl Entity {
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.pos, self.hitbox)
    }

    pub fn sprite_key(&self) -> &'static str {
        let variants = self.kind.variants();
        variants[self.variant as usize % variants.len()]
    }

    /// Sprite is mirrored when swimming right-to-left
    pub fn faces_left(&self) -> bool {
        self.speed < 0.0
    }

    /// Integrate horizontal motion
    pub fn advance(&mut self, dt: f32) {
        self.pos.x += self.speed * dt;
    }

    /// Past the far edge of a `width`-wide screen by more than `margin`
    pub fn is_offscreen(&self, width: f32, margin: f32) -> bool {
        (self.speed > 0.0 && self.pos.x > width + margin) || (self.speed < 0.0 && self.pos.x < -margin)
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    Timeout,
    LivesDepleted,
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Frozen by the player; no timers run
    Paused,
    /// Terminal until restart
    Ended(EndReason),
}

/// End screen selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Enough treasure and still alive
    Won,
    /// Ran out of lives
    LostToEnemies,
    /// Survived but short of the target score
    LostToTime,
}

impl Outcome {
    pub fn decide(score: u32, lives: u8, win_score: u32) -> Self {
        if score >= win_score && lives > 0 {
            Outcome::Won
        } else if lives == 0 {
            Outcome::LostToEnemies
        } else {
            Outcome::LostToTime
        }
    }

    /// End screen body text
    pub fn message(&self, score: u32) -> String {
        match self {
            Outcome::Won => format!(
                "Parabéns Pescador! \nVocê resgatou todos\n os tesouros do museu!\n\nPontuação Final: {score}\n\nClique para jogar novamente"
            ),
            Outcome::LostToEnemies => {
                "Você pescou muitos \npeixes. \n\nClique para jogar novamente".to_string()
            }
            Outcome::LostToTime => {
                "Você não pescou \ntesouros o suficiente. \n\nClique para jogar novamente".to_string()
            }
        }
    }
}

impl EndReason {
    pub fn title(&self) -> &'static str {
        match self {
            EndReason::Timeout => "TEMPO ESGOTADO!",
            EndReason::LivesDepleted => "GAME OVER",
        }
    }
}

/// Things that happened during a tick, for the audio and presentation layers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    SessionStarted { track: BgmTrack },
    Spawned { id: u32, kind: EntityKind },
    Despawned { id: u32 },
    /// Hook touched an enemy; floating "-1" and a grunt
    Damaged { by: EntityKind, lives_left: u8 },
    /// Rod started lowering (splash sound)
    Splash,
    /// Catch clip started
    CatchStarted,
    TreasureHooked { id: u32 },
    /// Treasure banked; floating "+value" and the treasure banner
    TreasureCollected { id: u32, sprite: &'static str, value: u32 },
    TimeTick { remaining: u32 },
    /// Countdown reached the urgent threshold
    HurryUp,
    Paused,
    Resumed,
    Ended { reason: EndReason, outcome: Outcome },
}

/// Viewport dimensions in px
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Inputs for starting a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    pub seed: u64,
    pub viewport: Viewport,
    /// Track of the session before this one, never picked twice in a row
    pub previous_track: Option<BgmTrack>,
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete game state for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub viewport: Viewport,
    /// Fixed fisherman position
    pub player: Vec2,
    pub lives: u8,
    pub score: u32,
    /// Whole seconds left on the countdown
    pub time_remaining: u32,
    pub invulnerable: bool,
    pub invulnerability_elapsed_ms: f32,
    pub phase: GamePhase,
    /// Set once the session ends
    pub outcome: Option<Outcome>,
    pub hook: Hook,
    pub rod: Rod,
    /// Active entities (sorted by id)
    pub entities: Vec<Entity>,
    /// Id of the treasure on the hook, if any
    pub caught_treasure: Option<u32>,
    pub scheduler: Scheduler,
    /// Game time of the last splash sound
    pub last_splash_ms: f64,
    pub bgm_track: BgmTrack,
    /// Pending events, drained by the host each frame
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    #[serde(skip, default = "default_rng")]
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Start a session with default tuning
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_tuning(config, Tuning::default())
    }

    /// Start a session: full lives and clock, empty sea, timers armed.
    /// A sheet that fails [`Tuning::validate`] is replaced by the defaults.
    pub fn with_tuning(config: &SessionConfig, tuning: Tuning) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("Invalid tuning ({e}), using defaults");
                Tuning::default()
            }
        };
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let viewport = config.viewport;
        let player = Vec2::new(viewport.width / 2.0, viewport.height * tuning.player_anchor_y);
        let hook = Hook::new(
            viewport.size() / 2.0,
            Hook::movement_bounds(viewport.size(), player, &tuning),
            tuning.hook_size,
        );
        let bgm_track = pick_background_track(config.previous_track, &mut rng);

        let mut scheduler = Scheduler::new();
        scheduler.once(
            fish_spawn_delay(tuning.session_seconds, &tuning),
            TimerKind::FishSpawn,
        );
        scheduler.every(tuning.whale_interval_ms, TimerKind::WhaleSpawn);
        scheduler.every(tuning.treasure_interval_ms, TimerKind::TreasureSpawn);
        scheduler.every(tuning.countdown_interval_ms, TimerKind::Countdown);

        log::info!(
            "Session started: seed={} viewport={}x{} track={}",
            config.seed,
            viewport.width,
            viewport.height,
            bgm_track.key()
        );

        Self {
            seed: config.seed,
            viewport,
            player,
            lives: tuning.starting_lives,
            score: 0,
            time_remaining: tuning.session_seconds,
            invulnerable: false,
            invulnerability_elapsed_ms: 0.0,
            phase: GamePhase::Playing,
            outcome: None,
            hook,
            rod: Rod::new(player),
            entities: Vec::new(),
            caught_treasure: None,
            scheduler,
            last_splash_ms: -tuning.splash_cooldown_ms,
            bgm_track,
            events: vec![GameEvent::SessionStarted { track: bgm_track }],
            rng,
            next_id: 1,
            tuning,
        }
    }

    /// A fresh session on the same screen and tuning, with a new seed and a
    /// different background track
    pub fn restarted(&mut self) -> GameState {
        use rand::Rng;
        let config = SessionConfig {
            seed: self.rng.random(),
            viewport: self.viewport,
            previous_track: Some(self.bgm_track),
        };
        GameState::with_tuning(&config, self.tuning.clone())
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, GamePhase::Ended(_))
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        match self.phase {
            GamePhase::Ended(reason) => Some(reason),
            _ => None,
        }
    }

    /// Last 30 seconds (timer blinks, fish at full rate)
    pub fn is_urgent(&self) -> bool {
        self.time_remaining <= self.tuning.urgent_seconds
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.entities.sort_by_key(|e| e.id);
    }
}
