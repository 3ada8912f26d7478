//! Game state and core simulation types
//!
//! Everything the per-frame step mutates lives in one explicit
//! [`GameState`] owned by the external driver. Entities share a common
//! rectangle/kinematics/health record plus a type-tagged payload, so the
//! single-collection iteration model survives while each variant gets
//! compile-time-checked fields.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;

/// Closed set of simulated object types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Shield bearer (parry)
    Player1,
    /// Sword bearer (melee swing)
    Player2,
    EnemyNormal,
    EnemyBomb,
    EnemyFlyer,
    Boss,
    Platform,
    Spike,
}

impl EntityKind {
    pub fn is_player(self) -> bool {
        matches!(self, EntityKind::Player1 | EntityKind::Player2)
    }

    pub fn is_enemy(self) -> bool {
        matches!(
            self,
            EntityKind::EnemyNormal | EntityKind::EnemyBomb | EntityKind::EnemyFlyer
        )
    }

    /// Enemies plus the boss
    pub fn is_hostile(self) -> bool {
        self.is_enemy() || self == EntityKind::Boss
    }

    /// Immovable geometry; never integrated, blocks movement
    pub fn is_solid(self) -> bool {
        matches!(self, EntityKind::Platform | EntityKind::Spike)
    }
}

/// Player-specific state
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlayerState {
    /// 0 grounded, 1 after a ground jump, 2 after the air jump
    pub jump_count: u8,
    /// Stun + invulnerability window, counts down to 0
    pub hurt_timer: u32,
    /// Shared cooldown for parry/attack
    pub attack_cooldown: u32,
    pub attacking: bool,
    pub attack_timer: u32,
    pub parrying: bool,
    pub parry_timer: u32,
}

/// Behavioral phase for ground enemies (Normal, Bomb)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroundPhase {
    Chasing,
    /// Bomb only: rooted in place while the fuse burns down
    Exploding { fuse: u32 },
    Dying { timer: u32 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GroundState {
    pub hurt_timer: u32,
    pub phase: GroundPhase,
    /// Cosmetic claw-swipe flag, set near a target
    pub attacking: bool,
}

impl Default for GroundState {
    fn default() -> Self {
        Self {
            hurt_timer: 0,
            phase: GroundPhase::Chasing,
            attacking: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlyerPhase {
    Drifting,
    Dying { timer: u32 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlyerState {
    pub hurt_timer: u32,
    pub phase: FlyerPhase,
    pub attacking: bool,
}

impl Default for FlyerState {
    fn default() -> Self {
        Self {
            hurt_timer: 0,
            phase: FlyerPhase::Drifting,
            attacking: false,
        }
    }
}

/// Boss attack states. The boss never enters a generic dying phase; hp <= 0
/// is detected by the frame step and ends the session in victory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    Idle,
    Smash,
    Laser,
    Charge,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BossState {
    pub phase: BossPhase,
    /// Frames remaining in the current phase
    pub timer: u32,
    pub hurt_timer: u32,
}

impl Default for BossState {
    fn default() -> Self {
        Self {
            phase: BossPhase::Idle,
            timer: 0,
            hurt_timer: 0,
        }
    }
}

/// Type-specific payload selected by [`EntityKind`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Payload {
    Player(PlayerState),
    Ground(GroundState),
    Flyer(FlyerState),
    Boss(BossState),
    Static,
}

/// The universal simulated object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub rect: Rect,
    pub vel: Vec2,
    /// Recomputed every frame before collision resolution
    pub grounded: bool,
    pub hp: i32,
    pub max_hp: i32,
    /// 1.0 right, -1.0 left
    pub facing: f32,
    /// Cosmetic, 0xRRGGBB
    pub color: u32,
    pub payload: Payload,
}

impl Entity {
    pub fn player(id: u32, kind: EntityKind, x: f32, y: f32, color: u32) -> Self {
        debug_assert!(kind.is_player());
        Self {
            id,
            kind,
            rect: Rect::new(x, y, PLAYER_SIZE, PLAYER_SIZE),
            vel: Vec2::ZERO,
            grounded: false,
            hp: PLAYER_MAX_HP,
            max_hp: PLAYER_MAX_HP,
            facing: if kind == EntityKind::Player1 { 1.0 } else { -1.0 },
            color,
            payload: Payload::Player(PlayerState::default()),
        }
    }

    pub fn platform(id: u32, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            id,
            kind: EntityKind::Platform,
            rect: Rect::new(x, y, w, h),
            vel: Vec2::ZERO,
            grounded: true,
            hp: 1,
            max_hp: 1,
            facing: 1.0,
            color: COLOR_PLATFORM,
            payload: Payload::Static,
        }
    }

    pub fn spike(id: u32, x: f32, y: f32, w: f32) -> Self {
        Self {
            id,
            kind: EntityKind::Spike,
            rect: Rect::new(x, y, w, 30.0),
            vel: Vec2::ZERO,
            grounded: true,
            hp: 1,
            max_hp: 1,
            facing: 1.0,
            color: COLOR_SPIKE,
            payload: Payload::Static,
        }
    }

    pub fn enemy(id: u32, kind: EntityKind, x: f32, y: f32, facing: f32) -> Self {
        debug_assert!(kind.is_enemy());
        let (hp, color, payload) = match kind {
            EntityKind::EnemyNormal => (
                ENEMY_NORMAL_HP,
                COLOR_ENEMY_NORMAL,
                Payload::Ground(GroundState::default()),
            ),
            EntityKind::EnemyBomb => (
                ENEMY_BOMB_HP,
                COLOR_ENEMY_BOMB,
                Payload::Ground(GroundState::default()),
            ),
            _ => (
                ENEMY_FLYER_HP,
                COLOR_ENEMY_FLYER,
                Payload::Flyer(FlyerState::default()),
            ),
        };
        Self {
            id,
            kind,
            rect: Rect::new(x, y, ENEMY_SIZE, ENEMY_SIZE),
            vel: Vec2::ZERO,
            grounded: false,
            hp,
            max_hp: hp,
            facing,
            color,
            payload,
        }
    }

    pub fn boss(id: u32, x: f32, y: f32) -> Self {
        Self {
            id,
            kind: EntityKind::Boss,
            rect: Rect::new(x, y, BOSS_SIZE, BOSS_SIZE),
            vel: Vec2::ZERO,
            grounded: false,
            hp: BOSS_HP,
            max_hp: BOSS_HP,
            facing: 1.0,
            color: COLOR_BOSS,
            payload: Payload::Boss(BossState::default()),
        }
    }

    /// Current stun window; 0 for statics
    pub fn hurt_timer(&self) -> u32 {
        match &self.payload {
            Payload::Player(p) => p.hurt_timer,
            Payload::Ground(g) => g.hurt_timer,
            Payload::Flyer(f) => f.hurt_timer,
            Payload::Boss(b) => b.hurt_timer,
            Payload::Static => 0,
        }
    }

    pub fn set_hurt_timer(&mut self, frames: u32) {
        match &mut self.payload {
            Payload::Player(p) => p.hurt_timer = frames,
            Payload::Ground(g) => g.hurt_timer = frames,
            Payload::Flyer(f) => f.hurt_timer = frames,
            Payload::Boss(b) => b.hurt_timer = frames,
            Payload::Static => {}
        }
    }

    pub fn is_dying(&self) -> bool {
        matches!(
            self.payload,
            Payload::Ground(GroundState {
                phase: GroundPhase::Dying { .. },
                ..
            }) | Payload::Flyer(FlyerState {
                phase: FlyerPhase::Dying { .. },
                ..
            })
        )
    }

    /// Begin the death animation. No-op for players, boss, and statics;
    /// those die through their own paths.
    pub fn start_dying(&mut self, frames: u32) {
        match &mut self.payload {
            Payload::Ground(g) => g.phase = GroundPhase::Dying { timer: frames },
            Payload::Flyer(f) => f.phase = FlyerPhase::Dying { timer: frames },
            _ => {}
        }
    }

    pub fn player_state(&self) -> Option<&PlayerState> {
        match &self.payload {
            Payload::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn player_state_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.payload {
            Payload::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn boss_state(&self) -> Option<&BossState> {
        match &self.payload {
            Payload::Boss(b) => Some(b),
            _ => None,
        }
    }

    pub fn boss_state_mut(&mut self) -> Option<&mut BossState> {
        match &mut self.payload {
            Payload::Boss(b) => Some(b),
            _ => None,
        }
    }
}

/// A cosmetic particle; no gameplay feedback into the simulation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Frames remaining
    pub life: u32,
    pub max_life: u32,
    pub color: u32,
    pub size: f32,
}

/// Push a burst of feedback particles, dropping the oldest past the cap
pub fn spawn_burst(
    particles: &mut Vec<Particle>,
    rng: &mut impl Rng,
    pos: Vec2,
    color: u32,
    count: usize,
    speed: f32,
) {
    for _ in 0..count {
        if particles.len() >= MAX_PARTICLES {
            particles.remove(0);
        }
        particles.push(Particle {
            pos,
            vel: Vec2::new(
                (rng.random_range(0.0..1.0f32) - 0.5) * speed,
                (rng.random_range(0.0..1.0f32) - 0.5) * speed,
            ),
            life: 40 + rng.random_range(0..20),
            max_life: 60,
            color,
            size: 3.0 + rng.random_range(0.0..5.0),
        });
    }
}

/// Held logical action flags plus one-shot jump latches.
///
/// The driver sets held flags from its input device layer and latches a jump
/// on key *press* (edge), not while held; the step clears a latch when it
/// consumes it, so a held key never turns into continuous jumping.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InputState {
    pub p1_left: bool,
    pub p1_right: bool,
    pub p1_parry: bool,
    pub p2_left: bool,
    pub p2_right: bool,
    pub p2_attack: bool,
    pub p1_jump: bool,
    pub p2_jump: bool,
}

impl InputState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Victory,
    Defeat,
}

/// Terminal transition, signaled exactly once per session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Victory,
    Defeat,
}

/// Per-frame state report consumed by the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Clamped at 0; a dead/removed player reports 0
    pub p1_health: i32,
    pub p2_health: i32,
    pub score: u32,
    pub wave: u32,
    pub boss_hp: Option<i32>,
    pub boss_max_hp: Option<i32>,
}

/// Cosmetic per-session configuration, supplied once at session start
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionConfig {
    pub p1_color: u32,
    pub p2_color: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            p1_color: COLOR_P1_DEFAULT,
            p2_color: COLOR_P2_DEFAULT,
        }
    }
}

/// Complete mutable session state, owned by the simulation driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    /// Frame counter since session start
    pub frame: u64,
    pub score: u32,
    /// Current room number, 1-based
    pub wave: u32,
    /// Latched true by the boss arena; permanently disables room spawning
    pub boss_spawned: bool,
    pub enemies_spawned: u32,
    pub enemies_target: u32,
    /// Shake magnitude requested of the renderer; decays every frame
    pub screen_shake: f32,
    pub input: InputState,
    pub entities: Vec<Entity>,
    pub particles: Vec<Particle>,
    pub p1_color: u32,
    pub p2_color: u32,
    next_id: u32,
}

impl GameState {
    /// Fresh, empty session state. Use [`super::level::start_session`] for a
    /// fully initialized room-1 session.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            phase: GamePhase::Playing,
            frame: 0,
            score: 0,
            wave: 1,
            boss_spawned: false,
            enemies_spawned: 0,
            enemies_target: 20,
            screen_shake: 0.0,
            input: InputState::default(),
            entities: Vec::new(),
            particles: Vec::new(),
            p1_color: config.p1_color,
            p2_color: config.p2_color,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Index of the first entity of the given kind, dead or alive
    pub fn find_kind(&self, kind: EntityKind) -> Option<usize> {
        self.entities.iter().position(|e| e.kind == kind)
    }

    /// Index of a living, non-dying entity of the given kind
    pub fn find_living(&self, kind: EntityKind) -> Option<usize> {
        self.entities
            .iter()
            .position(|e| e.kind == kind && e.hp > 0 && !e.is_dying())
    }

    /// Enemies that still count against room clear
    pub fn active_enemy_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.kind.is_enemy() && e.hp > 0 && !e.is_dying())
            .count()
    }

    pub fn add_shake(&mut self, amount: f32) {
        self.screen_shake = (self.screen_shake + amount).min(SCREEN_SHAKE_MAX);
    }

    /// Report health, score, wave, and boss hp for the UI layer
    pub fn metrics(&self) -> Metrics {
        let health = |kind| {
            self.find_kind(kind)
                .map(|i| self.entities[i].hp.max(0))
                .unwrap_or(0)
        };
        let boss = self.find_kind(EntityKind::Boss).map(|i| &self.entities[i]);
        Metrics {
            p1_health: health(EntityKind::Player1),
            p2_health: health(EntityKind::Player2),
            score: self.score,
            wave: self.wave,
            boss_hp: boss.map(|b| b.hp.max(0)),
            boss_max_hp: boss.map(|b| b.max_hp),
        }
    }
}
