//! Cryptbound - simulation core for a two-player co-op action platformer
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (physics, collisions, AI, combat, game state)
//!
//! Rendering, input capture, and persistence live outside this crate; the
//! external driver feeds held-input flags into [`sim::InputState`], calls
//! [`sim::tick`] once per display frame, and reads back the entity/particle
//! collections plus a [`sim::Metrics`] record.

pub mod sim;

/// Game configuration constants
pub mod consts {
    /// Arena dimensions (pixels, top-left origin, y grows downward)
    pub const ARENA_WIDTH: f32 = 3000.0;
    pub const ARENA_HEIGHT: f32 = 1500.0;
    /// Entities falling this far below the arena die (fall-death)
    pub const FALL_DEATH_MARGIN: f32 = 100.0;

    /// Core movement physics (per-frame units)
    pub const GRAVITY: f32 = 0.6;
    pub const FRICTION: f32 = 0.8;
    /// Velocity decay applied while stunned
    pub const STUN_FRICTION: f32 = 0.9;
    pub const ACCELERATION: f32 = 1.5;
    pub const MOVE_SPEED: f32 = 10.0;
    pub const JUMP_FORCE: f32 = -16.0;

    /// Solid-collision tolerances. Asymmetric on purpose: landing is more
    /// forgiving than head bonks.
    pub const LANDING_TOLERANCE: f32 = 15.0;
    pub const CEILING_TOLERANCE: f32 = 10.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 40.0;
    pub const PLAYER_MAX_HP: i32 = 100;
    /// Frames (approx 0.5s at 60fps)
    pub const PARRY_DURATION: u32 = 30;
    pub const ATTACK_DURATION: u32 = 20;
    pub const ATTACK_COOLDOWN: u32 = 40;
    pub const SWORD_RANGE: f32 = 80.0;
    pub const SWORD_DAMAGE: i32 = 40;
    pub const SHIELD_DAMAGE: i32 = 10;
    /// Pixel distance between player centers for the double-damage link
    pub const COOP_LINK_DISTANCE: f32 = 300.0;

    /// Stun / invulnerability windows (frames)
    pub const HURT_STUN: u32 = 20;
    pub const SPIKE_STUN: u32 = 30;
    pub const SWORD_STUN: u32 = 10;
    pub const PARRY_STUN: u32 = 20;

    /// Knockback impulses
    pub const CONTACT_KNOCKBACK: f32 = 12.0;
    pub const CONTACT_LIFT: f32 = -6.0;
    pub const SPIKE_KNOCKBACK: f32 = 8.0;
    pub const SPIKE_LIFT: f32 = -12.0;
    pub const SWORD_KNOCKBACK: f32 = 10.0;
    pub const PARRY_KNOCKBACK: f32 = 20.0;

    /// Contact damage by hostile type
    pub const DMG_NORMAL: i32 = 15;
    pub const DMG_BOMB: i32 = 30;
    pub const DMG_SPIKE: i32 = 10;
    pub const DMG_FLYER: i32 = 10;
    pub const DMG_BOSS_TOUCH: i32 = 20;
    pub const DMG_BOSS_LASER: i32 = 1;
    /// Spikes vs ground hostiles: flat damage, rate limited
    pub const SPIKE_DAMAGE_TO_ENEMY: i32 = 30;
    pub const SPIKE_ENEMY_INTERVAL: u64 = 30;

    /// Enemy defaults
    pub const ENEMY_SIZE: f32 = 40.0;
    pub const ENEMY_NORMAL_HP: i32 = 30;
    pub const ENEMY_BOMB_HP: i32 = 1;
    pub const ENEMY_FLYER_HP: i32 = 20;
    pub const ENEMY_NORMAL_SPEED: f32 = 4.0;
    pub const ENEMY_BOMB_SPEED: f32 = 6.0;
    pub const FLYER_SPEED: f32 = 5.0;
    /// Exponential steering blend per frame for flyers
    pub const FLYER_SMOOTHING: f32 = 0.1;
    /// Pairwise anti-stacking force
    pub const SEPARATION_RADIUS: f32 = 60.0;
    pub const SEPARATION_PUSH: f32 = 2.0;
    /// Forward probe for obstacle/ledge detection
    pub const PROBE_LOOKAHEAD: f32 = 40.0;
    /// Death animation length (frames)
    pub const DYING_DURATION: u32 = 30;

    /// Bomb enemy
    pub const BOMB_TRIGGER_RANGE: f32 = 100.0;
    pub const BOMB_FUSE: u32 = 60;
    /// Blast rect extends this far beyond the bomb on every side
    pub const BOMB_BLAST_PAD: f32 = 100.0;
    /// Contact with an exploding bomb only hurts in the last frames of the fuse
    pub const BOMB_FINAL_WINDOW: u32 = 5;

    /// Boss
    pub const BOSS_SIZE: f32 = 200.0;
    pub const BOSS_HP: i32 = 2000;
    pub const BOSS_SMASH_DURATION: u32 = 120;
    pub const BOSS_LASER_DURATION: u32 = 180;
    pub const BOSS_CHARGE_DURATION: u32 = 120;
    pub const BOSS_CHARGE_SPEED: f32 = 8.0;
    pub const BOSS_SMASH_LAUNCH: f32 = -25.0;
    /// Proportional horizontal steering toward the target while airborne
    pub const BOSS_SMASH_STEER: f32 = 0.05;
    /// Landing inside this many remaining smash frames skips the shockwave
    pub const BOSS_SMASH_SHOCK_WINDOW: u32 = 10;
    pub const BOSS_LASER_HEIGHT: f32 = 40.0;

    /// Spawning & progression
    pub const ENEMY_SPAWN_INTERVAL: u64 = 120;
    pub const BOSS_TRIGGER_SCORE: u32 = 100;

    /// Screen shake bookkeeping (read by the renderer, decayed here)
    pub const SCREEN_SHAKE_DECAY: f32 = 0.9;
    pub const SCREEN_SHAKE_MAX: f32 = 30.0;

    /// Particle cap; oldest particles are dropped first
    pub const MAX_PARTICLES: usize = 512;

    /// Cosmetic colors (0xRRGGBB)
    pub const COLOR_P1_DEFAULT: u32 = 0x3b82f6;
    pub const COLOR_P2_DEFAULT: u32 = 0xef4444;
    pub const COLOR_ENEMY_NORMAL: u32 = 0x64748b;
    pub const COLOR_ENEMY_BOMB: u32 = 0xa855f7;
    pub const COLOR_ENEMY_FLYER: u32 = 0x94a3b8;
    pub const COLOR_BOSS: u32 = 0x7f1d1d;
    pub const COLOR_PLATFORM: u32 = 0x1e293b;
    pub const COLOR_SPIKE: u32 = 0xdc2626;
    pub const COLOR_WHITE: u32 = 0xffffff;
    pub const COLOR_BLAST: u32 = 0xef4444;
    pub const COLOR_SHIELD_FLASH: u32 = 0x60a5fa;
    pub const COLOR_COOP_HIT: u32 = 0xfbbf24;
    pub const COLOR_SWORD_HIT: u32 = 0xfca5a5;
    pub const COLOR_PARRY_HIT: u32 = 0x93c5fd;
}
