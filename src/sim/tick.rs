//! The per-frame simulation step
//!
//! Fixed phase order: players, enemy AI, boss AI, physics + collision,
//! combat, spawning/room progression, particles, end-state, cleanup.
//! One call per display frame; the driver owns the state and the RNG.

use glam::Vec2;
use rand::Rng;

use super::ai;
use super::collision::{resolve_solid, Contact, Rect};
use super::combat;
use super::level;
use super::state::{
    spawn_burst, BossPhase, EntityKind, FlyerPhase, GamePhase, GameState, GroundPhase, Particle,
    Payload, SessionEvent,
};
use crate::consts::*;

/// Advance the simulation by one frame.
///
/// Returns the terminal event on the frame the session ends; after that the
/// step is a no-op, so the event is observed exactly once.
pub fn tick(state: &mut GameState, rng: &mut impl Rng) -> Option<SessionEvent> {
    if state.phase != GamePhase::Playing {
        return None;
    }
    state.frame += 1;

    update_players(state, rng);
    let explosions = ai::update_enemies(state, rng);
    ai::update_boss(state, rng);
    integrate_and_collide(state, rng);
    combat::resolve(state, &explosions, rng);
    spawn_and_progress(state, rng);
    update_particles(state);
    state.screen_shake *= SCREEN_SHAKE_DECAY;

    let event = check_end_state(state);
    cleanup(state);
    event
}

/// Apply held input, timers, jumps, and attack/parry starts to both players
fn update_players(state: &mut GameState, rng: &mut impl Rng) {
    let entities = &mut state.entities;
    let particles = &mut state.particles;
    let input = &mut state.input;

    for e in entities.iter_mut() {
        let (left, right, action, jump) = match e.kind {
            EntityKind::Player1 => (
                input.p1_left,
                input.p1_right,
                input.p1_parry,
                &mut input.p1_jump,
            ),
            EntityKind::Player2 => (
                input.p2_left,
                input.p2_right,
                input.p2_attack,
                &mut input.p2_jump,
            ),
            _ => continue,
        };
        let kind = e.kind;
        let center = e.rect.center();
        let feet = e.rect.bottom();
        let grounded = e.grounded;
        let Payload::Player(p) = &mut e.payload else {
            continue;
        };

        p.attack_cooldown = p.attack_cooldown.saturating_sub(1);
        if p.attacking {
            p.attack_timer = p.attack_timer.saturating_sub(1);
            if p.attack_timer == 0 {
                p.attacking = false;
            }
        }
        if p.parrying {
            p.parry_timer = p.parry_timer.saturating_sub(1);
            if p.parry_timer == 0 {
                p.parrying = false;
            }
        }

        if p.hurt_timer > 0 {
            // Stunned: no control, jump requests stay latched
            p.hurt_timer -= 1;
            e.vel.x *= STUN_FRICTION;
            continue;
        }

        if left {
            e.vel.x -= ACCELERATION;
            e.facing = -1.0;
        }
        if right {
            e.vel.x += ACCELERATION;
            e.facing = 1.0;
        }
        if !left && !right {
            e.vel.x *= FRICTION;
        }
        e.vel.x = e.vel.x.clamp(-MOVE_SPEED, MOVE_SPEED);

        if *jump {
            *jump = false;
            if p.jump_count < 2 {
                e.vel.y = JUMP_FORCE;
                p.jump_count += 1;
                let puffs = if grounded { 5 } else { 8 };
                spawn_burst(
                    particles,
                    rng,
                    Vec2::new(center.x, feet),
                    COLOR_WHITE,
                    puffs,
                    6.0,
                );
            }
        }

        match kind {
            EntityKind::Player1 => {
                if action && p.attack_cooldown == 0 && !p.parrying {
                    p.parrying = true;
                    p.parry_timer = PARRY_DURATION;
                    p.attack_cooldown = ATTACK_COOLDOWN;
                }
            }
            _ => {
                if action && p.attack_cooldown == 0 && !p.attacking {
                    p.attacking = true;
                    p.attack_timer = ATTACK_DURATION;
                    p.attack_cooldown = ATTACK_COOLDOWN;
                }
            }
        }
    }
}

/// Gravity, integration, and solid-overlap resolution for every mover.
/// Dying entities already moved during the AI phase and are skipped here.
fn integrate_and_collide(state: &mut GameState, rng: &mut impl Rng) {
    let solids: Vec<Rect> = state
        .entities
        .iter()
        .filter(|e| e.kind.is_solid())
        .map(|e| e.rect)
        .collect();

    // Smash touchdown positions, resolved after the entity borrow ends
    let mut shockwaves: Vec<Vec2> = Vec::new();

    for e in state.entities.iter_mut() {
        if e.kind.is_solid() || e.is_dying() {
            continue;
        }
        if e.kind != EntityKind::EnemyFlyer {
            e.vel.y += GRAVITY;
        }
        e.rect.x += e.vel.x;
        e.rect.y += e.vel.y;

        let was_airborne = !e.grounded;
        e.grounded = false;
        for solid in &solids {
            if !e.rect.overlaps(solid) {
                continue;
            }
            if resolve_solid(&mut e.rect, &mut e.vel, solid) == Contact::Landed {
                e.grounded = true;
                match &mut e.payload {
                    Payload::Player(p) => p.jump_count = 0,
                    Payload::Boss(b) => {
                        // Smash touchdown early in the window raises a shockwave
                        if was_airborne
                            && b.phase == BossPhase::Smash
                            && b.timer > BOSS_SMASH_SHOCK_WINDOW
                        {
                            shockwaves.push(Vec2::new(e.rect.center().x, e.rect.bottom()));
                        }
                    }
                    _ => {}
                }
            }
        }

        // Fallen out of the arena
        if e.kind != EntityKind::Boss && e.rect.y > ARENA_HEIGHT + FALL_DEATH_MARGIN {
            e.hp = 0;
        }
    }

    for pos in shockwaves {
        spawn_burst(&mut state.particles, rng, pos, COLOR_WHITE, 30, 14.0);
        state.add_shake(20.0);
    }
}

/// Timed enemy spawning and room-clear progression. Disabled for good once
/// the boss arena is entered.
fn spawn_and_progress(state: &mut GameState, rng: &mut impl Rng) {
    if state.boss_spawned {
        return;
    }
    if state.enemies_spawned < state.enemies_target && state.frame % ENEMY_SPAWN_INTERVAL == 0 {
        level::spawn_random_enemy(state, rng);
    }
    let room_clear =
        state.enemies_spawned >= state.enemies_target && state.active_enemy_count() == 0;
    if room_clear {
        if state.score >= BOSS_TRIGGER_SCORE {
            level::generate_boss_arena(state, rng);
        } else {
            let next = state.wave + 1;
            level::generate_level(state, next, rng);
        }
    }
}

fn update_particles(state: &mut GameState) {
    for p in state.particles.iter_mut() {
        p.pos += p.vel;
        p.life = p.life.saturating_sub(1);
    }
    state.particles.retain(|p: &Particle| p.life > 0);
}

/// Victory (boss down) takes precedence over defeat (both players gone)
fn check_end_state(state: &mut GameState) -> Option<SessionEvent> {
    let boss_down = state
        .find_kind(EntityKind::Boss)
        .map(|i| state.entities[i].hp <= 0)
        .unwrap_or(false);
    if boss_down {
        state.phase = GamePhase::Victory;
        log::info!("boss defeated, session won at frame {}", state.frame);
        return Some(SessionEvent::Victory);
    }
    let any_player_alive = state
        .entities
        .iter()
        .any(|e| e.kind.is_player() && e.hp > 0);
    if !any_player_alive {
        state.phase = GamePhase::Defeat;
        log::info!("both players down, session lost at frame {}", state.frame);
        return Some(SessionEvent::Defeat);
    }
    None
}

/// Drop dead entities and expired corpses
fn cleanup(state: &mut GameState) {
    state.entities.retain(|e| {
        if e.kind.is_solid() {
            return true;
        }
        match &e.payload {
            Payload::Ground(g) => match g.phase {
                GroundPhase::Dying { timer } => timer > 0,
                _ => e.hp > 0,
            },
            Payload::Flyer(f) => match f.phase {
                FlyerPhase::Dying { timer } => timer > 0,
                _ => e.hp > 0,
            },
            _ => e.hp > 0,
        }
    });
}
