//! Combat resolution: sword, shield, contact, blasts, spikes, laser
//!
//! Runs after physics so all hit tests see settled positions. Each rule
//! gathers its reads from snapshots before writing, so resolution order
//! within a rule never depends on entity ordering.

use rand::Rng;

use super::ai::Explosion;
use super::collision::Rect;
use super::state::{spawn_burst, BossPhase, Entity, EntityKind, GameState, Payload};
use crate::consts::*;

/// Read-only view of a player taken before any rule writes
#[derive(Debug, Clone, Copy)]
struct PlayerView {
    idx: usize,
    rect: Rect,
    facing: f32,
    parrying: bool,
    attacking: bool,
    hurt: u32,
}

fn player_view(state: &GameState, kind: EntityKind) -> Option<PlayerView> {
    let idx = state.find_kind(kind)?;
    let e = &state.entities[idx];
    if e.hp <= 0 {
        return None;
    }
    let p = e.player_state()?;
    Some(PlayerView {
        idx,
        rect: e.rect,
        facing: e.facing,
        parrying: p.parrying,
        attacking: p.attacking,
        hurt: p.hurt_timer,
    })
}

/// Damage multiplier: doubled while both players are alive and close
fn coop_multiplier(p1: Option<&PlayerView>, p2: Option<&PlayerView>) -> i32 {
    match (p1, p2) {
        (Some(a), Some(b)) if a.rect.center().distance(b.rect.center()) < COOP_LINK_DISTANCE => 2,
        _ => 1,
    }
}

/// Sword swing hitbox on the facing side of the player
fn sword_hitbox(p: &PlayerView) -> Rect {
    let x = if p.facing > 0.0 {
        p.rect.right()
    } else {
        p.rect.x - SWORD_RANGE
    };
    Rect::new(x, p.rect.y - 10.0, SWORD_RANGE, p.rect.h + 20.0)
}

/// Apply damage to a hostile. Enemies dropping to 0 hp enter the death
/// animation and count as a kill; the boss only ever loses hp.
fn hurt_hostile(e: &mut Entity, dmg: i32) -> bool {
    e.hp -= dmg;
    if e.kind != EntityKind::Boss && e.hp <= 0 && !e.is_dying() {
        e.start_dying(DYING_DURATION);
        true
    } else {
        false
    }
}

/// Resolve one frame of combat. `explosions` are the detonations collected
/// by the AI phase this frame.
pub(crate) fn resolve(state: &mut GameState, explosions: &[Explosion], rng: &mut impl Rng) {
    let p1 = player_view(state, EntityKind::Player1);
    let p2 = player_view(state, EntityKind::Player2);
    let mult = coop_multiplier(p1.as_ref(), p2.as_ref());

    sword_hits(state, p2, mult, rng);
    contact_and_parry(state, p1, p2, mult, rng);
    blast_damage(state, explosions);
    spike_damage(state);
    laser_damage(state, p1);
}

/// Sword swings damage every overlapped hostile each frame of the swing
fn sword_hits(state: &mut GameState, p2: Option<PlayerView>, mult: i32, rng: &mut impl Rng) {
    let Some(p2) = p2.filter(|p| p.attacking) else {
        return;
    };
    let hitbox = sword_hitbox(&p2);

    let entities = &mut state.entities;
    let particles = &mut state.particles;
    for e in entities.iter_mut() {
        if !e.kind.is_hostile() || e.hp <= 0 || e.is_dying() || !hitbox.overlaps(&e.rect) {
            continue;
        }
        let center = e.rect.center();
        if e.kind == EntityKind::EnemyBomb {
            // Defused: dies without detonating
            e.hp = 0;
            e.start_dying(DYING_DURATION);
            state.score += 1;
            spawn_burst(particles, rng, center, COLOR_SWORD_HIT, 8, 10.0);
            continue;
        }
        let killed = hurt_hostile(e, SWORD_DAMAGE * mult);
        e.set_hurt_timer(SWORD_STUN);
        if e.kind != EntityKind::Boss {
            e.vel.x += p2.facing * SWORD_KNOCKBACK;
        }
        if killed {
            state.score += 1;
        }
        let color = if mult > 1 { COLOR_COOP_HIT } else { COLOR_SWORD_HIT };
        spawn_burst(particles, rng, center, color, 6, 10.0);
        state.screen_shake = (state.screen_shake + 5.0).min(SCREEN_SHAKE_MAX);
    }
}

/// Effect of one hostile/player contact, gathered before any writes
#[derive(Debug, Clone, Copy)]
struct ContactHit {
    player_idx: usize,
    hostile_idx: usize,
    dmg: i32,
    /// +1 knocks the player right
    dir: f32,
}

/// Hostile bodies vs players: the raised shield turns contact into shield
/// damage on the attacker; otherwise the player takes typed contact damage
/// while outside the invulnerability window.
fn contact_and_parry(
    state: &mut GameState,
    p1: Option<PlayerView>,
    p2: Option<PlayerView>,
    mult: i32,
    rng: &mut impl Rng,
) {
    let players: Vec<PlayerView> = [p1, p2].into_iter().flatten().collect();

    let mut parried: Vec<usize> = Vec::new();
    let mut hits: Vec<ContactHit> = Vec::new();

    for (hostile_idx, e) in state.entities.iter().enumerate() {
        if !e.kind.is_hostile() || e.hp <= 0 || e.is_dying() {
            continue;
        }
        for p in &players {
            if !e.rect.overlaps(&p.rect) {
                continue;
            }
            let p1_shield = p1.map(|v| v.idx) == Some(p.idx) && p.parrying;
            if p1_shield {
                parried.push(hostile_idx);
                continue;
            }
            if p.hurt > 0 {
                continue;
            }
            let dmg = match e.kind {
                EntityKind::EnemyNormal => DMG_NORMAL,
                EntityKind::EnemyFlyer => DMG_FLYER,
                EntityKind::Boss => DMG_BOSS_TOUCH,
                EntityKind::EnemyBomb => {
                    // An armed bomb only hurts in the last frames of its fuse
                    match e.payload {
                        Payload::Ground(g) => match g.phase {
                            super::state::GroundPhase::Exploding { fuse }
                                if fuse < BOMB_FINAL_WINDOW =>
                            {
                                DMG_BOMB
                            }
                            _ => continue,
                        },
                        _ => continue,
                    }
                }
                _ => continue,
            };
            let dir = (p.rect.center().x - e.rect.center().x).signum();
            hits.push(ContactHit {
                player_idx: p.idx,
                hostile_idx,
                dmg,
                dir,
            });
        }
    }

    // Shield resolution
    for idx in parried {
        let facing = p1.map(|v| v.facing).unwrap_or(1.0);
        let entities = &mut state.entities;
        let particles = &mut state.particles;
        let e = &mut entities[idx];
        let center = e.rect.center();
        if e.kind == EntityKind::EnemyBomb {
            e.hp = 0;
            e.start_dying(DYING_DURATION);
            state.score += 1;
        } else {
            let killed = hurt_hostile(e, SHIELD_DAMAGE * mult);
            e.set_hurt_timer(PARRY_STUN);
            if e.kind != EntityKind::Boss {
                e.vel.x = facing * PARRY_KNOCKBACK;
            }
            if killed {
                state.score += 1;
            }
        }
        let color = if mult > 1 { COLOR_COOP_HIT } else { COLOR_PARRY_HIT };
        spawn_burst(particles, rng, center, color, 6, 10.0);
        if let Some(v) = p1 {
            // Flash at the shield itself
            spawn_burst(particles, rng, v.rect.center(), COLOR_SHIELD_FLASH, 5, 8.0);
        }
        state.add_shake(5.0);
    }

    // Contact resolution: both parties stunned, knocked apart
    for hit in hits {
        let player = &mut state.entities[hit.player_idx];
        if player.hurt_timer() > 0 {
            // Already hit by an earlier contact this frame
            continue;
        }
        player.hp -= hit.dmg;
        player.vel.x = hit.dir * CONTACT_KNOCKBACK;
        player.vel.y = CONTACT_LIFT;
        player.set_hurt_timer(HURT_STUN);

        let hostile = &mut state.entities[hit.hostile_idx];
        if hostile.kind != EntityKind::Boss {
            hostile.vel.x = -hit.dir * CONTACT_KNOCKBACK;
            hostile.vel.y = CONTACT_LIFT;
            hostile.set_hurt_timer(HURT_STUN);
        }
        state.add_shake(8.0);
    }
}

/// Bomb detonations damage players caught in the padded blast rect
fn blast_damage(state: &mut GameState, explosions: &[Explosion]) {
    for explosion in explosions {
        state.add_shake(20.0);
        for e in state.entities.iter_mut() {
            if !e.kind.is_player() || e.hp <= 0 || e.hurt_timer() > 0 {
                continue;
            }
            if !explosion.blast.overlaps(&e.rect) {
                continue;
            }
            // The raised shield blocks blasts entirely
            let parry_blocks = e.kind == EntityKind::Player1
                && e.player_state().map(|p| p.parrying).unwrap_or(false);
            if parry_blocks {
                continue;
            }
            e.hp -= DMG_BOMB;
            e.vel.x = (e.rect.center().x - explosion.center.x).signum() * CONTACT_KNOCKBACK;
            e.vel.y = CONTACT_LIFT;
            e.set_hurt_timer(HURT_STUN);
        }
    }
}

/// Spike strips: burst damage and launch for players, periodic chip damage
/// for ground hostiles walking over them
fn spike_damage(state: &mut GameState) {
    let spikes: Vec<Rect> = state
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::Spike)
        .map(|e| e.rect)
        .collect();
    if spikes.is_empty() {
        return;
    }
    let frame = state.frame;
    let mut kills = 0u32;

    for e in state.entities.iter_mut() {
        if e.kind.is_player() && e.hp > 0 && e.hurt_timer() == 0 {
            if let Some(spike) = spikes.iter().find(|s| e.rect.touches(s)) {
                e.hp -= DMG_SPIKE;
                e.vel.y = SPIKE_LIFT;
                e.vel.x = (e.rect.center().x - spike.center().x).signum() * SPIKE_KNOCKBACK;
                e.set_hurt_timer(SPIKE_STUN);
            }
        } else if matches!(e.kind, EntityKind::EnemyNormal | EntityKind::EnemyBomb)
            && e.hp > 0
            && !e.is_dying()
            && frame % SPIKE_ENEMY_INTERVAL == 0
            && spikes.iter().any(|s| e.rect.touches(s))
            && hurt_hostile(e, SPIKE_DAMAGE_TO_ENEMY)
        {
            kills += 1;
        }
    }
    state.score += kills;
}

/// The boss laser sweeps a full-width horizontal band at its mid height
fn laser_damage(state: &mut GameState, p1: Option<PlayerView>) {
    let Some(boss_idx) = state.find_kind(EntityKind::Boss) else {
        return;
    };
    let boss = &state.entities[boss_idx];
    let firing = matches!(boss.boss_state().map(|b| b.phase), Some(BossPhase::Laser));
    if !firing {
        return;
    }
    let band = Rect::new(
        0.0,
        boss.rect.y + boss.rect.h / 2.0 - BOSS_LASER_HEIGHT / 2.0,
        ARENA_WIDTH,
        BOSS_LASER_HEIGHT,
    );
    let p1_blocks = p1.map(|v| v.parrying).unwrap_or(false);

    for e in state.entities.iter_mut() {
        if !e.kind.is_player() || e.hp <= 0 || e.hurt_timer() > 0 {
            continue;
        }
        if e.kind == EntityKind::Player1 && p1_blocks {
            continue;
        }
        if band.overlaps(&e.rect) {
            e.hp -= DMG_BOSS_LASER;
        }
    }
}
