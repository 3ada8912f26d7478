//! Enemy and boss behavior
//!
//! Runs before physics each frame. All reads of other entities go through
//! snapshots taken up front, so steering for entity N never observes the
//! half-updated state of entity N-1.

use glam::Vec2;
use rand::Rng;

use super::collision::Rect;
use super::state::{
    BossPhase, Entity, EntityKind, FlyerPhase, GameState, GroundPhase, Particle, Payload,
};
use crate::consts::*;

/// A bomb detonation queued for the combat phase
#[derive(Debug, Clone, Copy)]
pub struct Explosion {
    pub center: Vec2,
    /// Bomb rect padded on every side; everything inside takes blast damage
    pub blast: Rect,
}

/// Nearest living player center, if any player is still up
fn nearest_player(players: &[Vec2], from: Vec2) -> Option<Vec2> {
    players
        .iter()
        .copied()
        .min_by(|a, b| a.distance(from).total_cmp(&b.distance(from)))
}

/// Pairwise anti-stacking push away from nearby enemies
fn separation(peers: &[(u32, Vec2)], id: u32, center: Vec2) -> Vec2 {
    let mut push = Vec2::ZERO;
    for &(other_id, other) in peers {
        if other_id == id {
            continue;
        }
        let d = center - other;
        let dist = d.length();
        if dist > 0.0 && dist < SEPARATION_RADIUS {
            push += d / dist * SEPARATION_PUSH;
        }
    }
    push
}

/// Advance every enemy one frame. Returns detonations for the combat phase.
pub fn update_enemies(state: &mut GameState, rng: &mut impl Rng) -> Vec<Explosion> {
    let frame = state.frame;

    let players: Vec<Vec2> = state
        .entities
        .iter()
        .filter(|e| e.kind.is_player() && e.hp > 0)
        .map(|e| e.rect.center())
        .collect();
    let peers: Vec<(u32, Vec2)> = state
        .entities
        .iter()
        .filter(|e| e.kind.is_enemy() && !e.is_dying())
        .map(|e| (e.id, e.rect.center()))
        .collect();
    let solids: Vec<Rect> = state
        .entities
        .iter()
        .filter(|e| e.kind.is_solid())
        .map(|e| e.rect)
        .collect();
    let platforms: Vec<Rect> = state
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::Platform)
        .map(|e| e.rect)
        .collect();

    let state = &mut *state;
    let entities = &mut state.entities;
    let particles = &mut state.particles;

    let mut explosions = Vec::new();

    for e in entities.iter_mut() {
        match e.kind {
            EntityKind::EnemyNormal | EntityKind::EnemyBomb => {
                if let Some(explosion) = update_ground(e, &players, &peers, &solids, &platforms, particles, rng) {
                    explosions.push(explosion);
                }
            }
            EntityKind::EnemyFlyer => update_flyer(e, &players, &peers, particles, frame),
            _ => {}
        }
    }

    explosions
}

fn update_ground(
    e: &mut Entity,
    players: &[Vec2],
    peers: &[(u32, Vec2)],
    solids: &[Rect],
    platforms: &[Rect],
    particles: &mut Vec<Particle>,
    rng: &mut impl Rng,
) -> Option<Explosion> {
    let center = e.rect.center();
    let Payload::Ground(g) = &mut e.payload else {
        return None;
    };
    g.hurt_timer = g.hurt_timer.saturating_sub(1);

    if let GroundPhase::Dying { timer } = g.phase {
        g.phase = GroundPhase::Dying {
            timer: timer.saturating_sub(1),
        };
        // Corpse keeps falling, no collision
        e.vel.y += GRAVITY;
        e.rect.x += e.vel.x;
        e.rect.y += e.vel.y;
        return None;
    }

    // Stunned: knockback decays, everything else pauses (fuse included)
    if g.hurt_timer > 0 {
        e.vel.x *= STUN_FRICTION;
        return None;
    }

    if let GroundPhase::Exploding { fuse } = g.phase {
        e.vel.x = 0.0;
        if fuse <= 1 {
            e.hp = 0;
            g.phase = GroundPhase::Dying { timer: 1 };
            spawn_blast_particles(particles, rng, center);
            return Some(Explosion {
                center,
                blast: e.rect.expanded(BOMB_BLAST_PAD),
            });
        }
        g.phase = GroundPhase::Exploding { fuse: fuse - 1 };
        return None;
    }

    let Some(target) = nearest_player(players, center) else {
        g.attacking = false;
        return None;
    };
    let dx = target.x - center.x;
    let dy = target.y - center.y;
    let dist = (target - center).length();
    g.attacking = dist < 60.0;

    // Bombs arm at close range and root in place
    if e.kind == EntityKind::EnemyBomb && dist < BOMB_TRIGGER_RANGE {
        g.phase = GroundPhase::Exploding { fuse: BOMB_FUSE };
        e.color = COLOR_WHITE;
        e.vel.x = 0.0;
        return None;
    }

    let speed = if e.kind == EntityKind::EnemyBomb {
        ENEMY_BOMB_SPEED
    } else {
        ENEMY_NORMAL_SPEED
    };
    let dir = if dx.abs() < 10.0 && dy.abs() < 50.0 {
        0.0
    } else {
        dx.signum()
    };
    if dir != 0.0 {
        e.facing = dir;
    }

    let push = separation(peers, e.id, center);
    e.vel.x += dir * ACCELERATION + push.x * 0.1;
    e.vel.x = e.vel.x.clamp(-speed, speed);

    if e.grounded && dir != 0.0 {
        let probe_x = e.rect.x + e.facing * PROBE_LOOKAHEAD;
        let wall_probe = Rect::new(probe_x, e.rect.y, ENEMY_SIZE, e.rect.h - 10.0);
        let gap_probe = Rect::new(probe_x, e.rect.bottom() + 20.0, ENEMY_SIZE, 20.0);
        let wall_ahead = solids.iter().any(|s| wall_probe.overlaps(s));
        let ground_ahead = platforms.iter().any(|p| gap_probe.overlaps(p));
        let target_below = dy > 100.0;

        // A wall always forces the jump; a gap is only jumped when the
        // target is not waiting below it
        if wall_ahead || (!ground_ahead && !target_below) {
            e.vel.y = JUMP_FORCE * 1.2;
            e.vel.x = e.facing * (speed + 2.0);
        } else {
            let target_above = dy < -100.0;
            let stuck = e.vel.x.abs() < 1.0 && dx.abs() > 50.0;
            if (target_above || stuck) && rng.random_bool(0.1) {
                e.vel.y = JUMP_FORCE * 1.1;
            }
        }
    }

    None
}

fn update_flyer(
    e: &mut Entity,
    players: &[Vec2],
    peers: &[(u32, Vec2)],
    particles: &mut Vec<Particle>,
    frame: u64,
) {
    let center = e.rect.center();
    let Payload::Flyer(f) = &mut e.payload else {
        return;
    };
    f.hurt_timer = f.hurt_timer.saturating_sub(1);

    if let FlyerPhase::Dying { timer } = f.phase {
        f.phase = FlyerPhase::Dying {
            timer: timer.saturating_sub(1),
        };
        // Dead flyers drift upward
        e.rect.y -= 1.0;
        return;
    }

    // Stunned: knockback decays, steering and bob paused
    if f.hurt_timer > 0 {
        e.vel *= STUN_FRICTION;
        return;
    }

    let Some(target) = nearest_player(players, center) else {
        f.attacking = false;
        return;
    };
    let d = target - center;
    let dist = d.length();
    f.attacking = dist < 60.0;

    if dist > 0.0 {
        let desired = d / dist * FLYER_SPEED;
        let push = separation(peers, e.id, center);
        e.vel += (desired - e.vel) * FLYER_SMOOTHING + push * 0.1;
        if d.x.abs() > 1.0 {
            e.facing = d.x.signum();
        }
    }
    e.vel.y += ((frame as f32) * 0.1 + e.id as f32).sin() * 0.2;

    if frame % 4 == 0 {
        if particles.len() >= MAX_PARTICLES {
            particles.remove(0);
        }
        particles.push(Particle {
            pos: center,
            vel: Vec2::ZERO,
            life: 20,
            max_life: 20,
            color: e.color,
            size: 5.0,
        });
    }
}

fn spawn_blast_particles(particles: &mut Vec<Particle>, rng: &mut impl Rng, center: Vec2) {
    super::state::spawn_burst(particles, rng, center, COLOR_BLAST, 50, 16.0);
}

/// Advance the boss one frame: phase timer, phase selection, and steering.
/// Smash landing shockwaves fire from the physics phase when it touches down.
pub fn update_boss(state: &mut GameState, rng: &mut impl Rng) {
    let target = state
        .find_living(EntityKind::Player1)
        .or_else(|| state.find_living(EntityKind::Player2))
        .map(|i| state.entities[i].rect.center());

    let Some(boss_idx) = state.find_kind(EntityKind::Boss) else {
        return;
    };
    let boss = &mut state.entities[boss_idx];
    let center = boss.rect.center();
    let grounded = boss.grounded;
    let Payload::Boss(b) = &mut boss.payload else {
        return;
    };
    b.hurt_timer = b.hurt_timer.saturating_sub(1);

    if b.timer == 0 {
        let roll: f32 = rng.random_range(0.0..1.0);
        if roll < 0.4 {
            b.phase = BossPhase::Smash;
            b.timer = BOSS_SMASH_DURATION;
            boss.vel.y = BOSS_SMASH_LAUNCH;
        } else if roll < 0.7 {
            b.phase = BossPhase::Laser;
            b.timer = BOSS_LASER_DURATION;
        } else {
            b.phase = BossPhase::Charge;
            b.timer = BOSS_CHARGE_DURATION;
        }
        return;
    }
    b.timer -= 1;

    match b.phase {
        BossPhase::Smash => {
            // Steer toward the target only while airborne
            if !grounded {
                if let Some(t) = target {
                    boss.vel.x = (t.x - center.x) * BOSS_SMASH_STEER;
                }
            } else {
                boss.vel.x = 0.0;
            }
        }
        BossPhase::Laser => boss.vel.x = 0.0,
        BossPhase::Charge => {
            if let Some(t) = target {
                let dir = (t.x - center.x).signum();
                boss.vel.x = dir * BOSS_CHARGE_SPEED;
                boss.facing = dir;
            }
        }
        BossPhase::Idle => boss.vel.x = 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::state::{GameState, SessionConfig};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn state_with(entities: Vec<Entity>) -> GameState {
        let mut state = GameState::new(&SessionConfig::default());
        state.entities = entities;
        state
    }

    fn player_at(x: f32, y: f32) -> Entity {
        Entity::player(100, EntityKind::Player1, x, y, COLOR_P1_DEFAULT)
    }

    #[test]
    fn test_ground_enemy_chases_player() {
        let mut rng = Pcg32::seed_from_u64(1);
        let enemy = Entity::enemy(1, EntityKind::EnemyNormal, 500.0, 500.0, 1.0);
        let mut state = state_with(vec![player_at(900.0, 500.0), enemy]);

        update_enemies(&mut state, &mut rng);
        let e = &state.entities[1];
        assert!(e.vel.x > 0.0);
        assert_eq!(e.facing, 1.0);
    }

    #[test]
    fn test_ground_enemy_idles_when_close() {
        let mut rng = Pcg32::seed_from_u64(1);
        let enemy = Entity::enemy(1, EntityKind::EnemyNormal, 505.0, 500.0, 1.0);
        let mut state = state_with(vec![player_at(500.0, 490.0), enemy]);

        update_enemies(&mut state, &mut rng);
        assert_eq!(state.entities[1].vel.x, 0.0);
    }

    #[test]
    fn test_bomb_arms_near_player_then_detonates() {
        let mut rng = Pcg32::seed_from_u64(2);
        let bomb = Entity::enemy(1, EntityKind::EnemyBomb, 520.0, 500.0, 1.0);
        let mut state = state_with(vec![player_at(500.0, 500.0), bomb]);

        update_enemies(&mut state, &mut rng);
        let Payload::Ground(g) = state.entities[1].payload else {
            panic!("bomb payload");
        };
        assert_eq!(g.phase, GroundPhase::Exploding { fuse: BOMB_FUSE });
        assert_eq!(state.entities[1].color, COLOR_WHITE);

        // Burn the fuse down; the final frame yields exactly one detonation
        let mut explosions = Vec::new();
        for _ in 0..BOMB_FUSE {
            explosions.extend(update_enemies(&mut state, &mut rng));
        }
        assert_eq!(explosions.len(), 1);
        assert_eq!(state.entities[1].hp, 0);
        assert!(state.entities[1].is_dying());
        // Blast rect is padded around the bomb
        assert!(explosions[0].blast.w > ENEMY_SIZE);
    }

    #[test]
    fn test_flyer_steers_toward_player() {
        let mut rng = Pcg32::seed_from_u64(3);
        let flyer = Entity::enemy(1, EntityKind::EnemyFlyer, 500.0, 800.0, 1.0);
        let mut state = state_with(vec![player_at(900.0, 400.0), flyer]);

        update_enemies(&mut state, &mut rng);
        let e = &state.entities[1];
        assert!(e.vel.x > 0.0);
        assert!(e.vel.y < 1.0); // steering up, modulo the bob term
    }

    #[test]
    fn test_separation_pushes_stacked_enemies_apart() {
        let mut rng = Pcg32::seed_from_u64(4);
        let a = Entity::enemy(1, EntityKind::EnemyNormal, 500.0, 500.0, 1.0);
        let b = Entity::enemy(2, EntityKind::EnemyNormal, 510.0, 500.0, 1.0);
        // Player far above so chase steering is vertical-jitter free
        let mut state = state_with(vec![player_at(505.0, 480.0), a, b]);

        update_enemies(&mut state, &mut rng);
        // The left one is pushed further left than the right one
        assert!(state.entities[1].vel.x < state.entities[2].vel.x);
    }

    #[test]
    fn test_dying_enemy_counts_down_and_drifts() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut flyer = Entity::enemy(1, EntityKind::EnemyFlyer, 500.0, 500.0, 1.0);
        flyer.start_dying(DYING_DURATION);
        let y0 = flyer.rect.y;
        let mut state = state_with(vec![player_at(900.0, 500.0), flyer]);

        update_enemies(&mut state, &mut rng);
        let e = &state.entities[1];
        assert!(e.rect.y < y0);
        let Payload::Flyer(f) = e.payload else {
            panic!("flyer payload");
        };
        assert_eq!(f.phase, FlyerPhase::Dying { timer: DYING_DURATION - 1 });
    }

    #[test]
    fn test_stunned_enemy_knockback_decays() {
        let mut rng = Pcg32::seed_from_u64(20);
        let mut enemy = Entity::enemy(1, EntityKind::EnemyNormal, 500.0, 500.0, 1.0);
        enemy.vel.x = 10.0;
        enemy.set_hurt_timer(10);
        let mut state = state_with(vec![player_at(900.0, 500.0), enemy]);

        update_enemies(&mut state, &mut rng);
        assert_eq!(state.entities[1].vel.x, 10.0 * STUN_FRICTION);
    }

    #[test]
    fn test_stunned_bomb_does_not_arm() {
        let mut rng = Pcg32::seed_from_u64(21);
        let mut bomb = Entity::enemy(1, EntityKind::EnemyBomb, 520.0, 500.0, 1.0);
        bomb.set_hurt_timer(5);
        let mut state = state_with(vec![player_at(500.0, 500.0), bomb]);

        update_enemies(&mut state, &mut rng);
        let Payload::Ground(g) = state.entities[1].payload else {
            panic!("bomb payload");
        };
        assert_eq!(g.phase, GroundPhase::Chasing);
    }

    #[test]
    fn test_stunned_flyer_decays_without_steering() {
        let mut rng = Pcg32::seed_from_u64(22);
        let mut flyer = Entity::enemy(1, EntityKind::EnemyFlyer, 500.0, 500.0, 1.0);
        flyer.vel = Vec2::new(8.0, -6.0);
        flyer.set_hurt_timer(10);
        let mut state = state_with(vec![player_at(900.0, 400.0), flyer]);

        let before = state.particles.len();
        update_enemies(&mut state, &mut rng);
        let e = &state.entities[1];
        assert_eq!(e.vel.x, 8.0 * STUN_FRICTION);
        assert_eq!(e.vel.y, -6.0 * STUN_FRICTION);
        // No trail while stunned
        assert_eq!(state.particles.len(), before);
    }

    #[test]
    fn test_wall_jump_even_with_target_below() {
        let mut rng = Pcg32::seed_from_u64(23);
        let mut enemy = Entity::enemy(1, EntityKind::EnemyNormal, 500.0, 500.0, 1.0);
        enemy.grounded = true;
        // Wall directly in the forward probe, player far below
        let wall = Entity::platform(2, 540.0, 400.0, 50.0, 200.0);
        let mut state = state_with(vec![player_at(520.0, 900.0), enemy, wall]);

        update_enemies(&mut state, &mut rng);
        assert_eq!(state.entities[1].vel.y, JUMP_FORCE * 1.2);
    }

    #[test]
    fn test_boss_picks_phase_when_timer_elapses() {
        let mut rng = Pcg32::seed_from_u64(6);
        let boss = Entity::boss(1, 1400.0, 200.0);
        let mut state = state_with(vec![player_at(300.0, 1300.0), boss]);

        update_boss(&mut state, &mut rng);
        let b = state.entities[1].boss_state().copied().unwrap();
        assert_ne!(b.phase, BossPhase::Idle);
        assert!(b.timer > 0);
    }

    #[test]
    fn test_boss_charge_moves_toward_target() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut boss = Entity::boss(1, 1400.0, 200.0);
        if let Payload::Boss(b) = &mut boss.payload {
            b.phase = BossPhase::Charge;
            b.timer = 60;
        }
        let mut state = state_with(vec![player_at(300.0, 1300.0), boss]);

        update_boss(&mut state, &mut rng);
        assert_eq!(state.entities[1].vel.x, -BOSS_CHARGE_SPEED);
        assert_eq!(state.entities[1].facing, -1.0);
    }
}
