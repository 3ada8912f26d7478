//! Level generation, boss arena, enemy spawning, and session bootstrap

use glam::Vec2;
use rand::Rng;

use super::state::{
    spawn_burst, Entity, EntityKind, GamePhase, GameState, InputState, Payload, SessionConfig,
};
use crate::consts::*;

/// Bounding walls: left, right, ceiling, floor. The side walls extend a full
/// arena height above and below so nothing can be knocked around them.
fn create_walls(state: &mut GameState) {
    let w = ARENA_WIDTH;
    let h = ARENA_HEIGHT;
    let walls = [
        (-50.0, -h, 50.0, h * 3.0),
        (w, -h, 50.0, h * 3.0),
        (0.0, -50.0, w, 50.0),
        (0.0, h - 40.0, w, 40.0),
    ];
    for (x, y, pw, ph) in walls {
        let id = state.next_entity_id();
        state.entities.push(Entity::platform(id, x, y, pw, ph));
    }
}

/// Reposition a preserved player for a new room, clearing motion and stun
fn reset_player(player: &mut Entity, x: f32, y: f32) {
    player.rect.x = x;
    player.rect.y = y;
    player.vel = Vec2::ZERO;
    if let Payload::Player(p) = &mut player.payload {
        p.hurt_timer = 0;
    }
}

/// Rebuild the arena for the given room number.
///
/// Players survive across rooms by identity (health, score context); all
/// other entities are discarded and new random geometry is laid out.
pub fn generate_level(state: &mut GameState, room: u32, rng: &mut impl Rng) {
    log::info!("generating room {room}");

    let mut players: Vec<Entity> = state
        .entities
        .drain(..)
        .filter(|e| e.kind.is_player())
        .collect();

    create_walls(state);

    let platform_count = rng.random_range(20..=25);
    for _ in 0..platform_count {
        let w = rng.random_range(250.0..450.0);
        let x = rng.random_range(0.0..ARENA_WIDTH - w);
        let y = rng.random_range(100.0..ARENA_HEIGHT - 200.0);
        let id = state.next_entity_id();
        state.entities.push(Entity::platform(id, x, y, w, 30.0));

        // Spike strip sitting on the platform top
        if rng.random_bool(0.3) {
            let sw = rng.random_range(60.0..100.0);
            let sx = rng.random_range(x..x + w - sw);
            let sid = state.next_entity_id();
            state.entities.push(Entity::spike(sid, sx, y - 30.0, sw));
        }
    }

    for player in &mut players {
        match player.kind {
            EntityKind::Player1 => reset_player(player, 200.0, ARENA_HEIGHT - 200.0),
            _ => reset_player(player, ARENA_WIDTH - 200.0, ARENA_HEIGHT - 200.0),
        }
    }
    state.entities.append(&mut players);

    state.wave = room;
    state.enemies_spawned = 0;
    state.enemies_target = (8 + rng.random_range(0..=4)) * 2;
}

/// Replace the current room with the boss arena. Latches `boss_spawned` so
/// regular room spawning never resumes.
pub fn generate_boss_arena(state: &mut GameState, rng: &mut impl Rng) {
    log::info!("entering boss arena");

    let mut players: Vec<Entity> = state
        .entities
        .drain(..)
        .filter(|e| e.kind.is_player())
        .collect();

    create_walls(state);

    let w = ARENA_WIDTH;
    let h = ARENA_HEIGHT;
    for (x, y) in [(200.0, h - 300.0), (w - 600.0, h - 300.0)] {
        let id = state.next_entity_id();
        state.entities.push(Entity::platform(id, x, y, 400.0, 40.0));
    }

    let boss_id = state.next_entity_id();
    let boss = Entity::boss(boss_id, w / 2.0 - 100.0, 200.0);
    let boss_center = boss.rect.center();
    state.entities.push(boss);

    for player in &mut players {
        match player.kind {
            EntityKind::Player1 => reset_player(player, 300.0, h - 400.0),
            _ => reset_player(player, w - 300.0, h - 400.0),
        }
    }
    state.entities.append(&mut players);

    state.boss_spawned = true;
    spawn_burst(&mut state.particles, rng, boss_center, COLOR_BOSS, 100, 12.0);
}

/// Spawn one enemy at a random spot with the weighted type roll
pub fn spawn_random_enemy(state: &mut GameState, rng: &mut impl Rng) {
    let roll: f32 = rng.random_range(0.0..1.0);
    let kind = if roll < 0.70 {
        EntityKind::EnemyNormal
    } else if roll < 0.85 {
        EntityKind::EnemyBomb
    } else {
        EntityKind::EnemyFlyer
    };
    let x = rng.random_range(50.0..ARENA_WIDTH - 50.0);
    let y = rng.random_range(0.0..ARENA_HEIGHT - 300.0);
    let facing = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let id = state.next_entity_id();
    state.entities.push(Entity::enemy(id, kind, x, y, facing));
    state.enemies_spawned += 1;
}

/// Build a complete room-1 session: both players, generated geometry, and a
/// handful of starter enemies so the opening seconds are not empty.
pub fn start_session(config: &SessionConfig, rng: &mut impl Rng) -> GameState {
    let mut state = GameState::new(config);
    state.phase = GamePhase::Playing;
    state.input = InputState::default();

    let p1_id = state.next_entity_id();
    let p2_id = state.next_entity_id();
    state.entities.push(Entity::player(
        p1_id,
        EntityKind::Player1,
        200.0,
        ARENA_HEIGHT - 200.0,
        config.p1_color,
    ));
    state.entities.push(Entity::player(
        p2_id,
        EntityKind::Player2,
        ARENA_WIDTH - 200.0,
        ARENA_HEIGHT - 200.0,
        config.p2_color,
    ));

    generate_level(&mut state, 1, rng);
    for _ in 0..4 {
        spawn_random_enemy(&mut state, rng);
    }

    // Starter enemies count against the room target
    debug_assert_eq!(state.enemies_spawned, 4);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_start_session_has_players_and_enemies() {
        let mut rng = Pcg32::seed_from_u64(1);
        let state = start_session(&SessionConfig::default(), &mut rng);

        assert!(state.find_kind(EntityKind::Player1).is_some());
        assert!(state.find_kind(EntityKind::Player2).is_some());
        assert_eq!(state.active_enemy_count(), 4);
        assert_eq!(state.enemies_spawned, 4);
        assert_eq!(state.wave, 1);
        assert!(!state.boss_spawned);
    }

    #[test]
    fn test_generate_level_preserves_players() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut state = start_session(&SessionConfig::default(), &mut rng);

        let p1 = state.find_kind(EntityKind::Player1).map(|i| {
            let e = &mut state.entities[i];
            e.hp = 55;
            e.id
        });

        generate_level(&mut state, 2, &mut rng);

        let i = state.find_kind(EntityKind::Player1).unwrap();
        assert_eq!(Some(state.entities[i].id), p1);
        assert_eq!(state.entities[i].hp, 55);
        assert_eq!(state.wave, 2);
        // Old enemies were discarded
        assert_eq!(state.active_enemy_count(), 0);
    }

    #[test]
    fn test_room_target_in_range() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut state = start_session(&SessionConfig::default(), &mut rng);
        for room in 2..20 {
            generate_level(&mut state, room, &mut rng);
            assert!(state.enemies_target >= 16 && state.enemies_target <= 24);
        }
    }

    #[test]
    fn test_platforms_inside_arena() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut state = GameState::new(&SessionConfig::default());
        generate_level(&mut state, 1, &mut rng);

        // Skip the four bounding walls; generated platforms stay inside
        for e in state.entities.iter().filter(|e| e.kind == EntityKind::Platform).skip(4) {
            assert!(e.rect.x >= 0.0);
            assert!(e.rect.right() <= ARENA_WIDTH);
            assert!(e.rect.y >= 100.0 && e.rect.y < ARENA_HEIGHT - 200.0);
        }
    }

    #[test]
    fn test_spikes_sit_on_their_platforms() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut state = GameState::new(&SessionConfig::default());
        generate_level(&mut state, 1, &mut rng);

        for spike in state.entities.iter().filter(|e| e.kind == EntityKind::Spike) {
            let supported = state
                .entities
                .iter()
                .filter(|e| e.kind == EntityKind::Platform)
                .any(|p| {
                    (spike.rect.bottom() - p.rect.y).abs() < 0.01
                        && spike.rect.x >= p.rect.x
                        && spike.rect.right() <= p.rect.right()
                });
            assert!(supported, "spike at {},{} floats", spike.rect.x, spike.rect.y);
        }
    }

    #[test]
    fn test_boss_arena_latches_and_places_boss() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut state = start_session(&SessionConfig::default(), &mut rng);
        generate_boss_arena(&mut state, &mut rng);

        assert!(state.boss_spawned);
        let boss = &state.entities[state.find_kind(EntityKind::Boss).unwrap()];
        assert_eq!(boss.hp, BOSS_HP);
        assert_eq!(boss.rect.w, BOSS_SIZE);
        assert!(!state.particles.is_empty());
    }

    #[test]
    fn test_enemy_factory_stats() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut state = GameState::new(&SessionConfig::default());
        for _ in 0..50 {
            spawn_random_enemy(&mut state, &mut rng);
        }
        assert_eq!(state.enemies_spawned, 50);
        for e in state.entities.iter() {
            assert!(e.kind.is_enemy());
            let expected = match e.kind {
                EntityKind::EnemyNormal => ENEMY_NORMAL_HP,
                EntityKind::EnemyBomb => ENEMY_BOMB_HP,
                _ => ENEMY_FLYER_HP,
            };
            assert_eq!(e.hp, expected);
        }
    }
}
