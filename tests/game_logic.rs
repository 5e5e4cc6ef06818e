/// Integration tests for game logic
///
/// These tests drive a whole session through the public API the way a host
/// does: ticks, collision notifications and the command outbox.
use invaders::arena::{self, Arena};
use invaders::entities::{Direction, EnemyId, EnemyType};
use invaders::{
    Boundary, CollisionTag, Game, GameConfig, GamePhase, HostCommand, PlayerInput, Scene, Sound,
};

fn config_with_levels(levels: Vec<Vec<Vec<u8>>>) -> GameConfig {
    GameConfig {
        seed: Some(11),
        levels: Some(levels),
        ..GameConfig::default()
    }
}

fn started(levels: Vec<Vec<Vec<u8>>>) -> Game {
    let mut game = Game::new(config_with_levels(levels)).unwrap();
    game.start();
    game
}

fn idle() -> PlayerInput {
    PlayerInput::default()
}

/// Runs the countdown of the current level in one step
fn skip_countdown(game: &mut Game) {
    game.update(3.5, &idle());
}

fn count_sound(commands: &[HostCommand], sound: Sound) -> usize {
    commands
        .iter()
        .filter(|c| **c == HostCommand::PlaySound(sound))
        .count()
}

fn enemy_at(game: &Game, row: usize, col: usize) -> EnemyId {
    game.grid().get(row, col).unwrap()
}

#[test]
fn test_killing_mixed_types_scores_by_type() {
    let mut game = started(vec![vec![vec![1, 2, 3, 1, 1]]]);
    skip_countdown(&mut game);

    for col in 0..4 {
        let id = enemy_at(&game, 0, col);
        game.on_enemy_collision(id, CollisionTag::Bullet);
    }

    assert_eq!(game.session().score, 70);
    assert_eq!(game.session().enemies_alive, 1);
    assert_eq!(game.hud().score_text, "Score: 0070");
    assert_eq!(game.phase(), GamePhase::Playing { level: 1 });
}

#[test]
fn test_dead_enemy_is_not_scored_twice() {
    let mut game = started(vec![vec![vec![3, 1]]]);
    skip_countdown(&mut game);

    let id = enemy_at(&game, 0, 0);
    game.on_enemy_collision(id, CollisionTag::Bullet);
    game.on_enemy_collision(id, CollisionTag::Bullet);
    game.on_enemy_collision(id, CollisionTag::Defense);

    assert_eq!(game.session().score, 30);
    assert_eq!(game.session().enemies_alive, 1);
}

#[test]
fn test_losing_all_lives_is_game_over_once() {
    let mut game = started(vec![vec![vec![1, 1]]]);
    skip_countdown(&mut game);
    game.drain_commands();

    let steer = PlayerInput {
        horizontal: 1.0,
        ..PlayerInput::default()
    };
    game.update(0.1, &steer);
    assert!(game.player().velocity.x > 0.0);
    assert!(game.player().tilt != 0.0);

    game.on_player_collision(CollisionTag::Bullet);
    assert_eq!(game.session().lives, 2);
    assert_eq!(game.player().velocity, glam::Vec2::ZERO);
    assert_eq!(game.player().tilt, 0.0);
    assert!(
        game.drain_commands()
            .contains(&HostCommand::ResetPlayerPosition)
    );

    game.on_player_collision(CollisionTag::Bullet);
    assert_eq!(game.session().lives, 1);
    assert_eq!(game.phase(), GamePhase::Playing { level: 1 });
    assert!(game.player().is_enabled());

    game.on_player_collision(CollisionTag::Bullet);
    assert_eq!(game.session().lives, 0);
    assert_eq!(game.phase(), GamePhase::GameOver);
    assert!(game.hud().game_over_panel);
    assert!(!game.player().is_enabled());

    // Nothing moves the counters any more
    game.on_player_collision(CollisionTag::Bullet);
    let id = enemy_at(&game, 0, 0);
    game.on_enemy_collision(id, CollisionTag::Bullet);
    game.game_over();

    assert_eq!(game.session().lives, 0);
    assert_eq!(game.session().score, 0);

    let commands = game.drain_commands();
    assert_eq!(count_sound(&commands, Sound::GameOver), 1);
    assert_eq!(
        commands
            .iter()
            .filter(|c| **c == HostCommand::StopMusic)
            .count(),
        1
    );
}

#[test]
fn test_game_over_stops_everything() {
    let mut game = started(vec![vec![vec![1, 2], vec![3, 1]]]);
    skip_countdown(&mut game);
    assert!(game.speed_timer_active());

    let id = enemy_at(&game, 1, 0);
    game.on_enemy_collision(id, CollisionTag::Boundary(Boundary::Bottom));

    assert_eq!(game.phase(), GamePhase::GameOver);
    assert!(!game.speed_timer_active());
    assert!(game.enemies().values().all(|e| !e.can_fire()));
    assert!(game.enemies().values().all(|e| e.velocity.length() == 0.0));

    // Time keeps passing without anyone firing or moving
    game.drain_commands();
    game.update(30.0, &idle());
    assert!(game.drain_commands().is_empty());
}

#[test]
fn test_game_over_during_countdown_cancels_it() {
    let mut game = started(vec![vec![vec![1]]]);
    game.update(1.0, &idle());
    game.on_player_collision(CollisionTag::Enemy);
    assert_eq!(game.phase(), GamePhase::GameOver);
    assert!(game.hud().countdown.is_none());

    game.update(5.0, &idle());
    assert_eq!(game.phase(), GamePhase::GameOver);
    assert!(!game.player().is_enabled());
}

#[test]
fn test_level_completion_does_not_stack_speed_timers() {
    let mut game = started(vec![vec![vec![1]], vec![vec![2]]]);
    skip_countdown(&mut game);
    assert!(game.speed_timer_active());

    let id = enemy_at(&game, 0, 0);
    game.on_enemy_collision(id, CollisionTag::Bullet);

    assert_eq!(
        game.phase(),
        GamePhase::Countdown {
            level: 2,
            step: invaders::CountdownStep::Three
        }
    );
    assert!(!game.speed_timer_active());
    assert!(!game.player().is_enabled());
    assert_eq!(game.hud().level_text, "Level: 02");

    skip_countdown(&mut game);
    assert_eq!(game.phase(), GamePhase::Playing { level: 2 });
    assert_eq!(game.speed_subscribers(), 1);

    // level 2 starts at 1.0 + 2 * 0.25; one step after step_time
    let start = game.formation().current_speed();
    assert!((start - 1.5).abs() < 1e-6);
    game.update(10.0, &idle());
    let stepped = game.formation().current_speed();
    assert!((stepped - start - 0.05).abs() < 1e-6);
}

#[test]
fn test_clearing_a_level_mid_countdown_restarts_the_countdown() {
    let mut game = started(vec![vec![vec![1]], vec![vec![2]]]);
    game.update(0.5, &idle());

    let id = enemy_at(&game, 0, 0);
    game.on_enemy_collision(id, CollisionTag::Bullet);
    assert_eq!(
        game.phase(),
        GamePhase::Countdown {
            level: 2,
            step: invaders::CountdownStep::Three
        }
    );

    // Only the new level's countdown is ticking
    game.update(1.0, &idle());
    assert_eq!(
        game.phase(),
        GamePhase::Countdown {
            level: 2,
            step: invaders::CountdownStep::Two
        }
    );
    assert_eq!(game.hud().countdown.as_ref().unwrap().number_text, "2");
}

#[test]
fn test_last_level_completes_game() {
    let mut game = started(vec![vec![vec![1]]]);
    skip_countdown(&mut game);
    game.drain_commands();

    let id = enemy_at(&game, 0, 0);
    game.on_enemy_collision(id, CollisionTag::Bullet);

    assert_eq!(game.phase(), GamePhase::GameComplete);
    assert!(game.hud().game_end_panel);
    assert!(!game.hud().game_over_panel);
    assert_eq!(game.session().score, 10);

    let commands = game.drain_commands();
    assert_eq!(count_sound(&commands, Sound::GameEnd), 1);
    assert!(commands.contains(&HostCommand::DespawnEnemy(id)));

    // A late game over does not replace the win
    game.game_over();
    assert_eq!(game.phase(), GamePhase::GameComplete);

    game.restart();
    assert_eq!(
        game.drain_commands(),
        vec![HostCommand::LoadScene(Scene::Game)]
    );
}

#[test]
fn test_enemies_spawn_at_grid_positions() {
    let mut game = started(vec![vec![vec![0, 3], vec![2, 0]]]);
    let spawns: Vec<_> = game
        .drain_commands()
        .into_iter()
        .filter_map(|c| match c {
            HostCommand::SpawnEnemy {
                enemy_type,
                position,
                ..
            } => Some((enemy_type, position)),
            _ => None,
        })
        .collect();

    assert_eq!(
        spawns,
        vec![
            (EnemyType::Squid, glam::Vec2::new(-6.0, 14.0)),
            (EnemyType::Crab, glam::Vec2::new(-9.0, 12.0)),
        ]
    );
}

#[test]
fn test_defenses_reset_between_levels() {
    let mut game = started(vec![vec![vec![1]], vec![vec![1]]]);
    skip_countdown(&mut game);
    game.on_defense_collision(0, CollisionTag::Enemy);
    game.on_defense_collision(1, CollisionTag::Bullet);
    assert!(!game.defenses()[0].is_enabled());

    let id = enemy_at(&game, 0, 0);
    game.on_enemy_collision(id, CollisionTag::Bullet);

    assert!(game.defenses().iter().all(|d| d.is_enabled()));
    assert!(game.defenses().iter().all(|d| d.health() == 2));
}

#[test]
fn test_formation_turns_at_the_wall_in_the_arena() {
    // Enough lives that stray enemy fire can't end the run early
    let config = GameConfig {
        seed: Some(5),
        initial_lives: 50,
        ..GameConfig::default()
    };
    let mut arena = Arena::new(&config);
    let mut game = Game::new(config).unwrap();
    game.start();

    let mut turned = false;
    for _ in 0..300 {
        game.update(0.05, &idle());
        arena.step(0.05, &game);
        let contacts = arena.contacts(&game);
        arena::dispatch(&mut game, &contacts);
        for command in game.drain_commands() {
            arena.apply(&command);
        }
        if game.formation().direction() == Direction::Left {
            turned = true;
            break;
        }
    }

    assert!(turned);
}

// Property-based tests
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_each_column_has_at_most_one_shooter(
            kills in prop::collection::vec((0usize..4, 0usize..3), 0..12)
        ) {
            let mut game = started(vec![vec![
                vec![3, 3, 3],
                vec![2, 0, 2],
                vec![1, 1, 0],
                vec![0, 1, 1],
            ]]);
            skip_countdown(&mut game);

            for (row, col) in kills {
                if let Some(id) = game.grid().get(row, col) {
                    game.on_enemy_collision(id, CollisionTag::Bullet);
                }

                for column in 0..game.grid().cols() {
                    let armed: Vec<_> = game
                        .grid()
                        .column_bottom_up(column)
                        .filter(|id| game.enemy(*id).is_some_and(|e| e.can_fire()))
                        .collect();
                    prop_assert!(armed.len() <= 1);

                    let lowest_live = game
                        .grid()
                        .column_bottom_up(column)
                        .find(|id| game.enemy(*id).is_some_and(|e| !e.is_dead()));
                    if game.phase() == (GamePhase::Playing { level: 1 }) {
                        prop_assert_eq!(armed.first().copied(), lowest_live);
                    }
                }
            }
        }
    }
}
