//! The game controller: levels, countdown, score, lives and win/lose.
//!
//! `Game` is a state machine driven by the host. Every frame the host calls
//! [`Game::update`] with the elapsed time and sampled input, forwards each
//! collision it detected to the matching `on_*_collision` method, and drains
//! the queued [`HostCommand`]s.

use std::collections::BTreeMap;

use color_eyre::eyre::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::entities::{
    Defense, DefenseReaction, Enemy, EnemyId, EnemyReaction, EnemyType, Formation, Player,
    PlayerReaction, Projectile, ProjectileId, ProjectileOwner, Roster,
};
use crate::events::{Channel, Listener, SpeedChange};
use crate::grid::EnemyGrid;
use crate::host::{CollisionTag, HostCommand, PlayerInput, Scene, Sound};
use crate::hud::{self, Hud};
use crate::levels::LevelSet;
use crate::timers::{TimerHandle, Timers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountdownStep {
    Three,
    Two,
    One,
    Go,
}

impl CountdownStep {
    pub fn label(&self) -> &'static str {
        match self {
            CountdownStep::Three => "3",
            CountdownStep::Two => "2",
            CountdownStep::One => "1",
            CountdownStep::Go => "GO",
        }
    }

    pub fn sound(&self) -> Sound {
        match self {
            CountdownStep::Three => Sound::Three,
            CountdownStep::Two => Sound::Two,
            CountdownStep::One => Sound::One,
            CountdownStep::Go => Sound::Go,
        }
    }

    /// How long the step stays on screen
    pub fn hold_secs(&self) -> f32 {
        match self {
            CountdownStep::Go => 0.5,
            _ => 1.0,
        }
    }

    pub fn next(&self) -> Option<Self> {
        match self {
            CountdownStep::Three => Some(CountdownStep::Two),
            CountdownStep::Two => Some(CountdownStep::One),
            CountdownStep::One => Some(CountdownStep::Go),
            CountdownStep::Go => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Initializing,
    Countdown { level: usize, step: CountdownStep },
    Playing { level: usize },
    LevelComplete { level: usize },
    GameOver,
    GameComplete,
}

impl GamePhase {
    /// Nothing changes score or lives once the game reached one of these
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::GameComplete)
    }
}

/// Everything the game schedules on its clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameTimer {
    CountdownTick,
    SpeedStep,
    FormationResume,
    /// End of an enemy's death effect
    DisableEnemy(EnemyId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Session {
    pub score: u32,
    pub lives: u32,
    /// 1-based, 0 before the first level
    pub level: usize,
    pub enemies_alive: usize,
}

pub struct Game {
    config: GameConfig,
    levels: LevelSet,
    phase: GamePhase,
    session: Session,
    hud: Hud,
    grid: EnemyGrid,
    enemies: Roster,
    formation: Formation,
    defenses: Vec<Defense>,
    player: Player,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    timers: Timers<GameTimer>,
    speed_changes: Channel<Listener, SpeedChange>,
    speed_timer: Option<TimerHandle>,
    countdown_timer: Option<TimerHandle>,
    commands: Vec<HostCommand>,
    rng: StdRng,
    next_enemy_id: u32,
    next_projectile_id: u32,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        let levels = config.level_set()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            grid: EnemyGrid::new(levels.rows(), levels.cols()),
            defenses: (0..config.defense_count)
                .map(|i| Defense::new(i, config.defense_health))
                .collect(),
            player: Player::new(config.player_speed),
            levels,
            phase: GamePhase::Initializing,
            session: Session::default(),
            hud: Hud::default(),
            enemies: Roster::new(),
            formation: Formation::new(),
            projectiles: BTreeMap::new(),
            timers: Timers::new(),
            speed_changes: Channel::new(),
            speed_timer: None,
            countdown_timer: None,
            commands: Vec::new(),
            rng,
            next_enemy_id: 0,
            next_projectile_id: 0,
            config,
        })
    }

    /// Resets score and lives and starts the countdown for level 1
    pub fn start(&mut self) {
        if self.phase != GamePhase::Initializing {
            return;
        }

        self.session.score = 0;
        self.session.lives = self.config.initial_lives;
        self.hud.score_text = hud::format_score(self.session.score);
        self.hud.lives_text = hud::format_lives(self.session.lives);
        info!(
            lives = self.session.lives,
            levels = self.levels.len(),
            "game started"
        );
        self.start_level(1);
    }

    pub fn start_level(&mut self, level: usize) {
        let Some(definition) = self.levels.get(level) else {
            self.game_complete();
            return;
        };

        self.session.level = level;
        self.grid = EnemyGrid::new(definition.rows(), definition.cols());
        let mut spawned = 0;
        for (row, col, enemy_type) in definition.enemies() {
            let id = EnemyId(self.next_enemy_id);
            self.next_enemy_id += 1;
            self.grid.set(row, col, Some(id));
            self.enemies
                .insert(id, Enemy::new(id, enemy_type, row, col));
            self.commands.push(HostCommand::SpawnEnemy {
                id,
                enemy_type,
                position: self.config.cell_position(row, col),
            });
            spawned += 1;
        }
        self.session.enemies_alive = spawned;

        for defense in &mut self.defenses {
            defense.reset();
        }

        self.hud.level_text = hud::format_level(level);
        info!(level, enemies = spawned, "level loaded");
        self.show_countdown_step(level, CountdownStep::Three);
    }

    fn show_countdown_step(&mut self, level: usize, step: CountdownStep) {
        self.cancel_countdown_timer();
        self.phase = GamePhase::Countdown { level, step };
        self.hud.show_countdown(level, step.label());
        self.commands.push(HostCommand::PlaySound(step.sound()));
        self.countdown_timer = Some(
            self.timers
                .schedule_once(step.hold_secs(), GameTimer::CountdownTick),
        );
    }

    fn advance_countdown(&mut self) {
        self.countdown_timer = None;
        let GamePhase::Countdown { level, step } = self.phase else {
            return;
        };

        match step.next() {
            Some(next) => self.show_countdown_step(level, next),
            None => self.begin_play(level),
        }
    }

    /// End of the countdown: hands control to the player and starts the march
    fn begin_play(&mut self, level: usize) {
        self.phase = GamePhase::Playing { level };
        self.hud.hide_countdown();
        self.player.enable();

        let speed = self.config.base_speed + level as f32 * self.config.level_speed_step;
        self.formation
            .start_moving(speed, &mut self.enemies, &mut self.speed_changes);

        for column in 0..self.grid.cols() {
            self.update_shooter(column);
        }

        if let Some(previous) = self.speed_timer.take() {
            self.timers.cancel(previous);
        }
        self.speed_timer = Some(
            self.timers
                .schedule_every(self.config.step_time, GameTimer::SpeedStep),
        );
        info!(level, speed, "level started");
    }

    /// Advances game time by `dt` seconds, firing due timers one at a time,
    /// then applies the player's input and lets armed enemies shoot.
    pub fn update(&mut self, dt: f32, input: &PlayerInput) {
        let until = self.timers.now() + dt.max(0.0);
        while let Some(event) = self.timers.poll(until) {
            self.on_timer(event);
        }
        self.timers.advance_to(until);

        self.player.update(input);
        if input.fire && self.player.can_fire() {
            let id = self.spawn_projectile(ProjectileOwner::Player, self.player.tilt);
            self.player.record_shot(id);
        }

        let now = self.timers.now();
        let mut shooters = Vec::new();
        for enemy in self.enemies.values_mut() {
            if enemy.try_fire(now, &mut self.rng) {
                shooters.push(enemy.id);
            }
        }
        for id in shooters {
            self.spawn_projectile(ProjectileOwner::Enemy(id), 0.0);
        }
    }

    fn on_timer(&mut self, event: GameTimer) {
        match event {
            GameTimer::CountdownTick => self.advance_countdown(),
            GameTimer::SpeedStep => {
                let step = SpeedChange {
                    delta: self.config.speed_step,
                };
                for (listener, change) in self.speed_changes.publish(step) {
                    match listener {
                        Listener::Formation => self
                            .formation
                            .on_speed_increment(change.delta, &mut self.enemies),
                    }
                }
                debug!(speed = self.formation.current_speed(), "speed step");
            }
            GameTimer::FormationResume => self.formation.resume(&mut self.enemies),
            GameTimer::DisableEnemy(id) => {
                if let Some(enemy) = self.enemies.get_mut(&id)
                    && enemy.is_active()
                {
                    enemy.deactivate();
                    self.commands.push(HostCommand::DespawnEnemy(id));
                }
            }
        }
    }

    fn spawn_projectile(&mut self, owner: ProjectileOwner, rotation: f32) -> ProjectileId {
        let id = ProjectileId(self.next_projectile_id);
        self.next_projectile_id += 1;

        let projectile = Projectile::new(id, owner, self.config.bullet_speed, rotation);
        self.commands.push(HostCommand::SpawnProjectile {
            id,
            owner,
            velocity: projectile.velocity,
            rotation,
        });
        self.commands.push(HostCommand::PlaySound(Sound::Shoot));
        self.projectiles.insert(id, projectile);
        id
    }

    pub fn on_enemy_collision(&mut self, id: EnemyId, tag: CollisionTag) {
        let Some(enemy) = self.enemies.get_mut(&id) else {
            return;
        };

        match enemy.on_collision(tag) {
            EnemyReaction::Killed { enemy_type, column } => {
                self.commands.push(HostCommand::PlaySound(Sound::Dead));
                self.commands.push(HostCommand::Explode(id));
                self.timers.schedule_once(
                    self.config.death_effect_secs,
                    GameTimer::DisableEnemy(id),
                );
                self.on_enemy_killed(enemy_type, column);
            }
            EnemyReaction::Boundary(side) => {
                let turned = self.formation.on_boundary_collision(
                    side,
                    &mut self.enemies,
                    &mut self.timers,
                    GameTimer::FormationResume,
                );
                if turned {
                    debug!(heading = ?self.formation.direction(), "formation turned");
                }
            }
            EnemyReaction::ReachedBottom => {
                info!(enemy = id.0, "enemy reached the bottom");
                self.game_over();
            }
            EnemyReaction::Ignored => {}
        }
    }

    pub fn on_defense_collision(&mut self, index: usize, tag: CollisionTag) {
        let Some(defense) = self.defenses.get_mut(index) else {
            return;
        };

        match defense.on_collision(tag) {
            DefenseReaction::Damaged { .. } => {
                self.commands.push(HostCommand::PlaySound(Sound::Hit));
            }
            DefenseReaction::Destroyed => {
                debug!(defense = index, "defense destroyed");
                self.commands.push(HostCommand::PlaySound(Sound::Dead));
            }
            DefenseReaction::Ignored => {}
        }
    }

    pub fn on_player_collision(&mut self, tag: CollisionTag) {
        match self.player.on_collision(tag) {
            PlayerReaction::Killed => {
                self.commands.push(HostCommand::PlaySound(Sound::Dead));
                self.on_player_killed();
            }
            PlayerReaction::Caught => self.game_over(),
            PlayerReaction::Ignored => {}
        }
    }

    /// Projectiles are destroyed by anything they touch
    pub fn on_projectile_collision(&mut self, id: ProjectileId, _tag: CollisionTag) {
        if self.projectiles.remove(&id).is_some() {
            self.player.release_shot(id);
            self.commands.push(HostCommand::DespawnProjectile(id));
        }
    }

    pub fn on_enemy_killed(&mut self, enemy_type: EnemyType, column: usize) {
        if self.phase.is_terminal() {
            return;
        }

        self.session.score += enemy_type.get_points();
        self.session.enemies_alive = self.session.enemies_alive.saturating_sub(1);
        self.hud.score_text = hud::format_score(self.session.score);
        debug!(
            score = self.session.score,
            alive = self.session.enemies_alive,
            "enemy killed"
        );

        if self.session.enemies_alive > 0 {
            self.update_shooter(column);
        } else {
            self.complete_level();
        }
    }

    fn complete_level(&mut self) {
        let level = self.session.level;
        self.phase = GamePhase::LevelComplete { level };
        info!(level, score = self.session.score, "level complete");

        self.formation.stop(&mut self.enemies, &mut self.timers);
        self.cancel_speed_timer();
        self.cancel_countdown_timer();
        self.disable_player();
        self.clear_enemies();

        if self.levels.is_last(level) {
            self.game_complete();
        } else {
            self.start_level(level + 1);
        }
    }

    pub fn on_player_killed(&mut self) {
        if self.phase.is_terminal() {
            return;
        }

        self.session.lives = self.session.lives.saturating_sub(1);
        self.hud.lives_text = hud::format_lives(self.session.lives);
        info!(lives = self.session.lives, "player killed");

        if self.session.lives > 0 {
            self.player.reset();
            self.commands.push(HostCommand::ResetPlayerPosition);
        } else {
            self.game_over();
        }
    }

    pub fn game_over(&mut self) {
        if self.phase.is_terminal() {
            return;
        }

        self.phase = GamePhase::GameOver;
        info!(score = self.session.score, "game over");
        self.commands.push(HostCommand::StopMusic);
        self.commands.push(HostCommand::PlaySound(Sound::GameOver));

        self.formation.stop(&mut self.enemies, &mut self.timers);
        self.cancel_speed_timer();
        self.cancel_countdown_timer();
        self.hud.hide_countdown();
        self.disarm_all();
        self.disable_player();
        self.hud.game_over_panel = true;
    }

    pub fn game_complete(&mut self) {
        if self.phase.is_terminal() {
            return;
        }

        self.phase = GamePhase::GameComplete;
        info!(score = self.session.score, "game complete");
        self.commands.push(HostCommand::StopMusic);
        self.commands.push(HostCommand::PlaySound(Sound::GameEnd));

        self.disarm_all();
        self.disable_player();
        self.hud.game_end_panel = true;
    }

    /// Asks the host for a fresh game scene
    pub fn restart(&mut self) {
        self.commands.push(HostCommand::LoadScene(Scene::Game));
    }

    pub fn quit(&mut self) {
        self.commands.push(HostCommand::Quit);
    }

    /// Drops every subscription and pending timer before the session goes away
    pub fn teardown(&mut self) {
        self.speed_changes.clear();
        self.timers.clear();
        self.speed_timer = None;
        self.countdown_timer = None;
        debug!("session torn down");
    }

    /// Arms the lowest live enemy of `column` and disarms everyone above it
    fn update_shooter(&mut self, column: usize) {
        let shooter = self.grid.select_shooter(column, &self.enemies);
        let now = self.timers.now();
        let cadence = self.config.min_cadence..=self.config.max_cadence;

        for id in self.grid.column_bottom_up(column) {
            if let Some(enemy) = self.enemies.get_mut(&id) {
                enemy.set_can_fire(Some(id) == shooter, now, cadence.clone(), &mut self.rng);
            }
        }
    }

    fn cancel_speed_timer(&mut self) {
        if let Some(handle) = self.speed_timer.take() {
            self.timers.cancel(handle);
        }
    }

    fn cancel_countdown_timer(&mut self) {
        if let Some(handle) = self.countdown_timer.take() {
            self.timers.cancel(handle);
        }
    }

    fn disarm_all(&mut self) {
        for enemy in self.enemies.values_mut() {
            enemy.disarm();
        }
    }

    fn disable_player(&mut self) {
        self.player.disable();
        self.player.reset();
        self.commands.push(HostCommand::ResetPlayerPosition);
    }

    fn clear_enemies(&mut self) {
        for id in self.grid.clear() {
            if let Some(enemy) = self.enemies.remove(&id)
                && enemy.is_active()
            {
                self.commands.push(HostCommand::DespawnEnemy(id));
            }
        }
        self.enemies.clear();
        self.session.enemies_alive = 0;
    }

    /// Takes every command queued since the last call
    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.get(&id)
    }

    pub fn enemies(&self) -> &Roster {
        &self.enemies
    }

    pub fn defenses(&self) -> &[Defense] {
        &self.defenses
    }

    pub fn projectiles(&self) -> &BTreeMap<ProjectileId, Projectile> {
        &self.projectiles
    }

    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn grid(&self) -> &EnemyGrid {
        &self.grid
    }

    /// Seconds of game time since the session started
    pub fn now(&self) -> f32 {
        self.timers.now()
    }

    pub fn speed_timer_active(&self) -> bool {
        self.speed_timer
            .is_some_and(|handle| self.timers.is_scheduled(handle))
    }

    pub fn scheduled_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn speed_subscribers(&self) -> usize {
        self.speed_changes.len()
    }
}
