//! Kinematic play field for the terminal host.
//!
//! Keeps positions for everything the game spawned, moves them by the
//! velocities the game sets, and turns overlapping boxes into collision
//! notifications. A pair is reported once when it starts touching.

pub mod particle;

use std::collections::{BTreeMap, HashSet};

use glam::Vec2;

pub use particle::{Particle, create_explosion_particles};

use crate::config::GameConfig;
use crate::entities::{EnemyId, ProjectileId, ProjectileOwner};
use crate::game::Game;
use crate::host::{Boundary, CollisionTag, HostCommand};

/// Side walls sit at `x = ±HALF_WIDTH`
pub const HALF_WIDTH: f32 = 15.0;
pub const TOP: f32 = 16.0;
/// Enemies touching this line have invaded
pub const BOTTOM: f32 = -13.0;
pub const DEFENSE_Y: f32 = -8.0;

const PLAYER_HALF: Vec2 = Vec2::new(1.0, 0.5);
const ENEMY_HALF: Vec2 = Vec2::new(1.0, 0.5);
const DEFENSE_HALF: Vec2 = Vec2::new(2.0, 0.5);
const PROJECTILE_HALF: Vec2 = Vec2::new(0.1, 0.4);
/// Projectiles spawn this far above the player or below an enemy
const MUZZLE_OFFSET: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodyKey {
    Player,
    Enemy(EnemyId),
    Defense(usize),
    Projectile(ProjectileId),
    Boundary(Boundary),
}

impl BodyKey {
    /// How this body introduces itself to whatever it hits
    pub fn tag(&self) -> CollisionTag {
        match self {
            BodyKey::Player => CollisionTag::Player,
            BodyKey::Enemy(_) => CollisionTag::Enemy,
            BodyKey::Defense(_) => CollisionTag::Defense,
            BodyKey::Projectile(_) => CollisionTag::Bullet,
            BodyKey::Boundary(side) => CollisionTag::Boundary(*side),
        }
    }
}

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub half_extents: Vec2,
}

impl Body {
    pub fn new(position: Vec2, half_extents: Vec2) -> Self {
        Self {
            position,
            half_extents,
        }
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        let gap = (self.position - other.position).abs();
        let reach = self.half_extents + other.half_extents;
        gap.x < reach.x && gap.y < reach.y
    }

    /// Edges of the field this box is touching or beyond
    pub fn boundaries(&self) -> Vec<Boundary> {
        let min = self.position - self.half_extents;
        let max = self.position + self.half_extents;
        let mut sides = Vec::new();
        if min.x <= -HALF_WIDTH {
            sides.push(Boundary::Left);
        }
        if max.x >= HALF_WIDTH {
            sides.push(Boundary::Right);
        }
        if max.y >= TOP {
            sides.push(Boundary::Top);
        }
        if min.y <= BOTTOM {
            sides.push(Boundary::Bottom);
        }
        sides
    }
}

fn ordered(a: BodyKey, b: BodyKey) -> (BodyKey, BodyKey) {
    if a <= b { (a, b) } else { (b, a) }
}

pub struct Arena {
    player: Body,
    player_start: Vec2,
    enemies: BTreeMap<EnemyId, Body>,
    defenses: Vec<Body>,
    projectiles: BTreeMap<ProjectileId, Body>,
    particles: Vec<Particle>,
    death_effect_secs: f32,
    /// Pairs overlapping at the end of the last step
    touching: HashSet<(BodyKey, BodyKey)>,
}

impl Arena {
    pub fn new(config: &GameConfig) -> Self {
        // Spread the defenses evenly across the field
        let count = config.defense_count.max(1) as f32;
        let slot = HALF_WIDTH * 2.0 / count;
        let defenses = (0..config.defense_count)
            .map(|i| {
                let x = -HALF_WIDTH + slot * (i as f32 + 0.5);
                Body::new(Vec2::new(x, DEFENSE_Y), DEFENSE_HALF)
            })
            .collect();

        Self {
            player: Body::new(config.player_start, PLAYER_HALF),
            player_start: config.player_start,
            enemies: BTreeMap::new(),
            defenses,
            projectiles: BTreeMap::new(),
            particles: Vec::new(),
            death_effect_secs: config.death_effect_secs,
            touching: HashSet::new(),
        }
    }

    pub fn player(&self) -> &Body {
        &self.player
    }

    pub fn enemies(&self) -> &BTreeMap<EnemyId, Body> {
        &self.enemies
    }

    pub fn defenses(&self) -> &[Body] {
        &self.defenses
    }

    pub fn projectiles(&self) -> &BTreeMap<ProjectileId, Body> {
        &self.projectiles
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Carries out the spatial part of a command. Sound, music and scene
    /// commands are not ours and are ignored.
    pub fn apply(&mut self, command: &HostCommand) {
        match command {
            HostCommand::SpawnEnemy { id, position, .. } => {
                self.enemies.insert(*id, Body::new(*position, ENEMY_HALF));
            }
            HostCommand::DespawnEnemy(id) => {
                self.enemies.remove(id);
            }
            HostCommand::SpawnProjectile { id, owner, .. } => {
                let origin = match owner {
                    ProjectileOwner::Player => {
                        Some(self.player.position + Vec2::Y * MUZZLE_OFFSET)
                    }
                    ProjectileOwner::Enemy(enemy) => self
                        .enemies
                        .get(enemy)
                        .map(|body| body.position + Vec2::NEG_Y * MUZZLE_OFFSET),
                };
                if let Some(origin) = origin {
                    self.projectiles
                        .insert(*id, Body::new(origin, PROJECTILE_HALF));
                }
            }
            HostCommand::DespawnProjectile(id) => {
                self.projectiles.remove(id);
            }
            HostCommand::Explode(id) => {
                if let Some(body) = self.enemies.get(id) {
                    self.particles.extend(create_explosion_particles(
                        body.position,
                        self.death_effect_secs,
                    ));
                }
            }
            HostCommand::ResetPlayerPosition => {
                self.player.position = self.player_start;
            }
            _ => {}
        }
    }

    /// Moves every body by the velocity the game currently gives it
    pub fn step(&mut self, dt: f32, game: &Game) {
        let player = &mut self.player;
        player.position += game.player().velocity * dt;
        let limit = HALF_WIDTH - player.half_extents.x;
        player.position.x = player.position.x.clamp(-limit, limit);

        for (id, body) in self.enemies.iter_mut() {
            if let Some(enemy) = game.enemy(*id) {
                body.position += enemy.velocity * dt;
            }
        }

        for (id, body) in self.projectiles.iter_mut() {
            if let Some(projectile) = game.projectiles().get(id) {
                body.position += projectile.velocity * dt;
            }
        }

        for particle in &mut self.particles {
            particle.update(dt);
        }
        self.particles.retain(|p| !p.is_dead());
    }

    /// Pairs that started overlapping since the last call, in a stable order.
    /// Dead enemies and destroyed defenses don't collide.
    pub fn contacts(&mut self, game: &Game) -> Vec<(BodyKey, BodyKey)> {
        let enemies: Vec<(BodyKey, Body)> = self
            .enemies
            .iter()
            .filter(|(id, _)| game.enemy(**id).is_some_and(|e| !e.is_dead()))
            .map(|(id, body)| (BodyKey::Enemy(*id), *body))
            .collect();
        let defenses: Vec<(BodyKey, Body)> = self
            .defenses
            .iter()
            .enumerate()
            .filter(|(i, _)| game.defenses().get(*i).is_some_and(|d| d.is_enabled()))
            .map(|(i, body)| (BodyKey::Defense(i), *body))
            .collect();
        let projectiles: Vec<(BodyKey, Body)> = self
            .projectiles
            .iter()
            .map(|(id, body)| (BodyKey::Projectile(*id), *body))
            .collect();
        let player = (BodyKey::Player, self.player);

        let mut current = HashSet::new();
        let mut check = |a: &(BodyKey, Body), b: &(BodyKey, Body)| {
            if a.1.overlaps(&b.1) {
                current.insert(ordered(a.0, b.0));
            }
        };

        for (i, projectile) in projectiles.iter().enumerate() {
            for other in &projectiles[i + 1..] {
                check(projectile, other);
            }
            for other in enemies.iter().chain(defenses.iter()) {
                check(projectile, other);
            }
            check(projectile, &player);
        }
        for enemy in &enemies {
            for defense in &defenses {
                check(enemy, defense);
            }
            check(enemy, &player);
        }

        for (key, body) in enemies.iter().chain(projectiles.iter()) {
            for side in body.boundaries() {
                current.insert(ordered(*key, BodyKey::Boundary(side)));
            }
        }

        let mut entered: Vec<_> = current.difference(&self.touching).copied().collect();
        entered.sort();
        self.touching = current;
        entered
    }
}

/// Whether a body was removed or knocked out earlier in the same frame
fn is_gone(game: &Game, key: BodyKey) -> bool {
    match key {
        BodyKey::Projectile(id) => !game.projectiles().contains_key(&id),
        BodyKey::Enemy(id) => game.enemy(id).is_none_or(|e| e.is_dead()),
        BodyKey::Defense(i) => game.defenses().get(i).is_none_or(|d| !d.is_enabled()),
        BodyKey::Player | BodyKey::Boundary(_) => false,
    }
}

fn notify(game: &mut Game, key: BodyKey, other: CollisionTag) {
    match key {
        BodyKey::Player => game.on_player_collision(other),
        BodyKey::Enemy(id) => game.on_enemy_collision(id, other),
        BodyKey::Defense(i) => game.on_defense_collision(i, other),
        BodyKey::Projectile(id) => game.on_projectile_collision(id, other),
        BodyKey::Boundary(_) => {}
    }
}

/// Tells both sides of every contact what they hit. A projectile stops at
/// the first thing it touches.
pub fn dispatch(game: &mut Game, contacts: &[(BodyKey, BodyKey)]) {
    for (a, b) in contacts {
        if is_gone(game, *a) || is_gone(game, *b) {
            continue;
        }
        notify(game, *a, b.tag());
        notify(game, *b, a.tag());
    }
}
