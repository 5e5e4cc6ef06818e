use std::ops::RangeInclusive;

use glam::Vec2;
use rand::Rng;

use super::formation::Direction;
use crate::host::{Boundary, CollisionTag};

/// Cadence range for every shot after the first one. Arming draws from the
/// configured `[min_cadence, max_cadence]` instead, so the first shot and the
/// refires follow different ranges unless the config happens to match this.
pub const REFIRE_CADENCE: RangeInclusive<f32> = 2.0..=6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyType {
    Octopus = 1,
    Crab = 2,
    Squid = 3,
}

impl EnemyType {
    /// Maps a level cell value to an enemy type. 0 and anything above 3 is empty.
    pub fn from_level_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(EnemyType::Octopus),
            2 => Some(EnemyType::Crab),
            3 => Some(EnemyType::Squid),
            _ => None,
        }
    }

    pub fn value(&self) -> u8 {
        *self as u8
    }

    pub fn get_points(&self) -> u32 {
        self.value() as u32 * 10
    }
}

/// What an enemy wants done after a collision
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyReaction {
    Killed { enemy_type: EnemyType, column: usize },
    /// Touched a side wall; the formation decides whether to turn.
    Boundary(Direction),
    ReachedBottom,
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EnemyId,
    pub enemy_type: EnemyType,
    pub row: usize,
    pub column: usize,
    pub velocity: Vec2,
    dead: bool,
    /// Cleared once the death effect has played out
    active: bool,
    can_fire: bool,
    /// Seconds to wait after `last_fire` before the next shot
    next_fire: f32,
    last_fire: f32,
}

impl Enemy {
    pub fn new(id: EnemyId, enemy_type: EnemyType, row: usize, column: usize) -> Self {
        Self {
            id,
            enemy_type,
            row,
            column,
            velocity: Vec2::ZERO,
            dead: false,
            active: true,
            can_fire: false,
            next_fire: 0.0,
            last_fire: 0.0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn can_fire(&self) -> bool {
        self.can_fire
    }

    pub fn next_fire(&self) -> f32 {
        self.next_fire
    }

    pub fn set_can_fire<R: Rng + ?Sized>(
        &mut self,
        value: bool,
        now: f32,
        cadence: RangeInclusive<f32>,
        rng: &mut R,
    ) {
        if value {
            self.arm(now, cadence, rng);
        } else {
            self.disarm();
        }
    }

    /// Allows firing and picks the delay before the first shot
    pub fn arm<R: Rng + ?Sized>(&mut self, now: f32, cadence: RangeInclusive<f32>, rng: &mut R) {
        self.can_fire = true;
        self.next_fire = rng.random_range(cadence);
        self.last_fire = now;
    }

    pub fn disarm(&mut self) {
        self.can_fire = false;
    }

    /// Per-tick fire check. Returns true when a projectile should be spawned
    /// beneath this enemy.
    pub fn try_fire<R: Rng + ?Sized>(&mut self, now: f32, rng: &mut R) -> bool {
        if !self.can_fire || self.dead || now - self.last_fire <= self.next_fire {
            return false;
        }

        self.last_fire = now;
        self.next_fire = rng.random_range(REFIRE_CADENCE);
        true
    }

    pub fn on_collision(&mut self, tag: CollisionTag) -> EnemyReaction {
        if self.dead {
            return EnemyReaction::Ignored;
        }

        match tag {
            CollisionTag::Bullet | CollisionTag::Defense => {
                // Must be dead before anyone is told, so shooter selection skips us
                self.dead = true;
                self.can_fire = false;
                self.velocity = Vec2::ZERO;
                EnemyReaction::Killed {
                    enemy_type: self.enemy_type,
                    column: self.column,
                }
            }
            CollisionTag::Boundary(Boundary::Left) => EnemyReaction::Boundary(Direction::Left),
            CollisionTag::Boundary(Boundary::Right) => EnemyReaction::Boundary(Direction::Right),
            CollisionTag::Boundary(Boundary::Bottom) => EnemyReaction::ReachedBottom,
            CollisionTag::Boundary(Boundary::Top) | CollisionTag::Enemy | CollisionTag::Player => {
                EnemyReaction::Ignored
            }
        }
    }

    /// Called once the death effect has finished
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn get_sprite(&self) -> &'static str {
        match self.enemy_type {
            EnemyType::Octopus => "<O>",
            EnemyType::Crab => "/M\\",
            EnemyType::Squid => "{@}",
        }
    }
}
