use glam::Vec2;

use super::projectile::ProjectileId;
use crate::host::{CollisionTag, PlayerInput};

/// Tilt in degrees at full stick deflection
pub const MAX_TILT: f32 = 45.0;

/// What the player wants done after a collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerReaction {
    /// Shot by an enemy: costs a life
    Killed,
    /// An enemy reached the player: game over
    Caught,
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub velocity: Vec2,
    /// Visual roll in degrees, negative when moving right
    pub tilt: f32,
    speed: f32,
    enabled: bool,
    /// The one projectile allowed in flight
    shot: Option<ProjectileId>,
}

impl Player {
    pub fn new(speed: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            tilt: 0.0,
            speed,
            enabled: false,
            shot: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Per-tick movement from the sampled input. Does nothing while disabled.
    pub fn update(&mut self, input: &PlayerInput) {
        if !self.enabled {
            return;
        }

        let axis = input.horizontal.clamp(-1.0, 1.0);
        let mut velocity_x = axis * self.speed;
        if input.run {
            velocity_x *= 2.0;
        }
        self.velocity = Vec2::new(velocity_x, 0.0);
        self.tilt = axis * -MAX_TILT;
    }

    pub fn can_fire(&self) -> bool {
        self.enabled && self.shot.is_none()
    }

    pub fn shot(&self) -> Option<ProjectileId> {
        self.shot
    }

    /// Locks firing until `id` is gone
    pub fn record_shot(&mut self, id: ProjectileId) {
        self.shot = Some(id);
    }

    /// Unlocks firing if `id` was the player's projectile
    pub fn release_shot(&mut self, id: ProjectileId) {
        if self.shot == Some(id) {
            self.shot = None;
        }
    }

    pub fn on_collision(&self, tag: CollisionTag) -> PlayerReaction {
        match tag {
            CollisionTag::Bullet => PlayerReaction::Killed,
            CollisionTag::Enemy => PlayerReaction::Caught,
            _ => PlayerReaction::Ignored,
        }
    }

    /// Stops the ship; the host moves it back to the start position
    pub fn reset(&mut self) {
        self.velocity = Vec2::ZERO;
        self.tilt = 0.0;
    }

    pub fn get_sprite(&self) -> &'static str {
        if self.tilt < -1.0 {
            "/^/"
        } else if self.tilt > 1.0 {
            "\\^\\"
        } else {
            "/^\\"
        }
    }
}
