//! Messages passed between the game logic and the host that runs it.
//!
//! The host owns positions, collision detection, drawing and sound. It feeds
//! the game collision notifications and per-frame input, and drains the
//! [`HostCommand`]s the game queues up in return.

use glam::Vec2;

use crate::entities::{EnemyId, EnemyType, ProjectileId, ProjectileOwner};

/// Edges of the play field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Boundary {
    Left,
    Right,
    Top,
    Bottom,
}

/// Category of the object an entity collided with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionTag {
    Bullet,
    Enemy,
    Defense,
    Player,
    Boundary(Boundary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    // Entity clips
    Shoot,
    Dead,
    Hit,
    // Controller clips
    Three,
    Two,
    One,
    Go,
    GameOver,
    GameEnd,
}

impl Sound {
    pub const ALL: [Sound; 9] = [
        Sound::Shoot,
        Sound::Dead,
        Sound::Hit,
        Sound::Three,
        Sound::Two,
        Sound::One,
        Sound::Go,
        Sound::GameOver,
        Sound::GameEnd,
    ];

    /// File stem of the clip, e.g. `assets/sounds/<name>.wav`
    pub fn clip_name(&self) -> &'static str {
        match self {
            Sound::Shoot => "shoot",
            Sound::Dead => "dead",
            Sound::Hit => "hit",
            Sound::Three => "three",
            Sound::Two => "two",
            Sound::One => "one",
            Sound::Go => "go",
            Sound::GameOver => "game_over",
            Sound::GameEnd => "game_end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Menu,
    Game,
}

/// Input sampled by the host once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Horizontal axis in [-1, 1]
    pub horizontal: f32,
    pub fire: bool,
    pub run: bool,
}

/// Work the game asks the host to carry out
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    SpawnEnemy {
        id: EnemyId,
        enemy_type: EnemyType,
        position: Vec2,
    },
    DespawnEnemy(EnemyId),
    /// Spawn a projectile next to its owner: above the player, below an enemy.
    SpawnProjectile {
        id: ProjectileId,
        owner: ProjectileOwner,
        velocity: Vec2,
        rotation: f32,
    },
    DespawnProjectile(ProjectileId),
    /// Play the death effect at the enemy's position
    Explode(EnemyId),
    /// Teleport the player back to its start position
    ResetPlayerPosition,
    PlaySound(Sound),
    StopMusic,
    LoadScene(Scene),
    Quit,
}
