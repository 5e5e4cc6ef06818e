use glam::Vec2;

use super::enemy::EnemyId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(pub u32);

/// Who fired the projectile. Only decides where it spawns and which way it
/// flies; what it hits is handled the same for everyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectileOwner {
    Player,
    Enemy(EnemyId),
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: ProjectileId,
    pub owner: ProjectileOwner,
    pub velocity: Vec2,
    /// Degrees, copied from the shooter
    pub rotation: f32,
}

impl Projectile {
    pub fn new(id: ProjectileId, owner: ProjectileOwner, speed: f32, rotation: f32) -> Self {
        let heading = match owner {
            ProjectileOwner::Player => Vec2::Y,
            ProjectileOwner::Enemy(_) => Vec2::NEG_Y,
        };

        Self {
            id,
            owner,
            velocity: heading * speed,
            rotation,
        }
    }

    pub fn is_from_player(&self) -> bool {
        self.owner == ProjectileOwner::Player
    }

    pub fn get_sprite(&self) -> char {
        match self.owner {
            ProjectileOwner::Player => '|',
            ProjectileOwner::Enemy(_) => '!',
        }
    }
}
