use crate::host::CollisionTag;

/// What a defense block wants done after a collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefenseReaction {
    /// Still standing; show the material for this health level
    Damaged { material: usize },
    Destroyed,
    Ignored,
}

/// A shield block between the player and the enemies. Health 0 still
/// stands; it goes down once health drops below zero.
#[derive(Debug, Clone)]
pub struct Defense {
    pub index: usize,
    health: i32,
    initial_health: i32,
    material: usize,
    enabled: bool,
}

impl Defense {
    pub fn new(index: usize, initial_health: i32) -> Self {
        let initial_health = initial_health.max(0);
        Self {
            index,
            health: initial_health,
            initial_health,
            material: initial_health as usize,
            enabled: true,
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    /// Index into the per-health-level materials; the initial health picks
    /// the undamaged look.
    pub fn material(&self) -> usize {
        self.material
    }

    /// Visible and collidable
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn on_collision(&mut self, tag: CollisionTag) -> DefenseReaction {
        match tag {
            CollisionTag::Bullet => self.on_hit_by_projectile(),
            CollisionTag::Enemy => self.on_hit_by_enemy(),
            _ => DefenseReaction::Ignored,
        }
    }

    pub fn on_hit_by_projectile(&mut self) -> DefenseReaction {
        if !self.enabled {
            return DefenseReaction::Ignored;
        }

        self.health -= 1;
        if self.health < 0 {
            self.enabled = false;
            DefenseReaction::Destroyed
        } else {
            self.material = self.health as usize;
            DefenseReaction::Damaged {
                material: self.material,
            }
        }
    }

    /// Enemies flatten a defense regardless of its health
    pub fn on_hit_by_enemy(&mut self) -> DefenseReaction {
        if !self.enabled {
            return DefenseReaction::Ignored;
        }

        self.enabled = false;
        DefenseReaction::Destroyed
    }

    pub fn reset(&mut self) {
        self.health = self.initial_health;
        self.material = self.initial_health as usize;
        self.enabled = true;
    }

    pub fn get_sprite(&self) -> &'static str {
        match self.material {
            0 => "#  #",
            1 => "#==#",
            _ => "####",
        }
    }
}
