use glam::Vec2;

#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Seconds left
    pub lifetime: f32,
    pub glyph: char,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, lifetime: f32, glyph: char) -> Self {
        Self {
            position,
            velocity,
            lifetime,
            glyph,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.lifetime = (self.lifetime - dt).max(0.0);
        self.position += self.velocity * dt;
    }

    pub fn is_dead(&self) -> bool {
        self.lifetime <= 0.0
    }
}

/// Burst of debris for an enemy's death effect, lasting `duration` seconds
pub fn create_explosion_particles(center: Vec2, duration: f32) -> Vec<Particle> {
    // 8 directions (cardinal + diagonal)
    let directions = [
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, -1.0),
        Vec2::new(0.0, -1.0),
        Vec2::new(-1.0, -1.0),
        Vec2::new(-1.0, 0.0),
        Vec2::new(-1.0, 1.0),
    ];

    let mut particles: Vec<Particle> = directions
        .iter()
        .map(|dir| Particle::new(center, dir.normalize() * 3.0, duration, '*'))
        .collect();

    // Central flash
    particles.push(Particle::new(center, Vec2::ZERO, duration * 0.5, 'o'));

    particles
}
