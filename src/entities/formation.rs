use glam::Vec2;

use super::Roster;
use crate::events::{Channel, Listener, SpeedChange};
use crate::timers::{TimerHandle, Timers};

/// Horizontal heading of the formation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn sign(&self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Moves every live enemy in lockstep: across, one step down at a wall, and
/// back the other way.
#[derive(Debug, Clone)]
pub struct Formation {
    current_speed: f32,
    direction: Direction,
    /// Last velocity sent to the members
    velocity: Vec2,
    /// Pending "start moving sideways again" after a drop
    resume_timer: Option<TimerHandle>,
}

impl Default for Formation {
    fn default() -> Self {
        Self::new()
    }
}

impl Formation {
    pub fn new() -> Self {
        Self {
            current_speed: 0.0,
            direction: Direction::Right,
            velocity: Vec2::ZERO,
            resume_timer: None,
        }
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn is_dropping(&self) -> bool {
        self.resume_timer.is_some()
    }

    /// Sends `velocity` to every live member. Dead or missing members are skipped.
    fn broadcast(&mut self, velocity: Vec2, members: &mut Roster) {
        self.velocity = velocity;
        for enemy in members.values_mut().filter(|e| !e.is_dead()) {
            enemy.velocity = velocity;
        }
    }

    fn horizontal_velocity(&self) -> Vec2 {
        Vec2::X * self.current_speed * self.direction.sign()
    }

    pub fn start_moving(
        &mut self,
        speed: f32,
        members: &mut Roster,
        speed_changes: &mut Channel<Listener, SpeedChange>,
    ) {
        self.current_speed = speed;
        self.direction = Direction::Right;
        self.broadcast(self.horizontal_velocity(), members);
        speed_changes.subscribe(Listener::Formation);
    }

    pub fn on_speed_increment(&mut self, delta: f32, members: &mut Roster) {
        self.current_speed += delta;
        self.broadcast(self.horizontal_velocity(), members);
    }

    pub fn stop<E>(&mut self, members: &mut Roster, timers: &mut Timers<E>) {
        self.broadcast(Vec2::ZERO, members);
        if let Some(handle) = self.resume_timer.take() {
            timers.cancel(handle);
        }
    }

    /// Handles a member touching a side wall. Only a wall on the side we are
    /// heading towards turns the formation, so several members touching at
    /// once turn it a single time. Returns whether it turned.
    pub fn on_boundary_collision<E>(
        &mut self,
        side: Direction,
        members: &mut Roster,
        timers: &mut Timers<E>,
        resume_event: E,
    ) -> bool {
        if side != self.direction || self.current_speed <= 0.0 {
            return false;
        }

        self.broadcast(Vec2::NEG_Y * self.current_speed, members);
        self.direction = self.direction.flipped();

        // One unit of drop at the current speed
        let drop_secs = 1.0 / self.current_speed;
        if let Some(previous) = self.resume_timer.take() {
            timers.cancel(previous);
        }
        self.resume_timer = Some(timers.schedule_once(drop_secs, resume_event));
        true
    }

    /// Timer target: start moving sideways in the current direction
    pub fn resume(&mut self, members: &mut Roster) {
        self.resume_timer = None;
        self.broadcast(self.horizontal_velocity(), members);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Enemy, EnemyId, EnemyType};
    use crate::host::CollisionTag;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Resume;

    fn roster(count: u32) -> Roster {
        (0..count)
            .map(|i| {
                let id = EnemyId(i);
                (id, Enemy::new(id, EnemyType::Octopus, 0, i as usize))
            })
            .collect()
    }

    fn started(speed: f32, members: &mut Roster) -> Formation {
        let mut channel = Channel::new();
        let mut formation = Formation::new();
        formation.start_moving(speed, members, &mut channel);
        formation
    }

    #[test]
    fn test_formation_new() {
        let formation = Formation::new();
        assert_eq!(formation.direction(), Direction::Right);
        assert_eq!(formation.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_start_moving_broadcasts_rightward() {
        let mut members = roster(3);
        let mut channel = Channel::new();
        let mut formation = Formation::new();
        formation.start_moving(2.0, &mut members, &mut channel);

        assert!(members.values().all(|e| e.velocity == Vec2::new(2.0, 0.0)));
        assert!(channel.is_subscribed(&Listener::Formation));
    }

    #[test]
    fn test_broadcast_skips_dead_members() {
        let mut members = roster(2);
        members
            .get_mut(&EnemyId(1))
            .unwrap()
            .on_collision(CollisionTag::Bullet);
        let _formation = started(1.5, &mut members);
        assert_eq!(members[&EnemyId(0)].velocity, Vec2::new(1.5, 0.0));
        assert_eq!(members[&EnemyId(1)].velocity, Vec2::ZERO);
    }

    #[test]
    fn test_speed_increment_keeps_direction() {
        let mut members = roster(1);
        let mut timers = Timers::new();
        let mut formation = started(1.0, &mut members);
        formation.on_boundary_collision(Direction::Right, &mut members, &mut timers, Resume);
        formation.on_speed_increment(0.5, &mut members);
        assert_eq!(formation.current_speed(), 1.5);
        assert_eq!(members[&EnemyId(0)].velocity, Vec2::new(-1.5, 0.0));
    }

    #[test]
    fn test_matching_side_turns_and_drops() {
        let mut members = roster(2);
        let mut timers = Timers::new();
        let mut formation = started(2.0, &mut members);

        assert!(formation.on_boundary_collision(
            Direction::Right,
            &mut members,
            &mut timers,
            Resume
        ));
        assert_eq!(formation.direction(), Direction::Left);
        assert_eq!(members[&EnemyId(0)].velocity, Vec2::new(0.0, -2.0));
        assert!(formation.is_dropping());

        // Resume after 1 / speed seconds
        assert!(timers.advance(0.4).is_empty());
        assert_eq!(timers.advance(0.2), vec![Resume]);
        formation.resume(&mut members);
        assert_eq!(members[&EnemyId(1)].velocity, Vec2::new(-2.0, 0.0));
        assert!(!formation.is_dropping());
    }

    #[test]
    fn test_non_matching_side_is_ignored() {
        let mut members = roster(1);
        let mut timers = Timers::new();
        let mut formation = started(1.0, &mut members);

        assert!(!formation.on_boundary_collision(
            Direction::Left,
            &mut members,
            &mut timers,
            Resume
        ));
        assert_eq!(formation.direction(), Direction::Right);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_simultaneous_touches_turn_once() {
        let mut members = roster(4);
        let mut timers = Timers::new();
        let mut formation = started(1.0, &mut members);

        let turns = (0..4)
            .filter(|_| {
                formation.on_boundary_collision(Direction::Right, &mut members, &mut timers, Resume)
            })
            .count();
        assert_eq!(turns, 1);
        assert_eq!(formation.direction(), Direction::Left);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_stop_cancels_resume() {
        let mut members = roster(2);
        let mut timers = Timers::new();
        let mut formation = started(1.0, &mut members);
        formation.on_boundary_collision(Direction::Right, &mut members, &mut timers, Resume);

        formation.stop(&mut members, &mut timers);
        assert!(members.values().all(|e| e.velocity == Vec2::ZERO));
        assert!(timers.is_empty());
        assert!(timers.advance(10.0).is_empty());
    }

    // Property-based tests
    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_direction_flips_once_per_matching_touch(
                touches in prop::collection::vec(prop::bool::ANY, 0..40)
            ) {
                let mut members = roster(3);
                let mut timers = Timers::new();
                let mut formation = started(1.0, &mut members);

                for touch_right in touches {
                    let side = if touch_right { Direction::Right } else { Direction::Left };
                    let before = formation.direction();
                    let turned = formation.on_boundary_collision(side, &mut members, &mut timers, Resume);
                    prop_assert_eq!(turned, side == before);
                    if turned {
                        prop_assert_eq!(formation.direction(), before.flipped());
                    } else {
                        prop_assert_eq!(formation.direction(), before);
                    }
                    // Never more than one pending resume
                    prop_assert!(timers.len() <= 1);
                }
            }
        }
    }
}
