mod defense;
mod enemy;
mod formation;
mod player;
mod projectile;

use std::collections::BTreeMap;

// Re-export all public types
pub use defense::{Defense, DefenseReaction};
pub use enemy::{Enemy, EnemyId, EnemyReaction, EnemyType, REFIRE_CADENCE};
pub use formation::{Direction, Formation};
pub use player::{MAX_TILT, Player, PlayerReaction};
pub use projectile::{Projectile, ProjectileId, ProjectileOwner};

/// Every enemy of the current level, keyed by id
pub type Roster = BTreeMap<EnemyId, Enemy>;
