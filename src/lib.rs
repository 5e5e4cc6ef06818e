// Library exports for testing
pub use config::GameConfig;
pub use game::{CountdownStep, Game, GamePhase, Session};
pub use host::{Boundary, CollisionTag, HostCommand, PlayerInput, Scene, Sound};

pub mod app;
pub mod arena;
pub mod audio;
pub mod config;
pub mod entities;
pub mod events;
pub mod game;
pub mod grid;
pub mod host;
pub mod hud;
pub mod input;
pub mod levels;
pub mod menu;
pub mod renderer;
pub mod timers;
