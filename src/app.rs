use color_eyre::Result;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::arena::{self, Arena};
use crate::audio::{AudioManager, SOUND_DIR};
use crate::config::GameConfig;
use crate::game::Game;
use crate::host::{HostCommand, Scene};
use crate::input::{InputAction, InputManager};
use crate::menu::Menu;
use crate::renderer::{GameRenderer, RenderView};

/// Longest step fed to the game, so a stalled terminal doesn't teleport
/// everything
const MAX_FRAME_SECS: f32 = 0.1;

/// The terminal host: owns the scenes and runs the frame loop
pub struct App {
    running: bool,
    scene: Scene,
    config: GameConfig,
    menu: Menu,
    /// Present while the game scene is loaded
    game: Option<Game>,
    arena: Arena,
    /// Without release events held keys are re-read from key repeats
    key_releases: bool,
    last_frame_time: Instant,
    input_manager: InputManager,
    renderer: GameRenderer,
    audio_manager: Option<AudioManager>,
}

impl App {
    pub fn new(config: GameConfig, key_releases: bool) -> Self {
        let audio_manager =
            match AudioManager::new(SOUND_DIR, config.sfx_volume, config.music_volume) {
                Ok(audio) => Some(audio),
                Err(err) => {
                    warn!("continuing without audio: {:#}", err);
                    None
                }
            };

        Self {
            running: true,
            scene: Scene::Menu,
            menu: Menu::new(),
            game: None,
            arena: Arena::new(&config),
            key_releases,
            last_frame_time: Instant::now(),
            input_manager: InputManager::new(),
            renderer: GameRenderer::new(),
            audio_manager,
            config,
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        while self.running {
            let now = Instant::now();
            let dt = now
                .duration_since(self.last_frame_time)
                .as_secs_f32()
                .min(MAX_FRAME_SECS);
            self.last_frame_time = now;

            terminal.draw(|frame| {
                let area = frame.area();
                let view = match &self.game {
                    Some(game) => RenderView::Game {
                        game,
                        arena: &self.arena,
                        area,
                    },
                    None => RenderView::Menu {
                        menu: &self.menu,
                        area,
                    },
                };
                self.renderer.render(frame, &view);
            })?;

            if !self.key_releases {
                self.input_manager.release_all();
            }
            self.input_manager.poll_events(self.scene)?;
            let actions = self.input_manager.actions().to_vec();
            self.process_actions(&actions)?;

            self.update(dt)?;

            // Small sleep to maintain ~60 FPS and prevent CPU spinning
            std::thread::sleep(Duration::from_millis(8));
        }

        if let Some(game) = self.game.as_mut() {
            game.teardown();
        }
        Ok(())
    }

    fn process_actions(&mut self, actions: &[InputAction]) -> Result<()> {
        for action in actions {
            let command = match (action, self.game.as_mut()) {
                (InputAction::Quit, Some(game)) => {
                    game.quit();
                    None
                }
                (InputAction::Quit, None) => Some(self.menu.exit()),
                (InputAction::Restart, Some(game)) => {
                    game.restart();
                    None
                }
                (InputAction::MenuNext, None) => {
                    self.menu.next();
                    None
                }
                (InputAction::MenuPrevious, None) => {
                    self.menu.previous();
                    None
                }
                (InputAction::MenuSelect, None) => Some(self.menu.activate()),
                _ => None,
            };

            if let Some(command) = command {
                self.execute(command)?;
            }
        }
        Ok(())
    }

    /// One game frame: logic, movement, collisions, then the game's commands
    fn update(&mut self, dt: f32) -> Result<()> {
        let Some(game) = self.game.as_mut() else {
            return Ok(());
        };

        let input = self.input_manager.player_input();
        game.update(dt, &input);
        self.arena.step(dt, game);
        let contacts = self.arena.contacts(game);
        arena::dispatch(game, &contacts);

        for command in game.drain_commands() {
            self.execute(command)?;
        }
        Ok(())
    }

    fn execute(&mut self, command: HostCommand) -> Result<()> {
        match command {
            HostCommand::PlaySound(sound) => {
                if let Some(audio) = &self.audio_manager {
                    audio.play(sound);
                }
            }
            HostCommand::StopMusic => {
                if let Some(audio) = self.audio_manager.as_mut() {
                    audio.stop_music();
                }
            }
            HostCommand::LoadScene(scene) => self.load_scene(scene)?,
            HostCommand::Quit => {
                info!("quit requested");
                self.running = false;
            }
            other => self.arena.apply(&other),
        }
        Ok(())
    }

    fn load_scene(&mut self, scene: Scene) -> Result<()> {
        if let Some(mut previous) = self.game.take() {
            previous.teardown();
        }
        info!(?scene, "loading scene");
        self.scene = scene;

        match scene {
            Scene::Menu => {
                self.menu = Menu::new();
            }
            Scene::Game => {
                let mut game = Game::new(self.config.clone())?;
                self.arena = Arena::new(&self.config);
                if let Some(audio) = self.audio_manager.as_mut() {
                    audio.play_music();
                }
                game.start();
                let commands = game.drain_commands();
                self.game = Some(game);
                for command in commands {
                    self.execute(command)?;
                }
            }
        }
        Ok(())
    }
}
