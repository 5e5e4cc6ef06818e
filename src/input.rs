use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::host::{PlayerInput, Scene};

/// One-shot actions triggered by a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    MenuNext,
    MenuPrevious,
    MenuSelect,
    Restart,
    Quit,
}

/// Tracks the state of keys that can be held down for continuous input
#[derive(Debug, Default)]
struct KeyState {
    left: bool,
    right: bool,
    fire: bool,
    run: bool,
}

/// Polls the terminal and turns raw key events into player input and
/// one-shot actions
pub struct InputManager {
    key_state: KeyState,
    oneshot_actions: Vec<InputAction>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            key_state: KeyState::default(),
            oneshot_actions: Vec::new(),
        }
    }

    /// Polls for all input events and stores one-shot actions.
    /// Call once per frame before reading actions or player input.
    pub fn poll_events(&mut self, scene: Scene) -> color_eyre::Result<()> {
        self.oneshot_actions.clear();

        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key_event) = event::read()? {
                self.handle_key_event(key_event, scene);
            }
        }

        Ok(())
    }

    fn handle_key_event(&mut self, key_event: KeyEvent, scene: Scene) {
        match key_event.kind {
            KeyEventKind::Press => self.handle_key_press(key_event, scene),
            KeyEventKind::Release => self.handle_key_release(key_event.code),
            _ => {}
        }
    }

    fn handle_key_press(&mut self, key_event: KeyEvent, scene: Scene) {
        // Quit works everywhere
        if matches!(
            key_event.code,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
        ) || (key_event.code == KeyCode::Char('c')
            && key_event.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.oneshot_actions.push(InputAction::Quit);
            return;
        }

        match scene {
            Scene::Menu => match key_event.code {
                KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
                    self.oneshot_actions.push(InputAction::MenuPrevious);
                }
                KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => {
                    self.oneshot_actions.push(InputAction::MenuNext);
                }
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.oneshot_actions.push(InputAction::MenuSelect);
                }
                _ => {}
            },
            Scene::Game => match key_event.code {
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    self.oneshot_actions.push(InputAction::Restart);
                }
                KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => {
                    self.key_state.left = true;
                    self.key_state.right = false;
                }
                KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => {
                    self.key_state.right = true;
                    self.key_state.left = false;
                }
                KeyCode::Char(' ') => {
                    self.key_state.fire = true;
                }
                KeyCode::Char('x') | KeyCode::Char('X') => {
                    self.key_state.run = true;
                }
                _ => {}
            },
        }
    }

    fn handle_key_release(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => {
                self.key_state.left = false;
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => {
                self.key_state.right = false;
            }
            KeyCode::Char(' ') => {
                self.key_state.fire = false;
            }
            KeyCode::Char('x') | KeyCode::Char('X') => {
                self.key_state.run = false;
            }
            _ => {}
        }
    }

    /// Terminals without key release events never clear held keys, so the
    /// host calls this each frame in that mode.
    pub fn release_all(&mut self) {
        self.key_state = KeyState::default();
    }

    pub fn actions(&self) -> &[InputAction] {
        &self.oneshot_actions
    }

    /// Held keys as the game's per-frame input
    pub fn player_input(&self) -> PlayerInput {
        let horizontal = match (self.key_state.left, self.key_state.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };

        PlayerInput {
            horizontal,
            fire: self.key_state.fire,
            run: self.key_state.run,
        }
    }
}
