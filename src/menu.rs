use crate::host::{HostCommand, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Play,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 2] = [MenuItem::Play, MenuItem::Quit];

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Play => "Play",
            MenuItem::Quit => "Quit",
        }
    }
}

/// Title screen: pick Play or Quit
#[derive(Debug, Clone, Default)]
pub struct Menu {
    selected: usize,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> MenuItem {
        MenuItem::ALL[self.selected]
    }

    /// Moves the cursor down, wrapping to the top
    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % MenuItem::ALL.len();
    }

    pub fn previous(&mut self) {
        self.selected = (self.selected + MenuItem::ALL.len() - 1) % MenuItem::ALL.len();
    }

    pub fn activate(&self) -> HostCommand {
        match self.selected() {
            MenuItem::Play => self.play(),
            MenuItem::Quit => self.exit(),
        }
    }

    pub fn play(&self) -> HostCommand {
        HostCommand::LoadScene(Scene::Game)
    }

    pub fn exit(&self) -> HostCommand {
        HostCommand::Quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_and_exit() {
        let menu = Menu::new();
        assert_eq!(menu.play(), HostCommand::LoadScene(Scene::Game));
        assert_eq!(menu.exit(), HostCommand::Quit);
    }

    #[test]
    fn test_cursor_wraps() {
        let mut menu = Menu::new();
        assert_eq!(menu.selected(), MenuItem::Play);
        menu.next();
        assert_eq!(menu.selected(), MenuItem::Quit);
        menu.next();
        assert_eq!(menu.selected(), MenuItem::Play);
        menu.previous();
        assert_eq!(menu.selected(), MenuItem::Quit);
    }

    #[test]
    fn test_activate_follows_cursor() {
        let mut menu = Menu::new();
        assert_eq!(menu.activate(), HostCommand::LoadScene(Scene::Game));
        menu.next();
        assert_eq!(menu.activate(), HostCommand::Quit);
    }
}
