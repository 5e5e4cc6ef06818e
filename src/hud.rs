//! Text and panels the host shows over the play field.

pub fn format_score(score: u32) -> String {
    format!("Score: {:04}", score)
}

pub fn format_lives(lives: u32) -> String {
    format!("Lives: {}", lives)
}

pub fn format_level(level: usize) -> String {
    format!("Level: {:02}", level)
}

/// Shown before each level starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownPanel {
    /// e.g. `Level 01`
    pub level_text: String,
    /// `3`, `2`, `1` or `GO`
    pub number_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub score_text: String,
    pub lives_text: String,
    pub level_text: String,
    pub countdown: Option<CountdownPanel>,
    pub game_over_panel: bool,
    pub game_end_panel: bool,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            score_text: format_score(0),
            lives_text: format_lives(0),
            level_text: format_level(0),
            countdown: None,
            game_over_panel: false,
            game_end_panel: false,
        }
    }
}

impl Hud {
    pub fn show_countdown(&mut self, level: usize, label: &str) {
        self.countdown = Some(CountdownPanel {
            level_text: format!("Level {:02}", level),
            number_text: label.to_string(),
        });
    }

    pub fn hide_countdown(&mut self) {
        self.countdown = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting() {
        assert_eq!(format_score(70), "Score: 0070");
        assert_eq!(format_score(12345), "Score: 12345");
        assert_eq!(format_lives(3), "Lives: 3");
        assert_eq!(format_level(2), "Level: 02");
    }

    #[test]
    fn test_countdown_panel() {
        let mut hud = Hud::default();
        hud.show_countdown(1, "3");
        let panel = hud.countdown.clone().unwrap();
        assert_eq!(panel.level_text, "Level 01");
        assert_eq!(panel.number_text, "3");

        hud.hide_countdown();
        assert!(hud.countdown.is_none());
    }
}
