use crate::arena::{self, Arena};
use crate::entities::EnemyType;
use crate::game::Game;
use crate::menu::{Menu, MenuItem};
use glam::Vec2;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// What the renderer needs to draw one frame
pub enum RenderView<'a> {
    Menu {
        menu: &'a Menu,
        area: Rect,
    },
    Game {
        game: &'a Game,
        arena: &'a Arena,
        area: Rect,
    },
}

/// Maps world coordinates (y up) onto a terminal rectangle (y down)
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub area: Rect,
}

impl Viewport {
    const WORLD_MIN: Vec2 = Vec2::new(-arena::HALF_WIDTH, arena::BOTTOM);
    const WORLD_MAX: Vec2 = Vec2::new(arena::HALF_WIDTH, arena::TOP);

    /// Cell for a world position, `None` when it falls outside the area
    pub fn to_cell(&self, position: Vec2) -> Option<(u16, u16)> {
        if self.area.width == 0 || self.area.height == 0 {
            return None;
        }

        let span = Self::WORLD_MAX - Self::WORLD_MIN;
        let t = (position - Self::WORLD_MIN) / span;
        if !(0.0..=1.0).contains(&t.x) || !(0.0..=1.0).contains(&t.y) {
            return None;
        }

        let col = (t.x * (self.area.width - 1) as f32).round() as u16;
        let row = ((1.0 - t.y) * (self.area.height - 1) as f32).round() as u16;
        Some((self.area.x + col, self.area.y + row))
    }
}

/// Handles all rendering responsibilities for the game
#[derive(Default)]
pub struct GameRenderer;

impl GameRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, view: &RenderView) {
        match view {
            RenderView::Menu { menu, area } => self.render_menu(frame, menu, *area),
            RenderView::Game { game, arena, area } => {
                self.render_game(frame, game, arena, *area);
                let hud = game.hud();
                if let Some(countdown) = &hud.countdown {
                    self.render_countdown(
                        frame,
                        &countdown.level_text,
                        &countdown.number_text,
                        *area,
                    );
                }
                if hud.game_over_panel {
                    self.render_end_panel(frame, "GAME OVER", Color::Red, &hud.score_text, *area);
                } else if hud.game_end_panel {
                    self.render_end_panel(
                        frame,
                        "YOU SAVED THE EARTH",
                        Color::Green,
                        &hud.score_text,
                        *area,
                    );
                }
            }
        }
    }

    fn render_menu(&self, frame: &mut Frame, menu: &Menu, area: Rect) {
        let mut lines = vec![
            Line::from(""),
            Line::from("I N V A D E R S").centered().green().bold(),
            Line::from(""),
        ];
        for item in MenuItem::ALL {
            let line = if item == menu.selected() {
                Line::from(format!("> {} <", item.label()))
                    .centered()
                    .yellow()
                    .bold()
            } else {
                Line::from(item.label()).centered().white()
            };
            lines.push(line);
        }
        lines.push(Line::from(""));
        lines.push(
            Line::from("[Up/Down: Choose] [Enter: Select] [Q: Quit]")
                .centered()
                .dark_gray(),
        );

        frame.render_widget(
            Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center),
            area,
        );
    }

    fn render_game(&self, frame: &mut Frame, game: &Game, arena: &Arena, area: Rect) {
        // Header line, then the field, then the controls hint
        let field_area = Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: area.height.saturating_sub(2),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let viewport = Viewport {
            area: block.inner(field_area),
        };
        frame.render_widget(block, field_area);

        let buffer = frame.buffer_mut();

        for (i, body) in arena.defenses().iter().enumerate() {
            let Some(defense) = game.defenses().get(i) else {
                continue;
            };
            if !defense.is_enabled() {
                continue;
            }
            if let Some((x, y)) = viewport.to_cell(body.position) {
                let sprite = defense.get_sprite();
                buffer.set_string(
                    x.saturating_sub(sprite.len() as u16 / 2),
                    y,
                    sprite,
                    Style::default().fg(Color::Cyan),
                );
            }
        }

        for (id, body) in arena.enemies() {
            let Some(enemy) = game.enemy(*id) else {
                continue;
            };
            if enemy.is_dead() {
                continue;
            }
            let color = match enemy.enemy_type {
                EnemyType::Octopus => Color::Magenta,
                EnemyType::Crab => Color::Yellow,
                EnemyType::Squid => Color::Red,
            };
            if let Some((x, y)) = viewport.to_cell(body.position) {
                buffer.set_string(
                    x.saturating_sub(1),
                    y,
                    enemy.get_sprite(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                );
            }
        }

        for (id, body) in arena.projectiles() {
            let Some(projectile) = game.projectiles().get(id) else {
                continue;
            };
            let color = if projectile.is_from_player() {
                Color::Yellow
            } else {
                Color::Magenta
            };
            if let Some((x, y)) = viewport.to_cell(body.position) {
                buffer.set_string(
                    x,
                    y,
                    projectile.get_sprite().to_string(),
                    Style::default().fg(color),
                );
            }
        }

        for particle in arena.particles() {
            // Fade as the effect runs out
            let color = if particle.lifetime > 0.4 {
                Color::Red
            } else if particle.lifetime > 0.2 {
                Color::LightRed
            } else {
                Color::Yellow
            };
            if let Some((x, y)) = viewport.to_cell(particle.position) {
                buffer.set_string(
                    x,
                    y,
                    particle.glyph.to_string(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                );
            }
        }

        if let Some((x, y)) = viewport.to_cell(arena.player().position) {
            buffer.set_string(
                x.saturating_sub(1),
                y,
                game.player().get_sprite(),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            );
        }

        let hud = game.hud();
        let header = Line::from(vec![
            Span::styled(
                hud.score_text.as_str(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(
                hud.lives_text.as_str(),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(
                hud.level_text.as_str(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
        ]);
        let header_area = Rect {
            x: area.x + 1,
            y: area.y,
            width: area.width.saturating_sub(2),
            height: 1,
        };
        frame.render_widget(Paragraph::new(header), header_area);

        let controls = Line::from(vec![Span::styled(
            "[A/D/Arrows: Move] [X: Run] [Space: Fire] [R: Restart] [Q: Quit]",
            Style::default().fg(Color::DarkGray),
        )]);
        let controls_area = Rect {
            x: area.x + 1,
            y: area.y + area.height.saturating_sub(1),
            width: area.width.saturating_sub(2),
            height: 1,
        };
        frame.render_widget(Paragraph::new(controls).centered(), controls_area);
    }

    fn render_countdown(&self, frame: &mut Frame, level_text: &str, number_text: &str, area: Rect) {
        let text = vec![
            Line::from(""),
            Line::from(level_text.to_string()).centered().cyan().bold(),
            Line::from(""),
            Line::from(number_text.to_string()).centered().yellow().bold(),
        ];
        let panel = centered_rect(area, 24, 6);
        frame.render_widget(Clear, panel);
        frame.render_widget(
            Paragraph::new(text)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow)),
                )
                .alignment(Alignment::Center),
            panel,
        );
    }

    fn render_end_panel(
        &self,
        frame: &mut Frame,
        title: &str,
        color: Color,
        score_text: &str,
        area: Rect,
    ) {
        let text = vec![
            Line::from(""),
            Line::from(title.to_string())
                .centered()
                .style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Line::from(""),
            Line::from(score_text.to_string()).centered().yellow().bold(),
            Line::from(""),
            Line::from("Press R to restart").centered().white(),
            Line::from("Press Q to quit").centered().white(),
        ];
        let panel = centered_rect(area, 32, 9);
        frame.render_widget(Clear, panel);
        frame.render_widget(
            Paragraph::new(text)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(color)),
                )
                .alignment(Alignment::Center),
            panel,
        );
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
