use crate::game::{format_time, ClientGame};
use macroquad::prelude::*;
use shared::render::GRASS;
use shared::{px_from_phys, Point, Surface};

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub client_id: Option<u32>,
    pub smoothing_enabled: bool,
    pub boxes_enabled: bool,
    pub fake_ping_ms: u64,
    pub entity_count: usize,
}

fn to_macroquad(color: shared::Color) -> Color {
    Color::from_rgba(color.r, color.g, color.b, color.a)
}

/// Draws world-pixel rectangles onto the window, shifted so `center` lands
/// in the middle of the screen.
pub struct MacroquadSurface {
    offset_x: f32,
    offset_y: f32,
}

impl MacroquadSurface {
    pub fn new(center: Point, width: f32, height: f32) -> Self {
        Self {
            offset_x: (width / 2.0 - center.x).round(),
            offset_y: (height / 2.0 - center.y).round(),
        }
    }

    pub fn outline_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        draw_rectangle_lines(x + self.offset_x, y + self.offset_y, width, height, 1.0, color);
    }
}

impl Surface for MacroquadSurface {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: shared::Color) {
        draw_rectangle(x + self.offset_x, y + self.offset_y, width, height, to_macroquad(color));
    }
}

pub struct Renderer {
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Renderer {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn render(&mut self, game: &ClientGame, config: UiConfig) {
        clear_background(to_macroquad(GRASS));

        let center = game.camera_center();
        let mut surface = MacroquadSurface::new(center, self.width, self.height);
        game.render(&mut surface, center);

        if config.boxes_enabled {
            self.draw_boxes(game, center, &mut surface);
        }

        self.draw_timer(game);
        if game.is_game_over() {
            self.draw_game_over(game);
        }
        self.draw_ui(config);
    }

    fn draw_boxes(&mut self, game: &ClientGame, center: Point, surface: &mut MacroquadSurface) {
        for entity in game.render_list(center) {
            if !entity.has_area() {
                continue;
            }
            let color = if entity.id == game.player_id() { YELLOW } else { RED };
            surface.outline_rect(
                px_from_phys(entity.x),
                px_from_phys(entity.y),
                px_from_phys(entity.width),
                px_from_phys(entity.height),
                color,
            );
        }
    }

    fn draw_timer(&mut self, game: &ClientGame) {
        let time = format_time(game.round_time().unwrap_or(0.0));
        let size = measure_text(&time, None, 32, 1.0);
        draw_text(&time, (self.width - size.width) / 2.0, 36.0, 32.0, WHITE);

        if let Some(best) = game.best_time() {
            let best = format!("best {}", format_time(best));
            let size = measure_text(&best, None, 16, 1.0);
            draw_text(&best, (self.width - size.width) / 2.0, 56.0, 16.0, WHITE);
        }
    }

    fn draw_game_over(&mut self, game: &ClientGame) {
        let title = "GAME OVER";
        let size = measure_text(title, None, 48, 1.0);
        draw_text(title, (self.width - size.width) / 2.0, self.height / 2.0 - 40.0, 48.0, WHITE);

        if game.can_request_reset() {
            let hint = "press space to play again";
            let size = measure_text(hint, None, 20, 1.0);
            draw_text(hint, (self.width - size.width) / 2.0, self.height / 2.0, 20.0, WHITE);
        }
    }

    fn draw_ui(&mut self, config: UiConfig) {
        let y_start = 10.0;
        let indicator_size = 12.0;
        let spacing = 25.0;

        let features = [("1", config.smoothing_enabled), ("B", config.boxes_enabled)];

        for (i, (label, enabled)) in features.iter().enumerate() {
            let x = 10.0 + (i as f32) * spacing;
            let color = if *enabled { GREEN } else { RED };

            draw_rectangle(x, y_start, indicator_size, indicator_size, color);
            draw_rectangle_lines(x, y_start, indicator_size, indicator_size, 1.0, WHITE);

            draw_text(label, x + 3.0, y_start + indicator_size + 12.0, 12.0, WHITE);
        }

        let connection_color = if config.client_id.is_some() {
            GREEN
        } else {
            RED
        };
        draw_rectangle(10.0, y_start + 35.0, 8.0, 8.0, connection_color);
        draw_text("CON", 20.0, y_start + 35.0 + 8.0, 12.0, WHITE);

        let info_y = y_start + 58.0;
        if config.fake_ping_ms > 0 {
            let ping_text = format!("+{}ms", config.fake_ping_ms);
            draw_text(&ping_text, 10.0, info_y, 12.0, WHITE);
        }
        let entity_text = format!("{} entities", config.entity_count);
        draw_text(&entity_text, 10.0, info_y + 14.0, 12.0, WHITE);
    }
}
