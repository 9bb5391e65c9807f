//! Drawing boundary. The core never touches a window; it describes what to
//! draw in world pixel coordinates and the client maps that onto its surface.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

pub const GRASS: Color = Color::rgb(0x7d, 0xcc, 0x6c);
pub const SHADOW: Color = Color::rgba(0, 0, 0, 80);

pub trait Surface {
    /// Fills an axis-aligned rectangle given in world pixels.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);
}

/// Surface that only records draw calls. Used by tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub rects: Vec<(f32, f32, f32, f32, Color)>,
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.rects.push((x, y, width, height, color));
    }
}
