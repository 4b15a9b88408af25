use std::collections::HashMap;

use ratatui::style::Color;

pub const NUMBER_OF_COLORS: u16 = 255;

/// Entry `index % NUMBER_OF_COLORS` of a fully saturated hue wheel.
pub fn palette_entry(index: u16) -> Color {
    let h = f64::from(index % NUMBER_OF_COLORS) / f64::from(NUMBER_OF_COLORS) * 6.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u8 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    Color::Rgb(channel(r), channel(g), channel(b))
}

fn channel(v: f64) -> u8 {
    (v * 255.0).round() as u8
}

/// `#rrggbb` for rgb colours, the ratatui name for the rest.
pub fn hex(color: Color) -> String {
    match color {
        Color::Rgb(r, g, b) => format!("#{r:02x}{g:02x}{b:02x}"),
        other => other.to_string(),
    }
}

/// Colour per client port, assigned on first use and reused for the rest of
/// the session.
#[derive(Debug, Default, Clone)]
pub struct ColorCache {
    colors: HashMap<u16, Color>,
    order: Vec<u16>,
}

impl ColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_for(&mut self, port: u16) -> Color {
        if let Some(color) = self.colors.get(&port) {
            return *color;
        }
        let color = palette_entry(port);
        self.colors.insert(port, color);
        self.order.push(port);
        color
    }

    /// Assigned colours in first-assignment order.
    pub fn legend(&self) -> impl Iterator<Item = (u16, Color)> + '_ {
        self.order.iter().map(|port| (*port, self.colors[port]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
