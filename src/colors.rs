use bevy::prelude::*;

use crate::ant::AntColor;

/// Shared color configuration for consistent rendering across the viewer and
/// PNG snapshots
#[derive(Resource, Clone)]
pub struct ColorConfig {
    pub background: Color,
    pub pheromone: Color,
    pub reward: Color,
    pub reward_outline: Color,
    pub nest: Color,
    pub text: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            pheromone: Color::srgb_u8(252, 136, 118), // Salmon
            reward: Color::srgb_u8(255, 0, 0),
            reward_outline: Color::BLACK,
            nest: Color::srgb_u8(60, 60, 60),
            text: Color::BLACK,
        }
    }
}

impl ColorConfig {
    pub fn background_rgb(&self) -> (u8, u8, u8) {
        to_rgb(self.background)
    }

    pub fn pheromone_rgb(&self) -> (u8, u8, u8) {
        to_rgb(self.pheromone)
    }

    pub fn reward_rgb(&self) -> (u8, u8, u8) {
        to_rgb(self.reward)
    }

    /// Pheromone color with the given heat as alpha
    pub fn pheromone_with_heat(&self, heat: f32) -> Color {
        self.pheromone.with_alpha(heat.clamp(0.0, 1.0))
    }
}

pub fn ant_color(color: AntColor) -> Color {
    let AntColor([r, g, b]) = color;
    Color::srgb_u8(r, g, b)
}

fn to_rgb(color: Color) -> (u8, u8, u8) {
    let [r, g, b, _] = color.to_srgba().to_u8_array();
    (r, g, b)
}
