use bevy::log::info;
use png::ColorType;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::colors::ColorConfig;
use crate::error::SnapshotError;
use crate::grid::GridPos;
use crate::pheromones::HeatMap;

/// Largest RGBA frame a snapshot may allocate.
pub const MAX_FRAME_BYTES: usize = 256 * 1024 * 1024;

/// Pixel dimensions and buffer length of a `cells_x` by `cells_y` frame, or
/// `None` when it overflows or exceeds `MAX_FRAME_BYTES`.
fn frame_dimensions(cells_x: usize, cells_y: usize, cell_px: u32) -> Option<(u32, u32, usize)> {
    let width = u32::try_from(cells_x).ok()?.checked_mul(cell_px)?;
    let height = u32::try_from(cells_y).ok()?.checked_mul(cell_px)?;
    let len = (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(4)?;
    (len <= MAX_FRAME_BYTES).then_some((width, height, len))
}

/// RGBA frame of a heat map: pheromone color blended over the background by
/// intensity, reward cells painted solid. Each cell is `cell_px` square.
pub fn render_heat_map(
    heat_map: &HeatMap,
    rewards: &[GridPos],
    colors: &ColorConfig,
    cell_px: u32,
) -> Result<(u32, u32, Vec<u8>), SnapshotError> {
    let cell_px = cell_px.max(1);
    let size = heat_map.size;
    let (width, height, len) = frame_dimensions(size.width, size.height, cell_px).ok_or(
        SnapshotError::FrameTooLarge {
            width: size.width,
            height: size.height,
            cell_px,
        },
    )?;
    let mut frame = vec![0u8; len];

    let (bg_r, bg_g, bg_b) = colors.background_rgb();
    let (ph_r, ph_g, ph_b) = colors.pheromone_rgb();
    let blend = |bg: u8, fg: u8, t: f32| (bg as f32 + (fg as f32 - bg as f32) * t).round() as u8;
    let cell = cell_px as usize;

    for y in 0..size.height {
        for x in 0..size.width {
            let pos = GridPos::new(x, y);
            let rgb = if rewards.contains(&pos) {
                colors.reward_rgb()
            } else {
                let t = heat_map.get(pos);
                (blend(bg_r, ph_r, t), blend(bg_g, ph_g, t), blend(bg_b, ph_b, t))
            };
            fill_cell(&mut frame, width as usize, x * cell, y * cell, cell, rgb);
        }
    }

    Ok((width, height, frame))
}

fn fill_cell(frame: &mut [u8], width: usize, x0: usize, y0: usize, cell_px: usize, (r, g, b): (u8, u8, u8)) {
    for py in y0..y0 + cell_px {
        let row = py * width;
        for px in x0..x0 + cell_px {
            let idx = (row + px) * 4;
            frame[idx..idx + 4].copy_from_slice(&[r, g, b, 255]);
        }
    }
}

pub fn save_frame_as_png(
    path: &Path,
    frame_data: &[u8],
    width: u32,
    height: u32,
) -> Result<(), SnapshotError> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(SnapshotError::FrameTooLarge {
            width: width as usize,
            height: height as usize,
            cell_px: 1,
        })?;
    if frame_data.len() != expected {
        return Err(SnapshotError::SizeMismatch {
            expected,
            actual: frame_data.len(),
        });
    }

    let file = File::create(path)?;
    let w = BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(frame_data)?;
    Ok(())
}

/// Writes heat-map PNGs of finished generations into a directory.
pub struct SnapshotWriter {
    dir: PathBuf,
    every: u64,
    cell_px: u32,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>, every: u64, cell_px: u32) -> Self {
        Self {
            dir: dir.into(),
            every: every.max(1),
            cell_px,
        }
    }

    pub fn wants(&self, generation: u64) -> bool {
        generation % self.every == 0
    }

    /// Renders and saves one generation's heat map, returning the file path.
    pub fn write(
        &self,
        generation: u64,
        heat_map: &HeatMap,
        rewards: &[GridPos],
        colors: &ColorConfig,
    ) -> Result<PathBuf, SnapshotError> {
        fs::create_dir_all(&self.dir)?;
        let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
        let path = self
            .dir
            .join(format!("generation_{generation:05}_{timestamp}.png"));

        let (width, height, frame) = render_heat_map(heat_map, rewards, colors, self.cell_px)?;
        save_frame_as_png(&path, &frame, width, height)?;
        info!("Saved heat map for generation {} to {}", generation, path.display());
        Ok(path)
    }
}
