use crate::config::AppConfig;
use crate::presentation::{layers, Radius};
use crate::processing::Partition;
use crate::types::ObservationRecord;
use anyhow::{Context, Result};
use image::{ImageBuffer, Pixel, Rgba, RgbaImage};
use std::f64::consts::PI;
use std::fs;
use std::path::Path;
use tracing::info;

// deck.gl / MapLibre use a 512px world tile.
const TILE_SIZE: f64 = 512.0;
const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    center_x: f64,
    center_y: f64,
    scale: f64,
    pixels_per_meter: f64,
    width: u32,
    height: u32,
}

impl Viewport {
    pub fn new(config: &AppConfig) -> Self {
        let scale = TILE_SIZE * 2.0_f64.powf(config.map.zoom);
        let (center_x, center_y) = world_pixel(config.map.latitude, config.map.longitude, scale);
        let meters_per_pixel = EARTH_CIRCUMFERENCE_M * config.map.latitude.to_radians().cos() / scale;
        Self {
            center_x,
            center_y,
            scale,
            pixels_per_meter: 1.0 / meters_per_pixel,
            width: config.output.width,
            height: config.output.height,
        }
    }

    /// Screen position of a coordinate, relative to the image's top-left corner.
    pub fn project(&self, lat: f64, lon: f64) -> (f64, f64) {
        let (x, y) = world_pixel(lat, lon, self.scale);
        (
            x - self.center_x + self.width as f64 / 2.0,
            y - self.center_y + self.height as f64 / 2.0,
        )
    }

    pub fn meters_to_pixels(&self, meters: f64) -> f64 {
        meters * self.pixels_per_meter
    }
}

fn world_pixel(lat: f64, lon: f64, scale: f64) -> (f64, f64) {
    let x = (lon + 180.0) / 360.0 * scale;
    let lat_rad = lat.to_radians();
    let y = (1.0 - (lat_rad.tan() + (1.0 / lat_rad.cos())).ln() / PI) / 2.0 * scale;
    (x, y)
}

pub fn render_snapshot(config: &AppConfig, partition: &Partition<'_>) -> RgbaImage {
    let viewport = Viewport::new(config);
    let mut img: RgbaImage = ImageBuffer::from_pixel(
        config.output.width,
        config.output.height,
        Rgba(config.output.background),
    );

    for layer in layers(config, partition) {
        let color = Rgba(layer.color);
        for record in &layer.data {
            draw_marker(&mut img, &viewport, record, layer.radius, color);
        }
    }

    img
}

fn draw_marker(
    img: &mut RgbaImage,
    viewport: &Viewport,
    record: &ObservationRecord,
    radius: Radius,
    color: Rgba<u8>,
) {
    let r = viewport.meters_to_pixels(radius.meters_for(record));
    if r <= 0.0 {
        return;
    }
    let (cx, cy) = viewport.project(record.lat, record.lon);

    let min_x = (cx - r).floor().max(0.0) as i64;
    let max_x = (cx + r).ceil().min(img.width() as f64 - 1.0) as i64;
    let min_y = (cy - r).floor().max(0.0) as i64;
    let max_y = (cy + r).ceil().min(img.height() as f64 - 1.0) as i64;

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let dx = px as f64 + 0.5 - cx;
            let dy = py as f64 + 0.5 - cy;
            if dx * dx + dy * dy <= r * r {
                img.get_pixel_mut(px as u32, py as u32).blend(&color);
            }
        }
    }
}

pub fn save_snapshot(img: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create snapshot directory")?;
    }
    img.save(path)
        .with_context(|| format!("Failed to save snapshot {:?}", path))?;
    info!("Saved {}x{} snapshot to {:?}", img.width(), img.height(), path);
    Ok(())
}
