// paints the game onto a camera-sized RGB frame and saves snapshots
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use image::{Rgb, RgbImage};
use tracing::info;

use crate::error::Result;
use crate::snake::{BoardSize, SnakeGame};
use crate::steering::PixelPoint;

pub const HEAD_COLOR: Rgb<u8> = Rgb([100, 255, 0]);
pub const BODY_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
pub const BORDER_COLOR: Rgb<u8> = Rgb([0, 150, 0]);
pub const FOOD_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const FOOD_HIGHLIGHT: Rgb<u8> = Rgb([255, 100, 100]);
pub const POINTER_COLOR: Rgb<u8> = Rgb([0, 255, 255]);

const POINTER_ARM: i32 = 6;
const HIGHLIGHT_RADIUS: i32 = 3;

#[derive(Debug, Clone, Copy)]
pub struct FramePainter {
    board: BoardSize,
}

impl FramePainter {
    pub fn new(board: BoardSize) -> Self {
        FramePainter { board }
    }

    pub fn blank_frame(&self) -> RgbImage {
        RgbImage::new(self.board.pixel_width(), self.board.pixel_height())
    }

    /// Draws onto a fresh black frame.
    pub fn render<R>(&self, game: &SnakeGame<R>, pointer: Option<PixelPoint>) -> RgbImage {
        let mut frame = self.blank_frame();
        self.paint(&mut frame, game, pointer);
        frame
    }

    pub fn paint<R>(&self, frame: &mut RgbImage, game: &SnakeGame<R>, pointer: Option<PixelPoint>) {
        let cell = self.board.cell_size();
        let head = game.head();

        for segment in game.body() {
            let (x, y) = self.board.cell_origin(segment);
            let color = if *segment == head { HEAD_COLOR } else { BODY_COLOR };
            fill_rect(frame, x, y, x + cell - 2, y + cell - 2, color);
            outline_rect(frame, x, y, x + cell - 2, y + cell - 2, BORDER_COLOR);
        }

        if let Some(food) = game.food() {
            let (x, y) = self.board.cell_origin(&food);
            let (cx, cy) = (x + cell / 2, y + cell / 2);
            fill_circle(frame, cx, cy, cell / 2, FOOD_COLOR);
            fill_circle(frame, cx - 3, cy - 3, HIGHLIGHT_RADIUS, FOOD_HIGHLIGHT);
        }

        if let Some(pointer) = pointer {
            for d in -POINTER_ARM..=POINTER_ARM {
                put(frame, pointer.x + d, pointer.y, POINTER_COLOR);
                put(frame, pointer.x, pointer.y + d, POINTER_COLOR);
            }
        }

        if game.is_over() {
            // 50% blend with black
            for pixel in frame.pixels_mut() {
                for channel in pixel.0.iter_mut() {
                    *channel /= 2;
                }
            }
        }
    }
}

fn put(frame: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < frame.width() && (y as u32) < frame.height() {
        frame.put_pixel(x as u32, y as u32, color);
    }
}

// corners are inclusive
fn fill_rect(frame: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    for y in y0..=y1 {
        for x in x0..=x1 {
            put(frame, x, y, color);
        }
    }
}

fn outline_rect(frame: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    for x in x0..=x1 {
        put(frame, x, y0, color);
        put(frame, x, y1, color);
    }
    for y in y0..=y1 {
        put(frame, x0, y, color);
        put(frame, x1, y, color);
    }
}

fn fill_circle(frame: &mut RgbImage, cx: i32, cy: i32, radius: i32, color: Rgb<u8>) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put(frame, cx + dx, cy + dy, color);
            }
        }
    }
}

pub fn snapshot_file_name(game: u32, score: u32) -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S%3f");
    format!("handsnake-{timestamp}-g{game}-{score}.png")
}

/// Saves the frame under `dir`, named by UTC time, game number and score.
pub fn write_snapshot(frame: &RgbImage, dir: &Path, game: u32, score: u32) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(snapshot_file_name(game, score));
    frame.save(&path)?;
    info!(path = %path.display(), game, score, "snapshot written");
    Ok(path)
}
