//! Boundary Detection
//!
//! Finds the "seed" pixels used to repaint transparent areas: opaque pixels
//! that touch at least one fully transparent pixel in their 8-neighbourhood.
//! The outermost ring of the canvas never produces seeds.

use rayon::prelude::*;
use serde::Serialize;
use crate::buffer::PixelBuffer;

/// Neighbour offsets in scan order: NW, N, NE, E, SE, S, SW, W
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (1, 0), (1, 1), (0, 1),
    (-1, 1), (-1, 0),
];

/// A boundary pixel and the colour it donates to nearby transparent pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Seed {
    pub x: u32,
    pub y: u32,
    pub color: [u8; 3],
}

/// Returns the seed for (x, y) if that pixel qualifies.
///
/// Callers guarantee 1 <= x < width - 1 and 1 <= y < height - 1, so every
/// neighbour lookup is in range.
fn seed_at(buffer: &PixelBuffer, x: u32, y: u32) -> Option<Seed> {
    let [r, g, b, a] = buffer.get(x, y)?;
    if a == 0 {
        return None;
    }

    let touches_transparent = NEIGHBOR_OFFSETS.iter().any(|&(dx, dy)| {
        let nx = (x as i32 + dx) as u32;
        let ny = (y as i32 + dy) as u32;
        buffer.alpha(nx, ny) == Some(0)
    });

    touches_transparent.then_some(Seed { x, y, color: [r, g, b] })
}

/// Interior rows (and the interior column range) eligible for seeding
fn interior(buffer: &PixelBuffer) -> Option<(std::ops::Range<u32>, std::ops::Range<u32>)> {
    let (width, height) = buffer.dimensions();
    if width < 3 || height < 3 {
        return None;
    }
    Some((1..width - 1, 1..height - 1))
}

/// Collect all seeds in raster order (y ascending, then x ascending)
pub fn detect_seeds(buffer: &PixelBuffer) -> Vec<Seed> {
    let Some((xs, ys)) = interior(buffer) else {
        return Vec::new();
    };

    let mut seeds = Vec::new();
    for y in ys {
        for x in xs.clone() {
            if let Some(seed) = seed_at(buffer, x, y) {
                seeds.push(seed);
            }
        }
    }
    seeds
}

/// Same output as [`detect_seeds`], with rows scanned on the rayon pool.
///
/// Per-row results are concatenated in row order, so seed order is identical
/// to the sequential scan.
pub fn detect_seeds_parallel(buffer: &PixelBuffer) -> Vec<Seed> {
    let Some((xs, ys)) = interior(buffer) else {
        return Vec::new();
    };

    let rows: Vec<Vec<Seed>> = ys
        .into_par_iter()
        .map(|y| xs.clone().filter_map(|x| seed_at(buffer, x, y)).collect())
        .collect();

    rows.into_iter().flatten().collect()
}
