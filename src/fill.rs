//! Transparent Pixel Repair
//!
//! Repaints the RGB of every fully transparent pixel with the colour of its
//! nearest boundary seed. Phases run strictly in order:
//! 1. Boundary detection (complete seed list)
//! 2. Index construction (static afterwards)
//! 3. Fill over the whole canvas, outer ring included
//!
//! Only alpha == 0 pixels are written. Alpha itself is preserved unless the
//! `reveal_filled` diagnostic is switched on.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use crate::boundary::{detect_seeds, detect_seeds_parallel, Seed};
use crate::buffer::{PixelBuffer, ALPHA, CHANNELS};
use crate::index::{build_index, IndexKind, NearestSeed};

// ============================================================================
// SETTINGS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FillSettings {
    /// Nearest-seed structure (default: kd-tree)
    pub index: IndexKind,
    /// Scan rows on the rayon pool during detection and fill (default: true)
    pub parallel: bool,
    /// Diagnostic: make filled pixels opaque so the new colours are visible (default: false)
    pub reveal_filled: bool,
}

impl Default for FillSettings {
    fn default() -> Self {
        Self {
            index: IndexKind::KdTree,
            parallel: true,
            reveal_filled: false,
        }
    }
}

/// Outcome of one fill pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FillReport {
    pub width: u32,
    pub height: u32,
    /// Boundary pixels found by detection
    pub seed_count: usize,
    /// Transparent pixels whose colour was rewritten
    pub pixels_modified: usize,
}

impl FillReport {
    /// True when there was nothing to repair and the buffer is untouched
    pub fn is_noop(&self) -> bool {
        self.seed_count == 0
    }
}

// ============================================================================
// FILL
// ============================================================================

/// Repaint one row. `y` is the row's index in the image.
fn fill_row(row: &mut [u8], y: u32, seeds: &[Seed], index: &dyn NearestSeed, reveal: bool) -> usize {
    let mut modified = 0;
    for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
        if px[ALPHA] != 0 {
            continue;
        }
        let seed = &seeds[index.nearest(x as u32, y)];
        px[..3].copy_from_slice(&seed.color);
        if reveal {
            px[ALPHA] = u8::MAX;
        }
        modified += 1;
    }
    modified
}

/// Repair all fully transparent pixels of `buffer` in place
pub fn fill_transparent(buffer: &mut PixelBuffer, settings: &FillSettings) -> FillReport {
    let (width, height) = buffer.dimensions();

    let seeds = if settings.parallel {
        detect_seeds_parallel(buffer)
    } else {
        detect_seeds(buffer)
    };

    let mut report = FillReport {
        width,
        height,
        seed_count: seeds.len(),
        pixels_modified: 0,
    };

    // Empty seed list: nothing borders transparency, leave the buffer alone
    let Ok(index) = build_index(settings.index, &seeds) else {
        return report;
    };
    let index = index.as_ref();
    let reveal = settings.reveal_filled;

    report.pixels_modified = if settings.parallel {
        buffer
            .par_rows_mut()
            .enumerate()
            .map(|(y, row)| fill_row(row, y as u32, &seeds, index, reveal))
            .sum()
    } else {
        buffer
            .rows_mut()
            .enumerate()
            .map(|(y, row)| fill_row(row, y as u32, &seeds, index, reveal))
            .sum()
    };

    report
}

/// Run a default fill pass and return the number of repaired pixels
pub fn run(buffer: &mut PixelBuffer) -> usize {
    fill_transparent(buffer, &FillSettings::default()).pixels_modified
}

// ============================================================================
// TESTS
// ============================================================================
