//! Nearest-seed lookup
//!
//! A read-only spatial index over the seed positions that answers "which seed
//! is closest to (x, y)". Two implementations share one contract:
//!
//! - [`KdTree`]: 2-d tree laid out implicitly in a single `Vec`, built by
//!   median partitioning. O(N log N) build, O(log N) expected query.
//! - [`LinearIndex`]: exhaustive scan. O(N) query, used as a reference.
//!
//! Distances are exact squared integer distances. When several seeds are
//! equally close the one that appears first in the seed slice wins, so both
//! implementations give identical answers for identical input.

use serde::{Deserialize, Serialize};
use crate::boundary::Seed;
use crate::error::{Result, PrismError};

/// Closest-seed queries over a fixed point set
pub trait NearestSeed {
    /// Index into the seed slice of the seed closest to (x, y)
    fn nearest(&self, x: u32, y: u32) -> usize;

    /// Number of indexed seeds (always at least one)
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which index structure to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexKind {
    #[default]
    KdTree,
    Linear,
}

/// Build the requested index over `seeds`
pub fn build_index(kind: IndexKind, seeds: &[Seed]) -> Result<Box<dyn NearestSeed + Sync>> {
    Ok(match kind {
        IndexKind::KdTree => Box::new(KdTree::build(seeds)?),
        IndexKind::Linear => Box::new(LinearIndex::build(seeds)?),
    })
}

/// Squared Euclidean distance. PNG dimensions stay below 2^31, so this fits.
fn distance_sq(a: (u32, u32), b: (u32, u32)) -> u64 {
    let dx = a.0.abs_diff(b.0) as u64;
    let dy = a.1.abs_diff(b.1) as u64;
    dx * dx + dy * dy
}

fn positions(seeds: &[Seed]) -> Result<Vec<(u32, u32)>> {
    if seeds.is_empty() {
        return Err(PrismError::EmptyIndex);
    }
    Ok(seeds.iter().map(|s| (s.x, s.y)).collect())
}

// ============================================================================
// K-D TREE
// ============================================================================

/// Implicit 2-d tree.
///
/// `order` holds seed indices. For any subrange `lo..hi` the node is the
/// element at `lo + (hi - lo) / 2`; everything before it has a split
/// coordinate <= the node's, everything after it >= the node's. The split
/// axis alternates x, y, x, ... with depth.
#[derive(Debug, Clone)]
pub struct KdTree {
    points: Vec<(u32, u32)>,
    order: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn of(self, p: (u32, u32)) -> u32 {
        match self {
            Axis::X => p.0,
            Axis::Y => p.1,
        }
    }

    fn flip(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

impl KdTree {
    pub fn build(seeds: &[Seed]) -> Result<Self> {
        let points = positions(seeds)?;
        let mut order: Vec<usize> = (0..points.len()).collect();
        partition(&points, &mut order, Axis::X);
        Ok(Self { points, order })
    }

    fn search(&self, lo: usize, hi: usize, axis: Axis, query: (u32, u32), best: &mut (u64, usize)) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let seed = self.order[mid];
        let point = self.points[seed];

        let candidate = (distance_sq(query, point), seed);
        if candidate < *best {
            *best = candidate;
        }

        let split = axis.of(point);
        let q = axis.of(query);
        let (near, far) = if q < split {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };

        self.search(near.0, near.1, axis.flip(), query, best);

        // Equal plane distance must still be explored: a seed there can tie
        // the current best and win on index.
        let plane = q.abs_diff(split) as u64;
        if plane * plane <= best.0 {
            self.search(far.0, far.1, axis.flip(), query, best);
        }
    }
}

/// Recursively place medians. Ties on the split coordinate are ordered by
/// seed index so the layout is deterministic.
fn partition(points: &[(u32, u32)], order: &mut [usize], axis: Axis) {
    if order.len() <= 1 {
        return;
    }
    let mid = order.len() / 2;
    order.select_nth_unstable_by_key(mid, |&i| (axis.of(points[i]), i));
    let (left, rest) = order.split_at_mut(mid);
    partition(points, left, axis.flip());
    partition(points, &mut rest[1..], axis.flip());
}

impl NearestSeed for KdTree {
    fn nearest(&self, x: u32, y: u32) -> usize {
        let mut best = (u64::MAX, usize::MAX);
        self.search(0, self.order.len(), Axis::X, (x, y), &mut best);
        best.1
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}

// ============================================================================
// LINEAR SCAN
// ============================================================================

/// Exhaustive nearest-seed search
#[derive(Debug, Clone)]
pub struct LinearIndex {
    points: Vec<(u32, u32)>,
}

impl LinearIndex {
    pub fn build(seeds: &[Seed]) -> Result<Self> {
        Ok(Self { points: positions(seeds)? })
    }
}

impl NearestSeed for LinearIndex {
    fn nearest(&self, x: u32, y: u32) -> usize {
        // min_by_key keeps the first of equal keys
        self.points
            .iter()
            .enumerate()
            .min_by_key(|&(_, &p)| distance_sq((x, y), p))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}
