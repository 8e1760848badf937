//! Integer-lattice bucketing of unit-sphere points for exact nearest queries.

use std::collections::HashMap;

use smallvec::SmallVec;

/// Points bucketed by integer 3D cell coordinates `floor(p / cell_width)`.
#[derive(Debug, Clone)]
pub struct IntegerLattice {
    cell_width: f64,
    points: Vec<[f64; 3]>,
    buckets: HashMap<[i32; 3], SmallVec<[u32; 8]>>,
}

impl IntegerLattice {
    /// Bucket `points` (id = slice index). `cell_width` is clamped to `(0, 2]`.
    pub fn new(points: &[[f64; 3]], cell_width: f64) -> Self {
        let cell_width = if cell_width.is_finite() && cell_width > 0.0 { cell_width.min(2.0) } else { 2.0 };
        let mut buckets: HashMap<[i32; 3], SmallVec<[u32; 8]>> = HashMap::new();
        for (i, p) in points.iter().enumerate() {
            buckets.entry(key(*p, cell_width)).or_default().push(i as u32);
        }
        Self { cell_width, points: points.to_vec(), buckets }
    }

    /// Width of one lattice cell in chord units.
    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    /// Number of points held.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the lattice holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Exact nearest point id to `p` (Euclidean chord distance), ties to the lower id.
    ///
    /// Scans the 27 buckets around `p`. A hit closer than one cell width is
    /// provably exact; otherwise every point is scanned.
    pub fn nearest(&self, p: [f64; 3]) -> Option<u32> {
        let k = key(p, self.cell_width);
        let mut best: Option<(f64, u32)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.buckets.get(&[k[0] + dx, k[1] + dy, k[2] + dz]) else {
                        continue;
                    };
                    for &id in bucket {
                        best = closer(best, dist2(self.points[id as usize], p), id);
                    }
                }
            }
        }
        match best {
            Some((d2, id)) if d2 <= self.cell_width * self.cell_width => Some(id),
            _ => self.brute_force(p),
        }
    }

    /// Full scan; the reference answer for [`IntegerLattice::nearest`].
    pub fn brute_force(&self, p: [f64; 3]) -> Option<u32> {
        let mut best: Option<(f64, u32)> = None;
        for (i, q) in self.points.iter().enumerate() {
            best = closer(best, dist2(*q, p), i as u32);
        }
        best.map(|(_, id)| id)
    }
}

#[inline]
fn key(p: [f64; 3], w: f64) -> [i32; 3] {
    [(p[0] / w).floor() as i32, (p[1] / w).floor() as i32, (p[2] / w).floor() as i32]
}

#[inline]
fn dist2(a: [f64; 3], b: [f64; 3]) -> f64 {
    let d = [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
    d[0] * d[0] + d[1] * d[1] + d[2] * d[2]
}

#[inline]
fn closer(best: Option<(f64, u32)>, d2: f64, id: u32) -> Option<(f64, u32)> {
    match best {
        Some((bd, bid)) if bd < d2 || (bd == d2 && bid < id) => Some((bd, bid)),
        _ => Some((d2, id)),
    }
}
