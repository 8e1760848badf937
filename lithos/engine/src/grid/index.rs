//! Cube-face raster of precomputed nearest point ids.
//!
//! Each of the six cube faces carries `dim × dim` gnomonic samples. A query is
//! projected onto its major-axis face, rounded to the nearest sample and
//! answered with the id stored there, so lookups are O(1) after the build.

use super::{GridError, IntegerLattice};
use crate::geo;

/// Immutable nearest-id raster over the unit sphere.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    dim: u32,
    points: u32,
    ids: Vec<u32>,
}

impl SpatialIndex {
    /// Precompute the exact nearest id for every raster sample.
    pub fn build(points: &[[f64; 3]], raster_dim: u32) -> Result<Self, GridError> {
        if points.is_empty() {
            return Err(GridError::EmptyGrid);
        }
        if raster_dim < 2 {
            return Err(GridError::RasterTooSmall(raster_dim));
        }
        let n = points.len();
        let width = 2.0 * (4.0 * std::f64::consts::PI / n as f64).sqrt();
        let lattice = IntegerLattice::new(points, width);

        let dim = raster_dim as usize;
        let mut ids = Vec::with_capacity(6 * dim * dim);
        for face in 0..6u8 {
            for j in 0..dim {
                let v = sample_coord(j, dim);
                for i in 0..dim {
                    let u = sample_coord(i, dim);
                    let d = geo::normalize(face_dir(face, u, v));
                    // lattice is non-empty, so a nearest id always exists
                    ids.push(lattice.nearest(d).unwrap_or(0));
                }
            }
        }
        Ok(Self { dim: raster_dim, points: n as u32, ids })
    }

    /// Samples per face edge.
    pub fn raster_dim(&self) -> u32 {
        self.dim
    }

    /// Number of indexed points.
    pub fn point_count(&self) -> u32 {
        self.points
    }

    /// Worst-case excess angular distance (radians) of [`SpatialIndex::nearest`]
    /// over the true nearest point.
    pub fn resolution_bound_rad(&self) -> f64 {
        2.0 * std::f64::consts::SQRT_2 / (self.dim - 1) as f64
    }

    /// Nearest id for an arbitrary direction. Zero or non-finite vectors are rejected.
    pub fn nearest(&self, direction: [f64; 3]) -> Result<u32, GridError> {
        let d = geo::try_normalize(direction).ok_or(GridError::DegenerateDirection(direction))?;
        Ok(self.nearest_unit(d))
    }

    /// Lookup for a direction already known to be non-degenerate.
    pub(crate) fn nearest_unit(&self, d: [f64; 3]) -> u32 {
        let (face, u, v) = locate(d);
        let dim = self.dim as usize;
        let i = sample_index(u, dim);
        let j = sample_index(v, dim);
        self.ids[face as usize * dim * dim + j * dim + i]
    }

    /// Stored id at raster sample `(face, i, j)`.
    pub(crate) fn sample(&self, face: u8, i: usize, j: usize) -> u32 {
        let dim = self.dim as usize;
        self.ids[face as usize * dim * dim + j * dim + i]
    }
}

/// Face-plane coordinate in `[-1, 1]` of sample `k`. Values of `k` just
/// outside the raster extrapolate past the face edge.
#[inline]
pub(crate) fn sample_coord(k: usize, dim: usize) -> f64 {
    -1.0 + 2.0 * k as f64 / (dim - 1) as f64
}

/// Unnormalized direction for face-plane coordinates `(u, v)`.
#[inline]
pub(crate) fn face_dir(face: u8, u: f64, v: f64) -> [f64; 3] {
    match face {
        0 => [1.0, u, v],
        1 => [-1.0, u, v],
        2 => [u, 1.0, v],
        3 => [u, -1.0, v],
        4 => [u, v, 1.0],
        _ => [u, v, -1.0],
    }
}

/// Major-axis face and gnomonic coordinates; axis ties prefer x, then y.
#[inline]
fn locate(d: [f64; 3]) -> (u8, f64, f64) {
    let (ax, ay, az) = (d[0].abs(), d[1].abs(), d[2].abs());
    if ax >= ay && ax >= az {
        (if d[0] > 0.0 { 0 } else { 1 }, d[1] / ax, d[2] / ax)
    } else if ay >= az {
        (if d[1] > 0.0 { 2 } else { 3 }, d[0] / ay, d[2] / ay)
    } else {
        (if d[2] > 0.0 { 4 } else { 5 }, d[0] / az, d[1] / az)
    }
}

/// Round `u ∈ [-1, 1]` to the nearest sample; exact halves go to the lower index.
#[inline]
fn sample_index(u: f64, dim: usize) -> usize {
    let t = (u + 1.0) * 0.5 * (dim - 1) as f64;
    let k = (t - 0.5).ceil();
    if k <= 0.0 {
        0
    } else {
        (k as usize).min(dim - 1)
    }
}
