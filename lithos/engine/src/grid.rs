//! Fibonacci sphere grid, nearest-point index and adjacency.

pub mod index;
pub mod lattice;

pub use index::SpatialIndex;
pub use lattice::IntegerLattice;

use smallvec::SmallVec;
use std::f64::consts::PI;
use std::iter::FusedIterator;

use crate::geo;

/// Errors produced while building or querying the grid.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// A grid needs at least one point.
    #[error("point count must be positive")]
    EmptyGrid,
    /// Ids are `u32`.
    #[error("point count {0} exceeds the u32 id range")]
    TooManyPoints(usize),
    /// The cube raster needs at least two samples per face edge.
    #[error("raster dimension {0} is below the minimum of 2")]
    RasterTooSmall(u32),
    /// Zero-length or non-finite lookup direction.
    #[error("direction {0:?} cannot be normalized for lookup")]
    DegenerateDirection([f64; 3]),
}

/// A unit vector with its stable id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    /// Insertion order of the spiral generator.
    pub id: u32,
    /// Unit position.
    pub pos: [f64; 3],
}

/// Finite golden-angle spiral over the unit sphere. Consumed once; call
/// [`generate_points`] again for a fresh pass.
#[derive(Debug, Clone)]
pub struct FibonacciPoints {
    n: u32,
    next: u32,
}

impl Iterator for FibonacciPoints {
    type Item = GridPoint;

    fn next(&mut self) -> Option<GridPoint> {
        if self.next >= self.n {
            return None;
        }
        let id = self.next;
        self.next += 1;
        Some(GridPoint { id, pos: fibonacci_point(id, self.n) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = (self.n - self.next) as usize;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for FibonacciPoints {}
impl FusedIterator for FibonacciPoints {}

/// Deterministic spiral of `point_count` points: `z_i = 1 − (2i+1)/n`, `θ_i = i·π(3 − √5)`.
pub fn generate_points(point_count: usize) -> Result<FibonacciPoints, GridError> {
    if point_count == 0 {
        return Err(GridError::EmptyGrid);
    }
    let n = u32::try_from(point_count).map_err(|_| GridError::TooManyPoints(point_count))?;
    Ok(FibonacciPoints { n, next: 0 })
}

fn fibonacci_point(i: u32, n: u32) -> [f64; 3] {
    let golden_angle = PI * (3.0 - 5.0_f64.sqrt());
    let z = 1.0 - (2.0 * i as f64 + 1.0) / n as f64;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let theta = i as f64 * golden_angle;
    [r * theta.cos(), r * theta.sin(), z]
}

/// Default raster resolution: about 48 samples per point over the six faces.
pub fn default_raster_dim(point_count: usize) -> u32 {
    ((8.0 * point_count as f64).sqrt().round() as u32).max(2)
}

/// Point grid on the unit sphere with equal-area cells and raster adjacency.
#[derive(Debug, Clone)]
pub struct SphereGrid {
    /// Number of cells.
    pub cells: usize,
    /// Cell center positions (unit sphere).
    pub pos_xyz: Vec<[f64; 3]>,
    /// Cell center latitude/longitude in radians.
    pub latlon: Vec<[f64; 2]>,
    /// Cell area on the unit sphere (`4π/n` for every cell).
    pub area: Vec<f64>,
    /// 1-ring neighbors, sorted and unique.
    pub n1: Vec<SmallVec<[u32; 8]>>,
    index: SpatialIndex,
}

impl SphereGrid {
    /// Build a grid with the default raster resolution.
    pub fn new(point_count: usize) -> Result<Self, GridError> {
        Self::with_resolution(point_count, default_raster_dim(point_count))
    }

    /// Build a grid with an explicit raster resolution.
    pub fn with_resolution(point_count: usize, raster_dim: u32) -> Result<Self, GridError> {
        let pos_xyz: Vec<[f64; 3]> = generate_points(point_count)?.map(|p| p.pos).collect();
        let index = SpatialIndex::build(&pos_xyz, raster_dim)?;
        let latlon = pos_xyz.iter().map(|p| geo::to_latlon(*p)).collect();
        let cells = pos_xyz.len();
        let area = vec![4.0 * PI / cells as f64; cells];
        let n1 = raster_adjacency(&index, cells);
        Ok(Self { cells, pos_xyz, latlon, area, n1, index })
    }

    /// The shared nearest-id index.
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Raster samples per cube-face edge.
    pub fn raster_dim(&self) -> u32 {
        self.index.raster_dim()
    }

    /// Nearest cell id to `direction`.
    pub fn nearest(&self, direction: [f64; 3]) -> Result<u32, GridError> {
        self.index.nearest(direction)
    }

    /// Area of one cell on the unit sphere.
    pub fn cell_area(&self) -> f64 {
        4.0 * PI / self.cells as f64
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells
    }

    /// Always false for a constructed grid.
    pub fn is_empty(&self) -> bool {
        self.cells == 0
    }
}

/// Two ids are neighbors when their raster regions touch, including across face seams.
fn raster_adjacency(index: &SpatialIndex, cells: usize) -> Vec<SmallVec<[u32; 8]>> {
    let dim = index.raster_dim() as usize;
    let mut pairs: Vec<(u32, u32)> = Vec::new();
    let mut link = |a: u32, b: u32| {
        if a != b {
            pairs.push((a, b));
            pairs.push((b, a));
        }
    };
    for face in 0..6u8 {
        for j in 0..dim {
            for i in 0..dim {
                let here = index.sample(face, i, j);
                if i + 1 < dim {
                    link(here, index.sample(face, i + 1, j));
                }
                if j + 1 < dim {
                    link(here, index.sample(face, i, j + 1));
                }
                let on_edge = i == 0 || j == 0 || i + 1 == dim || j + 1 == dim;
                if !on_edge {
                    continue;
                }
                // step one sample past the edge onto the adjacent face
                let step = 2.0 / (dim - 1) as f64;
                let u = index::sample_coord(i, dim);
                let v = index::sample_coord(j, dim);
                let beyond = [
                    (i == 0, u - step, v),
                    (i + 1 == dim, u + step, v),
                    (j == 0, u, v - step),
                    (j + 1 == dim, u, v + step),
                ];
                for (active, bu, bv) in beyond {
                    if active {
                        let d = geo::normalize(index::face_dir(face, bu, bv));
                        link(here, index.nearest_unit(d));
                    }
                }
            }
        }
    }
    pairs.sort_unstable();
    pairs.dedup();

    let mut n1: Vec<SmallVec<[u32; 8]>> = vec![SmallVec::new(); cells];
    for (a, b) in pairs {
        n1[a as usize].push(b);
    }
    n1
}
