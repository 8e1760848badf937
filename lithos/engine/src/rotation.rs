//! Rigid rotations of the unit sphere stored as 3×3 row-major matrices.

use crate::geo;

/// A proper rotation matrix (row-major).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    /// Matrix rows.
    pub m: [[f64; 3]; 3],
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Rotation {
    /// The identity rotation.
    pub const IDENTITY: Self = Self { m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] };

    /// Wrap raw rows (e.g. restored from persisted state).
    pub fn from_rows(m: [[f64; 3]; 3]) -> Self {
        Self { m }
    }

    /// Rotation about unit `axis` by `theta` radians (Rodrigues formula).
    /// A degenerate axis yields the identity.
    pub fn from_axis_angle(axis: [f64; 3], theta: f64) -> Self {
        let Some(k) = geo::try_normalize(axis) else {
            return Self::IDENTITY;
        };
        if theta == 0.0 || !theta.is_finite() {
            return Self::IDENTITY;
        }
        let (s, c) = theta.sin_cos();
        let t = 1.0 - c;
        let [x, y, z] = k;
        Self {
            m: [
                [c + x * x * t, x * y * t - z * s, x * z * t + y * s],
                [y * x * t + z * s, c + y * y * t, y * z * t - x * s],
                [z * x * t - y * s, z * y * t + x * s, c + z * z * t],
            ],
        }
    }

    /// Apply to a vector.
    #[inline]
    pub fn apply(&self, v: [f64; 3]) -> [f64; 3] {
        [geo::dot(self.m[0], v), geo::dot(self.m[1], v), geo::dot(self.m[2], v)]
    }

    /// Matrix product `self · rhs` (apply `rhs` first).
    pub fn then_after(&self, rhs: &Rotation) -> Rotation {
        let mut out = [[0.0f64; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = self.m[i][0] * rhs.m[0][j] + self.m[i][1] * rhs.m[1][j] + self.m[i][2] * rhs.m[2][j];
            }
        }
        Rotation { m: out }
    }

    /// Transpose, which is the inverse for an orthonormal matrix.
    pub fn transpose(&self) -> Rotation {
        let m = self.m;
        Rotation {
            m: [[m[0][0], m[1][0], m[2][0]], [m[0][1], m[1][1], m[2][1]], [m[0][2], m[1][2], m[2][2]]],
        }
    }

    /// Re-orthonormalize rows with Gram–Schmidt to remove accumulated drift.
    pub fn orthonormalize(&mut self) {
        let r0 = geo::normalize(self.m[0]);
        let r1 = geo::normalize(geo::sub(self.m[1], geo::scale(r0, geo::dot(r0, self.m[1]))));
        // third row from the first two keeps the matrix proper (det = +1)
        let r2 = geo::cross(r0, r1);
        if geo::norm(r0) == 0.0 || geo::norm(r1) == 0.0 {
            *self = Self::IDENTITY;
            return;
        }
        self.m = [r0, r1, r2];
    }

    /// Largest absolute entry of `RᵀR − I`.
    pub fn orthonormality_error(&self) -> f64 {
        let p = self.transpose().then_after(self);
        let mut err = 0.0f64;
        for (i, row) in p.m.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                let target = if i == j { 1.0 } else { 0.0 };
                err = err.max((v - target).abs());
            }
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn quarter_turn_about_z() {
        let r = Rotation::from_axis_angle([0.0, 0.0, 1.0], FRAC_PI_2);
        let v = r.apply([1.0, 0.0, 0.0]);
        assert!((v[0]).abs() < 1e-12 && (v[1] - 1.0).abs() < 1e-12);
        let back = r.transpose().apply(v);
        assert!((back[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn orthonormalize_repairs_drift() {
        let mut r = Rotation::from_axis_angle([0.2, 0.5, 0.8], 0.7);
        r.m[0][0] += 1e-4;
        r.m[2][1] -= 1e-4;
        assert!(r.orthonormality_error() > 1e-6);
        r.orthonormalize();
        assert!(r.orthonormality_error() < 1e-12);
    }
}
