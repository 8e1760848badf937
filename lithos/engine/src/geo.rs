//! Small 3D vector helpers on `[f64; 3]` used across the engine.
#![allow(clippy::many_single_char_names)]

/// Vectors shorter than this are treated as degenerate directions.
pub const DEGENERATE_NORM: f64 = 1e-12;

/// Dot product of 3D vectors.
#[inline]
pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Cross product of 3D vectors.
#[inline]
pub fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[1] * b[2] - a[2] * b[1], a[2] * b[0] - a[0] * b[2], a[0] * b[1] - a[1] * b[0]]
}

/// Euclidean norm of a 3D vector.
#[inline]
pub fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

/// Normalize a 3D vector (returns zero if input is zero).
#[inline]
pub fn normalize(mut a: [f64; 3]) -> [f64; 3] {
    let n = norm(a);
    if n > 0.0 {
        a[0] /= n;
        a[1] /= n;
        a[2] /= n;
    }
    a
}

/// Normalize a 3D vector, or `None` when it is too short or not finite.
#[inline]
pub fn try_normalize(a: [f64; 3]) -> Option<[f64; 3]> {
    let n = norm(a);
    if !n.is_finite() || n < DEGENERATE_NORM {
        return None;
    }
    Some([a[0] / n, a[1] / n, a[2] / n])
}

/// Component-wise `a + b`.
#[inline]
pub fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// Component-wise `a - b`.
#[inline]
pub fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Scale a vector by `k`.
#[inline]
pub fn scale(a: [f64; 3], k: f64) -> [f64; 3] {
    [a[0] * k, a[1] * k, a[2] * k]
}

/// Angle in radians between two unit vectors.
#[inline]
pub fn angle_between(a_unit: [f64; 3], b_unit: [f64; 3]) -> f64 {
    // angle = atan2(|a×b|, a·b)
    let s = norm(cross(a_unit, b_unit));
    let d = dot(a_unit, b_unit).clamp(-1.0, 1.0);
    s.atan2(d).abs()
}

/// Unit tangent at `r_hat` pointing along the great circle away from `from_unit`.
///
/// Returns `None` when the two points coincide or are antipodal.
#[inline]
pub fn tangent_away_from(r_hat: [f64; 3], from_unit: [f64; 3]) -> Option<[f64; 3]> {
    // component of `from` perpendicular to r points toward `from`
    let toward = sub(from_unit, scale(r_hat, dot(r_hat, from_unit)));
    try_normalize(toward).map(|t| scale(t, -1.0))
}

/// Any unit vector perpendicular to `a_unit`.
#[inline]
pub fn any_perpendicular(a_unit: [f64; 3]) -> [f64; 3] {
    // Use Z as reference; if near-parallel, fall back to Y
    let z = [0.0_f64, 0.0, 1.0];
    let mut e = cross(z, a_unit);
    if norm(e) < 1e-6 {
        e = cross([0.0, 1.0, 0.0], a_unit);
    }
    normalize(e)
}

/// Convert a unit vector to (lat, lon) in radians.
#[inline]
pub fn to_latlon(p: [f64; 3]) -> [f64; 2] {
    let (x, y, z) = (p[0], p[1], p[2]);
    [z.atan2((x * x + y * y).sqrt()), y.atan2(x)]
}

/// Convert (lat, lon) in radians to a unit vector.
#[inline]
pub fn from_latlon(lat: f64, lon: f64) -> [f64; 3] {
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}
