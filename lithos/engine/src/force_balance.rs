//! Buoyancy-driven force balance for plate angular velocities.
//!
//! Cells denser than their plate's mean pull tangentially away from the
//! plate's center of mass (slab pull), lighter cells push back toward it. The
//! area-weighted torque of those forces nudges ω each step through a gain with
//! linear damping and clamps.

use crate::config::{MaterialDensity, MotionParams};
use crate::geo;
use crate::grid::SphereGrid;
use crate::plate::Plate;
use crate::rock_column::RockColumn;

/// Buoyancy of a column on a plate: `g·(ρ_mantle − (ρ + offset))`.
#[inline]
pub fn buoyancy(column: &RockColumn, density_offset: f64, materials: &MaterialDensity, gravity: f64) -> f64 {
    gravity * (materials.mantle - (column.density + density_offset))
}

/// Net torque about the sphere center from per-cell buoyancy contrasts.
/// Zero for an empty plate.
pub fn plate_torque(plate: &Plate, grid: &SphereGrid, materials: &MaterialDensity, params: &MotionParams) -> [f64; 3] {
    let Some(com) = plate.center_of_mass(grid) else {
        return [0.0; 3];
    };
    let g = params.surface_gravity;

    let mut area_sum = 0.0;
    let mut b_sum = 0.0;
    for (cell, col) in plate.occupied() {
        let a = grid.area[cell.id() as usize];
        area_sum += a;
        b_sum += a * buoyancy(col, plate.density_offset, materials, g);
    }
    if area_sum <= 0.0 {
        return [0.0; 3];
    }
    let b_mean = b_sum / area_sum;

    let mut torque = [0.0f64; 3];
    for (cell, col) in plate.occupied() {
        let p = plate.world_pos(grid, cell.id());
        let Some(dir) = geo::tangent_away_from(p, com) else {
            continue;
        };
        // less buoyant than the mean ⇒ positive pull away from the centroid
        let pull = b_mean - buoyancy(col, plate.density_offset, materials, g);
        let a = grid.area[cell.id() as usize];
        torque = geo::add(torque, geo::scale(geo::cross(p, dir), a * pull));
    }
    torque
}

/// Apply one update `Δω = gain·τ·dt − damp·ω·dt` with `|Δω|` and `|ω|` clamps.
pub fn apply_force_balance(plate: &mut Plate, torque: [f64; 3], dt_myr: f64, params: &MotionParams) {
    let dt = dt_myr.max(0.0);
    if dt == 0.0 {
        return;
    }
    let omega = plate.angular_velocity();
    let mut domega = geo::sub(geo::scale(torque, params.gain * dt), geo::scale(omega, params.damp_per_myr * dt));
    let dn = geo::norm(domega);
    let max_do = params.max_domega.max(0.0);
    if dn > max_do && dn > 0.0 {
        domega = geo::scale(domega, max_do / dn);
    }
    let mut new_o = geo::add(omega, domega);
    let on = geo::norm(new_o);
    let max_o = params.max_omega.max(0.0);
    if on > max_o && on > 0.0 {
        new_o = geo::scale(new_o, max_o / on);
    }
    if new_o.iter().all(|v| v.is_finite()) {
        plate.set_angular_velocity(new_o);
    }
}
