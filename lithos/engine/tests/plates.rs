use lithos_engine::config::WorldConfig;
use lithos_engine::force_balance::plate_torque;
use lithos_engine::geo;
use lithos_engine::rock_column::RockColumn;
use lithos_engine::world::World;

const MANTLE: f64 = 3300.0;

#[test]
fn uniform_plate_feels_no_torque() {
    let mut w = World::empty(WorldConfig::default().with_point_count(400).with_plates(1)).unwrap();
    let id = w.add_plate(0.0, [0.0, 0.0, 1.0], 0.0).unwrap();
    let ocean = RockColumn::with_isostasy(7100.0, 2890.0, MANTLE);
    let cap: Vec<u32> = (0..400u32).filter(|&g| w.grid().pos_xyz[g as usize][2] > 0.3).collect();
    for &g in &cap {
        w.plate_mut(id).unwrap().fill(g, ocean);
    }
    let cfg = w.config().clone();
    let t = plate_torque(w.plate(id).unwrap(), w.grid(), &cfg.materials, &cfg.motion);
    assert!(geo::norm(t) < 1e-9, "torque {t:?}");
}

#[test]
fn dense_side_is_pulled_away_from_the_centroid() {
    let mut w = World::empty(WorldConfig::default().with_point_count(600).with_plates(1)).unwrap();
    let id = w.add_plate(0.0, [0.0, 0.0, 1.0], 0.0).unwrap();
    let land = RockColumn::with_isostasy(36_900.0, 2700.0, MANTLE);
    let ocean = RockColumn::with_isostasy(7100.0, 2890.0, MANTLE);
    let mut ocean_centroid = [0.0; 3];
    for g in 0..600u32 {
        let p = w.grid().pos_xyz[g as usize];
        if p[2] > 0.6 {
            w.plate_mut(id).unwrap().fill(g, land);
        } else if p[2] > 0.0 && p[0] > 0.4 {
            w.plate_mut(id).unwrap().fill(g, ocean);
            ocean_centroid = geo::add(ocean_centroid, p);
        }
    }
    let ocean_centroid = geo::normalize(ocean_centroid);
    let plate = w.plate(id).unwrap();
    let com = plate.center_of_mass(w.grid()).unwrap();
    let cfg = w.config().clone();
    let torque = plate_torque(plate, w.grid(), &cfg.materials, &cfg.motion);
    assert!(geo::norm(torque) > 0.0);

    // ω ∝ τ, so the slab moves with ω × r
    let v = geo::cross(torque, ocean_centroid);
    let away = geo::tangent_away_from(ocean_centroid, com).unwrap();
    assert!(geo::dot(v, away) > 0.0);
}

#[test]
fn rotations_stay_orthonormal_over_long_runs() {
    let cfg = WorldConfig::default().with_point_count(300).with_plates(3).with_seed(11);
    let mut w = World::new(cfg).unwrap();
    for _ in 0..400 {
        w.update(2.5).unwrap();
    }
    for p in w.plates() {
        assert!(p.local_to_global().orthonormality_error() < 1e-9, "plate {}", p.id());
        let pole_len = geo::norm(p.euler_pole);
        assert!((pole_len - 1.0).abs() < 1e-9);
        assert!(p.angular_speed.is_finite() && p.angular_speed >= 0.0);
        assert!(p.angular_speed <= w.config().motion.max_omega + 1e-15);
    }
}

#[test]
fn id_maps_follow_the_rotation() {
    let mut w = World::empty(WorldConfig::default().with_point_count(500).with_plates(1)).unwrap();
    let id = w.add_plate(0.0, [0.0, 0.0, 1.0], 0.02).unwrap();
    let motion = w.config().motion;
    for _ in 0..10 {
        w.plate_mut(id).unwrap().advance(1.0, &motion);
    }
    w.remap_plates();
    let grid = w.grid();
    let plate = w.plate(id).unwrap();
    for local in (0..500u32).step_by(37) {
        let g = plate.global_id_of(local).unwrap();
        let world_pos = plate.world_pos(grid, local);
        assert_eq!(grid.nearest(world_pos).unwrap(), g);
    }
}
