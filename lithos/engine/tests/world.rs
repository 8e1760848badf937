use lithos_engine::config::{ConfigError, WorldConfig};
use lithos_engine::coverage::{footprint, registrations};
use lithos_engine::rock_column::RockColumn;
use lithos_engine::world::{World, WorldError};

fn cfg(seed: u64) -> WorldConfig {
    WorldConfig::default().with_point_count(500).with_plates(5).with_seed(seed)
}

#[test]
fn same_seed_same_world() {
    let mut a = World::new(cfg(42)).unwrap();
    let mut b = World::new(cfg(42)).unwrap();
    for _ in 0..20 {
        let sa = a.update(5.0).unwrap();
        let sb = b.update(5.0).unwrap();
        assert_eq!(sa, sb);
    }
    assert_eq!(a.elevation_m(), b.elevation_m());
    assert_eq!(a.top_plate_map(), b.top_plate_map());
    assert_eq!(a.export_state(), b.export_state());
}

#[test]
fn different_seeds_differ() {
    let a = World::new(cfg(1)).unwrap();
    let b = World::new(cfg(2)).unwrap();
    assert_ne!(a.top_plate_map(), b.top_plate_map());
}

#[test]
fn new_world_covers_the_sphere() {
    let w = World::new(cfg(7)).unwrap();
    assert_eq!(w.plate_count(), 5);
    let n = w.grid().cells;
    assert!(w.top_plate_map().iter().all(Option::is_some));
    let occupied: usize = w.plates().iter().map(|p| p.occupied_count()).sum();
    assert_eq!(occupied, n);

    let land = w.plates().iter().flat_map(|p| p.occupied()).filter(|(_, c)| c.is_continental()).count();
    assert!(land > 0 && land < n);
    let sea = w.sea_level_m();
    assert!(w.elevation_m().iter().any(|&e| e > sea));
    assert!(w.elevation_m().iter().any(|&e| e <= sea));
}

#[test]
fn fields_follow_the_top_plate() {
    let mut w = World::new(cfg(3)).unwrap();
    for _ in 0..10 {
        w.update(4.0).unwrap();
    }
    let cover = footprint(w.plates(), w.grid());
    for g in 0..w.grid().cells as u32 {
        match w.plate_at(g) {
            Some(id) => {
                // the field shows one of the columns over this id, from the named plate
                let shown = cover[g as usize]
                    .iter()
                    .filter(|r| r.plate == id)
                    .filter_map(|r| w.plate(id).unwrap().cell(r.cell).unwrap().column())
                    .any(|col| w.elevation_at(g) == Some(col.elevation) && w.density_at(g) == Some(col.density));
                assert!(shown, "grid id {g}");
                let v = w.velocity_at(g).unwrap();
                let p = w.grid().pos_xyz[g as usize];
                assert!((v[0] * p[0] + v[1] * p[1] + v[2] * p[2]).abs() < 1e-12);
            }
            None => {
                assert!(cover[g as usize].is_empty());
                assert_eq!(w.elevation_at(g), Some(0.0));
                assert_eq!(w.density_at(g), Some(w.config().materials.mantle));
                assert_eq!(w.velocity_at(g), None);
            }
        }
    }
    assert_eq!(w.elevation_at(w.grid().cells as u32), None);
}

#[test]
fn every_column_stays_visible_while_plates_rotate() {
    let mut w = World::new(WorldConfig::default().with_point_count(800).with_seed(11)).unwrap();
    for _ in 0..40 {
        w.update(5.0).unwrap();
        let reg = registrations(w.plates(), w.grid());
        let occupied: usize = w.plates().iter().map(|p| p.occupied_count()).sum();
        assert_eq!(reg.iter().map(|cells| cells.len()).sum::<usize>(), occupied);
        for plate in w.plates() {
            for (cell, _) in plate.occupied() {
                let g = plate.global_id_of(cell.id()).unwrap();
                assert!(reg[g as usize].contains(&cell.cell_ref()));
                assert!(w.plate_at(g).is_some(), "column {:?} over bare ground", cell.cell_ref());
            }
        }
    }
}

#[test]
fn plate_ids_are_never_reused() {
    let mut w = World::empty(WorldConfig::default().with_point_count(300).with_plates(1)).unwrap();
    let keep = w.add_plate(0.0, [0.0, 0.0, 1.0], 0.0).unwrap();
    let gone = w.add_plate(1.0, [0.0, 0.0, 1.0], 0.0).unwrap();
    w.plate_mut(keep).unwrap().fill(5, RockColumn::with_isostasy(20_000.0, 2700.0, 3300.0));
    w.plate_mut(gone).unwrap().fill(5, RockColumn::with_isostasy(20_000.0, 2700.0, 3300.0));
    assert_eq!(w.resolve_collisions().unwrap().docked_plates, 1);
    assert!(w.plate(gone).is_none());

    let fresh = w.add_plate(0.0, [0.0, 0.0, 1.0], 0.0).unwrap();
    assert!(fresh > gone);
    let split = w.reorganize().unwrap().unwrap();
    assert!(split > fresh);
    assert!(w.plates().windows(2).all(|p| p[0].id() < p[1].id()));
}

#[test]
fn clock_advances_per_step() {
    let mut w = World::new(cfg(4)).unwrap();
    for _ in 0..8 {
        w.update(2.5).unwrap();
    }
    assert_eq!(w.clock.step_idx, 8);
    assert!((w.clock.t_myr - 20.0).abs() < 1e-12);
}

#[test]
fn invalid_configs_are_rejected() {
    let err = World::new(WorldConfig::default().with_point_count(0)).unwrap_err();
    assert_eq!(err, WorldError::Config(ConfigError::NoPoints));
    let err = World::new(WorldConfig::default().with_point_count(10).with_plates(0)).unwrap_err();
    assert_eq!(err, WorldError::Config(ConfigError::NoPlates));
    let err = World::new(WorldConfig::default().with_point_count(10).with_plates(11)).unwrap_err();
    assert!(matches!(err, WorldError::Config(ConfigError::TooManyPlates { plates: 11, points: 10 })));
}
