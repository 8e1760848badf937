use lithos_engine::config::WorldConfig;
use lithos_engine::supercontinent::{DurationPolicy, SupercontinentCycle};
use lithos_engine::world::World;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn count_fires(dt: f64, steps: usize) -> usize {
    let mut rng = StdRng::seed_from_u64(1);
    let mut cycle = SupercontinentCycle::new(DurationPolicy::Fixed(150.0), &mut rng);
    assert!(cycle.is_due());
    let mut fires = 0;
    for _ in 0..steps {
        if cycle.update(dt, &mut rng) {
            fires += 1;
        }
        assert!(cycle.age() <= cycle.duration() + dt);
    }
    fires
}

#[test]
fn fires_every_duration_for_coarse_steps() {
    assert_eq!(count_fires(10.0, 150), 10);
}

#[test]
fn fires_every_duration_for_fine_steps() {
    assert_eq!(count_fires(0.1, 3000), 2);
}

#[test]
fn uniform_policy_redraws_on_restart() {
    let mut rng = StdRng::seed_from_u64(3);
    let policy = DurationPolicy::Uniform { min: 100.0, max: 300.0 };
    let mut cycle = SupercontinentCycle::new(policy, &mut rng);
    for _ in 0..50 {
        cycle.restart(&mut rng);
        assert_eq!(cycle.age(), 0.0);
        assert!((100.0..=300.0).contains(&cycle.duration()));
    }
}

#[test]
fn first_step_splits_the_largest_plate() {
    let cfg = WorldConfig::default().with_point_count(400).with_plates(3).with_seed(5);
    let mut w = World::new(cfg).unwrap();
    let stats = w.update(1.0).unwrap();
    assert!(stats.cycle_fired);
    let new_id = stats.split.expect("a plate should split");
    assert!(w.plate(new_id).unwrap().occupied_count() > 0);
    assert_eq!(w.cycle().age(), 0.0);

    // not due again until a full duration has passed
    let stats = w.update(1.0).unwrap();
    assert!(!stats.cycle_fired);
    assert_eq!(stats.split, None);
}

#[test]
fn split_preserves_crust() {
    let cfg = WorldConfig::default().with_point_count(500).with_plates(2).with_seed(9);
    let mut w = World::new(cfg).unwrap();
    let mass = w.total_crust_mass();
    let cells: usize = w.plates().iter().map(|p| p.occupied_count()).sum();
    let largest = w.plates().iter().max_by_key(|p| p.occupied_count()).unwrap().occupied_count();

    let new_id = w.reorganize().unwrap().unwrap();
    assert_eq!(w.plate_count(), 3);
    let after_cells: usize = w.plates().iter().map(|p| p.occupied_count()).sum();
    assert_eq!(after_cells, cells);
    assert!((w.total_crust_mass() - mass).abs() / mass < 1e-12);

    let fresh = w.plate(new_id).unwrap().occupied_count();
    assert!(fresh > 0 && fresh < largest);
}

#[test]
fn no_split_above_target_count() {
    let cfg = WorldConfig::default().with_point_count(300).with_plates(4).with_target_plate_count(3);
    let mut w = World::new(cfg).unwrap();
    assert_eq!(w.reorganize().unwrap(), None);
    assert_eq!(w.plate_count(), 4);
}

#[test]
fn plate_count_stays_in_the_docking_split_band() {
    let cfg = WorldConfig::default().with_point_count(400).with_seed(21);
    let target = cfg.target_plate_count;
    let mut w = World::new(cfg).unwrap();
    let (mut fires, mut splits) = (0, 0);
    for _ in 0..160 {
        let stats = w.update(5.0).unwrap();
        assert!(stats.plate_count >= 1 && stats.plate_count <= target + 1);
        if stats.cycle_fired {
            fires += 1;
            // a fire always splits unless docking left more plates than the target
            match stats.split {
                Some(_) => splits += 1,
                None => assert!(stats.plate_count > target),
            }
        }
        assert!(w.plates().iter().any(|p| p.occupied_count() > 0));
    }
    // 800 Myr at the default 150 Myr cycle, due at the first step
    assert_eq!(fires, 6);
    assert!(splits >= 1);
}
