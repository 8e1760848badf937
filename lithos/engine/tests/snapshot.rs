use lithos_engine::config::WorldConfig;
use lithos_engine::snapshot::WorldState;
use lithos_engine::world::{World, WorldError};

fn stepped_world() -> (WorldConfig, World) {
    let cfg = WorldConfig::default().with_point_count(400).with_plates(4).with_seed(77);
    let mut w = World::new(cfg.clone()).unwrap();
    for _ in 0..12 {
        w.update(3.0).unwrap();
    }
    (cfg, w)
}

#[test]
fn export_import_reproduces_the_world() {
    let (cfg, w) = stepped_world();
    let state = w.export_state();
    assert_eq!(state.plate_count, state.plates.len());
    assert_eq!(state.step_idx, 12);
    assert!(state.plates.iter().all(|p| u32::from(p.id) < state.next_plate_id));

    let restored = World::from_state(cfg, &state).unwrap();
    assert_eq!(restored.export_state(), state);
    assert_eq!(restored.elevation_m(), w.elevation_m());
    assert_eq!(restored.density(), w.density());
    assert_eq!(restored.top_plate_map(), w.top_plate_map());
    assert_eq!(restored.clock, w.clock);
    assert_eq!(restored.cycle().age(), w.cycle().age());
    assert_eq!(restored.cycle().duration(), w.cycle().duration());
}

#[test]
fn state_survives_json() {
    let (cfg, w) = stepped_world();
    let state = w.export_state();
    let text = serde_json::to_string(&state).unwrap();
    let back: WorldState = serde_json::from_str(&text).unwrap();
    assert_eq!(back, state);

    let restored = World::from_state(cfg, &back).unwrap();
    assert_eq!(restored.elevation_m(), w.elevation_m());
}

#[test]
fn restored_world_keeps_stepping() {
    let (cfg, w) = stepped_world();
    let mut restored = World::from_state(cfg, &w.export_state()).unwrap();
    let stats = restored.update(3.0).unwrap();
    assert_eq!(restored.clock.step_idx, 13);
    assert_eq!(stats.plate_count, restored.plate_count());
}

#[test]
fn inconsistent_states_are_rejected() {
    let (cfg, w) = stepped_world();

    let mut bad = w.export_state();
    bad.plate_count += 1;
    assert!(matches!(World::from_state(cfg.clone(), &bad), Err(WorldError::StateMismatch(_))));

    let mut bad = w.export_state();
    let cell = bad.plates.iter_mut().find_map(|p| p.cells.last_mut()).unwrap();
    cell.local_id = 400;
    assert!(matches!(World::from_state(cfg.clone(), &bad), Err(WorldError::StateMismatch(_))));

    let mut bad = w.export_state();
    bad.cycle.age = bad.cycle.duration + 1.0;
    assert!(matches!(World::from_state(cfg, &bad), Err(WorldError::Config(_))));
}

#[test]
fn states_without_an_id_counter_resume_after_the_last_plate() {
    let (cfg, w) = stepped_world();
    let mut state = w.export_state();
    state.next_plate_id = 0;
    let last = state.plates.last().unwrap().id;
    let mut restored = World::from_state(cfg, &state).unwrap();
    let id = restored.add_plate(0.0, [0.0, 0.0, 1.0], 0.0).unwrap();
    assert_eq!(id, last + 1);
}
