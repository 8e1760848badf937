use lithos_engine::cell::CellRef;
use lithos_engine::subduction::{can_subduct, collision_roles, docking_roles, Contender};

#[test]
fn unequal_offsets_give_complementary_answers() {
    let offsets = [-40.0, -3.5, 0.0, 0.25, 1.0, 57.0];
    for &a in &offsets {
        for &b in &offsets {
            if a == b {
                continue;
            }
            assert_ne!(can_subduct(a, b), can_subduct(b, a), "offsets {a} vs {b}");
        }
    }
}

#[test]
fn equal_offsets_never_subduct() {
    for a in [-1.0, 0.0, 12.5] {
        assert!(!can_subduct(a, a));
    }
}

#[test]
fn roles_do_not_depend_on_argument_order() {
    let cases = [
        (0.0, 2700.0, 1.0, 2890.0),
        (3.0, 2890.0, 3.0, 2700.0),
        (3.0, 2800.0, 3.0, 2800.0),
        (-7.0, 2950.0, 8.0, 2600.0),
    ];
    for (i, (oa, ra, ob, rb)) in cases.into_iter().enumerate() {
        let a = Contender { cell: CellRef::new(1, i as u32), density_offset: oa, column_density: ra };
        let b = Contender { cell: CellRef::new(2, 9), density_offset: ob, column_density: rb };
        assert_eq!(collision_roles(a, b), collision_roles(b, a));
    }
}

#[test]
fn tie_breaks_follow_column_density_then_id() {
    let light = Contender { cell: CellRef::new(5, 0), density_offset: 0.0, column_density: 2700.0 };
    let dense = Contender { cell: CellRef::new(1, 0), density_offset: 0.0, column_density: 2890.0 };
    assert_eq!(collision_roles(light, dense), (light.cell, dense.cell));

    let twin = Contender { cell: CellRef::new(7, 0), ..light };
    assert_eq!(collision_roles(light, twin), (light.cell, twin.cell));
}

#[test]
fn lighter_plate_subjugates_when_docking() {
    assert_eq!(docking_roles((3, 10.0), (4, -10.0)), (4, 3));
    assert_eq!(docking_roles((4, -10.0), (3, 10.0)), (4, 3));
    assert_eq!(docking_roles((9, 0.0), (2, 0.0)), (2, 9));
}
