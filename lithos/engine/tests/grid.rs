use lithos_engine::grid::{default_raster_dim, generate_points, SphereGrid};

#[test]
fn same_point_count_reproduces_ids() {
    let a: Vec<_> = generate_points(777).unwrap().collect();
    let b: Vec<_> = generate_points(777).unwrap().collect();
    assert_eq!(a.len(), 777);
    assert_eq!(a, b);
    for (i, p) in a.iter().enumerate() {
        assert_eq!(p.id as usize, i);
        let r = (p.pos[0] * p.pos[0] + p.pos[1] * p.pos[1] + p.pos[2] * p.pos[2]).sqrt();
        assert!((r - 1.0).abs() < 1e-12);
    }
}

#[test]
fn grid_geometry_and_adjacency() {
    let g = SphereGrid::new(500).unwrap();
    assert_eq!(g.cells, 500);
    assert_eq!(g.raster_dim(), default_raster_dim(500));

    let total: f64 = g.area.iter().sum();
    assert!((total - 4.0 * std::f64::consts::PI).abs() < 1e-9);

    for (i, ring) in g.n1.iter().enumerate() {
        assert!(ring.len() >= 3, "cell {i} has only {} neighbors", ring.len());
        assert!(ring.windows(2).all(|w| w[0] < w[1]), "neighbors must be sorted and unique");
        for &j in ring {
            assert_ne!(j as usize, i);
            assert!(g.n1[j as usize].contains(&(i as u32)), "adjacency must be symmetric");
        }
    }

    // neighbors are close: within a few mean spacings
    let spacing = (4.0 * std::f64::consts::PI / 500.0).sqrt();
    for (i, ring) in g.n1.iter().enumerate() {
        for &j in ring {
            let a = g.pos_xyz[i];
            let b = g.pos_xyz[j as usize];
            let d = (a[0] * b[0] + a[1] * b[1] + a[2] * b[2]).clamp(-1.0, 1.0).acos();
            assert!(d < 3.0 * spacing);
        }
    }
}

#[test]
fn latlon_matches_positions() {
    let g = SphereGrid::new(64).unwrap();
    for (p, ll) in g.pos_xyz.iter().zip(&g.latlon) {
        assert!((ll[0].sin() - p[2]).abs() < 1e-12);
    }
}
