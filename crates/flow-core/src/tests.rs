//! Unit tests for flow-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, NodeId, VehicleId};

    #[test]
    fn index_roundtrip() {
        let id = EdgeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(EdgeId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::default(), EdgeId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(VehicleId(7).to_string(), "VehicleId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::geo::{MIN_PATH_LENGTH_M, project_onto_segment, raw_path_length};
    use crate::{Coordinate, distance, path_length};

    #[test]
    fn zero_distance() {
        let p = Coordinate::new(10.3151, 47.7267);
        assert_eq!(distance(p, p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (Coordinate::new(10.31, 47.72), Coordinate::new(10.32, 47.73)),
            (Coordinate::new(-0.09, 51.505), Coordinate::new(11.56, 48.13)),
            (Coordinate::new(179.9, -12.0), Coordinate::new(-179.9, -12.5)),
        ];
        for (a, b) in pairs {
            assert_eq!(distance(a, b), distance(b, a));
        }
    }

    #[test]
    fn one_degree_latitude() {
        // ~1 degree of latitude ≈ 111.2 km
        let a = Coordinate::new(11.0, 48.0);
        let b = Coordinate::new(11.0, 49.0);
        let d = distance(a, b);
        assert!((d - 111_195.0).abs() < 50.0, "got {d}");
    }

    #[test]
    fn path_length_sums_segments() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.001, 0.0);
        let c = Coordinate::new(0.001, 0.001);
        let total = path_length(&[a, b, c]);
        assert!((total - (distance(a, b) + distance(b, c))).abs() < 1e-9);
    }

    #[test]
    fn path_length_floor() {
        let p = Coordinate::new(5.0, 5.0);
        assert_eq!(path_length(&[]), MIN_PATH_LENGTH_M);
        assert_eq!(path_length(&[p]), MIN_PATH_LENGTH_M);
        assert_eq!(path_length(&[p, p, p]), MIN_PATH_LENGTH_M);
        assert_eq!(raw_path_length(&[p, p]), 0.0);
    }

    #[test]
    fn key_is_lossless() {
        let a = Coordinate::new(10.0, 47.1);
        let b = Coordinate::new(10.0 + 1e-12, 47.1);
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), Coordinate::new(a.lon, a.lat).key());
        assert_eq!(Coordinate::new(1.5, -2.0).key(), "1.5,-2");
    }

    #[test]
    fn projection_interior_and_clamped() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.002, 0.0);

        let mid = project_onto_segment(a, b, Coordinate::new(0.001, 0.0005));
        assert!((mid.t - 0.5).abs() < 1e-9);
        assert!((mid.point.lon - 0.001).abs() < 1e-12);
        // 0.0005° of latitude ≈ 55.6 m
        assert!((mid.distance_m - 55.6).abs() < 0.5, "got {}", mid.distance_m);

        let before = project_onto_segment(a, b, Coordinate::new(-0.001, 0.0));
        assert_eq!(before.t, 0.0);
        assert_eq!(before.point, a);
    }

    #[test]
    fn projection_degenerate_segment() {
        let a = Coordinate::new(1.0, 1.0);
        let proj = project_onto_segment(a, a, Coordinate::new(1.0, 1.001));
        assert_eq!(proj.t, 0.0);
        assert_eq!(proj.point, a);
    }

    #[test]
    fn bbox_extent_contains_radius() {
        let c = Coordinate::new(10.0, 47.7);
        let (half_lon, half_lat) = c.bbox_half_extent_deg(50.0);
        let east = Coordinate::new(c.lon + half_lon * 0.99, c.lat);
        assert!(distance(c, east) < 50.0);
        assert!(east.within_bbox(c, half_lon, half_lat));
        assert!(!Coordinate::new(c.lon, c.lat + 2.0 * half_lat).within_bbox(c, half_lon, half_lat));
    }
}

#[cfg(test)]
mod config {
    use crate::{SimClock, SimConfig};

    #[test]
    fn default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_multiplier() {
        let cfg = SimConfig { speed_multiplier: 0.0, ..SimConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = SimConfig { speed_multiplier: f64::NAN, ..SimConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_inverted_speed_band() {
        let cfg = SimConfig { min_speed_mps: 20.0, max_speed_mps: 10.0, ..SimConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_speed_band() {
        let cfg = SimConfig { max_speed_mps: f64::INFINITY, ..SimConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = SimConfig { min_speed_mps: f64::NAN, ..SimConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = SimConfig { max_step_secs: f64::INFINITY, ..SimConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn clamp_step() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.clamp_step(0.5), 0.1);
        assert_eq!(cfg.clamp_step(0.016), 0.016);
        assert_eq!(cfg.clamp_step(-1.0), 0.0);
    }

    #[test]
    fn clock_advances() {
        let mut clock = SimClock::new();
        for _ in 0..3_725 {
            clock.advance(1.0);
        }
        assert_eq!(clock.frame, 3_725);
        assert_eq!(clock.elapsed_hms(), (1, 2, 5));
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = SimRng::new(12345);
        let mut r2 = SimRng::new(12345);
        for _ in 0..100 {
            let a: f64 = r1.random();
            let b: f64 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn gen_range_in_bounds() {
        let mut rng = SimRng::new(0);
        for _ in 0..1000 {
            let v = rng.gen_range(10.0f64..20.0);
            assert!((10.0..20.0).contains(&v));
        }
    }

    #[test]
    fn index_empty_is_none() {
        let mut rng = SimRng::new(0);
        assert_eq!(rng.index(0), None);
        assert_eq!(rng.index(1), Some(0));
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = SimRng::new(0);
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
    }
}

#[cfg(test)]
mod vehicle_class {
    use crate::VehicleClass;

    #[test]
    fn parses_sumo_lists() {
        let classes = VehicleClass::parse_list("passenger bus  emergency");
        assert_eq!(
            classes,
            vec![VehicleClass::Passenger, VehicleClass::Bus, VehicleClass::Emergency]
        );
    }

    #[test]
    fn unknown_kept_verbatim() {
        assert_eq!(VehicleClass::parse("Tram"), VehicleClass::Other("tram".into()));
        assert_eq!(VehicleClass::parse("tram").to_string(), "tram");
    }

    #[test]
    fn motorised() {
        assert!(VehicleClass::Bus.is_motorised());
        assert!(!VehicleClass::Bicycle.is_motorised());
    }
}
