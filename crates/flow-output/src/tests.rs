//! Integration tests for flow-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use flow_metrics::JamLevel;
    use flow_mobility::VehicleState;

    use crate::csv::{CsvWriter, SNAPSHOT_FILE, SUMMARY_FILE};
    use crate::row::{TickSummaryRow, VehicleSnapshotRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn snap_row(vehicle_id: u32, frame: u64) -> VehicleSnapshotRow {
        VehicleSnapshotRow {
            vehicle_id,
            frame,
            elapsed_secs: frame as f64 * 0.1,
            lon:          10.0,
            lat:          47.0,
            edge:         vehicle_id * 2,
            progress:     0.25,
            speed_mps:    12.5,
            odometer_m:   40.0,
            state:        VehicleState::NeedsRoute,
            density:      3,
            jam:          JamLevel::Moderate,
            co2:          0.65,
            noise:        0.7,
        }
    }

    fn summary_row(frame: u64) -> TickSummaryRow {
        TickSummaryRow {
            frame,
            elapsed_secs:  1.5,
            vehicle_count: 4,
            mean_density:  0.5,
            heavy_jams:    0,
            mean_co2:      0.275,
            mean_noise:    0.7,
            blocked_edges: 2,
        }
    }

    fn headers(path: std::path::PathBuf) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn csv_files_created_with_headers() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let snap = headers(dir.path().join(SNAPSHOT_FILE));
        assert_eq!(snap.len(), 14);
        assert_eq!(snap[0], "vehicle_id");
        assert_eq!(snap[11], "jam");

        let summary = headers(dir.path().join(SUMMARY_FILE));
        assert_eq!(
            summary,
            ["frame", "elapsed_secs", "vehicle_count", "mean_density", "heavy_jams",
             "mean_co2", "mean_noise", "blocked_edges"]
        );
    }

    #[test]
    fn csv_snapshot_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 5), snap_row(1, 5), snap_row(2, 5)]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(SNAPSHOT_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[1][0], "1");           // vehicle_id
        assert_eq!(&rows[1][1], "5");           // frame
        assert_eq!(&rows[1][5], "2");           // edge
        assert_eq!(&rows[1][9], "needs_route"); // state
        assert_eq!(&rows[1][11], "moderate");   // jam
    }

    #[test]
    fn csv_tick_summary_row() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&summary_row(15)).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(SUMMARY_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "15");
        assert_eq!(&rows[0][2], "4");
        assert_eq!(&rows[0][7], "2");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_missing_dir_is_error() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("does/not/exist")).is_err());
    }
}

#[cfg(test)]
mod observer_tests {
    use tempfile::TempDir;

    use flow_core::geo::METRES_PER_DEG_LAT;
    use flow_core::{Coordinate, SimConfig, SimRng};
    use flow_network::{RoadAttributes, RoadFeature, build_network};
    use flow_sim::{Sim, SimBuilder};

    use crate::csv::{CsvWriter, SNAPSHOT_FILE, SUMMARY_FILE};
    use crate::observer::SnapshotOutputObserver;
    use crate::row::{TickSummaryRow, VehicleSnapshotRow};
    use crate::writer::OutputWriter;
    use crate::{OutputError, OutputResult};

    fn at(x: f64, y: f64) -> Coordinate {
        let k = 47.0f64.to_radians().cos();
        Coordinate::new(10.0 + x / (METRES_PER_DEG_LAT * k), 47.0 + y / METRES_PER_DEG_LAT)
    }

    fn loop_sim(vehicles: usize) -> Sim {
        let side = |a: (f64, f64), b: (f64, f64)| {
            RoadFeature::line(vec![at(a.0, a.1), at(b.0, b.1)], RoadAttributes::default())
        };
        let graph = build_network(&[
            side((0.0, 0.0), (100.0, 0.0)),
            side((100.0, 0.0), (100.0, 100.0)),
            side((100.0, 100.0), (0.0, 100.0)),
            side((0.0, 100.0), (0.0, 0.0)),
        ]);
        let config = SimConfig { vehicle_count: vehicles, ..SimConfig::default() };
        SimBuilder::new(config).network(graph).rng(SimRng::new(7)).build().unwrap()
    }

    /// Fails every write after the first `ok_writes`.
    struct Flaky {
        ok_writes: usize,
        writes:    usize,
    }

    impl Flaky {
        fn write(&mut self) -> OutputResult<()> {
            self.writes += 1;
            if self.writes > self.ok_writes {
                Err(OutputError::Io(std::io::Error::other(format!("write {}", self.writes))))
            } else {
                Ok(())
            }
        }
    }

    impl OutputWriter for Flaky {
        fn write_snapshots(&mut self, _rows: &[VehicleSnapshotRow]) -> OutputResult<()> {
            self.write()
        }

        fn write_tick_summary(&mut self, _row: &TickSummaryRow) -> OutputResult<()> {
            self.write()
        }

        fn finish(&mut self) -> OutputResult<()> {
            Ok(())
        }
    }

    #[test]
    fn integration_csv() {
        let mut sim = loop_sim(4);
        let dir: TempDir = tempfile::tempdir().expect("create temp dir");
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = SnapshotOutputObserver::new(writer, 5);

        sim.run_for(1.0, 0.1, &mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        // interval 5 over frames 1..=10 → frames 5 and 10, 4 vehicles each
        let mut rdr = csv::Reader::from_path(dir.path().join(SNAPSHOT_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 8);
        assert_eq!(&rows[0][1], "5");
        assert_eq!(&rows[7][1], "10");

        let mut rdr = csv::Reader::from_path(dir.path().join(SUMMARY_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 10);
        assert_eq!(&rows[9][2], "4");
    }

    #[test]
    fn first_error_is_kept() {
        let mut sim = loop_sim(2);
        let mut obs = SnapshotOutputObserver::new(Flaky { ok_writes: 1, writes: 0 }, 1);
        sim.run_for(0.3, 0.1, &mut obs).unwrap();

        match obs.take_error() {
            Some(OutputError::Io(e)) => assert_eq!(e.to_string(), "write 2"),
            other => panic!("expected stored I/O error, got {other:?}"),
        }
        assert!(obs.take_error().is_none());
        assert_eq!(obs.into_writer().writes, 6);
    }

    #[test]
    fn zero_interval_means_every_frame() {
        let mut sim = loop_sim(1);
        let mut obs = SnapshotOutputObserver::new(Flaky { ok_writes: usize::MAX, writes: 0 }, 0);
        sim.run_for(0.3, 0.1, &mut obs).unwrap();
        assert_eq!(obs.into_writer().writes, 6);
    }
}
