use fleet_sim::error::StorageError;
use fleet_sim::{FleetManager, Vehicle};
use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

fn scratch_file(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("fleet_sim_{}_{}_{}.csv", tag, process::id(), nanos))
}

fn used_fleet() -> FleetManager {
    let mut fm = FleetManager::new();
    fm.add_vehicle(Vehicle::car("HR26", "Honda Amaze", 160.0).unwrap())
        .unwrap();
    fm.add_vehicle(Vehicle::truck("UP14", "Tata, Heavy", 100.0, 10).unwrap())
        .unwrap();
    fm.add_vehicle(Vehicle::bus("DL02", "Volvo Bus", 120.0, 6).unwrap())
        .unwrap();
    fm.add_vehicle(Vehicle::airplane("ULT", "Boeing 747", 900.0, 35_000.0).unwrap())
        .unwrap();
    fm.add_vehicle(Vehicle::cargo_ship("B16", "Britannic", 40.0, false).unwrap())
        .unwrap();
    fm.add_vehicle(Vehicle::cargo_ship("S01", "Clipper", 25.0, true).unwrap())
        .unwrap();

    let refuel = fm.refuel_all(300.0);
    assert!(refuel.failures.iter().all(|(id, _)| id == "S01"));
    fm.board_passengers("HR26", 3).unwrap();
    fm.load_cargo("UP14", 3000.0).unwrap();
    fm.board_passengers("DL02", 40).unwrap();
    fm.load_cargo("DL02", 120.5).unwrap();
    fm.board_passengers("ULT", 150).unwrap();
    fm.load_cargo("B16", 12_000.0).unwrap();
    let trip = fm.start_all_journeys(100.0);
    assert!(trip.is_clean());
    fm.schedule_maintenance("B16").unwrap();
    fm
}

#[test]
fn test_save_then_load_restores_every_vehicle() {
    let fleet = used_fleet();
    let path = scratch_file("roundtrip");
    fleet.save_to_file(&path).unwrap();

    let mut restored = FleetManager::new();
    restored.load_from_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(restored.vehicles(), fleet.vehicles());
    assert_eq!(restored.generate_report(), fleet.generate_report());
    assert_eq!(restored.distinct_models(), fleet.distinct_models());
    assert!(restored.get_vehicle_by_id("b16").unwrap().needs_maintenance());
    assert_eq!(
        restored.get_vehicle_by_id("UP14").unwrap().model(),
        "Tata, Heavy"
    );
}

#[test]
fn test_failed_load_keeps_current_fleet() {
    let mut fleet = used_fleet();
    let before = fleet.vehicles().to_vec();
    let path = scratch_file("broken");
    fs::write(
        &path,
        "Car,C1,City,120.0,0.0,0.0,5.0,2,false,4,0.0\nHovercraft,H1,Griffon,60.0,0.0,0.0\n",
    )
    .unwrap();

    let err = fleet.load_from_file(&path).unwrap_err();
    fs::remove_file(&path).unwrap();
    assert!(matches!(err, StorageError::UnknownType { line: 2, .. }));
    assert_eq!(fleet.vehicles(), before.as_slice());
}

#[test]
fn test_duplicate_ids_in_file_are_rejected() {
    let mut fleet = FleetManager::new();
    let path = scratch_file("dupes");
    fs::write(
        &path,
        "Car,C1,City,120.0,0.0,0.0,5.0,2,false,4,0.0\nCar,C1,Swift,110.0,0.0,0.0,5.0,0,false,4,0.0\n",
    )
    .unwrap();

    let result = fleet.load_from_file(&path);
    fs::remove_file(&path).unwrap();
    assert!(matches!(result, Err(StorageError::Fleet(_))));
    assert!(fleet.is_empty());
}

#[test]
fn test_missing_file_is_an_io_error() {
    let mut fleet = used_fleet();
    let result = fleet.load_from_file(scratch_file("absent"));
    assert!(matches!(result, Err(StorageError::Io(_))));
    assert_eq!(fleet.len(), 6);
}
