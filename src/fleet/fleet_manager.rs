// fleet/fleet_manager.rs
use crate::error::{FleetError, FleetResult, StorageError};
use crate::fleet::report::FleetReport;
use crate::fleet::storage;
use crate::vehicles::capabilities::Capability;
use crate::vehicles::vehicle::{Category, Vehicle, VehicleType};
use log::{info, warn};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// What `search_by_type` matches against: a concrete type, a category or a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleQuery {
    Any,
    Type(VehicleType),
    Category(Category),
    Capability(Capability),
}

impl VehicleQuery {
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        match self {
            VehicleQuery::Any => true,
            VehicleQuery::Type(t) => vehicle.vehicle_type() == *t,
            VehicleQuery::Category(c) => vehicle.category() == *c,
            VehicleQuery::Capability(c) => vehicle.has_capability(*c),
        }
    }
}

impl FromStr for VehicleQuery {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        match needle.to_ascii_lowercase().as_str() {
            "vehicle" | "all" => return Ok(VehicleQuery::Any),
            "land" => return Ok(VehicleQuery::Category(Category::Land)),
            "air" => return Ok(VehicleQuery::Category(Category::Air)),
            "water" => return Ok(VehicleQuery::Category(Category::Water)),
            _ => {}
        }
        if let Ok(t) = needle.parse::<VehicleType>() {
            return Ok(VehicleQuery::Type(t));
        }
        needle
            .parse::<Capability>()
            .map(VehicleQuery::Capability)
            .map_err(|_| FleetError::invalid(format!("Unrecognized type '{}'", needle)))
    }
}

impl fmt::Display for VehicleQuery {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VehicleQuery::Any => write!(f, "Vehicle"),
            VehicleQuery::Type(t) => write!(f, "{}", t),
            VehicleQuery::Category(c) => write!(f, "{:?}", c),
            VehicleQuery::Capability(c) => write!(f, "{}", c),
        }
    }
}

/// Result of a fleet-wide operation where each vehicle may fail on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub succeeded: usize,
    pub failures: Vec<(String, FleetError)>,
}

impl BatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

fn by_efficiency_desc(a: &Vehicle, b: &Vehicle) -> Ordering {
    b.calculate_fuel_efficiency()
        .total_cmp(&a.calculate_fuel_efficiency())
}

fn by_speed_desc(a: &Vehicle, b: &Vehicle) -> Ordering {
    b.max_speed().total_cmp(&a.max_speed())
}

/// Owns the fleet in insertion order together with its id and model indexes.
#[derive(Debug, Clone, Default)]
pub struct FleetManager {
    fleet: Vec<Vehicle>,
    distinct_models: BTreeSet<String>,
    vehicle_ids: HashSet<String>,
}

impl FleetManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.fleet
    }

    pub fn len(&self) -> usize {
        self.fleet.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fleet.is_empty()
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> FleetResult<()> {
        if self.vehicle_ids.contains(vehicle.id()) {
            return Err(FleetError::invalid(format!(
                "Vehicle with ID {} already exists.",
                vehicle.id()
            )));
        }
        info!("Vehicle {} added to the fleet.", vehicle.id());
        self.vehicle_ids.insert(vehicle.id().to_string());
        self.distinct_models.insert(vehicle.model().to_string());
        self.fleet.push(vehicle);
        Ok(())
    }

    pub fn remove_vehicle(&mut self, id: &str) -> FleetResult<Vehicle> {
        let position = self
            .fleet
            .iter()
            .position(|v| v.id() == id)
            .ok_or_else(|| FleetError::not_found(id))?;
        let removed = self.fleet.remove(position);
        self.vehicle_ids.remove(id);
        self.rebuild_distinct_models();
        info!("Vehicle {} removed from the fleet.", id);
        Ok(removed)
    }

    fn rebuild_distinct_models(&mut self) {
        self.distinct_models = self.fleet.iter().map(|v| v.model().to_string()).collect();
    }

    /// Replaces the whole fleet, rebuilding both indexes.
    pub(crate) fn replace_all(&mut self, vehicles: Vec<Vehicle>) -> FleetResult<()> {
        let mut ids = HashSet::with_capacity(vehicles.len());
        for v in &vehicles {
            if !ids.insert(v.id().to_string()) {
                return Err(FleetError::invalid(format!(
                    "Vehicle with ID {} already exists.",
                    v.id()
                )));
            }
        }
        self.fleet = vehicles;
        self.vehicle_ids = ids;
        self.rebuild_distinct_models();
        Ok(())
    }

    /// Moves every vehicle `distance`. A failing vehicle is reported and skipped.
    pub fn start_all_journeys(&mut self, distance: f64) -> BatchOutcome {
        info!("Starting all journeys for {} km", distance);
        let mut outcome = BatchOutcome::default();
        for v in self.fleet.iter_mut() {
            match v.move_by(distance) {
                Ok(()) => outcome.succeeded += 1,
                Err(e) => {
                    warn!("Could not start journey for vehicle {}: {}", v.id(), e);
                    outcome.failures.push((v.id().to_string(), e));
                }
            }
        }
        outcome
    }

    /// Refuels every fuel-consuming vehicle. A failing vehicle is reported and skipped.
    pub fn refuel_all(&mut self, amount: f64) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for v in self
            .fleet
            .iter_mut()
            .filter(|v| v.has_capability(Capability::FuelConsumable))
        {
            match v.refuel(amount) {
                Ok(()) => outcome.succeeded += 1,
                Err(e) => {
                    warn!("Could not refuel {}: {}", v.id(), e);
                    outcome.failures.push((v.id().to_string(), e));
                }
            }
        }
        outcome
    }

    /// Fuel the fleet would need for `distance`. Does not burn anything.
    pub fn get_total_fuel_consumption(&self, distance: f64) -> f64 {
        self.fleet
            .iter()
            .filter(|v| v.has_capability(Capability::FuelConsumable))
            .map(|v| v.calculate_fuel_efficiency())
            .filter(|eff| *eff > 0.0)
            .map(|eff| distance / eff)
            .sum()
    }

    /// Services every vehicle that needs it and returns how many were serviced.
    pub fn maintain_all(&mut self) -> usize {
        let mut serviced = 0;
        for v in self.fleet.iter_mut() {
            if v.maintainable().is_some() && v.needs_maintenance() {
                v.perform_maintenance();
                info!(
                    "Maintenance performed on {} at {:.1} km.",
                    v.id(),
                    v.current_mileage()
                );
                serviced += 1;
            }
        }
        serviced
    }

    pub fn get_vehicles_needing_maintenance(&self) -> Vec<&Vehicle> {
        self.fleet
            .iter()
            .filter(|v| v.maintainable().is_some() && v.needs_maintenance())
            .collect()
    }

    pub fn search_by_type(&self, query: VehicleQuery) -> Vec<&Vehicle> {
        self.fleet.iter().filter(|v| query.matches(v)).collect()
    }

    pub fn sort_fleet_by_efficiency(&mut self) {
        self.fleet.sort_by(by_efficiency_desc);
    }

    pub fn sort_fleet_by_model(&mut self) {
        self.fleet.sort_by_cached_key(|v| v.model().to_lowercase());
    }

    pub fn sort_fleet_by_speed(&mut self) {
        self.fleet.sort_by(by_speed_desc);
    }

    /// The front of the descending-speed ordering.
    pub fn get_fastest_vehicle(&self) -> Option<&Vehicle> {
        self.fleet.iter().min_by(|a, b| by_speed_desc(a, b))
    }

    /// The back of the descending-speed ordering.
    pub fn get_slowest_vehicle(&self) -> Option<&Vehicle> {
        self.fleet.iter().max_by(|a, b| by_speed_desc(a, b))
    }

    pub fn distinct_models(&self) -> &BTreeSet<String> {
        &self.distinct_models
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.vehicle_ids.contains(id)
    }

    /// Case-insensitive lookup; the first match in fleet order wins.
    pub fn get_vehicle_by_id(&self, id: &str) -> FleetResult<&Vehicle> {
        self.fleet
            .iter()
            .find(|v| v.id().eq_ignore_ascii_case(id))
            .ok_or_else(|| FleetError::not_found(id))
    }

    pub fn get_vehicle_by_id_mut(&mut self, id: &str) -> FleetResult<&mut Vehicle> {
        self.fleet
            .iter_mut()
            .find(|v| v.id().eq_ignore_ascii_case(id))
            .ok_or_else(|| FleetError::not_found(id))
    }

    pub fn schedule_maintenance(&mut self, id: &str) -> FleetResult<()> {
        let v = self.get_vehicle_by_id_mut(id)?;
        if v.maintainable().is_none() {
            return Err(FleetError::invalid(format!(
                "Vehicle {} is not maintainable.",
                v.id()
            )));
        }
        v.schedule_maintenance();
        info!("Maintenance scheduled for {}.", v.id());
        Ok(())
    }

    pub fn board_passengers(&mut self, id: &str, count: u32) -> FleetResult<()> {
        self.get_vehicle_by_id_mut(id)?.board_passengers(count)
    }

    pub fn disembark_passengers(&mut self, id: &str, count: u32) -> FleetResult<()> {
        self.get_vehicle_by_id_mut(id)?.disembark_passengers(count)
    }

    pub fn load_cargo(&mut self, id: &str, weight: f64) -> FleetResult<()> {
        self.get_vehicle_by_id_mut(id)?.load_cargo(weight)
    }

    pub fn unload_cargo(&mut self, id: &str, weight: f64) -> FleetResult<()> {
        self.get_vehicle_by_id_mut(id)?.unload_cargo(weight)
    }

    pub fn report(&self) -> FleetReport {
        FleetReport::from_vehicles(&self.fleet)
    }

    pub fn generate_report(&self) -> String {
        self.report().render()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), StorageError> {
        storage::save_fleet(&self.fleet, path.as_ref())?;
        info!("Fleet saved successfully to {}", path.as_ref().display());
        Ok(())
    }

    /// Replaces the current fleet with the file's contents. On error the fleet is untouched.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), StorageError> {
        let vehicles = storage::load_fleet(path.as_ref())?;
        self.replace_all(vehicles)?;
        info!(
            "Fleet loaded successfully from {} ({} vehicles)",
            path.as_ref().display(),
            self.fleet.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_fleet() -> FleetManager {
        let mut fm = FleetManager::new();
        fm.add_vehicle(Vehicle::car("HR26", "Honda Amaze", 160.0).unwrap())
            .unwrap();
        fm.add_vehicle(Vehicle::truck("UP14", "Tata Truck", 100.0, 10).unwrap())
            .unwrap();
        fm.add_vehicle(Vehicle::bus("DL02", "Volvo Bus", 120.0, 6).unwrap())
            .unwrap();
        fm.add_vehicle(Vehicle::airplane("ULT", "Air India Boeing 747", 900.0, 26_000.0).unwrap())
            .unwrap();
        fm.add_vehicle(Vehicle::cargo_ship("B16", "Britannic", 40.0, false).unwrap())
            .unwrap();
        fm
    }

    #[test]
    fn test_duplicate_id_is_rejected_and_fleet_unchanged() {
        let mut fm = demo_fleet();
        let dup = Vehicle::bus("HR26", "Other Model", 90.0, 6).unwrap();
        let err = fm.add_vehicle(dup).unwrap_err();
        assert!(matches!(err, FleetError::InvalidOperation(_)));
        assert_eq!(fm.len(), 5);
        assert!(!fm.distinct_models().contains("Other Model"));
    }

    #[test]
    fn test_ids_are_case_sensitive_for_uniqueness() {
        let mut fm = demo_fleet();
        fm.add_vehicle(Vehicle::car("hr26", "Mini", 120.0).unwrap())
            .unwrap();
        assert_eq!(fm.len(), 6);
        // Lookup is case-insensitive and returns the earlier entry.
        assert_eq!(fm.get_vehicle_by_id("hr26").unwrap().model(), "Honda Amaze");
    }

    #[test]
    fn test_remove_rebuilds_distinct_models() {
        let mut fm = demo_fleet();
        fm.add_vehicle(Vehicle::car("C2", "Honda Amaze", 150.0).unwrap())
            .unwrap();
        fm.remove_vehicle("HR26").unwrap();
        assert!(fm.distinct_models().contains("Honda Amaze"));
        fm.remove_vehicle("C2").unwrap();
        assert!(!fm.distinct_models().contains("Honda Amaze"));
        assert!(!fm.contains_id("C2"));
        assert!(matches!(
            fm.remove_vehicle("C2"),
            Err(FleetError::NotFound(_))
        ));
    }

    #[test]
    fn test_start_all_journeys_isolates_failures() {
        let mut fm = demo_fleet();
        fm.get_vehicle_by_id_mut("HR26").unwrap().refuel(50.0).unwrap();
        fm.get_vehicle_by_id_mut("ULT").unwrap().refuel(10_000.0).unwrap();

        let outcome = fm.start_all_journeys(100.0);
        assert_eq!(outcome.succeeded, 2);
        let failed: Vec<&str> = outcome.failures.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(failed, vec!["UP14", "DL02", "B16"]);
        assert_eq!(fm.get_vehicle_by_id("ULT").unwrap().current_mileage(), 100.0);
        assert_eq!(fm.get_vehicle_by_id("UP14").unwrap().current_mileage(), 0.0);
    }

    #[test]
    fn test_refuel_all_reports_bad_amount_per_vehicle() {
        let mut fm = demo_fleet();
        fm.add_vehicle(Vehicle::cargo_ship("S9", "Clipper", 25.0, true).unwrap())
            .unwrap();
        let outcome = fm.refuel_all(-1.0);
        assert_eq!(outcome.succeeded, 0);
        assert_eq!(outcome.failures.len(), 5);

        let outcome = fm.refuel_all(10.0);
        assert!(outcome.is_clean());
        assert_eq!(outcome.succeeded, 5);
    }

    #[test]
    fn test_total_fuel_consumption_is_read_only() {
        let mut fm = demo_fleet();
        fm.add_vehicle(Vehicle::cargo_ship("S9", "Clipper", 25.0, true).unwrap())
            .unwrap();
        let total = fm.get_total_fuel_consumption(120.0);
        let expected = 120.0 / 15.0 + 120.0 / 8.0 + 120.0 / 10.0 + 120.0 / 5.0 + 120.0 / 4.0;
        assert!((total - expected).abs() < 1e-9);
        assert!(fm.vehicles().iter().all(|v| v.fuel_level().unwrap_or(0.0) == 0.0));
    }

    #[test]
    fn test_maintain_all_services_only_needy_vehicles() {
        let mut fm = demo_fleet();
        fm.schedule_maintenance("b16").unwrap();
        assert_eq!(fm.get_vehicles_needing_maintenance().len(), 1);
        assert_eq!(fm.maintain_all(), 1);
        assert!(fm.get_vehicles_needing_maintenance().is_empty());
        assert_eq!(fm.maintain_all(), 0);
    }

    #[test]
    fn test_search_by_type_preserves_order() {
        let fm = demo_fleet();
        let passengers = fm.search_by_type("PassengerCarrier".parse().unwrap());
        let ids: Vec<&str> = passengers.iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec!["HR26", "DL02", "ULT"]);

        let land = fm.search_by_type(VehicleQuery::Category(Category::Land));
        assert_eq!(land.len(), 3);
        assert_eq!(fm.search_by_type(VehicleQuery::Any).len(), 5);
        assert_eq!(
            fm.search_by_type(VehicleQuery::Type(VehicleType::Truck))[0].id(),
            "UP14"
        );
        assert!("Bicycle".parse::<VehicleQuery>().is_err());
    }

    #[test]
    fn test_sorts() {
        let mut fm = demo_fleet();
        fm.sort_fleet_by_efficiency();
        let ids: Vec<&str> = fm.vehicles().iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec!["HR26", "DL02", "UP14", "ULT", "B16"]);

        fm.add_vehicle(Vehicle::car("C3", "audi", 200.0).unwrap())
            .unwrap();
        fm.sort_fleet_by_model();
        let models: Vec<&str> = fm.vehicles().iter().map(|v| v.model()).collect();
        assert_eq!(
            models,
            vec!["Air India Boeing 747", "audi", "Britannic", "Honda Amaze", "Tata Truck", "Volvo Bus"]
        );

        fm.sort_fleet_by_speed();
        let speeds: Vec<f64> = fm.vehicles().iter().map(|v| v.max_speed()).collect();
        assert_eq!(speeds, vec![900.0, 200.0, 160.0, 120.0, 100.0, 40.0]);
    }

    #[test]
    fn test_fastest_and_slowest() {
        let fm = demo_fleet();
        assert_eq!(fm.get_fastest_vehicle().unwrap().id(), "ULT");
        assert_eq!(fm.get_slowest_vehicle().unwrap().id(), "B16");
        let empty = FleetManager::new();
        assert!(empty.get_fastest_vehicle().is_none());
        assert!(empty.get_slowest_vehicle().is_none());
    }

    #[test]
    fn test_by_id_operations() {
        let mut fm = demo_fleet();
        fm.board_passengers("dl02", 40).unwrap();
        assert!(matches!(
            fm.board_passengers("DL02", 11),
            Err(FleetError::Overload(_))
        ));
        fm.disembark_passengers("DL02", 10).unwrap();
        fm.load_cargo("UP14", 3000.0).unwrap();
        fm.unload_cargo("UP14", 500.0).unwrap();
        assert!(matches!(
            fm.load_cargo("HR26", 1.0),
            Err(FleetError::InvalidOperation(_))
        ));
        assert!(matches!(
            fm.board_passengers("NOPE", 1),
            Err(FleetError::NotFound(_))
        ));
        let bus = fm.get_vehicle_by_id("DL02").unwrap();
        assert_eq!(bus.passenger_carrier().unwrap().current_passengers(), 30);
    }
}
