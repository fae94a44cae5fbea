// fleet/spawn.rs
use crate::error::FleetResult;
use crate::fleet::fleet_manager::FleetManager;
use crate::global_variables::DEFAULT_AIRPLANE_ALTITUDE;
use crate::vehicles::vehicle::{Vehicle, VehicleType};
use rand::Rng;

const CAR_MODELS: [&str; 4] = ["Honda City", "Maruti 800", "Honda Amaze", "Hyundai i20"];
const TRUCK_MODELS: [&str; 3] = ["Tata Truck", "Ashok Leyland", "Eicher Pro"];
const BUS_MODELS: [&str; 2] = ["Volvo Bus", "Tata Starbus"];
const AIRPLANE_MODELS: [&str; 2] = ["Boeing 747", "Airbus A320"];
const SHIP_MODELS: [&str; 2] = ["Britannic", "Ever Given"];

/// Builds a random vehicle with id `{prefix}{n}`, advancing `next_id`.
pub fn spawn_vehicle<R: Rng>(rng: &mut R, next_id: &mut u64) -> FleetResult<Vehicle> {
    let rand_val: f64 = rng.random_range(0.0..1.0);
    let vehicle_type = if rand_val < 0.45 {
        VehicleType::Car
    } else if rand_val < 0.70 {
        VehicleType::Truck
    } else if rand_val < 0.88 {
        VehicleType::Bus
    } else if rand_val < 0.96 {
        VehicleType::Airplane
    } else {
        VehicleType::CargoShip
    };

    let id = format!("{}{}", prefix(vehicle_type), *next_id);
    *next_id += 1;

    match vehicle_type {
        VehicleType::Car => {
            let model = pick(rng, &CAR_MODELS);
            Vehicle::car(&id, model, rng.random_range(90.0..180.0))
        }
        VehicleType::Truck => {
            let model = pick(rng, &TRUCK_MODELS);
            let wheels = [6, 10, 14][rng.random_range(0..3)];
            Vehicle::truck(&id, model, rng.random_range(60.0..110.0), wheels)
        }
        VehicleType::Bus => {
            let model = pick(rng, &BUS_MODELS);
            Vehicle::bus(&id, model, rng.random_range(70.0..120.0), 6)
        }
        VehicleType::Airplane => {
            let model = pick(rng, &AIRPLANE_MODELS);
            Vehicle::airplane(&id, model, rng.random_range(750.0..950.0), DEFAULT_AIRPLANE_ALTITUDE)
        }
        VehicleType::CargoShip => {
            let model = pick(rng, &SHIP_MODELS);
            let has_sail = rng.random_bool(0.2);
            Vehicle::cargo_ship(&id, model, rng.random_range(25.0..45.0), has_sail)
        }
    }
}

fn pick<R: Rng>(rng: &mut R, models: &[&'static str]) -> &'static str {
    models[rng.random_range(0..models.len())]
}

fn prefix(vehicle_type: VehicleType) -> &'static str {
    match vehicle_type {
        VehicleType::Car => "CAR-",
        VehicleType::Truck => "TRK-",
        VehicleType::Bus => "BUS-",
        VehicleType::Airplane => "AIR-",
        VehicleType::CargoShip => "SHP-",
    }
}

/// A fleet of `count` random vehicles.
pub fn random_fleet<R: Rng>(rng: &mut R, count: usize) -> FleetResult<FleetManager> {
    let mut fleet = FleetManager::new();
    let mut next_id = 1;
    for _ in 0..count {
        fleet.add_vehicle(spawn_vehicle(rng, &mut next_id)?)?;
    }
    Ok(fleet)
}
