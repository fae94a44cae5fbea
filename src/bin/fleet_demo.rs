// fleet_demo.rs
use fleet_sim::fleet::fleet_manager::VehicleQuery;
use fleet_sim::global_variables::DEFAULT_FLEET_FILE;
use fleet_sim::{FleetManager, FleetResult, Vehicle};
use log::{error, info};
use std::env;

fn build_demo_fleet() -> FleetResult<FleetManager> {
    let mut fleet = FleetManager::new();
    fleet.add_vehicle(Vehicle::car("HR26", "Honda Amaze", 160.0)?)?;
    fleet.add_vehicle(Vehicle::truck("UP14", "Tata Truck", 100.0, 10)?)?;
    fleet.add_vehicle(Vehicle::bus("DL02", "Volvo Bus", 120.0, 6)?)?;
    fleet.add_vehicle(Vehicle::airplane("ULT", "Boeing 747", 900.0, 35_000.0)?)?;
    fleet.add_vehicle(Vehicle::cargo_ship("B16", "Britannic", 40.0, false)?)?;

    for (id, amount) in [
        ("HR26", 50.0),
        ("UP14", 200.0),
        ("DL02", 150.0),
        ("ULT", 10_000.0),
        ("B16", 20_000.0),
    ] {
        fleet.get_vehicle_by_id_mut(id)?.refuel(amount)?;
    }
    Ok(fleet)
}

fn main() {
    env_logger::init();
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_FLEET_FILE.to_string());

    let mut fleet = match build_demo_fleet() {
        Ok(fleet) => fleet,
        Err(e) => {
            error!("Could not build the demo fleet: {}", e);
            return;
        }
    };

    let outcome = fleet.start_all_journeys(100.0);
    info!(
        "Journey batch: {} moved, {} failed",
        outcome.succeeded,
        outcome.failures.len()
    );
    println!("{}", fleet.generate_report());

    for query in ["land", "PassengerCarrier", "Airplane"] {
        match query.parse::<VehicleQuery>() {
            Ok(q) => {
                let ids: Vec<&str> = fleet
                    .search_by_type(q)
                    .into_iter()
                    .map(|v| v.id())
                    .collect();
                println!("{}: {:?}", q, ids);
            }
            Err(e) => error!("{}", e),
        }
    }
    if let Some(v) = fleet.get_fastest_vehicle() {
        println!("Fastest: {}", v.display_info());
    }

    if let Err(e) = fleet.save_to_file(&path) {
        error!("Save failed: {}", e);
        return;
    }
    let mut reloaded = FleetManager::new();
    match reloaded.load_from_file(&path) {
        Ok(()) => println!("Reloaded {} vehicles from {}", reloaded.len(), path),
        Err(e) => error!("Load failed: {}", e),
    }
}
