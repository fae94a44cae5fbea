// simulation_main.rs
use fleet_sim::simulation_engine::config::SimulationConfig;
use fleet_sim::{FleetManager, FleetResult, SimulationEngine, Vehicle};
use log::{error, info};
use std::env;
use std::time::Duration;

fn build_demo_fleet() -> FleetResult<FleetManager> {
    let mut fleet = FleetManager::new();
    fleet.add_vehicle(Vehicle::car("HR26", "Honda City", 120.0)?)?;
    fleet.add_vehicle(Vehicle::truck("HR20", "Tata Safari", 80.0, 10)?)?;
    fleet.add_vehicle(Vehicle::bus("HR16", "Volvo XC90", 100.0, 6)?)?;
    fleet.add_vehicle(Vehicle::car("HR56", "Maruti 800", 140.0)?)?;
    Ok(fleet)
}

async fn run_phase(engine: &mut SimulationEngine, ticks: u32) -> FleetResult<()> {
    engine.start()?;
    let poll = engine.config().tick();
    for _ in 0..ticks {
        tokio::time::sleep(poll).await;
        println!("Highway distance: {} km", engine.total_distance());
        for s in engine.statuses() {
            println!("  {}  {}", s.id, s.status);
        }
    }
    engine.stop().await;
    Ok(())
}

fn total_mileage(engine: &SimulationEngine) -> f64 {
    engine
        .vehicles_snapshot()
        .iter()
        .map(|v| v.current_mileage())
        .sum()
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => match SimulationConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                return;
            }
        },
        None => SimulationConfig {
            tick_ms: 200,
            ..SimulationConfig::default()
        },
    };

    let fleet = match build_demo_fleet() {
        Ok(fleet) => fleet,
        Err(e) => {
            error!("Could not build the demo fleet: {}", e);
            return;
        }
    };

    let mut engine = SimulationEngine::from_fleet(&fleet, config);
    let ticks = 10;

    for safe in [false, true] {
        engine.set_safe_mode(safe);
        info!("Running {} ticks with safe mode {}", ticks, safe);
        if let Err(e) = run_phase(&mut engine, ticks).await {
            error!("{}", e);
            return;
        }
        let counted = engine.total_distance();
        let driven = total_mileage(&engine);
        println!(
            "Safe mode {}: counter {} km, vehicles drove {:.1} km, lost {:.1} km",
            safe,
            counted,
            driven,
            driven - counted as f64
        );
        engine.restart().await;
    }

    // Pause one vehicle, let the others run, then refuel it back into motion.
    if let Err(e) = engine.start() {
        error!("{}", e);
        return;
    }
    let _ = engine.pause("HR20");
    tokio::time::sleep(Duration::from_millis(engine.config().tick_ms * 3)).await;
    if let Err(e) = engine.refuel_default("HR20") {
        error!("{}", e);
    }
    tokio::time::sleep(Duration::from_millis(engine.config().tick_ms * 3)).await;
    engine.stop().await;
    for s in engine.statuses() {
        println!("  {}  {}", s.id, s.status);
    }
}
