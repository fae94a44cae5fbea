pub mod error;
pub mod fleet;
pub mod global_variables;
pub mod simulation_engine;
pub mod vehicles;

pub use error::{FleetError, FleetResult, StorageError};
pub use fleet::fleet_manager::FleetManager;
pub use simulation_engine::simulation::SimulationEngine;
pub use vehicles::vehicle::{Vehicle, VehicleType};
