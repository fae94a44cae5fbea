// simulation_engine/mod.rs
pub mod config;
pub mod highway;
pub mod simulation;
pub mod vehicle_task;
