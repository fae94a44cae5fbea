// fleet/mod.rs
pub mod fleet_manager;
pub mod report;
pub mod spawn;
pub mod storage;
