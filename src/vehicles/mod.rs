// vehicles/mod.rs
pub mod capabilities;
pub mod vehicle;
