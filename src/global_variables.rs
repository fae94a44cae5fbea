// Maintenance
pub const MAINTENANCE_THRESHOLD: f64 = 10_000.0;

// Fuel efficiency (distance per fuel unit)
pub const CAR_EFFICIENCY: f64 = 15.0;
pub const TRUCK_EFFICIENCY: f64 = 8.0;
pub const TRUCK_LOADED_FACTOR: f64 = 0.9;
pub const BUS_EFFICIENCY: f64 = 10.0;
pub const AIRPLANE_EFFICIENCY: f64 = 5.0;
pub const CARGO_SHIP_EFFICIENCY: f64 = 4.0;

// Capacities
pub const CAR_PASSENGER_CAPACITY: u32 = 5;
pub const CAR_WHEELS: u32 = 4;
pub const TRUCK_CARGO_CAPACITY: f64 = 5_000.0;
pub const BUS_PASSENGER_CAPACITY: u32 = 50;
pub const BUS_CARGO_CAPACITY: f64 = 500.0;
pub const AIRPLANE_PASSENGER_CAPACITY: u32 = 200;
pub const AIRPLANE_CARGO_CAPACITY: f64 = 10_000.0;
pub const CARGO_SHIP_CARGO_CAPACITY: f64 = 50_000.0;

// Altitude is not part of the persisted airplane layout
pub const DEFAULT_AIRPLANE_ALTITUDE: f64 = 35_000.0;

// Journey time overhead per category
pub const LAND_JOURNEY_MULTIPLIER: f64 = 1.1;
pub const AIR_JOURNEY_MULTIPLIER: f64 = 0.95;
pub const WATER_JOURNEY_MULTIPLIER: f64 = 1.15;

// Simulation defaults
pub const DEFAULT_TICK_MS: u64 = 1_000;
pub const DEFAULT_UNSAFE_GAP_MS: u64 = 1;
pub const DEFAULT_INITIAL_FUEL: f64 = 20.0;
pub const DEFAULT_REFUEL_AMOUNT: f64 = 10.0;
pub const EMPTY_TANK_EPSILON: f64 = 0.0001;

pub const DEFAULT_FLEET_FILE: &str = "my_fleet.csv";
