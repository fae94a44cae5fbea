// vehicles/vehicle.rs
use crate::error::{FleetError, FleetResult};
use crate::global_variables::*;
use crate::vehicles::capabilities::{
    CargoCarrier, CargoHold, Capability, FuelConsumable, FuelTank, Maintainable,
    PassengerCabin, PassengerCarrier, ServiceLog,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

/// The concrete vehicle variants. The display name doubles as the persisted type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VehicleType {
    Car,
    Truck,
    Bus,
    Airplane,
    CargoShip,
}

impl VehicleType {
    pub const ALL: [VehicleType; 5] = [
        VehicleType::Car,
        VehicleType::Truck,
        VehicleType::Bus,
        VehicleType::Airplane,
        VehicleType::CargoShip,
    ];

    pub fn category(&self) -> Category {
        match self {
            VehicleType::Car | VehicleType::Truck | VehicleType::Bus => Category::Land,
            VehicleType::Airplane => Category::Air,
            VehicleType::CargoShip => Category::Water,
        }
    }

    /// Plural label used by the fleet report.
    pub fn plural(&self) -> &'static str {
        match self {
            VehicleType::Car => "Cars",
            VehicleType::Truck => "Trucks",
            VehicleType::Bus => "Buses",
            VehicleType::Airplane => "Airplanes",
            VehicleType::CargoShip => "Cargo Ships",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            VehicleType::Car => "Car",
            VehicleType::Truck => "Truck",
            VehicleType::Bus => "Bus",
            VehicleType::Airplane => "Airplane",
            VehicleType::CargoShip => "CargoShip",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for VehicleType {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleType::ALL
            .into_iter()
            .find(|t| t.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FleetError::invalid(format!("unknown vehicle type '{}'", s.trim())))
    }
}

/// Land, air or water. Drives the journey time overhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Land,
    Air,
    Water,
}

impl Category {
    pub fn journey_multiplier(&self) -> f64 {
        match self {
            Category::Land => LAND_JOURNEY_MULTIPLIER,
            Category::Air => AIR_JOURNEY_MULTIPLIER,
            Category::Water => WATER_JOURNEY_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub(crate) tank: FuelTank,
    pub(crate) cabin: PassengerCabin,
    pub(crate) service: ServiceLog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Truck {
    pub(crate) num_wheels: u32,
    pub(crate) tank: FuelTank,
    pub(crate) hold: CargoHold,
    pub(crate) service: ServiceLog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub(crate) num_wheels: u32,
    pub(crate) tank: FuelTank,
    pub(crate) cabin: PassengerCabin,
    pub(crate) hold: CargoHold,
    pub(crate) service: ServiceLog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airplane {
    pub(crate) max_altitude: f64,
    pub(crate) tank: FuelTank,
    pub(crate) cabin: PassengerCabin,
    pub(crate) hold: CargoHold,
    pub(crate) service: ServiceLog,
}

/// A ship under sail keeps its tank on the books but does not burn fuel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoShip {
    pub(crate) has_sail: bool,
    pub(crate) tank: FuelTank,
    pub(crate) hold: CargoHold,
    pub(crate) service: ServiceLog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VehicleKind {
    Car(Car),
    Truck(Truck),
    Bus(Bus),
    Airplane(Airplane),
    CargoShip(CargoShip),
}

/// A fleet vehicle: shared identity and odometer plus the variant-specific parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    id: String,
    model: String,
    max_speed: f64,
    current_mileage: f64,
    pub(crate) kind: VehicleKind,
}

impl Vehicle {
    fn build(id: &str, model: &str, max_speed: f64, kind: VehicleKind) -> FleetResult<Self> {
        if id.trim().is_empty() {
            return Err(FleetError::invalid("Vehicle ID cannot be empty."));
        }
        if !(max_speed > 0.0) || !max_speed.is_finite() {
            return Err(FleetError::invalid(format!(
                "Max speed must be positive, got {}.",
                max_speed
            )));
        }
        Ok(Self {
            id: id.to_string(),
            model: model.to_string(),
            max_speed,
            current_mileage: 0.0,
            kind,
        })
    }

    pub fn car(id: &str, model: &str, max_speed: f64) -> FleetResult<Self> {
        let kind = VehicleKind::Car(Car {
            tank: FuelTank::new(),
            cabin: PassengerCabin::new(CAR_PASSENGER_CAPACITY),
            service: ServiceLog::new(),
        });
        Self::build(id, model, max_speed, kind)
    }

    pub fn truck(id: &str, model: &str, max_speed: f64, num_wheels: u32) -> FleetResult<Self> {
        let kind = VehicleKind::Truck(Truck {
            num_wheels,
            tank: FuelTank::new(),
            hold: CargoHold::new(TRUCK_CARGO_CAPACITY),
            service: ServiceLog::new(),
        });
        Self::build(id, model, max_speed, kind)
    }

    pub fn bus(id: &str, model: &str, max_speed: f64, num_wheels: u32) -> FleetResult<Self> {
        let kind = VehicleKind::Bus(Bus {
            num_wheels,
            tank: FuelTank::new(),
            cabin: PassengerCabin::new(BUS_PASSENGER_CAPACITY),
            hold: CargoHold::new(BUS_CARGO_CAPACITY),
            service: ServiceLog::new(),
        });
        Self::build(id, model, max_speed, kind)
    }

    pub fn airplane(id: &str, model: &str, max_speed: f64, max_altitude: f64) -> FleetResult<Self> {
        let kind = VehicleKind::Airplane(Airplane {
            max_altitude,
            tank: FuelTank::new(),
            cabin: PassengerCabin::new(AIRPLANE_PASSENGER_CAPACITY),
            hold: CargoHold::new(AIRPLANE_CARGO_CAPACITY),
            service: ServiceLog::new(),
        });
        Self::build(id, model, max_speed, kind)
    }

    pub fn cargo_ship(id: &str, model: &str, max_speed: f64, has_sail: bool) -> FleetResult<Self> {
        let kind = VehicleKind::CargoShip(CargoShip {
            has_sail,
            tank: FuelTank::new(),
            hold: CargoHold::new(CARGO_SHIP_CARGO_CAPACITY),
            service: ServiceLog::new(),
        });
        Self::build(id, model, max_speed, kind)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn current_mileage(&self) -> f64 {
        self.current_mileage
    }

    /// Reinstates persisted odometer, fuel and service state.
    pub(crate) fn restore(&mut self, current_mileage: f64, tank: FuelTank, service: ServiceLog) {
        self.current_mileage = current_mileage;
        match &mut self.kind {
            VehicleKind::Car(c) => {
                c.tank = tank;
                c.service = service;
            }
            VehicleKind::Truck(t) => {
                t.tank = tank;
                t.service = service;
            }
            VehicleKind::Bus(b) => {
                b.tank = tank;
                b.service = service;
            }
            VehicleKind::Airplane(a) => {
                a.tank = tank;
                a.service = service;
            }
            VehicleKind::CargoShip(s) => {
                s.tank = tank;
                s.service = service;
            }
        }
    }

    pub fn kind(&self) -> &VehicleKind {
        &self.kind
    }

    pub fn vehicle_type(&self) -> VehicleType {
        match self.kind {
            VehicleKind::Car(_) => VehicleType::Car,
            VehicleKind::Truck(_) => VehicleType::Truck,
            VehicleKind::Bus(_) => VehicleType::Bus,
            VehicleKind::Airplane(_) => VehicleType::Airplane,
            VehicleKind::CargoShip(_) => VehicleType::CargoShip,
        }
    }

    pub fn category(&self) -> Category {
        self.vehicle_type().category()
    }

    /// Wheel count for land vehicles.
    pub fn num_wheels(&self) -> Option<u32> {
        match &self.kind {
            VehicleKind::Car(_) => Some(CAR_WHEELS),
            VehicleKind::Truck(t) => Some(t.num_wheels),
            VehicleKind::Bus(b) => Some(b.num_wheels),
            _ => None,
        }
    }

    pub fn max_altitude(&self) -> Option<f64> {
        match &self.kind {
            VehicleKind::Airplane(a) => Some(a.max_altitude),
            _ => None,
        }
    }

    pub fn has_sail(&self) -> Option<bool> {
        match &self.kind {
            VehicleKind::CargoShip(s) => Some(s.has_sail),
            _ => None,
        }
    }

    // ---- capability lookup ----

    pub fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::FuelConsumable => self.fuel_consumable().is_some(),
            Capability::PassengerCarrier => self.passenger_carrier().is_some(),
            Capability::CargoCarrier => self.cargo_carrier().is_some(),
            Capability::Maintainable => self.maintainable().is_some(),
        }
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        [
            Capability::FuelConsumable,
            Capability::PassengerCarrier,
            Capability::CargoCarrier,
            Capability::Maintainable,
        ]
        .into_iter()
        .filter(|c| self.has_capability(*c))
        .collect()
    }

    pub fn fuel_consumable(&self) -> Option<&dyn FuelConsumable> {
        match &self.kind {
            VehicleKind::Car(c) => Some(&c.tank),
            VehicleKind::Truck(t) => Some(&t.tank),
            VehicleKind::Bus(b) => Some(&b.tank),
            VehicleKind::Airplane(a) => Some(&a.tank),
            VehicleKind::CargoShip(s) if !s.has_sail => Some(&s.tank),
            VehicleKind::CargoShip(_) => None,
        }
    }

    fn fuel_consumable_mut(&mut self) -> Option<&mut dyn FuelConsumable> {
        match &mut self.kind {
            VehicleKind::Car(c) => Some(&mut c.tank),
            VehicleKind::Truck(t) => Some(&mut t.tank),
            VehicleKind::Bus(b) => Some(&mut b.tank),
            VehicleKind::Airplane(a) => Some(&mut a.tank),
            VehicleKind::CargoShip(s) if !s.has_sail => Some(&mut s.tank),
            VehicleKind::CargoShip(_) => None,
        }
    }

    pub fn passenger_carrier(&self) -> Option<&dyn PassengerCarrier> {
        match &self.kind {
            VehicleKind::Car(c) => Some(&c.cabin),
            VehicleKind::Bus(b) => Some(&b.cabin),
            VehicleKind::Airplane(a) => Some(&a.cabin),
            _ => None,
        }
    }

    fn passenger_carrier_mut(&mut self) -> Option<&mut dyn PassengerCarrier> {
        match &mut self.kind {
            VehicleKind::Car(c) => Some(&mut c.cabin),
            VehicleKind::Bus(b) => Some(&mut b.cabin),
            VehicleKind::Airplane(a) => Some(&mut a.cabin),
            _ => None,
        }
    }

    pub fn cargo_carrier(&self) -> Option<&dyn CargoCarrier> {
        match &self.kind {
            VehicleKind::Truck(t) => Some(&t.hold),
            VehicleKind::Bus(b) => Some(&b.hold),
            VehicleKind::Airplane(a) => Some(&a.hold),
            VehicleKind::CargoShip(s) => Some(&s.hold),
            VehicleKind::Car(_) => None,
        }
    }

    fn cargo_carrier_mut(&mut self) -> Option<&mut dyn CargoCarrier> {
        match &mut self.kind {
            VehicleKind::Truck(t) => Some(&mut t.hold),
            VehicleKind::Bus(b) => Some(&mut b.hold),
            VehicleKind::Airplane(a) => Some(&mut a.hold),
            VehicleKind::CargoShip(s) => Some(&mut s.hold),
            VehicleKind::Car(_) => None,
        }
    }

    pub fn maintainable(&self) -> Option<&dyn Maintainable> {
        Some(self.service_log())
    }

    pub(crate) fn service_log(&self) -> &ServiceLog {
        match &self.kind {
            VehicleKind::Car(c) => &c.service,
            VehicleKind::Truck(t) => &t.service,
            VehicleKind::Bus(b) => &b.service,
            VehicleKind::Airplane(a) => &a.service,
            VehicleKind::CargoShip(s) => &s.service,
        }
    }

    fn service_log_mut(&mut self) -> &mut ServiceLog {
        match &mut self.kind {
            VehicleKind::Car(c) => &mut c.service,
            VehicleKind::Truck(t) => &mut t.service,
            VehicleKind::Bus(b) => &mut b.service,
            VehicleKind::Airplane(a) => &mut a.service,
            VehicleKind::CargoShip(s) => &mut s.service,
        }
    }

    /// The tank as persisted, including the idle tank of a sailing ship.
    pub(crate) fn tank(&self) -> &FuelTank {
        match &self.kind {
            VehicleKind::Car(c) => &c.tank,
            VehicleKind::Truck(t) => &t.tank,
            VehicleKind::Bus(b) => &b.tank,
            VehicleKind::Airplane(a) => &a.tank,
            VehicleKind::CargoShip(s) => &s.tank,
        }
    }

    // ---- movement and fuel ----

    /// Distance per fuel unit. Only a truck's value depends on state.
    pub fn calculate_fuel_efficiency(&self) -> f64 {
        match &self.kind {
            VehicleKind::Car(_) => CAR_EFFICIENCY,
            VehicleKind::Truck(t) => {
                if t.hold.current_cargo() > t.hold.cargo_capacity() * 0.5 {
                    TRUCK_EFFICIENCY * TRUCK_LOADED_FACTOR
                } else {
                    TRUCK_EFFICIENCY
                }
            }
            VehicleKind::Bus(_) => BUS_EFFICIENCY,
            VehicleKind::Airplane(_) => AIRPLANE_EFFICIENCY,
            VehicleKind::CargoShip(s) => {
                if s.has_sail {
                    0.0
                } else {
                    CARGO_SHIP_EFFICIENCY
                }
            }
        }
    }

    /// Fuel needed to cover `distance`, or `None` for vehicles that do not burn fuel.
    pub fn fuel_needed(&self, distance: f64) -> Option<f64> {
        self.fuel_consumable()
            .map(|_| distance / self.calculate_fuel_efficiency())
    }

    pub fn estimate_journey_time(&self, distance: f64) -> f64 {
        (distance / self.max_speed) * self.category().journey_multiplier()
    }

    /// Moves the vehicle `distance` units, burning the fuel it needs.
    /// On failure neither fuel nor mileage change.
    pub fn move_by(&mut self, distance: f64) -> FleetResult<()> {
        if distance < 0.0 || distance.is_nan() {
            return Err(FleetError::invalid("Distance cannot be negative."));
        }
        if let Some(needed) = self.fuel_needed(distance) {
            let available = self.fuel_level().unwrap_or(0.0);
            if needed > available {
                return Err(FleetError::InsufficientFuel { needed, available });
            }
            self.consume_fuel(distance)?;
        }
        self.current_mileage += distance;
        debug!("{} {} moved {} km", self.vehicle_type(), self.id, distance);
        Ok(())
    }

    fn consume_fuel(&mut self, distance: f64) -> FleetResult<f64> {
        let efficiency = self.calculate_fuel_efficiency();
        match self.fuel_consumable_mut() {
            Some(tank) => tank.consume_fuel(distance, efficiency),
            None => Ok(0.0),
        }
    }

    pub fn refuel(&mut self, amount: f64) -> FleetResult<()> {
        let odometer = self.current_mileage;
        let id = self.id.clone();
        self.fuel_consumable_mut()
            .ok_or_else(|| FleetError::invalid(format!("Vehicle {} does not consume fuel.", id)))?
            .refuel(amount, odometer)
    }

    pub fn fuel_level(&self) -> Option<f64> {
        self.fuel_consumable().map(|t| t.fuel_level())
    }

    // ---- passengers and cargo ----

    pub fn board_passengers(&mut self, count: u32) -> FleetResult<()> {
        let id = self.id.clone();
        self.passenger_carrier_mut()
            .ok_or_else(|| FleetError::invalid(format!("Vehicle {} cannot carry passengers.", id)))?
            .board_passengers(count)
    }

    pub fn disembark_passengers(&mut self, count: u32) -> FleetResult<()> {
        let id = self.id.clone();
        self.passenger_carrier_mut()
            .ok_or_else(|| FleetError::invalid(format!("Vehicle {} cannot carry passengers.", id)))?
            .disembark_passengers(count)
    }

    pub fn load_cargo(&mut self, weight: f64) -> FleetResult<()> {
        let id = self.id.clone();
        self.cargo_carrier_mut()
            .ok_or_else(|| FleetError::invalid(format!("Vehicle {} cannot carry cargo.", id)))?
            .load_cargo(weight)
    }

    pub fn unload_cargo(&mut self, weight: f64) -> FleetResult<()> {
        let id = self.id.clone();
        self.cargo_carrier_mut()
            .ok_or_else(|| FleetError::invalid(format!("Vehicle {} cannot carry cargo.", id)))?
            .unload_cargo(weight)
    }

    // ---- maintenance ----

    pub fn mileage_at_last_service(&self) -> f64 {
        self.service_log().mileage_at_last_service()
    }

    pub fn needs_maintenance(&self) -> bool {
        self.service_log().needs_maintenance(self.current_mileage)
    }

    pub fn schedule_maintenance(&mut self) {
        self.service_log_mut().schedule_maintenance();
    }

    pub fn perform_maintenance(&mut self) {
        let odometer = self.current_mileage;
        self.service_log_mut().perform_maintenance(odometer);
    }

    // ---- display ----

    pub fn display_info(&self) -> String {
        format!(
            "ID: {}, Model: {}, Max Speed: {:.1} km/h, Mileage: {:.1} km",
            self.id, self.model, self.max_speed, self.current_mileage
        )
    }

    /// Multi-line status block covering every capability the vehicle has.
    pub fn status_details(&self) -> String {
        let mut out = format!("--- Status for Vehicle: {} ---\n", self.id);
        let _ = writeln!(out, "{}", self.display_info());
        if let Some(wheels) = self.num_wheels() {
            let _ = writeln!(out, "Number of Wheels: {}", wheels);
        }
        if let Some(altitude) = self.max_altitude() {
            let _ = writeln!(out, "Max Altitude: {:.0} ft", altitude);
        }
        if let Some(sail) = self.has_sail() {
            let _ = writeln!(out, "Has Sail: {}", sail);
        }
        if let Some(tank) = self.fuel_consumable() {
            let _ = writeln!(out, "Fuel Level: {:.2} L", tank.fuel_level());
            let _ = writeln!(out, "Last Fueled At: {:.1} km", tank.last_fueled_at());
            let _ = writeln!(
                out,
                "Fuel Efficiency: {:.1} km/L",
                self.calculate_fuel_efficiency()
            );
        }
        if let Some(cabin) = self.passenger_carrier() {
            let _ = writeln!(
                out,
                "Passengers: {} / {}",
                cabin.current_passengers(),
                cabin.passenger_capacity()
            );
        }
        if let Some(hold) = self.cargo_carrier() {
            let _ = writeln!(
                out,
                "Cargo: {:.2} kg / {:.2} kg",
                hold.current_cargo(),
                hold.cargo_capacity()
            );
        }
        if let Some(service) = self.maintainable() {
            let _ = writeln!(
                out,
                "Needs Maintenance: {}",
                service.needs_maintenance(self.current_mileage)
            );
            let _ = writeln!(
                out,
                "Last Maintenance At: {:.1} km",
                service.mileage_at_last_service()
            );
        }
        out
    }
}
