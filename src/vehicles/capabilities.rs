// vehicles/capabilities.rs
use crate::error::{FleetError, FleetResult};
use crate::global_variables::MAINTENANCE_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The capability contracts a vehicle variant may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    FuelConsumable,
    PassengerCarrier,
    CargoCarrier,
    Maintainable,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Capability::FuelConsumable => "FuelConsumable",
            Capability::PassengerCarrier => "PassengerCarrier",
            Capability::CargoCarrier => "CargoCarrier",
            Capability::Maintainable => "Maintainable",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Capability {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fuelconsumable" => Ok(Capability::FuelConsumable),
            "passengercarrier" => Ok(Capability::PassengerCarrier),
            "cargocarrier" => Ok(Capability::CargoCarrier),
            "maintainable" => Ok(Capability::Maintainable),
            other => Err(FleetError::invalid(format!("unknown capability '{}'", other))),
        }
    }
}

pub trait FuelConsumable {
    fn fuel_level(&self) -> f64;
    /// Mileage recorded at the last successful refuel.
    fn last_fueled_at(&self) -> f64;
    fn refuel(&mut self, amount: f64, odometer: f64) -> FleetResult<()>;
    /// Burns the fuel needed for `distance` at `efficiency` and returns the amount burned.
    fn consume_fuel(&mut self, distance: f64, efficiency: f64) -> FleetResult<f64>;
}

pub trait PassengerCarrier {
    fn passenger_capacity(&self) -> u32;
    fn current_passengers(&self) -> u32;
    fn board_passengers(&mut self, count: u32) -> FleetResult<()>;
    fn disembark_passengers(&mut self, count: u32) -> FleetResult<()>;
}

pub trait CargoCarrier {
    fn cargo_capacity(&self) -> f64;
    fn current_cargo(&self) -> f64;
    fn load_cargo(&mut self, weight: f64) -> FleetResult<()>;
    fn unload_cargo(&mut self, weight: f64) -> FleetResult<()>;
}

pub trait Maintainable {
    fn needs_maintenance(&self, odometer: f64) -> bool;
    fn schedule_maintenance(&mut self);
    fn perform_maintenance(&mut self, odometer: f64);
    fn mileage_at_last_service(&self) -> f64;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelTank {
    pub(crate) fuel_level: f64,
    pub(crate) last_fueled_at: f64,
}

impl FuelTank {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn restored(fuel_level: f64, last_fueled_at: f64) -> Self {
        Self {
            fuel_level,
            last_fueled_at,
        }
    }
}

impl FuelConsumable for FuelTank {
    fn fuel_level(&self) -> f64 {
        self.fuel_level
    }

    fn last_fueled_at(&self) -> f64 {
        self.last_fueled_at
    }

    fn refuel(&mut self, amount: f64, odometer: f64) -> FleetResult<()> {
        // Also rejects NaN.
        if !(amount > 0.0) || !amount.is_finite() {
            return Err(FleetError::invalid("Fuel amount must be positive."));
        }
        self.fuel_level += amount;
        self.last_fueled_at = odometer;
        Ok(())
    }

    fn consume_fuel(&mut self, distance: f64, efficiency: f64) -> FleetResult<f64> {
        let needed = distance / efficiency;
        if needed > self.fuel_level {
            return Err(FleetError::InsufficientFuel {
                needed,
                available: self.fuel_level,
            });
        }
        self.fuel_level -= needed;
        Ok(needed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerCabin {
    capacity: u32,
    current: u32,
}

impl PassengerCabin {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            current: 0,
        }
    }
}

impl PassengerCarrier for PassengerCabin {
    fn passenger_capacity(&self) -> u32 {
        self.capacity
    }

    fn current_passengers(&self) -> u32 {
        self.current
    }

    fn board_passengers(&mut self, count: u32) -> FleetResult<()> {
        let total = self.current as u64 + count as u64;
        if total > self.capacity as u64 {
            return Err(FleetError::Overload(format!(
                "Passenger capacity of {} exceeded.",
                self.capacity
            )));
        }
        self.current += count;
        Ok(())
    }

    fn disembark_passengers(&mut self, count: u32) -> FleetResult<()> {
        if count > self.current {
            return Err(FleetError::invalid(
                "Cannot disembark more passengers than are on board.",
            ));
        }
        self.current -= count;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoHold {
    capacity: f64,
    current: f64,
}

impl CargoHold {
    pub fn new(capacity: f64) -> Self {
        Self {
            capacity,
            current: 0.0,
        }
    }
}

fn check_weight(weight: f64) -> FleetResult<()> {
    if weight < 0.0 || !weight.is_finite() {
        return Err(FleetError::invalid("Cargo weight must be a non-negative number."));
    }
    Ok(())
}

impl CargoCarrier for CargoHold {
    fn cargo_capacity(&self) -> f64 {
        self.capacity
    }

    fn current_cargo(&self) -> f64 {
        self.current
    }

    fn load_cargo(&mut self, weight: f64) -> FleetResult<()> {
        check_weight(weight)?;
        if self.current + weight > self.capacity {
            return Err(FleetError::Overload(format!(
                "Cargo capacity of {:.1} kg exceeded.",
                self.capacity
            )));
        }
        self.current += weight;
        Ok(())
    }

    fn unload_cargo(&mut self, weight: f64) -> FleetResult<()> {
        check_weight(weight)?;
        if weight > self.current {
            return Err(FleetError::invalid(
                "Cannot unload more cargo than is currently loaded.",
            ));
        }
        self.current -= weight;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceLog {
    pub(crate) maintenance_needed: bool,
    pub(crate) mileage_at_last_service: f64,
}

impl ServiceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn restored(maintenance_needed: bool, mileage_at_last_service: f64) -> Self {
        Self {
            maintenance_needed,
            mileage_at_last_service,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.maintenance_needed
    }
}

impl Maintainable for ServiceLog {
    fn needs_maintenance(&self, odometer: f64) -> bool {
        (odometer - self.mileage_at_last_service) > MAINTENANCE_THRESHOLD || self.maintenance_needed
    }

    fn schedule_maintenance(&mut self) {
        self.maintenance_needed = true;
    }

    fn perform_maintenance(&mut self, odometer: f64) {
        self.maintenance_needed = false;
        self.mileage_at_last_service = odometer;
    }

    fn mileage_at_last_service(&self) -> f64 {
        self.mileage_at_last_service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refuel_rejects_non_positive_amounts() {
        let mut tank = FuelTank::restored(5.0, 12.0);
        for amount in [0.0, -5.0, f64::NAN] {
            let err = tank.refuel(amount, 100.0).unwrap_err();
            assert!(matches!(err, FleetError::InvalidOperation(_)));
        }
        assert_eq!(tank.fuel_level(), 5.0);
        assert_eq!(tank.last_fueled_at(), 12.0);
    }

    #[test]
    fn test_consume_fuel_is_all_or_nothing() {
        let mut tank = FuelTank::restored(10.0, 0.0);
        let err = tank.consume_fuel(300.0, 15.0).unwrap_err();
        assert_eq!(
            err,
            FleetError::InsufficientFuel {
                needed: 20.0,
                available: 10.0
            }
        );
        assert_eq!(tank.fuel_level(), 10.0);

        let burned = tank.consume_fuel(150.0, 15.0).unwrap();
        assert_eq!(burned, 10.0);
        assert_eq!(tank.fuel_level(), 0.0);
    }

    #[test]
    fn test_passenger_bounds() {
        let mut cabin = PassengerCabin::new(5);
        cabin.board_passengers(5).unwrap();
        assert!(matches!(cabin.board_passengers(1), Err(FleetError::Overload(_))));
        assert!(matches!(
            cabin.disembark_passengers(6),
            Err(FleetError::InvalidOperation(_))
        ));
        cabin.disembark_passengers(2).unwrap();
        assert_eq!(cabin.current_passengers(), 3);
    }

    #[test]
    fn test_board_does_not_overflow() {
        let mut cabin = PassengerCabin::new(5);
        cabin.board_passengers(1).unwrap();
        assert!(matches!(
            cabin.board_passengers(u32::MAX),
            Err(FleetError::Overload(_))
        ));
        assert_eq!(cabin.current_passengers(), 1);
    }

    #[test]
    fn test_cargo_bounds() {
        let mut hold = CargoHold::new(500.0);
        hold.load_cargo(500.0).unwrap();
        assert!(matches!(hold.load_cargo(0.5), Err(FleetError::Overload(_))));
        assert!(matches!(
            hold.unload_cargo(600.0),
            Err(FleetError::InvalidOperation(_))
        ));
        assert!(matches!(
            hold.load_cargo(-1.0),
            Err(FleetError::InvalidOperation(_))
        ));
        hold.unload_cargo(200.0).unwrap();
        assert_eq!(hold.current_cargo(), 300.0);
    }

    #[test]
    fn test_maintenance_threshold_is_strict() {
        let log = ServiceLog::new();
        assert!(!log.needs_maintenance(10_000.0));
        assert!(log.needs_maintenance(10_000.01));

        let mut scheduled = ServiceLog::new();
        scheduled.schedule_maintenance();
        assert!(scheduled.needs_maintenance(0.0));
        scheduled.perform_maintenance(250.0);
        assert!(!scheduled.needs_maintenance(250.0));
        assert_eq!(scheduled.mileage_at_last_service(), 250.0);
    }

    #[test]
    fn test_capability_parse_is_case_insensitive() {
        assert_eq!(
            "fuelconsumable".parse::<Capability>().unwrap(),
            Capability::FuelConsumable
        );
        assert!("Flying".parse::<Capability>().is_err());
    }
}
