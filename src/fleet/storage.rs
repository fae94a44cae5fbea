//! CSV persistence for the fleet.
//!
//! One headerless line per vehicle. The first six columns are shared:
//! `type, id, model, maxSpeed, currentMileage, mileageAtLastService`.
//! The rest depend on the type tag:
//!
//! | type      | trailing columns                                                          |
//! |-----------|---------------------------------------------------------------------------|
//! | Car       | fuelLevel, currentPassengers, maintenanceNeeded, numWheels, lastFueledAt  |
//! | Truck     | fuelLevel, currentCargo, maintenanceNeeded, numWheels, lastFueledAt       |
//! | Bus       | fuelLevel, currentPassengers, currentCargo, maintenanceNeeded, numWheels, lastFueledAt |
//! | Airplane  | fuelLevel, currentPassengers, currentCargo, maintenanceNeeded, lastFueledAt |
//! | CargoShip | hasSail, fuelLevel, currentCargo, maintenanceNeeded, lastFueledAt          |
//!
//! `encode_vehicle` and `decode_vehicle` are the only two places that know
//! this layout and must change together.

use crate::error::StorageError;
use crate::global_variables::DEFAULT_AIRPLANE_ALTITUDE;
use crate::vehicles::capabilities::{FuelTank, ServiceLog};
use crate::vehicles::vehicle::{Vehicle, VehicleType};
use std::fs::File;
use std::path::Path;

const BASE_COLUMNS: usize = 6;

fn column_count(vehicle_type: VehicleType) -> usize {
    match vehicle_type {
        VehicleType::Bus => BASE_COLUMNS + 6,
        _ => BASE_COLUMNS + 5,
    }
}

fn fmt_f64(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 {
        format!("{:.1}", x)
    } else {
        x.to_string()
    }
}

pub fn encode_vehicle(v: &Vehicle) -> Vec<String> {
    let tank = v.tank();
    let passengers = v
        .passenger_carrier()
        .map(|c| c.current_passengers())
        .unwrap_or(0)
        .to_string();
    let cargo = fmt_f64(v.cargo_carrier().map(|h| h.current_cargo()).unwrap_or(0.0));
    let fuel = fmt_f64(tank.fuel_level);
    let last_fueled = fmt_f64(tank.last_fueled_at);
    let flag = v.service_log().is_scheduled().to_string();
    let wheels = v.num_wheels().unwrap_or(0).to_string();

    let mut fields = vec![
        v.vehicle_type().to_string(),
        v.id().to_string(),
        v.model().to_string(),
        fmt_f64(v.max_speed()),
        fmt_f64(v.current_mileage()),
        fmt_f64(v.mileage_at_last_service()),
    ];
    let tail = match v.vehicle_type() {
        VehicleType::Car => vec![fuel, passengers, flag, wheels, last_fueled],
        VehicleType::Truck => vec![fuel, cargo, flag, wheels, last_fueled],
        VehicleType::Bus => vec![fuel, passengers, cargo, flag, wheels, last_fueled],
        VehicleType::Airplane => vec![fuel, passengers, cargo, flag, last_fueled],
        VehicleType::CargoShip => vec![
            v.has_sail().unwrap_or(false).to_string(),
            fuel,
            cargo,
            flag,
            last_fueled,
        ],
    };
    fields.extend(tail);
    fields
}

/// Cursor over one record's columns that reports failures with the line number.
struct Columns<'a> {
    record: &'a csv::StringRecord,
    line: usize,
}

impl<'a> Columns<'a> {
    fn raw(&self, idx: usize, name: &str) -> Result<&'a str, StorageError> {
        self.record.get(idx).ok_or_else(|| StorageError::Parse {
            line: self.line,
            message: format!("missing column {} ({})", idx, name),
        })
    }

    fn err(&self, idx: usize, name: &str, value: &str) -> StorageError {
        StorageError::Parse {
            line: self.line,
            message: format!("column {} ({}): cannot parse '{}'", idx, name, value),
        }
    }

    fn f64(&self, idx: usize, name: &str) -> Result<f64, StorageError> {
        let raw = self.raw(idx, name)?;
        match raw.parse::<f64>() {
            Ok(x) if x.is_finite() && x >= 0.0 => Ok(x),
            _ => Err(self.err(idx, name, raw)),
        }
    }

    fn u32(&self, idx: usize, name: &str) -> Result<u32, StorageError> {
        let raw = self.raw(idx, name)?;
        raw.parse::<u32>().map_err(|_| self.err(idx, name, raw))
    }

    fn bool(&self, idx: usize, name: &str) -> Result<bool, StorageError> {
        let raw = self.raw(idx, name)?;
        match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(self.err(idx, name, raw)),
        }
    }
}

pub fn decode_vehicle(record: &csv::StringRecord, line: usize) -> Result<Vehicle, StorageError> {
    let cols = Columns { record, line };
    let tag = cols.raw(0, "type")?;
    let vehicle_type: VehicleType = tag.parse().map_err(|_| StorageError::UnknownType {
        line,
        vehicle_type: tag.to_string(),
    })?;
    if record.len() != column_count(vehicle_type) {
        return Err(StorageError::Parse {
            line,
            message: format!(
                "{} expects {} columns, found {}",
                vehicle_type,
                column_count(vehicle_type),
                record.len()
            ),
        });
    }

    let id = cols.raw(1, "id")?;
    let model = cols.raw(2, "model")?;
    let max_speed = cols.f64(3, "maxSpeed")?;
    let mileage = cols.f64(4, "currentMileage")?;
    let last_service = cols.f64(5, "mileageAtLastService")?;

    let vehicle = match vehicle_type {
        VehicleType::Car => {
            let mut v = Vehicle::car(id, model, max_speed)?;
            cols.u32(9, "numWheels")?;
            v.board_passengers(cols.u32(7, "currentPassengers")?)?;
            v.restore(
                mileage,
                FuelTank::restored(cols.f64(6, "fuelLevel")?, cols.f64(10, "lastFueledAt")?),
                ServiceLog::restored(cols.bool(8, "maintenanceNeeded")?, last_service),
            );
            v
        }
        VehicleType::Truck => {
            let mut v = Vehicle::truck(id, model, max_speed, cols.u32(9, "numWheels")?)?;
            v.load_cargo(cols.f64(7, "currentCargo")?)?;
            v.restore(
                mileage,
                FuelTank::restored(cols.f64(6, "fuelLevel")?, cols.f64(10, "lastFueledAt")?),
                ServiceLog::restored(cols.bool(8, "maintenanceNeeded")?, last_service),
            );
            v
        }
        VehicleType::Bus => {
            let mut v = Vehicle::bus(id, model, max_speed, cols.u32(10, "numWheels")?)?;
            v.board_passengers(cols.u32(7, "currentPassengers")?)?;
            v.load_cargo(cols.f64(8, "currentCargo")?)?;
            v.restore(
                mileage,
                FuelTank::restored(cols.f64(6, "fuelLevel")?, cols.f64(11, "lastFueledAt")?),
                ServiceLog::restored(cols.bool(9, "maintenanceNeeded")?, last_service),
            );
            v
        }
        VehicleType::Airplane => {
            let mut v = Vehicle::airplane(id, model, max_speed, DEFAULT_AIRPLANE_ALTITUDE)?;
            v.board_passengers(cols.u32(7, "currentPassengers")?)?;
            v.load_cargo(cols.f64(8, "currentCargo")?)?;
            v.restore(
                mileage,
                FuelTank::restored(cols.f64(6, "fuelLevel")?, cols.f64(10, "lastFueledAt")?),
                ServiceLog::restored(cols.bool(9, "maintenanceNeeded")?, last_service),
            );
            v
        }
        VehicleType::CargoShip => {
            let mut v = Vehicle::cargo_ship(id, model, max_speed, cols.bool(6, "hasSail")?)?;
            v.load_cargo(cols.f64(8, "currentCargo")?)?;
            v.restore(
                mileage,
                FuelTank::restored(cols.f64(7, "fuelLevel")?, cols.f64(10, "lastFueledAt")?),
                ServiceLog::restored(cols.bool(9, "maintenanceNeeded")?, last_service),
            );
            v
        }
    };
    Ok(vehicle)
}

pub fn save_fleet(fleet: &[Vehicle], path: &Path) -> Result<(), StorageError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    for v in fleet {
        wtr.write_record(encode_vehicle(v))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn load_fleet(path: &Path) -> Result<Vec<Vehicle>, StorageError> {
    let file = File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);
    let mut vehicles = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(idx + 1);
        vehicles.push(decode_vehicle(&record, line)?);
    }
    Ok(vehicles)
}
