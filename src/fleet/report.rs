// fleet/report.rs
use crate::vehicles::vehicle::{Vehicle, VehicleType};
use serde::Serialize;
use std::fmt::Write as _;

/// One line of the per-vehicle section of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleLine {
    pub id: String,
    pub vehicle_type: VehicleType,
    pub model: String,
    pub max_speed: f64,
    pub mileage: f64,
    /// `None` for vehicles without a maintenance schedule.
    pub needs_maintenance: Option<bool>,
}

/// Aggregated fleet statistics, computed once and rendered deterministically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetReport {
    pub total_vehicles: usize,
    pub type_counts: Vec<(VehicleType, usize)>,
    pub average_efficiency: Option<f64>,
    pub total_mileage: f64,
    pub vehicles: Vec<VehicleLine>,
}

impl FleetReport {
    pub fn from_vehicles(fleet: &[Vehicle]) -> Self {
        let type_counts = VehicleType::ALL
            .into_iter()
            .map(|t| (t, fleet.iter().filter(|v| v.vehicle_type() == t).count()))
            .filter(|(_, n)| *n > 0)
            .collect();

        let efficiencies: Vec<f64> = fleet
            .iter()
            .filter(|v| v.fuel_consumable().is_some())
            .map(|v| v.calculate_fuel_efficiency())
            .filter(|eff| *eff > 0.0)
            .collect();
        let average_efficiency = if efficiencies.is_empty() {
            None
        } else {
            Some(efficiencies.iter().sum::<f64>() / efficiencies.len() as f64)
        };

        let vehicles = fleet
            .iter()
            .map(|v| VehicleLine {
                id: v.id().to_string(),
                vehicle_type: v.vehicle_type(),
                model: v.model().to_string(),
                max_speed: v.max_speed(),
                mileage: v.current_mileage(),
                needs_maintenance: v
                    .maintainable()
                    .map(|m| m.needs_maintenance(v.current_mileage())),
            })
            .collect();

        Self {
            total_vehicles: fleet.len(),
            type_counts,
            average_efficiency,
            total_mileage: fleet.iter().map(|v| v.current_mileage()).sum(),
            vehicles,
        }
    }

    pub fn render(&self) -> String {
        let mut rpt = String::new();
        let _ = writeln!(rpt, "=================================");
        let _ = writeln!(rpt, "********** Fleet Report *********");
        let _ = writeln!(rpt);
        let _ = writeln!(rpt, "Total Vehicles: {}", self.total_vehicles);
        let _ = writeln!(rpt);
        let _ = writeln!(rpt, "--- Fleet Statistics ---");
        let _ = writeln!(rpt, "Vehicle Counts by Type:");
        for (t, n) in &self.type_counts {
            let _ = writeln!(rpt, "  - {}: {}", t.plural(), n);
        }
        let _ = writeln!(rpt, "---------------------------");
        match self.average_efficiency {
            Some(avg) => {
                let _ = writeln!(rpt, "Average Fleet Efficiency: {:.1} km/L", avg);
            }
            None => {
                let _ = writeln!(rpt, "Average Fleet Efficiency: N/A");
            }
        }
        let _ = writeln!(rpt, "Total Fleet Mileage: {:.1} km", self.total_mileage);
        let _ = writeln!(rpt);
        let _ = writeln!(rpt, "---Individual Vehicle Details---");
        for line in &self.vehicles {
            let status = line
                .needs_maintenance
                .map(|b| b.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            let _ = writeln!(
                rpt,
                "ID: {}, Type: {}, Model: {}, Top Speed: {:.1} km/h, Mileage: {:.1} km, Status: {}",
                line.id, line.vehicle_type, line.model, line.max_speed, line.mileage, status
            );
        }
        let _ = writeln!(rpt, "----------------------------------");
        rpt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report() {
        let report = FleetReport::from_vehicles(&[]);
        assert_eq!(report.total_vehicles, 0);
        assert!(report.type_counts.is_empty());
        assert_eq!(report.average_efficiency, None);
        assert!(report.render().contains("Average Fleet Efficiency: N/A"));
    }

    #[test]
    fn test_report_statistics() {
        let mut car = Vehicle::car("HR26", "Honda City", 120.0).unwrap();
        car.refuel(10.0).unwrap();
        car.move_by(30.0).unwrap();
        let truck = Vehicle::truck("HR20", "Tata", 80.0, 10).unwrap();
        let sailer = Vehicle::cargo_ship("S1", "Clipper", 20.0, true).unwrap();

        let report = FleetReport::from_vehicles(&[car, truck, sailer]);
        assert_eq!(report.total_vehicles, 3);
        assert_eq!(
            report.type_counts,
            vec![
                (VehicleType::Car, 1),
                (VehicleType::Truck, 1),
                (VehicleType::CargoShip, 1)
            ]
        );
        // The sailing ship has no fuel system, so it does not count.
        assert_eq!(report.average_efficiency, Some(11.5));
        assert_eq!(report.total_mileage, 30.0);

        let text = report.render();
        assert!(text.contains("  - Cargo Ships: 1"));
        assert!(text.contains(
            "ID: HR26, Type: Car, Model: Honda City, Top Speed: 120.0 km/h, Mileage: 30.0 km, Status: false"
        ));
    }

    #[test]
    fn test_render_is_deterministic() {
        let fleet = vec![
            Vehicle::bus("B1", "Volvo", 100.0, 6).unwrap(),
            Vehicle::airplane("A1", "747", 900.0, 30_000.0).unwrap(),
        ];
        assert_eq!(
            FleetReport::from_vehicles(&fleet).render(),
            FleetReport::from_vehicles(&fleet).render()
        );
    }
}
