// simulation_engine/simulation.rs
use crate::error::{FleetError, FleetResult};
use crate::fleet::fleet_manager::FleetManager;
use crate::simulation_engine::config::SimulationConfig;
use crate::simulation_engine::highway::{AggregationStrategy, Highway};
use crate::simulation_engine::vehicle_task::{TaskState, VehicleTask};
use crate::vehicles::capabilities::Capability;
use crate::vehicles::vehicle::Vehicle;
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A polled view of one task, as shown next to each vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStatus {
    pub id: String,
    pub state: TaskState,
    pub status: String,
}

/// Drives one worker per vehicle against a shared `Highway` counter.
///
/// Workers are tokio tasks, so `start`, `stop` and `restart` must be called
/// from inside a runtime.
pub struct SimulationEngine {
    config: SimulationConfig,
    highway: Arc<Highway>,
    roster: Vec<Vehicle>,
    tasks: Vec<VehicleTask>,
    handles: Vec<JoinHandle<()>>,
    stopped: bool,
}

impl SimulationEngine {
    pub fn new(vehicles: Vec<Vehicle>, config: SimulationConfig) -> Self {
        let strategy = if config.safe_mode {
            AggregationStrategy::Safe
        } else {
            AggregationStrategy::Unsafe
        };
        let highway = Arc::new(Highway::new(strategy, config.unsafe_gap()));
        let tasks = build_tasks(&vehicles, &config);
        Self {
            config,
            highway,
            roster: vehicles,
            tasks,
            handles: Vec::new(),
            stopped: false,
        }
    }

    /// Takes a copy of the fleet's vehicles as the run's roster.
    pub fn from_fleet(fleet: &FleetManager, config: SimulationConfig) -> Self {
        Self::new(fleet.vehicles().to_vec(), config)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn highway(&self) -> Arc<Highway> {
        Arc::clone(&self.highway)
    }

    pub fn is_running(&self) -> bool {
        !self.handles.is_empty()
    }

    pub fn start(&mut self) -> FleetResult<()> {
        if self.is_running() {
            return Ok(());
        }
        if self.stopped {
            return Err(FleetError::invalid(
                "simulation was stopped; restart it to run again",
            ));
        }
        info!(
            "Starting simulation with {} vehicles ({:?} counter)",
            self.tasks.len(),
            self.highway.strategy()
        );
        let tick = self.config.tick();
        self.handles = self
            .tasks
            .iter()
            .map(|task| task.spawn(Arc::clone(&self.highway), tick))
            .collect();
        Ok(())
    }

    /// Stops every worker and waits for them to exit. Once this returns no
    /// vehicle or the counter changes again for this run.
    pub async fn stop(&mut self) {
        for task in &self.tasks {
            task.control().stop();
        }
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                warn!("Vehicle worker ended abnormally: {}", e);
            }
        }
        for task in &self.tasks {
            task.refresh_status();
        }
        if !self.stopped {
            info!("Simulation stopped at {} km", self.highway.get());
        }
        self.stopped = true;
    }

    /// Stops the run, zeroes the counter and rebuilds the tasks from the roster.
    pub async fn restart(&mut self) {
        self.stop().await;
        self.highway.reset();
        self.tasks = build_tasks(&self.roster, &self.config);
        self.stopped = false;
        info!("Simulation reset");
    }

    pub fn pause_all(&self) {
        for task in &self.tasks {
            task.control().set_paused(true);
        }
    }

    pub fn resume_all(&self) {
        for task in &self.tasks {
            task.control().set_paused(false);
        }
    }

    pub fn pause(&self, id: &str) -> FleetResult<()> {
        self.task(id)?.control().set_paused(true);
        Ok(())
    }

    pub fn resume(&self, id: &str) -> FleetResult<()> {
        self.task(id)?.control().set_paused(false);
        Ok(())
    }

    /// Refuels one vehicle and, on success, unpauses its task.
    pub fn refuel_vehicle(&self, id: &str, amount: f64) -> FleetResult<()> {
        let task = self.task(id)?;
        task.with_vehicle(|v| v.refuel(amount))?;
        task.control().set_paused(false);
        info!("Refueled {} with {} L", id, amount);
        Ok(())
    }

    /// Refuels with the configured amount.
    pub fn refuel_default(&self, id: &str) -> FleetResult<()> {
        self.refuel_vehicle(id, self.config.refuel_amount)
    }

    pub fn set_safe_mode(&self, safe: bool) {
        let strategy = if safe {
            AggregationStrategy::Safe
        } else {
            AggregationStrategy::Unsafe
        };
        self.highway.set_strategy(strategy);
        info!("Counter strategy set to {:?}", strategy);
    }

    /// Flips the strategy and returns whether safe mode is now on.
    pub fn toggle_safe_mode(&self) -> bool {
        let safe = self.highway.strategy() == AggregationStrategy::Unsafe;
        self.set_safe_mode(safe);
        safe
    }

    pub fn total_distance(&self) -> u64 {
        self.highway.get()
    }

    pub fn statuses(&self) -> Vec<TaskStatus> {
        self.tasks
            .iter()
            .map(|t| TaskStatus {
                id: t.id().to_string(),
                state: t.state(),
                status: t.status(),
            })
            .collect()
    }

    pub fn task_state(&self, id: &str) -> FleetResult<TaskState> {
        Ok(self.task(id)?.state())
    }

    pub fn vehicles_snapshot(&self) -> Vec<Vehicle> {
        self.tasks.iter().map(|t| t.snapshot()).collect()
    }

    fn task(&self, id: &str) -> FleetResult<&VehicleTask> {
        self.tasks
            .iter()
            .find(|t| t.id() == id)
            .ok_or_else(|| FleetError::not_found(id))
    }
}

fn build_tasks(roster: &[Vehicle], config: &SimulationConfig) -> Vec<VehicleTask> {
    roster
        .iter()
        .cloned()
        .map(|mut v| {
            if config.initial_fuel > 0.0 && v.has_capability(Capability::FuelConsumable) {
                if let Err(e) = v.refuel(config.initial_fuel) {
                    warn!("Could not fuel {} for the run: {}", v.id(), e);
                }
            }
            VehicleTask::new(v)
        })
        .collect()
}

impl Drop for SimulationEngine {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.control().stop();
        }
    }
}
