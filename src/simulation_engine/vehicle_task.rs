// simulation_engine/vehicle_task.rs
use crate::global_variables::EMPTY_TANK_EPSILON;
use crate::simulation_engine::highway::Highway;
use crate::vehicles::vehicle::Vehicle;
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PauseCause {
    User,
    OutOfFuel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskState {
    Ready,
    Running,
    Paused(PauseCause),
    Stopped,
}

impl TaskState {
    pub fn label(&self) -> &'static str {
        match self {
            TaskState::Ready => "Ready",
            TaskState::Running => "Running",
            TaskState::Paused(PauseCause::User) => "Paused",
            TaskState::Paused(PauseCause::OutOfFuel) => "Out of Fuel",
            TaskState::Stopped => "Stopped",
        }
    }
}

pub(crate) fn lock_vehicle(vehicle: &Mutex<Vehicle>) -> MutexGuard<'_, Vehicle> {
    vehicle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// `Status: <state> | Mileage: x.x km[ | Fuel: y.y L]`
pub fn render_status(state: TaskState, vehicle: &Vehicle) -> String {
    let fuel_info = vehicle
        .fuel_level()
        .map(|fuel| format!(" | Fuel: {:.1} L", fuel))
        .unwrap_or_default();
    format!(
        "Status: {} | Mileage: {:.1} km{}",
        state.label(),
        vehicle.current_mileage(),
        fuel_info
    )
}

/// True when the vehicle cannot afford one more unit of travel.
fn out_of_fuel(vehicle: &Vehicle) -> bool {
    match (vehicle.fuel_level(), vehicle.fuel_needed(1.0)) {
        (Some(fuel), Some(needed)) => fuel <= EMPTY_TANK_EPSILON || (needed > 0.0 && fuel < needed),
        _ => false,
    }
}

/// Flags the controller flips from outside the worker. All reads are atomic so
/// the worker sees a change on its next tick.
#[derive(Debug)]
pub struct TaskControl {
    started: AtomicBool,
    running: AtomicBool,
    paused: AtomicBool,
    fuel_exhausted: AtomicBool,
    stop_tx: watch::Sender<bool>,
    status: Mutex<String>,
}

impl TaskControl {
    fn new(initial_status: String) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            started: AtomicBool::new(false),
            running: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            fuel_exhausted: AtomicBool::new(false),
            stop_tx,
            status: Mutex::new(initial_status),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> TaskState {
        if self.started.load(Ordering::SeqCst) && !self.is_running() {
            TaskState::Stopped
        } else if self.paused.load(Ordering::SeqCst) {
            if self.fuel_exhausted.load(Ordering::SeqCst) {
                TaskState::Paused(PauseCause::OutOfFuel)
            } else {
                TaskState::Paused(PauseCause::User)
            }
        } else if self.is_running() {
            TaskState::Running
        } else {
            TaskState::Ready
        }
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
        if !paused {
            self.fuel_exhausted.store(false, Ordering::SeqCst);
        }
    }

    /// Sets the durable stop flag and wakes the worker if it is waiting.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.stop_tx.send_replace(true);
    }

    pub fn status(&self) -> String {
        self.status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_status(&self, status: String) {
        *self
            .status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = status;
    }

    fn force_fuel_pause(&self) {
        self.fuel_exhausted.store(true, Ordering::SeqCst);
        self.paused.store(true, Ordering::SeqCst);
    }
}

/// What happened to the vehicle during one tick.
enum TickOutcome {
    Moved,
    Held,
    Stopped,
}

/// One simulated vehicle: its state, its control flags and the worker that drives it.
#[derive(Debug, Clone)]
pub struct VehicleTask {
    id: String,
    vehicle: Arc<Mutex<Vehicle>>,
    control: Arc<TaskControl>,
}

impl VehicleTask {
    pub fn new(vehicle: Vehicle) -> Self {
        let status = render_status(TaskState::Ready, &vehicle);
        Self {
            id: vehicle.id().to_string(),
            vehicle: Arc::new(Mutex::new(vehicle)),
            control: Arc::new(TaskControl::new(status)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn control(&self) -> &TaskControl {
        &self.control
    }

    pub fn state(&self) -> TaskState {
        self.control.state()
    }

    pub fn status(&self) -> String {
        self.control.status()
    }

    pub fn snapshot(&self) -> Vehicle {
        lock_vehicle(&self.vehicle).clone()
    }

    pub(crate) fn with_vehicle<T>(&self, f: impl FnOnce(&mut Vehicle) -> T) -> T {
        f(&mut lock_vehicle(&self.vehicle))
    }

    /// Re-renders the status line from the current state, used after stop.
    pub(crate) fn refresh_status(&self) {
        let line = render_status(self.control.state(), &lock_vehicle(&self.vehicle));
        self.control.set_status(line);
    }

    /// Marks the task running and spawns its worker on the current runtime.
    pub(crate) fn spawn(
        &self,
        highway: Arc<Highway>,
        tick: Duration,
    ) -> tokio::task::JoinHandle<()> {
        self.control.started.store(true, Ordering::SeqCst);
        self.control.running.store(true, Ordering::SeqCst);
        let stop_rx = self.control.stop_tx.subscribe();
        tokio::spawn(run_worker(
            self.id.clone(),
            Arc::clone(&self.vehicle),
            Arc::clone(&self.control),
            highway,
            tick,
            stop_rx,
        ))
    }
}

async fn run_worker(
    id: String,
    vehicle: Arc<Mutex<Vehicle>>,
    control: Arc<TaskControl>,
    highway: Arc<Highway>,
    tick: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    debug!("Worker for {} started", id);
    while control.is_running() && !*stop_rx.borrow() {
        tokio::select! {
            biased;
            changed = stop_rx.changed() => {
                // A dropped sender also ends the run.
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
                continue;
            }
            _ = sleep(tick) => {}
        }

        match advance_one_tick(&id, &vehicle, &control) {
            TickOutcome::Stopped => break,
            TickOutcome::Held => {}
            TickOutcome::Moved => {
                highway.add(1).await;
                let line = render_status(TaskState::Running, &lock_vehicle(&vehicle));
                control.set_status(line);
            }
        }
    }
    debug!("Worker for {} exited", id);
}

/// Checks fuel, honours pause, and moves one unit. The vehicle lock is held for
/// the whole decision so a stop cannot slip between the check and the move.
fn advance_one_tick(id: &str, vehicle: &Mutex<Vehicle>, control: &TaskControl) -> TickOutcome {
    let mut v = lock_vehicle(vehicle);
    if !control.is_running() {
        return TickOutcome::Stopped;
    }

    let empty = out_of_fuel(&v);
    if empty && !control.fuel_exhausted.load(Ordering::SeqCst) {
        info!("{} is out of fuel and pauses", id);
    }
    if empty {
        control.force_fuel_pause();
    } else {
        control.fuel_exhausted.store(false, Ordering::SeqCst);
    }

    if control.paused.load(Ordering::SeqCst) {
        let state = if empty {
            TaskState::Paused(PauseCause::OutOfFuel)
        } else {
            TaskState::Paused(PauseCause::User)
        };
        control.set_status(render_status(state, &v));
        return TickOutcome::Held;
    }

    match v.move_by(1.0) {
        Ok(()) => TickOutcome::Moved,
        Err(e) => {
            warn!("{} could not move: {}", id, e);
            control.force_fuel_pause();
            control.set_status(render_status(
                TaskState::Paused(PauseCause::OutOfFuel),
                &v,
            ));
            TickOutcome::Held
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_status_formats() {
        let mut car = Vehicle::car("HR26", "Honda City", 120.0).unwrap();
        car.refuel(20.0).unwrap();
        assert_eq!(
            render_status(TaskState::Ready, &car),
            "Status: Ready | Mileage: 0.0 km | Fuel: 20.0 L"
        );
        let sailer = Vehicle::cargo_ship("S1", "Clipper", 20.0, true).unwrap();
        assert_eq!(
            render_status(TaskState::Paused(PauseCause::OutOfFuel), &sailer),
            "Status: Out of Fuel | Mileage: 0.0 km"
        );
    }

    #[test]
    fn test_out_of_fuel_check() {
        let mut truck = Vehicle::truck("T1", "Tata", 80.0, 10).unwrap();
        assert!(out_of_fuel(&truck));
        truck.refuel(0.125).unwrap();
        assert!(!out_of_fuel(&truck));
        truck.refuel(0.00001).unwrap();
        truck.move_by(1.0).unwrap();
        assert!(out_of_fuel(&truck));

        let sailer = Vehicle::cargo_ship("S1", "Clipper", 20.0, true).unwrap();
        assert!(!out_of_fuel(&sailer));
    }

    #[test]
    fn test_control_state_transitions() {
        let task = VehicleTask::new(Vehicle::car("C1", "City", 100.0).unwrap());
        let control = task.control();
        assert_eq!(control.state(), TaskState::Ready);

        control.started.store(true, Ordering::SeqCst);
        control.running.store(true, Ordering::SeqCst);
        assert_eq!(control.state(), TaskState::Running);

        control.set_paused(true);
        assert_eq!(control.state(), TaskState::Paused(PauseCause::User));
        control.force_fuel_pause();
        assert_eq!(control.state(), TaskState::Paused(PauseCause::OutOfFuel));
        control.set_paused(false);
        assert_eq!(control.state(), TaskState::Running);

        control.stop();
        assert_eq!(control.state(), TaskState::Stopped);
        assert!(!control.is_running());
    }

    #[test]
    fn test_paused_tick_does_not_move() {
        let mut car = Vehicle::car("C1", "City", 100.0).unwrap();
        car.refuel(5.0).unwrap();
        let task = VehicleTask::new(car);
        task.control.running.store(true, Ordering::SeqCst);
        task.control.set_paused(true);

        assert!(matches!(
            advance_one_tick("C1", &task.vehicle, &task.control),
            TickOutcome::Held
        ));
        assert_eq!(task.snapshot().current_mileage(), 0.0);

        task.control.set_paused(false);
        assert!(matches!(
            advance_one_tick("C1", &task.vehicle, &task.control),
            TickOutcome::Moved
        ));
        assert_eq!(task.snapshot().current_mileage(), 1.0);

        task.control.stop();
        assert!(matches!(
            advance_one_tick("C1", &task.vehicle, &task.control),
            TickOutcome::Stopped
        ));
        assert_eq!(task.snapshot().current_mileage(), 1.0);
    }
}
