//! Simulated thermostat plant
//!
//! Stands in for the sensor and relay of a real device. The room temperature
//! drifts toward the setpoint while the mode allows it and toward ambient
//! otherwise.

use super::HardwareCallbacks;
use parking_lot::Mutex;
use std::sync::Arc;
use thermolink_shared::ThermostatMode;

/// Degrees per simulated minute the room moves while conditioned
const CONDITIONING_RATE: f64 = 0.5;
/// Degrees per simulated minute the room leaks toward ambient
const LEAK_RATE: f64 = 0.1;

/// Snapshot of the simulated plant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantReading {
    pub temperature: f64,
    pub target: f64,
    pub mode: ThermostatMode,
    pub ambient: f64,
}

/// Thread-safe simulated thermostat hardware
#[derive(Debug, Clone)]
pub struct SimulatedThermostat {
    plant: Arc<Mutex<PlantReading>>,
}

impl SimulatedThermostat {
    /// Create a plant at ambient temperature, switched off
    pub fn new(ambient: f64) -> Self {
        Self {
            plant: Arc::new(Mutex::new(PlantReading {
                temperature: ambient,
                target: ambient,
                mode: ThermostatMode::Off,
                ambient,
            })),
        }
    }

    pub fn reading(&self) -> PlantReading {
        *self.plant.lock()
    }

    /// Change the setpoint locally, as a person at the dial would
    pub fn turn_dial(&self, target: f64) {
        self.plant.lock().target = target;
    }

    /// Change the mode locally
    pub fn press_mode(&self, mode: ThermostatMode) {
        self.plant.lock().mode = mode;
    }

    /// Advance the simulation by `minutes`
    pub fn step(&self, minutes: f64) {
        let mut plant = self.plant.lock();
        let error = plant.target - plant.temperature;

        let conditioning = match plant.mode {
            ThermostatMode::Heat if error > 0.0 => error.min(CONDITIONING_RATE * minutes),
            ThermostatMode::Cool if error < 0.0 => error.max(-CONDITIONING_RATE * minutes),
            ThermostatMode::Auto => error.clamp(-CONDITIONING_RATE * minutes, CONDITIONING_RATE * minutes),
            _ => 0.0,
        };

        if conditioning != 0.0 {
            plant.temperature += conditioning;
        } else {
            let drift = plant.ambient - plant.temperature;
            plant.temperature += drift.clamp(-LEAK_RATE * minutes, LEAK_RATE * minutes);
        }
    }

    /// Wire the plant into the callback registry
    pub fn install(&self, callbacks: &mut HardwareCallbacks) {
        let plant = self.plant.clone();
        callbacks.on_get_current_temperature(move || plant.lock().temperature);

        let plant = self.plant.clone();
        callbacks.on_set_target_temperature(move |target| plant.lock().target = target);

        let plant = self.plant.clone();
        callbacks.on_get_target_temperature(move || plant.lock().target);

        let plant = self.plant.clone();
        callbacks.on_set_mode(move |mode| plant.lock().mode = mode);

        let plant = self.plant.clone();
        callbacks.on_get_mode(move || plant.lock().mode);
    }
}
