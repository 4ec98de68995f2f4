//! Hardware callback registry
//!
//! The protocol layer never touches sensors or relays directly; the embedding
//! application registers these callbacks instead. They run inline on the
//! connection loop, so they must return quickly.

mod simulated;

pub use simulated::{PlantReading, SimulatedThermostat};

use std::fmt;
use thermolink_shared::ThermostatMode;

pub type CurrentTemperatureGetter = Box<dyn FnMut() -> f64 + Send>;
pub type TargetTemperatureSetter = Box<dyn FnMut(f64) + Send>;
pub type TargetTemperatureGetter = Box<dyn FnMut() -> f64 + Send>;
pub type ModeSetter = Box<dyn FnMut(ThermostatMode) + Send>;
pub type ModeGetter = Box<dyn FnMut() -> ThermostatMode + Send>;

/// Optional callbacks into the physical thermostat
#[derive(Default)]
pub struct HardwareCallbacks {
    get_current_temperature: Option<CurrentTemperatureGetter>,
    set_target_temperature: Option<TargetTemperatureSetter>,
    get_target_temperature: Option<TargetTemperatureGetter>,
    set_mode: Option<ModeSetter>,
    get_mode: Option<ModeGetter>,
}

impl HardwareCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get_current_temperature(
        &mut self,
        cb: impl FnMut() -> f64 + Send + 'static,
    ) -> &mut Self {
        self.get_current_temperature = Some(Box::new(cb));
        self
    }

    pub fn on_set_target_temperature(&mut self, cb: impl FnMut(f64) + Send + 'static) -> &mut Self {
        self.set_target_temperature = Some(Box::new(cb));
        self
    }

    pub fn on_get_target_temperature(
        &mut self,
        cb: impl FnMut() -> f64 + Send + 'static,
    ) -> &mut Self {
        self.get_target_temperature = Some(Box::new(cb));
        self
    }

    pub fn on_set_mode(&mut self, cb: impl FnMut(ThermostatMode) + Send + 'static) -> &mut Self {
        self.set_mode = Some(Box::new(cb));
        self
    }

    pub fn on_get_mode(&mut self, cb: impl FnMut() -> ThermostatMode + Send + 'static) -> &mut Self {
        self.get_mode = Some(Box::new(cb));
        self
    }

    /// Read the sensor, if a getter is registered
    pub fn current_temperature(&mut self) -> Option<f64> {
        self.get_current_temperature.as_mut().map(|cb| cb())
    }

    /// Push a new setpoint to the hardware; returns whether a setter ran
    pub fn set_target_temperature(&mut self, value: f64) -> bool {
        match self.set_target_temperature.as_mut() {
            Some(cb) => {
                cb(value);
                true
            }
            None => false,
        }
    }

    pub fn target_temperature(&mut self) -> Option<f64> {
        self.get_target_temperature.as_mut().map(|cb| cb())
    }

    /// Push a new mode to the hardware; returns whether a setter ran
    pub fn set_mode(&mut self, mode: ThermostatMode) -> bool {
        match self.set_mode.as_mut() {
            Some(cb) => {
                cb(mode);
                true
            }
            None => false,
        }
    }

    pub fn mode(&mut self) -> Option<ThermostatMode> {
        self.get_mode.as_mut().map(|cb| cb())
    }
}

impl fmt::Debug for HardwareCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HardwareCallbacks")
            .field("get_current_temperature", &self.get_current_temperature.is_some())
            .field("set_target_temperature", &self.set_target_temperature.is_some())
            .field("get_target_temperature", &self.get_target_temperature.is_some())
            .field("set_mode", &self.set_mode.is_some())
            .field("get_mode", &self.get_mode.is_some())
            .finish()
    }
}
